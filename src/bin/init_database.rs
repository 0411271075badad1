#[cfg(feature = "ssr")]
use datahunt::{apply_schema, establish_connection, seed_default_settings};

#[cfg(feature = "ssr")]
fn main() {
    let mut conn = establish_connection();
    apply_schema(&mut conn).expect("Failed to create tables");
    let seeded = seed_default_settings(&mut conn).expect("Failed to seed site settings");
    println!("Schema ready. {seeded} default site settings inserted.");
}

#[cfg(not(feature = "ssr"))]
fn main() {
    println!("This binary requires the 'ssr' feature to be enabled.");
}
