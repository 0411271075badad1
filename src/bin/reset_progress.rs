#[cfg(feature = "ssr")]
use datahunt::{establish_connection, reset_all_progress};

#[cfg(feature = "ssr")]
fn main() {
    let mut conn = establish_connection();
    let summary = reset_all_progress(&mut conn).expect("Failed to reset progress");
    println!(
        "Progress reset: {} teams back to stage 1, {} stages cleared.",
        summary.teams, summary.stages
    );
}

#[cfg(not(feature = "ssr"))]
fn main() {
    println!("This binary requires the 'ssr' feature to be enabled.");
}
