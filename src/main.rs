#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    use axum::Router;
    use datahunt::app::*;
    use datahunt::config::Config;
    use datahunt::{apply_schema, build_pool, seed_default_settings};
    use leptos::prelude::*;
    use leptos_axum::{generate_route_list, LeptosRoutes};

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "datahunt=info,leptos_axum=warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::load();
    let pool = build_pool(&config).expect("Failed to create pool.");

    // A fresh database gets its tables and the shipped site copy.
    {
        let mut conn = pool.get().expect("Failed to get a connection from the pool.");
        apply_schema(&mut conn).expect("Failed to apply schema.");
        let seeded = seed_default_settings(&mut conn).expect("Failed to seed settings.");
        if seeded > 0 {
            tracing::info!(seeded, "inserted default site settings");
        }
    }

    let conf = get_configuration(None).expect("Failed to read leptos configuration.");
    let addr = conf.leptos_options.site_addr;
    let leptos_options = conf.leptos_options;
    // Generate the list of routes in your Leptos App
    let routes = generate_route_list(App);

    let leptos_options_clone = leptos_options.clone();
    let app = Router::new()
        .leptos_routes_with_context(
            &leptos_options,
            routes,
            // Provide pool for server functions.
            move || provide_context(pool.clone()),
            move || shell(leptos_options_clone.clone()),
        )
        // Use shell for fallback.
        .fallback(leptos_axum::file_and_error_handler(shell))
        .with_state(leptos_options.clone());

    tracing::info!("listening on http://{}", &addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address.");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error.");
}

#[cfg(not(feature = "ssr"))]
pub fn main() {
    // no client-side main function
    // see lib.rs for hydration function instead
}
