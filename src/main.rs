use std::net::SocketAddr;

use mongodb::Client;

use rustgrocer::{config, routes, services::db_init, templates, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    // Mongo connection
    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db = client.database(&settings.mongodb_db);

    // `rustgrocer seed-db` loads the sample catalog and exits.
    if std::env::args().nth(1).as_deref() == Some("seed-db") {
        match db_init::seed_products(&db).await {
            Ok(true) => println!("Database seeded with sample products!"),
            Ok(false) => println!("Database already contains products!"),
            Err(e) => {
                eprintln!("seed failed: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = db_init::ensure_indexes(&db).await {
        tracing::warn!("could not create indexes: {e}");
    }

    let state = AppState {
        hbs: templates::build_handlebars(),
        db,
        settings: settings.clone(),
    };

    let app = routes::app(state);

    let addr = SocketAddr::from((
        settings.host.parse::<std::net::IpAddr>().expect("invalid HOST"),
        settings.port,
    ));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("bind");
    axum::serve(listener, app).await.expect("server error");
}
