use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shelfmate::infrastructure::AppState;
use shelfmate::{config, db, seed, server};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelfmate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::Config::from_env();

    // Initialize database
    let db = db::init_db(&config.database_url)
        .await
        .expect("Failed to initialize database");

    if config.seed_demo {
        tracing::info!("Seeding demo data...");
        if let Err(e) = seed::seed_demo_data(&db).await {
            tracing::error!("Failed to seed data: {}", e);
        } else {
            tracing::info!("Demo data seeded successfully.");
        }
    }

    if let Err(e) = tokio::fs::create_dir_all(&config.uploads.dir).await {
        tracing::error!(
            "Failed to create uploads directory {}: {}",
            config.uploads.dir.display(),
            e
        );
    }

    let state = AppState::new(db, config);
    server::start_server(state)
        .await
        .expect("Failed to start server");
}
