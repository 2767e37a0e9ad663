use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use physiotrack::config::Config;
use physiotrack::llm::OpenAiPlanGenerator;
use physiotrack::repositories::AuthSessionRepository;
use physiotrack::routes::{create_router, AppStates};
use physiotrack::{db, migrations, version};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "physiotrack=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!(version = version::GIT_VERSION, "Starting physiotrack");
    tracing::info!("Connecting to database: {}", config.database_url);

    // Create database pool
    let pool = db::create_pool(&config.database_url)?;

    // Run migrations
    migrations::run_migrations(&pool)?;

    let removed = AuthSessionRepository::new(pool.clone())
        .cleanup_expired()
        .await?;
    if removed > 0 {
        tracing::info!(removed, "Removed expired auth sessions");
    }

    if config.llm.api_key.is_none() {
        tracing::warn!("LLM_API_KEY is not set; plan generation requests are sent unauthenticated");
    }
    let plan_generator = Arc::new(OpenAiPlanGenerator::new(config.llm.clone())?);

    // Build router
    let app = create_router(AppStates::new(pool, &config, plan_generator));

    // Start server
    let addr = config.server_addr();
    tracing::info!("Starting server at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
