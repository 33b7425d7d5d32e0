//! Pantry API server binary.

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use pantry_api::config::ApiConfig;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "pantry_api_server", about = "Pantry API server")]
struct Args {
    /// Port to listen on (0 = use BIND_ADDR from the environment).
    #[arg(long, default_value_t = 0)]
    port: u16,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/pantry"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pantry_api=debug,pantry_core=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    // Missing required configuration aborts startup here.
    let mut config = ApiConfig::from_env()?;
    config.database_url = args.database_url.clone();
    if args.port != 0 {
        config.bind_addr = format!("127.0.0.1:{}", args.port);
    }

    info!(
        database_url = %config.database_url,
        bind_addr = %config.bind_addr,
        auth_bypass = config.auth_bypass,
        "starting pantry_api_server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    info!("running database migrations");
    pantry_api::migrate(&pool).await?;

    // Bypass mode substitutes a fixed demo identity for all auth checks;
    // create it before serving so first requests cannot race.
    let demo_user = if config.auth_bypass {
        let identity = pantry_api::services::auth::bootstrap_demo_identity(&pool).await?;
        info!(email = %identity.email, "bypass mode enabled, demo identity ready");
        Some(identity)
    } else {
        None
    };

    let state = pantry_api::AppState {
        pool,
        config: config.clone(),
        demo_user,
    };

    let app = pantry_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app).await?;

    Ok(())
}
