use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smartaicopy::config::Config;
use smartaicopy::db::{create_pool, init_db, queries, AppState};
use smartaicopy::handlers;
use smartaicopy::models::CreateUser;
use smartaicopy::payments::StripeClient;
use smartaicopy::rewrite::OpenAiClient;

#[derive(Parser, Debug)]
#[command(name = "smartaicopy")]
#[command(about = "Content optimization service with pay-per-use unlocking")]
struct Cli {
    /// Seed the database with a dev user (dev mode only)
    #[arg(long)]
    seed: bool,

    /// Delete the database on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

/// Seeds the database with a dev account for manual testing.
/// Only runs in dev mode and when the database is empty.
fn seed_dev_data(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection for seeding");

    let existing = queries::get_user_by_email(&conn, "dev@smartaicopy.local")
        .expect("Failed to check for dev user");
    if existing.is_some() {
        tracing::info!("Database already has dev data, skipping seed");
        return;
    }

    let input = CreateUser {
        email: "dev@smartaicopy.local".to_string(),
        name: "Dev User".to_string(),
        password: "devpassword".to_string(),
    };
    let user = queries::create_user(&conn, &input).expect("Failed to create dev user");
    let token = queries::create_session(&conn, &user.id).expect("Failed to create dev session");

    tracing::info!("============================================");
    tracing::info!("DEV USER SEEDED");
    tracing::info!("Email: {}", user.email);
    tracing::info!("Password: devpassword");
    tracing::info!("Session token: {}", token);
    tracing::info!("============================================");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smartaicopy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }
    if config.stripe_webhook_secret.is_empty() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not set; webhook deliveries will be rejected");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");

    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState {
        db: db_pool,
        stripe: StripeClient::new(&config.stripe_secret_key, &config.stripe_webhook_secret),
        rewriter: OpenAiClient::new(&config.openai_api_key, &config.openai_model),
        base_url: config.base_url.clone(),
    };

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set SMARTAICOPY_ENV=dev)");
        } else {
            seed_dev_data(&state);
        }
    }

    let app = Router::new()
        .merge(handlers::public::router())
        .merge(handlers::webhooks::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    let db_path = config.database_path.clone();

    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!("Smartaicopy server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    if cleanup_on_exit {
        tracing::info!("Cleaning up ephemeral database...");
        if let Err(e) = std::fs::remove_file(&db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        } else {
            tracing::info!("Removed {}", db_path);
        }
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
