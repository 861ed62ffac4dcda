use actix_web::{App, HttpServer, middleware::Logger, web};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use invoicer::{
  adapters::http::{
    InvoiceRouteDependencies, RequestIdMiddleware, configure_health_routes,
    configure_invoice_routes,
  },
  domain::invoice::{InvoiceRepository, InvoiceService, InvoiceServiceConfig},
  infrastructure::{
    config::{Config, DatabaseBackend, DatabaseConfig},
    persistence::{memory::InMemoryInvoiceRepository, postgres::PostgresInvoiceRepository},
  },
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  // Initialize tracing subscriber for logging
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "invoicer=debug,actix_web=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting invoicer");

  // Load configuration
  let config = Config::load().map_err(|e| {
    tracing::error!("Failed to load configuration: {}", e);
    std::io::Error::new(
      std::io::ErrorKind::InvalidInput,
      format!("Invalid configuration: {}", e),
    )
  })?;
  tracing::info!("Configuration loaded successfully");

  let (invoice_repo, db_pool): (Arc<dyn InvoiceRepository>, Option<PgPool>) =
    match config.database.backend {
      DatabaseBackend::Postgres => {
        let pool = connect_database(&config.database).await?;
        (
          Arc::new(PostgresInvoiceRepository::new(pool.clone())),
          Some(pool),
        )
      }
      DatabaseBackend::Memory => {
        tracing::warn!("Using in-memory invoice store; data is lost on shutdown");
        (Arc::new(InMemoryInvoiceRepository::new()), None)
      }
    };

  let invoice_service = Arc::new(InvoiceService::new(
    invoice_repo,
    InvoiceServiceConfig::from(&config.listing),
  ));
  let invoice_routes = InvoiceRouteDependencies::new(invoice_service);

  let server_host = config.server.host.clone();
  let server_port = config.server.port;

  tracing::info!("Starting HTTP server on {}:{}", server_host, server_port);

  HttpServer::new(move || {
    let invoice_routes = invoice_routes.clone();
    App::new()
      .wrap(RequestIdMiddleware::new())
      .wrap(Logger::default())
      .service(
        web::scope("/invoices").configure(|cfg| configure_invoice_routes(cfg, invoice_routes)),
      )
      .configure(configure_health_routes)
  })
  .bind((server_host.as_str(), server_port))?
  .run()
  .await?;

  if let Some(pool) = db_pool {
    tracing::info!("Closing database connections");
    pool.close().await;
  }

  tracing::info!("Shutdown complete");
  Ok(())
}

/// Opens the connection pool and applies pending migrations
async fn connect_database(database: &DatabaseConfig) -> std::io::Result<PgPool> {
  tracing::info!("Connecting to database");

  let pool = tokio::time::timeout(
    Duration::from_secs(database.connect_timeout_seconds),
    PgPoolOptions::new()
      .max_connections(database.max_connections)
      .acquire_timeout(Duration::from_secs(database.acquire_timeout_seconds))
      .connect(&database.url),
  )
  .await
  .map_err(|_| {
    tracing::error!(
      "Database connection timed out after {} seconds. Is PostgreSQL running?",
      database.connect_timeout_seconds
    );
    std::io::Error::new(
      std::io::ErrorKind::TimedOut,
      format!(
        "Database connection timed out after {} seconds",
        database.connect_timeout_seconds
      ),
    )
  })?
  .map_err(|e| {
    tracing::error!("Failed to connect to database: {}", e);
    match e {
      sqlx::Error::Io(_) => std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "Could not connect to database. Is PostgreSQL running?",
      ),
      _ => std::io::Error::other(format!("Database error: {}", e)),
    }
  })?;

  tracing::info!("Database connection pool created");

  // Run database migrations
  tracing::info!("Running database migrations");
  sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
    tracing::error!("Failed to run database migrations: {}", e);
    std::io::Error::other(format!("Migration error: {}", e))
  })?;
  tracing::info!("Database migrations completed");

  Ok(pool)
}
