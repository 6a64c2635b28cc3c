use actix_web::{web, App, HttpServer, middleware};
use invoice_renderer::api::{ApiState, AppConfig, configure_routes};
use invoice_renderer::metrics;
use invoice_renderer::models::PaymentConfig;
use tracing_subscriber::EnvFilter;
use std::env;
use std::path::PathBuf;
use anyhow::Result;

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    tracing::info!("Starting Invoice Renderer API");

    // Initialize Prometheus metrics
    prometheus::default_registry()
        .register(Box::new(prometheus::process_collector::ProcessCollector::for_self()))?;
    metrics::init();

    // Load configuration
    let config = load_config()?;
    tracing::info!(upload_dir = %config.upload_dir.display(), "Upload staging ready");

    // Initialize application state
    let state = web::Data::new(ApiState::new(config).await?);

    // Get server settings
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()?;

    tracing::info!("Starting server on {}:{}", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}

fn load_config() -> Result<AppConfig> {
    let defaults = AppConfig::default();

    let config = AppConfig {
        upload_dir: env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_dir),
        compress_pdf: env::var("COMPRESS_PDF")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true),
        payments: PaymentConfig::standard(
            env::var("PAYPAL_LINK").ok(),
            env::var("VENMO_HANDLE").ok(),
            env::var("ZELLE_EMAIL").ok(),
            env::var("CASHAPP_HANDLE").ok(),
        ),
    };

    Ok(config)
}
