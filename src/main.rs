use std::sync::Arc;

use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use x402_gate::{
    config::GateConfig,
    cors::build_cors,
    gate::PaymentGate,
    ledger::PaymentLedger,
    metrics::register_metrics,
    routes,
    state::AppState,
    verifier::{FacilitatorVerifier, PaymentVerifier},
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(GateConfig::from_env().expect("Failed to load configuration"));
    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();
    let rate_limit_rpm = config.rate_limit_rpm;

    tracing::info!("Starting x402-gate on port {}", port);
    tracing::info!(
        "Treasury: {}",
        if config.treasury.is_empty() {
            "NOT SET"
        } else {
            &config.treasury
        }
    );
    tracing::info!("Network: {}", config.network);
    tracing::info!("Facilitator: {}", config.facilitator_url);

    // Optional payment ledger (audit log)
    let ledger = match config.db_path {
        Some(ref path) => match PaymentLedger::open(path) {
            Ok(ledger) => {
                tracing::info!("Payment ledger initialized at: {}", path);
                Some(ledger)
            }
            Err(e) => {
                // Degrade to no ledger rather than refuse to start
                tracing::warn!("Failed to initialize payment ledger: {}", e);
                None
            }
        },
        None => {
            tracing::info!("X402_DB_PATH not set — payment ledger disabled");
            None
        }
    };

    // Optional external verifier; absence selects manual-trust mode.
    // Fixed for the process lifetime.
    let verifier: Option<Arc<dyn PaymentVerifier>> = if config.verifier_enabled {
        tracing::info!("Verifier enabled: facilitator at {}", config.facilitator_url);
        Some(Arc::new(FacilitatorVerifier::new(&config)))
    } else {
        tracing::info!("Verifier unavailable — running in manual-trust mode");
        None
    };

    // Register Prometheus metrics
    register_metrics();

    // Create shared state
    let gate = PaymentGate::new(config.clone(), verifier, ledger);
    let state_data = web::Data::new(AppState::new(config, gate));

    // Configure rate limiter
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_minute(rate_limit_rpm as u64)
        .finish()
        .expect("Failed to create rate limiter config");

    // Start HTTP server
    HttpServer::new(move || {
        let cors = build_cors(&allowed_origins);

        App::new()
            .app_data(state_data.clone())
            .wrap(Logger::default())
            .wrap(cors)
            .wrap(Governor::new(&governor_conf))
            .configure(routes::health::configure)
            .configure(routes::status::configure)
            .configure(routes::premium::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
