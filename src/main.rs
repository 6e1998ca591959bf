use actix_web::{web, App, HttpResponse, HttpServer};
use paykesh::config::Config;
use paykesh::modules::ledger::repositories::LedgerStore;
use paykesh::modules::ledger::services::FundsService;
use paykesh::modules::notifications::{LogNotifier, Notifier};
use paykesh::modules::payroll::services::PayrollCalculator;
use paykesh::modules::providers::services::{IntaSendClient, PaymentProvider};
use paykesh::modules::reconciliation::services::ReconciliationSweeper;
use paykesh::modules::taxes::services::TaxConfigRegistry;
use paykesh::modules::webhooks::services::WebhookIngestor;
use paykesh::modules::{ledger, payroll, taxes, webhooks};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paykesh=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting Paykesh payroll settlement engine");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Tax rules
    let registry = Arc::new(TaxConfigRegistry::new());
    registry.seed_defaults()?;
    let calculator = PayrollCalculator::new(registry.clone());

    // Settlement core
    let store = Arc::new(LedgerStore::new());
    let provider: Arc<dyn PaymentProvider> = Arc::new(IntaSendClient::new(&config.provider));
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let funds = Arc::new(FundsService::new(
        store.clone(),
        provider.clone(),
        notifier,
    ));
    let ingestor = WebhookIngestor::new(config.provider.webhook_secret.clone(), funds.clone());

    // Safety net for lost webhooks
    let sweeper = Arc::new(ReconciliationSweeper::new(
        store.clone(),
        provider.clone(),
        funds.clone(),
        &config.settlement,
    ));
    tokio::spawn(sweeper.start());

    let registry_data = web::Data::from(registry);
    let calculator_data = web::Data::new(calculator);
    let funds_data = web::Data::from(funds);
    let ingestor_data = web::Data::new(ingestor);

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(registry_data.clone())
            .app_data(calculator_data.clone())
            .app_data(funds_data.clone())
            .app_data(ingestor_data.clone())
            .route("/health", web::get().to(health_check))
            .configure(taxes::controllers::configure)
            .configure(payroll::controllers::configure)
            .configure(ledger::controllers::configure)
            .configure(webhooks::controllers::configure)
    })
    .workers(config.server.workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await?;
    Ok(())
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "paykesh"
    }))
}
