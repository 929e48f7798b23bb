use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seatwise_api::middleware::auth::JwtVerifier;
use seatwise_api::proxy::ProxyTargets;
use seatwise_api::{app, AppState};
use seatwise_booking::BookingEngine;
use seatwise_catalog::CatalogService;
use seatwise_core::identity::TokenVerifier;
use seatwise_orch::{
    Coordinator, HttpBookingClient, HttpNotifier, HttpPaymentClient, LogNotifier, Notifier,
    SagaDeps, StatusTracker, Worker,
};
use seatwise_payment::{MockProcessor, PaymentService};
use seatwise_store::{KafkaJobSource, KafkaQueue, RedisStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seatwise_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = seatwise_store::app_config::Config::load()?;
    tracing::info!("Starting Seatwise API on port {}", config.server.port);

    let store = Arc::new(RedisStore::new(&config.redis.url)?);
    let queue = Arc::new(KafkaQueue::new(&config.kafka.brokers, &config.kafka.topic)?);

    let catalog = Arc::new(CatalogService::new(store.clone()));
    let engine = Arc::new(BookingEngine::new(store.clone(), store.clone()));
    let payments = Arc::new(PaymentService::new(
        Arc::new(MockProcessor::new()),
        store.clone(),
    ));

    let tracker = StatusTracker::new(store.clone());
    let coordinator = Coordinator::new(queue, tracker.clone());

    let notifier: Arc<dyn Notifier> = match &config.services.notification_url {
        Some(url) => Arc::new(HttpNotifier::new(url)?),
        None => Arc::new(LogNotifier),
    };
    let saga = SagaDeps {
        booking: Arc::new(HttpBookingClient::new(&config.services.booking_url)?),
        payment: Arc::new(HttpPaymentClient::new(&config.services.payment_url)?),
        notifier,
    };

    let verifier: Option<Arc<dyn TokenVerifier>> = config
        .auth
        .jwt_secret
        .as_deref()
        .map(|secret| Arc::new(JwtVerifier::new(secret)) as Arc<dyn TokenVerifier>);
    if verifier.is_none() {
        tracing::warn!("no jwt_secret configured, running without identity verification");
    }

    let state = AppState {
        catalog,
        engine,
        payments,
        coordinator,
        tracker: tracker.clone(),
        saga: saga.clone(),
        verifier,
        proxy: ProxyTargets::new(&config.services)?,
    };

    if config.worker.enabled {
        let source = Arc::new(KafkaJobSource::new(
            &config.kafka.brokers,
            &config.kafka.topic,
            &config.kafka.group_id,
        )?);
        let worker = Worker::new(source, saga, tracker, config.worker.max_attempts);
        tokio::spawn(async move { worker.run().await });
    }

    let app = app(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
