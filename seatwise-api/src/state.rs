use std::sync::Arc;

use seatwise_booking::BookingEngine;
use seatwise_catalog::CatalogService;
use seatwise_core::identity::TokenVerifier;
use seatwise_orch::{Coordinator, SagaDeps, StatusTracker};
use seatwise_payment::PaymentService;

use crate::proxy::ProxyTargets;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub engine: Arc<BookingEngine>,
    pub payments: Arc<PaymentService>,
    pub coordinator: Coordinator,
    pub tracker: StatusTracker,
    pub saga: SagaDeps,
    /// Absent when no signing secret is configured: the permissive dev mode
    /// where requests carry no verified identity.
    pub verifier: Option<Arc<dyn TokenVerifier>>,
    pub proxy: ProxyTargets,
}
