use std::sync::Arc;

use seatwise_core::CoreError;
use seatwise_orch::saga::SagaRequest;
use seatwise_orch::status::{RequestState, StatusTracker};
use seatwise_orch::Coordinator;
use seatwise_store::memory::{MemoryQueue, MemoryStore};


fn request(event_id: &str, user_id: &str) -> SagaRequest {
    SagaRequest {
        request_id: String::new(),
        event_id: event_id.to_string(),
        user_id: user_id.to_string(),
        num_tickets: 1,
        amount: 50.0,
        currency: "USD".to_string(),
        seat_numbers: None,
        email: None,
        phone_number: None,
    }
}

#[tokio::test]
async fn enqueue_assigns_id_and_marks_queued() {
    let queue = Arc::new(MemoryQueue::new());
    let tracker = StatusTracker::new(Arc::new(MemoryStore::new()));
    let coordinator = Coordinator::new(queue.clone(), tracker.clone());

    let accepted = coordinator.enqueue(request("ev-1", "user-1")).await.unwrap();
    assert!(!accepted.request_id.is_empty());
    assert_eq!(accepted.status, "queued");
    assert_eq!(
        tracker.get(&accepted.request_id).await.unwrap().status,
        RequestState::Queued
    );
    assert_eq!(queue.len().await, 1);
}

#[tokio::test]
async fn caller_supplied_request_id_is_kept() {
    let queue = Arc::new(MemoryQueue::new());
    let tracker = StatusTracker::new(Arc::new(MemoryStore::new()));
    let coordinator = Coordinator::new(queue, tracker);

    let mut req = request("ev-1", "user-1");
    req.request_id = "client-chosen-id".to_string();
    let accepted = coordinator.enqueue(req).await.unwrap();
    assert_eq!(accepted.request_id, "client-chosen-id");
}

#[tokio::test]
async fn enqueue_rejects_missing_fields() {
    let coordinator = Coordinator::new(
        Arc::new(MemoryQueue::new()),
        StatusTracker::new(Arc::new(MemoryStore::new())),
    );

    let err = coordinator.enqueue(request("", "user-1")).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    let err = coordinator.enqueue(request("ev-1", " ")).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    let mut req = request("ev-1", "user-1");
    req.num_tickets = 0;
    let err = coordinator.enqueue(req).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}
