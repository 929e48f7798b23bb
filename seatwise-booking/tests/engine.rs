use std::sync::Arc;

use serde_json::Value;

use seatwise_booking::engine::{BookingEngine, ReserveRequest};
use seatwise_booking::store::BookingStore;
use seatwise_catalog::{Event, EventDraft, EventStore};
use seatwise_core::CoreError;
use seatwise_store::memory::MemoryStore;

fn request(user_id: &str, num_tickets: i64, seats: Option<Value>) -> ReserveRequest {
    ReserveRequest {
        user_id: Some(user_id.to_string()),
        num_tickets: Some(num_tickets),
        seat_numbers: seats,
    }
}

async fn engine_with_event(event_id: &str, total_seats: i64) -> (BookingEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let event = Event::from_draft(EventDraft {
        event_id: Some(event_id.to_string()),
        title: "Summer Music Festival".to_string(),
        description: None,
        venue: "Central Park".to_string(),
        date: "2025-07-15T18:00:00Z".parse().unwrap(),
        total_seats,
        price: 100.0,
        event_image: None,
        venue_image: None,
        created_by: None,
    })
    .unwrap();
    store.put_event(&event).await.unwrap();
    let engine = BookingEngine::new(store.clone(), store.clone());
    (engine, store)
}

#[tokio::test]
async fn reserve_decrements_and_persists_booking() {
    let (engine, store) = engine_with_event("1", 5).await;
    let outcome = engine
        .reserve("1", request("user-abc-123", 2, Some(serde_json::json!(["A1", "A2"]))))
        .await
        .unwrap();

    assert_eq!(outcome.remaining_seats, 3);
    assert_eq!(outcome.booking.num_tickets, 2);
    assert_eq!(outcome.booking.seat_numbers, vec!["A1", "A2"]);

    let stored = store.get_booking(&outcome.booking.booking_id).await.unwrap();
    assert!(stored.is_some());
    assert_eq!(store.get_event("1").await.unwrap().unwrap().total_seats, 3);
}

#[tokio::test]
async fn ticket_count_defaults_to_one() {
    let (engine, _) = engine_with_event("2", 5).await;
    let outcome = engine
        .reserve(
            "2",
            ReserveRequest {
                user_id: Some("user-xyz-456".to_string()),
                num_tickets: None,
                seat_numbers: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome.booking.num_tickets, 1);
    assert!(outcome.booking.seat_numbers.is_empty());
    assert_eq!(outcome.remaining_seats, 4);
}

#[tokio::test]
async fn validation_precedes_mutation() {
    let (engine, store) = engine_with_event("1", 5).await;

    // Missing user_id.
    let err = engine
        .reserve("1", ReserveRequest { user_id: None, num_tickets: Some(2), seat_numbers: None })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    // Non-positive ticket count.
    let err = engine.reserve("1", request("user-123", 0, None)).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    // Scalar seat_numbers.
    let err = engine
        .reserve("1", request("user-123", 1, Some(Value::String("A1,A2".to_string()))))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(ref msg) if msg.contains("must be a list")));

    // No mutation happened and no booking exists.
    assert_eq!(store.get_event("1").await.unwrap().unwrap().total_seats, 5);
    assert!(store.bookings_by_user("user-123").await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_event_is_not_found_insufficient_is_conflict() {
    let (engine, _) = engine_with_event("1", 3).await;

    let err = engine.reserve("999", request("user-123", 1, None)).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));

    let err = engine.reserve("1", request("user-123", 10, None)).await.unwrap_err();
    match err {
        CoreError::Conflict { requested, available } => {
            assert_eq!(requested, 10);
            assert_eq!(available, 3);
        }
        other => panic!("expected Conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn cancel_is_inverse_of_reserve() {
    let (engine, store) = engine_with_event("1", 5).await;

    let outcome = engine.reserve("1", request("cancel-user-123", 1, None)).await.unwrap();
    assert_eq!(outcome.remaining_seats, 4);

    let cancelled = engine.cancel(&outcome.booking.booking_id).await.unwrap();
    assert_eq!(cancelled.restored_seats, 1);
    assert_eq!(cancelled.updated_total_seats, 5);

    assert!(store
        .get_booking(&outcome.booking.booking_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn cancel_unknown_booking_is_not_found() {
    let (engine, _) = engine_with_event("1", 5).await;
    let err = engine.cancel("fake-booking-id").await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn cancel_keeps_booking_when_event_is_gone() {
    let (engine, store) = engine_with_event("1", 5).await;
    let outcome = engine.reserve("1", request("user-123", 2, None)).await.unwrap();

    store.delete_event("1").await.unwrap();

    let err = engine.cancel(&outcome.booking.booking_id).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound(ref what) if what.contains("associated")));

    // The booking record survives so the seats are still accounted for.
    assert!(store
        .get_booking(&outcome.booking.booking_id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn concurrent_reservations_never_oversell() {
    let (engine, store) = engine_with_event("1", 2).await;
    let engine = Arc::new(engine);

    let a = tokio::spawn({
        let engine = engine.clone();
        async move { engine.reserve("1", request("user-a", 2, None)).await }
    });
    let b = tokio::spawn({
        let engine = engine.clone();
        async move { engine.reserve("1", request("user-b", 2, None)).await }
    });

    let results = [a.await.unwrap(), b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one of two competing reservations wins");

    for result in &results {
        match result {
            Ok(outcome) => assert_eq!(outcome.remaining_seats, 0),
            Err(CoreError::Conflict { requested, available }) => {
                assert_eq!(*requested, 2);
                assert_eq!(*available, 0);
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(store.get_event("1").await.unwrap().unwrap().total_seats, 0);
}

#[tokio::test]
async fn many_concurrent_single_seat_requests_sum_to_capacity() {
    let (engine, store) = engine_with_event("1", 10).await;
    let engine = Arc::new(engine);

    let mut handles = Vec::new();
    for i in 0..25 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine.reserve("1", request(&format!("user-{i}"), 1, None)).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 10);
    let event = store.get_event("1").await.unwrap().unwrap();
    assert_eq!(event.total_seats, 0);
}

#[tokio::test]
async fn interleaved_reserve_and_cancel_balance_out() {
    let (engine, store) = engine_with_event("1", 8).await;
    let engine = Arc::new(engine);

    let first = engine.reserve("1", request("user-1", 3, None)).await.unwrap();
    let second = engine.reserve("1", request("user-2", 2, None)).await.unwrap();

    let cancel = tokio::spawn({
        let engine = engine.clone();
        let id = first.booking.booking_id.clone();
        async move { engine.cancel(&id).await }
    });
    let reserve = tokio::spawn({
        let engine = engine.clone();
        async move { engine.reserve("1", request("user-3", 1, None)).await }
    });

    cancel.await.unwrap().unwrap();
    reserve.await.unwrap().unwrap();

    // initial 8 - active reservations (2 + 1) = 5
    assert_eq!(store.get_event("1").await.unwrap().unwrap().total_seats, 5);
    drop(second);
}
