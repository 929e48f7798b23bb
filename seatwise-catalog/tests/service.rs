use std::sync::Arc;

use seatwise_catalog::{CatalogService, EventDraft, EventStore, EventUpdate};
use seatwise_core::CoreError;
use seatwise_store::memory::MemoryStore;


fn draft(id: &str, seats: i64) -> EventDraft {
    EventDraft {
        event_id: Some(id.to_string()),
        title: "Rock Concert 2025".to_string(),
        description: None,
        venue: "National Stadium".to_string(),
        date: "2025-08-10T20:00:00Z".parse().unwrap(),
        total_seats: seats,
        price: 120.0,
        event_image: None,
        venue_image: None,
        created_by: None,
    }
}

fn service() -> CatalogService {
    CatalogService::new(Arc::new(MemoryStore::new()))
}

#[tokio::test]
async fn create_get_update_delete_round_trip() {
    let catalog = service();
    catalog.create_event(draft("1", 500)).await.unwrap();

    let event = catalog.get_event("1").await.unwrap();
    assert_eq!(event.total_seats, 500);

    let updated = catalog
        .update_event(
            "1",
            EventUpdate {
                title: Some("Rock Concert 2025 - UPDATED".to_string()),
                total_seats: Some(600),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.total_seats, 600);

    catalog.delete_event("1").await.unwrap();
    assert!(matches!(
        catalog.get_event("1").await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn metadata_update_does_not_clobber_concurrent_reservations() {
    let store = Arc::new(MemoryStore::new());
    let catalog = CatalogService::new(store.clone());
    catalog.create_event(draft("1", 5)).await.unwrap();

    // Two seats are taken while the admin edit is in flight.
    store.adjust_seats("1", -2).await.unwrap();

    let updated = catalog
        .update_event(
            "1",
            EventUpdate {
                title: Some("Rock Concert 2025 - Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Rock Concert 2025 - Renamed");
    assert_eq!(updated.total_seats, 3);
}

#[tokio::test]
async fn missing_event_is_not_found() {
    let catalog = service();
    assert!(matches!(
        catalog.get_event("999").await,
        Err(CoreError::NotFound(_))
    ));
    assert!(matches!(
        catalog.delete_event("999").await,
        Err(CoreError::NotFound(_))
    ));
    assert!(matches!(
        catalog.update_event("999", EventUpdate::default()).await,
        Err(CoreError::NotFound(_))
    ));
}
