use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use seatwise_core::{CoreError, CoreResult};

/// A ticketed event in the catalog.
///
/// `total_seats` is the live remaining-seat counter. It may only be changed
/// through the store's atomic conditional adjustment (reservation and
/// cancellation) or an admin overwrite; it is never negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub title: String,
    pub description: Option<String>,
    pub venue: String,
    pub date: DateTime<Utc>,
    pub total_seats: i64,
    pub price: f64,
    pub event_image: Option<String>,
    pub venue_image: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Incoming payload for event creation. `event_id` may be supplied by the
/// caller (test fixtures use short ids); otherwise a fresh UUID is assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDraft {
    pub event_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub venue: String,
    pub date: DateTime<Utc>,
    pub total_seats: i64,
    pub price: f64,
    pub event_image: Option<String>,
    pub venue_image: Option<String>,
    pub created_by: Option<String>,
}

/// Admin update: a field overwrite of the allowed set. Absent fields keep
/// their current value; `event_id`, `created_by` and `created_at` are fixed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub venue: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub total_seats: Option<i64>,
    pub price: Option<f64>,
    pub event_image: Option<String>,
    pub venue_image: Option<String>,
}

impl Event {
    /// Build a validated event from a draft. Invariants: non-empty title and
    /// venue, `total_seats >= 0`, finite non-negative price.
    pub fn from_draft(draft: EventDraft) -> CoreResult<Self> {
        if draft.title.trim().is_empty() {
            return Err(CoreError::Validation("title must not be empty".to_string()));
        }
        if draft.venue.trim().is_empty() {
            return Err(CoreError::Validation("venue must not be empty".to_string()));
        }
        if draft.total_seats < 0 {
            return Err(CoreError::Validation(
                "total_seats must be non-negative".to_string(),
            ));
        }
        if !draft.price.is_finite() || draft.price < 0.0 {
            return Err(CoreError::Validation("price must be a non-negative number".to_string()));
        }

        Ok(Self {
            event_id: draft.event_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: draft.title,
            description: draft.description,
            venue: draft.venue,
            date: draft.date,
            total_seats: draft.total_seats,
            price: draft.price,
            event_image: draft.event_image,
            venue_image: draft.venue_image,
            created_by: draft.created_by,
            created_at: Utc::now(),
        })
    }

    /// Apply an admin field overwrite, re-checking the seat/price invariants.
    /// Validation runs before any field is touched, so a rejected update
    /// leaves the event unchanged.
    pub fn apply_update(&mut self, update: EventUpdate) -> CoreResult<()> {
        if matches!(update.total_seats, Some(seats) if seats < 0) {
            return Err(CoreError::Validation(
                "total_seats must be non-negative".to_string(),
            ));
        }
        if matches!(update.price, Some(price) if !price.is_finite() || price < 0.0) {
            return Err(CoreError::Validation("price must be a non-negative number".to_string()));
        }
        if matches!(&update.title, Some(title) if title.trim().is_empty()) {
            return Err(CoreError::Validation("title must not be empty".to_string()));
        }
        if matches!(&update.venue, Some(venue) if venue.trim().is_empty()) {
            return Err(CoreError::Validation("venue must not be empty".to_string()));
        }

        if let Some(seats) = update.total_seats {
            self.total_seats = seats;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(venue) = update.venue {
            self.venue = venue;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(image) = update.event_image {
            self.event_image = Some(image);
        }
        if let Some(image) = update.venue_image {
            self.venue_image = Some(image);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(total_seats: i64, price: f64) -> EventDraft {
        EventDraft {
            event_id: None,
            title: "Jazz Night 2025".to_string(),
            description: Some("An evening of smooth jazz".to_string()),
            venue: "The Esplanade".to_string(),
            date: "2025-11-15T19:00:00Z".parse().unwrap(),
            total_seats,
            price,
            event_image: None,
            venue_image: None,
            created_by: Some("admin-123".to_string()),
        }
    }

    #[test]
    fn draft_builds_event_with_generated_id() {
        let event = Event::from_draft(draft(200, 150.0)).unwrap();
        assert_eq!(event.total_seats, 200);
        assert!(!event.event_id.is_empty());
    }

    #[test]
    fn negative_seats_rejected() {
        assert!(Event::from_draft(draft(-1, 150.0)).is_err());
    }

    #[test]
    fn non_finite_price_rejected() {
        assert!(Event::from_draft(draft(10, f64::NAN)).is_err());
        assert!(Event::from_draft(draft(10, -0.5)).is_err());
    }

    #[test]
    fn update_overwrites_allowed_fields_only() {
        let mut event = Event::from_draft(draft(200, 150.0)).unwrap();
        let created_at = event.created_at;
        event
            .apply_update(EventUpdate {
                title: Some("Jazz Night 2025 - UPDATED".to_string()),
                total_seats: Some(600),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(event.title, "Jazz Night 2025 - UPDATED");
        assert_eq!(event.total_seats, 600);
        assert_eq!(event.created_at, created_at);
    }

    #[test]
    fn update_rejects_negative_seats_without_mutating() {
        let mut event = Event::from_draft(draft(200, 150.0)).unwrap();
        let result = event.apply_update(EventUpdate {
            total_seats: Some(-5),
            ..Default::default()
        });
        assert!(result.is_err());
        assert_eq!(event.total_seats, 200);
    }
}
