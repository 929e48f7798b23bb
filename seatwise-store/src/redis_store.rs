use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use seatwise_booking::models::Booking;
use seatwise_booking::store::BookingStore;
use seatwise_catalog::event::Event;
use seatwise_catalog::store::{EventStore, SeatAdjustment};
use seatwise_core::{CoreError, CoreResult};
use seatwise_orch::status::{StatusRecord, StatusStore};
use seatwise_payment::models::PaymentRecord;
use seatwise_payment::store::PaymentStore;

fn store_err(err: redis::RedisError) -> CoreError {
    CoreError::Internal(format!("redis error: {err}"))
}

fn encode<T: Serialize>(value: &T) -> CoreResult<String> {
    serde_json::to_string(value)
        .map_err(|err| CoreError::Internal(format!("failed to encode record: {err}")))
}

fn decode<T: DeserializeOwned>(raw: &str) -> CoreResult<T> {
    serde_json::from_str(raw)
        .map_err(|err| CoreError::Internal(format!("failed to decode record: {err}")))
}

/// Redis backend for all store contracts. Records are JSON strings; the seat
/// count lives in its own plain integer key so the conditional adjustment can
/// run as a single Lua script on the server.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
}

const EVENT_INDEX: &str = "events:index";

fn event_key(event_id: &str) -> String {
    format!("event:{event_id}")
}

fn seats_key(event_id: &str) -> String {
    format!("event:{event_id}:seats")
}

fn booking_key(booking_id: &str) -> String {
    format!("booking:{booking_id}")
}

fn user_bookings_key(user_id: &str) -> String {
    format!("user:{user_id}:bookings")
}

fn payment_key(payment_id: &str) -> String {
    format!("payment:{payment_id}")
}

fn payment_booking_key(booking_id: &str) -> String {
    format!("payment:booking:{booking_id}")
}

fn status_key(request_id: &str) -> String {
    format!("status:{request_id}")
}

impl RedisStore {
    pub fn new(connection_string: &str) -> CoreResult<Self> {
        let client = redis::Client::open(connection_string).map_err(store_err)?;
        Ok(Self { client })
    }

    async fn conn(&self) -> CoreResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(store_err)
    }
}

#[async_trait]
impl EventStore for RedisStore {
    async fn put_event(&self, event: &Event) -> CoreResult<()> {
        let mut conn = self.conn().await?;
        // SETNX on the counter key: a rewrite of the JSON record must not
        // touch a live counter, only initialize a missing one.
        redis::pipe()
            .atomic()
            .set(event_key(&event.event_id), encode(event)?)
            .set_nx(seats_key(&event.event_id), event.total_seats)
            .sadd(EVENT_INDEX, &event.event_id)
            .query_async::<()>(&mut conn)
            .await
            .map_err(store_err)?;
        debug!(event_id = %event.event_id, "event stored");
        Ok(())
    }

    async fn get_event(&self, event_id: &str) -> CoreResult<Option<Event>> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn.get(event_key(event_id)).await.map_err(store_err)?;
        let Some(raw) = raw else { return Ok(None) };
        let mut event: Event = decode(&raw)?;

        // The counter key is the live seat count; the JSON copy goes stale
        // between adjustments.
        let seats: Option<i64> = conn.get(seats_key(event_id)).await.map_err(store_err)?;
        if let Some(seats) = seats {
            event.total_seats = seats;
        }
        Ok(Some(event))
    }

    async fn list_events(&self) -> CoreResult<Vec<Event>> {
        let mut conn = self.conn().await?;
        let mut ids: Vec<String> = conn.smembers(EVENT_INDEX).await.map_err(store_err)?;
        ids.sort();

        let mut events = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(event) = self.get_event(&id).await? {
                events.push(event);
            }
        }
        Ok(events)
    }

    async fn delete_event(&self, event_id: &str) -> CoreResult<bool> {
        let mut conn = self.conn().await?;
        let (removed, _, _): (i64, i64, i64) = redis::pipe()
            .atomic()
            .del(event_key(event_id))
            .del(seats_key(event_id))
            .srem(EVENT_INDEX, event_id)
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(removed > 0)
    }

    async fn adjust_seats(&self, event_id: &str, delta: i64) -> CoreResult<SeatAdjustment> {
        let mut conn = self.conn().await?;
        // Apply the delta only when the key exists and the result stays
        // non-negative, in one server-side step.
        let script = redis::Script::new(
            r#"
            local current = redis.call("GET", KEYS[1])
            if not current then
                return false
            end
            local next = tonumber(current) + tonumber(ARGV[1])
            if next < 0 then
                return false
            end
            redis.call("SET", KEYS[1], next)
            return next
            "#,
        );

        let result: Option<i64> = script
            .key(seats_key(event_id))
            .arg(delta)
            .invoke_async(&mut conn)
            .await
            .map_err(store_err)?;

        Ok(match result {
            Some(total_seats) => SeatAdjustment::Applied { total_seats },
            None => SeatAdjustment::ConditionFailed,
        })
    }

    async fn set_seats(&self, event_id: &str, total_seats: i64) -> CoreResult<bool> {
        let mut conn = self.conn().await?;
        // Overwrite only when the counter exists, in one server-side step.
        let script = redis::Script::new(
            r#"
            if redis.call("EXISTS", KEYS[1]) == 0 then
                return false
            end
            redis.call("SET", KEYS[1], ARGV[1])
            return true
            "#,
        );

        let applied: bool = script
            .key(seats_key(event_id))
            .arg(total_seats)
            .invoke_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(applied)
    }
}

#[async_trait]
impl BookingStore for RedisStore {
    async fn put_booking(&self, booking: &Booking) -> CoreResult<()> {
        let mut conn = self.conn().await?;
        redis::pipe()
            .atomic()
            .set(booking_key(&booking.booking_id), encode(booking)?)
            .sadd(user_bookings_key(&booking.user_id), &booking.booking_id)
            .query_async::<()>(&mut conn)
            .await
            .map_err(store_err)
    }

    async fn get_booking(&self, booking_id: &str) -> CoreResult<Option<Booking>> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn.get(booking_key(booking_id)).await.map_err(store_err)?;
        raw.as_deref().map(decode).transpose()
    }

    async fn delete_booking(&self, booking_id: &str) -> CoreResult<()> {
        let Some(booking) = self.get_booking(booking_id).await? else {
            return Ok(());
        };
        let mut conn = self.conn().await?;
        redis::pipe()
            .atomic()
            .del(booking_key(booking_id))
            .srem(user_bookings_key(&booking.user_id), booking_id)
            .query_async::<()>(&mut conn)
            .await
            .map_err(store_err)
    }

    async fn bookings_by_user(&self, user_id: &str) -> CoreResult<Vec<Booking>> {
        let mut conn = self.conn().await?;
        let ids: Vec<String> = conn
            .smembers(user_bookings_key(user_id))
            .await
            .map_err(store_err)?;

        let mut bookings = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(booking) = self.get_booking(&id).await? {
                bookings.push(booking);
            }
        }
        bookings.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(bookings)
    }
}

#[async_trait]
impl PaymentStore for RedisStore {
    async fn put_payment(&self, record: &PaymentRecord) -> CoreResult<()> {
        let mut conn = self.conn().await?;
        redis::pipe()
            .atomic()
            .set(payment_key(&record.payment_id), encode(record)?)
            .set(payment_booking_key(&record.booking_id), &record.payment_id)
            .query_async::<()>(&mut conn)
            .await
            .map_err(store_err)
    }

    async fn get_payment(&self, payment_id: &str) -> CoreResult<Option<PaymentRecord>> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn.get(payment_key(payment_id)).await.map_err(store_err)?;
        raw.as_deref().map(decode).transpose()
    }

    async fn payment_for_booking(&self, booking_id: &str) -> CoreResult<Option<PaymentRecord>> {
        let mut conn = self.conn().await?;
        let payment_id: Option<String> = conn
            .get(payment_booking_key(booking_id))
            .await
            .map_err(store_err)?;
        match payment_id {
            Some(id) => self.get_payment(&id).await,
            None => Ok(None),
        }
    }

    async fn delete_for_booking(&self, booking_id: &str) -> CoreResult<bool> {
        let mut conn = self.conn().await?;
        let payment_id: Option<String> = conn
            .get(payment_booking_key(booking_id))
            .await
            .map_err(store_err)?;
        let Some(payment_id) = payment_id else {
            return Ok(false);
        };
        redis::pipe()
            .atomic()
            .del(payment_key(&payment_id))
            .del(payment_booking_key(booking_id))
            .query_async::<()>(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(true)
    }
}

#[async_trait]
impl StatusStore for RedisStore {
    async fn put_status(&self, record: &StatusRecord) -> CoreResult<()> {
        let mut conn = self.conn().await?;
        conn.set::<_, _, ()>(status_key(&record.request_id), encode(record)?)
            .await
            .map_err(store_err)
    }

    async fn get_status(&self, request_id: &str) -> CoreResult<Option<StatusRecord>> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn.get(status_key(request_id)).await.map_err(store_err)?;
        raw.as_deref().map(decode).transpose()
    }
}
