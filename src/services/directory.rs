//! Read view of event status/capacity plus the one atomic write primitive the
//! capacity guard is built on. The `registered_count` column is the
//! authoritative active-registration counter; nothing outside this module
//! writes it.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::EventStatus;

/// The slice of an event the registration core is allowed to see.
#[derive(Clone, Copy, Debug)]
pub struct EventSnapshot {
    pub id: Uuid,
    pub status: EventStatus,
    pub max_participants: Option<i32>,
    pub registered_count: i32,
}

#[async_trait]
pub trait EventDirectory: Send + Sync {
    async fn get_event(&self, event_id: Uuid) -> Result<Option<EventSnapshot>, ApiError>;

    /// Atomically apply `delta` to the event's active-registration counter.
    /// Returns false when the guarded update refuses: incrementing past
    /// `max_participants`, decrementing below zero, or an unknown event.
    async fn adjust_active_count(&self, event_id: Uuid, delta: i32) -> Result<bool, ApiError>;
}

pub struct PgEventDirectory {
    pool: Arc<PgPool>,
}

impl PgEventDirectory {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventDirectory for PgEventDirectory {
    async fn get_event(&self, event_id: Uuid) -> Result<Option<EventSnapshot>, ApiError> {
        let row = sqlx::query_as::<_, (Uuid, String, Option<i32>, i32)>(
            "SELECT id, status, max_participants, registered_count FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&*self.pool)
        .await?;

        match row {
            None => Ok(None),
            Some((id, status, max_participants, registered_count)) => {
                let status = EventStatus::from_str(&status)
                    .ok_or_else(|| anyhow::anyhow!("Unknown event status in storage: {}", status))?;
                Ok(Some(EventSnapshot {
                    id,
                    status,
                    max_participants,
                    registered_count,
                }))
            }
        }
    }

    async fn adjust_active_count(&self, event_id: Uuid, delta: i32) -> Result<bool, ApiError> {
        // Single guarded UPDATE: the capacity check and the increment are one
        // statement, so concurrent registrations can never jointly overshoot.
        let result = if delta >= 0 {
            sqlx::query(
                "UPDATE events SET registered_count = registered_count + $2 \
                 WHERE id = $1 \
                 AND (max_participants IS NULL OR registered_count + $2 <= max_participants)",
            )
        } else {
            sqlx::query(
                "UPDATE events SET registered_count = registered_count + $2 \
                 WHERE id = $1 AND registered_count + $2 >= 0",
            )
        }
        .bind(event_id)
        .bind(delta)
        .execute(&*self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
