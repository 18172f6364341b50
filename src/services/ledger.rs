//! The registration ledger: durable record of who registered for what.
//! The partial unique index on (user_id, event_id) WHERE status = 'registered'
//! is the storage-level backstop for the one-active-entry invariant; `append`
//! translates that violation into `AlreadyRegistered`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{RegistrationEntry, RegistrationStatus};

#[async_trait]
pub trait RegistrationLedger: Send + Sync {
    /// Create a new entry in `registered` state. Fails `AlreadyRegistered`
    /// when an active entry already exists for the pair.
    async fn append(&self, user_id: Uuid, event_id: Uuid) -> Result<RegistrationEntry, ApiError>;

    async fn find_active(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<RegistrationEntry>, ApiError>;

    /// All entries for a user, most recent first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<RegistrationEntry>, ApiError>;

    /// Flip an entry from `registered` to `cancelled`. Fails `NotFound` when
    /// the entry is absent or no longer active, `Forbidden` when the requester
    /// does not own it. The flip is conditional on the current status, so it
    /// succeeds at most once per entry.
    async fn cancel(
        &self,
        entry_id: Uuid,
        requester_id: Uuid,
    ) -> Result<RegistrationEntry, ApiError>;
}

pub struct PgRegistrationLedger {
    pool: Arc<PgPool>,
}

impl PgRegistrationLedger {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn entry_from_row(
    (id, user_id, event_id, status, registered_at): (Uuid, Uuid, Uuid, String, DateTime<Utc>),
) -> Result<RegistrationEntry, ApiError> {
    let status = RegistrationStatus::from_str(&status)
        .ok_or_else(|| anyhow::anyhow!("Unknown registration status in storage: {}", status))?;
    Ok(RegistrationEntry {
        id,
        user_id,
        event_id,
        status,
        registered_at,
    })
}

#[async_trait]
impl RegistrationLedger for PgRegistrationLedger {
    async fn append(&self, user_id: Uuid, event_id: Uuid) -> Result<RegistrationEntry, ApiError> {
        let entry_id = Uuid::new_v4();
        let registered_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO registrations (id, user_id, event_id, status, registered_at) \
             VALUES ($1, $2, $3, 'registered', $4)",
        )
        .bind(entry_id)
        .bind(user_id)
        .bind(event_id)
        .bind(registered_at)
        .execute(&*self.pool)
        .await;

        match result {
            Ok(_) => Ok(RegistrationEntry {
                id: entry_id,
                user_id,
                event_id,
                status: RegistrationStatus::Registered,
                registered_at,
            }),
            Err(sqlx::Error::Database(db_err))
                if db_err.constraint() == Some("registrations_active_unique") =>
            {
                Err(ApiError::AlreadyRegistered)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_active(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<RegistrationEntry>, ApiError> {
        let row = sqlx::query_as::<_, (Uuid, Uuid, Uuid, String, DateTime<Utc>)>(
            "SELECT id, user_id, event_id, status, registered_at FROM registrations \
             WHERE user_id = $1 AND event_id = $2 AND status = 'registered'",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&*self.pool)
        .await?;

        row.map(entry_from_row).transpose()
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<RegistrationEntry>, ApiError> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid, Uuid, String, DateTime<Utc>)>(
            "SELECT id, user_id, event_id, status, registered_at FROM registrations \
             WHERE user_id = $1 ORDER BY registered_at DESC",
        )
        .bind(user_id)
        .fetch_all(&*self.pool)
        .await?;

        rows.into_iter().map(entry_from_row).collect()
    }

    async fn cancel(
        &self,
        entry_id: Uuid,
        requester_id: Uuid,
    ) -> Result<RegistrationEntry, ApiError> {
        let row = sqlx::query_as::<_, (Uuid, Uuid, DateTime<Utc>)>(
            "SELECT user_id, event_id, registered_at FROM registrations WHERE id = $1",
        )
        .bind(entry_id)
        .fetch_optional(&*self.pool)
        .await?;

        let (user_id, event_id, registered_at) = match row {
            Some(r) => r,
            None => return Err(ApiError::NotFound),
        };

        if user_id != requester_id {
            return Err(ApiError::Forbidden);
        }

        // Conditional flip: zero rows means the entry was already cancelled
        // (or attended), including by a racing cancel of the same entry.
        let result = sqlx::query(
            "UPDATE registrations SET status = 'cancelled' \
             WHERE id = $1 AND status = 'registered'",
        )
        .bind(entry_id)
        .execute(&*self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound);
        }

        Ok(RegistrationEntry {
            id: entry_id,
            user_id,
            event_id,
            status: RegistrationStatus::Cancelled,
            registered_at,
        })
    }
}
