//! Registration service: the one owner of entry creation and cancellation.
//! Collaborators are injected so the whole flow can run against in-memory
//! doubles in tests.

use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::RegistrationEntry;
use crate::services::capacity::{Admission, CapacityGuard};
use crate::services::directory::EventDirectory;
use crate::services::ledger::RegistrationLedger;

pub struct RegistrationService {
    ledger: Arc<dyn RegistrationLedger>,
    directory: Arc<dyn EventDirectory>,
    guard: CapacityGuard,
}

impl RegistrationService {
    pub fn new(ledger: Arc<dyn RegistrationLedger>, directory: Arc<dyn EventDirectory>) -> Self {
        let guard = CapacityGuard::new(directory.clone());
        Self {
            ledger,
            directory,
            guard,
        }
    }

    /// Register `user_id` for `event_id`.
    ///
    /// The capacity reservation and the counter increment are one guarded
    /// statement inside the directory, so concurrent calls can never jointly
    /// exceed the limit. Anything that fails after the reservation releases
    /// it again; capacity is never silently lost.
    pub async fn register(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> Result<RegistrationEntry, ApiError> {
        let event = self
            .directory
            .get_event(event_id)
            .await?
            .ok_or(ApiError::EventNotFound)?;

        if !event.status.accepts_registrations() {
            return Err(ApiError::EventNotOpen);
        }

        if self.ledger.find_active(user_id, event_id).await?.is_some() {
            return Err(ApiError::AlreadyRegistered);
        }

        match self.guard.try_reserve(event_id).await? {
            Admission::Admitted => {}
            Admission::Rejected => return Err(ApiError::EventFull),
        }

        match self.ledger.append(user_id, event_id).await {
            Ok(entry) => Ok(entry),
            Err(err) => {
                // Compensate: the append did not land (duplicate race or
                // storage failure), so the reserved unit goes back.
                if let Err(release_err) = self.guard.release(event_id).await {
                    tracing::error!(
                        "Failed to release reservation for event {}: {:?}",
                        event_id,
                        release_err
                    );
                }
                Err(err)
            }
        }
    }

    /// Cancel a registration entry owned by `requester_id` and release its
    /// unit of capacity. The ledger flip succeeds at most once per entry, so
    /// a unit can never be released twice.
    pub async fn cancel(
        &self,
        entry_id: Uuid,
        requester_id: Uuid,
    ) -> Result<RegistrationEntry, ApiError> {
        let entry = self.ledger.cancel(entry_id, requester_id).await?;
        self.guard.release(entry.event_id).await?;
        Ok(entry)
    }

    pub async fn list_mine(&self, user_id: Uuid) -> Result<Vec<RegistrationEntry>, ApiError> {
        self.ledger.list_by_user(user_id).await
    }
}
