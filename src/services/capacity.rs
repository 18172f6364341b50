//! Capacity guard: the admission protocol over the directory's atomic counter.
//! It holds no state of its own; the shared `registered_count` is the only
//! authority on remaining capacity.

use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::directory::EventDirectory;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Rejected,
}

pub struct CapacityGuard {
    directory: Arc<dyn EventDirectory>,
}

impl CapacityGuard {
    pub fn new(directory: Arc<dyn EventDirectory>) -> Self {
        Self { directory }
    }

    /// Try to reserve one unit of capacity. Events without a participant
    /// limit always admit; bounded events admit only while the guarded
    /// increment succeeds.
    pub async fn try_reserve(&self, event_id: Uuid) -> Result<Admission, ApiError> {
        if self.directory.adjust_active_count(event_id, 1).await? {
            Ok(Admission::Admitted)
        } else {
            Ok(Admission::Rejected)
        }
    }

    /// Return one previously reserved unit. The decrement is floored at zero;
    /// a release that finds the counter already at the floor indicates a
    /// bookkeeping bug elsewhere and is logged rather than ignored.
    pub async fn release(&self, event_id: Uuid) -> Result<(), ApiError> {
        let applied = self.directory.adjust_active_count(event_id, -1).await?;
        if !applied {
            tracing::warn!(
                "Capacity release for event {} had no effect; counter already at zero",
                event_id
            );
        }
        Ok(())
    }
}
