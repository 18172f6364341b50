//! Registration entries and their status lifecycle.
//! A pair (user, event) has at most one entry in `registered` state at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Registered,
    Attended,
    Cancelled,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::Attended => "attended",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "registered" => Some(RegistrationStatus::Registered),
            "attended" => Some(RegistrationStatus::Attended),
            "cancelled" => Some(RegistrationStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the registration ledger. Cancellation flips `status` to
/// `cancelled`; entries are never physically deleted once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistrationEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
}

impl RegistrationEntry {
    /// Active entries are the ones counted against an event's capacity.
    pub fn is_active(&self) -> bool {
        self.status == RegistrationStatus::Registered
    }
}
