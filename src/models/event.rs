//! Event lifecycle status and category. Stored as lowercase text in Postgres;
//! must stay in sync with the values seeded by the frontend's filter dropdowns.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "upcoming" => Some(EventStatus::Upcoming),
            "ongoing" => Some(EventStatus::Ongoing),
            "completed" => Some(EventStatus::Completed),
            "cancelled" => Some(EventStatus::Cancelled),
            _ => None,
        }
    }

    /// Registrations are accepted for upcoming and ongoing events only.
    /// Late joins against ongoing events are intentionally allowed.
    pub fn accepts_registrations(&self) -> bool {
        matches!(self, EventStatus::Upcoming | EventStatus::Ongoing)
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Hackathon,
    Workshop,
    Seminar,
    Competition,
    Cultural,
    Sports,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Hackathon => "hackathon",
            EventCategory::Workshop => "workshop",
            EventCategory::Seminar => "seminar",
            EventCategory::Competition => "competition",
            EventCategory::Cultural => "cultural",
            EventCategory::Sports => "sports",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "hackathon" => Some(EventCategory::Hackathon),
            "workshop" => Some(EventCategory::Workshop),
            "seminar" => Some(EventCategory::Seminar),
            "competition" => Some(EventCategory::Competition),
            "cultural" => Some(EventCategory::Cultural),
            "sports" => Some(EventCategory::Sports),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
