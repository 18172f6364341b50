//! Shared types: roles, event/registration enums, ID aliases. Use date types (chrono) for timestamps.

pub mod event;
pub mod ids;
pub mod registration;
pub mod user;

pub use event::{EventCategory, EventStatus};
pub use ids::{EventId, RegistrationId, UserId};
pub use registration::{RegistrationEntry, RegistrationStatus};
pub use user::Role;
