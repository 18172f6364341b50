pub mod capacity;
pub mod directory;
pub mod ledger;
pub mod ml_client;
pub mod registration;
pub mod seed_data;

pub use capacity::{Admission, CapacityGuard};
pub use directory::{EventDirectory, EventSnapshot, PgEventDirectory};
pub use ledger::{PgRegistrationLedger, RegistrationLedger};
pub use ml_client::MlServiceClient;
pub use registration::RegistrationService;
