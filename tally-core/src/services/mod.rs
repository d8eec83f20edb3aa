//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod account;
mod doctor;
pub mod logging;
pub mod migration;
mod status;

pub use account::{
    AccountService, CreateAccountRequest, UpdateAccountRequest, UpdateBalanceRequest,
};
pub use doctor::{CheckResult, DoctorResult, DoctorService, DoctorSummary};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use status::{StatusService, StatusSummary};
