//! Core view-model logic for the people directory.
//! This crate is the single source of truth for list, search, pagination,
//! form and delete-confirmation invariants; front ends only render it.

pub mod api;
pub mod clock;
pub mod config;
pub mod form;
pub mod logging;
pub mod model;
pub mod store;
pub mod view;

pub use api::backend::PeopleBackend;
pub use api::error::{ApiResult, NetworkError};
pub use api::http::HttpPeopleBackend;
pub use clock::{age_on, hundred_years_before, Clock, FixedClock, SystemClock};
pub use config::{ClientConfig, ConfigError, SearchWindowing};
pub use form::validation::{FieldErrors, FormField, ValidationError};
pub use form::{FormError, FormMode, FormState, FormSubmission, FormValues, RecordForm};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::person::{PersonFields, PersonId, PersonPayload, PersonRecord};
pub use store::confirm::DeleteConfirmation;
pub use store::notification::{Notification, NotificationKind};
pub use store::pagination::{Pagination, PAGE_SIZE_OPTIONS};
pub use store::{DirectoryStore, LoadOutcome, LoadTicket, PendingMutation, StoreError};
pub use view::{DirectorySnapshot, FormSnapshot, PersonRow};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
