//! Client side of fittrack: a typed API client plus the view-state logic for
//! the day, week/month, exercise library and login screens.
//!
//! Every view operation returns a `Result` and also keeps the last failure in
//! the view's `error` slot, which a front end renders as an inline panel.

pub mod api;
pub mod config;
pub mod credentials;
pub mod day;
pub mod error;
pub mod gate;
pub mod library;
pub mod period;
pub mod shell;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use credentials::{AuthSession, CredentialStore, FileCredentialStore, InMemoryCredentialStore};
pub use day::{DayEntry, DayView};
pub use error::ClientError;
pub use gate::{AuthGate, AuthState};
pub use library::{ExerciseLibrary, GroupFilter};
pub use period::{DayStats, GroupFrequency, PeriodKind, PeriodSummary, PeriodView};
pub use shell::{Screen, Shell, View};

/// Record the outcome of a view operation in its error slot.
pub(crate) fn track<T>(slot: &mut Option<String>, context: &str, result: error::Result<T>) -> error::Result<T> {
    match &result {
        Ok(_) => *slot = None,
        Err(e) => {
            tracing::warn!("{}: {}", context, e);
            *slot = Some(e.to_string());
        }
    }
    result
}
