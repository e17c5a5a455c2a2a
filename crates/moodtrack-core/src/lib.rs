//! moodtrack-core - client library for the moodtrack mood-tracking service.
//!
//! Patients record one rating per day; doctors review the histories of the
//! patients assigned to them. This crate holds everything below the user
//! interface:
//!
//! - [`auth`]: the session manager and the persisted store behind it
//! - [`api`]: the REST client, with bearer-token injection and 401 eviction
//! - [`context`]: explicit wiring of the two, plus sign-in/out flows
//! - [`tracker`]: the daily mood flow with its one-submit-at-a-time policy
//! - [`stats`]: averages and last-week summaries for display

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod models;
pub mod stats;
pub mod tracker;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthSession, KeyValueStore, Session, SessionPhase};
pub use config::{Config, StoreBackend};
pub use context::{AppContext, ContextError};
pub use tracker::{MoodOverview, MoodTracker};
