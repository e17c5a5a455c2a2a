//! REST API client module for the moodtrack backend.
//!
//! This module provides the `ApiClient` for communicating with the
//! mood-tracking service: authentication, daily moods, the doctor's
//! patient roster, and the health probe.
//!
//! Every request carries the bearer token currently held in the persisted
//! store, and a 401 reply evicts that token before the error is returned.

pub mod client;
pub mod error;

pub use client::{bearer_headers, ApiClient, AuthApi, DoctorApi, HealthApi, MoodsApi};
pub use error::ApiError;
