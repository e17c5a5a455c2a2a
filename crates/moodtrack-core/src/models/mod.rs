//! Data models for moodtrack entities and API replies.
//!
//! This module contains all the data structures exchanged with the backend:
//!
//! - `User`, `UserRole`: the authenticated account and its access role
//! - `Mood`, `MoodConfig`: daily ratings and the accepted rating range
//! - `Patient`, `PatientMoodEntry`: the doctor's view of assigned patients
//!
//! Every reply may carry an application-level `error`/`message` pair even on
//! a 2xx status. The client forwards replies untouched; callers opt into
//! treating that pair as a failure through [`ServerReply::check`].

pub mod health;
pub mod mood;
pub mod patient;
pub mod user;

pub use health::HealthResponse;
pub use mood::{
    Mood, MoodConfig, MoodConfigResponse, MoodResponse, MoodsResponse, RateRange, RateRequest,
};
pub use patient::{Patient, PatientMoodEntry, PatientMoodsResponse, PatientSummary, PatientsResponse};
pub use user::{LoginRequest, LoginResponse, ProfileResponse, User, UserRole};

use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// Access to the optional `error`/`message` fields every backend reply may carry.
pub trait ServerReply: Sized {
    fn error(&self) -> Option<&str>;
    fn message(&self) -> Option<&str>;

    /// Turn an application-level error in the body into an `ApiError::Application`.
    fn check(self) -> Result<Self, ApiError> {
        match self.error() {
            Some(error) => Err(ApiError::Application {
                error: error.to_string(),
                message: self.message().map(str::to_string),
            }),
            None => Ok(self),
        }
    }
}

/// Reply with no payload beyond the error/message pair (delete, assign, unassign)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ServerReply for MessageResponse {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
