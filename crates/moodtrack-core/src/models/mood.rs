use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ServerReply;
use crate::utils::parse_timestamp;

/// Lowest rating accepted when the server has not published a range yet
pub const DEFAULT_MIN_RATE: u8 = 1;

/// Highest rating accepted when the server has not published a range yet
pub const DEFAULT_MAX_RATE: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Mood {
    pub id: String,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    pub rate: u8,
    pub date: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

impl Mood {
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RateRange {
    pub min: u8,
    pub max: u8,
}

impl Default for RateRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_RATE,
            max: DEFAULT_MAX_RATE,
        }
    }
}

impl RateRange {
    pub fn contains(&self, rate: u8) -> bool {
        (self.min..=self.max).contains(&rate)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct MoodConfig {
    pub rate: RateRange,
}

// API Request/Response wrappers

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateRequest {
    pub rate: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoodConfigResponse {
    pub error: Option<String>,
    pub message: Option<String>,
    pub config: Option<MoodConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoodsResponse {
    pub error: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub moods: Vec<Mood>,
    #[serde(rename = "todayTracked", default)]
    pub today_tracked: bool,
    #[serde(rename = "todayMood", default)]
    pub today_mood: Option<Mood>,
}

/// Reply to adding or updating today's mood
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoodResponse {
    pub error: Option<String>,
    pub message: Option<String>,
    pub mood: Option<Mood>,
}

impl ServerReply for MoodConfigResponse {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl ServerReply for MoodsResponse {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl ServerReply for MoodResponse {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
