use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ServerReply;
use crate::utils::parse_timestamp;

/// A patient as listed on the doctor's roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Patient {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    /// Average of the patient's recorded ratings; `None` before the first entry
    #[serde(rename = "moodScore", default)]
    pub mood_score: Option<f64>,
    #[serde(rename = "moodCount", default)]
    pub mood_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PatientMoodEntry {
    pub id: String,
    pub rate: u8,
    pub date: String,
}

impl PatientMoodEntry {
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.date)
    }
}

// API Response wrappers

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientsResponse {
    pub error: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "myPatients", default)]
    pub my_patients: Vec<Patient>,
    #[serde(rename = "unassignedPatients", default)]
    pub unassigned_patients: Vec<Patient>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientMoodsResponse {
    pub error: Option<String>,
    pub message: Option<String>,
    pub patient: Option<PatientSummary>,
    #[serde(default)]
    pub moods: Vec<PatientMoodEntry>,
}

impl ServerReply for PatientsResponse {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl ServerReply for PatientMoodsResponse {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
