use serde::{Deserialize, Serialize};

use super::ServerReply;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: Option<String>,
    pub timestamp: Option<String>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ServerReply for HealthResponse {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
