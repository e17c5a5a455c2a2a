use serde::{Deserialize, Serialize};

use super::ServerReply;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Doctor,
    Patient,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Doctor => write!(f, "doctor"),
            UserRole::Patient => write!(f, "patient"),
        }
    }
}

/// An authenticated account. Never mutated by the client after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl User {
    pub fn is_doctor(&self) -> bool {
        self.role == UserRole::Doctor
    }

    pub fn is_patient(&self) -> bool {
        self.role == UserRole::Patient
    }

    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.role)
    }
}

// API Response wrappers

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: Option<String>,
    pub token: Option<String>,
    pub user: Option<User>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: Option<User>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ServerReply for LoginResponse {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl ServerReply for ProfileResponse {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        User {
            id: "1".to_string(),
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            role,
        }
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&UserRole::Doctor).unwrap(), r#""doctor""#);
        let role: UserRole = serde_json::from_str(r#""patient""#).unwrap();
        assert_eq!(role, UserRole::Patient);
        assert!(serde_json::from_str::<UserRole>(r#""admin""#).is_err());
    }

    #[test]
    fn test_role_predicates() {
        assert!(user(UserRole::Doctor).is_doctor());
        assert!(!user(UserRole::Doctor).is_patient());
        assert!(user(UserRole::Patient).is_patient());
        assert!(!user(UserRole::Patient).is_doctor());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(user(UserRole::Patient).display_name(), "A (patient)");
    }

    #[test]
    fn test_login_response_with_error_only() {
        let json = r#"{"error":"Invalid credentials","message":"Email or password is wrong"}"#;
        let parsed: LoginResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.token.is_none());
        assert!(parsed.user.is_none());
        assert_eq!(parsed.error(), Some("Invalid credentials"));
        assert!(parsed.check().is_err());
    }
}
