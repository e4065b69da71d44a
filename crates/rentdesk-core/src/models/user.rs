use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(rename = "first_name", alias = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "last_name", alias = "lastName", default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_us_resident: bool,
    #[serde(default)]
    pub user_role: Vec<Role>,
    #[serde(default)]
    pub role: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Server-side login session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub token: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub token: String,
    pub session: Option<Session>,
}

/// Request a one-time passcode for `email`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OtpInput {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Exchange a one-time passcode for a session.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(range(max = 999_999, message = "Your one-time password must be 6 characters."))]
    pub otp: u32,
}

impl LoginInput {
    /// Parse a 6-digit code as typed by the operator.
    pub fn parse(email: impl Into<String>, code: &str) -> Result<Self, crate::error::ApiError> {
        let code = code.trim();
        if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(crate::error::ApiError::validation(
                "Your one-time password must be 6 characters.",
            ));
        }
        let otp = code
            .parse::<u32>()
            .map_err(|e| crate::error::ApiError::validation(e.to_string()))?;
        Ok(Self {
            email: email.into(),
            otp,
        })
    }
}
