//! One-time-passcode login and logout.

use validator::Validate;

use rentdesk_core::constants::endpoints;
use rentdesk_core::models::{AuthResponse, LoginInput, OtpInput};
use rentdesk_core::{ApiError, AuthCredentials};

use crate::transport::ApiRequest;
use crate::ApiClient;

impl ApiClient {
    /// Ask the API to email a passcode to `email`.
    pub async fn request_otp(&self, email: &str) -> Result<serde_json::Value, ApiError> {
        let input = OtpInput {
            email: email.trim().to_string(),
        };
        input.validate()?;
        let value = self
            .execute(ApiRequest::post(endpoints::OTP, serde_json::to_value(&input)?))
            .await?;
        tracing::info!(email = %input.email, "One-time passcode requested");
        Ok(value)
    }

    /// Verify a passcode and persist the returned credentials.
    pub async fn login(&self, input: &LoginInput) -> Result<AuthCredentials, ApiError> {
        input.validate()?;
        let auth: AuthResponse = self.post_json(endpoints::LOGIN, input).await?;
        let credentials = AuthCredentials::from(auth);
        self.credentials().save(&credentials)?;
        tracing::info!(
            user_id = credentials.id.as_deref().unwrap_or_default(),
            roles = ?credentials.permissions,
            "Logged in"
        );
        Ok(credentials)
    }

    /// End the session. Stored credentials are cleared whether or not the
    /// API call succeeds.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self
            .execute(ApiRequest::post(endpoints::LOGOUT, serde_json::json!({})))
            .await;
        self.credentials().clear()?;
        match result {
            Ok(_) => {
                tracing::info!("Logged out");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Logout request failed, credentials cleared anyway");
                Err(e)
            }
        }
    }
}
