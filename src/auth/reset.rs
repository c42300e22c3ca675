//! Token-based password reset.
//!
//! ```text
//! validating-token --(verified)--> form --(accepted)--> success
//!        |                          ^  |
//!        +--(rejected)--> invalid   +--+ (validation or server error)
//! ```
//!
//! `invalid` and `success` are terminal. Success carries a delayed
//! redirect to the login page.

use std::sync::Arc;
use std::time::Duration;

use crate::api::{ApiError, ResetPasswordRequest, TrackerApi};
use super::validate::{self, NewPasswordErrors};

pub const INVALID_TOKEN_MESSAGE: &str = "This password reset link is invalid or has expired.";
pub const RESET_FAILED_MESSAGE: &str = "Could not reset your password. Please try again.";
pub const LINK_FAILED_MESSAGE: &str = "Could not send a reset link. Please try again.";
pub const LINK_SENT_MESSAGE: &str =
    "If an account exists for that address, a reset link is on its way.";

/// Navigation scheduled after a successful reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayedRedirect {
    pub to: &'static str,
    pub after: Duration,
}

impl DelayedRedirect {
    /// Value for the HTTP `Refresh` header.
    pub fn refresh_header(&self) -> String {
        format!("{}; url={}", self.after.as_secs(), self.to)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResetStage {
    InvalidToken { message: &'static str },
    Form { errors: NewPasswordErrors, server_error: Option<String> },
    Success { redirect: DelayedRedirect },
}

impl ResetStage {
    fn blank_form() -> Self {
        ResetStage::Form { errors: NewPasswordErrors::default(), server_error: None }
    }

    fn invalid() -> Self {
        ResetStage::InvalidToken { message: INVALID_TOKEN_MESSAGE }
    }
}

/// Result of asking for a new reset link.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkRequest {
    Rejected(String),
    Sent,
    Failed(String),
}

pub struct ResetPasswordFlow<'a> {
    api: &'a Arc<dyn TrackerApi>,
    redirect_after: Duration,
}

impl<'a> ResetPasswordFlow<'a> {
    pub fn new(api: &'a Arc<dyn TrackerApi>, redirect_after: Duration) -> Self {
        Self { api, redirect_after }
    }

    /// Check the token from the link. Any failure, including an unreachable
    /// API, lands in the invalid-token state.
    pub async fn verify(&self, token: Option<&str>) -> ResetStage {
        let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
            return ResetStage::invalid();
        };
        match self.api.verify_reset_token(token).await {
            Ok(()) => ResetStage::blank_form(),
            Err(e) => {
                log::info!("Reset token rejected: {e}");
                ResetStage::invalid()
            }
        }
    }

    /// Validate locally, then send exactly one reset request. On a server
    /// error the form stays editable with the server's message, or a
    /// generic one when it sent none.
    pub async fn submit(&self, token: Option<&str>, password: &str, confirm: &str) -> ResetStage {
        let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
            return ResetStage::invalid();
        };

        let errors = validate::validate_new_password(password, confirm);
        if !errors.is_empty() {
            return ResetStage::Form { errors, server_error: None };
        }

        let request = ResetPasswordRequest {
            token: token.to_string(),
            new_password: password.to_string(),
        };
        match self.api.reset_password(&request).await {
            Ok(()) => ResetStage::Success {
                redirect: DelayedRedirect { to: "/login", after: self.redirect_after },
            },
            Err(e) => {
                log::warn!("Password reset failed: {e}");
                let message = e.detail().unwrap_or(RESET_FAILED_MESSAGE).to_string();
                ResetStage::Form { errors: NewPasswordErrors::default(), server_error: Some(message) }
            }
        }
    }

    /// Ask the API to e-mail a fresh link. Unknown addresses look the same
    /// as known ones to the user.
    pub async fn request_link(&self, email: &str) -> LinkRequest {
        if let Some(error) = validate::validate_email(email) {
            return LinkRequest::Rejected(error);
        }
        match self.api.request_password_reset(email.trim()).await {
            Ok(()) | Err(ApiError::NotFound) => LinkRequest::Sent,
            Err(e) => {
                log::warn!("Reset link request failed: {e}");
                LinkRequest::Failed(e.detail().unwrap_or(LINK_FAILED_MESSAGE).to_string())
            }
        }
    }
}
