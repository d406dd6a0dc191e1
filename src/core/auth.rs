//! Authenticated sessions against the hosted backend.

use crate::core::config::AppConfig;
use crate::core::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
    pub email: String,
}

/// Rejects emails outside the configured allowlist.
///
/// The error carries the same generic message as a wrong password.
pub fn ensure_allowed(config: &AppConfig, email: &str) -> Result<(), AppError> {
    if config.is_email_allowed(email) {
        Ok(())
    } else {
        warn!("Sign-in attempt for an email outside the allowlist");
        Err(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlist() {
        let config = AppConfig {
            allowed_emails: vec!["me@example.com".to_string()],
            ..Default::default()
        };
        assert!(ensure_allowed(&config, "ME@example.com").is_ok());
        let err = ensure_allowed(&config, "you@example.com").unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert!(ensure_allowed(&AppConfig::default(), "me@example.com").is_err());
    }
}
