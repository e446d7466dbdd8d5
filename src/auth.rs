//! Auth token persistence.
//!
//! The backend owns real authentication; the dashboard only needs an opaque
//! token in local storage, whose presence means "logged in". Storage failures
//! degrade to "not logged in" rather than propagating.

use crate::config::Config;
use std::path::{Path, PathBuf};

const MOCK_TOKEN: &str = "mock-token";

#[derive(Debug, Clone)]
pub struct AuthService {
    token_path: PathBuf,
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        Self {
            token_path: PathBuf::from(&config.token_path),
        }
    }

    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            token_path: path.as_ref().to_path_buf(),
        }
    }

    /// The stored token, if any.
    pub fn token(&self) -> Option<String> {
        match std::fs::read_to_string(&self.token_path) {
            Ok(raw) => {
                let token = raw.trim().to_string();
                if token.is_empty() {
                    None
                } else {
                    Some(token)
                }
            }
            Err(_) => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }

    /// Stores the session token when both credentials are non-blank.
    /// Returns whether login succeeded.
    pub fn login(&self, email: &str, password: &str) -> bool {
        if email.trim().is_empty() || password.trim().is_empty() {
            return false;
        }

        match std::fs::write(&self.token_path, MOCK_TOKEN) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to persist auth token: {}", e);
                false
            }
        }
    }

    /// Removes the stored token. Missing files are fine.
    pub fn logout(&self) {
        if let Err(e) = std::fs::remove_file(&self.token_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove auth token: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_auth(name: &str) -> AuthService {
        let path = std::env::temp_dir().join(format!(
            "painel-credito-auth-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        AuthService::with_path(path)
    }

    #[test]
    fn login_requires_both_credentials() {
        let auth = temp_auth("credentials");
        assert!(!auth.login("", "secret"));
        assert!(!auth.login("user@example.com", "  "));
        assert!(!auth.is_logged_in());

        assert!(auth.login("user@example.com", "secret"));
        assert!(auth.is_logged_in());
        assert_eq!(auth.token().as_deref(), Some(MOCK_TOKEN));

        auth.logout();
        assert!(!auth.is_logged_in());
    }

    #[test]
    fn logout_of_missing_token_is_fine() {
        let auth = temp_auth("missing");
        auth.logout();
        assert!(!auth.is_logged_in());
    }
}
