//! Placeholder authentication.
//!
//! Sign-in only checks the form: a well-formed email and a password of at
//! least [`MIN_PASSWORD_LENGTH`] characters. No remote service is asked and
//! the password is never stored. The signed-in identity is kept in the same
//! key-value storage as carts so the cart session can pick the right key.

use fakestore_core::{Email, EmailError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::cart::{AuthMode, Storage, StorageError};

/// Storage key holding the signed-in identity.
pub const AUTH_KEY: &str = "ecommerce_auth";

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("failed to store sign-in: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to encode sign-in: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Validated sign-in form input.
#[derive(Debug, Clone)]
pub struct Credentials {
    email: Email,
}

impl Credentials {
    /// Validate the sign-in form.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` or `AuthError::PasswordTooShort`.
    pub fn parse(email: &str, password: &str) -> Result<Self, AuthError> {
        let email = Email::parse(email)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        Ok(Self { email })
    }

    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }
}

/// Who is using the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    Guest,
    Authenticated { email: Email },
}

impl AuthState {
    /// The cart mode for this state.
    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        match self {
            Self::Guest => AuthMode::Guest,
            Self::Authenticated { .. } => AuthMode::Authenticated,
        }
    }

    #[must_use]
    pub const fn email(&self) -> Option<&Email> {
        match self {
            Self::Guest => None,
            Self::Authenticated { email } => Some(email),
        }
    }
}

/// Reads and writes the signed-in identity.
pub struct AuthStore<S> {
    storage: S,
}

impl<S: Storage> AuthStore<S> {
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The stored state. Unreadable or malformed data means signed out.
    pub fn current(&self) -> AuthState {
        match self.storage.get(AUTH_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(error = %e, "Stored sign-in is malformed; treating as guest");
                AuthState::Guest
            }),
            Ok(None) => AuthState::Guest,
            Err(e) => {
                warn!(error = %e, "Failed to read stored sign-in; treating as guest");
                AuthState::Guest
            }
        }
    }

    /// Record a sign-in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the state cannot be encoded or stored.
    pub fn sign_in(&self, credentials: &Credentials) -> Result<AuthState, AuthError> {
        let state = AuthState::Authenticated {
            email: credentials.email().clone(),
        };
        self.storage.set(AUTH_KEY, &serde_json::to_vec(&state)?)?;
        info!(email = %credentials.email(), "Signed in");
        Ok(state)
    }

    /// Forget the signed-in identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the stored identity cannot be removed.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.storage.delete(AUTH_KEY)?;
        info!("Signed out");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::MemoryStorage;

    /// Storage whose reads always fail.
    struct Unreadable;

    impl Storage for Unreadable {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        }

        fn set(&self, _key: &str, _value: &[u8]) -> Result<(), StorageError> {
            Ok(())
        }

        fn delete(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::parse("user@example.com", "password1").is_ok());
        assert!(matches!(
            Credentials::parse("user@example.com", "short"),
            Err(AuthError::PasswordTooShort { min: 8 })
        ));
        assert!(matches!(
            Credentials::parse("not-an-email", "password1"),
            Err(AuthError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_sign_in_and_out() {
        let store = AuthStore::new(MemoryStorage::new());
        assert_eq!(store.current(), AuthState::Guest);
        assert_eq!(store.current().mode(), AuthMode::Guest);

        let credentials = Credentials::parse("user@example.com", "password1").unwrap();
        let state = store.sign_in(&credentials).unwrap();
        assert_eq!(store.current(), state);
        assert_eq!(state.mode(), AuthMode::Authenticated);
        assert_eq!(state.email().unwrap().as_str(), "user@example.com");

        store.sign_out().unwrap();
        assert_eq!(store.current(), AuthState::Guest);
    }

    #[test]
    fn test_malformed_state_is_guest() {
        let storage = MemoryStorage::new();
        storage.set(AUTH_KEY, b"{\"state\":\"authenticated\"}").unwrap();
        let store = AuthStore::new(storage);
        assert_eq!(store.current(), AuthState::Guest);
    }

    #[test]
    fn test_unreadable_state_is_guest() {
        let store = AuthStore::new(Unreadable);
        assert_eq!(store.current(), AuthState::Guest);
    }

    #[test]
    fn test_state_format() {
        let state = AuthState::Authenticated {
            email: Email::parse("user@example.com").unwrap(),
        };
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            r#"{"state":"authenticated","email":"user@example.com"}"#
        );
    }
}
