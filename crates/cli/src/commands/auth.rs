//! Sign-in commands.
//!
//! # Usage
//!
//! ```bash
//! fakestore login -e user@example.com -p password1
//! fakestore logout
//! ```

use std::sync::Arc;

use fakestore_storefront::StorefrontError;
use fakestore_storefront::auth::{AuthStore, Credentials};
use tracing::info;

use super::{cart::log_cart, open_session};
use crate::App;

/// Sign in and switch to the user cart, merging the guest cart into it.
pub fn login(app: &App, email: &str, password: &str) -> Result<(), StorefrontError> {
    let credentials = Credentials::parse(email, password)?;
    AuthStore::new(Arc::clone(&app.storage)).sign_in(&credentials)?;
    info!("Login successful: {}", credentials.email());

    let session = open_session(app);
    log_cart(&session)
}

/// Sign out; the user cart stays stored for the next sign-in.
pub fn logout(app: &App) -> Result<(), StorefrontError> {
    AuthStore::new(Arc::clone(&app.storage)).sign_out()?;
    info!("Logged out");
    Ok(())
}
