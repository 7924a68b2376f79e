//! Operator session for the admin surface.

use std::sync::Arc;

use tracing::{debug, info};

use super::{AuthError, Authenticator, User};

/// The operator known to the admin surface.
///
/// Set by [`check`](Self::check) or [`login`](Self::login), cleared by
/// [`logout`](Self::logout).
pub struct AdminSession {
    authenticator: Arc<dyn Authenticator>,
    user: Option<User>,
}

impl AdminSession {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            authenticator,
            user: None,
        }
    }

    /// Sign in through the provider and remember the operator.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&User, AuthError> {
        let user = self.authenticator.sign_in(email, password).await?;
        Ok(self.user.insert(user))
    }

    /// Ask the provider who is signed in.
    ///
    /// Provider failures are treated as signed out.
    pub async fn check(&mut self) -> Result<&User, AuthError> {
        self.user = match self.authenticator.current_user().await {
            Ok(user) => user,
            Err(e) => {
                debug!(error = %e, "auth check failed");
                None
            }
        };
        self.user.as_ref().ok_or(AuthError::NotAuthenticated)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The operator, or `NotAuthenticated` when nobody is signed in.
    pub fn require_user(&self) -> Result<&User, AuthError> {
        self.user.as_ref().ok_or(AuthError::NotAuthenticated)
    }

    /// Sign out at the provider and forget the operator.
    ///
    /// The local session is cleared even if the provider call fails.
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        let result = self.authenticator.sign_out().await;
        if let Some(user) = self.user.take() {
            info!(email = %user.email, "admin session closed");
        }
        result
    }
}

impl std::fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession")
            .field("user", &self.user)
            .finish()
    }
}
