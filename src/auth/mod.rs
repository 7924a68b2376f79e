//! Operator authentication.
//!
//! Administrative operations need a signed-in operator. The identity
//! provider sits behind [`Authenticator`]; [`AdminSession`] holds the
//! operator the last check found.

mod password;
mod session;

pub use password::{hash_password, verify_password, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
pub use session::AdminSession;

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

/// Authentication errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No operator is signed in. Callers send the operator to the login form.
    #[error("not signed in")]
    NotAuthenticated,

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password doesn't meet the length rules.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// The identity provider failed.
    #[error("identity provider error: {0}")]
    Provider(String),
}

/// A signed-in operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
}

/// Identity provider.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Sign in with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// The operator currently signed in, if any.
    async fn current_user(&self) -> Result<Option<User>, AuthError>;

    /// Sign the current operator out.
    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Single fixed account, for local installs and tests.
///
/// The password is held as an Argon2id PHC hash (see [`hash_password`]).
pub struct StaticAuthenticator {
    email: String,
    password_hash: String,
    signed_in: Mutex<Option<User>>,
}

impl StaticAuthenticator {
    /// Create the account. Fails if `password_hash` is not a PHC string.
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let password_hash = password_hash.into();
        password::parse_hash(&password_hash)?;

        Ok(Self {
            email: email.into(),
            password_hash,
            signed_in: Mutex::new(None),
        })
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<User>>, AuthError> {
        self.signed_in
            .lock()
            .map_err(|_| AuthError::Provider("session state poisoned".to_string()))
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if !email.eq_ignore_ascii_case(&self.email) {
            warn!(email, "sign-in rejected: unknown account");
            return Err(AuthError::InvalidCredentials);
        }
        if let Err(e) = verify_password(password, &self.password_hash) {
            warn!(email, "sign-in rejected");
            return Err(e);
        }

        let user = User {
            id: "local-admin".to_string(),
            email: self.email.clone(),
        };
        *self.slot()? = Some(user.clone());
        info!(email = %user.email, "operator signed in");
        Ok(user)
    }

    async fn current_user(&self) -> Result<Option<User>, AuthError> {
        Ok(self.slot()?.clone())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(user) = self.slot()?.take() {
            info!(email = %user.email, "operator signed out");
        }
        Ok(())
    }
}
