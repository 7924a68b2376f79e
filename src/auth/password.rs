//! Operator password hashing.
//!
//! Stored credentials are Argon2id PHC strings; plaintext passwords are
//! never kept.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;

use super::AuthError;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Argon2id with 64 MiB memory, 3 iterations, 4 lanes.
fn create_argon2() -> Result<Argon2<'static>, AuthError> {
    let params = Params::new(65536, 3, 4, None)
        .map_err(|e| AuthError::Provider(format!("invalid Argon2 parameters: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password into a PHC string suitable for [`StaticAuthenticator`](super::StaticAuthenticator).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&password.len()) {
        return Err(AuthError::WeakPassword(format!(
            "password must be {MIN_PASSWORD_LENGTH}-{MAX_PASSWORD_LENGTH} characters"
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = create_argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Provider(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Check that `hash` is a well-formed PHC string.
pub(super) fn parse_hash(hash: &str) -> Result<PasswordHash<'_>, AuthError> {
    PasswordHash::new(hash)
        .map_err(|e| AuthError::Provider(format!("invalid password hash: {e}")))
}

/// Verify `password` against a stored PHC hash.
///
/// Parameters come from the hash itself.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = parse_hash(hash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}
