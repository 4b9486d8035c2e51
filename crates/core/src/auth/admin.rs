//! Administrator credential authentication.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Authenticator for the single shared administrator account.
///
/// Credentials arrive as `Authorization: Basic <base64(user:password)>`.
/// The configured password is a SHA-256 hex digest, so no plaintext
/// password is held or compared.
pub struct AdminAuthenticator {
    username: String,
    password_sha256: String,
}

impl AdminAuthenticator {
    pub fn new(username: String, password_sha256: String) -> Result<Self, AuthError> {
        if username.is_empty() {
            return Err(AuthError::ConfigurationError(
                "admin username must not be empty".to_string(),
            ));
        }
        let digest = password_sha256.trim().to_ascii_lowercase();
        if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AuthError::ConfigurationError(
                "admin password_sha256 must be a 64-character hex digest".to_string(),
            ));
        }
        Ok(Self {
            username,
            password_sha256: digest,
        })
    }

    /// Extract `(username, password)` from a Basic authorization header.
    fn extract_credentials(&self, request: &AuthRequest) -> Option<(String, String)> {
        let header = request.headers.get("authorization")?;
        let encoded = header
            .strip_prefix("Basic ")
            .or_else(|| header.strip_prefix("basic "))?;
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, password) = decoded.split_once(':')?;
        Some((user.to_string(), password.to_string()))
    }
}

#[async_trait]
impl Authenticator for AdminAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let (user, password) = self
            .extract_credentials(request)
            .ok_or(AuthError::NotAuthenticated)?;

        let provided = hash_password(&password);
        let user_ok = constant_time_eq(user.as_bytes(), self.username.as_bytes());
        let password_ok = constant_time_eq(provided.as_bytes(), self.password_sha256.as_bytes());

        if user_ok && password_ok {
            Ok(Identity::admin(user, "admin"))
        } else {
            Err(AuthError::InvalidCredentials(
                "Invalid administrator credentials".to_string(),
            ))
        }
    }

    fn method_name(&self) -> &'static str {
        "admin"
    }
}

/// SHA-256 hex digest of a password, as stored in `password_sha256`.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
