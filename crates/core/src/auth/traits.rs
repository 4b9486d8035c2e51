use async_trait::async_trait;
use thiserror::Error;

use super::types::{AuthRequest, Identity};

#[derive(Debug, Error)]
pub enum AuthError {
    /// No credentials presented. Callers may still submit tickets.
    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Authenticated, but table edits need the administrator role.
    #[error("Administrator access required")]
    Forbidden,

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Resolves the caller of a request to an [`Identity`].
///
/// Editing rights are carried by the identity's role claim, see
/// [`Identity::admin_grant`].
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError>;

    /// Value of `[auth] method` this authenticator implements.
    fn method_name(&self) -> &'static str;
}
