use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

use super::AuthError;

/// Claim naming the caller's role.
pub const ROLE_CLAIM: &str = "role";

/// Role value that unlocks table edits.
pub const ADMIN_ROLE: &str = "admin";

/// Request information for authentication
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub headers: HashMap<String, String>,
    pub source_ip: IpAddr,
}

/// Authenticated identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub method: String,
    pub claims: HashMap<String, serde_json::Value>,
}

impl Identity {
    /// Caller without credentials: may submit tickets, may not edit them.
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            method: "none".to_string(),
            claims: HashMap::new(),
        }
    }

    /// Caller holding the administrator role.
    pub fn admin(user_id: impl Into<String>, method: impl Into<String>) -> Self {
        let mut claims = HashMap::new();
        claims.insert(ROLE_CLAIM.to_string(), serde_json::json!(ADMIN_ROLE));
        Self {
            user_id: user_id.into(),
            method: method.into(),
            claims,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.claims.get(ROLE_CLAIM).and_then(|v| v.as_str()) == Some(ADMIN_ROLE)
    }

    /// Exchange an admin identity for the capability required by table edits.
    pub fn admin_grant(&self) -> Result<AdminGrant, AuthError> {
        if self.is_admin() {
            Ok(AdminGrant {
                user_id: self.user_id.clone(),
            })
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

/// Proof that the caller authenticated as an administrator.
///
/// Only [`Identity::admin_grant`] constructs one.
#[derive(Debug, Clone)]
pub struct AdminGrant {
    user_id: String,
}

impl AdminGrant {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}
