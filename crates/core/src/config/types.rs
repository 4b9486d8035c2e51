use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::backend::{HostedFileConfig, LocalFileConfig};
use crate::ticket::RequiredField;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub tickets: TicketsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Administrator credentials (required when method = "admin").
    #[serde(default)]
    pub admin: Option<AdminCredentialsConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Everyone may submit and edit.
    None,
    /// Everyone may submit; editing needs the administrator credentials.
    Admin,
}

/// Shared administrator account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminCredentialsConfig {
    pub username: String,
    /// SHA-256 hex digest of the password.
    pub password_sha256: String,
}

/// Storage configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Local file settings (defaults apply when omitted).
    #[serde(default)]
    pub local: Option<LocalFileConfig>,
    /// Hosted file settings (required when backend = "hosted").
    #[serde(default)]
    pub hosted: Option<HostedFileConfig>,
}

/// Available storage backends
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Local,
    Hosted,
}

/// Ticket submission rules
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TicketsConfig {
    /// Fields that must be non-empty on submission.
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<RequiredField>,
}

impl Default for TicketsConfig {
    fn default() -> Self {
        Self {
            required_fields: default_required_fields(),
        }
    }
}

fn default_required_fields() -> Vec<RequiredField> {
    RequiredField::ALL.to_vec()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub storage: SanitizedStorageConfig,
    pub tickets: TicketsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStorageConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted: Option<SanitizedHostedConfig>,
}

/// Sanitized hosted config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedHostedConfig {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub token_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let storage = &config.storage;
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::Admin => "admin".to_string(),
                },
                admin_username: config.auth.admin.as_ref().map(|a| a.username.clone()),
            },
            server: config.server.clone(),
            storage: SanitizedStorageConfig {
                backend: match storage.backend {
                    StorageBackend::Local => "local".to_string(),
                    StorageBackend::Hosted => "hosted".to_string(),
                },
                local_path: match storage.backend {
                    StorageBackend::Local => {
                        Some(storage.local.clone().unwrap_or_default().path)
                    }
                    StorageBackend::Hosted => None,
                },
                hosted: storage.hosted.as_ref().map(|h| SanitizedHostedConfig {
                    api_url: h.api_url.clone(),
                    owner: h.owner.clone(),
                    repo: h.repo.clone(),
                    path: h.path.clone(),
                    branch: h.branch.clone(),
                    token_configured: !h.token.is_empty(),
                    timeout_secs: h.timeout_secs,
                }),
            },
            tickets: config.tickets.clone(),
        }
    }
}
