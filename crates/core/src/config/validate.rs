use super::{types::Config, AuthMethod, ConfigError, StorageBackend};

/// Validate configuration
/// Currently validates:
/// - Auth section exists (enforced by serde)
/// - Admin credentials present when admin auth is selected
/// - Server port is not 0
/// - Hosted storage section present and complete when selected
/// - At least one required field name is known (empty list is allowed)
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::Admin {
        match &config.auth.admin {
            None => {
                return Err(ConfigError::ValidationError(
                    "auth.admin is required when auth.method = \"admin\"".to_string(),
                ));
            }
            Some(admin) if admin.username.is_empty() || admin.password_sha256.is_empty() => {
                return Err(ConfigError::ValidationError(
                    "auth.admin.username and auth.admin.password_sha256 must be set".to_string(),
                ));
            }
            Some(_) => {}
        }
    }

    if config.storage.backend == StorageBackend::Hosted {
        let hosted = config.storage.hosted.as_ref().ok_or_else(|| {
            ConfigError::ValidationError(
                "storage.hosted is required when storage.backend = \"hosted\"".to_string(),
            )
        })?;
        if hosted.token.is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.hosted.token cannot be empty".to_string(),
            ));
        }
        if hosted.owner.is_empty() || hosted.repo.is_empty() || hosted.path.is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.hosted.owner, repo and path must be set".to_string(),
            ));
        }
        if hosted.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "storage.hosted.timeout_secs cannot be 0".to_string(),
            ));
        }
    }

    Ok(())
}
