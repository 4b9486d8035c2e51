mod admin;
mod none;
mod traits;
mod types;

pub use admin::*;
pub use none::*;
pub use traits::*;
pub use types::*;

use crate::config::AuthConfig;

/// Factory function to create authenticator from config
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    use crate::config::AuthMethod;

    match config.method {
        AuthMethod::None => Ok(Box::new(NoneAuthenticator)),
        AuthMethod::Admin => {
            let admin = config.admin.clone().ok_or_else(|| {
                AuthError::ConfigurationError(
                    "[auth.admin] must be set when using Admin auth method".to_string(),
                )
            })?;
            Ok(Box::new(AdminAuthenticator::new(
                admin.username,
                admin.password_sha256,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdminCredentialsConfig, AuthMethod};

    #[test]
    fn test_create_authenticator_none() {
        let config = AuthConfig {
            method: AuthMethod::None,
            admin: None,
        };
        let auth = create_authenticator(&config).unwrap();
        assert_eq!(auth.method_name(), "none");
    }

    #[test]
    fn test_create_authenticator_admin() {
        let config = AuthConfig {
            method: AuthMethod::Admin,
            admin: Some(AdminCredentialsConfig {
                username: "admin".to_string(),
                password_sha256: hash_password("secret"),
            }),
        };
        let auth = create_authenticator(&config).unwrap();
        assert_eq!(auth.method_name(), "admin");
    }

    #[test]
    fn test_create_authenticator_admin_missing_credentials() {
        let config = AuthConfig {
            method: AuthMethod::Admin,
            admin: None,
        };
        let result = create_authenticator(&config);
        assert!(matches!(result, Err(AuthError::ConfigurationError(_))));
    }
}
