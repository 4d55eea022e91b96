//! Operator login configuration.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin";

/// Credentials of the single operator allowed to log in.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Login name.
    pub username: String,
    /// Login password.
    pub password: SecretString,
}

impl AuthConfig {
    /// Whether the out-of-the-box `admin`/`admin` credentials are still in use.
    pub fn uses_default_credentials(&self) -> bool {
        self.username == DEFAULT_USERNAME && self.password.expose_secret() == DEFAULT_PASSWORD
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            password: SecretString::from(DEFAULT_PASSWORD.to_string()),
        }
    }
}
