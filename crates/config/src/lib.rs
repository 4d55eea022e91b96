//! Mailgate configuration structures to map the mailgate.toml configuration.

#![deny(missing_docs)]

mod auth;
mod loader;
mod mail;
mod send_limit;
mod server;

use std::path::Path;

pub use auth::AuthConfig;
pub use mail::{MailConfig, SmtpSecurity};
pub use send_limit::{FileStorageConfig, SendLimitConfig, SendLogStorageConfig};
pub use server::{HealthConfig, ServerConfig, SessionConfig};
use serde::Deserialize;

/// Main configuration structure for the mailgate application.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Operator login settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Outgoing mail relay settings.
    #[serde(default)]
    pub mail: MailConfig,
    /// Send limit settings.
    #[serde(default)]
    pub send_limit: SendLimitConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Validates that the configuration can actually deliver mail.
    pub fn validate(&self) -> anyhow::Result<()> {
        loader::validate_mail(self)
    }
}
