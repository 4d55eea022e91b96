//! HTTP server configuration settings.

use std::{borrow::Cow, net::SocketAddr, path::PathBuf, time::Duration};

use duration_str::deserialize_option_duration;
use serde::{Deserialize, Deserializer};

/// HTTP server configuration settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// The socket address the server should listen on.
    pub listen_address: Option<SocketAddr>,
    /// Directory with stylesheets and other static assets.
    pub static_dir: PathBuf,
    /// Largest accepted send request body, attachment included, in bytes.
    pub max_upload_size: usize,
    /// Health endpoint configuration.
    pub health: HealthConfig,
    /// Login session configuration.
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            static_dir: PathBuf::from("./public"),
            max_upload_size: 25 * 1024 * 1024,
            health: HealthConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Health endpoint configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthConfig {
    /// Whether the health endpoint is enabled.
    pub enabled: bool,
    /// A separate socket address for the health endpoint.
    pub listen: Option<SocketAddr>,
    /// The path for the health endpoint.
    pub path: Cow<'static, str>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        HealthConfig {
            enabled: true,
            listen: None,
            path: Cow::Borrowed("/health"),
        }
    }
}

/// Login session configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session token.
    pub cookie_name: String,
    /// Sessions unused for this long are dropped. `"0s"` keeps them until logout.
    #[serde(deserialize_with = "deserialize_idle_timeout")]
    pub idle_timeout: Option<Duration>,
    /// Adds the `Secure` attribute to the session cookie, for deployments behind HTTPS.
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "mailgate_session".to_string(),
            idle_timeout: Some(Duration::from_secs(12 * 60 * 60)),
            secure_cookie: false,
        }
    }
}

fn deserialize_idle_timeout<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let timeout = deserialize_option_duration(deserializer)?;
    Ok(timeout.filter(|timeout| !timeout.is_zero()))
}
