//! Outgoing mail relay configuration.

use std::time::Duration;

use duration_str::deserialize_option_duration;
use secrecy::SecretString;
use serde::Deserialize;

/// SMTP relay used to deliver mail.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MailConfig {
    /// Relay host name.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// How the connection to the relay is secured.
    pub security: SmtpSecurity,
    /// Relay login, if the relay requires authentication.
    pub username: Option<String>,
    /// Relay password.
    pub password: Option<SecretString>,
    /// The `From` mailbox, e.g. `"Mailgate <noreply@example.com>"`.
    pub sender: String,
    /// Timeout for talking to the relay.
    #[serde(deserialize_with = "deserialize_option_duration")]
    pub timeout: Option<Duration>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            security: SmtpSecurity::default(),
            username: None,
            password: None,
            sender: String::new(),
            timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// Transport security towards the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Plain text, never upgraded.
    None,
    /// Upgrade with STARTTLS when the relay offers it.
    #[default]
    Opportunistic,
    /// Require STARTTLS.
    Starttls,
    /// TLS from the first byte (usually port 465).
    Tls,
}
