use std::sync::Arc;

use config::Config;
use mail::{Mailer, SmtpMailer};
use send_limit::{Clock, SendLimiter, SystemClock};
use tokio::sync::Mutex;

use crate::{
    auth::{CredentialVerifier, StaticCredentials},
    session::SessionStore,
};

/// Everything a request handler needs, shared by all requests.
#[derive(Clone)]
pub struct AppState {
    pub(crate) config: Arc<Config>,
    pub(crate) limiter: Arc<SendLimiter>,
    pub(crate) mailer: Arc<dyn Mailer>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) credentials: Arc<dyn CredentialVerifier>,
    pub(crate) sessions: SessionStore,
    /// Serializes the check-send-record sequence of `/send-email`.
    pub(crate) send_gate: Arc<Mutex<()>>,
}

impl AppState {
    /// Start building the state for `config`. Unset collaborators come from the configuration.
    pub fn builder(config: Config) -> AppStateBuilder {
        AppStateBuilder {
            config,
            limiter: None,
            mailer: None,
            clock: None,
            credentials: None,
        }
    }

    /// The configuration the state was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Builder for [`AppState`], used to swap in other collaborators.
pub struct AppStateBuilder {
    config: Config,
    limiter: Option<SendLimiter>,
    mailer: Option<Arc<dyn Mailer>>,
    clock: Option<Arc<dyn Clock>>,
    credentials: Option<Arc<dyn CredentialVerifier>>,
}

impl AppStateBuilder {
    /// Use this limiter instead of one built from `[send_limit]`.
    pub fn limiter(mut self, limiter: SendLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Use this mailer instead of the SMTP relay from `[mail]`.
    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Use this clock instead of the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use this verifier instead of the `[auth]` credentials.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialVerifier>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Build the state.
    pub fn build(self) -> anyhow::Result<AppState> {
        let config = self.config;

        let mailer = match self.mailer {
            Some(mailer) => mailer,
            None => Arc::new(SmtpMailer::new(&config.mail)?),
        };

        let limiter = self.limiter.unwrap_or_else(|| SendLimiter::new(&config.send_limit));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(StaticCredentials::new(&config.auth)));

        Ok(AppState {
            sessions: SessionStore::new(config.server.session.clone()),
            config: Arc::new(config),
            limiter: Arc::new(limiter),
            mailer,
            clock,
            credentials,
            send_gate: Arc::new(Mutex::new(())),
        })
    }
}
