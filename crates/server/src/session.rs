//! Login sessions kept in memory and carried in a cookie.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use config::SessionConfig;
use dashmap::DashMap;
use http::{HeaderMap, header::COOKIE};

/// The logged-in operator, inserted into request extensions by the login guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub username: String,
}

struct Session {
    username: String,
    last_seen: Instant,
}

/// All live sessions, keyed by their cookie token.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Session>>,
    config: Arc<SessionConfig>,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            config: Arc::new(config),
        }
    }

    /// Start a session for `username`, returning its token.
    pub fn create(&self, username: &str) -> String {
        self.purge_expired();

        let token = uuid::Uuid::new_v4().simple().to_string();

        self.sessions.insert(
            token.clone(),
            Session {
                username: username.to_string(),
                last_seen: Instant::now(),
            },
        );

        token
    }

    /// Look up a session and mark it as used. Expired sessions are dropped on sight.
    pub fn touch(&self, token: &str) -> Option<Operator> {
        let now = Instant::now();
        let mut session = self.sessions.get_mut(token)?;

        if !self.is_expired(&session, now) {
            session.last_seen = now;

            return Some(Operator {
                username: session.username.clone(),
            });
        }

        drop(session);
        self.sessions.remove(token);
        log::debug!("Dropped an idle session");

        None
    }

    /// Resolve the session referenced by the request cookies.
    pub fn operator(&self, headers: &HeaderMap) -> Option<Operator> {
        let token = self.token(headers)?;
        self.touch(&token)
    }

    pub fn destroy(&self, token: &str) {
        self.sessions.remove(token);
    }

    /// The session token carried by the request, if any.
    pub fn token(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.config.cookie_name)
            .map(|(_, token)| token.to_string())
            .filter(|token| !token.is_empty())
    }

    /// `Set-Cookie` value establishing the session.
    pub fn cookie(&self, token: &str) -> String {
        let mut cookie = format!("{}={token}; Path=/; HttpOnly; SameSite=Lax", self.config.cookie_name);

        if let Some(timeout) = self.config.idle_timeout {
            cookie.push_str(&format!("; Max-Age={}", timeout.as_secs()));
        }

        if self.config.secure_cookie {
            cookie.push_str("; Secure");
        }

        cookie
    }

    /// `Set-Cookie` value clearing the session cookie.
    pub fn removal_cookie(&self) -> String {
        format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", self.config.cookie_name)
    }

    fn is_expired(&self, session: &Session, now: Instant) -> bool {
        self.config
            .idle_timeout
            .is_some_and(|timeout| now.duration_since(session.last_seen) >= timeout)
    }

    fn purge_expired(&self) {
        let now = Instant::now();
        self.sessions.retain(|_, session| !self.is_expired(session, now));
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// How long an unused session survives, for logging.
pub(crate) fn describe_timeout(timeout: Option<Duration>) -> String {
    match timeout {
        Some(timeout) => format!("{}s", timeout.as_secs()),
        None => "never".to_string(),
    }
}
