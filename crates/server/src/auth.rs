//! Operator authentication: credential checks and the login guard for protected routes.

use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    response::{IntoResponse, Redirect},
};
use config::AuthConfig;
use http::{Request, Response};
use secrecy::{ExposeSecret, SecretString};
use tower::Layer;

use crate::session::SessionStore;

/// Decides whether a username and password may log in.
pub trait CredentialVerifier: Send + Sync {
    /// Returns true when the pair is accepted.
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// A single username and password pair taken from the configuration.
pub struct StaticCredentials {
    username: String,
    password: SecretString,
}

impl StaticCredentials {
    /// Credentials from the `[auth]` section.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        let username_ok = self.username == username;
        let password_ok = self.password.expose_secret() == password;

        username_ok & password_ok
    }
}

/// Redirects requests without a live session to the login page.
#[derive(Clone)]
pub struct RequireLoginLayer(SessionStore);

impl RequireLoginLayer {
    pub fn new(sessions: SessionStore) -> Self {
        Self(sessions)
    }
}

impl<Service> Layer<Service> for RequireLoginLayer
where
    Service: Send + Clone,
{
    type Service = RequireLoginService<Service>;

    fn layer(&self, next: Service) -> Self::Service {
        RequireLoginService {
            next,
            sessions: self.0.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RequireLoginService<Service> {
    next: Service,
    sessions: SessionStore,
}

impl<Service, ReqBody> tower::Service<Request<ReqBody>> for RequireLoginService<Service>
where
    Service: tower::Service<Request<ReqBody>, Response = Response<Body>> + Send + Clone + 'static,
    Service::Future: Send,
    Service::Error: Display + 'static,
    ReqBody: http_body::Body + Send + 'static,
{
    type Response = http::Response<Body>;
    type Error = Service::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Body>, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.next.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let mut next = self.next.clone();
        let sessions = self.sessions.clone();

        let (mut parts, body) = req.into_parts();

        Box::pin(async move {
            match sessions.operator(&parts.headers) {
                Some(operator) => {
                    parts.extensions.insert(operator);
                    next.call(Request::from_parts(parts, body)).await
                }
                None => {
                    log::debug!("No session for {}, redirecting to login", parts.uri.path());
                    Ok(Redirect::to("/login").into_response())
                }
            }
        })
    }
}
