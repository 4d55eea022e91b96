//! Login, logout and the dashboard.

use axum::{
    Extension, Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use http::{HeaderMap, header::SET_COOKIE};
use serde::Deserialize;

use crate::{AppState, session::Operator};

const LOGIN_PAGE: &str = include_str!("../templates/login.html");
const DASHBOARD_PAGE: &str = include_str!("../templates/dashboard.html");

#[derive(Debug, Deserialize)]
pub(crate) struct LoginQuery {
    error: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

pub(crate) async fn index() -> Redirect {
    Redirect::to("/dashboard")
}

pub(crate) async fn login_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Response {
    if state.sessions.operator(&headers).is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    let error = match query.error.as_deref() {
        Some("1") => r#"<p class="error">Invalid username or password.</p>"#,
        _ => "",
    };

    Html(LOGIN_PAGE.replace("{{error}}", error)).into_response()
}

pub(crate) async fn login(State(state): State<AppState>, headers: HeaderMap, Form(form): Form<LoginForm>) -> Response {
    if !state.credentials.verify(&form.username, &form.password) {
        log::warn!("Rejected login attempt for user '{}'", form.username);
        return Redirect::to("/login?error=1").into_response();
    }

    if let Some(previous) = state.sessions.token(&headers) {
        state.sessions.destroy(&previous);
    }

    let token = state.sessions.create(&form.username);
    log::info!("User '{}' logged in", form.username);

    ([(SET_COOKIE, state.sessions.cookie(&token))], Redirect::to("/dashboard")).into_response()
}

pub(crate) async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = state.sessions.token(&headers) {
        state.sessions.destroy(&token);
        log::debug!("Session closed");
    }

    ([(SET_COOKIE, state.sessions.removal_cookie())], Redirect::to("/login")).into_response()
}

pub(crate) async fn dashboard(Extension(operator): Extension<Operator>) -> Html<String> {
    Html(DASHBOARD_PAGE.replace("{{username}}", &escape_html(&operator.username)))
}

/// Escapes text for use inside HTML element content or quoted attributes.
pub(crate) fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());

    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }

    escaped
}
