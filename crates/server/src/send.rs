//! The send form endpoint and the quota endpoint feeding the dashboard.

use axum::{
    Extension, Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError},
    },
    response::{Html, IntoResponse, Response},
};
use http::StatusCode;
use mail::{Attachment, OutgoingEmail, parse_address_list};
use send_limit::ms_to_hh_mm;
use serde::Serialize;

use crate::{AppState, pages::escape_html, session::Operator};

const BACK_LINK: &str = r#"<a href="/dashboard">Back</a>"#;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EmailCount {
    count: usize,
    limit: usize,
    remaining: usize,
    reset_in_ms: i64,
    reset_in_human: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
}

pub(crate) async fn email_count(State(state): State<AppState>) -> Response {
    let now = state.clock.now_millis();

    match state.limiter.status(now).await {
        Ok(status) => Json(EmailCount {
            count: status.count,
            limit: status.limit,
            remaining: status.remaining,
            reset_in_ms: status.reset_in_ms,
            reset_in_human: status.reset_in.to_string(),
        })
        .into_response(),
        Err(err) => {
            log::error!("Failed to read the send log: {err}");

            let body = ErrorResponse {
                error: "send log unavailable",
            };

            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}

pub(crate) async fn send_email(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
    multipart: Multipart,
) -> Response {
    let email = match read_form(multipart).await {
        Ok(email) => email,
        Err(err) => {
            log::debug!("Rejecting unreadable send form: {err}");

            return page(
                err.status(),
                &format!("Email NOT sent. The form could not be read: {}", err.body_text()),
            );
        }
    };

    let gate = state.send_gate.clone().lock_owned().await;

    // Runs detached so a client that disconnects mid-send cannot skip the record.
    let delivery = tokio::spawn(async move {
        let response = deliver(&state, &operator, &email).await;
        drop(gate);

        response
    });

    match delivery.await {
        Ok(response) => response,
        Err(err) => {
            log::error!("Send task failed: {err}");
            page(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send email.")
        }
    }
}

/// Check the quota, send, and record. The caller holds the send gate.
async fn deliver(state: &AppState, operator: &Operator, email: &OutgoingEmail) -> Response {
    let now = state.clock.now_millis();
    let limit = state.limiter.limit();

    let already_sent = match state.limiter.count(now).await {
        Ok(count) => count,
        Err(err) => {
            log::error!("Refusing to send, the send log is unavailable: {err}");

            return page(
                StatusCode::SERVICE_UNAVAILABLE,
                "Email NOT sent. The send counter is unavailable, please try again later.",
            );
        }
    };

    if already_sent >= limit {
        let reset = match state.limiter.time_until_reset(now).await {
            Ok(ms) => ms_to_hh_mm(ms),
            Err(err) => {
                log::error!("Failed to compute the send limit reset time: {err}");
                ms_to_hh_mm(0)
            }
        };

        log::warn!("Send limit reached ({already_sent}/{limit}), refusing email from '{}'", operator.username);

        return page_markup(
            StatusCode::TOO_MANY_REQUESTS,
            &format!(
                "<p>Email NOT sent. You have reached the limit of {limit} emails in 24 hours ({already_sent} sent).</p>\
                 <p>Your limit will reset in about {reset}.</p>"
            ),
        );
    }

    if let Err(err) = email.validate() {
        return page(StatusCode::BAD_REQUEST, &format!("Email NOT sent. {err}"));
    }

    if let Err(err) = state.mailer.send(email).await {
        log::error!("Failed to send email: {err}");
        return page(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send email.");
    }

    // The mail is out; a failed record only under-counts.
    let sent_at = state.clock.now_millis();
    if let Err(err) = state.limiter.record(sent_at).await {
        log::error!("Email was sent but could not be recorded in the send log: {err}");
    }

    log::info!(
        "Email sent by '{}' to {} recipient(s), {} of {limit} used",
        operator.username,
        email.to.len() + email.cc.len(),
        already_sent + 1
    );

    page(StatusCode::OK, "Email sent successfully!")
}

/// A one-paragraph result page with a link back to the dashboard.
fn page(status: StatusCode, message: &str) -> Response {
    page_markup(status, &format!("<p>{}</p>", escape_html(message)))
}

fn page_markup(status: StatusCode, markup: &str) -> Response {
    (status, Html(format!("{markup}{BACK_LINK}"))).into_response()
}

async fn read_form(mut multipart: Multipart) -> Result<OutgoingEmail, MultipartError> {
    let mut email = OutgoingEmail::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "to" => email.to = parse_address_list(&field.text().await?),
            "cc" => email.cc = parse_address_list(&field.text().await?),
            "subject" => email.subject = field.text().await?,
            "body" => email.html_body = field.text().await?,
            "attachment" => email.attachment = attachment(field).await?,
            other => log::debug!("Ignoring unexpected form field '{other}'"),
        }
    }

    Ok(email)
}

async fn attachment(field: Field<'_>) -> Result<Option<Attachment>, MultipartError> {
    let filename = field.file_name().map(str::to_string).unwrap_or_default();
    let content_type = field.content_type().map(str::to_string);

    let content = field.bytes().await?;

    // Browsers submit an empty, unnamed part when no file was picked.
    if filename.is_empty() && content.is_empty() {
        return Ok(None);
    }

    let filename = if filename.is_empty() {
        "attachment".to_string()
    } else {
        filename
    };

    Ok(Some(Attachment {
        filename,
        content_type,
        content: content.to_vec(),
    }))
}
