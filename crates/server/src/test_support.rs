use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use axum::{Router, body::Body};
use config::Config;
use http::{
    Request, Response,
    header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
};
use mail::{MailError, Mailer, OutgoingEmail};
use send_limit::{InMemoryStorage, ManualClock, SendLimiter};
use tower::ServiceExt;

use crate::{AppState, router};

pub(crate) const T: i64 = 1_700_000_000_000;
const BOUNDARY: &str = "mailgate-test-boundary";

#[derive(Default)]
pub(crate) struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub(crate) fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MailError::NoRecipients);
        }

        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub(crate) struct TestApp {
    router: Router,
    pub(crate) mailer: Arc<RecordingMailer>,
    pub(crate) clock: ManualClock,
    pub(crate) storage: InMemoryStorage,
}

impl TestApp {
    pub(crate) fn new() -> Self {
        Self::with_storage(InMemoryStorage::new())
    }

    pub(crate) fn with_storage(storage: InMemoryStorage) -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        let clock = ManualClock::new(T);

        let state = AppState::builder(Config::default())
            .limiter(SendLimiter::with_storage(storage.clone()))
            .mailer(mailer.clone())
            .clock(Arc::new(clock.clone()))
            .build()
            .unwrap();

        Self {
            router: router(state),
            mailer,
            clock,
            storage,
        }
    }

    pub(crate) async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub(crate) async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::get(path);

        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        self.request(request.body(Body::empty()).unwrap()).await
    }

    /// Logs in with the default credentials and returns the `Cookie` header value.
    pub(crate) async fn login(&self) -> String {
        let response = self
            .request(
                Request::post("/login")
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("username=admin&password=admin"))
                    .unwrap(),
            )
            .await;

        session_cookie(&response).unwrap()
    }

    pub(crate) async fn send(&self, cookie: &str, form: &SendForm<'_>) -> Response<Body> {
        let request = Request::post("/send-email")
            .header(COOKIE, cookie)
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(form.encode()))
            .unwrap();

        self.request(request).await
    }
}

pub(crate) struct SendForm<'a> {
    pub(crate) to: &'a str,
    pub(crate) cc: &'a str,
    pub(crate) subject: &'a str,
    pub(crate) body: &'a str,
    pub(crate) attachment: Option<(&'a str, &'a str, &'a [u8])>,
}

impl Default for SendForm<'_> {
    fn default() -> Self {
        Self {
            to: "tarou@example.com",
            cc: "",
            subject: "Hello",
            body: "<p>Hi there</p>",
            attachment: None,
        }
    }
}

impl SendForm<'_> {
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();

        for (name, value) in [
            ("to", self.to),
            ("cc", self.cc),
            ("subject", self.subject),
            ("body", self.body),
        ] {
            out.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
            );
        }

        let (filename, content_type, content) = self.attachment.unwrap_or(("", "application/octet-stream", b""));

        out.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"attachment\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        out.extend_from_slice(content);
        out.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        out
    }
}

pub(crate) fn session_cookie(response: &Response<Body>) -> Option<String> {
    let value = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    value.split(';').next().map(str::to_string)
}

pub(crate) async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub(crate) fn location(response: &Response<Body>) -> &str {
    response.headers()[http::header::LOCATION].to_str().unwrap()
}
