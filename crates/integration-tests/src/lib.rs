//! Harness for driving a real mailgate server over HTTP.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use config::Config;
use mail::{MailError, Mailer, OutgoingEmail};
use reqwest::{multipart, redirect};
use server::AppState;
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    time::timeout,
};

/// Captures outgoing mail instead of talking to a relay.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    delay: Option<Duration>,
}

impl RecordingMailer {
    /// A relay that takes `delay` to confirm a message it already accepted.
    pub fn slow(delay: Duration) -> Self {
        Self {
            sent: Mutex::default(),
            delay: Some(delay),
        }
    }

    /// Everything delivered so far, in order.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(())
    }
}

/// A browser-like client: keeps cookies, does not follow redirects.
pub struct TestClient {
    address: String,
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    fn new(address: SocketAddr) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            address: address.to_string(),
            base_url: format!("http://{address}"),
            client,
        }
    }

    /// Send a GET request to the given path
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap()
    }

    /// Post the login form.
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/login", self.base_url))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .unwrap()
    }

    /// Post the logout form.
    pub async fn logout(&self) -> reqwest::Response {
        self.client
            .post(format!("{}/logout", self.base_url))
            .send()
            .await
            .unwrap()
    }

    /// Post the send form the dashboard submits.
    pub async fn send_email(&self, to: &str, subject: &str, body: &str) -> reqwest::Response {
        let form = multipart::Form::new()
            .text("to", to.to_string())
            .text("cc", "")
            .text("subject", subject.to_string())
            .text("body", body.to_string());

        self.send_form(form).await
    }

    /// Post an arbitrary multipart form to `/send-email`.
    pub async fn send_form(&self, form: multipart::Form) -> reqwest::Response {
        self.client
            .post(format!("{}/send-email", self.base_url))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }

    /// Logs in and submits the send form over a bare socket, then hangs up after `hang_up_after`
    /// without reading the response.
    pub async fn send_email_and_disconnect(&self, to: &str, hang_up_after: Duration) {
        let login = self.login("admin", "admin").await;
        let set_cookie = login.headers()["set-cookie"].to_str().unwrap();
        let cookie = set_cookie.split(';').next().unwrap();

        let boundary = "mailgate-disconnect";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"to\"\r\n\r\n{to}\r\n\
             --{boundary}\r\nContent-Disposition: form-data; name=\"subject\"\r\n\r\nHi\r\n\
             --{boundary}\r\nContent-Disposition: form-data; name=\"body\"\r\n\r\n<p>Hi</p>\r\n\
             --{boundary}--\r\n"
        );

        let request = format!(
            "POST /send-email HTTP/1.1\r\nHost: {}\r\nCookie: {cookie}\r\n\
             Content-Type: multipart/form-data; boundary={boundary}\r\nContent-Length: {}\r\n\r\n{body}",
            self.address,
            body.len()
        );

        let mut stream = TcpStream::connect(self.address.as_str()).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();

        tokio::time::sleep(hang_up_after).await;
        drop(stream);
    }

    /// The dashboard's quota JSON.
    pub async fn email_count(&self) -> serde_json::Value {
        self.get("/email-count").await.json().await.unwrap()
    }
}

/// Test server that manages the lifecycle of a server instance
pub struct TestServer {
    pub client: TestClient,
    pub address: SocketAddr,
    pub mailer: Arc<RecordingMailer>,
    _handle: tokio::task::JoinHandle<()>,
}

/// Configures a [`TestServer`] before it starts.
#[derive(Default)]
pub struct TestServerBuilder {
    mailer: Option<Arc<RecordingMailer>>,
}

impl TestServer {
    pub fn builder() -> TestServerBuilder {
        TestServerBuilder::default()
    }

    /// A second client with its own cookie jar.
    pub fn new_client(&self) -> TestClient {
        TestClient::new(self.address)
    }
}

impl TestServerBuilder {
    /// Share a mailer across servers, e.g. to simulate a restart.
    pub fn mailer(mut self, mailer: Arc<RecordingMailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Start a new test server with the given TOML configuration
    pub async fn build(self, config_toml: &str) -> TestServer {
        let config: Config = toml::from_str(config_toml).unwrap();
        let mailer = self.mailer.unwrap_or_default();

        let state = AppState::builder(config).mailer(mailer.clone()).build().unwrap();

        // Find an available port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let handle = tokio::spawn(async move {
            if let Err(e) = server::serve_with_state(address, state).await {
                eprintln!("Server failed to start: {e}");
            }
        });

        let client = TestClient::new(address);

        for _ in 0..20 {
            let probe = timeout(
                Duration::from_millis(100),
                reqwest::get(format!("http://{address}/login")),
            );

            if let Ok(Ok(_)) = probe.await {
                break;
            }

            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestServer {
            client,
            address,
            mailer,
            _handle: handle,
        }
    }
}
