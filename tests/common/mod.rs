use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tempfile::NamedTempFile;

use finch_relay::config::Config;
use finch_relay::email::{ContactMail, MailTransport};
use finch_relay::state::SharedState;

pub const NONCE_SECRET: &str = "test-nonce-secret-that-is-long-enough";

/// A running test server instance with its own settings document.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: SharedState,
    // Held so the settings document outlives the server.
    _settings_file: NamedTempFile,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Fetch the form bootstrap payload.
    pub async fn bootstrap(&self) -> Value {
        let resp = self
            .client
            .get(self.url("/v1/form"))
            .send()
            .await
            .expect("bootstrap request failed");
        assert_eq!(resp.status(), StatusCode::OK, "bootstrap non-200");
        resp.json().await.expect("bootstrap body not JSON")
    }

    /// Fetch a fresh submit nonce.
    pub async fn nonce(&self) -> String {
        self.bootstrap().await["nonce"]
            .as_str()
            .expect("bootstrap carried no nonce")
            .to_string()
    }

    /// Submit form-urlencoded data, return (body, status).
    pub async fn submit_form(&self, data: &[(&str, &str)]) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/v1/submit"))
            .form(data)
            .send()
            .await
            .expect("submit form failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit JSON data, return (body, status).
    pub async fn submit_json(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/v1/submit"))
            .json(data)
            .send()
            .await
            .expect("submit json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit a valid contact form carrying `nonce`, return (body, status).
    pub async fn submit_valid(&self, nonce: &str) -> (Value, StatusCode) {
        self.submit_form(&[
            ("form_nonce", nonce),
            ("name", "Jane Doe"),
            ("email", "jane@example.com"),
            ("subject", "General enquiry about pricing"),
            ("message", "I would like to know more about your pricing."),
        ])
        .await
    }
}

/// Mail transport that records every send.
#[derive(Default)]
pub struct MemoryMailer {
    pub sent: Mutex<Vec<ContactMail>>,
}

impl MemoryMailer {
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MailTransport for MemoryMailer {
    async fn send(&self, mail: ContactMail) -> Result<(), String> {
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

/// Mail transport that always fails.
pub struct FailingMailer;

#[async_trait]
impl MailTransport for FailingMailer {
    async fn send(&self, _mail: ContactMail) -> Result<(), String> {
        Err("simulated transport failure".to_string())
    }
}

/// Spawn a test app with the given settings document and mail transport.
pub async fn spawn_app(settings: Value, mailer: Option<Arc<dyn MailTransport>>) -> TestApp {
    spawn_app_with_admin(settings, mailer, "admin@example.com").await
}

/// Like [`spawn_app`] but with a caller-chosen admin fallback address.
pub async fn spawn_app_with_admin(
    settings: Value,
    mailer: Option<Arc<dyn MailTransport>>,
    admin_email: &str,
) -> TestApp {
    let settings_file = NamedTempFile::new().expect("failed to create settings file");
    std::fs::write(settings_file.path(), settings.to_string())
        .expect("failed to write settings file");

    let config = Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        site_name: "Acme".to_string(),
        nonce_secret: NONCE_SECRET.to_string(),
        nonce_ttl_secs: 3600,
        admin_email: admin_email.to_string(),
        settings_path: settings_file.path().to_path_buf(),
        max_body_size: 1_048_576,
        allowed_origins: vec![],
        log_level: "warn".to_string(),
        smtp: None,
    };

    let (app, state) = finch_relay::build_app(config, mailer);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        state,
        _settings_file: settings_file,
    }
}

/// Spawn with a [`MemoryMailer`]; returns the mailer handle alongside
/// the app.
pub async fn spawn_with_memory_mailer(settings: Value) -> (TestApp, Arc<MemoryMailer>) {
    let mailer = Arc::new(MemoryMailer::default());
    let app = spawn_app(settings, Some(mailer.clone())).await;
    (app, mailer)
}
