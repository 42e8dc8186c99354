#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::Value;
use tower::ServiceExt;

use tenant_gateway::auth::{Role, TokenDecoder, TokenIssuer, VerificationMode};
use tenant_gateway::config::AppConfig;
use tenant_gateway::gateway::Gateway;
use tenant_gateway::handlers::AppState;

pub const SECRET: &str = "integration-test-secret";

pub fn gateway() -> Arc<Gateway> {
    let decoder = TokenDecoder::new(VerificationMode::Verified {
        secret: SECRET.to_string(),
        leeway_secs: 0,
    })
    .expect("decoder");
    Arc::new(Gateway::new(decoder, "token"))
}

pub fn payload_only_gateway() -> Arc<Gateway> {
    let decoder = TokenDecoder::new(VerificationMode::PayloadOnly).expect("decoder");
    Arc::new(Gateway::new(decoder, "token"))
}

pub fn app() -> Router {
    app_with(gateway())
}

pub fn app_with(gateway: Arc<Gateway>) -> Router {
    tenant_gateway::app::app(gateway, AppState::new(), &AppConfig::development().api)
}

/// Token signed with the test secret.
pub fn token(id: i64, role: &str, company: Option<i64>) -> String {
    signed_with(SECRET, id, role, company)
}

pub fn signed_with(secret: &str, id: i64, role: &str, company: Option<i64>) -> String {
    TokenIssuer::new(secret, chrono::Duration::hours(1))
        .expect("issuer")
        .mint(id, Role::parse(role).expect("role"), company)
        .expect("mint")
}

/// Unsigned token with an arbitrary payload segment.
pub fn unsigned(payload: &str) -> String {
    format!(
        "{}.{}.forged",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload)
    )
}

/// Structurally broken tokens: wrong segment count, bad base64, bad JSON.
pub fn garbage_tokens() -> Vec<String> {
    vec![
        "not.a.jwt".to_string(),
        "only-one-segment".to_string(),
        "two.segments".to_string(),
        "a.b.c.d".to_string(),
        "header.%%%not-base64%%%.sig".to_string(),
        format!("header.{}.sig", URL_SAFE_NO_PAD.encode("this is not json")),
    ]
}

pub fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("infallible")
}

pub async fn body_json(response: Response) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    serde_json::from_slice(&bytes).context("response body is not JSON")
}

pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// The app bound to a real port, for tests that go over the wire.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

impl TestServer {
    pub async fn spawn(app: Router) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self { port, base_url };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}
