mod common;

use anyhow::Result;
use reqwest::{redirect::Policy, StatusCode};

use common::{app, token, TestServer};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = TestServer::spawn(app()).await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn gateway_decisions_over_the_wire() -> Result<()> {
    let server = TestServer::spawn(app()).await?;
    let client = reqwest::Client::builder().redirect(Policy::none()).build()?;

    let res = client.get(format!("{}/api/meetings", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/api/meetings", server.base_url))
        .bearer_auth(token(1, "COMPANY_ADMIN", Some(1)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/dashboard", server.base_url))
        .header("cookie", format!("token={}", token(1, "SUPER_ADMIN", None)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        res.headers().get("location").and_then(|v| v.to_str().ok()),
        Some("/super-admin")
    );
    Ok(())
}
