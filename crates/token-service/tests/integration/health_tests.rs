//! Integration tests for health probes and the metrics endpoint.

use reqwest::StatusCode;
use token_test_utils::TestTokenServer;

#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::get(format!("{}/health", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");
    Ok(())
}

#[tokio::test]
async fn test_ready_endpoint_returns_ok_when_healthy() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = reqwest::get(format!("{}/ready", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "healthy");
    assert!(body.get("error").is_none());
    Ok(())
}

#[tokio::test]
async fn test_ready_endpoint_returns_503_when_store_closed() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    server.pool().close().await;

    let response = reqwest::get(format!("{}/ready", server.url())).await?;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["error"], "Service dependencies unavailable");
    Ok(())
}

#[tokio::test]
async fn test_probes_skip_api_key() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn_with_api_key().await?;

    for path in ["/health", "/ready", "/metrics"] {
        let response = reqwest::get(format!("{}{}", server.url(), path)).await?;
        assert_eq!(response.status(), StatusCode::OK, "{path} should be public");
    }
    Ok(())
}
