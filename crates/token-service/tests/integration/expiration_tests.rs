//! Expiration handling, lazily on lookup and through the purge.

use reqwest::StatusCode;
use token_test_utils::{TestTokenServer, TokenAssertions, TEST_RESOURCE_ALICE, TOKEN_HEADER};

#[tokio::test]
async fn test_short_ttl_token_expires() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn_with(&[
        ("TOKEN_TTL_SECONDS", "1"),
        ("TOKEN_FORBIDDEN_ON_ERROR", "false"),
    ])
    .await?;

    let token = server.login(TEST_RESOURCE_ALICE).await?;
    token.assert_token_format();

    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/api/v1/me", server.url()))
        .header(TOKEN_HEADER, &token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["code"], 903);
    assert_eq!(body["errors"][0], "Token expired and thus cannot be used");

    Ok(())
}

#[tokio::test]
async fn test_expired_record_is_removed_on_lookup() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn_with(&[("TOKEN_FORBIDDEN_ON_ERROR", "false")]).await?;
    let token = server.create_expired_token(TEST_RESOURCE_ALICE, 60).await?;
    let client = reqwest::Client::new();

    let first: serde_json::Value = client
        .get(format!("{}/api/v1/me", server.url()))
        .header(TOKEN_HEADER, &token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(first["code"], 903);
    assert_eq!(server.token_count().await?, 0);

    let second: serde_json::Value = client
        .get(format!("{}/api/v1/me", server.url()))
        .header(TOKEN_HEADER, &token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(second["code"], 902);

    Ok(())
}

#[tokio::test]
async fn test_purge_removes_only_expired() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    server.create_expired_token("expired-1", 10).await?;
    server.create_expired_token("expired-2", 3600).await?;
    let live = server.issue_token(TEST_RESOURCE_ALICE).await?;

    assert_eq!(server.tokens().purge_expired().await?, 2);
    assert_eq!(server.token_count().await?, 1);
    assert_eq!(
        server.tokens().consume(Some(&live)).await?.as_str(),
        TEST_RESOURCE_ALICE
    );

    Ok(())
}
