//! End-to-end HTTP flows: login, rolling tokens, replay, logout, API key.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use token_test_utils::{
    TestTokenServer, TokenAssertions, API_KEY_HEADER, TEST_API_KEY, TEST_RESOURCE_ALICE,
    TEST_RESOURCE_BOB, TOKEN_HEADER,
};

async fn me(client: &Client, server: &TestTokenServer, token: &str) -> reqwest::Result<reqwest::Response> {
    client
        .get(format!("{}/api/v1/me", server.url()))
        .header(TOKEN_HEADER, token)
        .send()
        .await
}

// ============================================================================
// Login and rolling tokens
// ============================================================================

#[tokio::test]
async fn test_login_issues_token() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;

    let response = Client::new()
        .post(server.login_url())
        .json(&json!({ "resource_id": TEST_RESOURCE_ALICE }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["result"], "success");
    assert_eq!(body["resource_id"], TEST_RESOURCE_ALICE);
    body["token"]
        .as_str()
        .expect("token field")
        .assert_token_format()
        .assert_for_resource(TEST_RESOURCE_ALICE);

    Ok(())
}

#[tokio::test]
async fn test_each_response_rolls_the_token() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = Client::new();
    let mut token = server.login(TEST_RESOURCE_ALICE).await?;

    for _ in 0..3 {
        let response = me(&client, &server, &token).await?;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = response.json().await?;
        assert_eq!(body["resource_id"], TEST_RESOURCE_ALICE);
        let next = body["token"].as_str().expect("rolling token").to_string();
        next.assert_for_resource(TEST_RESOURCE_ALICE)
            .assert_differs_from(&token);
        token = next;
    }

    assert_eq!(server.token_count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_replayed_token_is_forbidden() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = Client::new();
    let token = server.login(TEST_RESOURCE_ALICE).await?;

    assert_eq!(me(&client, &server, &token).await?.status(), StatusCode::OK);

    let replay = me(&client, &server, &token).await?;
    assert_eq!(replay.status(), StatusCode::FORBIDDEN);
    let body: Value = replay.json().await?;
    assert_eq!(body["result"], "error");
    assert_eq!(body["errors"][0], "Forbidden");
    assert!(body.get("code").is_none(), "Generic refusal carries no code");

    Ok(())
}

#[tokio::test]
async fn test_token_accepted_as_query_parameter() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let token = server.login(TEST_RESOURCE_BOB).await?;

    let response = Client::new()
        .get(format!("{}/api/v1/me", server.url()))
        .query(&[("token", token.as_str())])
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["resource_id"], TEST_RESOURCE_BOB);
    Ok(())
}

#[tokio::test]
async fn test_custom_credential_names() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn_with(&[
        ("TOKEN_HEADER_NAME", "X-Session"),
        ("TOKEN_PARAMETER_NAME", "session"),
    ])
    .await?;
    let token = server.login(TEST_RESOURCE_ALICE).await?;

    let response = Client::new()
        .get(format!("{}/api/v1/me", server.url()))
        .header("X-Session", &token)
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert!(body["session"].is_string());
    assert!(body.get("token").is_none());
    Ok(())
}

// ============================================================================
// Detailed errors
// ============================================================================

#[tokio::test]
async fn test_detailed_error_codes() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn_with(&[("TOKEN_FORBIDDEN_ON_ERROR", "false")]).await?;
    let client = Client::new();
    let valid = server.login(TEST_RESOURCE_ALICE).await?;
    let (value, _) = valid.split_once('|').expect("separator");

    let cases = [
        (None, 900),
        (Some("no-separator".to_string()), 901),
        (Some("a|b|c".to_string()), 901),
        (Some(format!("{}|{}", value, TEST_RESOURCE_BOB)), 902),
        (Some(format!("wrong|{}", TEST_RESOURCE_ALICE)), 905),
    ];

    for (token, code) in cases {
        let mut request = client.get(format!("{}/api/v1/me", server.url()));
        if let Some(ref token) = token {
            request = request.header(TOKEN_HEADER, token);
        }
        let response = request.send().await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "token {token:?}");

        let body: Value = response.json().await?;
        assert_eq!(body["result"], "error");
        assert_eq!(body["code"], code, "token {token:?}");
    }

    // The wrong-value attempt left the real token usable.
    assert_eq!(me(&client, &server, &valid).await?.status(), StatusCode::OK);
    Ok(())
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_ends_the_session() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = Client::new();
    let token = server.login(TEST_RESOURCE_ALICE).await?;

    let response = client
        .post(format!("{}/api/v1/logout", server.url()))
        .header(TOKEN_HEADER, &token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["result"], "success");
    assert!(body.get("token").is_none(), "Logout issues no new token");

    assert_eq!(server.token_count().await?, 0);
    assert_eq!(
        me(&client, &server, &token).await?.status(),
        StatusCode::FORBIDDEN
    );
    Ok(())
}

// ============================================================================
// API key
// ============================================================================

#[tokio::test]
async fn test_api_key_guards_login() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn_with_api_key().await?;
    let client = Client::new();
    let body = json!({ "resource_id": TEST_RESOURCE_ALICE });

    let missing = client.post(server.login_url()).json(&body).send().await?;
    assert_eq!(missing.status(), StatusCode::FORBIDDEN);

    let wrong = client
        .post(server.login_url())
        .header(API_KEY_HEADER, "not-the-key")
        .json(&body)
        .send()
        .await?;
    assert_eq!(wrong.status(), StatusCode::FORBIDDEN);

    let via_query = client
        .post(server.login_url())
        .query(&[("apikey", TEST_API_KEY)])
        .json(&body)
        .send()
        .await?;
    assert_eq!(via_query.status(), StatusCode::OK);

    assert_eq!(server.token_count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_api_key_checked_before_token() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn_with_api_key().await?;
    let client = Client::new();
    let token = server.login(TEST_RESOURCE_ALICE).await?;

    // Without the key the request is refused and the token is not spent.
    let refused = me(&client, &server, &token).await?;
    assert_eq!(refused.status(), StatusCode::FORBIDDEN);
    assert_eq!(server.token_count().await?, 1);

    let response = client
        .get(format!("{}/api/v1/me", server.url()))
        .header(TOKEN_HEADER, &token)
        .header(API_KEY_HEADER, TEST_API_KEY)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_login_rejects_malformed_body() -> Result<(), anyhow::Error> {
    let server = TestTokenServer::spawn().await?;
    let client = Client::new();

    for body in [json!({}), json!({ "resource_id": "" }), json!({ "resource_id": "a|b" })] {
        let response = client.post(server.login_url()).json(&body).send().await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
    }

    assert_eq!(server.token_count().await?, 0);
    Ok(())
}
