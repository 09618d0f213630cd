//! Concurrent issuance and consumption against a multi-connection pool.

use chrono::Duration;
use common::secret::ExposeSecret;
use common::types::ResourceId;
use futures::future::join_all;
use token_service::errors::TokenError;
use token_service::repositories::tokens;
use token_service::services::TokenService;
use token_test_utils::{TestDatabase, TEST_RESOURCE_ALICE, TEST_RESOURCE_BOB};

const CONCURRENCY: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_consumers_exactly_one_wins() -> Result<(), anyhow::Error> {
    let db = TestDatabase::new().await?;
    let service = TokenService::new(db.pool().clone(), Duration::hours(1));
    let token = service
        .issue(&ResourceId::new(TEST_RESOURCE_ALICE)?)
        .await?
        .expose_secret()
        .to_string();

    let handles = (0..CONCURRENCY).map(|_| {
        let service = service.clone();
        let token = token.clone();
        tokio::spawn(async move { service.consume(Some(&token)).await })
    });

    let mut successes = 0;
    for result in join_all(handles).await {
        match result? {
            Ok(resource) => {
                assert_eq!(resource.as_str(), TEST_RESOURCE_ALICE);
                successes += 1;
            }
            Err(e) => assert_eq!(e, TokenError::ResourceNotFound, "Losers see no record"),
        }
    }

    assert_eq!(successes, 1, "Exactly one consumer must succeed");
    assert_eq!(tokens::count(db.pool()).await?, 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issue_leaves_one_valid_token() -> Result<(), anyhow::Error> {
    let db = TestDatabase::new().await?;
    let service = TokenService::new(db.pool().clone(), Duration::hours(1));
    let resource = ResourceId::new(TEST_RESOURCE_ALICE)?;

    let handles = (0..CONCURRENCY).map(|_| {
        let service = service.clone();
        let resource = resource.clone();
        tokio::spawn(async move {
            service
                .issue(&resource)
                .await
                .map(|t| t.expose_secret().to_string())
        })
    });

    let mut issued = Vec::with_capacity(CONCURRENCY);
    for result in join_all(handles).await {
        issued.push(result??);
    }

    assert_eq!(
        tokens::count(db.pool()).await?,
        1,
        "At most one record per resource"
    );

    let mut successes = 0;
    for token in &issued {
        match service.consume(Some(token)).await {
            Ok(_) => successes += 1,
            Err(TokenError::InvalidValue) | Err(TokenError::ResourceNotFound) => {}
            Err(e) => anyhow::bail!("Unexpected error: {:?}", e),
        }
    }
    assert_eq!(successes, 1, "Exactly one issued token must remain valid");

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_resources_do_not_interfere() -> Result<(), anyhow::Error> {
    let db = TestDatabase::new().await?;
    let service = TokenService::new(db.pool().clone(), Duration::hours(1));

    let handles = (0..CONCURRENCY).map(|i| {
        let service = service.clone();
        let resource = if i % 2 == 0 {
            TEST_RESOURCE_ALICE
        } else {
            TEST_RESOURCE_BOB
        };
        tokio::spawn(async move {
            let resource = ResourceId::new(format!("{}-{}", resource, i))?;
            let token = service.issue(&resource).await?;
            let consumed = service.consume(Some(token.expose_secret())).await?;
            anyhow::ensure!(consumed == resource, "Consumed the wrong resource");
            Ok::<_, anyhow::Error>(())
        })
    });

    for result in join_all(handles).await {
        result??;
    }
    assert_eq!(tokens::count(db.pool()).await?, 0);

    Ok(())
}
