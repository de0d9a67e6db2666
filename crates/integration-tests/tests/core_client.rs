//! API client behaviour against the in-process commerce API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};

use boutique_core::OrderStatusRecord;
use boutique_core::client::{AccessToken, ApiClient, ApiError, LoginError, SessionTokens};
use boutique_integration_tests::{
    CUSTOMER_EMAIL, FakeApi, PASSWORD, REFRESH_TOKEN, STAFF_EMAIL,
};

fn client(api: &FakeApi) -> ApiClient {
    let config = api.api_config();
    ApiClient::new(&config.base_url, config.timeout).unwrap()
}

#[tokio::test]
async fn test_login_returns_bare_token_pair() {
    let api = FakeApi::spawn().await;
    let client = client(&api);

    let pair = client.login(STAFF_EMAIL, PASSWORD).await.unwrap();
    assert_eq!(pair.access, api.access_token());
    assert_eq!(pair.refresh, REFRESH_TOKEN);
    assert!(pair.user.is_none());
}

#[tokio::test]
async fn test_staff_is_confirmed_through_staff_endpoint() {
    let api = FakeApi::spawn().await;
    let client = client(&api);

    let staff = client.login(STAFF_EMAIL, PASSWORD).await.unwrap();
    client.confirm_staff(&staff).await.unwrap();

    let customer = client.login(CUSTOMER_EMAIL, PASSWORD).await.unwrap();
    let err = client.confirm_staff(&customer).await.unwrap_err();
    assert!(matches!(err, LoginError::Forbidden));
    assert_eq!(api.promotion_reads(), 2);
}

#[tokio::test]
async fn test_login_failures_are_classified() {
    let api = FakeApi::spawn().await;
    let client = client(&api);

    let err = client.login("nobody@gmail.com", PASSWORD).await.unwrap_err();
    assert!(matches!(err, LoginError::UnknownAccount));
    assert_eq!(err.to_string(), "User does not exist");

    let err = client.login(CUSTOMER_EMAIL, "wrong").await.unwrap_err();
    assert!(matches!(err, LoginError::WrongPassword));
}

#[tokio::test]
async fn test_expired_access_is_refreshed_once_and_retried() {
    let api = FakeApi::spawn().await;
    let client = client(&api);
    let tokens = SessionTokens::from(&client.login(STAFF_EMAIL, PASSWORD).await.unwrap());
    api.expire_access();

    let attempts = AtomicUsize::new(0);
    let refreshed = client
        .with_refresh(&tokens, |token| {
            attempts.fetch_add(1, Ordering::SeqCst);
            let client = &client;
            async move {
                client
                    .get::<Vec<OrderStatusRecord>>("order-statuses/", Some(&token))
                    .await
            }
        })
        .await
        .unwrap();

    assert_eq!(refreshed.value.len(), 2);
    assert_eq!(
        refreshed.access.as_ref().map(AccessToken::expose),
        Some(api.access_token().as_str())
    );
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(api.refresh_count(), 1);
}

#[tokio::test]
async fn test_valid_access_skips_refresh() {
    let api = FakeApi::spawn().await;
    let client = client(&api);
    let tokens = SessionTokens::from(&client.login(STAFF_EMAIL, PASSWORD).await.unwrap());

    let refreshed = client
        .with_refresh(&tokens, |token| {
            let client = &client;
            async move {
                client
                    .get::<Vec<OrderStatusRecord>>("order-statuses/", Some(&token))
                    .await
            }
        })
        .await
        .unwrap();

    assert!(refreshed.access.is_none());
    assert_eq!(api.refresh_count(), 0);
}

#[tokio::test]
async fn test_missing_refresh_token_surfaces_unauthorized() {
    let api = FakeApi::spawn().await;
    let client = client(&api);
    let tokens = SessionTokens {
        access: AccessToken::new("stale".to_string()),
        refresh: None,
    };

    let err = client
        .with_refresh(&tokens, |token| {
            let client = &client;
            async move {
                client
                    .get::<Vec<OrderStatusRecord>>("order-statuses/", Some(&token))
                    .await
            }
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(api.refresh_count(), 0);
}

#[tokio::test]
async fn test_ping_reports_reachable_api() {
    let api = FakeApi::spawn().await;
    // order-statuses answers 401 without a token, which still proves the API is up.
    assert!(client(&api).ping().await.is_ok());
}
