//! Customer flows through the storefront router.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use boutique_core::Location;
use boutique_integration_tests::{
    CUSTOMER_EMAIL, FakeApi, PASSWORD, VNPAY_URL, browser, spawn_storefront,
};
use reqwest::{StatusCode, header::LOCATION};
use serde_json::json;

async fn sign_in(client: &reqwest::Client, storefront: &str, next: &str) -> reqwest::Response {
    client
        .post(format!("{storefront}/login"))
        .form(&[
            ("email", CUSTOMER_EMAIL),
            ("password", PASSWORD),
            ("next", next),
        ])
        .send()
        .await
        .unwrap()
}

fn location(response: &reqwest::Response) -> &str {
    response.headers()[LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn test_health_probes() {
    let api = FakeApi::spawn().await;
    let storefront = spawn_storefront(&api).await;
    let client = browser();

    let resp = client.get(format!("{storefront}/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = client
        .get(format!("{storefront}/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_home_lists_products_with_security_headers() {
    let api = FakeApi::spawn().await;
    let storefront = spawn_storefront(&api).await;

    let resp = browser().get(&storefront).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("content-security-policy"));
    assert!(resp.headers().contains_key("x-request-id"));
    assert!(resp.text().await.unwrap().contains("Linen Shirt"));
}

#[tokio::test]
async fn test_cart_requires_login() {
    let api = FakeApi::spawn().await;
    let storefront = spawn_storefront(&api).await;

    let resp = browser()
        .get(format!("{storefront}/cart"))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/login?next=%2Fcart");
    assert_eq!(api.cart_reads(), 0);
}

#[tokio::test]
async fn test_wrong_password_rerenders_login() {
    let api = FakeApi::spawn().await;
    let storefront = spawn_storefront(&api).await;

    let resp = browser()
        .post(format!("{storefront}/login"))
        .form(&[("email", CUSTOMER_EMAIL), ("password", "nope")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Incorrect password"));
}

#[tokio::test]
async fn test_login_then_cart() {
    let api = FakeApi::spawn().await;
    let storefront = spawn_storefront(&api).await;
    let client = browser();

    let resp = sign_in(&client, &storefront, "/cart").await;
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/cart");

    let resp = client
        .get(format!("{storefront}/cart"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Linen Shirt"));
    assert!(body.contains("Login successfully!"));
    assert_eq!(api.refresh_count(), 0);
}

#[tokio::test]
async fn test_expired_session_token_is_refreshed_transparently() {
    let api = FakeApi::spawn().await;
    let storefront = spawn_storefront(&api).await;
    let client = browser();
    sign_in(&client, &storefront, "/").await;
    api.expire_access();

    for _ in 0..2 {
        let resp = client
            .get(format!("{storefront}/cart"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // The renewed token was stored, so the second page load needs no refresh.
    assert_eq!(api.refresh_count(), 1);
    assert_eq!(api.cart_reads(), 3);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let api = FakeApi::spawn().await;
    let storefront = spawn_storefront(&api).await;
    let client = browser();
    sign_in(&client, &storefront, "/").await;

    let resp = client
        .post(format!("{storefront}/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/");

    let resp = client
        .get(format!("{storefront}/cart"))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
}

#[tokio::test]
async fn test_province_list_is_cached() {
    let api = FakeApi::spawn().await;
    let storefront = spawn_storefront(&api).await;
    let client = browser();

    for _ in 0..3 {
        let provinces: Vec<Location> = client
            .get(format!("{storefront}/api/provinces"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(provinces.len(), 2);
        assert_eq!(provinces[1].id, 79);
    }
    assert_eq!(api.province_reads(), 1);
}

#[tokio::test]
async fn test_add_to_cart_posts_variant_and_quantity() {
    let api = FakeApi::spawn().await;
    let storefront = spawn_storefront(&api).await;
    let client = browser();
    sign_in(&client, &storefront, "/").await;

    let resp = client
        .post(format!("{storefront}/productdetail/linen-shirt"))
        .form(&[("variant_id", "10"), ("quantity", "2")])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/cart");
    assert_eq!(api.cart_adds(), vec![json!({ "variant": 10, "quantity": 2 })]);

    // Sold-out variants never reach the API.
    let resp = client
        .post(format!("{storefront}/productdetail/linen-shirt"))
        .form(&[("variant_id", "11"), ("quantity", "1")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/productdetail/linen-shirt");
    assert_eq!(api.cart_adds().len(), 1);
}

#[tokio::test]
async fn test_store_pickup_order_leaves_out_delivery_info() {
    let api = FakeApi::spawn().await;
    let storefront = spawn_storefront(&api).await;
    let client = browser();
    sign_in(&client, &storefront, "/").await;

    let resp = client
        .post(format!("{storefront}/checkout"))
        .form(&[
            ("items", "1"),
            ("coupon", "1,3"),
            ("delivery_method", "IN_STORE_PICKUP"),
            ("address", "4"),
            ("payment_method", "1"),
            ("customer_note", " Call before noon "),
        ])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), "/account/order?type=Pending");

    let placed = api.placed_orders();
    assert_eq!(placed.len(), 1);
    assert_eq!(
        placed[0],
        json!({
            "payment_method": 1,
            "customer_note": "Call before noon",
            "cart_item_ids": [1],
            "coupons": [1, 3],
        })
    );
}

#[tokio::test]
async fn test_online_payment_order_redirects_to_gateway() {
    let api = FakeApi::spawn().await;
    let storefront = spawn_storefront(&api).await;
    let client = browser();
    sign_in(&client, &storefront, "/").await;

    let resp = client
        .post(format!("{storefront}/checkout"))
        .form(&[
            ("items", "1"),
            ("delivery_method", "STANDARD"),
            ("address", "4"),
            ("payment_method", "2"),
        ])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), VNPAY_URL);

    let placed = api.placed_orders();
    assert_eq!(placed[0]["delivery_info"], json!(4));
    assert_eq!(placed[0]["coupons"], json!([]));
}

#[tokio::test]
async fn test_checkout_without_address_sends_nothing() {
    let api = FakeApi::spawn().await;
    let storefront = spawn_storefront(&api).await;
    let client = browser();
    sign_in(&client, &storefront, "/").await;

    let resp = client
        .post(format!("{storefront}/checkout"))
        .form(&[
            ("items", "1"),
            ("coupon", "3"),
            ("code", "SHIP1"),
            ("delivery_method", "STANDARD"),
            ("payment_method", "1"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&resp), "/checkout?items=1&coupon=3&code=SHIP1");
    assert!(api.placed_orders().is_empty());
}
