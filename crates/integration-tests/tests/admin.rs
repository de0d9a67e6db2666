//! Staff sign-in and order screens through the admin router.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use boutique_admin::backend;
use boutique_core::client::{AccessToken, ApiClient};
use boutique_core::{CartItemId, NewOrder, PaymentMethodId};
use boutique_integration_tests::{
    CUSTOMER_EMAIL, FakeApi, PASSWORD, STAFF_EMAIL, browser, spawn_admin,
};
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, header::LOCATION};
use serde_json::json;

async fn sign_in(client: &reqwest::Client, admin: &str, email: &str) -> reqwest::Response {
    client
        .post(format!("{admin}/auth/login"))
        .form(&[("email", email), ("password", PASSWORD)])
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_dashboard_requires_staff_login() {
    let api = FakeApi::spawn().await;
    let admin = spawn_admin(&api).await;

    let resp = browser().get(&admin).send().await.unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers().get(LOCATION).unwrap(), "/auth/login");
}

#[tokio::test]
async fn test_staff_login_redirects_to_dashboard() {
    let api = FakeApi::spawn().await;
    let admin = spawn_admin(&api).await;

    let resp = sign_in(&browser(), &admin, STAFF_EMAIL).await;
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers().get(LOCATION).unwrap(), "/");
    // The login response has no roles, so access was confirmed by a staff call.
    assert_eq!(api.promotion_reads(), 1);
}

#[tokio::test]
async fn test_customer_account_is_turned_away() {
    let api = FakeApi::spawn().await;
    let admin = spawn_admin(&api).await;
    let client = browser();

    let resp = sign_in(&client, &admin, CUSTOMER_EMAIL).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.text()
            .await
            .unwrap()
            .contains("This account is not allowed to sign in here")
    );
    assert_eq!(api.promotion_reads(), 1);

    // No session was stored for the customer.
    let resp = client.get(&admin).send().await.unwrap();
    assert_eq!(resp.headers().get(LOCATION).unwrap(), "/auth/login");
    let resp = client.get(format!("{admin}/orders")).send().await.unwrap();
    assert_eq!(resp.headers().get(LOCATION).unwrap(), "/auth/login");
    assert!(api.order_filters().is_empty());
}

#[tokio::test]
async fn test_unknown_account_message() {
    let api = FakeApi::spawn().await;
    let admin = spawn_admin(&api).await;

    let resp = sign_in(&browser(), &admin, "ghost@boutique.vn").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("User does not exist"));
}

#[tokio::test]
async fn test_order_grid_filters_by_resolved_status_id() {
    let api = FakeApi::spawn().await;
    let admin = spawn_admin(&api).await;
    let client = browser();
    sign_in(&client, &admin, STAFF_EMAIL).await;

    let resp = client
        .get(format!("{admin}/orders?status=CANCELLED"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("ORD-0007"));

    let resp = client
        .get(format!("{admin}/orders?status=LOST"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!resp.text().await.unwrap().contains("ORD-0007"));

    // The unknown code never reached the order list.
    assert_eq!(api.order_filters(), vec![Some("2".to_string())]);
}

#[tokio::test]
async fn test_order_grid_search_narrows_rows() {
    let api = FakeApi::spawn().await;
    let admin = spawn_admin(&api).await;
    let client = browser();
    sign_in(&client, &admin, STAFF_EMAIL).await;

    for (term, found) in [("ord-0007", true), ("mai+anh", true), ("Lan", false)] {
        let body = client
            .get(format!("{admin}/orders?search={term}"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body.contains("ORD-0007"), found, "search {term:?}");
    }
}

#[tokio::test]
async fn test_cancel_order_posts_reason_and_flashes() {
    let api = FakeApi::spawn().await;
    let admin = spawn_admin(&api).await;
    let client = browser();
    sign_in(&client, &admin, STAFF_EMAIL).await;

    let resp = client
        .post(format!("{admin}/orders/7/cancel"))
        .form(&[("reason", "Customer changed their mind")])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers().get(LOCATION).unwrap(), "/orders/7");
    assert_eq!(
        api.cancellations(),
        vec![(7, Some("Customer changed their mind".to_string()))]
    );

    let resp = client
        .get(format!("{admin}/orders"))
        .send()
        .await
        .unwrap();
    assert!(resp.text().await.unwrap().contains("Cancel order successfully"));
}

#[tokio::test]
async fn test_product_create_sends_multipart_with_image() {
    let api = FakeApi::spawn().await;
    let admin = spawn_admin(&api).await;
    let client = browser();
    sign_in(&client, &admin, STAFF_EMAIL).await;

    let image = Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0])
        .file_name("linen-trousers.jpg")
        .mime_str("image/jpeg")
        .unwrap();
    let form = Form::new()
        .text("name", " Linen Trousers ")
        .text("description", "Wide leg")
        .text("cost_price", "250.000")
        .text("price", "420000")
        .text("sale_price", "")
        .text("supplier", "2")
        .text("category_id", "7")
        .part("image_url", image);
    let resp = client
        .post(format!("{admin}/products/add"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers().get(LOCATION).unwrap(), "/products/21#variants");

    let created = api.created_products();
    assert_eq!(created.len(), 1);
    let parts = &created[0];
    assert_eq!(parts["name"], "Linen Trousers");
    assert_eq!(parts["cost_price"], "250000");
    assert_eq!(parts["price"], "420000");
    assert_eq!(parts["image_url"], "linen-trousers.jpg");
    assert!(!parts.contains_key("sale_price"));
}

#[tokio::test]
async fn test_incomplete_product_is_not_sent() {
    let api = FakeApi::spawn().await;
    let admin = spawn_admin(&api).await;
    let client = browser();
    sign_in(&client, &admin, STAFF_EMAIL).await;

    let resp = client
        .post(format!("{admin}/products/add"))
        .multipart(Form::new().text("name", "Cap").text("price", "90000"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers().get(LOCATION).unwrap(), "/products/add");
    assert!(api.created_products().is_empty());
}

#[tokio::test]
async fn test_backend_order_create_posts_body() {
    let api = FakeApi::spawn().await;
    let config = api.api_config();
    let client = ApiClient::new(&config.base_url, config.timeout).unwrap();

    let order = NewOrder {
        payment_method: PaymentMethodId::new(1),
        delivery_info: None,
        customer_note: None,
        cart_item_ids: vec![CartItemId::new(1), CartItemId::new(2)],
        coupons: Vec::new(),
    };
    let created =
        backend::orders::create(&client, AccessToken::new(api.access_token()), &order)
            .await
            .unwrap();
    assert_eq!(created.order_code, "ORD-0008");
    assert!(created.vnpay_payment_url.is_none());
    assert_eq!(
        api.placed_orders(),
        vec![json!({ "payment_method": 1, "cart_item_ids": [1, 2], "coupons": [] })]
    );
}
