//! Integration tests for Boutique.
//!
//! Everything runs in-process: [`FakeApi`] stands in for the commerce API on
//! an ephemeral port, and the storefront and admin routers are served on
//! their own ephemeral ports pointing at it.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p boutique-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `core_client` - Token refresh and error mapping in the API client
//! - `storefront` - Customer flows through the storefront router
//! - `admin` - Staff sign-in and order screens through the admin router

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use boutique_core::config::{ApiConfig, SentryConfig};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Password accepted for every seeded account.
pub const PASSWORD: &str = "Boutique@2024";

/// Seeded customer account.
pub const CUSTOMER_EMAIL: &str = "mai@gmail.com";

/// Seeded staff account.
pub const STAFF_EMAIL: &str = "staff@boutique.vn";

/// Refresh token issued at every login.
pub const REFRESH_TOKEN: &str = "refresh-token";

/// Gateway page returned when an order is paid through VNPay.
pub const VNPAY_URL: &str = "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html?vnp_TxnRef=8";

/// Marks access tokens issued to customer accounts.
const CUSTOMER_SUFFIX: &str = ".customer";

/// Session secret used by the routers under test.
const TEST_SECRET: &str = "Zx8!pQ3@wE6#rT9$yU2%iO5^aS7&dF4*";

#[derive(Default)]
struct Ledger {
    /// Access token the API currently accepts.
    access: Mutex<String>,
    generation: AtomicUsize,
    refreshes: AtomicUsize,
    cart_reads: AtomicUsize,
    province_reads: AtomicUsize,
    /// `GET /promotions/` calls, allowed or refused.
    promotion_reads: AtomicUsize,
    /// `status` parameter of every `GET /orders/`.
    order_filters: Mutex<Vec<Option<String>>>,
    /// Order id and reason of every cancellation.
    cancellations: Mutex<Vec<(i32, Option<String>)>>,
    /// Bodies of `POST /cart/`.
    cart_adds: Mutex<Vec<Value>>,
    /// Bodies of `POST /orders/`.
    placed_orders: Mutex<Vec<Value>>,
    /// Text parts of `POST /products/`, plus the uploaded file name under
    /// its part name.
    created_products: Mutex<Vec<HashMap<String, String>>>,
}

fn record<T>(log: &Mutex<Vec<T>>, entry: T) {
    log.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
}

fn snapshot<T: Clone>(log: &Mutex<Vec<T>>) -> Vec<T> {
    log.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

impl Ledger {
    fn current_access(&self) -> String {
        self.access
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn rotate(&self) -> String {
        let next = format!("access-{}", self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        *self.access.lock().unwrap_or_else(PoisonError::into_inner) = next.clone();
        next
    }

    /// Access token handed to customer logins; staff get the bare token.
    fn customer_access(&self) -> String {
        format!("{}{CUSTOMER_SUFFIX}", self.current_access())
    }

    fn bearer(headers: &HeaderMap) -> Option<&str> {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let current = self.current_access();
        Self::bearer(headers)
            .is_some_and(|token| token == current || token == self.customer_access())
    }

    fn staff(&self, headers: &HeaderMap) -> bool {
        Self::bearer(headers).is_some_and(|token| token == self.current_access())
    }
}

/// In-process stand-in for the commerce API, mounted under `/api/v1/`.
pub struct FakeApi {
    base_url: String,
    ledger: Arc<Ledger>,
}

impl FakeApi {
    /// Start the fake API on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let ledger = Arc::new(Ledger::default());
        ledger.rotate();

        let api = Router::new()
            .route("/auth/login/", post(login))
            .route("/auth/refresh-token/", post(refresh))
            .route("/auth/logout/", post(logout))
            .route("/cart/", get(cart).post(add_to_cart))
            .route("/order-statuses/", get(order_statuses))
            .route("/orders/", get(orders).post(create_order))
            .route("/orders/{id}/cancel/", post(cancel_order))
            .route("/products/", get(products).post(create_product))
            .route("/products/{slug}/variants/", get(variants))
            .route("/promotions/", get(promotions))
            .route("/products/best-sellers/", get(best_sellers))
            .route("/provinces/", get(provinces))
            .with_state(Arc::clone(&ledger));
        let app = Router::new().nest("/api/v1", api);

        let addr = serve(app).await;
        Self {
            base_url: format!("http://{addr}/api/v1"),
            ledger,
        }
    }

    /// Root URL clients should be configured with.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Access token the API accepts right now.
    #[must_use]
    pub fn access_token(&self) -> String {
        self.ledger.current_access()
    }

    /// Expire the current access token; the next call with it gets a 401.
    pub fn expire_access(&self) {
        self.ledger.rotate();
    }

    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.ledger.refreshes.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn cart_reads(&self) -> usize {
        self.ledger.cart_reads.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn province_reads(&self) -> usize {
        self.ledger.province_reads.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn promotion_reads(&self) -> usize {
        self.ledger.promotion_reads.load(Ordering::SeqCst)
    }

    /// `status` filter sent with each order list request, in order.
    #[must_use]
    pub fn order_filters(&self) -> Vec<Option<String>> {
        snapshot(&self.ledger.order_filters)
    }

    /// Cancellations received, as (order id, reason).
    #[must_use]
    pub fn cancellations(&self) -> Vec<(i32, Option<String>)> {
        snapshot(&self.ledger.cancellations)
    }

    /// Bodies received by `POST /cart/`.
    #[must_use]
    pub fn cart_adds(&self) -> Vec<Value> {
        snapshot(&self.ledger.cart_adds)
    }

    /// Bodies received by `POST /orders/`.
    #[must_use]
    pub fn placed_orders(&self) -> Vec<Value> {
        snapshot(&self.ledger.placed_orders)
    }

    /// Multipart parts received by `POST /products/`.
    #[must_use]
    pub fn created_products(&self) -> Vec<HashMap<String, String>> {
        snapshot(&self.ledger.created_products)
    }

    /// API connection settings pointing at this instance.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Serve a router on `127.0.0.1:0` and return the bound address.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
pub async fn serve(app: Router) -> SocketAddr {
    #[allow(clippy::expect_used)]
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("Failed to bind test listener");
    #[allow(clippy::expect_used)]
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .ok();
    });
    addr
}

/// Start the storefront against `api` and return its base URL.
///
/// # Panics
///
/// Panics if the state cannot be built.
pub async fn spawn_storefront(api: &FakeApi) -> String {
    let config = boutique_storefront::config::StorefrontConfig {
        host: Ipv4Addr::LOCALHOST.into(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from(TEST_SECRET),
        api: api.api_config(),
        sentry: SentryConfig::default(),
    };
    #[allow(clippy::expect_used)]
    let state =
        boutique_storefront::state::AppState::new(config).expect("Failed to build storefront");
    let addr = serve(boutique_storefront::app(state)).await;
    format!("http://{addr}")
}

/// Start the admin console against `api` and return its base URL.
///
/// # Panics
///
/// Panics if the state cannot be built.
pub async fn spawn_admin(api: &FakeApi) -> String {
    let config = boutique_admin::config::AdminConfig {
        host: Ipv4Addr::LOCALHOST.into(),
        port: 0,
        base_url: "http://localhost:3001".to_string(),
        session_secret: SecretString::from(TEST_SECRET),
        api: api.api_config(),
        provinces_api_url: boutique_core::client::geo::DEFAULT_BASE_URL.to_string(),
        sentry: SentryConfig::default(),
    };
    #[allow(clippy::expect_used)]
    let state = boutique_admin::state::AppState::new(config).expect("Failed to build admin");
    let addr = serve(boutique_admin::app(state)).await;
    format!("http://{addr}")
}

/// Browser-like client: keeps cookies, never follows redirects.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn browser() -> reqwest::Client {
    #[allow(clippy::expect_used)]
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

#[derive(Debug, Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn login(State(ledger): State<Arc<Ledger>>, Json(creds): Json<Credentials>) -> Response {
    let access = match creds.email.as_str() {
        CUSTOMER_EMAIL => ledger.customer_access(),
        STAFF_EMAIL => ledger.current_access(),
        _ => return detail(StatusCode::NOT_FOUND, "User does not exist"),
    };
    if creds.password != PASSWORD {
        return detail(StatusCode::UNAUTHORIZED, "Incorrect password");
    }

    // The backend answers with the bare pair; roles are never included.
    Json(json!({ "access": access, "refresh": REFRESH_TOKEN })).into_response()
}

async fn refresh(State(ledger): State<Arc<Ledger>>, headers: HeaderMap) -> Response {
    let has_refresh = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|cookies| {
            cookies
                .split(';')
                .any(|c| c.trim() == format!("refresh={REFRESH_TOKEN}"))
        });
    if !has_refresh {
        return detail(StatusCode::BAD_REQUEST, "Refresh token not found");
    }

    ledger.refreshes.fetch_add(1, Ordering::SeqCst);
    let access = ledger.current_access();
    (
        [(
            header::SET_COOKIE,
            format!("access={access}; Path=/; HttpOnly"),
        )],
        Json(json!({ "message": "Token refreshed" })),
    )
        .into_response()
}

async fn logout() -> Json<Value> {
    Json(json!({ "message": "Logged out successfully" }))
}

fn linen_shirt() -> Value {
    json!({
        "id": 5,
        "name": "Linen Shirt",
        "slug": "linen-shirt",
        "price": "350000.00",
        "sale_price": "0.00",
        "is_published": true,
        "stock": 4,
    })
}

async fn cart(State(ledger): State<Arc<Ledger>>, headers: HeaderMap) -> Response {
    ledger.cart_reads.fetch_add(1, Ordering::SeqCst);
    if !ledger.authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Token is invalid or expired");
    }

    Json(json!([{
        "id": 1,
        "quantity": 2,
        "variant_details": {
            "id": 10,
            "product": 5,
            "product_details": linen_shirt(),
            "sku": "LS-M-BLK",
            "stock": 4,
        },
        "available_variants": [],
    }]))
    .into_response()
}

async fn add_to_cart(
    State(ledger): State<Arc<Ledger>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !ledger.authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Token is invalid or expired");
    }
    record(&ledger.cart_adds, body);

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Product added to cart" })),
    )
        .into_response()
}

async fn order_statuses(State(ledger): State<Arc<Ledger>>, headers: HeaderMap) -> Response {
    if !ledger.authorized(&headers) {
        return detail(
            StatusCode::UNAUTHORIZED,
            "Authentication credentials were not provided.",
        );
    }

    Json(json!([
        { "id": 1, "status_code": "PENDING", "status_name": "Pending" },
        { "id": 2, "status_code": "CANCELLED", "status_name": "Cancelled" },
    ]))
    .into_response()
}

async fn orders(
    State(ledger): State<Arc<Ledger>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !ledger.authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Token is invalid or expired");
    }
    record(&ledger.order_filters, params.get("status").cloned());

    Json(json!({
        "count": 1,
        "next": null,
        "previous": null,
        "results": [{
            "id": 7,
            "order_code": "ORD-0007",
            "final_amount": "450000.00",
            "user": 12,
            "user_details": { "id": 12, "name": "Mai Anh", "email": CUSTOMER_EMAIL },
            "current_status_details": {
                "id": 1,
                "status_code": "PENDING",
                "status_name": "Pending",
            },
            "order_items": [],
        }],
    }))
    .into_response()
}

/// Payment method that pays online through VNPay.
const VNPAY_METHOD: i64 = 2;

async fn create_order(
    State(ledger): State<Arc<Ledger>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !ledger.authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Token is invalid or expired");
    }
    let online = body["payment_method"].as_i64() == Some(VNPAY_METHOD);
    record(&ledger.placed_orders, body);

    let payment_url = online.then_some(VNPAY_URL);
    (
        StatusCode::CREATED,
        Json(json!({
            "id": 8,
            "order_code": "ORD-0008",
            "final_amount": "380000.00",
            "vnpay_payment_url": payment_url,
            "order_items": [],
        })),
    )
        .into_response()
}

async fn cancel_order(
    State(ledger): State<Arc<Ledger>>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(body): Json<Value>,
) -> Response {
    if !ledger.authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Token is invalid or expired");
    }
    let reason = body["reason"].as_str().map(ToString::to_string);
    record(&ledger.cancellations, (id, reason));

    Json(json!({ "message": "Order cancelled" })).into_response()
}

async fn promotions(State(ledger): State<Arc<Ledger>>, headers: HeaderMap) -> Response {
    ledger.promotion_reads.fetch_add(1, Ordering::SeqCst);
    if !ledger.staff(&headers) {
        return detail(
            StatusCode::FORBIDDEN,
            "You do not have permission to perform this action.",
        );
    }

    Json(json!([{
        "id": 3,
        "name": "Summer Sale",
        "type": "percentage",
        "value": 20,
        "start_date": "2026-06-01T00:00:00+07:00",
        "end_date": "2026-08-31T23:59:59+07:00",
        "is_active": true,
    }]))
    .into_response()
}

async fn products() -> Json<Value> {
    Json(json!({
        "count": 1,
        "next": null,
        "previous": null,
        "results": [linen_shirt()],
    }))
}

async fn create_product(
    State(ledger): State<Arc<Ledger>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if !ledger.staff(&headers) {
        return detail(
            StatusCode::FORBIDDEN,
            "You do not have permission to perform this action.",
        );
    }

    let mut parts = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = match field.file_name().map(ToString::to_string) {
            Some(file_name) => file_name,
            None => field.text().await.unwrap_or_default(),
        };
        parts.insert(name, value);
    }
    let name = parts.get("name").cloned().unwrap_or_default();
    record(&ledger.created_products, parts);

    (
        StatusCode::CREATED,
        Json(json!({
            "id": 21,
            "name": name,
            "slug": "linen-trousers",
            "price": "420000.00",
        })),
    )
        .into_response()
}

async fn variants(Path(slug): Path<String>) -> Response {
    if slug != "linen-shirt" {
        return detail(StatusCode::NOT_FOUND, "No Product matches the given query.");
    }
    Json(json!([
        { "id": 10, "product": 5, "sku": "LS-M-BLK", "stock": 4 },
        { "id": 11, "product": 5, "sku": "LS-L-BLK", "stock": 0 },
    ]))
    .into_response()
}

async fn best_sellers() -> Json<Value> {
    Json(json!([linen_shirt()]))
}

async fn provinces(State(ledger): State<Arc<Ledger>>) -> Json<Value> {
    ledger.province_reads.fetch_add(1, Ordering::SeqCst);
    Json(json!([
        { "id": 1, "name": "Thành phố Hà Nội", "code": "1", "code_name": "thanh_pho_ha_noi" },
        { "id": 79, "name": "Thành phố Hồ Chí Minh", "code": "79", "code_name": "thanh_pho_ho_chi_minh" },
    ]))
}
