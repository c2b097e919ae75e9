//! Integration tests for Storeroom.
//!
//! Each test starts the real console router on an ephemeral port, with the
//! identity provider and the payment processor replaced by in-process mocks.
//!
//! # Running Tests
//!
//! ```bash
//! # Tests that need no database
//! cargo test -p storeroom-integration-tests
//!
//! # Everything, against a scratch database
//! DATABASE_URL=postgres://localhost/storeroom_test \
//!     cargo test -p storeroom-integration-tests -- --include-ignored
//! ```
//!
//! # Identity
//!
//! The mock identity provider accepts bearer tokens of the form
//! `user:<subject>` and rejects everything else, so a test can act as any
//! number of users with [`token_for`].

#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use serde_json::{Value, json};
use sha2::Sha256;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use url::Url;

use storeroom_admin::config::{AdminConfig, IdentityConfig, PaymentConfig};
use storeroom_admin::db;
use storeroom_admin::routes;
use storeroom_admin::state::AppState;
use storeroom_core::CurrencyCode;

/// Webhook signing secret shared by the server and the tests.
pub const WEBHOOK_SECRET: &str = "whsec_it_7Hc2Pq9Lm4Xv8Rt1";

/// Storefront origin used for checkout redirects.
pub const STOREFRONT_URL: &str = "https://shop.test";

/// Bearer token the mock identity provider maps to `subject`.
#[must_use]
pub fn token_for(subject: &str) -> String {
    format!("user:{subject}")
}

/// A fresh identity subject, so tests sharing a database never collide.
#[must_use]
pub fn new_subject(prefix: &str) -> String {
    format!("{prefix}_{}", uuid::Uuid::new_v4().simple())
}

// =============================================================================
// Mock identity provider
// =============================================================================

async fn userinfo(headers: HeaderMap) -> Response {
    let subject = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer user:"))
        .filter(|subject| !subject.is_empty());

    match subject {
        Some(subject) => Json(json!({
            "sub": subject,
            "email": format!("{subject}@identity.test"),
        }))
        .into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

// =============================================================================
// Mock payment processor
// =============================================================================

/// Checkout sessions the mock payment processor has been asked to create.
#[derive(Clone, Default)]
pub struct PaymentRecorder {
    sessions: Arc<Mutex<Vec<Vec<(String, String)>>>>,
    created: Arc<AtomicUsize>,
    decline: Arc<AtomicBool>,
}

impl PaymentRecorder {
    /// Make every following session request fail.
    pub fn decline_all(&self) {
        self.decline.store(true, Ordering::SeqCst);
    }

    /// Form fields of every session request, oldest first.
    #[must_use]
    pub fn sessions(&self) -> Vec<Vec<(String, String)>> {
        self.sessions
            .lock()
            .map(|sessions| sessions.clone())
            .unwrap_or_default()
    }

    /// Value of `field` in the most recent session request.
    #[must_use]
    pub fn last_field(&self, field: &str) -> Option<String> {
        self.sessions().last().and_then(|form| {
            form.iter()
                .find(|(key, _)| key == field)
                .map(|(_, value)| value.clone())
        })
    }
}

async fn create_session(
    State(recorder): State<PaymentRecorder>,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    if let Ok(mut sessions) = recorder.sessions.lock() {
        sessions.push(form);
    }

    if recorder.decline.load(Ordering::SeqCst) {
        return (
            StatusCode::PAYMENT_REQUIRED,
            Json(json!({"error": {"message": "Your card was declined", "code": "card_declined"}})),
        )
            .into_response();
    }

    let n = recorder.created.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({
        "id": format!("cs_test_{n}"),
        "url": format!("https://pay.test/session/cs_test_{n}"),
    }))
    .into_response()
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock listener");
    let addr = listener.local_addr().expect("Failed to read mock address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    addr
}

// =============================================================================
// Test context
// =============================================================================

/// A running console API plus its mocks.
pub struct TestContext {
    pub base_url: String,
    pub client: reqwest::Client,
    pub pool: PgPool,
    pub payments: PaymentRecorder,
}

impl TestContext {
    /// Server whose database is never reachable. Enough for anything that is
    /// rejected before touching storage.
    pub async fn offline() -> Self {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(1))
            .connect_lazy("postgres://storeroom@127.0.0.1:1/storeroom")
            .expect("Failed to build lazy pool");
        Self::start(pool).await
    }

    /// Server backed by `DATABASE_URL`, migrated to the latest schema.
    pub async fn with_database() -> Self {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = db::create_pool(&SecretString::from(url))
            .await
            .expect("Failed to connect to test database");
        sqlx::migrate!("../admin/migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");
        Self::start(pool).await
    }

    async fn start(pool: PgPool) -> Self {
        let identity_addr = spawn(Router::new().route("/userinfo", get(userinfo))).await;

        let payments = PaymentRecorder::default();
        let payments_addr = spawn(
            Router::new()
                .route("/v1/checkout/sessions", post(create_session))
                .with_state(payments.clone()),
        )
        .await;

        let config = AdminConfig {
            database_url: SecretString::from("postgres://unused"),
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            frontend_store_url: STOREFRONT_URL.to_string(),
            identity: IdentityConfig {
                userinfo_url: Url::parse(&format!("http://{identity_addr}/userinfo"))
                    .expect("valid identity url"),
                cache_ttl: Duration::from_secs(60),
            },
            payments: PaymentConfig {
                secret_key: SecretString::from("sk_test_it_9sKd2LmQ7xWz"),
                webhook_secret: SecretString::from(WEBHOOK_SECRET),
                api_base: Url::parse(&format!("http://{payments_addr}"))
                    .expect("valid payments url"),
                currency: CurrencyCode::USD,
                webhook_tolerance: Duration::from_secs(300),
            },
            cors_allowed_origins: Vec::new(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
            tls: None,
        };

        let state = AppState::new(config, pool.clone()).expect("Failed to build state");
        let addr = spawn(routes::app(state)).await;

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            pool,
            payments,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("GET failed")
    }

    pub async fn send_json(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> reqwest::Response {
        let mut request = self.client.request(method, self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("request failed")
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &Value) -> reqwest::Response {
        self.send_json(reqwest::Method::POST, path, token, body).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: &Value) -> reqwest::Response {
        self.send_json(reqwest::Method::PATCH, path, token, body).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.delete(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("DELETE failed")
    }

    /// POST a webhook payload signed with [`WEBHOOK_SECRET`].
    pub async fn deliver_webhook(&self, payload: &str) -> reqwest::Response {
        let timestamp = chrono::Utc::now().timestamp();
        self.client
            .post(self.url("/api/webhook"))
            .header("stripe-signature", signature_header(payload, timestamp))
            .body(payload.to_string())
            .send()
            .await
            .expect("webhook delivery failed")
    }
}

/// Parse a successful JSON response, failing the test otherwise.
pub async fn json_ok(response: reqwest::Response) -> Value {
    let status = response.status();
    let body = response.text().await.expect("Failed to read body");
    assert!(status.is_success(), "expected success, got {status}: {body}");
    serde_json::from_str(&body).expect("response is not JSON")
}

/// Status and plain-text body of a response.
pub async fn status_and_text(response: reqwest::Response) -> (reqwest::StatusCode, String) {
    let status = response.status();
    (status, response.text().await.expect("Failed to read body"))
}

/// `stripe-signature` header for `payload` signed at `timestamp`.
#[must_use]
pub fn signature_header(payload: &str, timestamp: i64) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).expect("HMAC accepts any key");
    mac.update(format!("{timestamp}.{payload}").as_bytes());
    format!(
        "t={timestamp},v1={}",
        hex::encode(mac.finalize().into_bytes())
    )
}

/// A `checkout.session.completed` event for `order_id`.
#[must_use]
pub fn completed_event(order_id: Option<&str>, email: Option<&str>) -> String {
    let metadata = order_id.map_or_else(|| json!({}), |id| json!({ "orderId": id }));
    json!({
        "id": format!("evt_{}", uuid::Uuid::new_v4().simple()),
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test_1",
                "metadata": metadata,
                "customer_details": {
                    "email": email,
                    "name": "Ada Shopper",
                    "phone": "+15550100",
                    "address": {
                        "line1": "1 Main St",
                        "line2": null,
                        "city": "Springfield",
                        "state": "IL",
                        "postal_code": "62701",
                        "country": "US"
                    }
                }
            }
        }
    })
    .to_string()
}

// =============================================================================
// Catalog fixtures
// =============================================================================

/// IDs of the catalog rows a product needs.
#[derive(Debug, Clone)]
pub struct CatalogFixture {
    pub store_id: String,
    pub billboard_id: String,
    pub category_id: String,
    pub size_id: String,
    pub color_id: String,
}

fn id_of(value: &Value) -> String {
    value["id"]
        .as_str()
        .expect("response has an id")
        .to_string()
}

impl TestContext {
    /// Create a store owned by the holder of `token`.
    pub async fn create_store(&self, token: &str, name: &str) -> String {
        let store = json_ok(self.post("/api/stores", Some(token), &json!({"name": name})).await).await;
        id_of(&store)
    }

    /// A store with one billboard, category, size and color.
    pub async fn seed_catalog(&self, token: &str) -> CatalogFixture {
        let store_id = self.create_store(token, "Fixture Store").await;

        let billboard = json_ok(
            self.post(
                &format!("/api/{store_id}/billboards"),
                Some(token),
                &json!({"label": "Summer", "imageUrl": "https://cdn.test/summer.jpg"}),
            )
            .await,
        )
        .await;
        let billboard_id = id_of(&billboard);

        let category = json_ok(
            self.post(
                &format!("/api/{store_id}/categories"),
                Some(token),
                &json!({"name": "Shirts", "billboardId": billboard_id}),
            )
            .await,
        )
        .await;

        let size = json_ok(
            self.post(
                &format!("/api/{store_id}/sizes"),
                Some(token),
                &json!({"name": "Medium", "value": "M"}),
            )
            .await,
        )
        .await;

        let color = json_ok(
            self.post(
                &format!("/api/{store_id}/colors"),
                Some(token),
                &json!({"name": "Navy", "value": "#1F2A44"}),
            )
            .await,
        )
        .await;

        CatalogFixture {
            store_id,
            billboard_id,
            category_id: id_of(&category),
            size_id: id_of(&size),
            color_id: id_of(&color),
        }
    }

    /// Create a product in the fixture's category, size and color.
    pub async fn create_product(
        &self,
        token: &str,
        catalog: &CatalogFixture,
        name: &str,
        price: &str,
        inventory: i32,
    ) -> Value {
        json_ok(
            self.post(
                &format!("/api/{}/products", catalog.store_id),
                Some(token),
                &json!({
                    "name": name,
                    "price": price,
                    "inventory": inventory,
                    "categoryId": catalog.category_id,
                    "sizeIds": [catalog.size_id],
                    "colorIds": [catalog.color_id],
                    "images": [{"url": "https://cdn.test/product.jpg", "isMain": true}]
                }),
            )
            .await,
        )
        .await
    }
}
