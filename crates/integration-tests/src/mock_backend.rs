//! In-process stand-in for the Zaheen REST backend.
//!
//! Serves the catalog from memory, knows two accounts, and records catalog,
//! write and checkout requests so tests can assert on what the storefront
//! sent.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};

/// Bearer token issued to the admin account.
pub const ADMIN_TOKEN: &str = "admin-token";
/// Bearer token issued to the shopper account.
pub const SHOPPER_TOKEN: &str = "shopper-token";

pub const ADMIN_EMAIL: &str = "admin@zaheen.test";
pub const SHOPPER_EMAIL: &str = "shopper@zaheen.test";
pub const PASSWORD: &str = "knitwear-123";

/// Hosted payment page the mock hands back on checkout.
pub const CHECKOUT_URL: &str = "https://checkout.stripe.test/c/pay/cs_test_zaheen";

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

/// Shared mock state.
#[derive(Debug, Default)]
pub struct MockBackend {
    products: Mutex<Vec<Value>>,
    categories: Mutex<Vec<Value>>,
    requests: Mutex<Vec<Recorded>>,
    fail_checkout: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockBackend {
    /// Mock seeded with [`seed_products`] and [`seed_categories`].
    #[must_use]
    pub fn seeded() -> Arc<Self> {
        Arc::new(Self {
            products: Mutex::new(seed_products()),
            categories: Mutex::new(seed_categories()),
            ..Self::default()
        })
    }

    /// Make subsequent checkout calls answer `500`.
    pub fn fail_checkout(&self) {
        self.fail_checkout.store(true, Ordering::SeqCst);
    }

    /// Every recorded request to `path` with `method`.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<Recorded> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == *method && r.path == path)
            .cloned()
            .collect()
    }

    fn record(&self, method: Method, path: String, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        lock(&self.requests).push(Recorded {
            method,
            path,
            authorization,
            body,
        });
    }

    /// Router mounted under `/api/v1`.
    pub fn router(self: Arc<Self>) -> Router {
        let api = Router::new()
            .route("/products", get(list_products).post(create_product))
            .route(
                "/products/{id}",
                get(get_product).patch(update_product).delete(delete_product),
            )
            .route("/categories", get(list_categories).post(create_category))
            .route(
                "/categories/{id}",
                axum::routing::patch(update_category).delete(delete_category),
            )
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/logout", post(logout))
            .route("/payment/create-checkout", post(create_checkout));

        Router::new().nest("/api/v1", api).with_state(self)
    }
}

/// Three sweaters with different stock levels.
#[must_use]
pub fn seed_products() -> Vec<Value> {
    vec![
        json!({
            "_id": "p-cardigan",
            "name": "Merino Cardigan",
            "description": "Soft merino wool cardigan.",
            "price": 54.5,
            "images": ["https://res.cloudinary.com/zaheen/image/upload/cardigan.jpg"],
            "sizes": ["S", "M", "L"],
            "colors": ["Black", "White"],
            "stock": 3,
            "category": { "_id": "c-sweaters", "name": "Sweaters" },
        }),
        json!({
            "_id": "p-beanie",
            "name": "Ribbed Beanie",
            "description": "Chunky ribbed beanie.",
            "price": 18,
            "images": ["https://res.cloudinary.com/zaheen/image/upload/beanie.jpg"],
            "sizes": ["M"],
            "colors": ["Gray", "Navy"],
            "stock": 10,
            "category": "c-accessories",
        }),
        json!({
            "_id": "p-pullover",
            "name": "Cable Pullover",
            "description": "Heavy cable knit pullover.",
            "price": 72,
            "images": [],
            "sizes": ["L", "XL"],
            "colors": ["Navy"],
            "stock": 0,
            "category": null,
        }),
    ]
}

#[must_use]
pub fn seed_categories() -> Vec<Value> {
    vec![
        json!({ "_id": "c-sweaters", "name": "Sweaters" }),
        json!({ "_id": "c-accessories", "name": "Accessories" }),
    ]
}

fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

fn is_admin(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {ADMIN_TOKEN}"))
}

// =============================================================================
// Catalog
// =============================================================================

async fn list_products(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Json<Value> {
    mock.record(Method::GET, "/products".into(), &headers, Value::Null);
    let products = lock(&mock.products).clone();
    Json(json!({ "success": true, "data": products }))
}

async fn get_product(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    mock.record(Method::GET, format!("/products/{id}"), &headers, Value::Null);
    let product = lock(&mock.products).iter().find(|p| p["_id"] == id).cloned();
    match product {
        Some(product) => Json(json!({ "success": true, "data": product })).into_response(),
        None => message(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn list_categories(State(mock): State<Arc<MockBackend>>, headers: HeaderMap) -> Json<Value> {
    mock.record(Method::GET, "/categories".into(), &headers, Value::Null);
    let categories = lock(&mock.categories).clone();
    Json(json!({ "success": true, "data": categories }))
}

async fn create_product(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.record(Method::POST, "/products".into(), &headers, body.clone());
    if !is_admin(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Not authorized");
    }
    let mut product = body;
    product["_id"] = json!(format!("p-new-{}", lock(&mock.products).len()));
    lock(&mock.products).push(product.clone());
    (StatusCode::CREATED, Json(json!({ "success": true, "data": product }))).into_response()
}

async fn update_product(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    mock.record(Method::PATCH, format!("/products/{id}"), &headers, body.clone());
    if !is_admin(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Not authorized");
    }
    let mut products = lock(&mock.products);
    let Some(product) = products.iter_mut().find(|p| p["_id"] == id) else {
        return message(StatusCode::NOT_FOUND, "Product not found");
    };
    if let (Some(target), Some(fields)) = (product.as_object_mut(), body.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(json!({ "success": true, "data": product.clone() })).into_response()
}

async fn delete_product(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    mock.record(Method::DELETE, format!("/products/{id}"), &headers, Value::Null);
    if !is_admin(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Not authorized");
    }
    lock(&mock.products).retain(|p| p["_id"] != id);
    Json(json!({ "success": true, "message": "Product deleted" })).into_response()
}

async fn create_category(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.record(Method::POST, "/categories".into(), &headers, body.clone());
    if !is_admin(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Not authorized");
    }
    let mut categories = lock(&mock.categories);
    let category = json!({ "_id": format!("c-new-{}", categories.len()), "name": body["name"] });
    categories.push(category.clone());
    (StatusCode::CREATED, Json(json!({ "success": true, "data": category }))).into_response()
}

async fn update_category(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    mock.record(Method::PATCH, format!("/categories/{id}"), &headers, body);
    if !is_admin(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Not authorized");
    }
    Json(json!({ "success": true })).into_response()
}

async fn delete_category(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    mock.record(Method::DELETE, format!("/categories/{id}"), &headers, Value::Null);
    if !is_admin(&headers) {
        return message(StatusCode::UNAUTHORIZED, "Not authorized");
    }
    lock(&mock.categories).retain(|c| c["_id"] != id);
    Json(json!({ "success": true })).into_response()
}

// =============================================================================
// Auth
// =============================================================================

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return message(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    let (token, role, name) = match body["email"].as_str() {
        Some(ADMIN_EMAIL) => (ADMIN_TOKEN, "admin", "Zaheen Admin"),
        Some(SHOPPER_EMAIL) => (SHOPPER_TOKEN, "user", "Ayesha Khan"),
        _ => return message(StatusCode::UNAUTHORIZED, "Invalid email or password"),
    };
    Json(json!({
        "success": true,
        "token": token,
        "user": { "_id": format!("u-{role}"), "name": name, "email": body["email"], "role": role },
    }))
    .into_response()
}

async fn register(State(mock): State<Arc<MockBackend>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    mock.record(Method::POST, "/auth/register".into(), &headers, body.clone());
    if body["email"] == ADMIN_EMAIL || body["email"] == SHOPPER_EMAIL {
        return message(StatusCode::BAD_REQUEST, "User already exists");
    }
    (StatusCode::CREATED, Json(json!({ "success": true, "message": "Registered" }))).into_response()
}

async fn logout() -> Json<Value> {
    Json(json!({ "success": true }))
}

// =============================================================================
// Checkout
// =============================================================================

async fn create_checkout(
    State(mock): State<Arc<MockBackend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.record(Method::POST, "/payment/create-checkout".into(), &headers, body);
    if mock.fail_checkout.load(Ordering::SeqCst) {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "Stripe is unavailable");
    }
    Json(json!({ "url": CHECKOUT_URL })).into_response()
}
