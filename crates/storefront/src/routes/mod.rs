//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Products
//! GET  /products               - Product listing (?category=)
//! GET  /products/{id}          - Product detail (?size=&color=)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//! POST /cart/clear             - Empty cart (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! POST /checkout               - Redirect to hosted payment page
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/google            - Google Identity Services callback
//! POST /auth/logout            - Logout action
//!
//! # Dashboard (admin only)
//! GET  /dashboard                          - Overview
//! GET  /dashboard/products                 - Product and category tables
//! GET  /dashboard/products/new             - New product form
//! POST /dashboard/products                 - Create product
//! GET  /dashboard/products/{id}/edit       - Edit product form
//! POST /dashboard/products/{id}            - Update product
//! POST /dashboard/products/{id}/delete     - Delete product
//! POST /dashboard/categories               - Create category
//! POST /dashboard/categories/{id}          - Rename category
//! POST /dashboard/categories/{id}/delete   - Delete category
//! ```

pub mod auth;
pub mod cart;
pub mod dashboard;
pub mod home;
pub mod products;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Largest accepted product form (image included).
const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/google", post(auth::google))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the admin dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route(
            "/products",
            get(dashboard::products::index).post(dashboard::products::create),
        )
        .route("/products/new", get(dashboard::products::new))
        .route("/products/{id}", post(dashboard::products::update))
        .route("/products/{id}/edit", get(dashboard::products::edit))
        .route("/products/{id}/delete", post(dashboard::products::delete))
        .route("/categories", post(dashboard::categories::create))
        .route("/categories/{id}", post(dashboard::categories::update))
        .route("/categories/{id}/delete", post(dashboard::categories::delete))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout handoff
        .route("/checkout", post(cart::checkout))
        // Auth routes
        .nest("/auth", auth_routes())
        // Admin dashboard
        .nest("/dashboard", dashboard_routes())
}
