//! Admin dashboard access control and product/category management.

#![allow(clippy::unwrap_used)]

use reqwest::{
    Method, StatusCode,
    multipart::{Form, Part},
};
use serde_json::json;
use zaheen_integration_tests::{
    TestContext, location,
    mock_backend::{ADMIN_EMAIL, ADMIN_TOKEN, PASSWORD, SHOPPER_EMAIL},
};

async fn admin() -> TestContext {
    let ctx = TestContext::start().await;
    let response = ctx.login(ADMIN_EMAIL, PASSWORD).await;
    assert_eq!(location(&response).as_deref(), Some("/dashboard"));
    ctx
}

fn product_form(name: &str) -> Form {
    Form::new()
        .text("name", name.to_string())
        .text("description", "Hand-finished lambswool crew neck.")
        .text("price", "64.99")
        .text("stock", "12")
        .text("category", "c-sweaters")
        .text("sizes", "M")
        .text("sizes", "L")
        .text("colors", "Red")
}

// =============================================================================
// Access control
// =============================================================================

#[tokio::test]
async fn anonymous_visitors_are_sent_to_login() {
    let ctx = TestContext::start().await;

    for path in ["/dashboard", "/dashboard/products", "/dashboard/products/new"] {
        let response = ctx.get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response).as_deref(), Some("/auth/login"), "{path}");
    }
}

#[tokio::test]
async fn shoppers_are_forbidden() {
    let ctx = TestContext::start().await;
    let response = ctx.login(SHOPPER_EMAIL, PASSWORD).await;
    assert_eq!(location(&response).as_deref(), Some("/"));

    let response = ctx.get("/dashboard").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .post_form("/dashboard/categories", &[("name", "Scarves")])
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(ctx.backend.requests_to(&Method::POST, "/categories").is_empty());
}

#[tokio::test]
async fn bad_credentials_return_to_login() {
    let ctx = TestContext::start().await;

    let response = ctx.login(ADMIN_EMAIL, "wrong-password").await;
    assert_eq!(location(&response).as_deref(), Some("/auth/login?error=credentials"));
    assert_eq!(ctx.get("/dashboard").await.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn logout_revokes_dashboard_access() {
    let ctx = admin().await;
    assert_eq!(ctx.get("/dashboard").await.status(), StatusCode::OK);

    ctx.post_form("/auth/logout", &[]).await;
    assert_eq!(ctx.get("/dashboard").await.status(), StatusCode::SEE_OTHER);
}

// =============================================================================
// Overview
// =============================================================================

#[tokio::test]
async fn dashboard_shows_catalog_counts() {
    let ctx = admin().await;

    let response = ctx.get("/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains(r#"<p class="stat-value">3</p>"#));
    assert!(page.contains(r#"<p class="stat-value">2</p>"#));
    assert!(page.contains(r#"<p class="stat-value">1</p>"#));
}

#[tokio::test]
async fn product_list_shows_every_product() {
    let ctx = admin().await;

    let page = ctx.get("/dashboard/products").await.text().await.unwrap();
    for name in ["Merino Cardigan", "Ribbed Beanie", "Cable Pullover"] {
        assert!(page.contains(name), "{name}");
    }
}

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
async fn create_category_sends_token_and_name() {
    let ctx = admin().await;

    let response = ctx
        .post_form("/dashboard/categories", &[("name", "  Scarves  ")])
        .await;
    assert_eq!(
        location(&response).as_deref(),
        Some("/dashboard/products?success=category_created")
    );

    let requests = ctx.backend.requests_to(&Method::POST, "/categories");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body, json!({ "name": "Scarves" }));
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some(format!("Bearer {ADMIN_TOKEN}").as_str())
    );
}

#[tokio::test]
async fn blank_category_name_is_rejected_locally() {
    let ctx = admin().await;

    let response = ctx.post_form("/dashboard/categories", &[("name", "   ")]).await;
    assert_eq!(
        location(&response).as_deref(),
        Some("/dashboard/products?error=category_name")
    );
    assert!(ctx.backend.requests_to(&Method::POST, "/categories").is_empty());
}

#[tokio::test]
async fn delete_category() {
    let ctx = admin().await;

    let response = ctx
        .post_form("/dashboard/categories/c-accessories/delete", &[])
        .await;
    assert_eq!(
        location(&response).as_deref(),
        Some("/dashboard/products?success=category_deleted")
    );
    assert_eq!(
        ctx.backend
            .requests_to(&Method::DELETE, "/categories/c-accessories")
            .len(),
        1
    );
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn create_product_requires_an_image() {
    let ctx = admin().await;

    let response = ctx
        .client
        .post(ctx.url("/dashboard/products"))
        .multipart(product_form("Lambswool Crew"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("Please upload an image for the product."));
    assert!(ctx.backend.requests_to(&Method::POST, "/products").is_empty());
}

#[tokio::test]
async fn invalid_product_form_shows_field_errors() {
    let ctx = admin().await;

    let form = Form::new()
        .text("name", "Hi")
        .text("description", "Short")
        .text("price", "0")
        .text("stock", "-1")
        .text("category", "");
    let response = ctx
        .client
        .post(ctx.url("/dashboard/products"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let page = response.text().await.unwrap();
    for message in [
        "Name must be at least 3 characters",
        "Description too short",
        "Price must be positive",
        "Stock cannot be negative",
        "Select a category",
        "Select at least one size",
        "Select at least one color",
    ] {
        assert!(page.contains(message), "{message}");
    }
}

#[tokio::test]
async fn oversized_stock_is_reported() {
    let ctx = admin().await;

    let form = Form::new()
        .text("name", "Lambswool Crew")
        .text("description", "Hand-finished lambswool crew neck.")
        .text("price", "64.99")
        .text("stock", "99999999999")
        .text("category", "c-sweaters")
        .text("sizes", "M")
        .text("colors", "Red");
    let response = ctx
        .client
        .post(ctx.url("/dashboard/products"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("Stock is too large"));
    assert!(ctx.backend.requests_to(&Method::POST, "/products").is_empty());
}

#[tokio::test]
async fn image_upload_without_media_config_fails() {
    let ctx = admin().await;

    let image = Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0])
        .file_name("crew.jpg")
        .mime_str("image/jpeg")
        .unwrap();
    let response = ctx
        .client
        .post(ctx.url("/dashboard/products"))
        .multipart(product_form("Lambswool Crew").part("image", image))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(ctx.backend.requests_to(&Method::POST, "/products").is_empty());
}

#[tokio::test]
async fn update_without_upload_keeps_existing_images() {
    let ctx = admin().await;

    let response = ctx
        .client
        .post(ctx.url("/dashboard/products/p-cardigan"))
        .multipart(product_form("Merino Cardigan"))
        .send()
        .await
        .unwrap();
    assert_eq!(
        location(&response).as_deref(),
        Some("/dashboard/products?success=product_updated")
    );

    let requests = ctx.backend.requests_to(&Method::PATCH, "/products/p-cardigan");
    assert_eq!(requests.len(), 1);
    let body = &requests[0].body;
    assert_eq!(body["name"], "Merino Cardigan");
    assert_eq!(body["price"], 64.99);
    assert_eq!(body["stock"], 12);
    assert_eq!(body["category"], "c-sweaters");
    assert_eq!(body["sizes"], json!(["M", "L"]));
    assert_eq!(body["colors"], json!(["Red"]));
    assert_eq!(
        body["images"],
        json!(["https://res.cloudinary.com/zaheen/image/upload/cardigan.jpg"])
    );
}

#[tokio::test]
async fn updates_are_visible_on_the_storefront() {
    let ctx = admin().await;

    // Prime the catalog cache.
    assert!(ctx.get("/products").await.text().await.unwrap().contains("Merino Cardigan"));

    ctx.client
        .post(ctx.url("/dashboard/products/p-cardigan"))
        .multipart(product_form("Merino Wrap Cardigan"))
        .send()
        .await
        .unwrap();

    let page = ctx.get("/products").await.text().await.unwrap();
    assert!(page.contains("Merino Wrap Cardigan"));
}

#[tokio::test]
async fn delete_product() {
    let ctx = admin().await;

    let response = ctx.post_form("/dashboard/products/p-beanie/delete", &[]).await;
    assert_eq!(
        location(&response).as_deref(),
        Some("/dashboard/products?success=product_deleted")
    );

    let page = ctx.get("/products").await.text().await.unwrap();
    assert!(!page.contains("Ribbed Beanie"));
}

#[tokio::test]
async fn edit_form_is_prefilled() {
    let ctx = admin().await;

    let response = ctx.get("/dashboard/products/p-cardigan/edit").await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains(r#"value="Merino Cardigan""#));
    assert!(page.contains("cardigan.jpg"));
}

#[tokio::test]
async fn edit_form_for_missing_product_is_not_found() {
    let ctx = admin().await;

    let response = ctx.get("/dashboard/products/p-missing/edit").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        ctx.backend
            .requests_to(&Method::GET, "/products/p-missing")
            .len(),
        1
    );
}
