//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the session (see [`CartStore`]).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;
use zaheen_core::{Cart, CartItem, LineKey, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::services::CartStore;
use crate::state::AppState;

/// HTMX event fired whenever the cart changes.
const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub size: String,
    pub color: String,
    pub image: String,
    pub price: String,
    pub line_total: String,
    pub quantity: u32,
    pub stock: u32,
}

impl CartLineView {
    #[must_use]
    pub const fn can_decrement(&self) -> bool {
        self.quantity > 1
    }

    #[must_use]
    pub const fn can_increment(&self) -> bool {
        self.quantity < self.stock
    }
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name: item.name.clone(),
            size: item.size.clone(),
            color: item.color.clone(),
            image: item.image.clone(),
            price: item.price.to_string(),
            line_total: item.line_total().to_string(),
            quantity: item.quantity,
            stock: item.stock,
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartLineView::from).collect(),
            subtotal: cart.total_price().to_string(),
            item_count: cart.total_items(),
        }
    }
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub size: String,
    pub color: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub size: String,
    pub color: String,
    pub quantity: i64,
}

/// Identifies one cart line.
#[derive(Debug, Deserialize)]
pub struct LineForm {
    pub product_id: String,
    pub size: String,
    pub color: String,
}

impl LineForm {
    fn key(self) -> LineKey {
        LineKey::new(self.product_id, self.size, self.color)
    }
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub error: Option<String>,
}

/// Message for an error code passed back to the cart page.
fn error_message(code: &str) -> &'static str {
    match code {
        "empty" => "Your cart is empty!",
        _ => "Checkout failed. Please try again.",
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub user: Option<CurrentUser>,
    pub cart: CartView,
    pub error: Option<&'static str>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Response to a successful add: the refreshed count badge plus an
/// out-of-band confirmation notice (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_added.html")]
pub struct CartAddedTemplate {
    pub count: u64,
    pub message: String,
}

/// Inline notice fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/notice.html")]
pub struct NoticeTemplate {
    pub message: String,
    pub is_error: bool,
}

/// Display cart page.
#[instrument(skip(user, cart))]
pub async fn show(
    OptionalAuth(user): OptionalAuth,
    cart: CartStore,
    Query(query): Query<CartQuery>,
) -> impl IntoResponse {
    CartShowTemplate {
        user,
        cart: CartView::from(cart.cart()),
        error: query.error.as_deref().map(error_message),
    }
}

/// Add item to cart (HTMX).
///
/// Snapshots the product's current name, price, image and stock from the
/// backend. Returns the cart count badge and triggers `cart-updated`, or a
/// `409` notice retargeted at the product form when the requested quantity
/// exceeds stock.
#[instrument(skip(state, cart))]
pub async fn add(
    State(state): State<AppState>,
    mut cart: CartStore,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .backend()
        .get_product(&ProductId::new(form.product_id))
        .await?;

    if !product.offers(&form.size, &form.color) {
        return Err(AppError::BadRequest(format!(
            "{} is not available in {} / {}",
            product.name, form.size, form.color
        )));
    }

    let item = product.to_cart_item(&form.size, &form.color);
    match cart.add_item(item, form.quantity.unwrap_or(1)).await {
        Ok(line) => {
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[
                    ("product_id", line.product_id.as_str()),
                    ("size", line.size.as_str()),
                    ("color", line.color.as_str()),
                ]),
            );
            Ok((
                AppendHeaders([CART_UPDATED]),
                CartAddedTemplate {
                    count: cart.total_items(),
                    message: format!("{} added to cart", line.name),
                },
            )
                .into_response())
        }
        Err(AppError::Stock(e)) => {
            tracing::info!(
                product_id = %e.product_id,
                available = e.available,
                requested = e.requested,
                "Add to cart rejected: insufficient stock"
            );
            Ok((
                StatusCode::CONFLICT,
                AppendHeaders([
                    ("HX-Retarget", "#add-to-cart-result"),
                    ("HX-Reswap", "innerHTML"),
                ]),
                NoticeTemplate {
                    message: e.to_string(),
                    is_error: true,
                },
            )
                .into_response())
        }
        Err(e) => Err(e),
    }
}

/// Update cart line quantity (HTMX). The quantity is clamped to
/// `1..=stock`.
#[instrument(skip(cart))]
pub async fn update(mut cart: CartStore, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let key = LineKey::new(form.product_id, form.size, form.color);
    cart.update_quantity(&key, form.quantity).await?;

    Ok((
        AppendHeaders([CART_UPDATED]),
        CartItemsTemplate {
            cart: CartView::from(cart.cart()),
        },
    )
        .into_response())
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(cart))]
pub async fn remove(mut cart: CartStore, Form(form): Form<LineForm>) -> Result<Response> {
    cart.remove_item(&form.key()).await?;

    Ok((
        AppendHeaders([CART_UPDATED]),
        CartItemsTemplate {
            cart: CartView::from(cart.cart()),
        },
    )
        .into_response())
}

/// Empty the cart (HTMX).
#[instrument(skip(cart))]
pub async fn clear(mut cart: CartStore) -> Result<Response> {
    cart.clear().await?;

    Ok((
        AppendHeaders([CART_UPDATED]),
        CartItemsTemplate {
            cart: CartView::from(cart.cart()),
        },
    )
        .into_response())
}

/// Get cart count badge (HTMX).
pub async fn count(cart: CartStore) -> impl IntoResponse {
    CartCountTemplate {
        count: cart.total_items(),
    }
}

/// Hand the cart off to the backend's hosted checkout.
///
/// On success redirects (303) to the payment page. On failure redirects
/// back to the cart with an error notice; the cart is left as it was.
#[instrument(skip(state, user, cart))]
pub async fn checkout(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    cart: CartStore,
) -> Response {
    let Ok(request) = cart.cart().checkout_request() else {
        return Redirect::to("/cart?error=empty").into_response();
    };

    match state
        .backend()
        .create_checkout(user.as_ref().map(CurrentUser::token), &request)
        .await
    {
        Ok(url) => {
            add_breadcrumb("checkout", "Redirecting to payment", None);
            Redirect::to(&url).into_response()
        }
        Err(e) => {
            if e.is_server_error() {
                let event_id = sentry::capture_error(&e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Checkout failed");
            } else {
                tracing::warn!(error = %e, "Checkout rejected by backend");
            }
            Redirect::to("/cart?error=checkout").into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use zaheen_core::{NewCartItem, Price};

    use super::*;

    fn cart_with(quantity: u32, stock: u32) -> Cart {
        let mut cart = Cart::new();
        cart.add_item(
            NewCartItem {
                product_id: ProductId::new("p1"),
                name: "Cable Knit Sweater".to_string(),
                price: Price::from_cents(4999),
                size: "M".to_string(),
                color: "Navy".to_string(),
                image: String::new(),
                stock,
            },
            quantity,
        )
        .unwrap();
        cart
    }

    #[test]
    fn test_cart_view_formats_totals() {
        let view = CartView::from(&cart_with(2, 5));
        assert_eq!(view.item_count, 2);
        assert_eq!(view.subtotal, "$99.98");
        assert_eq!(view.items[0].price, "$49.99");
        assert_eq!(view.items[0].line_total, "$99.98");
    }

    #[test]
    fn test_stepper_bounds() {
        let view = CartView::from(&cart_with(1, 1));
        assert!(!view.items[0].can_decrement());
        assert!(!view.items[0].can_increment());

        let view = CartView::from(&cart_with(2, 3));
        assert!(view.items[0].can_decrement());
        assert!(view.items[0].can_increment());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(error_message("empty"), "Your cart is empty!");
        assert_eq!(error_message("checkout"), "Checkout failed. Please try again.");
        assert_eq!(error_message("anything"), "Checkout failed. Please try again.");
    }

    #[test]
    fn test_cart_count_fragment_renders() {
        let html = CartCountTemplate { count: 3 }.render().unwrap();
        assert!(html.contains('3'));
    }
}
