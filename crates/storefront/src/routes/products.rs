//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;
use zaheen_core::{CategoryId, LineKey, ProductId};

use crate::backend::{Category, Product};
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::services::CartStore;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: String,
    pub images: Vec<String>,
    pub category: String,
    pub category_id: String,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: u32,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            image: product.primary_image().to_string(),
            images: product.images.clone(),
            category: product.category_name().to_string(),
            category_id: product
                .category
                .as_ref()
                .map(|c| c.id().to_string())
                .unwrap_or_default(),
            sizes: product.sizes.clone(),
            colors: product.colors.clone(),
            stock: product.stock,
        }
    }
}

impl ProductView {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Category filter query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

/// Selected variant query parameters.
#[derive(Debug, Deserialize)]
pub struct VariantQuery {
    pub size: Option<String>,
    pub color: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub user: Option<CurrentUser>,
    pub products: Vec<ProductView>,
    pub categories: Vec<Category>,
    pub selected_category: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub user: Option<CurrentUser>,
    pub product: ProductView,
    pub selected_size: String,
    pub selected_color: String,
    /// Quantity of the selected variant already in the cart.
    pub in_cart: u32,
}

/// Display product listing page, optionally filtered by category.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse> {
    let (products, categories) = tokio::try_join!(
        state.backend().list_products(),
        state.backend().list_categories()
    )?;

    let selected = query
        .category
        .filter(|c| !c.is_empty())
        .map(CategoryId::new);

    let products = products
        .iter()
        .filter(|p| selected.as_ref().is_none_or(|c| p.in_category(c)))
        .map(ProductView::from)
        .collect();

    Ok(ProductsIndexTemplate {
        user,
        products,
        categories,
        selected_category: selected.map(CategoryId::into_inner),
    })
}

/// Pick `requested` if the product offers it, else its first option.
fn pick(options: &[String], requested: Option<String>) -> String {
    requested
        .filter(|r| options.contains(r))
        .or_else(|| options.first().cloned())
        .unwrap_or_default()
}

/// Display product detail page.
#[instrument(skip(state, user, cart, query))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    cart: CartStore,
    Path(id): Path<String>,
    Query(query): Query<VariantQuery>,
) -> Result<impl IntoResponse> {
    let product = state.backend().get_product(&ProductId::new(id)).await?;

    let selected_size = pick(&product.sizes, query.size);
    let selected_color = pick(&product.colors, query.color);
    let in_cart = cart
        .cart()
        .get(&LineKey::new(
            product.id.clone(),
            selected_size.clone(),
            selected_color.clone(),
        ))
        .map_or(0, |line| line.quantity);

    Ok(ProductShowTemplate {
        user,
        product: ProductView::from(&product),
        selected_size,
        selected_color,
        in_cart,
    })
}
