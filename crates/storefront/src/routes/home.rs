//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::backend::Category;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Number of products shown in the home page grid.
const FEATURED_COUNT: usize = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub user: Option<CurrentUser>,
    pub featured_products: Vec<ProductView>,
    pub categories: Vec<Category>,
}

/// Display the home page.
///
/// The home page still renders when the backend is unreachable; the product
/// sections are simply empty.
#[instrument(skip(state, user))]
pub async fn home(State(state): State<AppState>, OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    let featured_products = match state.backend().list_products().await {
        Ok(products) => products
            .iter()
            .rev()
            .take(FEATURED_COUNT)
            .map(ProductView::from)
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load featured products");
            Vec::new()
        }
    };

    let categories = state.backend().list_categories().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load categories");
        Vec::new()
    });

    HomeTemplate {
        user,
        featured_products,
        categories,
    }
}
