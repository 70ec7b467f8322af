//! Admin dashboard route handlers.
//!
//! Every handler takes [`RequireAdmin`]: anonymous visitors are sent to the
//! login page and non-admin users get `403`. Writes go to the backend with
//! the admin's own token.

pub mod categories;
pub mod products;

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Query parameters for flash notices after a dashboard action.
#[derive(Debug, Deserialize)]
pub struct NoticeQuery {
    pub success: Option<String>,
    pub error: Option<String>,
}

impl NoticeQuery {
    fn success_message(&self) -> Option<&'static str> {
        self.success.as_deref().map(|code| match code {
            "product_created" => "Product created",
            "product_updated" => "Product updated",
            "product_deleted" => "Product deleted",
            "category_created" => "Category created",
            "category_updated" => "Category updated",
            "category_deleted" => "Category deleted",
            _ => "Saved",
        })
    }

    fn error_message(&self) -> Option<&'static str> {
        self.error.as_deref().map(|code| match code {
            "category_name" => "Category name is required",
            "category" => "Failed to save category",
            "delete" => "Delete failed",
            _ => "Failed to save product",
        })
    }
}

/// Dashboard overview template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/index.html")]
pub struct DashboardTemplate {
    pub user: Option<CurrentUser>,
    pub product_count: usize,
    pub category_count: usize,
    pub out_of_stock_count: usize,
}

/// Display the dashboard overview.
#[instrument(skip_all, fields(user_id = %admin.id))]
pub async fn index(RequireAdmin(admin): RequireAdmin, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let (products, categories) = tokio::try_join!(
        state.backend().list_products(),
        state.backend().list_categories()
    )?;

    Ok(DashboardTemplate {
        product_count: products.len(),
        category_count: categories.len(),
        out_of_stock_count: products.iter().filter(|p| p.stock == 0).count(),
        user: Some(admin),
    })
}
