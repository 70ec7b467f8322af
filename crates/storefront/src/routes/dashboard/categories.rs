//! Category management.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;
use zaheen_core::CategoryId;

use crate::error::add_breadcrumb;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Category create/rename form data.
#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: String,
}

impl CategoryForm {
    fn name(&self) -> Option<&str> {
        let name = self.name.trim();
        (!name.is_empty()).then_some(name)
    }
}

/// Create a category.
#[instrument(skip(admin, state), fields(user_id = %admin.id))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let Some(name) = form.name() else {
        return Redirect::to("/dashboard/products?error=category_name").into_response();
    };

    match state.backend().create_category(admin.token(), name).await {
        Ok(()) => {
            add_breadcrumb("dashboard", "Category created", Some(&[("name", name)]));
            Redirect::to("/dashboard/products?success=category_created").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create category");
            Redirect::to("/dashboard/products?error=category").into_response()
        }
    }
}

/// Rename a category.
#[instrument(skip(admin, state), fields(user_id = %admin.id))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let Some(name) = form.name() else {
        return Redirect::to("/dashboard/products?error=category_name").into_response();
    };

    match state
        .backend()
        .update_category(admin.token(), &CategoryId::new(id), name)
        .await
    {
        Ok(()) => Redirect::to("/dashboard/products?success=category_updated").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update category");
            Redirect::to("/dashboard/products?error=category").into_response()
        }
    }
}

/// Delete a category.
#[instrument(skip(admin, state), fields(user_id = %admin.id))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state
        .backend()
        .delete_category(admin.token(), &CategoryId::new(id))
        .await
    {
        Ok(()) => Redirect::to("/dashboard/products?success=category_deleted").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete category");
            Redirect::to("/dashboard/products?error=delete").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_name_is_trimmed() {
        let form = CategoryForm {
            name: "  Sweaters ".to_string(),
        };
        assert_eq!(form.name(), Some("Sweaters"));

        let form = CategoryForm {
            name: "   ".to_string(),
        };
        assert_eq!(form.name(), None);
    }
}
