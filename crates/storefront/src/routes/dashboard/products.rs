//! Product management.
//!
//! Product forms are multipart so an image can be uploaded alongside the
//! fields. The image goes to Cloudinary first; the backend only ever sees
//! the resulting URL.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use tracing::instrument;
use zaheen_core::{CategoryId, ProductId};

use super::NoticeQuery;
use crate::backend::{Category, Product, ProductInput};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentUser;
use crate::routes::products::ProductView;
use crate::services::Upload;
use crate::state::AppState;

/// Sizes a product can be offered in.
pub const SIZES: [&str; 5] = ["S", "M", "L", "XL", "XXL"];

/// Colors a product can be offered in.
pub const COLORS: [&str; 5] = ["Black", "Gray", "Navy", "White", "Red"];

// =============================================================================
// Form
// =============================================================================

/// Product form as submitted, before validation.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub category: String,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.amount().to_string(),
            stock: product.stock.to_string(),
            category: product
                .category
                .as_ref()
                .map(|c| c.id().to_string())
                .unwrap_or_default(),
            sizes: product.sizes.clone(),
            colors: product.colors.clone(),
        }
    }
}

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: Option<&'static str>,
    pub description: Option<&'static str>,
    pub price: Option<&'static str>,
    pub stock: Option<&'static str>,
    pub category: Option<&'static str>,
    pub sizes: Option<&'static str>,
    pub colors: Option<&'static str>,
    pub image: Option<&'static str>,
}

impl FieldErrors {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.sizes.is_none()
            && self.colors.is_none()
            && self.image.is_none()
    }
}

impl ProductForm {
    /// Validate the form. The returned input has no images; the caller
    /// attaches them once the upload (if any) has gone through.
    ///
    /// # Errors
    ///
    /// Returns the message for every failing field.
    pub fn validate(&self) -> std::result::Result<ProductInput, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        if name.chars().count() < 3 {
            errors.name = Some("Name must be at least 3 characters");
        }

        let description = self.description.trim();
        if description.chars().count() < 10 {
            errors.description = Some("Description too short");
        }

        let price = Decimal::from_str(self.price.trim()).ok();
        if !price.is_some_and(|p| p > Decimal::ZERO) {
            errors.price = Some("Price must be positive");
        }

        let stock = self.stock.trim().parse::<i64>();
        let stock = match stock {
            Ok(n) if n < 0 => {
                errors.stock = Some("Stock cannot be negative");
                None
            }
            Ok(n) => u32::try_from(n)
                .inspect_err(|_| errors.stock = Some("Stock is too large"))
                .ok(),
            Err(_) => {
                errors.stock = Some("Stock must be a whole number");
                None
            }
        };

        let category = self.category.trim();
        if category.is_empty() {
            errors.category = Some("Select a category");
        }

        let sizes = only_allowed(&self.sizes, &SIZES);
        if sizes.is_empty() {
            errors.sizes = Some("Select at least one size");
        }

        let colors = only_allowed(&self.colors, &COLORS);
        if colors.is_empty() {
            errors.colors = Some("Select at least one color");
        }

        match (price, stock) {
            (Some(price), Some(stock)) if errors.is_empty() => Ok(ProductInput {
                name: name.to_string(),
                description: description.to_string(),
                price,
                sizes,
                colors,
                category: CategoryId::new(category),
                stock,
                images: Vec::new(),
            }),
            _ => Err(errors),
        }
    }

    #[must_use]
    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }

    #[must_use]
    pub fn has_color(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c == color)
    }
}

/// Keep the submitted values that are in `allowed`, in `allowed` order,
/// without duplicates.
fn only_allowed(submitted: &[String], allowed: &[&str]) -> Vec<String> {
    allowed
        .iter()
        .filter(|a| submitted.iter().any(|s| s == *a))
        .map(|a| (*a).to_string())
        .collect()
}

/// Read the multipart product form and the optional image file.
async fn read_form(mut multipart: Multipart) -> Result<(ProductForm, Option<Upload>)> {
    let mut form = ProductForm::default();
    let mut upload = None;

    let bad_request = |e: axum::extract::multipart::MultipartError| AppError::BadRequest(e.body_text());

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await.map_err(bad_request)?;
            if !bytes.is_empty() {
                upload = Some(Upload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await.map_err(bad_request)?;
        match name.as_str() {
            "name" => form.name = value,
            "description" => form.description = value,
            "price" => form.price = value,
            "stock" => form.stock = value,
            "category" => form.category = value,
            "sizes" => form.sizes.push(value),
            "colors" => form.colors.push(value),
            _ => {}
        }
    }

    Ok((form, upload))
}

// =============================================================================
// Templates
// =============================================================================

/// Product and category management page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/products.html")]
pub struct ProductsTemplate {
    pub user: Option<CurrentUser>,
    pub products: Vec<ProductView>,
    pub categories: Vec<Category>,
    pub success: Option<&'static str>,
    pub error: Option<&'static str>,
}

/// Create/edit product form template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/product_form.html")]
pub struct ProductFormTemplate {
    pub user: Option<CurrentUser>,
    /// `None` when creating.
    pub product_id: Option<String>,
    pub current_image: Option<String>,
    pub form: ProductForm,
    pub errors: FieldErrors,
    pub categories: Vec<Category>,
    pub sizes: &'static [&'static str],
    pub colors: &'static [&'static str],
}

impl ProductFormTemplate {
    fn new(user: CurrentUser, categories: Vec<Category>) -> Self {
        Self {
            user: Some(user),
            product_id: None,
            current_image: None,
            form: ProductForm::default(),
            errors: FieldErrors::default(),
            categories,
            sizes: &SIZES,
            colors: &COLORS,
        }
    }

    fn action(&self) -> String {
        self.product_id
            .as_ref()
            .map_or_else(|| "/dashboard/products".to_string(), |id| format!("/dashboard/products/{id}"))
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product and category tables.
#[instrument(skip_all, fields(user_id = %admin.id))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<impl IntoResponse> {
    let (products, categories) = tokio::try_join!(
        state.backend().list_products(),
        state.backend().list_categories()
    )?;

    Ok(ProductsTemplate {
        user: Some(admin),
        products: products.iter().map(ProductView::from).collect(),
        categories,
        success: query.success_message(),
        error: query.error_message(),
    })
}

/// Display the empty product form.
#[instrument(skip_all, fields(user_id = %admin.id))]
pub async fn new(RequireAdmin(admin): RequireAdmin, State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = state.backend().list_categories().await?;
    Ok(ProductFormTemplate::new(admin, categories))
}

/// Display the product form filled with an existing product.
#[instrument(skip(admin, state), fields(user_id = %admin.id))]
pub async fn edit(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(id);
    let (product, categories) = tokio::try_join!(
        state.backend().get_product(&id),
        state.backend().list_categories()
    )?;

    let mut template = ProductFormTemplate::new(admin, categories);
    template.product_id = Some(product.id.to_string());
    template.current_image = product.images.first().cloned();
    template.form = ProductForm::from(&product);
    Ok(template)
}

/// Create a product. An image upload is required.
#[instrument(skip_all, fields(user_id = %admin.id))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response> {
    let (form, upload) = read_form(multipart).await?;

    let mut input = match form.validate() {
        Ok(input) if upload.is_some() => input,
        Ok(_) => {
            let errors = FieldErrors {
                image: Some("Please upload an image for the product."),
                ..FieldErrors::default()
            };
            return rerender(&state, admin, None, None, form, errors).await;
        }
        Err(mut errors) => {
            if upload.is_none() {
                errors.image = Some("Please upload an image for the product.");
            }
            return rerender(&state, admin, None, None, form, errors).await;
        }
    };

    if let Some(upload) = upload {
        input.images = vec![state.media().upload(upload).await?];
    }

    state.backend().create_product(admin.token(), &input).await?;
    add_breadcrumb("dashboard", "Product created", Some(&[("name", input.name.as_str())]));

    Ok(Redirect::to("/dashboard/products?success=product_created").into_response())
}

/// Update a product. Without a new upload the existing images are kept.
#[instrument(skip(admin, state, multipart), fields(user_id = %admin.id))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let id = ProductId::new(id);
    let (form, upload) = read_form(multipart).await?;
    let existing = state.backend().get_product(&id).await?;

    let mut input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let current_image = existing.images.first().cloned();
            return rerender(&state, admin, Some(id.to_string()), current_image, form, errors).await;
        }
    };

    input.images = match upload {
        Some(upload) => vec![state.media().upload(upload).await?],
        None => existing.images,
    };

    state.backend().update_product(admin.token(), &id, &input).await?;
    add_breadcrumb("dashboard", "Product updated", Some(&[("product_id", id.as_str())]));

    Ok(Redirect::to("/dashboard/products?success=product_updated").into_response())
}

/// Delete a product.
#[instrument(skip(admin, state), fields(user_id = %admin.id))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state
        .backend()
        .delete_product(admin.token(), &ProductId::new(id))
        .await
    {
        Ok(()) => Redirect::to("/dashboard/products?success=product_deleted").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete product");
            Redirect::to("/dashboard/products?error=delete").into_response()
        }
    }
}

/// Show the form again with the submitted values and field errors.
async fn rerender(
    state: &AppState,
    admin: CurrentUser,
    product_id: Option<String>,
    current_image: Option<String>,
    form: ProductForm,
    errors: FieldErrors,
) -> Result<Response> {
    let categories = state.backend().list_categories().await?;
    let mut template = ProductFormTemplate::new(admin, categories);
    template.product_id = product_id;
    template.current_image = current_image;
    template.form = form;
    template.errors = errors;
    Ok((StatusCode::BAD_REQUEST, template).into_response())
}
