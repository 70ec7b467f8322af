//! Wire types for the backend REST API.
//!
//! Documents use MongoDB-style `_id` identifiers. List and detail endpoints
//! wrap their payload in `{ "success", "message", "data" }`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use zaheen_core::{CategoryId, NewCartItem, Price, ProductId, UserId, UserRole};

/// Standard `{ data }` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub message: Option<String>,
    pub data: T,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
}

/// A product's category as returned by the API: populated on most
/// endpoints, a bare id on some.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Populated(Category),
    Id(CategoryId),
}

impl CategoryRef {
    #[must_use]
    pub const fn id(&self) -> &CategoryId {
        match self {
            Self::Populated(category) => &category.id,
            Self::Id(id) => id,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Populated(category) => Some(category.name.as_str()),
            Self::Id(_) => None,
        }
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub category: Option<CategoryRef>,
}

impl Product {
    /// First image, or an empty string when the product has none.
    #[must_use]
    pub fn primary_image(&self) -> &str {
        self.images.first().map_or("", String::as_str)
    }

    #[must_use]
    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .and_then(CategoryRef::name)
            .unwrap_or("Uncategorized")
    }

    #[must_use]
    pub fn in_category(&self, category: &CategoryId) -> bool {
        self.category.as_ref().is_some_and(|c| c.id() == category)
    }

    /// Whether `size` and `color` are both variants this product is sold in.
    #[must_use]
    pub fn offers(&self, size: &str, color: &str) -> bool {
        self.sizes.iter().any(|s| s == size) && self.colors.iter().any(|c| c == color)
    }

    /// Snapshot this product's current name, price, image and stock for a
    /// cart line in the given variant.
    #[must_use]
    pub fn to_cart_item(&self, size: &str, color: &str) -> NewCartItem {
        NewCartItem {
            product_id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            size: size.to_string(),
            color: color.to_string(),
            image: self.primary_image().to_string(),
            stock: self.stock,
        }
    }
}

/// Body for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub category: CategoryId,
    pub stock: u32,
    pub images: Vec<String>,
}

/// Body for creating or renaming a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInput {
    pub name: String,
}

// =============================================================================
// Auth
// =============================================================================

/// Authenticated user as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
}

/// Token plus the user it was issued to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub(super) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Registration form as submitted to the backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub(super) struct GoogleTokenRequest<'a> {
    pub token: &'a str,
}

/// Login responses: password login answers `{ token, user }`, Google login
/// `{ token, data: { user } }`.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub data: Option<UserData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UserData {
    pub user: User,
}

// =============================================================================
// Payment
// =============================================================================

#[derive(Debug, Deserialize)]
pub(super) struct CheckoutResponse {
    #[serde(default)]
    pub url: Option<String>,
}
