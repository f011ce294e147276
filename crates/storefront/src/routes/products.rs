//! Product route handlers.
//!
//! Reads are public. Writes require a session and are limited to the product's
//! owner or an admin.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::{PageRequest, Price, ProductId, UserId};

use super::MessageResponse;
use crate::db::RepositoryError;
use crate::error::{AppError, Json, Path, Query, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::{
    CurrentUser, NewProduct, Product, ProductFilter, ProductPage, ProductUpdate, SortOrder,
};
use crate::state::AppState;

/// Default page size of the public catalog.
const DEFAULT_LIMIT: u32 = 6;

/// Catalog listing query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub order: Option<String>,
}

impl ListQuery {
    /// Split into a filter and a page request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if a price bound is not a valid price.
    pub fn into_parts(self, default_limit: u32) -> Result<(ProductFilter, PageRequest)> {
        let min_price = parse_price_param("minPrice", self.min_price.as_deref())?;
        let max_price = parse_price_param("maxPrice", self.max_price.as_deref())?;

        let filter = ProductFilter::new(
            self.search.as_deref(),
            min_price,
            max_price,
            SortOrder::from_param(self.order.as_deref()),
        );
        let page = PageRequest::new(self.page, self.limit, default_limit);
        Ok((filter, page))
    }
}

fn parse_price_param(name: &str, value: Option<&str>) -> Result<Option<Price>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Price::parse(v)
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid {name}"))),
        None => Ok(None),
    }
}

/// Product creation body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub image: Option<String>,
}

/// Partial product update body.
///
/// An explicit `"image": null` clears the image; an absent key leaves it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    #[serde(deserialize_with = "present")]
    pub image: Option<Option<String>>,
}

/// Distinguish an explicit `null` from a missing field.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Run a catalog listing.
pub(super) async fn list_products(
    state: &AppState,
    query: ListQuery,
    default_limit: u32,
) -> Result<ProductPage> {
    let (filter, page) = query.into_parts(default_limit)?;
    let (products, total) = state.catalog().list(&filter, page).await?;
    Ok(ProductPage::new(products, total, page))
}

/// Filtered, paginated catalog.
///
/// GET /api/products
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductPage>> {
    list_products(&state, query, DEFAULT_LIMIT).await.map(Json)
}

/// Product detail.
///
/// GET /api/products/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    find(&state, id).await.map(Json)
}

/// Products owned by a user.
///
/// GET /api/products/user/{user_id}
#[instrument(skip(state))]
pub async fn by_owner(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().list_by_owner(user_id).await?;
    Ok(Json(products))
}

/// Create a product owned by the current user.
///
/// POST /api/products
#[instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse> {
    let new = NewProduct::new(req.name, req.description, req.price, req.image)
        .map_err(AppError::BadRequest)?;

    let product = state.catalog().create(user.id, &new).await?;

    add_breadcrumb("product", "Created product", None);
    tracing::info!(product_id = %product.id, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product.
///
/// PUT /api/products/{id}
#[instrument(skip(state, user, req), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let existing = find(&state, id).await?;
    authorize(&user, &existing)?;

    let update = ProductUpdate::new(req.name, req.description, req.price, req.image)
        .map_err(AppError::BadRequest)?;
    if update.is_empty() {
        return Ok(Json(existing));
    }

    let product = state
        .catalog()
        .update(id, &update)
        .await
        .map_err(not_found)?;

    Ok(Json(product))
}

/// Delete a product, then its image on the image host.
///
/// DELETE /api/products/{id}
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
) -> Result<Json<MessageResponse>> {
    let existing = find(&state, id).await?;
    authorize(&user, &existing)?;

    let deleted = state.catalog().delete(id).await.map_err(not_found)?;
    tracing::info!(product_id = %id, "Product deleted");

    // The row is gone either way; a dangling image is only logged
    if let (Some(image), Some(media)) = (deleted.image.as_deref(), state.media())
        && let Err(e) = media.destroy_url(image).await
    {
        tracing::warn!(error = %e, "Failed to delete product image");
    }

    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

async fn find(state: &AppState, id: ProductId) -> Result<Product> {
    state
        .catalog()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

fn authorize(user: &CurrentUser, product: &Product) -> Result<()> {
    if user.can_manage(product.user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Forbidden".to_string()))
    }
}

fn not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("Product not found".to_string()),
        other => AppError::Database(other),
    }
}
