//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use matchday_core::ProductId;

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Catalog query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Keyword matched against name and description.
    pub q: Option<String>,
    /// Exact category filter.
    pub category: Option<String>,
}

/// List products with optional search and category filter.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Value>> {
    let products = ProductRepository::new(state.pool())
        .list(query.q.as_deref(), query.category.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "products": products,
    })))
}

/// Get a single product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(json!({
        "success": true,
        "product": product,
    })))
}
