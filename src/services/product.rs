//! Product services - Catalogo prodotti (CRUD, ricerca, paginazione)

use crate::core::{AppError, AppState};
use crate::dtos::{
    BulkStatusDTO, CreateProductDTO, MessageResponseDTO, ProductListDTO, ProductQuery,
    SearchQuery, StockUpdateDTO, UpdateProductDTO,
};
use crate::entities::Product;
use crate::repositories::{ProductFilter, RepositoryError};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

async fn find_product(state: &AppState, product_id: i64) -> Result<Product, AppError> {
    state.product.read(&product_id).await?.ok_or_else(|| {
        warn!("Product {} not found", product_id);
        AppError::not_found("Product not found")
    })
}

fn product_not_found(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::not_found("Product not found"),
        other => other.into(),
    }
}

async fn page(
    state: &AppState,
    filter: &ProductFilter,
    page: i64,
    page_size: i64,
    offset: i64,
) -> Result<ProductListDTO, AppError> {
    let total = state.product.count(filter).await?;
    let products = state.product.list(filter, offset, page_size).await?;
    debug!("Returning {} of {} products", products.len(), total);
    Ok(ProductListDTO::new(products, total, page, page_size))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProductQuery>, // /products?page=1&page_size=10&category=...
) -> Result<Json<ProductListDTO>, AppError> {
    let pagination = params.pagination();
    let filter = params.filter();
    let list = page(
        &state,
        &filter,
        pagination.page,
        pagination.page_size,
        pagination.offset(),
    )
    .await?;
    Ok(Json(list))
}

#[instrument(skip(state), fields(q = %params.q))]
pub async fn search_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<ProductListDTO>, AppError> {
    let term = params.q.trim();
    if term.is_empty() {
        return Err(AppError::bad_request("Search query is required"));
    }

    let pagination = params.pagination();
    let list = page(
        &state,
        &ProductFilter::search(term),
        pagination.page,
        pagination.page_size,
        pagination.offset(),
    )
    .await?;
    Ok(Json(list))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    let product = find_product(&state, product_id).await?;
    Ok(Json(product))
}

#[instrument(skip(state, body), fields(name = %body.name))]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateProductDTO>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    // 1. Validare il DTO (nome, prezzo, stock)
    // 2. Il nome deve essere unico tra i prodotti non cancellati, altrimenti CONFLICT
    // 3. Salvare e ritornare 201 con il prodotto creato
    body.validate()?;

    if state.product.exists_by_name(&body.name).await? {
        warn!("Product name already in use");
        return Err(AppError::conflict("Product with this name already exists"));
    }

    let product = state.product.create(&body).await?;
    info!("Product {} created", product.id);
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, body))]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
    Json(body): Json<UpdateProductDTO>,
) -> Result<Json<Product>, AppError> {
    body.validate()?;

    let current = find_product(&state, product_id).await?;
    if let Some(name) = &body.name {
        if *name != current.name && state.product.exists_by_name(name).await? {
            return Err(AppError::conflict("Product with this name already exists"));
        }
    }

    let product = state.product.update(&product_id, &body).await?;
    info!("Product updated");
    Ok(Json(product))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
) -> Result<Json<MessageResponseDTO>, AppError> {
    state
        .product
        .delete(&product_id)
        .await
        .map_err(product_not_found)?;
    info!("Product deleted");
    Ok(Json(MessageResponseDTO::new("Product deleted successfully")))
}

#[instrument(skip(state, body), fields(stock = %body.stock))]
pub async fn update_stock(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i64>,
    Json(body): Json<StockUpdateDTO>,
) -> Result<Json<MessageResponseDTO>, AppError> {
    body.validate()?;
    state
        .product
        .update_stock(&product_id, body.stock)
        .await
        .map_err(product_not_found)?;
    Ok(Json(MessageResponseDTO::new("Stock updated successfully")))
}

/// Solo admin: attiva/disattiva più prodotti in una volta
#[instrument(skip(state, body), fields(count = body.product_ids.len(), is_active = body.is_active))]
pub async fn bulk_update_status(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BulkStatusDTO>,
) -> Result<Json<MessageResponseDTO>, AppError> {
    body.validate()?;
    let updated = state
        .product
        .bulk_update_status(&body.product_ids, body.is_active)
        .await?;
    info!("{} products updated", updated);
    Ok(Json(MessageResponseDTO::new(format!("{updated} products updated"))))
}
