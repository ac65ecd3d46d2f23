//! HTTP handlers for `/books`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use library_http::{error::AppError, extract::LenientJson};

use super::models::{Book, BookUpdate, NewBook, PathId};
use super::store::{BookStore, StoreError};

const NOT_FOUND_MESSAGE: &str = "Book not Found";

/// Routes for the books module, relative to its mount path.
pub fn router(store: Arc<BookStore>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{id}", get(get_book).put(update_book))
        .with_state(store)
}

/// Lookup misses answer 400 on GET.
pub fn get_failure(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound(_) => AppError::bad_request(NOT_FOUND_MESSAGE),
        StoreError::Internal(detail) => AppError::internal(detail),
    }
}

/// Lookup misses answer 404 on PUT.
pub fn update_failure(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound(_) => AppError::not_found(NOT_FOUND_MESSAGE),
        StoreError::Internal(detail) => AppError::internal(detail),
    }
}

fn store_failure(err: StoreError) -> AppError {
    AppError::internal(err)
}

async fn list_books(
    State(store): State<Arc<BookStore>>,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = store.list_all().map_err(store_failure)?;
    Ok(Json(books))
}

async fn get_book(
    State(store): State<Arc<BookStore>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Book>, AppError> {
    let id = PathId::parse(&raw_id);
    let book = store.get_by_id(id).map_err(get_failure)?;
    Ok(Json(book))
}

async fn create_book(
    State(store): State<Arc<BookStore>>,
    LenientJson(new_book): LenientJson<NewBook>,
) -> Result<Json<Book>, AppError> {
    let book = store.create(new_book).map_err(store_failure)?;
    Ok(Json(book))
}

async fn update_book(
    State(store): State<Arc<BookStore>>,
    Path(raw_id): Path<String>,
    LenientJson(update): LenientJson<BookUpdate>,
) -> Result<Json<Book>, AppError> {
    let id = PathId::parse(&raw_id);
    let book = store.update_by_id(id, update).map_err(update_failure)?;
    tracing::info!(%id, "book update answered");
    Ok(Json(book))
}
