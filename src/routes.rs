//! The HTTP surface: five operations on two routes.
//!
//! The response contract is deliberately body-driven: validation failures
//! and not-found answer 200 with a short plain-text body, and callers tell
//! outcomes apart by content-type, not status code. Only storage failures
//! produce an error status.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::{Deserialize, Serialize};

use crate::model::{Book, BookId};
use crate::store::{BookStore, StoreError};

const NO_BOOK_EXISTS: &str = "no book exists";
const MISSING_TITLE: &str = "missing required field title";
const MISSING_COMMENT: &str = "missing required field comment";
const DELETE_ONE_OK: &str = "delete successful";
const DELETE_ALL_OK: &str = "complete delete successful";

/// Shared application dependencies, injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }
}

/// Storage failure escaping a handler. Renders as a bare 500; the cause is
/// logged, never leaked to the client.
#[derive(Debug)]
pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "store operation failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    #[serde(default)]
    pub comment: Option<String>,
}

/// List projection: comment count only, never the comments themselves.
#[derive(Debug, Serialize)]
pub struct BookSummary {
    #[serde(rename = "_id")]
    pub id: BookId,
    pub title: String,
    pub commentcount: usize,
}

impl From<Book> for BookSummary {
    fn from(book: Book) -> Self {
        Self {
            commentcount: book.comment_count(),
            id: book.id,
            title: book.title,
        }
    }
}

/// Creation response: id and title only.
#[derive(Debug, Serialize)]
pub struct BookCreated {
    #[serde(rename = "_id")]
    pub id: BookId,
    pub title: String,
}

impl From<Book> for BookCreated {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
        }
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/books",
            get(list_books).post(create_book).delete(delete_all_books),
        )
        .route(
            "/api/books/{id}",
            get(get_book).post(add_comment).delete(delete_book),
        )
        .with_state(state)
}

/// GET /api/books
async fn list_books(State(state): State<AppState>) -> Result<Response, ApiError> {
    let books = state.store.list().await?;
    let summaries: Vec<BookSummary> = books.into_iter().map(BookSummary::from).collect();
    Ok(Json(summaries).into_response())
}

/// POST /api/books
async fn create_book(
    State(state): State<AppState>,
    Json(body): Json<CreateBookRequest>,
) -> Result<Response, ApiError> {
    let title = body.title.unwrap_or_default();
    if title.is_empty() {
        return Ok(MISSING_TITLE.into_response());
    }
    let book = state.store.insert(title).await?;
    tracing::debug!(id = %book.id, "created book");
    Ok(Json(BookCreated::from(book)).into_response())
}

/// DELETE /api/books
async fn delete_all_books(State(state): State<AppState>) -> Result<Response, ApiError> {
    state.store.clear().await?;
    tracing::debug!("deleted all books");
    Ok(DELETE_ALL_OK.into_response())
}

/// GET /api/books/{id}
///
/// A malformed id is answered exactly like a missing record.
async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Ok(id) = BookId::parse(&id) else {
        return Ok(NO_BOOK_EXISTS.into_response());
    };
    match state.store.get(&id).await? {
        Some(book) => Ok(Json(book).into_response()),
        None => Ok(NO_BOOK_EXISTS.into_response()),
    }
}

/// POST /api/books/{id}
///
/// Validation order: id format, then comment presence, then existence.
async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AddCommentRequest>,
) -> Result<Response, ApiError> {
    let Ok(id) = BookId::parse(&id) else {
        return Ok(NO_BOOK_EXISTS.into_response());
    };
    let comment = body.comment.unwrap_or_default();
    if comment.is_empty() {
        return Ok(MISSING_COMMENT.into_response());
    }
    match state.store.append_comment(&id, comment).await? {
        Some(book) => Ok(Json(book).into_response()),
        None => Ok(NO_BOOK_EXISTS.into_response()),
    }
}

/// DELETE /api/books/{id}
async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Ok(id) = BookId::parse(&id) else {
        return Ok(NO_BOOK_EXISTS.into_response());
    };
    if state.store.remove(&id).await? {
        tracing::debug!(%id, "deleted book");
        Ok(DELETE_ONE_OK.into_response())
    } else {
        Ok(NO_BOOK_EXISTS.into_response())
    }
}
