use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_book, create_lending, get_book, get_book_history, get_dashboard,
    get_lending_history, list_active_borrowings, list_books, list_overdue, login, logout,
    register, return_lending, update_book,
};

/// Creates the API router with all endpoints
///
/// Auth endpoints:
/// - POST /auth/register - Register a user and issue a token
/// - POST /auth/login - Log in and issue a token
/// - POST /auth/logout - Revoke the current token
///
/// Book endpoints (owner-scoped):
/// - POST /books - Register a book (always created as available)
/// - GET /books - List owned books with optional status filter
/// - GET /books/:id - Get a book
/// - PUT /books/:id - Update title/author/genre
/// - GET /books/:id/history - Lending history of one book
///
/// Lending endpoints:
/// - POST /lendings - Lend a book
/// - POST /lendings/:id/return - Mark a lending as returned
/// - GET /lendings/history - Per-book lending history of owned books
/// - GET /lendings/active - Open lendings borrowed by the caller
///
/// Dashboard endpoints:
/// - GET /dashboard - Summary counts
/// - GET /dashboard/overdue - Paginated overdue lendings
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Auth endpoints
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        // Book endpoints
        .route("/books", post(create_book).get(list_books))
        .route("/books/:id", get(get_book).put(update_book))
        .route("/books/:id/history", get(get_book_history))
        // Lending endpoints
        .route("/lendings", post(create_lending))
        .route("/lendings/:id/return", post(return_lending))
        .route("/lendings/history", get(get_lending_history))
        .route("/lendings/active", get(list_active_borrowings))
        // Dashboard endpoints
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/overdue", get(list_overdue))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
