pub mod dto;
pub mod handlers;
pub mod repo;
pub mod validator;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/expenses",
            post(handlers::create_expense).get(handlers::list_expenses),
        )
        .route(
            "/expenses/:id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
}
