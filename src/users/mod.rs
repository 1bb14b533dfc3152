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
        .route("/users/register", post(handlers::register))
        .route("/users/login", post(handlers::login))
        .route("/users", get(handlers::me).put(handlers::update_me))
}
