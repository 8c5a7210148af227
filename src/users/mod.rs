use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod password;
mod repo;
pub(crate) mod repo_types;
mod service;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
