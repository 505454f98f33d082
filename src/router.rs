use axum::{Router, routing::get};

use crate::db::AccountsStorage;
use crate::handlers::health::health_handler;

#[derive(Clone)]
pub struct AppState {
    pub storage: AccountsStorage,
}

impl AppState {
    pub fn new(storage: AccountsStorage) -> Self {
        Self { storage }
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}
