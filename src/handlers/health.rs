use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{error::BootError, router::AppState};

/// Liveness plus a store round trip; 503 when the database is gone.
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<Value>, BootError> {
    state.storage.ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}
