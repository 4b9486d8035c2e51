use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use ticketdesk_core::SanitizedConfig;

use super::middleware::AuthUser;
use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
    pub location: String,
    pub unpersisted: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = state.store().lock().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        backend: store.backend_name().to_string(),
        location: store.backend_location(),
        unpersisted: store.has_unpersisted_changes(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

#[derive(Serialize)]
pub struct WhoAmIResponse {
    pub user_id: String,
    pub method: String,
    pub is_admin: bool,
}

pub async fn whoami(AuthUser(identity): AuthUser) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        is_admin: identity.is_admin(),
        user_id: identity.user_id,
        method: identity.method,
    })
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state).await;
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
