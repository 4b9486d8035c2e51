//! Ticket statistics handler.

use axum::{extract::State, Json};
use std::sync::Arc;
use ticketdesk_core::TicketStats;

use crate::state::AppState;

/// Status distribution, priority breakdown and open count
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<TicketStats> {
    let store = state.store().lock().await;
    Json(TicketStats::from_table(store.table()))
}
