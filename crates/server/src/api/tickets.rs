//! Ticket API handlers.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ticketdesk_core::{
    ticket::{serialize_table, Department, Priority, ReviewedPriority, DATE_FORMAT},
    PersistError, TicketError, TicketPatch, TicketRecord, TicketStatus, TicketSubmission,
    TicketTable, UpdateOutcome,
};
use tracing::{info, warn};

use super::middleware::{AdminUser, AuthUser};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// A ticket as exchanged over the API.
///
/// Also the row type of a bulk replace, where `id` and `date_submitted`
/// must match the stored row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketResource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub business_case: String,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub reviewed_priority: ReviewedPriority,
    #[serde(default)]
    pub roi_hours_saved: u32,
    #[serde(default)]
    pub roi_money_saved: f64,
    #[serde(default)]
    pub department: Department,
    /// `MM-DD-YYYY`
    pub date_submitted: String,
}

impl From<&TicketRecord> for TicketResource {
    fn from(record: &TicketRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            business_case: record.business_case.clone(),
            status: record.status,
            priority: record.priority,
            reviewed_priority: record.reviewed_priority,
            roi_hours_saved: record.roi_hours_saved,
            roi_money_saved: record.roi_money_saved,
            department: record.department,
            date_submitted: record.date_label(),
        }
    }
}

impl TryFrom<TicketResource> for TicketRecord {
    type Error = TicketError;

    fn try_from(resource: TicketResource) -> Result<Self, Self::Error> {
        let date_submitted = NaiveDate::parse_from_str(&resource.date_submitted, DATE_FORMAT)
            .map_err(|_| TicketError::InvalidValue {
                field: "date_submitted",
                value: resource.date_submitted.clone(),
            })?;
        if !resource.roi_money_saved.is_finite() || resource.roi_money_saved < 0.0 {
            return Err(TicketError::InvalidValue {
                field: "roi_money_saved",
                value: resource.roi_money_saved.to_string(),
            });
        }

        Ok(TicketRecord {
            id: resource.id,
            name: resource.name,
            title: resource.title,
            description: resource.description,
            business_case: resource.business_case,
            status: resource.status,
            priority: resource.priority,
            reviewed_priority: resource.reviewed_priority,
            roi_hours_saved: resource.roi_hours_saved,
            roi_money_saved: resource.roi_money_saved,
            department: resource.department,
            date_submitted,
        })
    }
}

/// Query parameters for listing tickets
#[derive(Debug, Deserialize)]
pub struct ListTicketsParams {
    /// `newest` orders by submission date descending; default is stored order.
    pub sort: Option<String>,
}

/// Response for listing tickets
#[derive(Debug, Serialize)]
pub struct ListTicketsResponse {
    pub tickets: Vec<TicketResource>,
    pub total: usize,
    /// The session holds changes the backend has not accepted.
    pub unpersisted: bool,
}

/// Request body for a bulk replace
#[derive(Debug, Deserialize)]
pub struct ReplaceTicketsBody {
    pub tickets: Vec<TicketResource>,
}

/// Response for a bulk replace
#[derive(Debug, Serialize)]
pub struct ReplaceTicketsResponse {
    pub changed: bool,
}

/// Response for an explicit persist
#[derive(Debug, Serialize)]
pub struct PersistResponse {
    pub content_id: String,
    pub total: usize,
}

/// Response for a reload
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub total: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct TicketErrorResponse {
    pub error: String,
    /// Field the error refers to, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// The change is held in memory but the backend did not accept it.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub saved_locally: bool,
    /// The ticket kept in memory after a failed persist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<TicketResource>,
}

impl TicketErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field: None,
            saved_locally: false,
            ticket: None,
        }
    }
}

type ApiError = (StatusCode, Json<TicketErrorResponse>);

/// Map a ticket error to a response.
///
/// `saved_locally` is reported only for mutations; a failed read leaves
/// nothing pending.
fn error_response(e: TicketError, mutation: bool) -> ApiError {
    let (status, field) = match &e {
        TicketError::MissingField(field) => (StatusCode::UNPROCESSABLE_ENTITY, Some(*field)),
        TicketError::ImmutableField { field, .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, Some(*field))
        }
        TicketError::InvalidValue { field, .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, Some(*field))
        }
        TicketError::NotFound(_) => (StatusCode::NOT_FOUND, None),
        TicketError::CorruptData(_) | TicketError::Encode(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, None)
        }
        TicketError::Persist(PersistError::Conflict(_)) => (StatusCode::CONFLICT, None),
        TicketError::Persist(_) => (StatusCode::SERVICE_UNAVAILABLE, None),
    };

    let saved_locally = mutation && e.is_saved_locally();
    let error = match e {
        TicketError::Persist(inner) if !saved_locally => inner.to_string(),
        other => other.to_string(),
    };

    (
        status,
        Json(TicketErrorResponse {
            error,
            field: field.map(str::to_string),
            saved_locally,
            ticket: None,
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Submit a new ticket
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(body): Json<TicketSubmission>,
) -> Result<(StatusCode, Json<TicketResource>), ApiError> {
    let mut store = state.store().lock().await;

    match store.append(&body).await {
        Ok(record) => {
            info!("{} submitted ticket {}", identity.user_id, record.id);
            Ok((StatusCode::CREATED, Json(TicketResource::from(&record))))
        }
        Err(e) if e.is_saved_locally() => {
            warn!("Ticket kept in memory only: {}", e);
            let ticket = store.table().records().last().map(TicketResource::from);
            let (status, Json(mut body)) = error_response(e, true);
            body.ticket = ticket;
            Err((status, Json(body)))
        }
        Err(e) => Err(error_response(e, true)),
    }
}

/// List all tickets
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTicketsParams>,
) -> Result<Json<ListTicketsResponse>, ApiError> {
    let store = state.store().lock().await;
    let table = store.table();

    let tickets: Vec<TicketResource> = match params.sort.as_deref() {
        None | Some("") | Some("stored") => table.iter().map(TicketResource::from).collect(),
        Some("newest") => table
            .sorted_newest_first()
            .into_iter()
            .map(TicketResource::from)
            .collect(),
        Some(other) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(TicketErrorResponse::new(format!(
                    "Unknown sort order: {} (expected \"newest\")",
                    other
                ))),
            ));
        }
    };

    Ok(Json(ListTicketsResponse {
        total: tickets.len(),
        tickets,
        unpersisted: store.has_unpersisted_changes(),
    }))
}

/// Get a ticket by ID
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TicketResource>, ApiError> {
    let store = state.store().lock().await;

    store
        .table()
        .get(&id)
        .map(|record| Json(TicketResource::from(record)))
        .ok_or_else(|| error_response(TicketError::NotFound(id), false))
}

/// Edit one ticket (admin only)
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    AdminUser(grant): AdminUser,
    Path(id): Path<String>,
    Json(patch): Json<TicketPatch>,
) -> Result<Json<TicketResource>, ApiError> {
    let mut store = state.store().lock().await;

    store
        .update_record(&id, &patch, &grant)
        .await
        .map(|record| Json(TicketResource::from(&record)))
        .map_err(|e| error_response(e, true))
}

/// Replace the whole table with an edited copy (admin only)
pub async fn replace_tickets(
    State(state): State<Arc<AppState>>,
    AdminUser(grant): AdminUser,
    Json(body): Json<ReplaceTicketsBody>,
) -> Result<Json<ReplaceTicketsResponse>, ApiError> {
    let records = body
        .tickets
        .into_iter()
        .map(TicketRecord::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| error_response(e, false))?;
    let table = TicketTable::from_records(records).map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(TicketErrorResponse::new(e.to_string())),
        )
    })?;

    let mut store = state.store().lock().await;
    match store.update(table, &grant).await {
        Ok(UpdateOutcome::Unchanged) => Ok(Json(ReplaceTicketsResponse { changed: false })),
        Ok(UpdateOutcome::Saved) => Ok(Json(ReplaceTicketsResponse { changed: true })),
        Err(e) => Err(error_response(e, true)),
    }
}

/// Retry writing the session table to the backend (admin only)
pub async fn persist_tickets(
    State(state): State<Arc<AppState>>,
    AdminUser(grant): AdminUser,
) -> Result<Json<PersistResponse>, ApiError> {
    let mut store = state.store().lock().await;

    let id = store.persist().await.map_err(|e| error_response(e, true))?;
    info!("{} persisted {} tickets", grant.user_id(), store.table().len());

    Ok(Json(PersistResponse {
        content_id: id.to_string(),
        total: store.table().len(),
    }))
}

/// Discard the session table and load the persisted one (admin only)
pub async fn reload_tickets(
    State(state): State<Arc<AppState>>,
    AdminUser(grant): AdminUser,
) -> Result<Json<ReloadResponse>, ApiError> {
    let mut store = state.store().lock().await;

    let total = store
        .reload()
        .await
        .map(|table| table.len())
        .map_err(|e| error_response(e, false))?;
    info!("{} reloaded {} tickets", grant.user_id(), total);

    Ok(Json(ReloadResponse { total }))
}

/// Download the session table as CSV
pub async fn export_tickets(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store().lock().await;

    let bytes = serialize_table(store.table()).map_err(|e| error_response(e, false))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"tickets.csv\"",
            ),
        ],
        bytes,
    ))
}
