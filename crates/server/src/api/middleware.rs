//! Authentication and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use ticketdesk_core::{AdminGrant, AuthError, AuthRequest, Identity};
use tracing::{debug, warn};

use super::tickets::TicketErrorResponse;
use crate::metrics::{
    normalize_path, AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};
use crate::state::AppState;

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Authentication middleware that resolves the caller's identity.
///
/// Requests without credentials continue as an anonymous, non-admin
/// identity so that anyone can submit tickets. Credentials that are present
/// but wrong get 401 Unauthorized.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let authenticator = state.authenticator();

    // Extract headers into HashMap for AuthRequest
    let headers: HashMap<String, String> = request
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect();

    // Get source IP (default to localhost if not available)
    let source_ip = request
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or_else(|| std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));

    let auth_request = AuthRequest { headers, source_ip };

    let identity = match authenticator.authenticate(&auth_request).await {
        Ok(identity) => identity,
        Err(AuthError::NotAuthenticated) => Identity::anonymous(),
        Err(AuthError::InvalidCredentials(reason)) => {
            warn!("Rejected credentials from {}: {}", source_ip, reason);
            AUTH_FAILURES_TOTAL
                .with_label_values(&["invalid_credentials"])
                .inc();
            return Err(StatusCode::UNAUTHORIZED);
        }
        Err(e) => {
            // Other auth errors (service unavailable, config error)
            warn!("Authentication error: {}", e);
            AUTH_FAILURES_TOTAL
                .with_label_values(&["internal_error"])
                .inc();
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut request = request;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Extractor for the caller's identity.
///
/// Falls back to an anonymous identity if none is present (shouldn't happen
/// if auth middleware is properly configured).
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let identity = parts
            .extensions
            .get::<Identity>()
            .cloned()
            .unwrap_or_else(Identity::anonymous);
        std::future::ready(Ok(AuthUser(identity)))
    }
}

/// Extractor for the admin capability.
///
/// Rejects with 403 Forbidden unless the caller authenticated as an
/// administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AdminGrant);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<TicketErrorResponse>);

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = match parts.extensions.get::<Identity>() {
            Some(identity) => identity.admin_grant().map(AdminUser).map_err(|e| {
                debug!("{} denied admin access: {}", identity.user_id, e);
                AUTH_FAILURES_TOTAL.with_label_values(&["forbidden"]).inc();
                (
                    StatusCode::FORBIDDEN,
                    Json(TicketErrorResponse::new("Administrator access required")),
                )
            }),
            None => Err((
                StatusCode::FORBIDDEN,
                Json(TicketErrorResponse::new("Administrator access required")),
            )),
        };
        std::future::ready(result)
    }
}
