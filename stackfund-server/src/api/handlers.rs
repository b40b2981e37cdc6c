//! Request handlers.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::{debug, warn};

use super::dto::{
    new_link_from_body, CreatedResponse, HealthResponse, LinkLookup, LinkQuery, ListResponse,
};
use super::error::ApiError;
use super::AppState;

/// `POST /payment-links`
pub async fn create_payment_link(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreatedResponse>, ApiError> {
    let body = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => return Err(ApiError::InvalidBody),
    };

    let input = new_link_from_body(&body);
    let created = state
        .service
        .create(input)
        .await
        .map_err(ApiError::from_create)?;

    Ok(Json(created.into()))
}

/// `GET /payment-links?id=...` or `GET /payment-links?creatorAddress=...`
pub async fn get_payment_links(
    State(state): State<AppState>,
    Query(query): Query<LinkQuery>,
) -> Result<Response, ApiError> {
    match query.lookup() {
        Some(LinkLookup::ById(id)) => {
            let link = state
                .service
                .get_by_id(&id)
                .await
                .map_err(ApiError::from_fetch)?;
            Ok(Json(link).into_response())
        }
        Some(LinkLookup::ByCreator(address)) => {
            let links = state
                .service
                .list_by_creator(&address)
                .await
                .map_err(ApiError::from_fetch)?;
            Ok(Json(ListResponse::from(links)).into_response())
        }
        None => {
            debug!("payment link query without id or creatorAddress");
            Err(ApiError::MissingParameters)
        }
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Response {
    match state.service.health().await {
        Ok(()) => Json(HealthResponse {
            status: "healthy".to_string(),
            error: None,
        })
        .into_response(),
        Err(e) => {
            warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                    error: Some("storage unavailable".to_string()),
                }),
            )
                .into_response()
        }
    }
}
