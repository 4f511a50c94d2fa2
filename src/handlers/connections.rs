use crate::error::{ApiError, ApiResult};
use crate::handlers::users::UserResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use accounts::connection::{self, Decision};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::connection_request::{self, ConnectionStatus};
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SendConnectionRequest {
    pub from_user_id: i32,
    pub to_user_id: i32,
}

/// The target's answer to a pending request
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RespondConnectionRequest {
    /// Must be the developer the request is addressed to
    pub responder_id: i32,
    /// `accepted` or `rejected`
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ConnectionRequestsQuery {
    /// Only requests in this state (`pending`, `accepted`, `rejected`)
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConnectionRequestResponse {
    pub id: i32,
    /// Target of the request
    pub user_id: i32,
    pub from_user_id: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<connection_request::Model> for ConnectionRequestResponse {
    fn from(model: connection_request::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            from_user_id: model.from_user_id,
            status: model.status.to_value(),
            created_at: model.created_at,
        }
    }
}

fn invalid_status(value: &str, valid: &str) -> ApiError {
    ApiError::bad_request(
        "INVALID_STATUS",
        format!("Invalid status '{}'. Valid values: {}", value, valid),
    )
}

fn parse_decision(status: &str) -> ApiResult<Decision> {
    match status {
        "accepted" => Ok(Decision::Accept),
        "rejected" => Ok(Decision::Reject),
        other => Err(invalid_status(other, "accepted, rejected")),
    }
}

fn parse_connection_status(status: &str) -> ApiResult<ConnectionStatus> {
    match status {
        "pending" => Ok(ConnectionStatus::Pending),
        "accepted" => Ok(ConnectionStatus::Accepted),
        "rejected" => Ok(ConnectionStatus::Rejected),
        other => Err(invalid_status(other, "pending, accepted, rejected")),
    }
}

/// Send a connection request to another developer
#[utoipa::path(
    post,
    path = "/api/connections/requests",
    tag = "connections",
    request_body = SendConnectionRequest,
    responses(
        (status = 201, description = "Connection request sent", body = ApiResponse<ConnectionRequestResponse>),
        (status = 400, description = "Request to self", body = ErrorResponse),
        (status = 404, description = "Developer not found", body = ErrorResponse),
        (status = 409, description = "Already connected or request pending", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn send_connection_request(
    State(state): State<AppState>,
    Json(request): Json<SendConnectionRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ConnectionRequestResponse>>)> {
    let created =
        connection::send_request(&state.db, request.from_user_id, request.to_user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: ConnectionRequestResponse::from(created),
            message: "Connection request sent".to_string(),
            success: true,
        }),
    ))
}

/// Accept or reject a pending connection request
#[utoipa::path(
    put,
    path = "/api/connections/requests/{request_id}",
    tag = "connections",
    params(
        ("request_id" = i32, Path, description = "Connection request ID"),
    ),
    request_body = RespondConnectionRequest,
    responses(
        (status = 200, description = "Connection request resolved", body = ApiResponse<ConnectionRequestResponse>),
        (status = 400, description = "Invalid status", body = ErrorResponse),
        (status = 403, description = "Responder is not the target", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 409, description = "Request already resolved", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn respond_to_connection_request(
    Path(request_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<RespondConnectionRequest>,
) -> ApiResult<Json<ApiResponse<ConnectionRequestResponse>>> {
    let decision = parse_decision(&request.status)?;
    let resolved =
        connection::respond(&state.db, request_id, request.responder_id, decision).await?;
    info!(
        "Connection request {} is now {}",
        resolved.id,
        resolved.status.to_value()
    );

    Ok(Json(ApiResponse {
        data: ConnectionRequestResponse::from(resolved),
        message: "Connection request updated".to_string(),
        success: true,
    }))
}

/// List the developers a developer is connected with
#[utoipa::path(
    get,
    path = "/api/connections/{user_id}",
    tag = "connections",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Connections retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_connections(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let connected = connection::connections_of(&state.db, user_id).await?;
    debug!("User {} has {} connections", user_id, connected.len());

    Ok(Json(ApiResponse {
        data: connected.into_iter().map(UserResponse::from).collect(),
        message: "Connections retrieved successfully".to_string(),
        success: true,
    }))
}

/// List connection requests addressed to a developer
#[utoipa::path(
    get,
    path = "/api/connections/{user_id}/requests",
    tag = "connections",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        ConnectionRequestsQuery
    ),
    responses(
        (status = 200, description = "Connection requests retrieved successfully", body = ApiResponse<Vec<ConnectionRequestResponse>>),
        (status = 400, description = "Invalid status filter", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_connection_requests(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Query(query): Query<ConnectionRequestsQuery>,
) -> ApiResult<Json<ApiResponse<Vec<ConnectionRequestResponse>>>> {
    let status = query
        .status
        .as_deref()
        .map(parse_connection_status)
        .transpose()?;

    let requests = connection::requests_for(&state.db, user_id, status).await?;
    debug!("User {} has {} matching requests", user_id, requests.len());

    Ok(Json(ApiResponse {
        data: requests
            .into_iter()
            .map(ConnectionRequestResponse::from)
            .collect(),
        message: "Connection requests retrieved successfully".to_string(),
        success: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_is_not_a_decision() {
        assert_eq!(parse_decision("accepted").unwrap(), Decision::Accept);
        assert_eq!(parse_decision("rejected").unwrap(), Decision::Reject);
        assert_eq!(parse_decision("pending").unwrap_err().code, "INVALID_STATUS");
        assert_eq!(parse_decision("ACCEPTED").unwrap_err().code, "INVALID_STATUS");
    }

    #[test]
    fn test_parse_connection_status_filter() {
        assert_eq!(
            parse_connection_status("pending").unwrap(),
            ConnectionStatus::Pending
        );
        assert_eq!(parse_connection_status("maybe").unwrap_err().code, "INVALID_STATUS");
    }
}
