use crate::error::{ApiError, ApiResult};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::entities::application::{self, ApplicationStatus};
use model::entities::{job, user};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

const DEFAULT_PER_PAGE: u64 = 20;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateApplicationRequest {
    pub job_id: i32,
    /// Applying developer
    pub user_id: i32,
    #[serde(default)]
    pub cover_letter: String,
}

/// A company's decision on an application
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateApplicationRequest {
    /// `accepted` or `rejected`
    pub status: String,
}

/// Query parameters for listing applications
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct ApplicationQuery {
    /// Only applications to this job
    pub job_id: Option<i32>,
    /// Only applications by this developer
    pub user_id: Option<i32>,
    /// Page number, starting at 1
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    /// Page size (default 20)
    #[validate(range(min = 1, max = 100))]
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApplicationResponse {
    pub id: i32,
    pub job_id: i32,
    pub user_id: i32,
    pub cover_letter: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<application::Model> for ApplicationResponse {
    fn from(model: application::Model) -> Self {
        Self {
            id: model.id,
            job_id: model.job_id,
            user_id: model.user_id,
            cover_letter: model.cover_letter,
            status: model.status.to_value(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Helper function to parse the outcome of a review
fn parse_review_status(status: &str) -> ApiResult<ApplicationStatus> {
    match status {
        "accepted" => Ok(ApplicationStatus::Accepted),
        "rejected" => Ok(ApplicationStatus::Rejected),
        other => Err(ApiError::bad_request(
            "INVALID_STATUS",
            format!("Invalid status '{}'. Valid values: accepted, rejected", other),
        )),
    }
}

async fn find_application(state: &AppState, application_id: i32) -> ApiResult<application::Model> {
    application::Entity::find_by_id(application_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("Application with ID {} not found", application_id);
            ApiError::not_found(format!("Application with id {} not found", application_id))
        })
}

/// Move a pending application to `next`. The pending check is part of the
/// UPDATE, so a review based on a stale read cannot overwrite a decision.
async fn resolve_pending(
    state: &AppState,
    application_id: i32,
    next: ApplicationStatus,
) -> ApiResult<application::Model> {
    let result = application::Entity::update_many()
        .col_expr(application::Column::Status, Expr::value(next.to_value()))
        .col_expr(application::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(application::Column::Id.eq(application_id))
        .filter(application::Column::Status.eq(ApplicationStatus::Pending))
        .exec(&state.db)
        .await?;

    let current = find_application(state, application_id).await?;
    if result.rows_affected == 0 {
        let status = current.status.to_value();
        warn!("Application {} is already {}", application_id, status);
        return Err(ApiError::conflict(
            "APPLICATION_ALREADY_RESOLVED",
            format!("Application {} is already {}", application_id, status),
        ));
    }
    Ok(current)
}

/// Apply to a job posting
#[utoipa::path(
    post,
    path = "/api/applications",
    tag = "applications",
    request_body = CreateApplicationRequest,
    responses(
        (status = 201, description = "Application submitted", body = ApiResponse<ApplicationResponse>),
        (status = 400, description = "Unknown job or developer", body = ErrorResponse),
        (status = 409, description = "Developer already applied to this job", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(job_id = request.job_id, user_id = request.user_id))]
pub async fn create_application(
    State(state): State<AppState>,
    Json(request): Json<CreateApplicationRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ApplicationResponse>>)> {
    trace!("Entering create_application function");

    if job::Entity::find_by_id(request.job_id)
        .one(&state.db)
        .await?
        .is_none()
    {
        warn!("Job with ID {} not found for application", request.job_id);
        return Err(ApiError::bad_request(
            "INVALID_JOB_ID",
            format!("Job with id {} does not exist", request.job_id),
        ));
    }
    if user::Entity::find_by_id(request.user_id)
        .one(&state.db)
        .await?
        .is_none()
    {
        warn!("User with ID {} not found for application", request.user_id);
        return Err(ApiError::bad_request(
            "INVALID_USER_ID",
            format!("User with id {} does not exist", request.user_id),
        ));
    }

    let now = Utc::now();
    let new_application = application::ActiveModel {
        job_id: Set(request.job_id),
        user_id: Set(request.user_id),
        cover_letter: Set(request.cover_letter),
        status: Set(ApplicationStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = match new_application.insert(&state.db).await {
        Ok(created) => created,
        Err(db_error) => {
            if let Some(SqlErr::UniqueConstraintViolation(_)) = db_error.sql_err() {
                warn!(
                    "User {} already applied to job {}",
                    request.user_id, request.job_id
                );
                return Err(ApiError::conflict(
                    "ALREADY_APPLIED",
                    format!(
                        "User {} already applied to job {}",
                        request.user_id, request.job_id
                    ),
                ));
            }
            return Err(db_error.into());
        }
    };
    info!("Application created successfully with ID: {}", created.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: ApplicationResponse::from(created),
            message: "Application submitted successfully".to_string(),
            success: true,
        }),
    ))
}

/// List applications
#[utoipa::path(
    get,
    path = "/api/applications",
    tag = "applications",
    params(ApplicationQuery),
    responses(
        (status = 200, description = "Applications retrieved successfully", body = ApiResponse<Vec<ApplicationResponse>>),
        (status = 400, description = "Invalid paging parameters"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_applications(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ApplicationQuery>>,
) -> ApiResult<Json<ApiResponse<Vec<ApplicationResponse>>>> {
    let mut select = application::Entity::find();
    if let Some(job_id) = query.job_id {
        select = select.filter(application::Column::JobId.eq(job_id));
    }
    if let Some(user_id) = query.user_id {
        select = select.filter(application::Column::UserId.eq(user_id));
    }

    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE);
    debug!("Fetching applications page {} (size {})", page, per_page);

    let applications = select
        .order_by_asc(application::Column::Id)
        .paginate(&state.db, per_page)
        .fetch_page(page - 1)
        .await?;

    Ok(Json(ApiResponse {
        data: applications
            .into_iter()
            .map(ApplicationResponse::from)
            .collect(),
        message: "Applications retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get an application by ID
#[utoipa::path(
    get,
    path = "/api/applications/{application_id}",
    tag = "applications",
    params(
        ("application_id" = i32, Path, description = "Application ID"),
    ),
    responses(
        (status = 200, description = "Application retrieved successfully", body = ApiResponse<ApplicationResponse>),
        (status = 404, description = "Application not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_application(
    Path(application_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<ApplicationResponse>>> {
    let found = find_application(&state, application_id).await?;

    Ok(Json(ApiResponse {
        data: ApplicationResponse::from(found),
        message: "Application retrieved successfully".to_string(),
        success: true,
    }))
}

/// Accept or reject a pending application
#[utoipa::path(
    put,
    path = "/api/applications/{application_id}",
    tag = "applications",
    params(
        ("application_id" = i32, Path, description = "Application ID"),
    ),
    request_body = UpdateApplicationRequest,
    responses(
        (status = 200, description = "Application updated successfully", body = ApiResponse<ApplicationResponse>),
        (status = 400, description = "Invalid status", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse),
        (status = 409, description = "Application already reviewed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_application(
    Path(application_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateApplicationRequest>,
) -> ApiResult<Json<ApiResponse<ApplicationResponse>>> {
    let next = parse_review_status(&request.status)?;
    let updated = resolve_pending(&state, application_id, next).await?;
    info!(
        "Application {} is now {}",
        application_id,
        updated.status.to_value()
    );

    Ok(Json(ApiResponse {
        data: ApplicationResponse::from(updated),
        message: "Application updated successfully".to_string(),
        success: true,
    }))
}
