use crate::error::{ApiError, ApiResult};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::entities::user::SkillList;
use model::entities::{application, company, job};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for publishing a job
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateJobRequest {
    /// Publishing company (must exist)
    pub company_id: i32,
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateJobRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub remote: Option<bool>,
    pub skills: Option<Vec<String>>,
}

/// Query parameters for listing jobs
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct JobQuery {
    /// Only jobs published by this company
    pub company_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JobResponse {
    pub id: i32,
    pub company_id: i32,
    pub title: String,
    pub description: String,
    pub location: String,
    pub remote: bool,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<job::Model> for JobResponse {
    fn from(model: job::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            title: model.title,
            description: model.description,
            location: model.location,
            remote: model.remote,
            skills: model.skills.0,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

async fn find_job(state: &AppState, job_id: i32) -> ApiResult<job::Model> {
    match job::Entity::find_by_id(job_id).one(&state.db).await? {
        Some(found) => Ok(found),
        None => {
            warn!("Job with ID {} not found", job_id);
            Err(ApiError::not_found(format!("Job with id {} not found", job_id)))
        }
    }
}

/// Publish a job posting
#[utoipa::path(
    post,
    path = "/api/jobs",
    tag = "jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job created successfully", body = ApiResponse<JobResponse>),
        (status = 400, description = "Invalid request or unknown company", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_job(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateJobRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<JobResponse>>)> {
    trace!("Entering create_job function");

    // Validate that the publishing company exists
    let publisher = company::Entity::find_by_id(request.company_id)
        .one(&state.db)
        .await?;
    if publisher.is_none() {
        warn!("Company with ID {} not found for job creation", request.company_id);
        return Err(ApiError::bad_request(
            "INVALID_COMPANY_ID",
            format!("Company with id {} does not exist", request.company_id),
        ));
    }

    let now = Utc::now();
    let new_job = job::ActiveModel {
        company_id: Set(request.company_id),
        title: Set(request.title),
        description: Set(request.description),
        location: Set(request.location),
        remote: Set(request.remote),
        skills: Set(SkillList(request.skills)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = new_job.insert(&state.db).await?;
    info!(
        "Job created successfully with ID: {} for company {}",
        created.id, created.company_id
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: JobResponse::from(created),
            message: "Job created successfully".to_string(),
            success: true,
        }),
    ))
}

/// List job postings
#[utoipa::path(
    get,
    path = "/api/jobs",
    tag = "jobs",
    params(JobQuery),
    responses(
        (status = 200, description = "Jobs retrieved successfully", body = ApiResponse<Vec<JobResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> ApiResult<Json<ApiResponse<Vec<JobResponse>>>> {
    let mut select = job::Entity::find();
    if let Some(company_id) = query.company_id {
        debug!("Filtering jobs by company_id: {}", company_id);
        select = select.filter(job::Column::CompanyId.eq(company_id));
    }

    let jobs = select.order_by_asc(job::Column::Id).all(&state.db).await?;
    debug!("Retrieved {} jobs from database", jobs.len());

    Ok(Json(ApiResponse {
        data: jobs.into_iter().map(JobResponse::from).collect(),
        message: "Jobs retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get a job posting by ID
#[utoipa::path(
    get,
    path = "/api/jobs/{job_id}",
    tag = "jobs",
    params(
        ("job_id" = i32, Path, description = "Job ID"),
    ),
    responses(
        (status = 200, description = "Job retrieved successfully", body = ApiResponse<JobResponse>),
        (status = 404, description = "Job not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_job(
    Path(job_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<JobResponse>>> {
    let found = find_job(&state, job_id).await?;

    Ok(Json(ApiResponse {
        data: JobResponse::from(found),
        message: "Job retrieved successfully".to_string(),
        success: true,
    }))
}

/// Update a job posting
#[utoipa::path(
    put,
    path = "/api/jobs/{job_id}",
    tag = "jobs",
    params(
        ("job_id" = i32, Path, description = "Job ID"),
    ),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Job updated successfully", body = ApiResponse<JobResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Job not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_job(
    Path(job_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateJobRequest>>,
) -> ApiResult<Json<ApiResponse<JobResponse>>> {
    let existing = find_job(&state, job_id).await?;

    let mut active: job::ActiveModel = existing.into();
    let mut updated_fields = Vec::new();

    if let Some(title) = request.title {
        active.title = Set(title);
        updated_fields.push("title");
    }
    if let Some(description) = request.description {
        active.description = Set(description);
        updated_fields.push("description");
    }
    if let Some(location) = request.location {
        active.location = Set(location);
        updated_fields.push("location");
    }
    if let Some(remote) = request.remote {
        active.remote = Set(remote);
        updated_fields.push("remote");
    }
    if let Some(skills) = request.skills {
        active.skills = Set(SkillList(skills));
        updated_fields.push("skills");
    }

    if updated_fields.is_empty() {
        debug!("No fields to update for job ID: {}", job_id);
    } else {
        debug!("Updating fields: {}", updated_fields.join(", "));
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await?;
    info!("Job with ID {} updated successfully", job_id);

    Ok(Json(ApiResponse {
        data: JobResponse::from(updated),
        message: "Job updated successfully".to_string(),
        success: true,
    }))
}

/// Delete a job posting together with its applications
#[utoipa::path(
    delete,
    path = "/api/jobs/{job_id}",
    tag = "jobs",
    params(
        ("job_id" = i32, Path, description = "Job ID"),
    ),
    responses(
        (status = 200, description = "Job deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Job not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_job(
    Path(job_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<String>>> {
    let existing = find_job(&state, job_id).await?;

    let txn = state.db.begin().await?;
    let removed = application::Entity::delete_many()
        .filter(application::Column::JobId.eq(job_id))
        .exec(&txn)
        .await?;
    debug!(
        "Removed {} applications of job {}",
        removed.rows_affected, job_id
    );

    let deleted = existing.delete(&txn).await?;
    if deleted.rows_affected == 0 {
        error!("Job with ID {} vanished during delete", job_id);
        return Err(ApiError::not_found(format!("Job with id {} not found", job_id)));
    }
    txn.commit().await?;
    info!("Job with ID {} deleted successfully", job_id);

    Ok(Json(ApiResponse {
        data: format!("Job {} deleted", job_id),
        message: "Job deleted successfully".to_string(),
        success: true,
    }))
}
