use crate::error::{ApiError, ApiResult};
use crate::handlers::jobs::JobResponse;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, LoginRequest};
use accounts::company::{self, CompanyChanges, NewCompany};
use accounts::store::authenticate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::entities::company::{self as company_entity, CompanySize};
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for registering a company
#[derive(Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(email(message = "Email address is not valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub website: String,
    /// One of `1-10` (default), `11-50`, `51-200`, `201-500`, `501-1000`, `1000+`
    pub size: Option<String>,
    pub founded: Option<i32>,
}

/// Request body for updating a company. Absent fields are left untouched.
#[derive(Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Email address is not valid"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: Option<String>,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub size: Option<String>,
    pub founded: Option<i32>,
}

/// Company account as returned by the API. Never carries the password.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompanyResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub logo: String,
    pub description: String,
    pub industry: String,
    pub location: String,
    pub website: String,
    pub size: String,
    pub founded: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<company_entity::Model> for CompanyResponse {
    fn from(model: company_entity::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            logo: model.logo,
            description: model.description,
            industry: model.industry,
            location: model.location,
            website: model.website,
            size: model.size.to_value(),
            founded: model.founded,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Helper function to parse a company size bucket
fn parse_company_size(size: &str) -> ApiResult<CompanySize> {
    match size {
        "1-10" => Ok(CompanySize::UpToTen),
        "11-50" => Ok(CompanySize::UpToFifty),
        "51-200" => Ok(CompanySize::UpToTwoHundred),
        "201-500" => Ok(CompanySize::UpToFiveHundred),
        "501-1000" => Ok(CompanySize::UpToThousand),
        "1000+" => Ok(CompanySize::OverThousand),
        other => Err(ApiError::bad_request(
            "INVALID_COMPANY_SIZE",
            format!(
                "Invalid company size '{}'. Valid values: 1-10, 11-50, 51-200, 201-500, 501-1000, 1000+",
                other
            ),
        )),
    }
}

/// Register a company account
#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created successfully", body = ApiResponse<CompanyResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(email = %request.email))]
pub async fn create_company(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateCompanyRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CompanyResponse>>)> {
    trace!("Entering create_company function");

    let size = match request.size.as_deref() {
        Some(size) => parse_company_size(size).map_err(|e| {
            warn!("Rejecting company registration: {}", e.message);
            e
        })?,
        None => CompanySize::default(),
    };

    let new = NewCompany {
        name: request.name,
        email: request.email,
        password: request.password,
        logo: request.logo,
        description: request.description,
        industry: request.industry,
        location: request.location,
        website: request.website,
        size,
        founded: request.founded,
    };

    let created = company::create(&state.db, &state.credentials, new).await?;
    info!("Company created successfully with ID: {}", created.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: CompanyResponse::from(created),
            message: "Company created successfully".to_string(),
            success: true,
        }),
    ))
}

/// List all company accounts
#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "companies",
    responses(
        (status = 200, description = "Companies retrieved successfully", body = ApiResponse<Vec<CompanyResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_companies(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<CompanyResponse>>>> {
    let companies = company::list(&state.db).await?;
    debug!("Retrieved {} companies from database", companies.len());

    Ok(Json(ApiResponse {
        data: companies.into_iter().map(CompanyResponse::from).collect(),
        message: "Companies retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get a company account by ID
#[utoipa::path(
    get,
    path = "/api/companies/{company_id}",
    tag = "companies",
    params(
        ("company_id" = i32, Path, description = "Company ID"),
    ),
    responses(
        (status = 200, description = "Company retrieved successfully", body = ApiResponse<CompanyResponse>),
        (status = 404, description = "Company not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_company(
    Path(company_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<CompanyResponse>>> {
    let found = company::find_by_id(&state.db, company_id).await?;

    Ok(Json(ApiResponse {
        data: CompanyResponse::from(found),
        message: "Company retrieved successfully".to_string(),
        success: true,
    }))
}

/// Update a company account
#[utoipa::path(
    put,
    path = "/api/companies/{company_id}",
    tag = "companies",
    params(
        ("company_id" = i32, Path, description = "Company ID"),
    ),
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Company updated successfully", body = ApiResponse<CompanyResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Company not found", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(company_id = %company_id))]
pub async fn update_company(
    Path(company_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateCompanyRequest>>,
) -> ApiResult<Json<ApiResponse<CompanyResponse>>> {
    let size = request.size.as_deref().map(parse_company_size).transpose()?;

    let changes = CompanyChanges {
        name: request.name,
        email: request.email,
        password: request.password,
        logo: request.logo,
        description: request.description,
        industry: request.industry,
        location: request.location,
        website: request.website,
        size,
        founded: request.founded,
    };

    let updated = company::update(&state.db, &state.credentials, company_id, changes).await?;
    info!("Company with ID {} updated successfully", company_id);

    Ok(Json(ApiResponse {
        data: CompanyResponse::from(updated),
        message: "Company updated successfully".to_string(),
        success: true,
    }))
}

/// Authenticate a company by email and password
#[utoipa::path(
    post,
    path = "/api/companies/login",
    tag = "companies",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<CompanyResponse>),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(email = %request.email))]
pub async fn login_company(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<CompanyResponse>>> {
    let account = authenticate::<company_entity::Entity, _>(
        &state.db,
        &state.credentials,
        &request.email,
        &request.password,
    )
    .await?;
    info!("Company {} logged in", account.id);

    Ok(Json(ApiResponse {
        data: CompanyResponse::from(account),
        message: "Login successful".to_string(),
        success: true,
    }))
}

/// List the job postings of a company
#[utoipa::path(
    get,
    path = "/api/companies/{company_id}/jobs",
    tag = "companies",
    params(
        ("company_id" = i32, Path, description = "Company ID"),
    ),
    responses(
        (status = 200, description = "Jobs retrieved successfully", body = ApiResponse<Vec<JobResponse>>),
        (status = 404, description = "Company not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_company_jobs(
    Path(company_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<JobResponse>>>> {
    let jobs = company::jobs_of(&state.db, company_id).await?;
    debug!("Company {} has {} jobs", company_id, jobs.len());

    Ok(Json(ApiResponse {
        data: jobs.into_iter().map(JobResponse::from).collect(),
        message: "Jobs retrieved successfully".to_string(),
        success: true,
    }))
}
