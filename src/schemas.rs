use accounts::CredentialStore;
use model::entities::user::{EducationEntry, ExperienceEntry, LookingFor};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::handlers::applications::{
    ApplicationQuery, ApplicationResponse, CreateApplicationRequest, UpdateApplicationRequest,
};
use crate::handlers::companies::{CompanyResponse, CreateCompanyRequest, UpdateCompanyRequest};
use crate::handlers::connections::{
    ConnectionRequestResponse, ConnectionRequestsQuery, RespondConnectionRequest,
    SendConnectionRequest,
};
use crate::handlers::jobs::{CreateJobRequest, JobQuery, JobResponse, UpdateJobRequest};
use crate::handlers::users::{
    CreateUserRequest, PreferencesPayload, PreferencesResponse, PreferencesUpdate, UpdateUserRequest,
    UserResponse,
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection, opened once at startup
    pub db: DatabaseConnection,
    /// Hashing and verification of account passwords
    pub credentials: Arc<CredentialStore>,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Credentials submitted to a login endpoint
#[derive(Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::login_user,
        crate::handlers::companies::create_company,
        crate::handlers::companies::get_companies,
        crate::handlers::companies::get_company,
        crate::handlers::companies::update_company,
        crate::handlers::companies::login_company,
        crate::handlers::companies::get_company_jobs,
        crate::handlers::jobs::create_job,
        crate::handlers::jobs::get_jobs,
        crate::handlers::jobs::get_job,
        crate::handlers::jobs::update_job,
        crate::handlers::jobs::delete_job,
        crate::handlers::connections::send_connection_request,
        crate::handlers::connections::respond_to_connection_request,
        crate::handlers::connections::get_connections,
        crate::handlers::connections::get_connection_requests,
        crate::handlers::applications::create_application,
        crate::handlers::applications::get_applications,
        crate::handlers::applications::get_application,
        crate::handlers::applications::update_application,
    ),
    components(
        schemas(
            ApiResponse<UserResponse>,
            ApiResponse<Vec<UserResponse>>,
            ApiResponse<CompanyResponse>,
            ApiResponse<Vec<CompanyResponse>>,
            ApiResponse<JobResponse>,
            ApiResponse<Vec<JobResponse>>,
            ApiResponse<ConnectionRequestResponse>,
            ApiResponse<Vec<ConnectionRequestResponse>>,
            ApiResponse<ApplicationResponse>,
            ApiResponse<Vec<ApplicationResponse>>,
            ErrorResponse,
            HealthResponse,
            LoginRequest,
            CreateUserRequest,
            UpdateUserRequest,
            PreferencesPayload,
            PreferencesUpdate,
            PreferencesResponse,
            UserResponse,
            ExperienceEntry,
            EducationEntry,
            LookingFor,
            CreateCompanyRequest,
            UpdateCompanyRequest,
            CompanyResponse,
            CreateJobRequest,
            UpdateJobRequest,
            JobQuery,
            JobResponse,
            SendConnectionRequest,
            RespondConnectionRequest,
            ConnectionRequestsQuery,
            ConnectionRequestResponse,
            CreateApplicationRequest,
            UpdateApplicationRequest,
            ApplicationQuery,
            ApplicationResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Developer accounts"),
        (name = "companies", description = "Company accounts"),
        (name = "jobs", description = "Job postings"),
        (name = "connections", description = "Connection requests between developers"),
        (name = "applications", description = "Job applications"),
    ),
    info(
        title = "DevCollab API",
        description = "Backend for a platform connecting developers and companies",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
