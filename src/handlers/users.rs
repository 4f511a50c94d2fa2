use crate::error::{ApiError, ApiResult};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, LoginRequest};
use accounts::developer::{self, DeveloperChanges, NewDeveloper};
use accounts::store::authenticate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::entities::user::{self, AccountRole, EducationEntry, ExperienceEntry, LookingFor};
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// What the developer is looking for, plus where they want to work.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct PreferencesPayload {
    /// Any of `job`, `hackathon`, `collaboration`
    #[serde(default)]
    pub looking_for: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub remote: bool,
}

/// Request body for registering a developer
#[derive(Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(email(message = "Email address is not valid"))]
    pub email: String,
    /// Plaintext password, hashed before it is stored
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
    /// `developer` or `company`
    pub role: String,
    #[serde(default)]
    pub profile_picture: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub resume_url: String,
    #[serde(default)]
    pub preferences: PreferencesPayload,
}

/// Request body for updating a developer. Absent fields are left untouched.
#[derive(Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Email address is not valid"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: Option<String>,
    pub role: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<Vec<ExperienceEntry>>,
    pub education: Option<Vec<EducationEntry>>,
    pub resume_url: Option<String>,
    pub preferences: Option<PreferencesUpdate>,
}

/// Partial preferences update. Each absent sub-field keeps its stored value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct PreferencesUpdate {
    pub looking_for: Option<Vec<String>>,
    pub location: Option<String>,
    pub remote: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PreferencesResponse {
    pub looking_for: Vec<LookingFor>,
    pub location: String,
    pub remote: bool,
}

/// Developer account as returned by the API. Never carries the password.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub profile_picture: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub resume_url: String,
    pub preferences: PreferencesResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role.to_value(),
            profile_picture: model.profile_picture,
            bio: model.bio,
            skills: model.skills.0,
            experience: model.experience.0,
            education: model.education.0,
            resume_url: model.resume_url,
            preferences: PreferencesResponse {
                looking_for: model.looking_for.0,
                location: model.location,
                remote: model.remote,
            },
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Helper function to parse an account role string
fn parse_role(role: &str) -> ApiResult<AccountRole> {
    match role {
        "developer" => Ok(AccountRole::Developer),
        "company" => Ok(AccountRole::Company),
        other => Err(ApiError::bad_request(
            "INVALID_ROLE",
            format!("Invalid role '{}'. Valid values: developer, company", other),
        )),
    }
}

fn parse_looking_for(values: &[String]) -> ApiResult<Vec<LookingFor>> {
    values
        .iter()
        .map(|value| {
            LookingFor::ALL
                .into_iter()
                .find(|candidate| candidate.as_str() == value.as_str())
                .ok_or_else(|| {
                    let valid: Vec<&str> = LookingFor::ALL.iter().map(LookingFor::as_str).collect();
                    ApiError::bad_request(
                        "INVALID_LOOKING_FOR",
                        format!(
                            "Invalid preference '{}'. Valid values: {}",
                            value,
                            valid.join(", ")
                        ),
                    )
                })
        })
        .collect()
}

/// Register a developer account
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(email = %request.email))]
pub async fn create_user(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateUserRequest>>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    trace!("Entering create_user function");

    let role = parse_role(&request.role)?;
    let looking_for = parse_looking_for(&request.preferences.looking_for)?;

    let new = NewDeveloper {
        name: request.name,
        email: request.email,
        password: request.password,
        role,
        profile_picture: request.profile_picture,
        bio: request.bio,
        skills: request.skills,
        experience: request.experience,
        education: request.education,
        resume_url: request.resume_url,
        looking_for,
        location: request.preferences.location,
        remote: request.preferences.remote,
    };

    let created = developer::create(&state.db, &state.credentials, new).await?;
    info!("User created successfully with ID: {}", created.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: UserResponse::from(created),
            message: "User created successfully".to_string(),
            success: true,
        }),
    ))
}

/// List all developer accounts
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let users = developer::list(&state.db).await?;
    debug!("Retrieved {} users from database", users.len());

    Ok(Json(ApiResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
        message: "Users retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get a developer account by ID
#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let found = developer::find_by_id(&state.db, user_id).await.map_err(|e| {
        warn!("User with ID {} could not be retrieved: {}", user_id, e);
        e
    })?;

    Ok(Json(ApiResponse {
        data: UserResponse::from(found),
        message: "User retrieved successfully".to_string(),
        success: true,
    }))
}

/// Update a developer account
#[utoipa::path(
    put,
    path = "/api/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(user_id = %user_id))]
pub async fn update_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateUserRequest>>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    trace!("Entering update_user function for user_id: {}", user_id);

    let role = request.role.as_deref().map(parse_role).transpose()?;
    let preferences = request.preferences.unwrap_or_default();
    let looking_for = preferences
        .looking_for
        .as_deref()
        .map(parse_looking_for)
        .transpose()?;
    let (location, remote) = (preferences.location, preferences.remote);

    let changes = DeveloperChanges {
        name: request.name,
        email: request.email,
        password: request.password,
        role,
        profile_picture: request.profile_picture,
        bio: request.bio,
        skills: request.skills,
        experience: request.experience,
        education: request.education,
        resume_url: request.resume_url,
        looking_for,
        location,
        remote,
    };

    let updated = developer::update(&state.db, &state.credentials, user_id, changes).await?;
    info!("User with ID {} updated successfully", user_id);

    Ok(Json(ApiResponse {
        data: UserResponse::from(updated),
        message: "User updated successfully".to_string(),
        success: true,
    }))
}

/// Authenticate a developer by email and password
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<UserResponse>),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(email = %request.email))]
pub async fn login_user(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let account = authenticate::<user::Entity, _>(
        &state.db,
        &state.credentials,
        &request.email,
        &request.password,
    )
    .await?;
    info!("User {} logged in", account.id);

    Ok(Json(ApiResponse {
        data: UserResponse::from(account),
        message: "Login successful".to_string(),
        success: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("developer").unwrap(), AccountRole::Developer);
        assert_eq!(parse_role("company").unwrap(), AccountRole::Company);
        let err = parse_role("admin").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "INVALID_ROLE");
    }

    #[test]
    fn test_parse_looking_for_rejects_unknown_entry() {
        let parsed = parse_looking_for(&["job".into(), "collaboration".into()]).unwrap();
        assert_eq!(parsed, vec![LookingFor::Job, LookingFor::Collaboration]);

        let err = parse_looking_for(&["job".into(), "mentoring".into()]).unwrap_err();
        assert_eq!(err.code, "INVALID_LOOKING_FOR");
        assert_eq!(
            err.message,
            "Invalid preference 'mentoring'. Valid values: job, hackathon, collaboration"
        );
    }
}
