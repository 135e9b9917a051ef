use api_shared::{
    CreateStaffReq, ErrorRes, HealthRes, HealthService, LoginReq, LoginRes, PatientSearchQuery,
    PatientSearchRes, StaffRes,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use mw_core::{SearchCriteria, StaffAccount};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Used for monitoring and load balancer health checks. Does not touch the database.
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/staff/create",
    tag = "Staff",
    request_body = CreateStaffReq,
    responses(
        (status = 201, description = "Staff account created", body = StaffRes),
        (status = 400, description = "Invalid request body", body = ErrorRes),
        (status = 409, description = "Username, email or employee_id already exists", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Register a new staff account
///
/// The account is active immediately. Duplicate checks run on username, then email, then
/// employee_id.
#[axum::debug_handler]
pub async fn create_staff(
    State(state): State<AppState>,
    body: Result<Json<CreateStaffReq>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StaffRes>)> {
    let Json(req) = body?;
    let staff = state.auth.create_staff(req.into()).await?;
    Ok((StatusCode::CREATED, Json(StaffRes::from(staff))))
}

#[utoipa::path(
    post,
    path = "/staff/login",
    tag = "Staff",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Login succeeded", body = LoginRes),
        (status = 400, description = "Invalid request body", body = ErrorRes),
        (status = 401, description = "Invalid credentials", body = ErrorRes)
    )
)]
/// Authenticate a staff member and receive a bearer token
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginReq>, JsonRejection>,
) -> ApiResult<Json<LoginRes>> {
    let Json(req) = body?;
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let outcome = state.auth.login(&req.username, &req.password).await?;
    Ok(Json(LoginRes::from(outcome)))
}

#[utoipa::path(
    get,
    path = "/patient/search",
    tag = "Patient",
    params(PatientSearchQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Matching patients", body = PatientSearchRes),
        (status = 400, description = "No search criteria or malformed date", body = ErrorRes),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorRes),
        (status = 403, description = "Patient belongs to another hospital", body = ErrorRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Search patients visible to the caller's hospital
///
/// Local records are searched first. When none match and `id` is given, the HIS is asked and a
/// record owned by the caller's hospital is cached locally. The hospital always comes from the
/// authenticated account.
#[axum::debug_handler]
pub async fn search_patient(
    State(state): State<AppState>,
    Extension(staff): Extension<StaffAccount>,
    query: Result<Query<PatientSearchQuery>, QueryRejection>,
) -> ApiResult<Json<PatientSearchRes>> {
    let Query(query) = query?;
    let criteria = SearchCriteria::try_from(query)?;
    criteria.validate()?;

    let patients = state
        .patients
        .search_patient(&criteria, &staff.hospital)
        .await?;

    if patients.is_empty() {
        return Err(ApiError::not_found("patient not found"));
    }

    Ok(Json(PatientSearchRes::from(patients)))
}
