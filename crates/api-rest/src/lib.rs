//! # API REST
//!
//! REST API implementation for the hospital middleware.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Bearer authentication for patient routes
//! - OpenAPI/Swagger documentation
//!
//! Uses `api-shared` for wire types and `mw-core` for every domain operation.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use api_shared::{
    CreateStaffReq, ErrorRes, HealthRes, LoginReq, LoginRes, PatientRes, PatientSearchRes,
    StaffRes,
};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use mw_core::{
    AuthService, CoreConfig, Database, HisDirectoryClient, MiddlewareResult, PatientService,
};
use tower_http::cors::CorsLayer;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

pub use error::{ApiError, ApiResult};

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub patients: PatientService,
}

impl AppState {
    /// Wire the services onto an already migrated database.
    pub fn new(cfg: Arc<CoreConfig>, db: &Database) -> MiddlewareResult<Self> {
        let directory = HisDirectoryClient::from_config(&cfg)?;
        Ok(Self {
            auth: AuthService::new(db.staff(), cfg),
            patients: PatientService::new(Arc::new(db.patients()), Arc::new(directory)),
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::create_staff,
        handlers::login,
        handlers::search_patient,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        CreateStaffReq,
        StaffRes,
        LoginReq,
        LoginRes,
        PatientRes,
        PatientSearchRes,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Health"),
        (name = "Staff", description = "Staff registration and login"),
        (name = "Patient", description = "Hospital-scoped patient search")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Build the full router: public staff routes, the authenticated patient search, and Swagger UI.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/patient/search", get(handlers::search_patient))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_staff));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/staff/create", post(handlers::create_staff))
        .route("/staff/login", post(handlers::login))
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
