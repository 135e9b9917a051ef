//! Bearer authentication for protected routes.

use api_shared::{bearer_token, BearerError};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::ApiResult;
use crate::AppState;

/// Verify the bearer token and make the caller's `StaffAccount` available as a request
/// extension. Rejects with 401 before the handler runs.
pub async fn require_staff(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> ApiResult<Response> {
    // Owned, so no borrow of the request is held across the await.
    let token = {
        let header = match req.headers().get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| BearerError::Malformed)?),
            None => None,
        };
        bearer_token(header)?.to_string()
    };

    let staff = state.auth.verify_token(&token).await?;
    tracing::debug!(staff_id = staff.id, hospital = %staff.hospital, "authenticated request");

    req.extensions_mut().insert(staff);
    Ok(next.run(req).await)
}
