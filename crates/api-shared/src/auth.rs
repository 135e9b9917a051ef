/// Why an `Authorization` header could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("authorization header required")]
    Missing,
    #[error("invalid authorization header format")]
    Malformed,
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme must be exactly `Bearer`, followed by one space and a token without whitespace.
pub fn bearer_token(header: Option<&str>) -> Result<&str, BearerError> {
    let header = match header {
        Some(h) if !h.trim().is_empty() => h,
        _ => return Err(BearerError::Missing),
    };

    match header.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() && !token.contains(char::is_whitespace) => {
            Ok(token)
        }
        _ => Err(BearerError::Malformed),
    }
}
