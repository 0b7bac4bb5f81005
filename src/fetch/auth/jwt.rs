use reqwest::header::HeaderValue;

use crate::error::ApiError;

/// Scheme prefix the backend expects in front of the access token.
pub const JWT_SCHEME: &str = "JWT";

/// Formats `token` as an `Authorization` header value (`JWT <token>`).
///
/// The value is marked sensitive so it is redacted from `Debug` output.
pub fn authorization_value(token: &str) -> Result<HeaderValue, ApiError> {
    let mut value = HeaderValue::from_str(&format!("{JWT_SCHEME} {token}"))
        .map_err(|_| ApiError::InvalidRequest("access token is not a valid header value".into()))?;
    value.set_sensitive(true);
    Ok(value)
}
