use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::utils::error::AppError;

/// Header the gateway sets after it has verified the bearer token.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Identity of the caller as vouched for by the gateway.
///
/// The token itself never reaches this service, so holding a `VerifiedCaller`
/// is the only proof of identity the service layer gets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCaller {
    user_id: String,
}

impl VerifiedCaller {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let value = headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::AuthError(format!("missing {} header", USER_ID_HEADER)))?;

        let user_id = value
            .to_str()
            .map_err(|_| AppError::AuthError(format!("{} header is not valid text", USER_ID_HEADER)))?
            .trim();

        if user_id.is_empty() {
            return Err(AppError::AuthError(format!(
                "{} header is empty",
                USER_ID_HEADER
            )));
        }

        Ok(Self::new(user_id))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for VerifiedCaller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}
