//! # Session Extractors
//!
//! The session itself is owned by an upstream collaborator, which forwards
//! the logged-in user in the `x-chat-user` header.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::debug;

use crate::constants::SESSION_USER_HEADER;
use crate::web::errors::ApiError;

/// Session context of a request; `user` is absent for anonymous requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub user: Option<String>,
}

impl SessionContext {
    fn from_parts(parts: &Parts) -> Self {
        let user = parts
            .headers
            .get(SESSION_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .map(str::to_string);

        Self { user }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

/// Logged-in user; rejects with 401 when the session has none
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = SessionContext::from_parts(parts)
            .user
            .ok_or(ApiError::Unauthorized)?;

        debug!(user = %user, "Extracted authenticated user");
        Ok(Self(user))
    }
}
