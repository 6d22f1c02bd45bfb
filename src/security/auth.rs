use crate::api::rest::{first_query_value, ApiError};
use crate::security::AdminGate;
use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

/// Proof that the request carried the admin token.
///
/// Handlers taking this extractor never run for unauthenticated requests; they get a
/// 401 instead. When `token` is repeated the first value is checked.
#[derive(Debug, Clone)]
pub struct AdminAccess {
    /// The accepted token, for building follow-up links
    pub token: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminAccess
where
    AdminGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = AdminGate::from_ref(state);
        let token = first_query_value(parts.uri.query(), "token");

        gate.check(token.as_deref())?;

        Ok(Self {
            token: token.unwrap_or_default(),
        })
    }
}
