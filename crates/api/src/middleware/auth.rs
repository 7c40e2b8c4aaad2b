//! Bearer-token authentication.
//!
//! The middleware turns a valid token into an [`ActorContext`] stored in the
//! request extensions. Handlers read it back through [`AuthUser`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{AppState, error::ApiError};
use payline_core::{ActorContext, Role};
use payline_shared::{JwtError, JwtService};

/// Token part of `Authorization: Bearer <token>`, scheme matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolves the caller behind the request headers.
fn authenticate(jwt: &JwtService, headers: &HeaderMap) -> Result<ActorContext, ApiError> {
    let token = bearer_token(headers).ok_or_else(|| {
        ApiError::unauthorized("Authorization header with Bearer token is required")
    })?;

    let claims = jwt.validate_token(token).map_err(|e| match e {
        JwtError::Expired => ApiError::unauthorized("Token has expired"),
        other => {
            debug!(error = %other, "Rejected token");
            ApiError::unauthorized("Invalid or malformed token")
        }
    })?;

    let role = Role::parse(&claims.role).ok_or_else(|| {
        debug!(role = %claims.role, "Rejected token with unknown role");
        ApiError::unauthorized("Token carries an unknown role")
    })?;

    Ok(ActorContext::new(claims.user_id(), role))
}

/// Rejects the request with 401 unless it carries a usable token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state.jwt_service, request.headers()) {
        Ok(actor) => {
            request.extensions_mut().insert(actor);
            next.run(request).await
        }
        Err(rejection) => rejection.into_response(),
    }
}

/// The authenticated caller. Only valid on routes behind [`auth_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub ActorContext);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<ActorContext>() {
            Some(actor) => Ok(Self(*actor)),
            None => Err(ApiError::unauthorized("Authentication required")),
        }
    }
}
