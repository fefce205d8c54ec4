use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{Claims, Role, TokenError};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated identity extracted from a bearer token
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub email: String,
    pub user_id: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.email,
            user_id: claims.user_id,
            role: claims.role,
        }
    }
}

impl AuthUser {
    /// Account id of the caller. The site owner's token carries no account
    /// and cannot own expense data.
    pub fn owner_id(&self) -> Result<Uuid, ApiError> {
        Uuid::parse_str(&self.user_id).map_err(|_| {
            tracing::warn!("Token for {} carries no account id", self.email);
            ApiError::forbidden("This action requires a user account")
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            tracing::error!("AuthUser requested on a route without authentication middleware");
            ApiError::internal_server_error("Authentication context missing")
        })
    }
}

/// JWT authentication middleware that validates tokens and injects `AuthUser`
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers()).map_err(|msg| {
        tracing::warn!("Rejected request to {}: {}", request.uri().path(), msg);
        ApiError::unauthorized(msg)
    })?;

    let claims = state.tokens.validate(token).map_err(|err| {
        tracing::warn!("Rejected token for {}: {}", request.uri().path(), err);
        match err {
            TokenError::InvalidSignature | TokenError::Expired => ApiError::unauthorized(err.to_string()),
            other => ApiError::from(other),
        }
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Exactly two whitespace-separated fields, the first `bearer` in any case.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or("Authorization header not provided")?;

    let value = header
        .to_str()
        .map_err(|_| "Invalid authorization header format")?;

    let mut fields = value.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err("Invalid authorization header format"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accepts_any_case_bearer_scheme() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc")), Ok("abc"));
        assert_eq!(extract_bearer_token(&headers("bearer abc")), Ok("abc"));
        assert_eq!(extract_bearer_token(&headers("BEARER   abc  ")), Ok("abc"));
    }

    #[test]
    fn rejects_malformed_headers() {
        assert!(extract_bearer_token(&HeaderMap::new()).is_err());
        assert!(extract_bearer_token(&headers("abc")).is_err());
        assert!(extract_bearer_token(&headers("Basic abc")).is_err());
        assert!(extract_bearer_token(&headers("Bearer abc def")).is_err());
        assert!(extract_bearer_token(&headers("Bearer")).is_err());
    }

    #[test]
    fn owner_id_requires_an_account() {
        let admin = AuthUser {
            email: "owner@example.com".into(),
            user_id: String::new(),
            role: Role::Admin,
        };
        assert!(admin.owner_id().is_err());

        let id = Uuid::new_v4();
        let user = AuthUser {
            email: "u@example.com".into(),
            user_id: id.to_string(),
            role: Role::User,
        };
        assert_eq!(user.owner_id().unwrap(), id);
    }
}
