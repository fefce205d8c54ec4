use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::auth::Role;
use crate::error::ApiError;

/// Fixed allow-list of roles, chosen when the route is registered.
#[derive(Clone, Debug, Default)]
pub struct RoleGate {
    allowed: Vec<Role>,
}

impl RoleGate {
    pub fn new(allowed: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn admin_only() -> Self {
        Self::new([Role::Admin])
    }

    pub fn admits(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }
}

/// Runs after `require_auth`. Missing identity here is a routing bug.
pub async fn authorize(
    State(gate): State<RoleGate>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request.extensions().get::<AuthUser>().ok_or_else(|| {
        tracing::error!("Role gate on {} ran without an authenticated user", request.uri().path());
        ApiError::internal_server_error("Authentication context missing")
    })?;

    if !gate.admits(user.role) {
        tracing::warn!("Role {} denied access to {}", user.role, request.uri().path());
        return Err(ApiError::forbidden("You do not have permission to access this resource"));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware::from_fn_with_state, routing::get, Router};
    use tower::ServiceExt;

    fn gated(gate: RoleGate, user: Option<AuthUser>) -> Router {
        let router = Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(from_fn_with_state(gate, authorize));
        match user {
            Some(user) => router.layer(axum::Extension(user)),
            None => router,
        }
    }

    fn user_with(role: Role) -> AuthUser {
        AuthUser {
            email: "someone@example.com".into(),
            user_id: uuid::Uuid::new_v4().to_string(),
            role,
        }
    }

    async fn status(router: Router) -> StatusCode {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        router.oneshot(req).await.unwrap().status()
    }

    #[test]
    fn admits_only_listed_roles() {
        let gate = RoleGate::admin_only();
        assert!(gate.admits(Role::Admin));
        assert!(!gate.admits(Role::User));

        let both = RoleGate::new(Role::ALL);
        assert!(Role::ALL.iter().all(|r| both.admits(*r)));
    }

    #[test]
    fn empty_gate_admits_nothing() {
        let gate = RoleGate::default();
        assert!(Role::ALL.iter().all(|r| !gate.admits(*r)));
    }

    #[tokio::test]
    async fn middleware_enforces_gate() {
        assert_eq!(status(gated(RoleGate::admin_only(), Some(user_with(Role::Admin)))).await, StatusCode::OK);
        assert_eq!(status(gated(RoleGate::admin_only(), Some(user_with(Role::User)))).await, StatusCode::FORBIDDEN);
        assert_eq!(status(gated(RoleGate::default(), Some(user_with(Role::Admin)))).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn missing_identity_is_a_server_error() {
        assert_eq!(
            status(gated(RoleGate::admin_only(), None)).await,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
