use anyhow::anyhow;
use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use schoolhub_core::AppError;
use schoolhub_models::kinds::RoleKind;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Lets the request through only if the caller holds one of `allowed`.
/// The verified [`AuthUser`] is stored in the request extensions.
pub async fn require_roles(
    state: &AppState,
    req: Request,
    next: Next,
    allowed: &[RoleKind],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, state).await?;
    let role = auth_user.role()?;

    if !allowed.contains(&role) {
        return Err(AppError::forbidden(anyhow!(
            "Access denied for role {}",
            role
        )));
    }

    parts.extensions.insert(auth_user);
    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Route layer for whole routers that only admins may reach.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    require_roles(&state, req, next, &[RoleKind::Admin])
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schoolhub_auth::Claims;

    fn user(role: &str) -> AuthUser {
        AuthUser(Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            email: "x@school.test".into(),
            role: role.into(),
            profile_id: None,
            profile_kind: None,
            exp: 0,
            iat: 0,
        })
    }

    #[test]
    fn test_has_any_role() {
        assert!(user("admin").has_any_role(&[RoleKind::Admin]));
        assert!(!user("student").has_any_role(&[RoleKind::Admin, RoleKind::Teacher]));
        assert!(!user("janitor").has_any_role(RoleKind::ALL));
    }

    #[test]
    fn test_identity_id_parses_sub() {
        assert!(user("admin").identity_id().is_ok());

        let mut bad = user("admin");
        bad.0.sub = "nope".into();
        assert_eq!(
            bad.identity_id().unwrap_err().kind,
            schoolhub_core::ErrorKind::Unauthorized
        );
    }
}
