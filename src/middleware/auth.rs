use anyhow::anyhow;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use schoolhub_auth::{Claims, verify_token};
use schoolhub_core::AppError;
use schoolhub_models::ids::UserId;
use schoolhub_models::kinds::RoleKind;

use crate::state::AppState;

/// The verified caller. Extracting it fails with 401 when the bearer token
/// is missing, malformed or expired.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn identity_id(&self) -> Result<UserId, AppError> {
        self.0
            .identity_id()
            .map(UserId::from_uuid)
            .ok_or_else(|| AppError::unauthorized(anyhow!("Invalid identity in token")))
    }

    pub fn role(&self) -> Result<RoleKind, AppError> {
        self.0
            .role
            .parse()
            .map_err(|_| AppError::unauthorized(anyhow!("Invalid role in token")))
    }

    pub fn has_any_role(&self, roles: &[RoleKind]) -> bool {
        self.role().map(|role| roles.contains(&role)).unwrap_or(false)
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    if rejection.is_missing() {
                        AppError::unauthorized(anyhow!("Missing authorization header"))
                    } else {
                        AppError::unauthorized(anyhow!("Invalid authorization header format"))
                    }
                })?;

        let claims = verify_token(bearer.token(), &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// Declares an extractor that yields the [`AuthUser`] only when the caller
/// holds one of the listed roles, and rejects with 403 otherwise.
macro_rules! require_role {
    ($name:ident, [$($role:expr),+ $(,)?]) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub AuthUser);

        impl $name {
            pub const ROLES: &'static [RoleKind] = &[$($role),+];
        }

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = match parts.extensions.get::<AuthUser>() {
                    Some(user) => user.clone(),
                    None => AuthUser::from_request_parts(parts, state).await?,
                };

                if !auth_user.has_any_role(Self::ROLES) {
                    return Err(AppError::forbidden(anyhow!(
                        "Access denied. Requires one of: {}",
                        Self::ROLES
                            .iter()
                            .map(|role| role.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )));
                }

                Ok($name(auth_user))
            }
        }
    };
}

require_role!(RequireAdmin, [RoleKind::Admin]);
require_role!(RequireStaff, [RoleKind::Admin, RoleKind::Teacher]);
require_role!(
    RequireSchoolMember,
    [RoleKind::Admin, RoleKind::Teacher, RoleKind::Student]
);
require_role!(
    RequireAuthenticated,
    [
        RoleKind::Admin,
        RoleKind::Teacher,
        RoleKind::Student,
        RoleKind::Parent
    ]
);
