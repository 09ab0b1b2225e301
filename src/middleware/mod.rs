//! Authentication and role checks.
//!
//! - [`auth`]: the `AuthUser` extractor built from the bearer token, plus
//!   per-handler extractors (`RequireAdmin`, `RequireStaff`, ...) gating by [`RoleKind`]
//! - [`role`]: route-layer middleware for routers that are admin-only as a whole
//!
//! ```ignore
//! Router::new()
//!     .route("/", post(create_student))
//!     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
//! ```
//!
//! [`RoleKind`]: schoolhub_models::kinds::RoleKind

pub mod auth;
pub mod role;
