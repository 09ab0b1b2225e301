//! # SchoolHub Core
//!
//! Foundational types used throughout the SchoolHub API:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Page-based pagination for list endpoints
//! - [`password`]: bcrypt password hashing and verification
//! - [`serde`]: Custom serde helpers for request DTOs
//!
//! # Example
//!
//! ```ignore
//! use schoolhub_core::errors::AppError;
//! use schoolhub_core::pagination::PaginationParams;
//!
//! let error = AppError::not_found(anyhow::anyhow!("Student not found"));
//! let params = PaginationParams::default();
//! assert_eq!(params.limit(), 10);
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod serde;

pub use errors::{AppError, ErrorKind, ErrorResponse};
pub use pagination::{Paginated, PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
