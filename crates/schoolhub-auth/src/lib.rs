//! # SchoolHub Auth
//!
//! JWT claims plus token issuance and verification. The rest of the
//! application treats a verified [`Claims`] as the caller's identity and
//! role.

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{TokenSubject, create_access_token, verify_token};
