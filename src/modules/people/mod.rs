//! People: identities joined with their role profile.
//!
//! The per-role modules (`students`, `teachers`, `parents`, `admins`) own the
//! HTTP surface and listings; every write funnels through
//! [`service::PeopleService`] so the roster counters and statistics stay in
//! step with the rows they summarize.

pub mod controller;
pub mod counters;
pub mod identity;
pub mod profiles;
pub mod router;
pub mod service;

pub use router::init_people_router;
pub use service::PeopleService;
