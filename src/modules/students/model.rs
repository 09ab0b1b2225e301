//! Student request and response types, re-exported from `schoolhub-models`.

pub use schoolhub_models::people::{Student, StudentFilterParams, StudentSummary};
pub use schoolhub_models::people_input::{CreateStudentDto, UpdateStudentDto};
