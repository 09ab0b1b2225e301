pub use schoolhub_models::people::{Parent, ParentSummary};
pub use schoolhub_models::people_input::{CreateParentDto, UpdateParentDto};
