pub use schoolhub_models::people::{Admin, AdminSummary};
pub use schoolhub_models::people_input::{CreateAdminDto, UpdateAdminDto};
