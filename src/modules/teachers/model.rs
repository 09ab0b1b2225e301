pub use schoolhub_models::people::{Teacher, TeacherDirectoryEntry, TeacherSummary};
pub use schoolhub_models::people_input::{CreateTeacherDto, UpdateTeacherDto};
