pub use schoolhub_models::classes::{
    ClassFilterParams, ClassPatch, ClassRecord, ClassSummary, CreateClassDto, NewClass,
    UpdateClassDto,
};
