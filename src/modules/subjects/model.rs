pub use schoolhub_models::subjects::{
    CreateSubjectDto, NewSubject, Subject, SubjectPatch, SubjectTeacher, SubjectWithTeachers,
    UpdateSubjectDto,
};
