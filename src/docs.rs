use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use schoolhub_core::{ErrorResponse, PaginationMeta, PaginationParams};
use schoolhub_models::auth::{LoginRequest, LoginResponse};
use schoolhub_models::classes::{ClassRecord, ClassSummary, CreateClassDto, UpdateClassDto};
use schoolhub_models::kinds::{Gender, ProfileKind, RoleKind};
use schoolhub_models::messaging::{
    Conversation, DirectConversationDto, Message, MessagePage, MessagePageMeta, SendMessageDto,
};
use schoolhub_models::people::{
    Account, Admin, AdminSummary, Parent, ParentSummary, Person, Profile, Student,
    StudentSummary, Teacher, TeacherDirectoryEntry, TeacherSummary,
};
use schoolhub_models::people_input::{
    CreateAdminDto, CreateParentDto, CreateStudentDto, CreateTeacherDto, UpdateAdminDto,
    UpdateParentDto, UpdateStudentDto, UpdateTeacherDto,
};
use schoolhub_models::statistics::Statistics;
use schoolhub_models::subjects::{
    CreateSubjectDto, Subject, SubjectTeacher, SubjectWithTeachers, UpdateSubjectDto,
};

use crate::modules::health::controller::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::controller::health_check,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::get_me,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::get_teacher_directory,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::parents::controller::create_parent,
        crate::modules::parents::controller::get_parents,
        crate::modules::parents::controller::get_parent,
        crate::modules::parents::controller::update_parent,
        crate::modules::admins::controller::create_admin,
        crate::modules::admins::controller::get_admins,
        crate::modules::admins::controller::update_admin,
        crate::modules::people::controller::get_person,
        crate::modules::people::controller::delete_person,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::subjects::controller::create_subject,
        crate::modules::subjects::controller::get_subjects,
        crate::modules::subjects::controller::get_subject,
        crate::modules::subjects::controller::update_subject,
        crate::modules::subjects::controller::delete_subject,
        crate::modules::statistics::controller::get_statistics,
        crate::modules::messaging::controller::resolve_direct_conversation,
        crate::modules::messaging::controller::get_conversations,
        crate::modules::messaging::controller::get_messages,
        crate::modules::messaging::controller::send_message,
    ),
    components(
        schemas(
            ErrorResponse,
            PaginationMeta,
            PaginationParams,
            HealthResponse,
            LoginRequest,
            LoginResponse,
            RoleKind,
            ProfileKind,
            Gender,
            Account,
            Person,
            Profile,
            Student,
            Teacher,
            Parent,
            Admin,
            StudentSummary,
            TeacherSummary,
            ParentSummary,
            AdminSummary,
            TeacherDirectoryEntry,
            CreateStudentDto,
            CreateTeacherDto,
            CreateParentDto,
            CreateAdminDto,
            UpdateStudentDto,
            UpdateTeacherDto,
            UpdateParentDto,
            UpdateAdminDto,
            ClassRecord,
            ClassSummary,
            CreateClassDto,
            UpdateClassDto,
            Subject,
            SubjectTeacher,
            SubjectWithTeachers,
            CreateSubjectDto,
            UpdateSubjectDto,
            Statistics,
            Conversation,
            Message,
            MessagePage,
            MessagePageMeta,
            DirectConversationDto,
            SendMessageDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Login and current user"),
        (name = "Students", description = "Student accounts and enrollment"),
        (name = "Teachers", description = "Teacher accounts"),
        (name = "Parents", description = "Parent accounts"),
        (name = "Admins", description = "Administrator accounts"),
        (name = "People", description = "Operations on any account by identity id"),
        (name = "Classes", description = "Class roster"),
        (name = "Subjects", description = "Subjects and their teachers"),
        (name = "Statistics", description = "School-wide counters"),
        (name = "Messaging", description = "Direct conversations and messages")
    ),
    info(
        title = "SchoolHub API",
        version = "0.1.0",
        description = "School administration backend: accounts, class roster, statistics and direct messaging.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_module() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/auth/login",
            "/api/students/{identity_id}",
            "/api/classes/{id}",
            "/api/subjects",
            "/api/statistics",
            "/api/conversations/{id}/messages",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
