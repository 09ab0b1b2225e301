//! Identities and their role-specific profiles.
//!
//! An [`Identity`] is the login account. It points at exactly one profile
//! through the `profile_kind`/`profile_id` pair, which is a polymorphic
//! reference: the kind decides which table the id belongs to. [`Profile`]
//! is the tagged union over the four profile tables.

use chrono::{DateTime, NaiveDate, Utc};
use schoolhub_core::{AppError, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::ids::{AdminId, ClassId, ParentId, RoleId, StudentId, TeacherId, UserId};
use crate::kinds::{Gender, ProfileKind, RoleKind};
use crate::value_types::Email;

/// Row of the `users` table. Holds the password hash, so it is never
/// serialized; responses use [`Account`].
#[derive(Debug, Clone, FromRow)]
pub struct Identity {
    pub id: UserId,
    pub email: Email,
    pub password: String,
    pub role_id: RoleId,
    pub profile_id: Option<Uuid>,
    pub profile_kind: Option<ProfileKind>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    pub fn role(&self) -> Result<RoleKind, AppError> {
        RoleKind::from_role_id(self.role_id).ok_or_else(|| {
            AppError::internal(anyhow::anyhow!(
                "Identity {} has unknown role {}",
                self.id,
                self.role_id
            ))
        })
    }

    /// The profile reference, if the back-fill has happened.
    pub fn profile_ref(&self) -> Option<(ProfileKind, Uuid)> {
        self.profile_kind.zip(self.profile_id)
    }

    pub fn account(&self) -> Result<Account, AppError> {
        Ok(Account {
            id: self.id,
            email: self.email.clone(),
            role: self.role()?,
            profile_id: self.profile_id,
            profile_kind: self.profile_kind,
            created_at: self.created_at,
        })
    }
}

/// Public projection of an identity.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Account {
    pub id: UserId,
    pub email: Email,
    pub role: RoleKind,
    pub profile_id: Option<Uuid>,
    pub profile_kind: Option<ProfileKind>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Student {
    pub id: StudentId,
    pub user_id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub blood_type: String,
    pub birthday: NaiveDate,
    pub gender: Gender,
    pub image: Option<String>,
    pub class_id: ClassId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Teacher {
    pub id: TeacherId,
    pub user_id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub blood_type: String,
    pub birthday: NaiveDate,
    pub gender: Gender,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Parent {
    pub id: ParentId,
    pub user_id: UserId,
    pub name: String,
    /// External parent identifier handed out by the school.
    pub parent_code: String,
    pub address: String,
    pub children_names: Vec<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Admin {
    pub id: AdminId,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One of the four profile shapes, tagged by `kind` in JSON.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Profile {
    Student(Student),
    Teacher(Teacher),
    Parent(Parent),
    Admin(Admin),
}

impl Profile {
    pub fn kind(&self) -> ProfileKind {
        match self {
            Profile::Student(_) => ProfileKind::Student,
            Profile::Teacher(_) => ProfileKind::Teacher,
            Profile::Parent(_) => ProfileKind::Parent,
            Profile::Admin(_) => ProfileKind::Admin,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Profile::Student(p) => p.id.into_inner(),
            Profile::Teacher(p) => p.id.into_inner(),
            Profile::Parent(p) => p.id.into_inner(),
            Profile::Admin(p) => p.id.into_inner(),
        }
    }

    pub fn user_id(&self) -> UserId {
        match self {
            Profile::Student(p) => p.user_id,
            Profile::Teacher(p) => p.user_id,
            Profile::Parent(p) => p.user_id,
            Profile::Admin(p) => p.user_id,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Profile::Student(p) => format!("{} {}", p.first_name, p.last_name),
            Profile::Teacher(p) => format!("{} {}", p.first_name, p.last_name),
            Profile::Parent(p) => p.name.clone(),
            Profile::Admin(p) => format!("{} {}", p.first_name, p.last_name),
        }
    }
}

/// An identity joined with its profile. This is what every person
/// endpoint returns.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Person {
    pub account: Account,
    pub profile: Profile,
}

impl Person {
    pub fn new(identity: &Identity, profile: Profile) -> Result<Self, AppError> {
        Ok(Self {
            account: identity.account()?,
            profile,
        })
    }
}

/// Student list row: the profile plus login email and class name.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct StudentSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub student: Student,
    pub email: Email,
    pub class_name: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TeacherSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub teacher: Teacher,
    pub email: Email,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ParentSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub parent: Parent,
    pub email: Email,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AdminSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub admin: Admin,
    pub email: Email,
}

/// Filters for the student list.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentFilterParams {
    /// Only students enrolled in this class.
    pub class_id: Option<ClassId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Compact teacher listing used by pickers (class teacher, subject staff).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TeacherDirectoryEntry {
    pub teacher_id: TeacherId,
    pub user_id: UserId,
    pub email: Email,
    pub role: RoleKind,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::system_roles;

    fn identity(role_id: RoleId) -> Identity {
        Identity {
            id: UserId::from_u128(7),
            email: Email::new("ada@school.test").unwrap(),
            password: "$2b$12$hash".into(),
            role_id,
            profile_id: None,
            profile_kind: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn admin_profile() -> Profile {
        Profile::Admin(Admin {
            id: AdminId::from_u128(1),
            user_id: UserId::from_u128(7),
            first_name: "Ada".into(),
            last_name: "Obi".into(),
            username: None,
            phone: None,
            address: None,
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    #[test]
    fn test_account_never_exposes_password() {
        let person = Person::new(&identity(system_roles::ADMIN), admin_profile()).unwrap();
        let json = serde_json::to_value(&person).unwrap();
        assert!(json["account"].get("password").is_none());
        assert_eq!(json["account"]["role"], "admin");
        assert_eq!(json["account"]["email"], "ada@school.test");
    }

    #[test]
    fn test_profile_is_tagged_by_kind() {
        let json = serde_json::to_value(admin_profile()).unwrap();
        assert_eq!(json["kind"], "admin");
        assert_eq!(json["first_name"], "Ada");
    }

    #[test]
    fn test_unknown_role_is_internal_error() {
        let err = identity(RoleId::from_u128(42)).account().unwrap_err();
        assert_eq!(err.kind, schoolhub_core::ErrorKind::Internal);
    }

    #[test]
    fn test_profile_ref_requires_both_halves() {
        let mut id = identity(system_roles::STUDENT);
        assert_eq!(id.profile_ref(), None);
        id.profile_kind = Some(ProfileKind::Student);
        assert_eq!(id.profile_ref(), None);
        id.profile_id = Some(Uuid::from_u128(3));
        assert_eq!(
            id.profile_ref(),
            Some((ProfileKind::Student, Uuid::from_u128(3)))
        );
    }

    #[test]
    fn test_profile_accessors() {
        let profile = admin_profile();
        assert_eq!(profile.kind(), ProfileKind::Admin);
        assert_eq!(profile.id(), Uuid::from_u128(1));
        assert_eq!(profile.user_id(), UserId::from_u128(7));
        assert_eq!(profile.display_name(), "Ada Obi");
    }
}
