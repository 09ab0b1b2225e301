//! Request DTOs for creating and updating people, and their normalized
//! forms.
//!
//! DTOs are deliberately loose (missing strings default to empty) so that
//! normalization can report the exact field that is missing. The
//! normalized types ([`NewPerson`], [`PersonPatch`]) are what the
//! enrollment service consumes: every string trimmed, every required value
//! present, email lowercased.

use chrono::NaiveDate;
use schoolhub_core::AppError;
use schoolhub_core::serde::{deserialize_optional_string_list, deserialize_string_list};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::ClassId;
use crate::kinds::{Gender, ProfileKind};
use crate::text;
use crate::value_types::Email;

const IMAGE_REQUIRED: &str = "Profile image is required";

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct CreateStudentDto {
    #[validate(length(max = 50))]
    pub username: String,
    #[validate(length(max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[validate(length(max = 30))]
    pub phone: String,
    pub address: String,
    #[validate(length(max = 10))]
    pub blood_type: String,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub class_id: Option<ClassId>,
    /// Stored image reference returned by the upload service.
    pub image: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct CreateTeacherDto {
    #[validate(length(max = 50))]
    pub username: String,
    #[validate(length(max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[validate(length(max = 30))]
    pub phone: String,
    pub address: String,
    #[validate(length(max = 10))]
    pub blood_type: String,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub image: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct CreateParentDto {
    #[validate(length(max = 200))]
    pub name: String,
    #[validate(length(max = 50))]
    pub parent_code: String,
    pub email: String,
    pub password: String,
    pub address: String,
    /// JSON array or comma-separated string.
    #[serde(deserialize_with = "deserialize_string_list")]
    #[schema(value_type = Vec<String>)]
    pub children_names: Vec<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct CreateAdminDto {
    #[validate(length(max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
}

/// Only provided fields are applied. A provided empty string is rejected.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct UpdateStudentDto {
    #[validate(length(max = 50))]
    pub username: Option<String>,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub blood_type: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    /// Moves the student to another class.
    pub class_id: Option<ClassId>,
    pub image: Option<String>,
    pub remove_image: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct UpdateTeacherDto {
    #[validate(length(max = 50))]
    pub username: Option<String>,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub blood_type: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub image: Option<String>,
    pub remove_image: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct UpdateParentDto {
    pub name: Option<String>,
    pub parent_code: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string_list")]
    #[schema(value_type = Option<Vec<String>>)]
    pub children_names: Option<Vec<String>>,
    pub image: Option<String>,
    pub remove_image: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct UpdateAdminDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
    pub remove_image: Option<bool>,
}

/// A validated person ready to be enrolled.
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub email: Email,
    /// Plaintext; hashed by the service before the transaction opens.
    pub password: String,
    pub profile: NewProfile,
}

#[derive(Debug, Clone)]
pub enum NewProfile {
    Student(NewStudent),
    Teacher(NewTeacher),
    Parent(NewParent),
    Admin(NewAdmin),
}

impl NewProfile {
    pub fn kind(&self) -> ProfileKind {
        match self {
            NewProfile::Student(_) => ProfileKind::Student,
            NewProfile::Teacher(_) => ProfileKind::Teacher,
            NewProfile::Parent(_) => ProfileKind::Parent,
            NewProfile::Admin(_) => ProfileKind::Admin,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub blood_type: String,
    pub birthday: NaiveDate,
    pub gender: Gender,
    pub class_id: ClassId,
    pub image: String,
}

#[derive(Debug, Clone)]
pub struct NewTeacher {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub blood_type: String,
    pub birthday: NaiveDate,
    pub gender: Gender,
    pub image: String,
}

#[derive(Debug, Clone)]
pub struct NewParent {
    pub name: String,
    pub parent_code: String,
    pub address: String,
    pub children_names: Vec<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub first_name: String,
    pub last_name: String,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
}

fn required_image(image: &str) -> Result<String, AppError> {
    let image = image.trim();
    if image.is_empty() {
        return Err(AppError::invalid_field("image", IMAGE_REQUIRED));
    }
    Ok(image.to_string())
}

fn children(names: Vec<String>) -> Result<Vec<String>, AppError> {
    let names: Vec<String> = names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return Err(AppError::invalid_field(
            "children_names",
            "At least one child name is required",
        ));
    }
    Ok(names)
}

impl TryFrom<CreateStudentDto> for NewPerson {
    type Error = AppError;

    fn try_from(dto: CreateStudentDto) -> Result<Self, Self::Error> {
        let student = NewStudent {
            username: text::required("username", &dto.username)?,
            first_name: text::required("first_name", &dto.first_name)?,
            last_name: text::required("last_name", &dto.last_name)?,
            phone: text::required("phone", &dto.phone)?,
            address: text::required("address", &dto.address)?,
            blood_type: text::required("blood_type", &dto.blood_type)?,
            birthday: text::required_some("birthday", dto.birthday)?,
            gender: text::required_some("gender", dto.gender)?,
            class_id: text::required_some("class_id", dto.class_id)?,
            image: required_image(&dto.image)?,
        };
        Ok(Self {
            email: text::email(&dto.email)?,
            password: text::password(&dto.password)?,
            profile: NewProfile::Student(student),
        })
    }
}

impl TryFrom<CreateTeacherDto> for NewPerson {
    type Error = AppError;

    fn try_from(dto: CreateTeacherDto) -> Result<Self, Self::Error> {
        let teacher = NewTeacher {
            username: text::required("username", &dto.username)?,
            first_name: text::required("first_name", &dto.first_name)?,
            last_name: text::required("last_name", &dto.last_name)?,
            phone: text::required("phone", &dto.phone)?,
            address: text::required("address", &dto.address)?,
            blood_type: text::required("blood_type", &dto.blood_type)?,
            birthday: text::required_some("birthday", dto.birthday)?,
            gender: text::required_some("gender", dto.gender)?,
            image: required_image(&dto.image)?,
        };
        Ok(Self {
            email: text::email(&dto.email)?,
            password: text::password(&dto.password)?,
            profile: NewProfile::Teacher(teacher),
        })
    }
}

impl TryFrom<CreateParentDto> for NewPerson {
    type Error = AppError;

    fn try_from(dto: CreateParentDto) -> Result<Self, Self::Error> {
        let parent = NewParent {
            name: text::required("name", &dto.name)?,
            parent_code: text::required("parent_code", &dto.parent_code)?,
            address: text::required("address", &dto.address)?,
            children_names: children(dto.children_names)?,
            image: text::optional(dto.image),
        };
        Ok(Self {
            email: text::email(&dto.email)?,
            password: text::password(&dto.password)?,
            profile: NewProfile::Parent(parent),
        })
    }
}

impl TryFrom<CreateAdminDto> for NewPerson {
    type Error = AppError;

    fn try_from(dto: CreateAdminDto) -> Result<Self, Self::Error> {
        let admin = NewAdmin {
            first_name: text::required("first_name", &dto.first_name)?,
            last_name: text::required("last_name", &dto.last_name)?,
            username: text::optional(dto.username),
            phone: text::optional(dto.phone),
            address: text::optional(dto.address),
            image: text::optional(dto.image),
        };
        Ok(Self {
            email: text::email(&dto.email)?,
            password: text::password(&dto.password)?,
            profile: NewProfile::Admin(admin),
        })
    }
}

/// What happens to the stored image reference on update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageChange {
    #[default]
    Keep,
    Remove,
    Replace(String),
}

impl ImageChange {
    /// A new image wins over `remove_image`.
    fn from_request(image: Option<String>, remove: Option<bool>) -> Result<Self, AppError> {
        match text::patch("image", image)? {
            Some(image) => Ok(ImageChange::Replace(image)),
            None if remove == Some(true) => Ok(ImageChange::Remove),
            None => Ok(ImageChange::Keep),
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, ImageChange::Keep)
    }

    /// `(overwrite, new_value)` for a `CASE WHEN $overwrite THEN $value ELSE image END`
    /// column update.
    pub fn as_update(&self) -> (bool, Option<&str>) {
        match self {
            ImageChange::Keep => (false, None),
            ImageChange::Remove => (true, None),
            ImageChange::Replace(image) => (true, Some(image.as_str())),
        }
    }
}

/// Changes routed to the identity row.
#[derive(Debug, Clone, Default)]
pub struct IdentityPatch {
    pub email: Option<Email>,
    /// Plaintext; hashed by the service.
    pub password: Option<String>,
}

impl IdentityPatch {
    fn from_request(email: Option<String>, password: Option<String>) -> Result<Self, AppError> {
        Ok(Self {
            email: text::patch_email(email)?,
            password: text::patch_password(password)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentPatch {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub blood_type: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub class_id: Option<ClassId>,
    pub image: ImageChange,
}

#[derive(Debug, Clone, Default)]
pub struct TeacherPatch {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub blood_type: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub image: ImageChange,
}

#[derive(Debug, Clone, Default)]
pub struct ParentPatch {
    pub name: Option<String>,
    pub parent_code: Option<String>,
    pub address: Option<String>,
    pub children_names: Option<Vec<String>>,
    pub image: ImageChange,
}

#[derive(Debug, Clone, Default)]
pub struct AdminPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: ImageChange,
}

#[derive(Debug, Clone)]
pub enum ProfilePatch {
    Student(StudentPatch),
    Teacher(TeacherPatch),
    Parent(ParentPatch),
    Admin(AdminPatch),
}

impl ProfilePatch {
    pub fn kind(&self) -> ProfileKind {
        match self {
            ProfilePatch::Student(_) => ProfileKind::Student,
            ProfilePatch::Teacher(_) => ProfileKind::Teacher,
            ProfilePatch::Parent(_) => ProfileKind::Parent,
            ProfilePatch::Admin(_) => ProfileKind::Admin,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ProfilePatch::Student(p) => {
                p.username.is_none()
                    && p.first_name.is_none()
                    && p.last_name.is_none()
                    && p.phone.is_none()
                    && p.address.is_none()
                    && p.blood_type.is_none()
                    && p.birthday.is_none()
                    && p.gender.is_none()
                    && p.class_id.is_none()
                    && p.image.is_keep()
            }
            ProfilePatch::Teacher(p) => {
                p.username.is_none()
                    && p.first_name.is_none()
                    && p.last_name.is_none()
                    && p.phone.is_none()
                    && p.address.is_none()
                    && p.blood_type.is_none()
                    && p.birthday.is_none()
                    && p.gender.is_none()
                    && p.image.is_keep()
            }
            ProfilePatch::Parent(p) => {
                p.name.is_none()
                    && p.parent_code.is_none()
                    && p.address.is_none()
                    && p.children_names.is_none()
                    && p.image.is_keep()
            }
            ProfilePatch::Admin(p) => {
                p.first_name.is_none()
                    && p.last_name.is_none()
                    && p.username.is_none()
                    && p.phone.is_none()
                    && p.address.is_none()
                    && p.image.is_keep()
            }
        }
    }
}

/// A validated update for one person.
#[derive(Debug, Clone)]
pub struct PersonPatch {
    pub identity: IdentityPatch,
    pub profile: ProfilePatch,
}

impl PersonPatch {
    pub fn is_empty(&self) -> bool {
        self.identity.is_empty() && self.profile.is_empty()
    }
}

impl TryFrom<UpdateStudentDto> for PersonPatch {
    type Error = AppError;

    fn try_from(dto: UpdateStudentDto) -> Result<Self, Self::Error> {
        let profile = StudentPatch {
            username: text::patch("username", dto.username)?,
            first_name: text::patch("first_name", dto.first_name)?,
            last_name: text::patch("last_name", dto.last_name)?,
            phone: text::patch("phone", dto.phone)?,
            address: text::patch("address", dto.address)?,
            blood_type: text::patch("blood_type", dto.blood_type)?,
            birthday: dto.birthday,
            gender: dto.gender,
            class_id: dto.class_id,
            image: ImageChange::from_request(dto.image, dto.remove_image)?,
        };
        Ok(Self {
            identity: IdentityPatch::from_request(dto.email, dto.password)?,
            profile: ProfilePatch::Student(profile),
        })
    }
}

impl TryFrom<UpdateTeacherDto> for PersonPatch {
    type Error = AppError;

    fn try_from(dto: UpdateTeacherDto) -> Result<Self, Self::Error> {
        let profile = TeacherPatch {
            username: text::patch("username", dto.username)?,
            first_name: text::patch("first_name", dto.first_name)?,
            last_name: text::patch("last_name", dto.last_name)?,
            phone: text::patch("phone", dto.phone)?,
            address: text::patch("address", dto.address)?,
            blood_type: text::patch("blood_type", dto.blood_type)?,
            birthday: dto.birthday,
            gender: dto.gender,
            image: ImageChange::from_request(dto.image, dto.remove_image)?,
        };
        Ok(Self {
            identity: IdentityPatch::from_request(dto.email, dto.password)?,
            profile: ProfilePatch::Teacher(profile),
        })
    }
}

impl TryFrom<UpdateParentDto> for PersonPatch {
    type Error = AppError;

    fn try_from(dto: UpdateParentDto) -> Result<Self, Self::Error> {
        let profile = ParentPatch {
            name: text::patch("name", dto.name)?,
            parent_code: text::patch("parent_code", dto.parent_code)?,
            address: text::patch("address", dto.address)?,
            children_names: dto.children_names.map(children).transpose()?,
            image: ImageChange::from_request(dto.image, dto.remove_image)?,
        };
        Ok(Self {
            identity: IdentityPatch::from_request(dto.email, dto.password)?,
            profile: ProfilePatch::Parent(profile),
        })
    }
}

impl TryFrom<UpdateAdminDto> for PersonPatch {
    type Error = AppError;

    fn try_from(dto: UpdateAdminDto) -> Result<Self, Self::Error> {
        let profile = AdminPatch {
            first_name: text::patch("first_name", dto.first_name)?,
            last_name: text::patch("last_name", dto.last_name)?,
            username: text::patch("username", dto.username)?,
            phone: text::patch("phone", dto.phone)?,
            address: text::patch("address", dto.address)?,
            image: ImageChange::from_request(dto.image, dto.remove_image)?,
        };
        Ok(Self {
            identity: IdentityPatch::from_request(dto.email, dto.password)?,
            profile: ProfilePatch::Admin(profile),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schoolhub_core::ErrorKind;

    fn student_dto() -> CreateStudentDto {
        CreateStudentDto {
            username: " s1 ".into(),
            first_name: "Tolu".into(),
            last_name: "Ade".into(),
            email: " Tolu@School.Test ".into(),
            password: "secret1".into(),
            phone: "0800".into(),
            address: "1 Main St".into(),
            blood_type: "O+".into(),
            birthday: NaiveDate::from_ymd_opt(2012, 5, 1),
            gender: Some(Gender::Male),
            class_id: Some(ClassId::from_u128(5)),
            image: "uploads/s1.png".into(),
        }
    }

    #[test]
    fn test_student_create_normalizes() {
        let person = NewPerson::try_from(student_dto()).unwrap();
        assert_eq!(person.email.as_str(), "tolu@school.test");
        let NewProfile::Student(student) = person.profile else {
            panic!("expected student");
        };
        assert_eq!(student.username, "s1");
        assert_eq!(student.class_id, ClassId::from_u128(5));
    }

    #[test]
    fn test_student_create_missing_fields() {
        let cases: Vec<(&str, fn(&mut CreateStudentDto))> = vec![
            ("username", |d| d.username = "  ".into()),
            ("blood_type", |d| d.blood_type = String::new()),
            ("birthday", |d| d.birthday = None),
            ("gender", |d| d.gender = None),
            ("class_id", |d| d.class_id = None),
            ("image", |d| d.image = " ".into()),
            ("email", |d| d.email = "".into()),
            ("password", |d| d.password = "123".into()),
        ];

        for (field, mutate) in cases {
            let mut dto = student_dto();
            mutate(&mut dto);
            let err = NewPerson::try_from(dto).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "field {}", field);
            assert_eq!(err.fields, vec![field.to_string()]);
        }
    }

    #[test]
    fn test_student_create_requires_image_message() {
        let mut dto = student_dto();
        dto.image = String::new();
        let err = NewPerson::try_from(dto).unwrap_err();
        assert_eq!(err.error.to_string(), IMAGE_REQUIRED);
    }

    #[test]
    fn test_parent_children_from_comma_string() {
        let dto: CreateParentDto = serde_json::from_value(serde_json::json!({
            "name": "Mrs Bello",
            "parent_code": "P-001",
            "email": "bello@home.test",
            "password": "secret1",
            "address": "2 Side St",
            "children_names": "Ada, ,Tunde"
        }))
        .unwrap();
        let person = NewPerson::try_from(dto).unwrap();
        let NewProfile::Parent(parent) = person.profile else {
            panic!("expected parent");
        };
        assert_eq!(parent.children_names, vec!["Ada", "Tunde"]);
        assert_eq!(parent.image, None);
    }

    #[test]
    fn test_parent_requires_children() {
        let dto = CreateParentDto {
            name: "Mrs Bello".into(),
            parent_code: "P-001".into(),
            email: "bello@home.test".into(),
            password: "secret1".into(),
            address: "2 Side St".into(),
            children_names: vec![],
            image: None,
        };
        let err = NewPerson::try_from(dto).unwrap_err();
        assert_eq!(err.fields, vec!["children_names"]);
    }

    #[test]
    fn test_admin_optional_fields_blank_to_none() {
        let dto = CreateAdminDto {
            first_name: "Head".into(),
            last_name: "Master".into(),
            email: "head@school.test".into(),
            password: "secret1".into(),
            username: Some("  ".into()),
            phone: Some(" 0801 ".into()),
            address: None,
            image: None,
        };
        let NewProfile::Admin(admin) = NewPerson::try_from(dto).unwrap().profile else {
            panic!("expected admin");
        };
        assert_eq!(admin.username, None);
        assert_eq!(admin.phone.as_deref(), Some("0801"));
    }

    #[test]
    fn test_update_empty_string_is_error() {
        let dto = UpdateStudentDto {
            first_name: Some("".into()),
            ..Default::default()
        };
        let err = PersonPatch::try_from(dto).unwrap_err();
        assert_eq!(err.fields, vec!["first_name"]);
    }

    #[test]
    fn test_update_without_fields_is_empty() {
        let patch = PersonPatch::try_from(UpdateTeacherDto::default()).unwrap();
        assert!(patch.is_empty());
        assert_eq!(patch.profile.kind(), ProfileKind::Teacher);
    }

    #[test]
    fn test_update_routes_email_to_identity() {
        let dto = UpdateParentDto {
            email: Some(" New@Home.Test".into()),
            ..Default::default()
        };
        let patch = PersonPatch::try_from(dto).unwrap();
        assert_eq!(patch.identity.email.unwrap().as_str(), "new@home.test");
        assert!(patch.profile.is_empty());
    }

    #[test]
    fn test_image_change_rules() {
        assert_eq!(
            ImageChange::from_request(None, Some(true)).unwrap(),
            ImageChange::Remove
        );
        assert_eq!(
            ImageChange::from_request(Some("new.png".into()), Some(true)).unwrap(),
            ImageChange::Replace("new.png".into())
        );
        assert_eq!(
            ImageChange::from_request(None, Some(false)).unwrap(),
            ImageChange::Keep
        );
    }

    #[test]
    fn test_class_transfer_is_not_empty() {
        let dto = UpdateStudentDto {
            class_id: Some(ClassId::from_u128(9)),
            ..Default::default()
        };
        let patch = PersonPatch::try_from(dto).unwrap();
        assert!(!patch.is_empty());
    }
}
