//! Subject models. A subject is taught by one or more teachers.

use chrono::{DateTime, Utc};
use schoolhub_core::AppError;
use schoolhub_core::serde::{deserialize_optional_string_list, deserialize_string_list};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{SubjectId, TeacherId};
use crate::text;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct SubjectTeacher {
    pub id: TeacherId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubjectWithTeachers {
    #[serde(flatten)]
    pub subject: Subject,
    pub teachers: Vec<SubjectTeacher>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct CreateSubjectDto {
    #[validate(length(max = 100))]
    pub name: String,
    /// JSON array or comma-separated string of teacher profile ids.
    #[serde(deserialize_with = "deserialize_string_list")]
    #[schema(value_type = Vec<String>)]
    pub teacher_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct UpdateSubjectDto {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_string_list")]
    #[schema(value_type = Option<Vec<String>>)]
    pub teacher_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct NewSubject {
    pub name: String,
    pub teacher_ids: Vec<TeacherId>,
}

#[derive(Debug, Clone, Default)]
pub struct SubjectPatch {
    pub name: Option<String>,
    pub teacher_ids: Option<Vec<TeacherId>>,
}

impl SubjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.teacher_ids.is_none()
    }
}

/// Parses, de-duplicates (keeping first occurrence order) and requires at
/// least one id.
pub fn parse_teacher_ids(raw: &[String]) -> Result<Vec<TeacherId>, AppError> {
    let mut ids: Vec<TeacherId> = Vec::with_capacity(raw.len());
    for value in raw {
        let id: TeacherId = value.parse().map_err(|_| {
            AppError::invalid_field("teacher_ids", format!("Invalid teacher id: {}", value))
        })?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    if ids.is_empty() {
        return Err(AppError::invalid_field(
            "teacher_ids",
            "At least one teacher is required",
        ));
    }
    Ok(ids)
}

impl TryFrom<CreateSubjectDto> for NewSubject {
    type Error = AppError;

    fn try_from(dto: CreateSubjectDto) -> Result<Self, Self::Error> {
        Ok(Self {
            name: text::required("name", &dto.name)?,
            teacher_ids: parse_teacher_ids(&dto.teacher_ids)?,
        })
    }
}

impl TryFrom<UpdateSubjectDto> for SubjectPatch {
    type Error = AppError;

    fn try_from(dto: UpdateSubjectDto) -> Result<Self, Self::Error> {
        Ok(Self {
            name: text::patch("name", dto.name)?,
            teacher_ids: dto
                .teacher_ids
                .as_deref()
                .map(parse_teacher_ids)
                .transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T1: &str = "00000000-0000-0000-0000-000000000001";
    const T2: &str = "00000000-0000-0000-0000-000000000002";

    #[test]
    fn test_teacher_ids_deduplicated_in_order() {
        let ids = parse_teacher_ids(&[T2.into(), T1.into(), T2.into()]).unwrap();
        assert_eq!(
            ids,
            vec![TeacherId::from_u128(2), TeacherId::from_u128(1)]
        );
    }

    #[test]
    fn test_teacher_ids_malformed() {
        let err = parse_teacher_ids(&["nope".into()]).unwrap_err();
        assert_eq!(err.fields, vec!["teacher_ids"]);
    }

    #[test]
    fn test_teacher_ids_required() {
        let err = NewSubject::try_from(CreateSubjectDto {
            name: "Maths".into(),
            teacher_ids: vec![],
        })
        .unwrap_err();
        assert_eq!(err.fields, vec!["teacher_ids"]);
    }

    #[test]
    fn test_create_from_comma_string() {
        let dto: CreateSubjectDto = serde_json::from_value(serde_json::json!({
            "name": " Maths ",
            "teacher_ids": format!("{}, {}", T1, T2),
        }))
        .unwrap();
        let subject = NewSubject::try_from(dto).unwrap();
        assert_eq!(subject.name, "Maths");
        assert_eq!(subject.teacher_ids.len(), 2);
    }

    #[test]
    fn test_patch_empty_teacher_list_rejected() {
        let dto = UpdateSubjectDto {
            name: None,
            teacher_ids: Some(vec![]),
        };
        assert!(SubjectPatch::try_from(dto).is_err());
        assert!(
            SubjectPatch::try_from(UpdateSubjectDto::default())
                .unwrap()
                .is_empty()
        );
    }
}
