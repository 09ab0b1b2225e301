//! Class roster models.

use chrono::{DateTime, Utc};
use schoolhub_core::{AppError, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{ClassId, TeacherId};
use crate::text;

/// A class. `student_count` is a cached counter owned by the enrollment
/// service; it is never written from request data.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ClassRecord {
    pub id: ClassId,
    pub name: String,
    pub teacher_id: TeacherId,
    pub student_count: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Class joined with its class teacher's display name.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ClassSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub class: ClassRecord,
    pub teacher_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct CreateClassDto {
    #[validate(length(max = 100))]
    pub name: String,
    pub teacher_id: Option<TeacherId>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(default)]
pub struct UpdateClassDto {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    pub teacher_id: Option<TeacherId>,
    /// May be set to an empty string to clear it.
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewClass {
    pub name: String,
    pub teacher_id: TeacherId,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct ClassPatch {
    pub name: Option<String>,
    pub teacher_id: Option<TeacherId>,
    pub description: Option<String>,
}

impl ClassPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.teacher_id.is_none() && self.description.is_none()
    }
}

impl TryFrom<CreateClassDto> for NewClass {
    type Error = AppError;

    fn try_from(dto: CreateClassDto) -> Result<Self, Self::Error> {
        Ok(Self {
            name: text::required("name", &dto.name)?,
            teacher_id: text::required_some("teacher_id", dto.teacher_id)?,
            description: dto
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
        })
    }
}

impl TryFrom<UpdateClassDto> for ClassPatch {
    type Error = AppError;

    fn try_from(dto: UpdateClassDto) -> Result<Self, Self::Error> {
        Ok(Self {
            name: text::patch("name", dto.name)?,
            teacher_id: dto.teacher_id,
            description: dto.description.map(|d| d.trim().to_string()),
        })
    }
}

/// Filters for the class list.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClassFilterParams {
    /// Only classes taught by this teacher.
    pub teacher_id: Option<TeacherId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}
