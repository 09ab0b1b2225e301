//! School-wide counters.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::kinds::{Gender, ProfileKind};

/// The single statistics row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Statistics {
    pub total_students: i64,
    pub total_teachers: i64,
    pub total_parents: i64,
    pub total_boys: i64,
    pub total_girls: i64,
    pub updated_at: DateTime<Utc>,
}

/// A relative change to apply to [`Statistics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatisticsDelta {
    pub students: i64,
    pub teachers: i64,
    pub parents: i64,
    pub boys: i64,
    pub girls: i64,
}

impl StatisticsDelta {
    /// The change caused by enrolling one person of `kind`. Admins are not
    /// counted.
    pub fn for_created(kind: ProfileKind, gender: Option<Gender>) -> Self {
        let mut delta = Self::default();
        match kind {
            ProfileKind::Student => {
                delta.students = 1;
                match gender {
                    Some(Gender::Male) => delta.boys = 1,
                    Some(Gender::Female) => delta.girls = 1,
                    None => {}
                }
            }
            ProfileKind::Teacher => delta.teachers = 1,
            ProfileKind::Parent => delta.parents = 1,
            ProfileKind::Admin => {}
        }
        delta
    }

    /// Moves one student between the gender buckets.
    pub fn gender_change(from: Gender, to: Gender) -> Self {
        if from == to {
            return Self::default();
        }
        let mut delta = Self::default();
        match from {
            Gender::Male => delta.boys -= 1,
            Gender::Female => delta.girls -= 1,
        }
        match to {
            Gender::Male => delta.boys += 1,
            Gender::Female => delta.girls += 1,
        }
        delta
    }

    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            students: -self.students,
            teachers: -self.teachers,
            parents: -self.parents,
            boys: -self.boys,
            girls: -self.girls,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}
