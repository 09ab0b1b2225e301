//! Strongly-typed ID newtypes for domain entities.
//!
//! Each store gets its own id type so a `ClassId` can never be passed where
//! a `TeacherId` is expected.
//!
//! ```ignore
//! fn enroll(student: StudentId, class: ClassId) { /* ... */ }
//!
//! enroll(student_id, class_id);    // OK
//! // enroll(class_id, student_id); // Compile error
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Generates a `Uuid` newtype that binds, decodes and (de)serializes as
/// the bare uuid.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize, ToSchema, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        #[schema(value_type = String, format = "uuid")]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// For well-known constants such as the system role ids.
            pub const fn from_u128(v: u128) -> Self {
                Self(Uuid::from_u128(v))
            }

            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

define_id!(
    /// Identity (login account) id.
    UserId
);

define_id!(
    /// Role id. The four roles have fixed ids, see `kinds::system_roles`.
    RoleId
);

define_id!(
    /// Student profile id.
    StudentId
);

define_id!(
    /// Teacher profile id.
    TeacherId
);

define_id!(
    /// Parent profile id.
    ParentId
);

define_id!(
    /// Admin profile id.
    AdminId
);

define_id!(ClassId);

define_id!(SubjectId);

define_id!(ConversationId);

define_id!(MessageId);
