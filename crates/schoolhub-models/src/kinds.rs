//! Closed sets of values stored as lowercase text: roles, profile kinds and
//! gender.

use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::ids::RoleId;

/// Returned when text does not name any variant of a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid {}", self.value, self.kind)
    }
}

impl std::error::Error for UnknownVariant {}

/// Generates a fieldless enum persisted as a TEXT column.
///
/// Parsing is case-insensitive and ignores surrounding whitespace; the
/// stored and serialized form is always the literal given for the variant.
macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant
            ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl Type<sqlx::Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <String as Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <String as Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl<'r> Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as Decode<'r, sqlx::Postgres>>::decode(value)?;
                Ok(text.parse::<$name>()?)
            }
        }

        impl PgHasArrayType for $name {
            fn array_type_info() -> PgTypeInfo {
                <String as PgHasArrayType>::array_type_info()
            }
        }
    };
}

define_text_enum!(
    /// The four roles. Each one has exactly one profile kind.
    RoleKind {
        Admin => "admin",
        Teacher => "teacher",
        Student => "student",
        Parent => "parent",
    }
);

define_text_enum!(
    /// Discriminator for the profile an identity points at.
    ProfileKind {
        Student => "student",
        Teacher => "teacher",
        Parent => "parent",
        Admin => "admin",
    }
);

define_text_enum!(Gender {
    Male => "male",
    Female => "female",
});

/// Well-known role ids, seeded by the first migration.
pub mod system_roles {
    use crate::ids::RoleId;

    pub const ADMIN: RoleId = RoleId::from_u128(0x00000000_0000_0000_0000_000000000001);
    pub const TEACHER: RoleId = RoleId::from_u128(0x00000000_0000_0000_0000_000000000002);
    pub const STUDENT: RoleId = RoleId::from_u128(0x00000000_0000_0000_0000_000000000003);
    pub const PARENT: RoleId = RoleId::from_u128(0x00000000_0000_0000_0000_000000000004);

    pub const ALL: [RoleId; 4] = [ADMIN, TEACHER, STUDENT, PARENT];

    pub fn is_system_role(role_id: &RoleId) -> bool {
        ALL.contains(role_id)
    }
}

impl RoleKind {
    pub const fn role_id(self) -> RoleId {
        match self {
            RoleKind::Admin => system_roles::ADMIN,
            RoleKind::Teacher => system_roles::TEACHER,
            RoleKind::Student => system_roles::STUDENT,
            RoleKind::Parent => system_roles::PARENT,
        }
    }

    pub fn from_role_id(role_id: RoleId) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.role_id() == role_id)
    }

    pub const fn profile_kind(self) -> ProfileKind {
        match self {
            RoleKind::Admin => ProfileKind::Admin,
            RoleKind::Teacher => ProfileKind::Teacher,
            RoleKind::Student => ProfileKind::Student,
            RoleKind::Parent => ProfileKind::Parent,
        }
    }

    /// Display label used in error messages, e.g. "Student not found".
    pub const fn label(self) -> &'static str {
        self.profile_kind().label()
    }
}

impl ProfileKind {
    pub const fn role_kind(self) -> RoleKind {
        match self {
            ProfileKind::Admin => RoleKind::Admin,
            ProfileKind::Teacher => RoleKind::Teacher,
            ProfileKind::Student => RoleKind::Student,
            ProfileKind::Parent => RoleKind::Parent,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ProfileKind::Admin => "Admin",
            ProfileKind::Teacher => "Teacher",
            ProfileKind::Student => "Student",
            ProfileKind::Parent => "Parent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ids_round_trip_through_kind() {
        for kind in RoleKind::ALL {
            assert_eq!(RoleKind::from_role_id(kind.role_id()), Some(*kind));
            assert!(system_roles::is_system_role(&kind.role_id()));
        }
        assert_eq!(RoleKind::from_role_id(RoleId::from_u128(99)), None);
    }

    #[test]
    fn test_every_role_has_matching_profile_kind() {
        for kind in RoleKind::ALL {
            assert_eq!(kind.profile_kind().role_kind(), *kind);
            assert_eq!(kind.as_str(), kind.profile_kind().as_str());
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(" Teacher ".parse::<RoleKind>().unwrap(), RoleKind::Teacher);
        assert_eq!("FEMALE".parse::<Gender>().unwrap(), Gender::Female);
    }

    #[test]
    fn test_parse_unknown_variant() {
        let err = "other".parse::<Gender>().unwrap_err();
        assert_eq!(err.kind, "Gender");
        assert_eq!(err.to_string(), "'other' is not a valid Gender");
    }

    #[test]
    fn test_serde_uses_lowercase_text() {
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), r#""male""#);
        assert_eq!(
            serde_json::from_str::<ProfileKind>(r#""parent""#).unwrap(),
            ProfileKind::Parent
        );
        assert!(serde_json::from_str::<Gender>(r#""Male""#).is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(RoleKind::Student.label(), "Student");
        assert_eq!(ProfileKind::Admin.label(), "Admin");
    }
}
