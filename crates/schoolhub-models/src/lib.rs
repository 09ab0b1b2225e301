//! # SchoolHub Models
//!
//! Domain models and DTOs for the SchoolHub API.
//!
//! # Modules
//!
//! - [`ids`]: Typed id newtypes
//! - [`value_types`]: Normalized [`Email`](value_types::Email)
//! - [`kinds`]: Role, profile kind and gender enums plus the well-known role ids
//! - [`people`]: Identities, profiles and the joined [`Person`](people::Person)
//! - [`people_input`]: Create/update DTOs for people and their normalized forms
//! - [`classes`], [`subjects`]: Roster models
//! - [`statistics`]: The counters singleton and relative deltas
//! - [`messaging`]: Conversations and messages
//! - [`auth`]: Login request/response
//!
//! # Example
//!
//! ```ignore
//! use schoolhub_models::people_input::{CreateStudentDto, NewPerson};
//!
//! let person = NewPerson::try_from(dto)?;
//! assert_eq!(person.profile.kind(), ProfileKind::Student);
//! ```

pub mod auth;
pub mod classes;
pub mod ids;
pub mod kinds;
pub mod messaging;
pub mod people;
pub mod people_input;
pub mod statistics;
pub mod subjects;
pub mod text;
pub mod value_types;

pub use auth::{LoginRequest, LoginResponse};
pub use classes::{ClassPatch, ClassRecord, ClassSummary, NewClass};
pub use kinds::{Gender, ProfileKind, RoleKind, system_roles};
pub use messaging::{Conversation, Message, MessagePage};
pub use people::{Account, Identity, Person, Profile};
pub use people_input::{NewPerson, NewProfile, PersonPatch, ProfilePatch};
pub use statistics::{Statistics, StatisticsDelta};
pub use subjects::{NewSubject, Subject, SubjectPatch, SubjectWithTeachers};
pub use value_types::Email;
