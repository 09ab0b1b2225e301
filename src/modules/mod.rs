pub mod admins;
pub mod auth;
pub mod classes;
pub mod health;
pub mod messaging;
pub mod parents;
pub mod people;
pub mod statistics;
pub mod students;
pub mod subjects;
pub mod teachers;
