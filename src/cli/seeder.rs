//! Fills a database with fake people for local development.
//!
//! Everything is created through the same services the API uses, so class
//! seat counts and statistics come out exactly as if the accounts had been
//! added by hand.

use std::time::Instant;

use chrono::NaiveDate;
use fake::Fake;
use fake::faker::address::en::{CityName, StreetName};
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use schoolhub_core::AppError;
use schoolhub_models::NewPerson;
use schoolhub_models::classes::NewClass;
use schoolhub_models::ids::{ClassId, TeacherId};
use schoolhub_models::kinds::Gender;
use schoolhub_models::people::Profile;
use schoolhub_models::people_input::{CreateParentDto, CreateStudentDto, CreateTeacherDto};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::modules::classes::service::ClassService;
use crate::modules::people::PeopleService;

/// Password given to every seeded account.
pub const SEED_PASSWORD: &str = "password123";

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub teachers: usize,
    pub classes: usize,
    pub students_per_class: usize,
    pub parents: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            teachers: 5,
            classes: 3,
            students_per_class: 10,
            parents: 10,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub teachers: usize,
    pub classes: usize,
    pub students: usize,
    pub parents: usize,
}

pub async fn seed_database(db: &PgPool, config: SeedConfig) -> Result<SeedSummary, AppError> {
    if config.classes > 0 && config.teachers == 0 {
        return Err(AppError::invalid_field(
            "teachers",
            "Classes need at least one teacher",
        ));
    }

    let start = Instant::now();
    // Keeps usernames and emails unique across repeated runs.
    let run = Uuid::new_v4().simple().to_string()[..6].to_string();
    let mut summary = SeedSummary::default();

    let mut teacher_ids: Vec<TeacherId> = Vec::with_capacity(config.teachers);
    for n in 0..config.teachers {
        let person = PeopleService::create(db, NewPerson::try_from(fake_teacher(&run, n))?).await?;
        if let Profile::Teacher(teacher) = person.profile {
            teacher_ids.push(teacher.id);
        }
    }
    summary.teachers = teacher_ids.len();
    info!(count = summary.teachers, "Seeded teachers");

    let mut class_ids: Vec<ClassId> = Vec::with_capacity(config.classes);
    for n in 0..config.classes {
        let class = ClassService::create(
            db,
            NewClass {
                name: format!("Class {}-{}", n + 1, run),
                teacher_id: teacher_ids[n % teacher_ids.len()],
                description: format!("Seeded class {}", n + 1),
            },
        )
        .await?;
        class_ids.push(class.id);
    }
    summary.classes = class_ids.len();
    info!(count = summary.classes, "Seeded classes");

    let mut student_names: Vec<String> = Vec::new();
    for (c, class_id) in class_ids.iter().enumerate() {
        for n in 0..config.students_per_class {
            let dto = fake_student(&run, c * config.students_per_class + n, *class_id);
            student_names.push(format!("{} {}", dto.first_name, dto.last_name));
            PeopleService::create(db, NewPerson::try_from(dto)?).await?;
            summary.students += 1;
        }
    }
    info!(count = summary.students, "Seeded students");

    for n in 0..config.parents {
        let children: Vec<String> = if student_names.is_empty() {
            vec![format!("{} {}", FirstName().fake::<String>(), LastName().fake::<String>())]
        } else {
            (0..2)
                .map(|k| student_names[(n * 2 + k) % student_names.len()].clone())
                .collect()
        };
        PeopleService::create(db, NewPerson::try_from(fake_parent(&run, n, children))?).await?;
        summary.parents += 1;
    }
    info!(count = summary.parents, "Seeded parents");

    info!(elapsed_ms = %start.elapsed().as_millis(), "Seeding complete");
    Ok(summary)
}

fn fake_gender() -> Gender {
    if (0..2).fake::<u8>() == 0 {
        Gender::Male
    } else {
        Gender::Female
    }
}

fn fake_birthday(years: std::ops::Range<i32>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        years.fake::<i32>(),
        (1..13).fake::<u32>(),
        (1..29).fake::<u32>(),
    )
}

fn handle(first: &str, last: &str, run: &str, n: usize) -> String {
    format!("{}.{}{}{}", first, last, run, n)
        .to_lowercase()
        .replace(|c: char| !c.is_ascii_alphanumeric() && c != '.', "")
}

fn fake_address() -> String {
    format!(
        "{} {}, {}",
        (1..200).fake::<u32>(),
        StreetName().fake::<String>(),
        CityName().fake::<String>()
    )
}

fn fake_teacher(run: &str, n: usize) -> CreateTeacherDto {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();
    let username = handle(&first_name, &last_name, run, n);

    CreateTeacherDto {
        email: format!("{}@teachers.schoolhub.test", username),
        username,
        first_name,
        last_name,
        password: SEED_PASSWORD.to_string(),
        phone: PhoneNumber().fake(),
        address: fake_address(),
        blood_type: "O+".to_string(),
        birthday: fake_birthday(1965..1995),
        gender: Some(fake_gender()),
        image: "uploads/placeholder.png".to_string(),
    }
}

fn fake_student(run: &str, n: usize, class_id: ClassId) -> CreateStudentDto {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();
    let username = handle(&first_name, &last_name, run, n);

    CreateStudentDto {
        email: format!("{}@students.schoolhub.test", username),
        username,
        first_name,
        last_name,
        password: SEED_PASSWORD.to_string(),
        phone: PhoneNumber().fake(),
        address: fake_address(),
        blood_type: "A+".to_string(),
        birthday: fake_birthday(2008..2018),
        gender: Some(fake_gender()),
        class_id: Some(class_id),
        image: "uploads/placeholder.png".to_string(),
    }
}

fn fake_parent(run: &str, n: usize, children_names: Vec<String>) -> CreateParentDto {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();
    let username = handle(&first_name, &last_name, run, n);

    CreateParentDto {
        name: format!("{} {}", first_name, last_name),
        parent_code: format!("P-{}-{}", run, n + 1),
        email: format!("{}@parents.schoolhub.test", username),
        password: SEED_PASSWORD.to_string(),
        address: fake_address(),
        children_names,
        image: None,
    }
}
