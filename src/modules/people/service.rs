//! Enrollment service: every write that touches an identity together with
//! its profile, the class roster counter and the statistics singleton.
//!
//! Each operation runs inside one [`with_transaction`] call, so readers see
//! either the whole change or none of it. Uniqueness pre-checks only exist
//! to produce friendlier messages; the constraints in the schema are what
//! actually reject duplicates, and their violations surface as conflicts.

use anyhow::anyhow;
use schoolhub_core::{AppError, hash_password};
use schoolhub_db::with_transaction;
use schoolhub_models::Email;
use schoolhub_models::ids::{ClassId, UserId};
use schoolhub_models::kinds::{Gender, ProfileKind};
use schoolhub_models::people::{Identity, Person, Profile};
use schoolhub_models::people_input::{NewPerson, NewProfile, PersonPatch, ProfilePatch};
use schoolhub_models::statistics::StatisticsDelta;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::metrics::{track_person_created, track_person_deleted};
use crate::modules::people::{counters, identity, profiles};
use crate::modules::statistics::service as statistics;

pub struct PeopleService;

fn not_found(kind: Option<ProfileKind>) -> AppError {
    match kind {
        Some(kind) => AppError::not_found(anyhow!("{} not found", kind.label())),
        None => AppError::not_found(anyhow!("User not found")),
    }
}

fn email_conflict() -> AppError {
    AppError::conflict(anyhow!("Email already registered"), ["email"])
}

fn username_conflict() -> AppError {
    AppError::conflict(anyhow!("Username already taken"), ["username"])
}

fn parent_code_conflict() -> AppError {
    AppError::conflict(anyhow!("Parent code already taken"), ["parent_code"])
}

fn gender_of(profile: &Profile) -> Option<Gender> {
    match profile {
        Profile::Student(s) => Some(s.gender),
        _ => None,
    }
}

impl PeopleService {
    /// Creates an identity with its profile, enrolls a student in its class
    /// and bumps the statistics, all in one transaction.
    #[instrument(skip(db, person), fields(kind = %person.profile.kind()))]
    pub async fn create(db: &PgPool, person: NewPerson) -> Result<Person, AppError> {
        let kind = person.profile.kind();

        {
            let mut conn = db.acquire().await?;
            ensure_new_person_available(&mut conn, &person).await?;
        }

        let password_hash = hash_password(&person.password)?;
        let NewPerson { email, profile, .. } = person;
        let gender = match &profile {
            NewProfile::Student(s) => Some(s.gender),
            _ => None,
        };

        let created = with_transaction(db, move |tx| {
            Box::pin(async move {
                let identity = identity::insert(
                    &mut **tx,
                    &email,
                    &password_hash,
                    kind.role_kind().role_id(),
                )
                .await?;

                if let NewProfile::Student(student) = &profile {
                    counters::enroll(&mut **tx, student.class_id).await?;
                }

                let created = profiles::insert(&mut **tx, identity.id, &profile).await?;
                let identity =
                    identity::set_profile_ref(&mut **tx, identity.id, kind, created.id()).await?;

                statistics::apply_delta(&mut **tx, StatisticsDelta::for_created(kind, gender))
                    .await?;

                Person::new(&identity, created)
            })
        })
        .await?;

        track_person_created(kind);
        info!(
            identity_id = %created.account.id,
            profile_id = %created.profile.id(),
            "Person created"
        );

        Ok(created)
    }

    /// Reads an identity joined with its profile. With `expected` set, a
    /// profile of another kind is reported as missing.
    #[instrument(skip(db))]
    pub async fn get(
        db: &PgPool,
        identity_id: UserId,
        expected: Option<ProfileKind>,
    ) -> Result<Person, AppError> {
        let mut conn = db.acquire().await?;

        let identity = identity::find_by_id(&mut conn, identity_id)
            .await?
            .ok_or_else(|| not_found(expected))?;

        let profile = profiles::load_for_identity(&mut conn, &identity, false)
            .await?
            .filter(|p| expected.is_none_or(|kind| p.kind() == kind))
            .ok_or_else(|| {
                let kind = expected.or_else(|| identity.role().ok().map(|r| r.profile_kind()));
                not_found(kind)
            })?;

        Person::new(&identity, profile)
    }

    /// Applies a partial update addressed by identity id. A class change
    /// moves one seat between the two classes, and a gender change moves
    /// one count between the gender totals, in the same transaction as the
    /// profile write.
    #[instrument(skip(db, patch), fields(kind = %patch.profile.kind()))]
    pub async fn update(
        db: &PgPool,
        identity_id: UserId,
        patch: PersonPatch,
    ) -> Result<Person, AppError> {
        if patch.is_empty() {
            return Err(AppError::validation(anyhow!("Nothing to update")));
        }

        let kind = patch.profile.kind();

        {
            let mut conn = db.acquire().await?;
            let identity = identity::find_by_id(&mut conn, identity_id)
                .await?
                .ok_or_else(|| not_found(Some(kind)))?;
            let profile = profiles::load_for_identity(&mut conn, &identity, false)
                .await?
                .filter(|p| p.kind() == kind)
                .ok_or_else(|| not_found(Some(kind)))?;
            ensure_patch_available(&mut conn, &identity, &profile, &patch).await?;
        }

        let password_hash = patch
            .identity
            .password
            .as_deref()
            .map(hash_password)
            .transpose()?;

        let updated = with_transaction(db, move |tx| {
            Box::pin(async move {
                let identity = identity::lock_by_id(&mut **tx, identity_id)
                    .await?
                    .ok_or_else(|| not_found(Some(kind)))?;

                let current = profiles::load_for_identity(&mut **tx, &identity, true)
                    .await?
                    .filter(|p| p.kind() == kind)
                    .ok_or_else(|| not_found(Some(kind)))?;

                let profile = apply_profile_patch(&mut **tx, current, &patch.profile).await?;

                let identity = if patch.identity.is_empty() {
                    identity
                } else {
                    identity::update_credentials(
                        &mut **tx,
                        identity_id,
                        patch.identity.email.as_ref(),
                        password_hash.as_deref(),
                    )
                    .await?
                };

                Person::new(&identity, profile)
            })
        })
        .await?;

        info!(identity_id = %identity_id, "Person updated");
        Ok(updated)
    }

    /// Deletes the profile, reverses its counters and finally deletes the
    /// identity. `requested_by` may not delete itself.
    #[instrument(skip(db))]
    pub async fn delete(
        db: &PgPool,
        identity_id: UserId,
        requested_by: Option<UserId>,
    ) -> Result<(), AppError> {
        if requested_by == Some(identity_id) {
            return Err(AppError::forbidden(anyhow!(
                "You cannot delete your own account"
            )));
        }

        let removed = with_transaction(db, move |tx| {
            Box::pin(async move {
                let identity = identity::lock_by_id(&mut **tx, identity_id)
                    .await?
                    .ok_or_else(|| not_found(None))?;

                let profile = profiles::load_for_identity(&mut **tx, &identity, true).await?;

                let kind = match &profile {
                    Some(profile) => {
                        remove_profile(&mut **tx, profile).await?;
                        Some(profile.kind())
                    }
                    None => None,
                };

                identity::delete(&mut **tx, identity_id).await?;
                Ok(kind)
            })
        })
        .await?;

        if let Some(kind) = removed {
            track_person_deleted(kind);
        }
        info!(identity_id = %identity_id, "Person deleted");

        Ok(())
    }
}

async fn remove_profile(conn: &mut PgConnection, profile: &Profile) -> Result<(), AppError> {
    match profile {
        Profile::Student(student) => {
            counters::unenroll(&mut *conn, student.class_id).await?;
        }
        Profile::Teacher(teacher) => {
            if profiles::teaches_a_class(&mut *conn, teacher.id).await? {
                return Err(AppError::conflict(
                    anyhow!("Teacher is the class teacher of at least one class"),
                    ["teacher_id"],
                ));
            }
        }
        Profile::Parent(_) | Profile::Admin(_) => {}
    }

    profiles::delete(&mut *conn, profile).await?;

    let delta = StatisticsDelta::for_created(profile.kind(), gender_of(profile)).reversed();
    statistics::apply_delta(conn, delta).await
}

async fn apply_profile_patch(
    conn: &mut PgConnection,
    current: Profile,
    patch: &ProfilePatch,
) -> Result<Profile, AppError> {
    if patch.is_empty() {
        return Ok(current);
    }

    let profile = match (current, patch) {
        (Profile::Student(student), ProfilePatch::Student(p)) => {
            // Enroll first so a missing target class fails before the old
            // class loses its seat.
            if let Some(class_id) = p.class_id.filter(|id| *id != student.class_id) {
                counters::enroll(&mut *conn, class_id).await?;
                counters::unenroll(&mut *conn, student.class_id).await?;
            }
            if let Some(gender) = p.gender {
                statistics::apply_delta(
                    &mut *conn,
                    StatisticsDelta::gender_change(student.gender, gender),
                )
                .await?;
            }
            Profile::Student(profiles::update_student(conn, student.id, p).await?)
        }
        (Profile::Teacher(teacher), ProfilePatch::Teacher(p)) => {
            Profile::Teacher(profiles::update_teacher(conn, teacher.id, p).await?)
        }
        (Profile::Parent(parent), ProfilePatch::Parent(p)) => {
            Profile::Parent(profiles::update_parent(conn, parent.id, p).await?)
        }
        (Profile::Admin(admin), ProfilePatch::Admin(p)) => {
            Profile::Admin(profiles::update_admin(conn, admin.id, p).await?)
        }
        (_, patch) => return Err(not_found(Some(patch.kind()))),
    };

    Ok(profile)
}

async fn ensure_email_available(
    conn: &mut PgConnection,
    email: &Email,
    exclude: Option<UserId>,
) -> Result<(), AppError> {
    if identity::email_taken(conn, email, exclude).await? {
        return Err(email_conflict());
    }
    Ok(())
}

async fn ensure_username_available(
    conn: &mut PgConnection,
    kind: ProfileKind,
    username: &str,
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    if profiles::username_taken(conn, kind, username, exclude).await? {
        return Err(username_conflict());
    }
    Ok(())
}

async fn ensure_parent_code_available(
    conn: &mut PgConnection,
    parent_code: &str,
    exclude: Option<Uuid>,
) -> Result<(), AppError> {
    if profiles::parent_code_taken(conn, parent_code, exclude).await? {
        return Err(parent_code_conflict());
    }
    Ok(())
}

async fn ensure_class_exists(conn: &mut PgConnection, class_id: ClassId) -> Result<(), AppError> {
    if !counters::class_exists(conn, class_id).await? {
        return Err(AppError::not_found(anyhow!("Class not found")));
    }
    Ok(())
}

async fn ensure_new_person_available(
    conn: &mut PgConnection,
    person: &NewPerson,
) -> Result<(), AppError> {
    ensure_email_available(&mut *conn, &person.email, None).await?;

    match &person.profile {
        NewProfile::Student(s) => {
            ensure_username_available(&mut *conn, ProfileKind::Student, &s.username, None).await?;
            ensure_class_exists(conn, s.class_id).await?;
        }
        NewProfile::Teacher(t) => {
            ensure_username_available(conn, ProfileKind::Teacher, &t.username, None).await?;
        }
        NewProfile::Parent(p) => {
            ensure_parent_code_available(conn, &p.parent_code, None).await?;
        }
        NewProfile::Admin(_) => {}
    }
    Ok(())
}

async fn ensure_patch_available(
    conn: &mut PgConnection,
    identity: &Identity,
    profile: &Profile,
    patch: &PersonPatch,
) -> Result<(), AppError> {
    if let Some(email) = &patch.identity.email {
        ensure_email_available(&mut *conn, email, Some(identity.id)).await?;
    }

    let own_id = Some(profile.id());
    match &patch.profile {
        ProfilePatch::Student(p) => {
            if let Some(username) = &p.username {
                ensure_username_available(&mut *conn, ProfileKind::Student, username, own_id)
                    .await?;
            }
            if let Some(class_id) = p.class_id {
                ensure_class_exists(conn, class_id).await?;
            }
        }
        ProfilePatch::Teacher(p) => {
            if let Some(username) = &p.username {
                ensure_username_available(conn, ProfileKind::Teacher, username, own_id).await?;
            }
        }
        ProfilePatch::Parent(p) => {
            if let Some(code) = &p.parent_code {
                ensure_parent_code_available(conn, code, own_id).await?;
            }
        }
        ProfilePatch::Admin(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use schoolhub_core::ErrorKind;
    use schoolhub_models::classes::ClassRecord;
    use schoolhub_models::ids::TeacherId;
    use schoolhub_models::people_input::{
        CreateAdminDto, CreateParentDto, CreateStudentDto, CreateTeacherDto, UpdateStudentDto,
    };
    use schoolhub_models::statistics::Statistics;

    use crate::modules::statistics::service::StatisticsService;

    fn teacher_dto(username: &str, email: &str) -> CreateTeacherDto {
        CreateTeacherDto {
            username: username.into(),
            first_name: "Ada".into(),
            last_name: "Okafor".into(),
            email: email.into(),
            password: "secret123".into(),
            phone: "+2348000000000".into(),
            address: "12 School Road".into(),
            blood_type: "O+".into(),
            birthday: NaiveDate::from_ymd_opt(1985, 3, 14),
            gender: Some(Gender::Female),
            image: "uploads/ada.png".into(),
        }
    }

    fn student_dto(
        username: &str,
        email: &str,
        class_id: ClassId,
        gender: Gender,
    ) -> CreateStudentDto {
        CreateStudentDto {
            username: username.into(),
            first_name: "Tunde".into(),
            last_name: "Bello".into(),
            email: email.into(),
            password: "secret123".into(),
            phone: "+2348011111111".into(),
            address: "3 Market Street".into(),
            blood_type: "A+".into(),
            birthday: NaiveDate::from_ymd_opt(2012, 9, 1),
            gender: Some(gender),
            class_id: Some(class_id),
            image: "uploads/tunde.png".into(),
        }
    }

    async fn create_teacher(pool: &PgPool, username: &str) -> Person {
        let dto = teacher_dto(username, &format!("{}@school.test", username));
        PeopleService::create(pool, NewPerson::try_from(dto).unwrap())
            .await
            .unwrap()
    }

    fn teacher_id(person: &Person) -> TeacherId {
        match &person.profile {
            Profile::Teacher(t) => t.id,
            other => panic!("expected a teacher, got {:?}", other.kind()),
        }
    }

    async fn create_class(pool: &PgPool, name: &str, teacher: TeacherId) -> ClassId {
        sqlx::query_scalar("INSERT INTO classes (name, teacher_id) VALUES ($1, $2) RETURNING id")
            .bind(name)
            .bind(teacher)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn class(pool: &PgPool, id: ClassId) -> ClassRecord {
        sqlx::query_as("SELECT * FROM classes WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn stats(pool: &PgPool) -> Statistics {
        StatisticsService::get(pool).await.unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_student_updates_counters(pool: PgPool) {
        let teacher = create_teacher(&pool, "t.ada").await;
        let class_id = create_class(&pool, "5A", teacher_id(&teacher)).await;

        let dto = student_dto("s.tunde", "Tunde@School.test ", class_id, Gender::Male);
        let person = PeopleService::create(&pool, NewPerson::try_from(dto).unwrap())
            .await
            .unwrap();

        assert_eq!(person.account.email.as_str(), "tunde@school.test");
        assert_eq!(person.account.profile_kind, Some(ProfileKind::Student));
        assert_eq!(person.account.profile_id, Some(person.profile.id()));
        assert_eq!(class(&pool, class_id).await.student_count, 1);

        let stats = stats(&pool).await;
        assert_eq!(stats.total_students, 1);
        assert_eq!(stats.total_boys, 1);
        assert_eq!(stats.total_girls, 0);
        assert_eq!(stats.total_teachers, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_student_in_missing_class_changes_nothing(pool: PgPool) {
        create_teacher(&pool, "t.ada").await;
        let before = stats(&pool).await;

        let dto = student_dto("s.tunde", "tunde@school.test", ClassId::new(), Gender::Male);
        let err = PeopleService::create(&pool, NewPerson::try_from(dto).unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.error.to_string(), "Class not found");

        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users, 1);
        assert_eq!(stats(&pool).await.total_students, before.total_students);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_email_is_conflict(pool: PgPool) {
        create_teacher(&pool, "t.ada").await;

        let dto = teacher_dto("t.other", "T.ADA@school.test");
        let err = PeopleService::create(&pool, NewPerson::try_from(dto).unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.fields, vec!["email".to_string()]);
        assert_eq!(stats(&pool).await.total_teachers, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_parent_code_is_conflict(pool: PgPool) {
        let parent = |email: &str| CreateParentDto {
            name: "Mrs Bello".into(),
            parent_code: "P-001".into(),
            email: email.into(),
            password: "secret123".into(),
            address: "3 Market Street".into(),
            children_names: vec!["Tunde".into()],
            image: None,
        };

        PeopleService::create(&pool, NewPerson::try_from(parent("a@school.test")).unwrap())
            .await
            .unwrap();
        let second = NewPerson::try_from(parent("b@school.test")).unwrap();
        let err = PeopleService::create(&pool, second).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.fields, vec!["parent_code".to_string()]);
        assert_eq!(stats(&pool).await.total_parents, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_class_transfer_moves_one_seat(pool: PgPool) {
        let teacher = create_teacher(&pool, "t.ada").await;
        let a = create_class(&pool, "5A", teacher_id(&teacher)).await;
        let b = create_class(&pool, "5B", teacher_id(&teacher)).await;

        let dto = student_dto("s.tunde", "tunde@school.test", a, Gender::Male);
        let student = PeopleService::create(&pool, NewPerson::try_from(dto).unwrap())
            .await
            .unwrap();

        let patch = PersonPatch::try_from(UpdateStudentDto {
            class_id: Some(b),
            ..Default::default()
        })
        .unwrap();
        let updated = PeopleService::update(&pool, student.account.id, patch)
            .await
            .unwrap();

        match updated.profile {
            Profile::Student(s) => assert_eq!(s.class_id, b),
            other => panic!("expected a student, got {:?}", other.kind()),
        }
        assert_eq!(class(&pool, a).await.student_count, 0);
        assert_eq!(class(&pool, b).await.student_count, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_transfer_to_missing_class_keeps_counts(pool: PgPool) {
        let teacher = create_teacher(&pool, "t.ada").await;
        let a = create_class(&pool, "5A", teacher_id(&teacher)).await;
        let dto = student_dto("s.tunde", "tunde@school.test", a, Gender::Male);
        let student = PeopleService::create(&pool, NewPerson::try_from(dto).unwrap())
            .await
            .unwrap();

        let patch = PersonPatch::try_from(UpdateStudentDto {
            class_id: Some(ClassId::new()),
            first_name: Some("Babatunde".into()),
            ..Default::default()
        })
        .unwrap();
        let err = PeopleService::update(&pool, student.account.id, patch)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(class(&pool, a).await.student_count, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_gender_change_moves_statistics(pool: PgPool) {
        let teacher = create_teacher(&pool, "t.ada").await;
        let a = create_class(&pool, "5A", teacher_id(&teacher)).await;
        let dto = student_dto("s.tunde", "tunde@school.test", a, Gender::Male);
        let student = PeopleService::create(&pool, NewPerson::try_from(dto).unwrap())
            .await
            .unwrap();

        let patch = PersonPatch::try_from(UpdateStudentDto {
            gender: Some(Gender::Female),
            ..Default::default()
        })
        .unwrap();
        PeopleService::update(&pool, student.account.id, patch)
            .await
            .unwrap();

        let stats = stats(&pool).await;
        assert_eq!(stats.total_boys, 0);
        assert_eq!(stats.total_girls, 1);
        assert_eq!(stats.total_students, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_keeps_own_email(pool: PgPool) {
        let teacher = create_teacher(&pool, "t.ada").await;
        let a = create_class(&pool, "5A", teacher_id(&teacher)).await;
        let dto = student_dto("s.tunde", "tunde@school.test", a, Gender::Male);
        let student = PeopleService::create(&pool, NewPerson::try_from(dto).unwrap())
            .await
            .unwrap();

        let patch = PersonPatch::try_from(UpdateStudentDto {
            email: Some("TUNDE@school.test".into()),
            username: Some("s.tunde".into()),
            ..Default::default()
        })
        .unwrap();

        let updated = PeopleService::update(&pool, student.account.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.account.email.as_str(), "tunde@school.test");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_rejects_other_kind(pool: PgPool) {
        let teacher = create_teacher(&pool, "t.ada").await;

        let patch = PersonPatch::try_from(UpdateStudentDto {
            first_name: Some("Ada".into()),
            ..Default::default()
        })
        .unwrap();
        let err = PeopleService::update(&pool, teacher.account.id, patch)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.error.to_string(), "Student not found");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_empty_update_is_validation_error(pool: PgPool) {
        let teacher = create_teacher(&pool, "t.ada").await;
        let patch = PersonPatch::try_from(UpdateStudentDto::default()).unwrap();

        let err = PeopleService::update(&pool, teacher.account.id, patch)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_student_reverses_counters(pool: PgPool) {
        let teacher = create_teacher(&pool, "t.ada").await;
        let a = create_class(&pool, "5A", teacher_id(&teacher)).await;
        let dto = student_dto("s.tunde", "tunde@school.test", a, Gender::Female);
        let student = PeopleService::create(&pool, NewPerson::try_from(dto).unwrap())
            .await
            .unwrap();

        PeopleService::delete(&pool, student.account.id, None)
            .await
            .unwrap();

        assert_eq!(class(&pool, a).await.student_count, 0);
        let stats = stats(&pool).await;
        assert_eq!(stats.total_students, 0);
        assert_eq!(stats.total_girls, 0);

        let err = PeopleService::get(&pool, student.account.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    /// Counter fields only; `updated_at` moves on every write.
    fn counters(stats: &Statistics) -> [i64; 5] {
        [
            stats.total_students,
            stats.total_teachers,
            stats.total_parents,
            stats.total_boys,
            stats.total_girls,
        ]
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_then_recreate_restores_counters(pool: PgPool) {
        let teacher = create_teacher(&pool, "t.ada").await;
        let a = create_class(&pool, "5A", teacher_id(&teacher)).await;
        let empty_seats = class(&pool, a).await.student_count;
        let empty_stats = counters(&stats(&pool).await);

        let dto = || student_dto("s.tunde", "tunde@school.test", a, Gender::Male);
        let student = PeopleService::create(&pool, NewPerson::try_from(dto()).unwrap())
            .await
            .unwrap();
        let enrolled_seats = class(&pool, a).await.student_count;
        let enrolled_stats = counters(&stats(&pool).await);

        PeopleService::delete(&pool, student.account.id, None)
            .await
            .unwrap();
        assert_eq!(class(&pool, a).await.student_count, empty_seats);
        assert_eq!(counters(&stats(&pool).await), empty_stats);

        let again = PeopleService::create(&pool, NewPerson::try_from(dto()).unwrap())
            .await
            .unwrap();
        assert_ne!(again.account.id, student.account.id);
        assert_eq!(again.account.email.as_str(), "tunde@school.test");
        assert_eq!(class(&pool, a).await.student_count, enrolled_seats);
        assert_eq!(counters(&stats(&pool).await), enrolled_stats);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_class_teacher_is_conflict(pool: PgPool) {
        let teacher = create_teacher(&pool, "t.ada").await;
        create_class(&pool, "5A", teacher_id(&teacher)).await;

        let err = PeopleService::delete(&pool, teacher.account.id, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(stats(&pool).await.total_teachers, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_admin_cannot_delete_itself(pool: PgPool) {
        let dto = CreateAdminDto {
            first_name: "Grace".into(),
            last_name: "Eze".into(),
            email: "grace@school.test".into(),
            password: "secret123".into(),
            ..Default::default()
        };
        let admin = PeopleService::create(&pool, NewPerson::try_from(dto).unwrap())
            .await
            .unwrap();

        let err = PeopleService::delete(&pool, admin.account.id, Some(admin.account.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let stats = stats(&pool).await;
        assert_eq!(stats.total_teachers, 0);
        assert_eq!(stats.total_students, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_get_with_expected_kind(pool: PgPool) {
        let teacher = create_teacher(&pool, "t.ada").await;

        let found = PeopleService::get(&pool, teacher.account.id, Some(ProfileKind::Teacher))
            .await
            .unwrap();
        assert_eq!(found.profile.display_name(), "Ada Okafor");

        let err = PeopleService::get(&pool, teacher.account.id, Some(ProfileKind::Parent))
            .await
            .unwrap_err();
        assert_eq!(err.error.to_string(), "Parent not found");
    }
}
