//! Races that must be settled by database constraints and relative
//! counter updates rather than by application-side checks.

use chrono::NaiveDate;
use schoolhub::modules::classes::service::ClassService;
use schoolhub::modules::messaging::MessagingService;
use schoolhub::modules::people::PeopleService;
use schoolhub::modules::statistics::service::StatisticsService;
use schoolhub_core::ErrorKind;
use schoolhub_models::NewPerson;
use schoolhub_models::classes::NewClass;
use schoolhub_models::ids::{ClassId, TeacherId, UserId};
use schoolhub_models::kinds::Gender;
use schoolhub_models::people::Profile;
use schoolhub_models::people_input::{CreateParentDto, CreateStudentDto, CreateTeacherDto};
use sqlx::PgPool;
use tokio::task::JoinSet;

fn student(username: &str, email: &str, class_id: ClassId) -> NewPerson {
    NewPerson::try_from(CreateStudentDto {
        username: username.into(),
        first_name: "Chidi".into(),
        last_name: "Nwosu".into(),
        email: email.into(),
        password: "secret123".into(),
        phone: "080".into(),
        address: "3 School Road".into(),
        blood_type: "B+".into(),
        birthday: NaiveDate::from_ymd_opt(2011, 5, 20),
        gender: Some(Gender::Male),
        class_id: Some(class_id),
        image: "uploads/chidi.png".into(),
    })
    .unwrap()
}

fn parent(code: &str, email: &str) -> NewPerson {
    NewPerson::try_from(CreateParentDto {
        name: "Ifeoma Nwosu".into(),
        parent_code: code.into(),
        email: email.into(),
        password: "secret123".into(),
        address: "3 School Road".into(),
        children_names: vec!["Chidi Nwosu".into()],
        image: None,
    })
    .unwrap()
}

async fn class(pool: &PgPool) -> ClassId {
    let teacher = PeopleService::create(
        pool,
        NewPerson::try_from(CreateTeacherDto {
            username: "mrokeke".into(),
            first_name: "Emeka".into(),
            last_name: "Okeke".into(),
            email: "okeke@school.test".into(),
            password: "secret123".into(),
            phone: "080".into(),
            address: "School Road".into(),
            blood_type: "O+".into(),
            birthday: NaiveDate::from_ymd_opt(1979, 2, 2),
            gender: Some(Gender::Male),
            image: "uploads/okeke.png".into(),
        })
        .unwrap(),
    )
    .await
    .unwrap();
    let teacher_id: TeacherId = match teacher.profile {
        Profile::Teacher(t) => t.id,
        _ => unreachable!(),
    };

    ClassService::create(
        pool,
        NewClass {
            name: "Basic 5".into(),
            teacher_id,
            description: String::new(),
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_duplicate_email_admits_one(pool: PgPool) {
    let (first, second) = tokio::join!(
        PeopleService::create(&pool, parent("P-1", "same@school.test")),
        PeopleService::create(&pool, parent("P-2", "same@school.test")),
    );

    let outcomes = [first, second];
    let created = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(created, 1);
    let err = outcomes.into_iter().find_map(Result::err).unwrap();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(err.fields, vec!["email".to_string()]);

    let stats = StatisticsService::get(&pool).await.unwrap();
    assert_eq!(stats.total_parents, 1);
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_enrollment_counts_every_seat(pool: PgPool) {
    let class_id = class(&pool).await;

    let mut tasks = JoinSet::new();
    for n in 0..12 {
        let pool = pool.clone();
        tasks.spawn(async move {
            PeopleService::create(
                &pool,
                student(&format!("chidi{}", n), &format!("chidi{}@school.test", n), class_id),
            )
            .await
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    let summary = ClassService::get(&pool, class_id).await.unwrap();
    assert_eq!(summary.class.student_count, 12);

    let stats = StatisticsService::get(&pool).await.unwrap();
    assert_eq!(stats.total_students, 12);
    assert_eq!(stats.total_boys, 12);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_dm_resolution_creates_one_thread(pool: PgPool) {
    let a = PeopleService::create(&pool, parent("P-A", "a@school.test"))
        .await
        .unwrap()
        .account
        .id;
    let b = PeopleService::create(&pool, parent("P-B", "b@school.test"))
        .await
        .unwrap()
        .account
        .id;

    let (ab, ba, ab_again) = tokio::join!(
        MessagingService::resolve_direct(&pool, a, b),
        MessagingService::resolve_direct(&pool, b, a),
        MessagingService::resolve_direct(&pool, a, b),
    );
    let ids = [ab.unwrap().id, ba.unwrap().id, ab_again.unwrap().id];
    assert!(ids.iter().all(|id| *id == ids[0]));

    let threads: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(threads, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_deletes_release_one_seat(pool: PgPool) {
    let class_id = class(&pool).await;
    let person = PeopleService::create(&pool, student("ada", "ada@school.test", class_id))
        .await
        .unwrap();
    let identity: UserId = person.account.id;

    let (deleted, second_delete) = tokio::join!(
        PeopleService::delete(&pool, identity, None),
        PeopleService::delete(&pool, identity, None),
    );
    assert!(deleted.is_ok() ^ second_delete.is_ok());

    let summary = ClassService::get(&pool, class_id).await.unwrap();
    assert_eq!(summary.class.student_count, 0);
    let stats = StatisticsService::get(&pool).await.unwrap();
    assert_eq!(stats.total_students, 0);
}
