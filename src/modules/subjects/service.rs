use anyhow::anyhow;
use schoolhub_core::{AppError, Paginated, PaginationMeta, PaginationParams};
use schoolhub_db::with_transaction;
use schoolhub_models::ids::{SubjectId, TeacherId};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{info, instrument};

use crate::modules::subjects::model::{
    NewSubject, Subject, SubjectPatch, SubjectTeacher, SubjectWithTeachers,
};

pub struct SubjectService;

#[derive(FromRow)]
struct SubjectTeacherRow {
    subject_id: SubjectId,
    #[sqlx(flatten)]
    teacher: SubjectTeacher,
}

impl SubjectService {
    /// Creates a subject and links its teachers in the given order.
    #[instrument(skip(db))]
    pub async fn create(db: &PgPool, subject: NewSubject) -> Result<SubjectWithTeachers, AppError> {
        {
            let mut conn = db.acquire().await?;
            ensure_name_available(&mut conn, &subject.name, None).await?;
        }

        let created = with_transaction(db, move |tx| {
            Box::pin(async move {
                ensure_teachers_exist(&mut **tx, &subject.teacher_ids).await?;

                let record = sqlx::query_as::<_, Subject>(
                    "INSERT INTO subjects (name) VALUES ($1) RETURNING *",
                )
                .bind(&subject.name)
                .fetch_one(&mut **tx)
                .await?;

                link_teachers(&mut **tx, record.id, &subject.teacher_ids).await?;
                let teachers = teachers_of(&mut **tx, record.id).await?;

                Ok(SubjectWithTeachers {
                    subject: record,
                    teachers,
                })
            })
        })
        .await?;

        info!(subject_id = %created.subject.id, "Subject created");
        Ok(created)
    }

    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        params: PaginationParams,
    ) -> Result<Paginated<SubjectWithTeachers>, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subjects")
            .fetch_one(db)
            .await?;

        let subjects = sqlx::query_as::<_, Subject>(
            "SELECT * FROM subjects ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(db)
        .await?;

        let ids: Vec<SubjectId> = subjects.iter().map(|s| s.id).collect();
        let rows = sqlx::query_as::<_, SubjectTeacherRow>(
            r#"
            SELECT st.subject_id, t.id, t.first_name || ' ' || t.last_name AS name
            FROM subject_teachers st
            JOIN teachers t ON t.id = st.teacher_id
            WHERE st.subject_id = ANY($1)
            ORDER BY st.subject_id, st.position
            "#,
        )
        .bind(&ids)
        .fetch_all(db)
        .await?;

        let data = subjects
            .into_iter()
            .map(|subject| {
                let teachers = rows
                    .iter()
                    .filter(|row| row.subject_id == subject.id)
                    .map(|row| row.teacher.clone())
                    .collect();
                SubjectWithTeachers { subject, teachers }
            })
            .collect();

        Ok(Paginated {
            data,
            pagination: PaginationMeta::from_params(total, &params),
        })
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: SubjectId) -> Result<SubjectWithTeachers, AppError> {
        let mut conn = db.acquire().await?;

        let subject = sqlx::query_as::<_, Subject>("SELECT * FROM subjects WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(subject_not_found)?;
        let teachers = teachers_of(&mut conn, id).await?;

        Ok(SubjectWithTeachers { subject, teachers })
    }

    /// Renames the subject and/or replaces its teacher set.
    #[instrument(skip(db))]
    pub async fn update(
        db: &PgPool,
        id: SubjectId,
        patch: SubjectPatch,
    ) -> Result<SubjectWithTeachers, AppError> {
        if patch.is_empty() {
            return Err(AppError::validation(anyhow!("Nothing to update")));
        }

        if let Some(name) = &patch.name {
            let mut conn = db.acquire().await?;
            ensure_name_available(&mut conn, name, Some(id)).await?;
        }

        with_transaction(db, move |tx| {
            Box::pin(async move {
                let subject = sqlx::query_as::<_, Subject>(
                    r#"
                    UPDATE subjects
                    SET name = COALESCE($2, name), updated_at = NOW()
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(&patch.name)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(subject_not_found)?;

                if let Some(teacher_ids) = &patch.teacher_ids {
                    ensure_teachers_exist(&mut **tx, teacher_ids).await?;
                    sqlx::query("DELETE FROM subject_teachers WHERE subject_id = $1")
                        .bind(id)
                        .execute(&mut **tx)
                        .await?;
                    link_teachers(&mut **tx, id, teacher_ids).await?;
                }

                let teachers = teachers_of(&mut **tx, id).await?;
                Ok(SubjectWithTeachers { subject, teachers })
            })
        })
        .await
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: SubjectId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(subject_not_found());
        }

        info!(subject_id = %id, "Subject deleted");
        Ok(())
    }
}

fn subject_not_found() -> AppError {
    AppError::not_found(anyhow!("Subject not found"))
}

async fn ensure_name_available(
    conn: &mut PgConnection,
    name: &str,
    exclude: Option<SubjectId>,
) -> Result<(), AppError> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM subjects WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2))",
    )
    .bind(name)
    .bind(exclude)
    .fetch_one(conn)
    .await?;
    if taken {
        return Err(AppError::conflict(
            anyhow!("A subject named {} already exists", name),
            ["name"],
        ));
    }
    Ok(())
}

/// Fails with not found, naming every id that is not a teacher profile.
async fn ensure_teachers_exist(
    conn: &mut PgConnection,
    teacher_ids: &[TeacherId],
) -> Result<(), AppError> {
    let missing = sqlx::query_scalar::<_, TeacherId>(
        r#"
        SELECT req.id
        FROM unnest($1::uuid[]) WITH ORDINALITY AS req(id, ord)
        WHERE NOT EXISTS (SELECT 1 FROM teachers t WHERE t.id = req.id)
        ORDER BY req.ord
        "#,
    )
    .bind(teacher_ids)
    .fetch_all(conn)
    .await?;

    if !missing.is_empty() {
        let listed: Vec<String> = missing.iter().map(ToString::to_string).collect();
        return Err(AppError::not_found(anyhow!(
            "Teachers not found: {}",
            listed.join(", ")
        ))
        .with_fields(["teacher_ids"]));
    }
    Ok(())
}

async fn link_teachers(
    conn: &mut PgConnection,
    subject_id: SubjectId,
    teacher_ids: &[TeacherId],
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO subject_teachers (subject_id, teacher_id, position)
        SELECT $1, req.id, req.ord
        FROM unnest($2::uuid[]) WITH ORDINALITY AS req(id, ord)
        "#,
    )
    .bind(subject_id)
    .bind(teacher_ids)
    .execute(conn)
    .await?;
    Ok(())
}

async fn teachers_of(
    conn: &mut PgConnection,
    subject_id: SubjectId,
) -> Result<Vec<SubjectTeacher>, AppError> {
    let teachers = sqlx::query_as::<_, SubjectTeacher>(
        r#"
        SELECT t.id, t.first_name || ' ' || t.last_name AS name
        FROM subject_teachers st
        JOIN teachers t ON t.id = st.teacher_id
        WHERE st.subject_id = $1
        ORDER BY st.position
        "#,
    )
    .bind(subject_id)
    .fetch_all(conn)
    .await?;
    Ok(teachers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use schoolhub_core::ErrorKind;
    use schoolhub_models::NewPerson;
    use schoolhub_models::kinds::Gender;
    use schoolhub_models::people::Profile;
    use schoolhub_models::people_input::CreateTeacherDto;

    use crate::modules::people::PeopleService;

    async fn teacher(pool: &PgPool, first_name: &str) -> TeacherId {
        let dto = CreateTeacherDto {
            username: first_name.to_lowercase(),
            first_name: first_name.into(),
            last_name: "Okafor".into(),
            email: format!("{}@school.test", first_name.to_lowercase()),
            password: "secret123".into(),
            phone: "080".into(),
            address: "School Road".into(),
            blood_type: "O+".into(),
            birthday: NaiveDate::from_ymd_opt(1985, 3, 14),
            gender: Some(Gender::Female),
            image: "uploads/t.png".into(),
        };
        let person = PeopleService::create(pool, NewPerson::try_from(dto).unwrap())
            .await
            .unwrap();
        match person.profile {
            Profile::Teacher(t) => t.id,
            _ => unreachable!(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_keeps_teacher_order(pool: PgPool) {
        let zainab = teacher(&pool, "Zainab").await;
        let bola = teacher(&pool, "Bola").await;

        let created = SubjectService::create(
            &pool,
            NewSubject {
                name: "Mathematics".into(),
                teacher_ids: vec![zainab, bola],
            },
        )
        .await
        .unwrap();

        let names: Vec<&str> = created.teachers.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Zainab Okafor", "Bola Okafor"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_create_with_unknown_teacher_writes_nothing(pool: PgPool) {
        let bola = teacher(&pool, "Bola").await;
        let ghost = TeacherId::new();

        let err = SubjectService::create(
            &pool,
            NewSubject {
                name: "Mathematics".into(),
                teacher_ids: vec![bola, ghost],
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(err.error.to_string().contains(&ghost.to_string()));

        let page = SubjectService::list(&pool, PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_replaces_teachers(pool: PgPool) {
        let zainab = teacher(&pool, "Zainab").await;
        let bola = teacher(&pool, "Bola").await;
        let created = SubjectService::create(
            &pool,
            NewSubject {
                name: "Mathematics".into(),
                teacher_ids: vec![zainab],
            },
        )
        .await
        .unwrap();

        let updated = SubjectService::update(
            &pool,
            created.subject.id,
            SubjectPatch {
                name: Some("Further Mathematics".into()),
                teacher_ids: Some(vec![bola]),
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.subject.name, "Further Mathematics");
        assert_eq!(updated.teachers.len(), 1);
        assert_eq!(updated.teachers[0].id, bola);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_name_is_conflict(pool: PgPool) {
        let bola = teacher(&pool, "Bola").await;
        let subject = |name: &str| NewSubject {
            name: name.into(),
            teacher_ids: vec![bola],
        };

        SubjectService::create(&pool, subject("Biology")).await.unwrap();
        let err = SubjectService::create(&pool, subject("Biology"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.fields, vec!["name".to_string()]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_removes_links(pool: PgPool) {
        let bola = teacher(&pool, "Bola").await;
        let created = SubjectService::create(
            &pool,
            NewSubject {
                name: "Biology".into(),
                teacher_ids: vec![bola],
            },
        )
        .await
        .unwrap();

        SubjectService::delete(&pool, created.subject.id).await.unwrap();

        let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subject_teachers")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(links, 0);

        let err = SubjectService::delete(&pool, created.subject.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
