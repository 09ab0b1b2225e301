use anyhow::anyhow;
use schoolhub_core::{AppError, Paginated, PaginationMeta};
use schoolhub_db::with_transaction;
use schoolhub_models::ids::{ClassId, TeacherId};
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

use crate::modules::classes::model::{
    ClassFilterParams, ClassPatch, ClassRecord, ClassSummary, NewClass,
};

const SUMMARY_SELECT: &str = r#"
    SELECT c.*, t.first_name || ' ' || t.last_name AS teacher_name
    FROM classes c
    JOIN teachers t ON t.id = c.teacher_id
"#;

pub struct ClassService;

impl ClassService {
    /// Creates a class with an empty roster.
    #[instrument(skip(db))]
    pub async fn create(db: &PgPool, class: NewClass) -> Result<ClassRecord, AppError> {
        let mut conn = db.acquire().await?;
        ensure_teacher_exists(&mut conn, class.teacher_id).await?;
        ensure_name_available(&mut conn, &class.name, None).await?;

        let record = sqlx::query_as::<_, ClassRecord>(
            r#"
            INSERT INTO classes (name, teacher_id, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&class.name)
        .bind(class.teacher_id)
        .bind(&class.description)
        .fetch_one(&mut *conn)
        .await?;

        info!(class_id = %record.id, name = %record.name, "Class created");
        Ok(record)
    }

    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: ClassFilterParams,
    ) -> Result<Paginated<ClassSummary>, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM classes WHERE ($1::uuid IS NULL OR teacher_id = $1)",
        )
        .bind(filters.teacher_id)
        .fetch_one(db)
        .await?;

        let sql = format!(
            "{} WHERE ($1::uuid IS NULL OR c.teacher_id = $1) \
             ORDER BY c.created_at DESC, c.id DESC LIMIT $2 OFFSET $3",
            SUMMARY_SELECT
        );
        let classes = sqlx::query_as::<_, ClassSummary>(&sql)
            .bind(filters.teacher_id)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(Paginated {
            data: classes,
            pagination: PaginationMeta::from_params(total, &filters.pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: ClassId) -> Result<ClassSummary, AppError> {
        let sql = format!("{} WHERE c.id = $1", SUMMARY_SELECT);
        sqlx::query_as::<_, ClassSummary>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(class_not_found)
    }

    /// Patches name, class teacher or description. The roster counter is
    /// never touched here.
    #[instrument(skip(db))]
    pub async fn update(
        db: &PgPool,
        id: ClassId,
        patch: ClassPatch,
    ) -> Result<ClassRecord, AppError> {
        if patch.is_empty() {
            return Err(AppError::validation(anyhow!("Nothing to update")));
        }

        let mut conn = db.acquire().await?;
        if let Some(teacher_id) = patch.teacher_id {
            ensure_teacher_exists(&mut conn, teacher_id).await?;
        }
        if let Some(name) = &patch.name {
            ensure_name_available(&mut conn, name, Some(id)).await?;
        }

        let record = sqlx::query_as::<_, ClassRecord>(
            r#"
            UPDATE classes
            SET name = COALESCE($2, name),
                teacher_id = COALESCE($3, teacher_id),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(patch.teacher_id)
        .bind(&patch.description)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(class_not_found)?;

        Ok(record)
    }

    /// Deletes a class that has no enrolled students.
    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: ClassId) -> Result<(), AppError> {
        with_transaction(db, move |tx| {
            Box::pin(async move {
                let enrolled = sqlx::query_scalar::<_, i32>(
                    "SELECT student_count FROM classes WHERE id = $1 FOR UPDATE",
                )
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?
                .ok_or_else(class_not_found)?;

                if enrolled > 0 {
                    return Err(AppError::conflict(
                        anyhow!("Class still has {} enrolled students", enrolled),
                        ["student_count"],
                    ));
                }

                sqlx::query("DELETE FROM classes WHERE id = $1")
                    .bind(id)
                    .execute(&mut **tx)
                    .await?;
                Ok(())
            })
        })
        .await?;

        info!(class_id = %id, "Class deleted");
        Ok(())
    }
}

fn class_not_found() -> AppError {
    AppError::not_found(anyhow!("Class not found"))
}

async fn ensure_teacher_exists(conn: &mut PgConnection, id: TeacherId) -> Result<(), AppError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM teachers WHERE id = $1)")
        .bind(id)
        .fetch_one(conn)
        .await?;
    if !exists {
        return Err(AppError::not_found(anyhow!("Teacher not found")));
    }
    Ok(())
}

async fn ensure_name_available(
    conn: &mut PgConnection,
    name: &str,
    exclude: Option<ClassId>,
) -> Result<(), AppError> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM classes WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2))",
    )
    .bind(name)
    .bind(exclude)
    .fetch_one(conn)
    .await?;
    if taken {
        return Err(AppError::conflict(
            anyhow!("A class named {} already exists", name),
            ["name"],
        ));
    }
    Ok(())
}
