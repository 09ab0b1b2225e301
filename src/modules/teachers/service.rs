use schoolhub_core::{AppError, Paginated, PaginationMeta, PaginationParams};
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::teachers::model::{TeacherDirectoryEntry, TeacherSummary};

pub struct TeacherService;

impl TeacherService {
    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        params: PaginationParams,
    ) -> Result<Paginated<TeacherSummary>, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM teachers")
            .fetch_one(db)
            .await?;

        let teachers = sqlx::query_as::<_, TeacherSummary>(
            r#"
            SELECT t.*, u.email
            FROM teachers t
            JOIN users u ON u.id = t.user_id
            ORDER BY t.created_at DESC, t.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(db)
        .await?;

        Ok(Paginated {
            data: teachers,
            pagination: PaginationMeta::from_params(total, &params),
        })
    }

    /// Every teacher with the ids needed to reference it, sorted by name.
    #[instrument(skip(db))]
    pub async fn directory(db: &PgPool) -> Result<Vec<TeacherDirectoryEntry>, AppError> {
        let entries = sqlx::query_as::<_, TeacherDirectoryEntry>(
            r#"
            SELECT t.id AS teacher_id,
                   u.id AS user_id,
                   u.email,
                   r.name AS role,
                   t.first_name || ' ' || t.last_name AS name
            FROM teachers t
            JOIN users u ON u.id = t.user_id
            JOIN roles r ON r.id = u.role_id
            ORDER BY t.first_name, t.last_name, t.id
            "#,
        )
        .fetch_all(db)
        .await?;

        Ok(entries)
    }
}
