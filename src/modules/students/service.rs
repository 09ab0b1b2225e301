use schoolhub_core::{AppError, Paginated, PaginationMeta};
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::students::model::{StudentFilterParams, StudentSummary};

pub struct StudentService;

impl StudentService {
    /// Students with their login email and class name, newest first.
    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: StudentFilterParams,
    ) -> Result<Paginated<StudentSummary>, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM students WHERE ($1::uuid IS NULL OR class_id = $1)",
        )
        .bind(filters.class_id)
        .fetch_one(db)
        .await?;

        let students = sqlx::query_as::<_, StudentSummary>(
            r#"
            SELECT s.*, u.email, c.name AS class_name
            FROM students s
            JOIN users u ON u.id = s.user_id
            JOIN classes c ON c.id = s.class_id
            WHERE ($1::uuid IS NULL OR s.class_id = $1)
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filters.class_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(Paginated {
            data: students,
            pagination: PaginationMeta::from_params(total, &filters.pagination),
        })
    }
}
