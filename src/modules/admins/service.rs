use schoolhub_core::{AppError, Paginated, PaginationMeta, PaginationParams};
use sqlx::PgPool;
use tracing::instrument;

use crate::modules::admins::model::AdminSummary;

pub struct AdminService;

impl AdminService {
    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        params: PaginationParams,
    ) -> Result<Paginated<AdminSummary>, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admins")
            .fetch_one(db)
            .await?;

        let admins = sqlx::query_as::<_, AdminSummary>(
            r#"
            SELECT a.*, u.email
            FROM admins a
            JOIN users u ON u.id = a.user_id
            ORDER BY a.created_at DESC, a.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(db)
        .await?;

        Ok(Paginated {
            data: admins,
            pagination: PaginationMeta::from_params(total, &params),
        })
    }
}
