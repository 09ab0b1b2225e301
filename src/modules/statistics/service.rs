use schoolhub_core::AppError;
use schoolhub_models::statistics::{Statistics, StatisticsDelta};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

pub struct StatisticsService;

impl StatisticsService {
    /// Reads the singleton, creating it on first access.
    #[instrument(skip(db))]
    pub async fn get(db: &PgPool) -> Result<Statistics, AppError> {
        let mut conn = db.acquire().await?;
        ensure_row(&mut conn).await?;

        let stats = sqlx::query_as::<_, Statistics>("SELECT * FROM statistics WHERE id = 1")
            .fetch_one(&mut *conn)
            .await?;
        Ok(stats)
    }
}

/// Creates the singleton row if it is missing. Concurrent callers race on
/// the primary key, never on a read.
pub async fn ensure_row(conn: &mut PgConnection) -> Result<(), AppError> {
    sqlx::query("INSERT INTO statistics (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
        .execute(conn)
        .await?;
    Ok(())
}

/// Applies `delta` relative to the stored values inside the caller's
/// transaction. Counters never drop below zero.
pub async fn apply_delta(conn: &mut PgConnection, delta: StatisticsDelta) -> Result<(), AppError> {
    if delta.is_zero() {
        return Ok(());
    }

    ensure_row(&mut *conn).await?;

    sqlx::query(
        r#"
        UPDATE statistics
        SET total_students = GREATEST(total_students + $1, 0),
            total_teachers = GREATEST(total_teachers + $2, 0),
            total_parents = GREATEST(total_parents + $3, 0),
            total_boys = GREATEST(total_boys + $4, 0),
            total_girls = GREATEST(total_girls + $5, 0),
            updated_at = NOW()
        WHERE id = 1
        "#,
    )
    .bind(delta.students)
    .bind(delta.teachers)
    .bind(delta.parents)
    .bind(delta.boys)
    .bind(delta.girls)
    .execute(conn)
    .await?;

    Ok(())
}
