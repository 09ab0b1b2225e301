//! Relative updates of the cached class roster size.
//!
//! Every write to `classes.student_count` goes through here, inside the
//! caller's transaction. The update is a single statement so concurrent
//! enrollments never lose an increment.

use anyhow::anyhow;
use schoolhub_core::AppError;
use schoolhub_models::ids::ClassId;
use sqlx::PgConnection;

pub async fn adjust_class_count(
    conn: &mut PgConnection,
    class_id: ClassId,
    delta: i32,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE classes
        SET student_count = GREATEST(student_count + $2, 0),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(class_id)
    .bind(delta)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(anyhow!("Class not found")));
    }
    Ok(())
}

pub async fn enroll(conn: &mut PgConnection, class_id: ClassId) -> Result<(), AppError> {
    adjust_class_count(conn, class_id, 1).await
}

pub async fn unenroll(conn: &mut PgConnection, class_id: ClassId) -> Result<(), AppError> {
    adjust_class_count(conn, class_id, -1).await
}

pub async fn class_exists(conn: &mut PgConnection, class_id: ClassId) -> Result<bool, AppError> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM classes WHERE id = $1)")
        .bind(class_id)
        .fetch_one(conn)
        .await?;
    Ok(exists)
}
