//! Queries against the `users` table.

use schoolhub_core::AppError;
use schoolhub_models::Email;
use schoolhub_models::ids::{RoleId, UserId};
use schoolhub_models::kinds::ProfileKind;
use schoolhub_models::people::Identity;
use sqlx::PgConnection;
use uuid::Uuid;

pub async fn find_by_id(conn: &mut PgConnection, id: UserId) -> Result<Option<Identity>, AppError> {
    let identity = sqlx::query_as::<_, Identity>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(identity)
}

/// Loads and row-locks an identity for the rest of the transaction.
pub async fn lock_by_id(conn: &mut PgConnection, id: UserId) -> Result<Option<Identity>, AppError> {
    let identity = sqlx::query_as::<_, Identity>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(identity)
}

pub async fn find_by_email(
    conn: &mut PgConnection,
    email: &Email,
) -> Result<Option<Identity>, AppError> {
    let identity = sqlx::query_as::<_, Identity>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(conn)
        .await?;
    Ok(identity)
}

pub async fn email_taken(
    conn: &mut PgConnection,
    email: &Email,
    exclude: Option<UserId>,
) -> Result<bool, AppError> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2))",
    )
    .bind(email)
    .bind(exclude)
    .fetch_one(conn)
    .await?;
    Ok(taken)
}

pub async fn insert(
    conn: &mut PgConnection,
    email: &Email,
    password_hash: &str,
    role_id: RoleId,
) -> Result<Identity, AppError> {
    let identity = sqlx::query_as::<_, Identity>(
        "INSERT INTO users (email, password, role_id) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(email)
    .bind(password_hash)
    .bind(role_id)
    .fetch_one(conn)
    .await?;
    Ok(identity)
}

/// Back-fills the polymorphic profile reference.
pub async fn set_profile_ref(
    conn: &mut PgConnection,
    id: UserId,
    kind: ProfileKind,
    profile_id: Uuid,
) -> Result<Identity, AppError> {
    let identity = sqlx::query_as::<_, Identity>(
        r#"
        UPDATE users
        SET profile_kind = $2, profile_id = $3, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(kind)
    .bind(profile_id)
    .fetch_one(conn)
    .await?;
    Ok(identity)
}

/// Applies a new email and/or password hash. `None` leaves the column as is.
pub async fn update_credentials(
    conn: &mut PgConnection,
    id: UserId,
    email: Option<&Email>,
    password_hash: Option<&str>,
) -> Result<Identity, AppError> {
    let identity = sqlx::query_as::<_, Identity>(
        r#"
        UPDATE users
        SET email = COALESCE($2, email),
            password = COALESCE($3, password),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .fetch_one(conn)
    .await?;
    Ok(identity)
}

pub async fn delete(conn: &mut PgConnection, id: UserId) -> Result<(), AppError> {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
