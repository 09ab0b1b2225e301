//! # SchoolHub DB
//!
//! Database pool construction and the transaction primitive every
//! multi-table write goes through.
//!
//! # Example
//!
//! ```ignore
//! use schoolhub_db::{init_db_pool, with_transaction};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//!
//! let id = with_transaction(&pool, move |tx| {
//!     Box::pin(async move {
//!         let id: Uuid = sqlx::query_scalar("INSERT INTO ... RETURNING id")
//!             .fetch_one(&mut **tx)
//!             .await?;
//!         Ok(id)
//!     })
//! })
//! .await?;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use metrics::counter;
use schoolhub_config::DatabaseConfig;
use schoolhub_core::{AppError, ErrorKind};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use tracing::{debug, warn};

pub use sqlx::PgPool;

/// Boxed future returned by a transaction body.
pub type TxFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'c>>;

/// Initializes a PostgreSQL connection pool.
///
/// Every connection gets the configured `statement_timeout`, and acquiring a
/// connection gives up after `acquire_timeout`, so storage calls never wait
/// forever.
///
/// # Errors
///
/// Returns an error when the URL cannot be parsed or the first connection
/// cannot be established.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let options = PgConnectOptions::from_str(&config.url)?.options([(
        "statement_timeout",
        format!("{}ms", config.statement_timeout.as_millis()),
    )]);

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await
}

/// Runs embedded migrations from `./migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Runs `body` inside a database transaction.
///
/// The transaction is committed when the body returns `Ok` and rolled back
/// when it returns `Err`. If the surrounding future is dropped (request
/// timeout or client disconnect) the open transaction is dropped too, which
/// rolls it back. A failed commit is reported as a transaction error because
/// nothing from the body is visible afterwards.
///
/// The body must own what it captures; clone or move values in before
/// calling.
pub async fn with_transaction<T, F>(db: &PgPool, body: F) -> Result<T, AppError>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut Transaction<'static, Postgres>) -> TxFuture<'c, T> + Send,
{
    let mut tx = db.begin().await.map_err(AppError::from)?;

    match body(&mut tx).await {
        Ok(value) => {
            tx.commit().await.map_err(|err| {
                counter!("transactions_total", "outcome" => "commit_failed").increment(1);
                match AppError::from(err) {
                    mapped if mapped.kind == ErrorKind::Internal => {
                        AppError::transaction(mapped.error)
                    }
                    mapped => mapped,
                }
            })?;
            counter!("transactions_total", "outcome" => "committed").increment(1);
            debug!("Transaction committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Transaction rollback failed");
            }
            counter!("transactions_total", "outcome" => "rolled_back").increment(1);
            debug!(kind = %err.kind, "Transaction rolled back");
            Err(err)
        }
    }
}
