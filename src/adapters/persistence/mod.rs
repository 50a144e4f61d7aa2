use sqlx::PgPool;

use crate::app_error::AppError;

pub mod payment_ledger;
pub mod thumbnail;
pub mod user_billing;

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            // The payments (user_id, polar_order_id) key is the idempotency guard.
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::Conflict,
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::InvalidInput("Referenced record not found".into())
            }
            _ => {
                tracing::error!(error = ?err, "Database error");
                AppError::Database("Database operation failed".into())
            }
        }
    }
}
