use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::billing::{NewPaymentEntry, PaymentEntryProfile, PaymentLedgerRepo},
};

const PAYMENT_COLUMNS: &str =
    "id, user_id, amount, status, plan, credits, polar_order_id, created_at";

#[async_trait]
impl PaymentLedgerRepo for PostgresPersistence {
    async fn insert(&self, input: &NewPaymentEntry) -> AppResult<PaymentEntryProfile> {
        sqlx::query_as::<_, PaymentEntryProfile>(&format!(
            "INSERT INTO payments (id, user_id, amount, status, plan, credits, polar_order_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(input.user_id)
        .bind(input.amount)
        .bind(input.status)
        .bind(input.plan)
        .bind(input.credits)
        .bind(&input.polar_order_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn list_order_ids_for_user(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT polar_order_id FROM payments WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)
    }
}
