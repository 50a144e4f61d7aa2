use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::billing::{UserBillingProfile, UserBillingRepo},
    domain::entities::{plan_tier::PlanTier, subscription_status::SubscriptionStatus},
};

const BILLING_COLUMNS: &str = "id AS user_id, plan, credits, subscription_status, updated_at";

#[async_trait]
impl UserBillingRepo for PostgresPersistence {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<UserBillingProfile>> {
        sqlx::query_as::<_, UserBillingProfile>(&format!(
            "SELECT {BILLING_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn credit_paid_plan(
        &self,
        user_id: Uuid,
        plan: PlanTier,
        credits: i32,
    ) -> AppResult<UserBillingProfile> {
        // The increment happens in SQL so concurrent orders for one user cannot
        // overwrite each other's grant.
        sqlx::query_as::<_, UserBillingProfile>(&format!(
            "INSERT INTO users (id, plan, credits, subscription_status, updated_at)
             VALUES ($1, $2, $3, 'active', NOW())
             ON CONFLICT (id) DO UPDATE SET
                plan = EXCLUDED.plan,
                credits = users.credits + EXCLUDED.credits,
                subscription_status = 'active',
                updated_at = NOW()
             RETURNING {BILLING_COLUMNS}"
        ))
        .bind(user_id)
        .bind(plan)
        .bind(credits)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn upsert_subscription(
        &self,
        user_id: Uuid,
        plan: PlanTier,
        status: SubscriptionStatus,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO users (id, plan, credits, subscription_status, updated_at)
             VALUES ($1, $2, 0, $3, NOW())
             ON CONFLICT (id) DO UPDATE SET
                plan = EXCLUDED.plan,
                subscription_status = EXCLUDED.subscription_status,
                updated_at = NOW()",
        )
        .bind(user_id)
        .bind(plan)
        .bind(status)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    async fn update_subscription(
        &self,
        user_id: Uuid,
        plan: PlanTier,
        status: SubscriptionStatus,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET plan = $2, subscription_status = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(plan)
        .bind(status)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
