use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::billing_provider::{BillingProviderPort, CheckoutRequest},
    application::use_cases::{customer_identity::CustomerIdentityResolver, plan_catalog::PlanCatalog},
    domain::entities::{
        order::{CustomerState, Order},
        payment_status::PaymentStatus,
        plan_tier::PlanTier,
        subscription_status::SubscriptionStatus,
    },
};

// ============================================================================
// Profile Types
// ============================================================================

/// One applied order. Never mutated after insert.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentEntryProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub status: PaymentStatus,
    pub plan: PlanTier,
    pub credits: i32,
    pub polar_order_id: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPaymentEntry {
    pub user_id: Uuid,
    pub amount: i64,
    pub status: PaymentStatus,
    pub plan: PlanTier,
    pub credits: i32,
    pub polar_order_id: String,
}

/// Derived billing view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserBillingProfile {
    pub user_id: Uuid,
    pub plan: PlanTier,
    pub credits: i32,
    pub subscription_status: SubscriptionStatus,
    pub updated_at: Option<NaiveDateTime>,
}

impl UserBillingProfile {
    /// State of a user with no billing row yet.
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            plan: PlanTier::Free,
            credits: 0,
            subscription_status: SubscriptionStatus::Inactive,
            updated_at: None,
        }
    }
}

/// Redirect targets passed to hosted checkout.
#[derive(Debug, Clone, Default)]
pub struct CheckoutUrls {
    pub success_url: Option<String>,
    pub return_url: Option<String>,
}

/// Path taken by `apply_paid_order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    Applied {
        user_id: Uuid,
        plan: PlanTier,
        credits_granted: i32,
    },
    AlreadyApplied,
    Unattributed,
    MissingProduct,
    UnknownProduct,
    StateReadFailed,
    LedgerFailed,
    /// The ledger entry exists but the balance was not updated.
    BalanceUpdateFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub synced: usize,
}

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait PaymentLedgerRepo: Send + Sync {
    /// Insert a ledger entry. A second entry for the same (user, order) pair
    /// fails with `AppError::Conflict`.
    async fn insert(&self, input: &NewPaymentEntry) -> AppResult<PaymentEntryProfile>;

    async fn list_order_ids_for_user(&self, user_id: Uuid) -> AppResult<Vec<String>>;
}

#[async_trait]
pub trait UserBillingRepo: Send + Sync {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<UserBillingProfile>>;

    /// Create or update the row: set `plan`, add `credits` to the balance and
    /// mark the subscription active.
    async fn credit_paid_plan(
        &self,
        user_id: Uuid,
        plan: PlanTier,
        credits: i32,
    ) -> AppResult<UserBillingProfile>;

    /// Create or update plan and status, leaving credits untouched.
    async fn upsert_subscription(
        &self,
        user_id: Uuid,
        plan: PlanTier,
        status: SubscriptionStatus,
    ) -> AppResult<()>;

    /// Update plan and status of an existing row. `AppError::NotFound` if absent.
    async fn update_subscription(
        &self,
        user_id: Uuid,
        plan: PlanTier,
        status: SubscriptionStatus,
    ) -> AppResult<()>;
}

// ============================================================================
// Use Cases
// ============================================================================

pub struct BillingUseCases {
    ledger_repo: Arc<dyn PaymentLedgerRepo>,
    user_billing_repo: Arc<dyn UserBillingRepo>,
    provider: Arc<dyn BillingProviderPort>,
    identity: CustomerIdentityResolver,
    catalog: PlanCatalog,
    checkout_urls: CheckoutUrls,
}

impl BillingUseCases {
    pub fn new(
        ledger_repo: Arc<dyn PaymentLedgerRepo>,
        user_billing_repo: Arc<dyn UserBillingRepo>,
        provider: Arc<dyn BillingProviderPort>,
        catalog: PlanCatalog,
        checkout_urls: CheckoutUrls,
    ) -> Self {
        Self {
            ledger_repo,
            user_billing_repo,
            identity: CustomerIdentityResolver::new(provider.clone()),
            provider,
            catalog,
            checkout_urls,
        }
    }

    /// Apply a paid order to the ledger and the buyer's billing state.
    ///
    /// The ledger insert comes first and acts as the idempotency guard: a
    /// duplicate (user, order) pair means the order was already applied. Every
    /// failure is logged and reported through the returned outcome, never raised.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn apply_paid_order(&self, order: &Order) -> OrderOutcome {
        let Some(user_id) = self.resolve_order_user(order).await else {
            warn!(
                order_id = %order.id,
                customer_id = order.customer_id.as_deref().unwrap_or(""),
                "Paid order could not be attributed to a user"
            );
            return OrderOutcome::Unattributed;
        };

        let Some(product_id) = order.product_id.as_deref() else {
            warn!(order_id = %order.id, user_id = %user_id, "Paid order has no product id");
            return OrderOutcome::MissingProduct;
        };

        let plan = self.catalog.resolve_plan(Some(product_id));
        if !plan.is_paid() {
            warn!(
                order_id = %order.id,
                user_id = %user_id,
                product_id = %product_id,
                "Paid order product is not in the plan catalog"
            );
            return OrderOutcome::UnknownProduct;
        }

        let existing = match self.user_billing_repo.get(user_id).await {
            Ok(existing) => existing,
            Err(err) => {
                error!(order_id = %order.id, user_id = %user_id, error = %err, "Failed to read billing state");
                return OrderOutcome::StateReadFailed;
            }
        };
        let previous_plan = existing.as_ref().map(|s| s.plan).unwrap_or_default();
        let credits = self.catalog.resolve_credit_grant(plan, previous_plan);

        let entry = NewPaymentEntry {
            user_id,
            amount: order.total_amount,
            status: PaymentStatus::Completed,
            plan,
            credits,
            polar_order_id: order.id.clone(),
        };
        match self.ledger_repo.insert(&entry).await {
            Ok(_) => {}
            Err(AppError::Conflict) => {
                info!(order_id = %order.id, user_id = %user_id, "Order already applied");
                return OrderOutcome::AlreadyApplied;
            }
            Err(err) => {
                error!(order_id = %order.id, user_id = %user_id, error = %err, "Failed to record payment");
                return OrderOutcome::LedgerFailed;
            }
        }

        match self
            .user_billing_repo
            .credit_paid_plan(user_id, plan, credits)
            .await
        {
            Ok(state) => {
                info!(
                    order_id = %order.id,
                    user_id = %user_id,
                    plan = %plan,
                    previous_plan = %previous_plan,
                    credits_granted = credits,
                    balance = state.credits,
                    "Order applied"
                );
                OrderOutcome::Applied {
                    user_id,
                    plan,
                    credits_granted: credits,
                }
            }
            Err(err) => {
                error!(
                    order_id = %order.id,
                    user_id = %user_id,
                    credits_granted = credits,
                    error = %err,
                    "Payment recorded but billing state update failed"
                );
                OrderOutcome::BalanceUpdateFailed
            }
        }
    }

    /// Mirror the provider's subscription view onto the user's plan and status.
    #[instrument(skip(self, state))]
    pub async fn apply_customer_state_changed(&self, state: &CustomerState) {
        let Some(user_id) = state.external_id.as_deref().and_then(parse_user_id) else {
            warn!(
                external_id = state.external_id.as_deref().unwrap_or(""),
                "Customer state change without a valid external id"
            );
            return;
        };

        let status = SubscriptionStatus::from_provider_subscriptions(&state.subscriptions);
        let plan = self.catalog.resolve_plan(state.current_product_id());

        if let Ok(Some(current)) = self.user_billing_repo.get(user_id).await {
            if !current.subscription_status.can_transition_to(status) {
                debug!(
                    user_id = %user_id,
                    from = %current.subscription_status,
                    to = %status,
                    "Subscription status change outside the lifecycle"
                );
            }
        }

        if let Err(err) = self
            .user_billing_repo
            .upsert_subscription(user_id, plan, status)
            .await
        {
            warn!(user_id = %user_id, error = %err, "Subscription upsert failed, retrying as update");
            if let Err(err) = self
                .user_billing_repo
                .update_subscription(user_id, plan, status)
                .await
            {
                error!(user_id = %user_id, error = %err, "Failed to update subscription state");
                return;
            }
        }

        info!(user_id = %user_id, plan = %plan, status = %status, "Subscription state updated");
    }

    /// Pull the user's orders from the provider and apply the ones not yet in the ledger.
    ///
    /// Only a failure to list orders is returned as an error.
    #[instrument(skip(self))]
    pub async fn sync_user_orders(&self, user_id: Uuid) -> AppResult<SyncSummary> {
        let orders = self.provider.list_orders(&user_id.to_string()).await?;

        let applied: HashSet<String> = match self.ledger_repo.list_order_ids_for_user(user_id).await
        {
            Ok(ids) => ids.into_iter().collect(),
            Err(err) => {
                // The ledger insert still rejects duplicates.
                warn!(user_id = %user_id, error = %err, "Could not read applied orders");
                HashSet::new()
            }
        };

        let mut synced = 0;
        for mut order in orders {
            if !order.is_reconcilable() || applied.contains(&order.id) {
                continue;
            }
            // Orders were listed by our user id, so it is the external id.
            order
                .external_customer_id
                .get_or_insert_with(|| user_id.to_string());
            self.apply_paid_order(&order).await;
            synced += 1;
        }

        info!(user_id = %user_id, synced, "Order sync finished");
        Ok(SyncSummary { synced })
    }

    /// Start a hosted checkout for a paid plan and return its redirect URL.
    #[instrument(skip(self))]
    pub async fn create_checkout(&self, user_id: Uuid, plan: PlanTier) -> AppResult<String> {
        let product_id = self.catalog.product_id_for(plan).ok_or_else(|| {
            AppError::InvalidInput("A valid paid plan (pro or ultra) is required".into())
        })?;

        let request = CheckoutRequest {
            product_id: product_id.to_string(),
            external_customer_id: user_id.to_string(),
            success_url: self.checkout_urls.success_url.clone(),
            return_url: self.checkout_urls.return_url.clone(),
        };
        let session = self.provider.create_checkout(&request).await?;

        session
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::Provider(format!("Checkout {} has no URL", session.id)))
    }

    pub async fn get_billing_state(&self, user_id: Uuid) -> AppResult<UserBillingProfile> {
        Ok(self
            .user_billing_repo
            .get(user_id)
            .await?
            .unwrap_or_else(|| UserBillingProfile::empty(user_id)))
    }

    async fn resolve_order_user(&self, order: &Order) -> Option<Uuid> {
        let external_id = match order.external_customer_id.as_deref() {
            Some(id) => Some(id.to_string()),
            None => match order.customer_id.as_deref() {
                Some(customer_id) => self.identity.resolve(customer_id).await,
                None => None,
            },
        };
        external_id.as_deref().and_then(parse_user_id)
    }
}

fn parse_user_id(raw: &str) -> Option<Uuid> {
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            warn!(external_id = %raw, "External id is not a user id");
            None
        }
    }
}
