//! In-memory mock implementations for billing repositories and the billing provider.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::billing_provider::{
        BillingProviderPort, CheckoutRequest, CheckoutSession, CustomerId,
    },
    application::use_cases::billing::{
        NewPaymentEntry, PaymentEntryProfile, PaymentLedgerRepo, UserBillingProfile,
        UserBillingRepo,
    },
    domain::entities::{
        order::Order, plan_tier::PlanTier, subscription_status::SubscriptionStatus,
    },
};

// ============================================================================
// InMemoryPaymentLedgerRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryPaymentLedgerRepo {
    pub entries: Mutex<HashMap<(Uuid, String), PaymentEntryProfile>>,
    pub fail_inserts: AtomicBool,
}

impl InMemoryPaymentLedgerRepo {
    pub fn entries_for(&self, user_id: Uuid) -> Vec<PaymentEntryProfile> {
        self.entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl PaymentLedgerRepo for InMemoryPaymentLedgerRepo {
    async fn insert(&self, input: &NewPaymentEntry) -> AppResult<PaymentEntryProfile> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated ledger failure".into()));
        }

        let mut entries = self.entries.lock().unwrap();
        let key = (input.user_id, input.polar_order_id.clone());
        if entries.contains_key(&key) {
            return Err(AppError::Conflict);
        }

        let entry = PaymentEntryProfile {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            amount: input.amount,
            status: input.status,
            plan: input.plan,
            credits: input.credits,
            polar_order_id: input.polar_order_id.clone(),
            created_at: Utc::now().naive_utc(),
        };
        entries.insert(key, entry.clone());
        Ok(entry)
    }

    async fn list_order_ids_for_user(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        Ok(self
            .entries_for(user_id)
            .into_iter()
            .map(|e| e.polar_order_id)
            .collect())
    }
}

// ============================================================================
// InMemoryUserBillingRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserBillingRepo {
    pub states: Mutex<HashMap<Uuid, UserBillingProfile>>,
    pub fail_reads: AtomicBool,
    /// Fails `credit_paid_plan` and `upsert_subscription`.
    pub fail_upserts: AtomicBool,
    /// Successful `update_subscription` calls.
    pub updates: AtomicUsize,
}

impl InMemoryUserBillingRepo {
    pub fn insert(&self, state: UserBillingProfile) {
        self.states.lock().unwrap().insert(state.user_id, state);
    }

    pub fn state(&self, user_id: Uuid) -> Option<UserBillingProfile> {
        self.states.lock().unwrap().get(&user_id).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.states.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl UserBillingRepo for InMemoryUserBillingRepo {
    async fn get(&self, user_id: Uuid) -> AppResult<Option<UserBillingProfile>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated read failure".into()));
        }
        Ok(self.state(user_id))
    }

    async fn credit_paid_plan(
        &self,
        user_id: Uuid,
        plan: PlanTier,
        credits: i32,
    ) -> AppResult<UserBillingProfile> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated upsert failure".into()));
        }

        let mut states = self.states.lock().unwrap();
        let state = states
            .entry(user_id)
            .or_insert_with(|| UserBillingProfile::empty(user_id));
        state.plan = plan;
        state.credits += credits;
        state.subscription_status = SubscriptionStatus::Active;
        state.updated_at = Some(Utc::now().naive_utc());
        Ok(state.clone())
    }

    async fn upsert_subscription(
        &self,
        user_id: Uuid,
        plan: PlanTier,
        status: SubscriptionStatus,
    ) -> AppResult<()> {
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(AppError::Database("simulated upsert failure".into()));
        }

        let mut states = self.states.lock().unwrap();
        let state = states
            .entry(user_id)
            .or_insert_with(|| UserBillingProfile::empty(user_id));
        state.plan = plan;
        state.subscription_status = status;
        state.updated_at = Some(Utc::now().naive_utc());
        Ok(())
    }

    async fn update_subscription(
        &self,
        user_id: Uuid,
        plan: PlanTier,
        status: SubscriptionStatus,
    ) -> AppResult<()> {
        let mut states = self.states.lock().unwrap();
        let state = states.get_mut(&user_id).ok_or(AppError::NotFound)?;
        state.plan = plan;
        state.subscription_status = status;
        state.updated_at = Some(Utc::now().naive_utc());
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// MockBillingProvider
// ============================================================================

pub struct MockBillingProvider {
    /// customer id -> external id
    pub customers: Mutex<HashMap<String, String>>,
    /// external customer id -> orders
    pub orders: Mutex<HashMap<String, Vec<Order>>>,
    pub checkouts: Mutex<Vec<CheckoutRequest>>,
    pub checkout_url: Mutex<Option<String>>,
    pub customer_lookups: AtomicUsize,
    pub fail_customer_lookup: AtomicBool,
    pub fail_list_orders: AtomicBool,
}

impl Default for MockBillingProvider {
    fn default() -> Self {
        Self {
            customers: Mutex::new(HashMap::new()),
            orders: Mutex::new(HashMap::new()),
            checkouts: Mutex::new(vec![]),
            checkout_url: Mutex::new(Some("https://polar.test/checkout/chk_1".to_string())),
            customer_lookups: AtomicUsize::new(0),
            fail_customer_lookup: AtomicBool::new(false),
            fail_list_orders: AtomicBool::new(false),
        }
    }
}

impl MockBillingProvider {
    pub fn with_customer(self, customer_id: &str, external_id: &str) -> Self {
        self.customers
            .lock()
            .unwrap()
            .insert(customer_id.to_string(), external_id.to_string());
        self
    }

    pub fn with_orders(self, external_customer_id: &str, orders: Vec<Order>) -> Self {
        self.orders
            .lock()
            .unwrap()
            .insert(external_customer_id.to_string(), orders);
        self
    }
}

#[async_trait]
impl BillingProviderPort for MockBillingProvider {
    async fn create_checkout(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession> {
        self.checkouts.lock().unwrap().push(request.clone());
        Ok(CheckoutSession {
            id: "chk_1".to_string(),
            url: self.checkout_url.lock().unwrap().clone(),
        })
    }

    async fn list_orders(&self, external_customer_id: &str) -> AppResult<Vec<Order>> {
        if self.fail_list_orders.load(Ordering::SeqCst) {
            return Err(AppError::Provider("orders request failed with 500".into()));
        }
        Ok(self
            .orders
            .lock()
            .unwrap()
            .get(external_customer_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_customer_external_id(
        &self,
        customer_id: &CustomerId,
    ) -> AppResult<Option<String>> {
        self.customer_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_customer_lookup.load(Ordering::SeqCst) {
            return Err(AppError::Provider("customer request failed with 500".into()));
        }
        Ok(self
            .customers
            .lock()
            .unwrap()
            .get(customer_id.as_str())
            .cloned())
    }
}
