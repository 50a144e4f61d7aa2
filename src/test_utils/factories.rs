//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::{
    application::use_cases::{
        billing::UserBillingProfile,
        plan_catalog::{CreditGrants, PlanCatalog},
    },
    domain::entities::{
        order::Order, plan_tier::PlanTier, subscription_status::SubscriptionStatus,
    },
};

pub const TEST_PRO_PRODUCT_ID: &str = "prod_pro";
pub const TEST_ULTRA_PRODUCT_ID: &str = "prod_ultra";

/// Catalog with the default credit grants.
pub fn test_catalog() -> PlanCatalog {
    PlanCatalog::new(
        TEST_PRO_PRODUCT_ID,
        TEST_ULTRA_PRODUCT_ID,
        CreditGrants::default(),
    )
}

/// Create a paid pro order with no attributed user.
pub fn create_test_order(overrides: impl FnOnce(&mut Order)) -> Order {
    let mut order = Order {
        id: format!("ord_{}", Uuid::new_v4().simple()),
        customer_id: Some("cus_test".to_string()),
        external_customer_id: None,
        product_id: Some(TEST_PRO_PRODUCT_ID.to_string()),
        total_amount: 1900,
        paid: true,
    };
    overrides(&mut order);
    order
}

/// Create a free, inactive billing state.
pub fn create_test_billing_state(
    user_id: Uuid,
    overrides: impl FnOnce(&mut UserBillingProfile),
) -> UserBillingProfile {
    let mut state = UserBillingProfile {
        user_id,
        plan: PlanTier::Free,
        credits: 0,
        subscription_status: SubscriptionStatus::Inactive,
        updated_at: Some(test_datetime()),
    };
    overrides(&mut state);
    state
}

/// Fixed datetime for deterministic tests.
pub fn test_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}
