use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::domain::entities::order::ProviderSubscription;

/// Lifecycle status of a user's subscription as mirrored from the billing provider.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    AsRefStr,
    Display,
    EnumString,
)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    #[default]
    Inactive,
    Cancelled,
    Expired,
}

impl SubscriptionStatus {
    /// Derive the status from the provider's view of a customer's subscriptions.
    ///
    /// Any live (active or trialing) subscription wins. Otherwise a canceled
    /// subscription means `Cancelled`, no subscriptions at all means `Inactive`
    /// and anything else (unknown provider statuses) degrades to `Expired`.
    pub fn from_provider_subscriptions(subscriptions: &[ProviderSubscription]) -> Self {
        if subscriptions.is_empty() {
            return SubscriptionStatus::Inactive;
        }
        if subscriptions.iter().any(ProviderSubscription::is_live) {
            return SubscriptionStatus::Active;
        }
        if subscriptions.iter().any(ProviderSubscription::is_canceled) {
            return SubscriptionStatus::Cancelled;
        }
        SubscriptionStatus::Expired
    }

    /// Whether `self -> next` is one of the defined lifecycle transitions.
    /// Staying in the same status is always allowed.
    pub fn can_transition_to(&self, next: SubscriptionStatus) -> bool {
        if *self == next || next == SubscriptionStatus::Active {
            return true;
        }
        matches!(
            (self, next),
            (
                SubscriptionStatus::Active,
                SubscriptionStatus::Cancelled | SubscriptionStatus::Expired
            )
        )
    }
}
