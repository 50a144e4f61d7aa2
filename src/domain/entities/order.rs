//! Billing-provider records as the reconciliation engine sees them, after the
//! wire payload has been normalized.

/// A one-off or recurring order reported by the billing provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Order {
    pub id: String,
    /// Provider-side customer id, used to look up the user when no external id is present.
    pub customer_id: Option<String>,
    /// Our user id as stored on the provider customer (`customer.external_id`).
    pub external_customer_id: Option<String>,
    pub product_id: Option<String>,
    /// Total in the smallest currency unit.
    pub total_amount: i64,
    pub paid: bool,
}

impl Order {
    /// Orders that are paid and name a product are eligible for reconciliation.
    pub fn is_reconcilable(&self) -> bool {
        self.paid && self.product_id.is_some()
    }
}

/// A subscription as listed in a customer state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSubscription {
    pub status: Option<String>,
    pub product_id: Option<String>,
}

impl ProviderSubscription {
    pub fn is_live(&self) -> bool {
        matches!(self.status.as_deref(), Some("active" | "trialing"))
    }

    pub fn is_canceled(&self) -> bool {
        self.status.as_deref() == Some("canceled")
    }
}

/// Snapshot of a customer's subscriptions, sent on `customer.state_changed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerState {
    pub external_id: Option<String>,
    pub subscriptions: Vec<ProviderSubscription>,
}

impl CustomerState {
    /// Product of the first live subscription.
    pub fn current_product_id(&self) -> Option<&str> {
        self.subscriptions
            .iter()
            .find(|s| s.is_live())
            .and_then(|s| s.product_id.as_deref())
    }
}
