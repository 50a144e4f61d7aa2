use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{app_error::AppResult, domain::entities::order::Order};

// ============================================================================
// Port Types
// ============================================================================

/// Unique identifier for a customer in the billing provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hosted checkout request for a single product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub product_id: String,
    /// Our user id, echoed back by the provider as the customer's external id
    pub external_customer_id: String,
    pub success_url: Option<String>,
    pub return_url: Option<String>,
}

/// Result of creating a checkout session
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    /// URL to redirect the user to. The provider may omit it on failure.
    pub url: Option<String>,
}

// ============================================================================
// Port Trait
// ============================================================================

/// Billing provider operations used by the reconciliation engine.
///
/// # Errors
///
/// Implementations return `AppError::Provider` for non-2xx responses and transport
/// failures. Lookups of missing customers are not errors and yield `Ok(None)`.
#[async_trait]
pub trait BillingProviderPort: Send + Sync {
    /// Create a hosted checkout for one product.
    async fn create_checkout(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession>;

    /// List the most recent orders of the customer whose external id is `external_customer_id`.
    async fn list_orders(&self, external_customer_id: &str) -> AppResult<Vec<Order>>;

    /// Fetch the external id stored on a provider customer.
    async fn get_customer_external_id(&self, customer_id: &CustomerId)
    -> AppResult<Option<String>>;
}
