use std::sync::Arc;

use tracing::{instrument, warn};

use crate::application::ports::billing_provider::{BillingProviderPort, CustomerId};

/// Looks up our user id on a billing-provider customer record.
pub struct CustomerIdentityResolver {
    provider: Arc<dyn BillingProviderPort>,
}

impl CustomerIdentityResolver {
    pub fn new(provider: Arc<dyn BillingProviderPort>) -> Self {
        Self { provider }
    }

    /// Returns `None` for empty ids, unknown customers, customers without an
    /// external id and lookup failures. Failures are logged.
    #[instrument(skip(self))]
    pub async fn resolve(&self, customer_id: &str) -> Option<String> {
        if customer_id.is_empty() {
            return None;
        }

        match self
            .provider
            .get_customer_external_id(&CustomerId::new(customer_id))
            .await
        {
            Ok(external_id) => external_id.filter(|id| !id.is_empty()),
            Err(err) => {
                warn!(customer_id = %customer_id, error = %err, "Customer lookup failed");
                None
            }
        }
    }
}
