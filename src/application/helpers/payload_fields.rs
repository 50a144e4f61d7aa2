//! Field extraction for billing-provider payloads.
//!
//! The provider sends snake_case keys on the wire, while payloads re-serialized by
//! its SDKs arrive in camelCase. Every logical field is therefore looked up through
//! `FIELD_ALIASES` by `pick`, never by a hard-coded key at the call site.

use serde_json::Value;

use crate::domain::entities::order::{CustomerState, Order, ProviderSubscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadField {
    Id,
    CustomerId,
    Customer,
    ExternalId,
    ProductId,
    Product,
    Items,
    TotalAmount,
    Paid,
    Status,
    ActiveSubscriptions,
}

/// Accepted keys per logical field, in lookup order.
pub const FIELD_ALIASES: &[(PayloadField, &[&str])] = &[
    (PayloadField::Id, &["id"]),
    (PayloadField::CustomerId, &["customer_id", "customerId"]),
    (PayloadField::Customer, &["customer"]),
    (PayloadField::ExternalId, &["external_id", "externalId"]),
    (PayloadField::ProductId, &["product_id", "productId"]),
    (PayloadField::Product, &["product"]),
    (PayloadField::Items, &["items"]),
    (PayloadField::TotalAmount, &["total_amount", "totalAmount"]),
    (PayloadField::Paid, &["paid"]),
    (PayloadField::Status, &["status"]),
    (
        PayloadField::ActiveSubscriptions,
        &["active_subscriptions", "activeSubscriptions"],
    ),
];

pub fn aliases(field: PayloadField) -> &'static [&'static str] {
    FIELD_ALIASES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

/// First non-null value stored under any alias of `field`.
pub fn pick(payload: &Value, field: PayloadField) -> Option<&Value> {
    aliases(field)
        .iter()
        .filter_map(|key| payload.get(*key))
        .find(|value| !value.is_null())
}

/// Like `pick`, but only yields non-empty strings.
pub fn pick_str(payload: &Value, field: PayloadField) -> Option<&str> {
    pick(payload, field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Normalize an order payload. Returns `None` when the order has no id.
pub fn order_from_payload(payload: &Value) -> Option<Order> {
    let id = pick_str(payload, PayloadField::Id)?.to_string();

    let external_customer_id = pick(payload, PayloadField::Customer)
        .and_then(|customer| pick_str(customer, PayloadField::ExternalId))
        .map(str::to_string);

    let product_id = pick_str(payload, PayloadField::ProductId)
        .or_else(|| {
            pick(payload, PayloadField::Items)
                .and_then(Value::as_array)
                .and_then(|items| items.first())
                .and_then(|item| pick_str(item, PayloadField::ProductId))
        })
        .map(str::to_string);

    let total_amount = pick(payload, PayloadField::TotalAmount)
        .and_then(Value::as_i64)
        .unwrap_or(0);

    let paid = pick(payload, PayloadField::Paid)
        .and_then(Value::as_bool)
        .unwrap_or(false)
        || pick_str(payload, PayloadField::Status) == Some("paid");

    Some(Order {
        id,
        customer_id: pick_str(payload, PayloadField::CustomerId).map(str::to_string),
        external_customer_id,
        product_id,
        total_amount,
        paid,
    })
}

/// Normalize a customer state payload. Missing fields become empty values.
pub fn customer_state_from_payload(payload: &Value) -> CustomerState {
    let subscriptions = pick(payload, PayloadField::ActiveSubscriptions)
        .and_then(Value::as_array)
        .map(|subs| subs.iter().map(subscription_from_payload).collect())
        .unwrap_or_default();

    CustomerState {
        external_id: pick_str(payload, PayloadField::ExternalId).map(str::to_string),
        subscriptions,
    }
}

fn subscription_from_payload(payload: &Value) -> ProviderSubscription {
    let product_id = pick_str(payload, PayloadField::ProductId).or_else(|| {
        pick(payload, PayloadField::Product).and_then(|p| pick_str(p, PayloadField::Id))
    });

    ProviderSubscription {
        status: pick_str(payload, PayloadField::Status).map(str::to_string),
        product_id: product_id.map(str::to_string),
    }
}
