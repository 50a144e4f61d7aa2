pub mod billing;
pub mod customer_identity;
pub mod plan_catalog;
pub mod thumbnail;
