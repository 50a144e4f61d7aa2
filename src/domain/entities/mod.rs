pub mod order;
pub mod payment_status;
pub mod plan_tier;
pub mod subscription_status;
