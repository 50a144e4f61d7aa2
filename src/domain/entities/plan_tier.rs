use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Subscription tier a user is on. Determines the credit grant of a paid order.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    AsRefStr,
    Display,
    EnumString,
)]
#[sqlx(type_name = "plan_tier", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
    Ultra,
}

impl PlanTier {
    pub fn is_paid(&self) -> bool {
        !matches!(self, PlanTier::Free)
    }
}
