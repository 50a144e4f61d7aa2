use crate::domain::entities::plan_tier::PlanTier;

pub const DEFAULT_PRO_CREDITS: i32 = 100;
pub const DEFAULT_ULTRA_CREDITS: i32 = 300;
pub const DEFAULT_UPGRADE_DELTA_CREDITS: i32 = 200;

/// Credits granted per purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditGrants {
    /// Any pro purchase.
    pub pro: i32,
    /// Ultra purchase from free or ultra.
    pub ultra: i32,
    /// Ultra purchase while on pro.
    pub upgrade_delta: i32,
}

impl Default for CreditGrants {
    fn default() -> Self {
        Self {
            pro: DEFAULT_PRO_CREDITS,
            ultra: DEFAULT_ULTRA_CREDITS,
            upgrade_delta: DEFAULT_UPGRADE_DELTA_CREDITS,
        }
    }
}

/// Maps billing-provider products to plan tiers and credit grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    pub pro_product_id: String,
    pub ultra_product_id: String,
    pub grants: CreditGrants,
}

impl PlanCatalog {
    pub fn new(
        pro_product_id: impl Into<String>,
        ultra_product_id: impl Into<String>,
        grants: CreditGrants,
    ) -> Self {
        Self {
            pro_product_id: pro_product_id.into(),
            ultra_product_id: ultra_product_id.into(),
            grants,
        }
    }

    /// Unknown, absent or empty product ids resolve to `Free`.
    pub fn resolve_plan(&self, product_id: Option<&str>) -> PlanTier {
        match product_id {
            Some(id) if !id.is_empty() && id == self.pro_product_id => PlanTier::Pro,
            Some(id) if !id.is_empty() && id == self.ultra_product_id => PlanTier::Ultra,
            _ => PlanTier::Free,
        }
    }

    pub fn resolve_credit_grant(&self, new_plan: PlanTier, previous_plan: PlanTier) -> i32 {
        match (new_plan, previous_plan) {
            (PlanTier::Free, _) => 0,
            (PlanTier::Pro, _) => self.grants.pro,
            (PlanTier::Ultra, PlanTier::Pro) => self.grants.upgrade_delta,
            (PlanTier::Ultra, _) => self.grants.ultra,
        }
    }

    /// Product to sell for a paid plan. `None` for free or when unconfigured.
    pub fn product_id_for(&self, plan: PlanTier) -> Option<&str> {
        let id = match plan {
            PlanTier::Free => return None,
            PlanTier::Pro => self.pro_product_id.as_str(),
            PlanTier::Ultra => self.ultra_product_id.as_str(),
        };
        (!id.is_empty()).then_some(id)
    }
}
