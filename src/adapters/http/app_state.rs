use std::sync::Arc;

use crate::{
    application::use_cases::{billing::BillingUseCases, thumbnail::ThumbnailUseCases},
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub billing_use_cases: Arc<BillingUseCases>,
    pub thumbnail_use_cases: Arc<ThumbnailUseCases>,
}
