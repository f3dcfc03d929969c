use std::sync::Arc;

use crate::{
    infra::config::AppConfig,
    use_cases::{plan::PlanUseCases, subscription::SubscriptionUseCases},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub plan_use_cases: Arc<PlanUseCases>,
    pub subscription_use_cases: Arc<SubscriptionUseCases>,
}
