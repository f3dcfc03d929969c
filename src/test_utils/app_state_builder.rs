//! Test app state builder for HTTP-level testing.

use std::sync::Arc;

use crate::{
    adapters::http::app_state::AppState,
    domain::entities::plan::Plan,
    infra::config::AppConfig,
    test_utils::{InMemoryPlanRepo, InMemorySubscriptionRepo},
    use_cases::{
        plan::{PlanRepo, PlanUseCases},
        subscription::{SubscriptionRepo, SubscriptionUseCases},
    },
};

pub struct TestApp {
    pub state: AppState,
    pub plan_repo: Arc<InMemoryPlanRepo>,
    pub subscription_repo: Arc<InMemorySubscriptionRepo>,
}

/// An `AppState` wired to in-memory repos seeded with `plans`. The repos
/// are returned alongside so tests can seed rows or inspect state directly.
pub fn test_app_state(plans: Vec<Plan>) -> TestApp {
    let plan_repo = Arc::new(InMemoryPlanRepo::with_plans(plans.clone()));
    let subscription_repo = Arc::new(InMemorySubscriptionRepo::with_plans(plans));

    let plan_use_cases = PlanUseCases::new(plan_repo.clone() as Arc<dyn PlanRepo>);
    let subscription_use_cases = SubscriptionUseCases::new(
        subscription_repo.clone() as Arc<dyn SubscriptionRepo>,
        plan_repo.clone() as Arc<dyn PlanRepo>,
    );

    TestApp {
        state: AppState {
            config: Arc::new(test_config()),
            plan_use_cases: Arc::new(plan_use_cases),
            subscription_use_cases: Arc::new(subscription_use_cases),
        },
        plan_repo,
        subscription_repo,
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://localhost/unused".to_string(),
        cors_origin: "http://localhost:3000".parse().unwrap(),
        db_acquire_timeout_secs: 5,
        sweep_interval_secs: 60,
        sweep_batch_size: 500,
    }
}
