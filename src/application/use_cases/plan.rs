use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::plan::Plan,
};

#[async_trait]
pub trait PlanRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Plan>>;
    async fn list(&self, active_only: bool) -> AppResult<Vec<Plan>>;
}

/// Read-only view of the plan catalog. Catalog management lives elsewhere;
/// this service only consumes plans.
#[derive(Clone)]
pub struct PlanUseCases {
    repo: Arc<dyn PlanRepo>,
}

impl PlanUseCases {
    pub fn new(repo: Arc<dyn PlanRepo>) -> Self {
        Self { repo }
    }

    pub async fn list_active(&self) -> AppResult<Vec<Plan>> {
        self.repo.list(true).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Plan> {
        self.repo.get_by_id(id).await?.ok_or(AppError::NotFound)
    }
}
