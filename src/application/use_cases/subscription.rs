use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{
        plan::Plan,
        subscription::{Subscription, SubscriptionStatus},
    },
    use_cases::plan::PlanRepo,
};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;

/// Flat read model: one subscription row plus the display fields of its
/// plan. No entity graph is materialized on the read paths.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionProjection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: SubscriptionStatus,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
    pub plan_name: String,
    pub plan_price: Decimal,
    pub plan_duration_days: i32,
    pub plan_features: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionHistoryPage {
    pub items: Vec<SubscriptionProjection>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    /// Insert a fresh active subscription. The store must reject a second
    /// active row for the same user with `AppError::Conflict`; callers do
    /// not pre-check.
    async fn insert_active(
        &self,
        subscription: &Subscription,
    ) -> AppResult<SubscriptionProjection>;

    async fn get_active_by_user(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<SubscriptionProjection>>;

    /// Push `end_date` out by `days`, chained from the current end date.
    /// Commits only if the row is still active; returns `None` otherwise.
    async fn extend_active(
        &self,
        id: Uuid,
        days: i32,
    ) -> AppResult<Option<SubscriptionProjection>>;

    /// Cancel the user's active subscription, closing its period at `at`.
    /// Returns `None` if the user has no active subscription.
    async fn cancel_active(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<Option<SubscriptionProjection>>;

    async fn history_page(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<SubscriptionProjection>>;

    async fn count_by_user(&self, user_id: Uuid) -> AppResult<i64>;

    /// Transition one bounded batch of due active rows to expired. Rows
    /// touched by a concurrent lifecycle operation are skipped, not
    /// overwritten. Returns the number of rows transitioned.
    async fn expire_due(&self, now: DateTime<Utc>, limit: i64) -> AppResult<u64>;
}

#[derive(Clone)]
pub struct SubscriptionUseCases {
    subscription_repo: Arc<dyn SubscriptionRepo>,
    plan_repo: Arc<dyn PlanRepo>,
}

impl SubscriptionUseCases {
    pub fn new(subscription_repo: Arc<dyn SubscriptionRepo>, plan_repo: Arc<dyn PlanRepo>) -> Self {
        Self {
            subscription_repo,
            plan_repo,
        }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, user_id: Uuid, plan_id: Uuid) -> AppResult<SubscriptionProjection> {
        let plan = self.resolve_subscribable_plan(plan_id).await?;

        let subscription = Subscription::new(user_id, &plan, Utc::now());
        let created = self.subscription_repo.insert_active(&subscription).await?;

        tracing::info!(
            subscription_id = %created.id,
            plan = %created.plan_name,
            end_date = %created.end_date,
            "subscription created"
        );
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn renew(&self, user_id: Uuid) -> AppResult<SubscriptionProjection> {
        let current = self
            .subscription_repo
            .get_active_by_user(user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        // The extension only commits against a row that is still active;
        // losing the race to the sweeper or a concurrent cancel is a
        // conflict, never a resurrected row.
        let renewed = self
            .subscription_repo
            .extend_active(current.id, current.plan_duration_days)
            .await?
            .ok_or(AppError::Conflict)?;

        tracing::info!(
            subscription_id = %renewed.id,
            end_date = %renewed.end_date,
            "subscription renewed"
        );
        Ok(renewed)
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, user_id: Uuid) -> AppResult<SubscriptionProjection> {
        let cancelled = self
            .subscription_repo
            .cancel_active(user_id, Utc::now())
            .await?
            .ok_or(AppError::NotFound)?;

        tracing::info!(
            subscription_id = %cancelled.id,
            status = cancelled.status.as_str(),
            "subscription cancelled"
        );
        Ok(cancelled)
    }

    #[instrument(skip(self))]
    pub async fn get_active(&self, user_id: Uuid) -> AppResult<SubscriptionProjection> {
        self.subscription_repo
            .get_active_by_user(user_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn history(
        &self,
        user_id: Uuid,
        page: i64,
        per_page: i64,
    ) -> AppResult<SubscriptionHistoryPage> {
        let page = page.max(DEFAULT_PAGE);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let offset = (page - 1) * per_page;

        // Two queries on purpose: the page fetch, and a narrow count that
        // skips the join/sort entirely.
        let items = self
            .subscription_repo
            .history_page(user_id, per_page, offset)
            .await?;
        let total = self.subscription_repo.count_by_user(user_id).await?;

        let total_pages = if total > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Ok(SubscriptionHistoryPage {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// One bounded sweep batch; the expiry sweeper loop drives this.
    pub async fn expire_due_batch(&self, now: DateTime<Utc>, batch_size: i64) -> AppResult<u64> {
        self.subscription_repo.expire_due(now, batch_size).await
    }

    async fn resolve_subscribable_plan(&self, plan_id: Uuid) -> AppResult<Plan> {
        let plan = self
            .plan_repo
            .get_by_id(plan_id)
            .await?
            .ok_or_else(|| AppError::InvalidInput("Unknown plan".into()))?;
        if !plan.is_active {
            return Err(AppError::InvalidInput(format!(
                "Plan '{}' is not open for subscription",
                plan.name
            )));
        }
        Ok(plan)
    }
}
