//! In-memory mock implementations for the catalog and subscription repos.
//!
//! `InMemorySubscriptionRepo` keeps all rows behind one mutex so the
//! uniqueness and conditional-update semantics of the real store hold
//! atomically under concurrent callers.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::{
        plan::Plan,
        subscription::{Subscription, SubscriptionStatus},
    },
    use_cases::{
        plan::PlanRepo,
        subscription::{SubscriptionProjection, SubscriptionRepo},
    },
};

// ============================================================================
// InMemoryPlanRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryPlanRepo {
    pub plans: Mutex<HashMap<Uuid, Plan>>,
}

impl InMemoryPlanRepo {
    pub fn with_plans(plans: Vec<Plan>) -> Self {
        Self {
            plans: Mutex::new(plans.into_iter().map(|p| (p.id, p)).collect()),
        }
    }
}

#[async_trait]
impl PlanRepo for InMemoryPlanRepo {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Plan>> {
        Ok(self.plans.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self, active_only: bool) -> AppResult<Vec<Plan>> {
        let mut plans: Vec<Plan> = self
            .plans
            .lock()
            .unwrap()
            .values()
            .filter(|p| !active_only || p.is_active)
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.price.cmp(&b.price));
        Ok(plans)
    }
}

// ============================================================================
// InMemorySubscriptionRepo
// ============================================================================

struct SubscriptionStore {
    subscriptions: Vec<Subscription>,
    plans: HashMap<Uuid, Plan>,
}

pub struct InMemorySubscriptionRepo {
    store: Mutex<SubscriptionStore>,
}

impl InMemorySubscriptionRepo {
    pub fn with_plans(plans: Vec<Plan>) -> Self {
        Self {
            store: Mutex::new(SubscriptionStore {
                subscriptions: Vec::new(),
                plans: plans.into_iter().map(|p| (p.id, p)).collect(),
            }),
        }
    }

    /// Seed a row directly, bypassing the lifecycle operations.
    pub fn seed(&self, subscription: Subscription) {
        self.store.lock().unwrap().subscriptions.push(subscription);
    }

    /// Force a row into `Expired` regardless of its end date, as if the
    /// sweeper committed between a reader and its conditional update.
    pub fn force_expire(&self, id: Uuid) {
        let mut store = self.store.lock().unwrap();
        if let Some(subscription) = store.subscriptions.iter_mut().find(|s| s.id == id) {
            subscription.status = SubscriptionStatus::Expired;
        }
    }
}

fn project(store: &SubscriptionStore, subscription: &Subscription) -> SubscriptionProjection {
    let plan = store
        .plans
        .get(&subscription.plan_id)
        .expect("plan seeded for subscription");
    SubscriptionProjection {
        id: subscription.id,
        user_id: subscription.user_id,
        plan_id: subscription.plan_id,
        start_date: subscription.start_date,
        end_date: subscription.end_date,
        status: subscription.status,
        auto_renew: subscription.auto_renew,
        created_at: subscription.created_at,
        plan_name: plan.name.clone(),
        plan_price: plan.price,
        plan_duration_days: plan.duration_days,
        plan_features: plan.features.clone(),
    }
}

#[async_trait]
impl SubscriptionRepo for InMemorySubscriptionRepo {
    async fn insert_active(
        &self,
        subscription: &Subscription,
    ) -> AppResult<SubscriptionProjection> {
        let mut store = self.store.lock().unwrap();
        if store
            .subscriptions
            .iter()
            .any(|s| s.user_id == subscription.user_id && s.status.is_active())
        {
            return Err(AppError::Conflict);
        }
        if !store.plans.contains_key(&subscription.plan_id) {
            return Err(AppError::InvalidInput("Referenced record not found".into()));
        }
        store.subscriptions.push(subscription.clone());
        Ok(project(&store, subscription))
    }

    async fn get_active_by_user(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<SubscriptionProjection>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id && s.status.is_active())
            .max_by_key(|s| s.start_date)
            .map(|s| project(&store, s)))
    }

    async fn extend_active(
        &self,
        id: Uuid,
        days: i32,
    ) -> AppResult<Option<SubscriptionProjection>> {
        let mut store = self.store.lock().unwrap();
        let Some(index) = store
            .subscriptions
            .iter()
            .position(|s| s.id == id && s.status.is_active())
        else {
            return Ok(None);
        };
        store.subscriptions[index].end_date += Duration::days(i64::from(days));
        store.subscriptions[index].updated_at = Utc::now();
        let updated = store.subscriptions[index].clone();
        Ok(Some(project(&store, &updated)))
    }

    async fn cancel_active(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<Option<SubscriptionProjection>> {
        let mut store = self.store.lock().unwrap();
        let Some(index) = store
            .subscriptions
            .iter()
            .position(|s| s.user_id == user_id && s.status.is_active())
        else {
            return Ok(None);
        };
        store.subscriptions[index].status = SubscriptionStatus::Cancelled;
        store.subscriptions[index].end_date = at;
        store.subscriptions[index].auto_renew = false;
        store.subscriptions[index].updated_at = at;
        let cancelled = store.subscriptions[index].clone();
        Ok(Some(project(&store, &cancelled)))
    }

    async fn history_page(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<SubscriptionProjection>> {
        let store = self.store.lock().unwrap();
        let mut rows: Vec<&Subscription> = store
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .collect();
        rows.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|s| project(&store, s))
            .collect())
    }

    async fn count_by_user(&self, user_id: Uuid) -> AppResult<i64> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .count() as i64)
    }

    async fn expire_due(&self, now: DateTime<Utc>, limit: i64) -> AppResult<u64> {
        let mut store = self.store.lock().unwrap();
        let mut expired: u64 = 0;
        for subscription in store.subscriptions.iter_mut() {
            if expired as i64 >= limit {
                break;
            }
            if subscription.status.is_active() && subscription.end_date <= now {
                subscription.status = SubscriptionStatus::Expired;
                subscription.updated_at = now;
                expired += 1;
            }
        }
        Ok(expired)
    }
}
