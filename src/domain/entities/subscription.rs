use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::plan::Plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    /// Returns true if the subscription currently grants plan entitlements.
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }
}

/// One subscription row. Rows are append-only history: a subscription
/// leaves `Active` exactly once (expiry or cancellation) and never returns.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: SubscriptionStatus,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// A fresh active subscription starting at `now`, spanning the plan's
    /// duration.
    pub fn new(user_id: Uuid, plan: &Plan, now: DateTime<Utc>) -> Self {
        Subscription {
            id: Uuid::new_v4(),
            user_id,
            plan_id: plan.id,
            start_date: now,
            end_date: now + Duration::days(i64::from(plan.duration_days)),
            status: SubscriptionStatus::Active,
            auto_renew: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_plan, test_datetime};

    #[test]
    fn new_subscription_spans_plan_duration() {
        let plan = create_test_plan(|p| p.duration_days = 30);
        let now = test_datetime();

        let subscription = Subscription::new(Uuid::new_v4(), &plan, now);

        assert_eq!(subscription.start_date, now);
        assert_eq!(subscription.end_date, now + Duration::days(30));
        assert_eq!(subscription.status, SubscriptionStatus::Active);
        assert!(subscription.auto_renew);
    }

    #[test]
    fn status_as_str_round_trip() {
        assert_eq!(SubscriptionStatus::Active.as_str(), "active");
        assert_eq!(SubscriptionStatus::Expired.as_str(), "expired");
        assert_eq!(SubscriptionStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn only_active_grants_entitlements() {
        assert!(SubscriptionStatus::Active.is_active());
        assert!(!SubscriptionStatus::Expired.is_active());
        assert!(!SubscriptionStatus::Cancelled.is_active());
    }
}
