//! Test data factories for creating valid test fixtures.
//!
//! Each factory creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::entities::{plan::Plan, subscription::Subscription};

/// Create a test plan with sensible defaults.
pub fn create_test_plan(overrides: impl FnOnce(&mut Plan)) -> Plan {
    let mut plan = Plan {
        id: Uuid::new_v4(),
        name: "Basic".to_string(),
        description: Some("A basic monthly plan".to_string()),
        price: Decimal::new(999, 2),
        duration_days: 30,
        features: vec!["feature-1".to_string(), "feature-2".to_string()],
        is_active: true,
        created_at: test_datetime(),
        updated_at: test_datetime(),
    };
    overrides(&mut plan);
    plan
}

/// Create a test subscription started at the fixed test datetime, so its
/// end date lies in the (test's) past unless overridden.
pub fn create_test_subscription(
    user_id: Uuid,
    plan: &Plan,
    overrides: impl FnOnce(&mut Subscription),
) -> Subscription {
    let mut subscription = Subscription::new(user_id, plan, test_datetime());
    overrides(&mut subscription);
    subscription
}

pub fn test_datetime() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn test_datetime_offset_days(days: i64) -> DateTime<Utc> {
    test_datetime() + Duration::days(days)
}
