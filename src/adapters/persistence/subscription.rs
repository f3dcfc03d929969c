use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::subscription::Subscription,
    use_cases::subscription::{SubscriptionProjection, SubscriptionRepo},
};

// `s` is either the subscriptions table or a CTE returning its columns.
const PROJECTION_COLS: &str = r#"
    s.id, s.user_id, s.plan_id, s.start_date, s.end_date, s.status, s.auto_renew, s.created_at,
    p.name AS plan_name, p.price AS plan_price, p.duration_days AS plan_duration_days,
    p.features AS plan_features
"#;

fn row_to_projection(row: &sqlx::postgres::PgRow) -> SubscriptionProjection {
    let plan_id: Uuid = row.get("plan_id");
    let features_json: serde_json::Value = row.get("plan_features");
    let plan_features: Vec<String> = super::parse_json_with_fallback(
        &features_json,
        "features",
        "subscription_plan",
        &plan_id.to_string(),
    );

    SubscriptionProjection {
        id: row.get("id"),
        user_id: row.get("user_id"),
        plan_id,
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        status: row.get("status"),
        auto_renew: row.get("auto_renew"),
        created_at: row.get("created_at"),
        plan_name: row.get("plan_name"),
        plan_price: row.get("plan_price"),
        plan_duration_days: row.get("plan_duration_days"),
        plan_features,
    }
}

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn insert_active(
        &self,
        subscription: &Subscription,
    ) -> AppResult<SubscriptionProjection> {
        // The partial unique index on (user_id) WHERE status = 'active'
        // rejects a second active row; the unique violation surfaces as
        // AppError::Conflict.
        let row = sqlx::query(&format!(
            r#"
            WITH s AS (
                INSERT INTO user_subscriptions
                    (id, user_id, plan_id, start_date, end_date, status, auto_renew,
                     created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING id, user_id, plan_id, start_date, end_date, status, auto_renew, created_at
            )
            SELECT {} FROM s JOIN subscription_plans p ON s.plan_id = p.id
            "#,
            PROJECTION_COLS
        ))
        .bind(subscription.id)
        .bind(subscription.user_id)
        .bind(subscription.plan_id)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(subscription.status)
        .bind(subscription.auto_renew)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_projection(&row))
    }

    async fn get_active_by_user(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<SubscriptionProjection>> {
        // Single probe of the (user_id, status) index. The LIMIT keeps the
        // lookup graceful even if the active-uniqueness invariant were ever
        // violated: the most recently started active row wins.
        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM user_subscriptions s
            JOIN subscription_plans p ON s.plan_id = p.id
            WHERE s.user_id = $1 AND s.status = 'active'
            ORDER BY s.start_date DESC
            LIMIT 1
            "#,
            PROJECTION_COLS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_projection))
    }

    async fn extend_active(
        &self,
        id: Uuid,
        days: i32,
    ) -> AppResult<Option<SubscriptionProjection>> {
        // Conditional on status: a row the sweeper or a cancel got to first
        // matches zero rows and the renewal does not commit.
        let row = sqlx::query(&format!(
            r#"
            WITH s AS (
                UPDATE user_subscriptions
                SET end_date = end_date + make_interval(days => $2), updated_at = now()
                WHERE id = $1 AND status = 'active'
                RETURNING id, user_id, plan_id, start_date, end_date, status, auto_renew, created_at
            )
            SELECT {} FROM s JOIN subscription_plans p ON s.plan_id = p.id
            "#,
            PROJECTION_COLS
        ))
        .bind(id)
        .bind(days)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_projection))
    }

    async fn cancel_active(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<Option<SubscriptionProjection>> {
        let row = sqlx::query(&format!(
            r#"
            WITH s AS (
                UPDATE user_subscriptions
                SET status = 'cancelled', end_date = $2, auto_renew = false, updated_at = now()
                WHERE user_id = $1 AND status = 'active'
                RETURNING id, user_id, plan_id, start_date, end_date, status, auto_renew, created_at
            )
            SELECT {} FROM s JOIN subscription_plans p ON s.plan_id = p.id
            "#,
            PROJECTION_COLS
        ))
        .bind(user_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_projection))
    }

    async fn history_page(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<SubscriptionProjection>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM user_subscriptions s
            JOIN subscription_plans p ON s.plan_id = p.id
            WHERE s.user_id = $1
            ORDER BY s.start_date DESC
            LIMIT $2 OFFSET $3
            "#,
            PROJECTION_COLS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_projection).collect())
    }

    async fn count_by_user(&self, user_id: Uuid) -> AppResult<i64> {
        // Narrow count on purpose: no join, no sort, just the index.
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user_subscriptions WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::from)?;
        Ok(count)
    }

    async fn expire_due(&self, now: DateTime<Utc>, limit: i64) -> AppResult<u64> {
        // Bounded batch over the (end_date, status) index. SKIP LOCKED plus
        // the status re-check make each row a conditional write: rows a
        // concurrent renew/cancel already touched are skipped.
        let result = sqlx::query(
            r#"
            UPDATE user_subscriptions
            SET status = 'expired', updated_at = now()
            WHERE id IN (
                SELECT id FROM user_subscriptions
                WHERE status = 'active' AND end_date <= $1
                ORDER BY end_date
                LIMIT $2
                FOR UPDATE SKIP LOCKED
            )
            AND status = 'active'
            "#,
        )
        .bind(now)
        .bind(limit)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected())
    }
}
