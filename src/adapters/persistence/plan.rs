use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::plan::Plan,
    use_cases::plan::PlanRepo,
};

const SELECT_COLS: &str = r#"
    id, name, description, price, duration_days, features, is_active, created_at, updated_at
"#;

fn row_to_plan(row: &sqlx::postgres::PgRow) -> Plan {
    let id: Uuid = row.get("id");
    let features_json: serde_json::Value = row.get("features");
    let features: Vec<String> =
        super::parse_json_with_fallback(&features_json, "features", "subscription_plan", &id.to_string());

    Plan {
        id,
        name: row.get("name"),
        description: row.get("description"),
        price: row.get("price"),
        duration_days: row.get("duration_days"),
        features,
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl PlanRepo for PostgresPersistence {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Plan>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscription_plans WHERE id = $1",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_plan))
    }

    async fn list(&self, active_only: bool) -> AppResult<Vec<Plan>> {
        let query = if active_only {
            format!(
                "SELECT {} FROM subscription_plans WHERE is_active = true ORDER BY price",
                SELECT_COLS
            )
        } else {
            format!("SELECT {} FROM subscription_plans ORDER BY price", SELECT_COLS)
        };
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_plan).collect())
    }
}
