use sqlx::PgPool;

use crate::app_error::AppError;

pub mod plan;
pub mod subscription;

const MAX_JSON_LOG_LEN: usize = 200;

/// Parse a JSONB column into the target type, logging a warning and
/// falling back to the default on corruption. SQL NULL is a valid empty
/// state and stays silent.
pub fn parse_json_with_fallback<T: serde::de::DeserializeOwned + Default>(
    json: &serde_json::Value,
    field_name: &str,
    entity_type: &str,
    entity_id: &str,
) -> T {
    if json.is_null() {
        return T::default();
    }

    serde_json::from_value(json.clone()).unwrap_or_else(|err| {
        let raw_str = json.to_string();
        let truncated = if raw_str.len() > MAX_JSON_LOG_LEN {
            format!("{}...", &raw_str[..MAX_JSON_LOG_LEN])
        } else {
            raw_str
        };

        tracing::warn!(
            field = field_name,
            entity_type = entity_type,
            entity_id = entity_id,
            raw_json = %truncated,
            error = %err,
            "Failed to parse JSON column, using default value"
        );
        T::default()
    })
}

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                // The only unique constraint a write here can trip is the
                // one-active-subscription-per-user partial index.
                AppError::Conflict
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::InvalidInput("Referenced record not found".into())
            }
            _ => {
                tracing::error!(error = ?err, "Database error");
                AppError::Database("Database operation failed".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_json_valid_feature_array() {
        let json = serde_json::json!(["priority-support", "extra-seats"]);
        let result: Vec<String> = parse_json_with_fallback(&json, "features", "plan", "123");
        assert_eq!(result, vec!["priority-support", "extra-seats"]);
    }

    #[test]
    fn parse_json_sql_null_is_an_empty_set() {
        let json = serde_json::Value::Null;
        let result: Vec<String> = parse_json_with_fallback(&json, "features", "plan", "123");
        assert!(result.is_empty());
    }

    #[test]
    fn parse_json_type_mismatch_falls_back_to_default() {
        let json = serde_json::json!({"key": "value"});
        let result: Vec<String> = parse_json_with_fallback(&json, "features", "plan", "123");
        assert!(result.is_empty());
    }
}
