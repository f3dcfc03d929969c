use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{adapters::http::app_state::AppState, app_error::AppResult, domain::entities::plan::Plan};

#[derive(Serialize)]
struct PlansResponse {
    items: Vec<Plan>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_plans))
        .route("/{id}", get(get_plan))
}

async fn list_plans(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let items = app_state.plan_use_cases.list_active().await?;
    Ok(Json(PlansResponse { items }))
}

async fn get_plan(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let plan = app_state.plan_use_cases.get(id).await?;
    Ok(Json(plan))
}
