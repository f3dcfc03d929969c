use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, routes::current_user_id},
    app_error::AppResult,
    use_cases::subscription::{DEFAULT_PAGE, DEFAULT_PER_PAGE},
};

#[derive(Deserialize)]
struct SubscribePayload {
    plan_id: Uuid,
}

#[derive(Deserialize)]
struct HistoryParams {
    page: Option<i64>,
    per_page: Option<i64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscribe", post(subscribe))
        .route("/renew", post(renew))
        .route("/cancel", post(cancel))
        .route("/active", get(active))
        .route("/history", get(history))
}

async fn subscribe(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubscribePayload>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers)?;
    let subscription = app_state
        .subscription_use_cases
        .create(user_id, payload.plan_id)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

async fn renew(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers)?;
    let subscription = app_state.subscription_use_cases.renew(user_id).await?;
    Ok(Json(subscription))
}

async fn cancel(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers)?;
    let subscription = app_state.subscription_use_cases.cancel(user_id).await?;
    Ok(Json(subscription))
}

async fn active(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers)?;
    let subscription = app_state.subscription_use_cases.get_active(user_id).await?;
    Ok(Json(subscription))
}

async fn history(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HistoryParams>,
) -> AppResult<impl IntoResponse> {
    let user_id = current_user_id(&headers)?;
    let page = app_state
        .subscription_use_cases
        .history(
            user_id,
            params.page.unwrap_or(DEFAULT_PAGE),
            params.per_page.unwrap_or(DEFAULT_PER_PAGE),
        )
        .await?;
    Ok(Json(page))
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::json;
    use uuid::Uuid;

    use crate::{
        domain::entities::plan::Plan,
        test_utils::{create_test_plan, test_app_state},
    };

    fn server(plans: Vec<Plan>) -> TestServer {
        let app = test_app_state(plans);
        TestServer::new(crate::adapters::http::routes::router().with_state(app.state)).unwrap()
    }

    fn user_header(user_id: Uuid) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("x-user-id"),
            HeaderValue::from_str(&user_id.to_string()).unwrap(),
        )
    }

    #[tokio::test]
    async fn subscribe_then_fetch_active() {
        let plan = create_test_plan(|_| {});
        let server = server(vec![plan.clone()]);
        let user_id = Uuid::new_v4();
        let (name, value) = user_header(user_id);

        let response = server
            .post("/subscriptions/subscribe")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "plan_id": plan.id }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: serde_json::Value = response.json();
        assert_eq!(created["status"], "active");
        assert_eq!(created["planName"], plan.name);

        let response = server
            .get("/subscriptions/active")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let active: serde_json::Value = response.json();
        assert_eq!(active["id"], created["id"]);
    }

    #[tokio::test]
    async fn second_subscribe_is_a_conflict() {
        let plan = create_test_plan(|_| {});
        let server = server(vec![plan.clone()]);
        let (name, value) = user_header(Uuid::new_v4());

        let first = server
            .post("/subscriptions/subscribe")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "plan_id": plan.id }))
            .await;
        first.assert_status(StatusCode::CREATED);

        let second = server
            .post("/subscriptions/subscribe")
            .add_header(name, value)
            .json(&json!({ "plan_id": plan.id }))
            .await;
        second.assert_status(StatusCode::CONFLICT);
        let body: serde_json::Value = second.json();
        assert_eq!(body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn subscribe_to_unknown_plan_is_400() {
        let server = server(vec![]);
        let (name, value) = user_header(Uuid::new_v4());

        let response = server
            .post("/subscriptions/subscribe")
            .add_header(name, value)
            .json(&json!({ "plan_id": Uuid::new_v4() }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn active_without_subscription_is_404() {
        let server = server(vec![]);
        let (name, value) = user_header(Uuid::new_v4());

        let response = server
            .get("/subscriptions/active")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_identity_header_is_401() {
        let server = server(vec![]);

        let response = server.get("/subscriptions/active").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn cancel_twice_fails_the_second_time() {
        let plan = create_test_plan(|_| {});
        let server = server(vec![plan.clone()]);
        let (name, value) = user_header(Uuid::new_v4());

        server
            .post("/subscriptions/subscribe")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "plan_id": plan.id }))
            .await
            .assert_status(StatusCode::CREATED);

        let first = server
            .post("/subscriptions/cancel")
            .add_header(name.clone(), value.clone())
            .await;
        first.assert_status(StatusCode::OK);
        let body: serde_json::Value = first.json();
        assert_eq!(body["status"], "cancelled");

        let second = server
            .post("/subscriptions/cancel")
            .add_header(name, value)
            .await;
        second.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn renew_pushes_the_end_date_out() {
        let plan = create_test_plan(|p| p.duration_days = 30);
        let server = server(vec![plan.clone()]);
        let (name, value) = user_header(Uuid::new_v4());

        let created = server
            .post("/subscriptions/subscribe")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "plan_id": plan.id }))
            .await;
        created.assert_status(StatusCode::CREATED);
        let created: serde_json::Value = created.json();

        let renewed = server
            .post("/subscriptions/renew")
            .add_header(name, value)
            .await;
        renewed.assert_status(StatusCode::OK);
        let renewed: serde_json::Value = renewed.json();
        assert!(renewed["endDate"].as_str().unwrap() > created["endDate"].as_str().unwrap());
    }

    #[tokio::test]
    async fn history_carries_pagination_metadata() {
        let plan = create_test_plan(|_| {});
        let server = server(vec![plan.clone()]);
        let (name, value) = user_header(Uuid::new_v4());

        server
            .post("/subscriptions/subscribe")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "plan_id": plan.id }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get("/subscriptions/history?page=1&per_page=5")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["total"], 1);
        assert_eq!(body["page"], 1);
        assert_eq!(body["perPage"], 5);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
    }
}
