//! Route handlers for the AI advisor.

use axum::{Json, extract::State, http::StatusCode, response::{IntoResponse, Response}};

use crate::{
    AppState,
    api::{ApiResponse, ok_response},
};

use super::{
    AiError, ChartRequest, SuggestBudgetInput, TextModel, recommend_chart, suggest_budget,
};

fn advisor_unavailable(context: &str) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiResponse::<()>::error(format!(
            "Failed to {context}: no AI model is configured"
        ))),
    )
        .into_response()
}

fn advisor_failed(error: AiError, context: &str) -> Response {
    tracing::error!("could not {context}: {error}");

    (
        StatusCode::BAD_GATEWAY,
        Json(ApiResponse::<()>::error(format!("Failed to {context}"))),
    )
        .into_response()
}

/// A route handler that asks the configured model for a budget suggestion.
///
/// Responds 503 when no model is configured and 502 when the model call
/// fails.
pub async fn suggest_budget_endpoint(
    State(state): State<AppState>,
    Json(input): Json<SuggestBudgetInput>,
) -> Response {
    let Some(advisor) = &state.advisor else {
        return advisor_unavailable("suggest budget");
    };
    let advisor: &dyn TextModel = advisor.as_ref();

    match suggest_budget(advisor, &input).await {
        Ok(output) => ok_response(StatusCode::OK, output),
        Err(error) => advisor_failed(error, "suggest budget"),
    }
}

/// A route handler that asks the configured model which chart fits the given
/// financial data.
///
/// Responds 503 when no model is configured and 502 when the model call
/// fails.
pub async fn suggest_chart_endpoint(
    State(state): State<AppState>,
    Json(request): Json<ChartRequest>,
) -> Response {
    let Some(advisor) = &state.advisor else {
        return advisor_unavailable("recommend chart");
    };
    let advisor: &dyn TextModel = advisor.as_ref();

    match recommend_chart(advisor, &request).await {
        Ok(recommendation) => ok_response(StatusCode::OK, recommendation),
        Err(error) => advisor_failed(error, "recommend chart"),
    }
}

#[cfg(test)]
mod ai_endpoint_tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        AppState,
        ai::{AiError, TextModel},
        build_router,
    };

    struct ScriptedModel(&'static str);

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
            Ok(self.0.to_string())
        }
    }

    fn test_server(advisor: Option<Arc<dyn TextModel>>) -> TestServer {
        let state = AppState::new(Connection::open_in_memory().unwrap(), advisor)
            .expect("Could not create app state");
        TestServer::try_new(build_router(state)).expect("Could not create test server")
    }

    #[tokio::test]
    async fn budget_endpoint_returns_parsed_suggestion() {
        let advisor = ScriptedModel(
            "{\"suggestedBudget\": {\"housing\": 1000, \"food\": 300, \
             \"transportation\": 100, \"utilities\": 100, \"savings\": 300, \
             \"debtRepayment\": 100, \"other\": 100}, \"summary\": \"ok\"}",
        );
        let server = test_server(Some(Arc::new(advisor)));

        let response = server
            .post("/api/ai/budget")
            .json(&json!({
                "income": 2000.0,
                "expenses": [{"category": "Rent", "amount": 1000.0}]
            }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["suggestedBudget"]["housing"], json!(1000.0));
    }

    #[tokio::test]
    async fn chart_endpoint_returns_recommendation() {
        let advisor =
            ScriptedModel("{\"chartType\": \"bar chart\", \"reasoning\": \"categories\"}");
        let server = test_server(Some(Arc::new(advisor)));

        let response = server
            .post("/api/ai/chart")
            .json(&json!({"financialData": "{\"Food\": 120}"}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["chartType"], json!("bar chart"));
    }

    #[tokio::test]
    async fn endpoints_report_503_without_a_model() {
        let server = test_server(None);

        let response = server
            .post("/api/ai/budget")
            .json(&json!({"income": 0.0, "expenses": []}))
            .await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn model_nonsense_reports_502() {
        let server = test_server(Some(Arc::new(ScriptedModel("no json at all"))));

        let response = server
            .post("/api/ai/chart")
            .json(&json!({"financialData": "{}"}))
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
    }
}
