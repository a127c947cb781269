use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use freightwatch_agent::QueryAssistant;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Clone)]
pub struct InvokeState {
    assistant: Arc<QueryAssistant>,
}

/// One recognized field; anything else in the payload is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct InvokeRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    pub output: String,
}

pub fn router(assistant: Arc<QueryAssistant>) -> Router {
    Router::new().route("/invocations", post(invoke)).with_state(InvokeState { assistant })
}

/// Always answers 200 with text: assistant-level faults arrive here already
/// rendered as readable strings.
pub async fn invoke(
    State(state): State<InvokeState>,
    Json(request): Json<InvokeRequest>,
) -> Json<InvokeResponse> {
    info!(event_name = "server.invocation.received", "handling logistics query");

    let question = request.query.unwrap_or_default();
    let output = state.assistant.answer(&question).await;

    Json(InvokeResponse { output })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{extract::State, Json};

    use freightwatch_agent::{
        AgentError, ChatRequest, ChatResponse, LlmClient, QueryAssistant, USAGE_HINT,
    };
    use freightwatch_db::InMemoryShipmentDirectory;

    use super::{invoke, InvokeRequest, InvokeState};

    struct StaticLlm(&'static str);

    #[async_trait]
    impl LlmClient for StaticLlm {
        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, AgentError> {
            Ok(ChatResponse { content: self.0.to_string(), tool_calls: Vec::new() })
        }
    }

    fn state(answer: &'static str) -> InvokeState {
        InvokeState {
            assistant: Arc::new(QueryAssistant::with_directory(
                Arc::new(StaticLlm(answer)),
                Arc::new(InMemoryShipmentDirectory::with_demo_data()),
            )),
        }
    }

    #[tokio::test]
    async fn missing_query_yields_the_usage_hint() {
        let Json(response) =
            invoke(State(state("unused")), Json(InvokeRequest { query: None })).await;
        assert_eq!(response.output, USAGE_HINT);
    }

    #[tokio::test]
    async fn blank_query_yields_the_usage_hint() {
        let Json(response) =
            invoke(State(state("unused")), Json(InvokeRequest { query: Some("  ".to_string()) }))
                .await;
        assert_eq!(response.output, USAGE_HINT);
    }

    #[tokio::test]
    async fn question_is_answered_by_the_assistant() {
        let Json(response) = invoke(
            State(state("SHIP-REF-1002 was delivered six hours ago.")),
            Json(InvokeRequest { query: Some("Where is SHIP-REF-1002?".to_string()) }),
        )
        .await;
        assert_eq!(response.output, "SHIP-REF-1002 was delivered six hours ago.");
    }
}
