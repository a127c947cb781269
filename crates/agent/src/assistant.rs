use std::sync::Arc;

use freightwatch_db::ShipmentDirectory;

use crate::llm::{AgentError, ChatMessage, ChatRequest, LlmClient};
use crate::shipment_tools::{DelayedShipmentsTool, ShipmentStatusTool};
use crate::tools::ToolRegistry;

/// Returned verbatim for blank questions, before any model or directory call.
pub const USAGE_HINT: &str =
    "Please provide a query in the format: {\"query\": \"your question here\"}";

const NO_ANSWER: &str = "The assistant did not produce an answer. Please try rephrasing your question.";

/// Bounds a model that keeps requesting tools without ever answering.
const MAX_TOOL_ROUNDS: usize = 8;

const SYSTEM_PROMPT: &str = "\
You are a logistics tracking assistant with access to a shipment tracking system.

You can help users:
- Track shipment status and location
- Identify delayed shipments

When answering questions:
- Be concise and focus on the most relevant information
- Include reference numbers, locations, and timestamps
- Explain any issues or delays clearly
- Suggest next steps when appropriate";

/// Turns a free-text question into a natural-language answer by driving the
/// model through the registered shipment tools.
pub struct QueryAssistant {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
}

impl QueryAssistant {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry) -> Self {
        Self { llm, tools }
    }

    /// Standard wiring: both shipment tools over one shared directory.
    pub fn with_directory(llm: Arc<dyn LlmClient>, directory: Arc<dyn ShipmentDirectory>) -> Self {
        let mut tools = ToolRegistry::default();
        tools.register(ShipmentStatusTool::new(Arc::clone(&directory)));
        tools.register(DelayedShipmentsTool::new(directory));
        Self::new(llm, tools)
    }

    /// Never fails: blank input yields the usage hint and any fault is
    /// logged and rendered as a readable error string.
    pub async fn answer(&self, question: &str) -> String {
        if question.trim().is_empty() {
            return USAGE_HINT.to_string();
        }

        match self.run(question).await {
            Ok(text) => text,
            Err(error) => {
                tracing::error!(
                    event_name = "agent.query_failed",
                    error = %error,
                    "assistant run failed"
                );
                format!("Query failed: {error}")
            }
        }
    }

    async fn run(&self, question: &str) -> Result<String, AgentError> {
        let definitions = self.tools.definitions();
        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(question)];
        let mut last_content = String::new();

        for _ in 0..MAX_TOOL_ROUNDS {
            let response = self
                .llm
                .chat(ChatRequest { messages: messages.clone(), tools: definitions.clone() })
                .await?;

            if !response.has_tool_calls() {
                return Ok(final_text(response.content));
            }

            last_content = response.content.clone();
            messages.push(ChatMessage::assistant(&response));
            for call in &response.tool_calls {
                let result = self.tools.dispatch(&call.name, call.arguments.clone()).await;
                tracing::debug!(
                    event_name = "agent.tool_executed",
                    tool_name = %call.name,
                    "tool call completed"
                );
                messages.push(ChatMessage::tool(&call.id, &call.name, result));
            }
        }

        tracing::warn!(
            event_name = "agent.tool_round_cap_reached",
            max_rounds = MAX_TOOL_ROUNDS,
            "model kept requesting tools; returning last content"
        );
        Ok(final_text(last_content))
    }
}

fn final_text(content: String) -> String {
    if content.trim().is_empty() {
        NO_ANSWER.to_string()
    } else {
        content
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use freightwatch_db::InMemoryShipmentDirectory;

    use super::{QueryAssistant, MAX_TOOL_ROUNDS, NO_ANSWER, USAGE_HINT};
    use crate::llm::{AgentError, ChatRequest, ChatResponse, LlmClient, ToolCall};

    /// Replays a fixed sequence of responses and records every request.
    struct ScriptedLlm {
        responses: Mutex<Vec<ChatResponse>>,
        requests: Mutex<Vec<ChatRequest>>,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn new(responses: Vec<ChatResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().expect("requests lock").push(request);
            let mut responses = self.responses.lock().expect("responses lock");
            if responses.is_empty() {
                return Err(AgentError::Model("script exhausted".to_string()));
            }
            Ok(responses.remove(0))
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, AgentError> {
            Err(AgentError::Model("connection refused".to_string()))
        }
    }

    fn demo_assistant(llm: Arc<dyn LlmClient>) -> QueryAssistant {
        QueryAssistant::with_directory(llm, Arc::new(InMemoryShipmentDirectory::with_demo_data()))
    }

    fn text_response(content: &str) -> ChatResponse {
        ChatResponse { content: content.to_string(), tool_calls: Vec::new() }
    }

    fn status_call_response(reference_no: &str) -> ChatResponse {
        ChatResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: "call_1".to_string(),
                name: "get_shipment_status".to_string(),
                arguments: json!({ "reference_no": reference_no }),
            }],
        }
    }

    #[tokio::test]
    async fn blank_question_returns_usage_hint_without_model_call() {
        let llm = ScriptedLlm::new(Vec::new());
        let assistant = demo_assistant(llm.clone());

        assert_eq!(assistant.answer("").await, USAGE_HINT);
        assert_eq!(assistant.answer("   ").await, USAGE_HINT);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn tool_free_response_is_returned_directly() {
        let llm = ScriptedLlm::new(vec![text_response("All tracked shipments look fine.")]);
        let assistant = demo_assistant(llm.clone());

        let answer = assistant.answer("How do my shipments look?").await;

        assert_eq!(answer, "All tracked shipments look fine.");
        assert_eq!(llm.call_count(), 1);

        let requests = llm.requests.lock().expect("requests lock");
        let first = &requests[0];
        assert_eq!(first.messages[0].role, "system");
        assert_eq!(first.messages[1].role, "user");
        let tool_names: Vec<&str> =
            first.tools.iter().map(|definition| definition.name.as_str()).collect();
        assert_eq!(tool_names, vec!["get_shipment_status", "find_delayed_shipments"]);
    }

    #[tokio::test]
    async fn tool_round_feeds_directory_output_back_to_the_model() {
        let llm = ScriptedLlm::new(vec![
            status_call_response("SHIP-REF-1003"),
            text_response("SHIP-REF-1003 is delayed at the Port of Singapore."),
        ]);
        let assistant = demo_assistant(llm.clone());

        let answer = assistant.answer("What is the status of SHIP-REF-1003?").await;

        assert_eq!(answer, "SHIP-REF-1003 is delayed at the Port of Singapore.");
        assert_eq!(llm.call_count(), 2);

        let requests = llm.requests.lock().expect("requests lock");
        let follow_up = &requests[1];
        let tool_message = follow_up
            .messages
            .iter()
            .find(|message| message.role == "tool")
            .expect("follow-up request should carry the tool result");
        assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_1"));
        assert!(tool_message.content.contains("AT_RISK"));
        assert!(tool_message.content.contains("Port of Singapore"));
    }

    #[tokio::test]
    async fn model_fault_is_rendered_as_query_failed_text() {
        let assistant = demo_assistant(Arc::new(FailingLlm));

        let answer = assistant.answer("What is the status of SHIP-REF-1001?").await;

        assert!(answer.starts_with("Query failed:"));
        assert!(answer.contains("connection refused"));
    }

    #[tokio::test]
    async fn runaway_tool_requests_stop_at_the_round_cap() {
        let responses =
            (0..MAX_TOOL_ROUNDS).map(|_| status_call_response("SHIP-REF-1001")).collect();
        let llm = ScriptedLlm::new(responses);
        let assistant = demo_assistant(llm.clone());

        let answer = assistant.answer("Keep checking forever").await;

        assert_eq!(answer, NO_ANSWER);
        assert_eq!(llm.call_count(), MAX_TOOL_ROUNDS);
    }

    #[tokio::test]
    async fn empty_final_content_degrades_to_the_no_answer_text() {
        let llm = ScriptedLlm::new(vec![text_response("")]);
        let assistant = demo_assistant(llm);

        let answer = assistant.answer("hello?").await;
        assert_eq!(answer, NO_ANSWER);
    }
}
