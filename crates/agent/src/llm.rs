use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use freightwatch_core::config::LlmConfig;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model request failed: {0}")]
    Model(String),
    #[error("model returned an unusable response: {0}")]
    Protocol(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Value>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain("user", content)
    }

    /// Echoes an assistant turn back into the conversation, including the
    /// provider-shaped tool call block when one was present.
    pub fn assistant(response: &ChatResponse) -> Self {
        let tool_calls = response.has_tool_calls().then(|| {
            Value::Array(
                response
                    .tool_calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": call.name,
                                "arguments": call.arguments.to_string(),
                            }
                        })
                    })
                    .collect(),
            )
        });

        Self {
            role: "assistant".to_string(),
            content: response.content.clone(),
            tool_call_id: None,
            name: None,
            tool_calls,
        }
    }

    pub fn tool(tool_call_id: &str, name: &str, content: String) -> Self {
        Self {
            role: "tool".to_string(),
            content,
            tool_call_id: Some(tool_call_id.to_string()),
            name: Some(name.to_string()),
            tool_calls: None,
        }
    }

    fn plain(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
            tool_call_id: None,
            name: None,
            tool_calls: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn to_openai_tool_json(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Clone, Debug, Default)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
}

#[derive(Clone, Debug, Default)]
pub struct ChatResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl ChatResponse {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AgentError>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl OpenAiClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| AgentError::Model(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AgentError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });
        if !request.tools.is_empty() {
            body["tools"] = Value::Array(
                request.tools.iter().map(ToolDefinition::to_openai_tool_json).collect(),
            );
        }

        let mut request_builder = self.http.post(&url).json(&body);
        if let Some(api_key) = &self.api_key {
            request_builder = request_builder.bearer_auth(api_key.expose_secret());
        }

        let response = request_builder
            .send()
            .await
            .map_err(|error| AgentError::Model(format!("HTTP request failed: {error}")))?;
        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|error| AgentError::Model(format!("failed to read response body: {error}")))?;

        if !status.is_success() {
            return Err(AgentError::Model(format!(
                "API returned {status}: {}",
                payload["error"]["message"].as_str().unwrap_or("unknown error")
            )));
        }

        if !payload["choices"][0]["message"].is_object() {
            return Err(AgentError::Protocol("response carries no choices[0].message".to_string()));
        }

        Ok(ChatResponse {
            content: extract_content(&payload),
            tool_calls: extract_tool_calls(&payload),
        })
    }
}

fn extract_content(response: &Value) -> String {
    response["choices"][0]["message"]["content"].as_str().unwrap_or_default().to_string()
}

fn extract_tool_calls(response: &Value) -> Vec<ToolCall> {
    let Some(tool_calls) = response["choices"][0]["message"]["tool_calls"].as_array() else {
        return Vec::new();
    };

    tool_calls
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let name = item["function"]["name"].as_str()?.to_string();
            let id = item["id"]
                .as_str()
                .map(|value| value.to_string())
                .unwrap_or_else(|| format!("tool_call_{}", idx + 1));

            let raw_arguments = item["function"]["arguments"].as_str().unwrap_or("{}");
            let arguments = serde_json::from_str::<Value>(raw_arguments)
                .unwrap_or_else(|_| json!({ "raw_arguments": raw_arguments }));

            Some(ToolCall { id, name, arguments })
        })
        .collect()
}
