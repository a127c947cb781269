//! LLM-powered query assistant.
//!
//! The model is strictly a translator between natural language and the two
//! shipment query capabilities; it never owns data access. The loop here is
//! deliberately small: supply the system instruction, the question, and the
//! registered tools; execute whatever tool calls come back; return the
//! model's first tool-free answer.

pub mod assistant;
pub mod llm;
pub mod shipment_tools;
pub mod tools;

pub use assistant::{QueryAssistant, USAGE_HINT};
pub use llm::{AgentError, ChatRequest, ChatResponse, LlmClient, OpenAiClient};
pub use shipment_tools::{DelayedShipmentsTool, ShipmentStatusTool};
pub use tools::{Tool, ToolRegistry};
