use async_trait::async_trait;
use serde_json::Value;

use crate::llm::ToolDefinition;

/// A capability the reasoning loop may invoke by name.
///
/// Execution never faults: implementations catch every backing error, log
/// it with full diagnostic detail, and render it into a readable string —
/// the loop expects text it can reason about, not a typed error.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn parameters(&self) -> Value;
    async fn execute(&self, arguments: Value) -> String;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.push(Box::new(tool));
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect()
    }

    pub async fn dispatch(&self, name: &str, arguments: Value) -> String {
        match self.tools.iter().find(|tool| tool.name() == name) {
            Some(tool) => tool.execute(arguments).await,
            None => {
                tracing::warn!(
                    event_name = "agent.tool.unknown",
                    tool_name = name,
                    "model requested an unregistered tool"
                );
                format!("Unknown tool `{name}`")
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::{Tool, ToolRegistry};

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echoes its argument"
        }

        fn parameters(&self) -> Value {
            json!({ "type": "object", "properties": { "text": { "type": "string" } } })
        }

        async fn execute(&self, arguments: Value) -> String {
            arguments["text"].as_str().unwrap_or_default().to_string()
        }
    }

    #[tokio::test]
    async fn dispatch_routes_to_the_named_tool() {
        let mut registry = ToolRegistry::default();
        registry.register(EchoTool);

        let result = registry.dispatch("echo", json!({ "text": "hello" })).await;
        assert_eq!(result, "hello");
    }

    #[tokio::test]
    async fn dispatch_reports_unknown_tools_as_text() {
        let registry = ToolRegistry::default();
        let result = registry.dispatch("missing", json!({})).await;
        assert_eq!(result, "Unknown tool `missing`");
    }

    #[test]
    fn definitions_preserve_registration_order() {
        let mut registry = ToolRegistry::default();
        registry.register(EchoTool);

        let definitions = registry.definitions();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].name, "echo");
        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 1);
    }
}
