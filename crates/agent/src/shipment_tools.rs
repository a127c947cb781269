//! The two shipment query capabilities exposed to the reasoning loop.
//!
//! This is the fault boundary of the query path: directory errors are
//! logged here and converted to readable strings, and a miss is reported
//! as plain text rather than an error.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use freightwatch_db::ShipmentDirectory;

use crate::tools::Tool;

pub struct ShipmentStatusTool {
    directory: Arc<dyn ShipmentDirectory>,
}

impl ShipmentStatusTool {
    pub fn new(directory: Arc<dyn ShipmentDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl Tool for ShipmentStatusTool {
    fn name(&self) -> &'static str {
        "get_shipment_status"
    }

    fn description(&self) -> &'static str {
        "Get the current status and latest event for a shipment."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "reference_no": {
                    "type": "string",
                    "description": "Shipment reference number (e.g. 'SHIP-REF-1001')"
                }
            },
            "required": ["reference_no"]
        })
    }

    async fn execute(&self, arguments: Value) -> String {
        let Some(reference_no) =
            arguments["reference_no"].as_str().map(str::trim).filter(|value| !value.is_empty())
        else {
            return "Missing required argument `reference_no`".to_string();
        };

        match self.directory.get_status(reference_no).await {
            Ok(Some(record)) => serde_json::to_string_pretty(&record)
                .unwrap_or_else(|error| format!("Error retrieving shipment status: {error}")),
            Ok(None) => format!("Shipment {reference_no} not found"),
            Err(error) => {
                tracing::error!(
                    event_name = "agent.tool.shipment_status_failed",
                    reference_no,
                    error = %error,
                    "shipment status lookup failed"
                );
                format!("Error retrieving shipment status: {error}")
            }
        }
    }
}

pub struct DelayedShipmentsTool {
    directory: Arc<dyn ShipmentDirectory>,
}

impl DelayedShipmentsTool {
    pub fn new(directory: Arc<dyn ShipmentDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl Tool for DelayedShipmentsTool {
    fn name(&self) -> &'static str {
        "find_delayed_shipments"
    }

    fn description(&self) -> &'static str {
        "Find all shipments that are at risk of being delayed based on ETA."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _arguments: Value) -> String {
        match self.directory.find_at_risk().await {
            Ok(entries) if entries.is_empty() => "No delayed shipments found".to_string(),
            Ok(entries) => serde_json::to_string_pretty(&entries)
                .unwrap_or_else(|error| format!("Error finding delayed shipments: {error}")),
            Err(error) => {
                tracing::error!(
                    event_name = "agent.tool.delayed_shipments_failed",
                    error = %error,
                    "at-risk shipment scan failed"
                );
                format!("Error finding delayed shipments: {error}")
            }
        }
    }
}
