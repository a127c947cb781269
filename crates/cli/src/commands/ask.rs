use serde::Deserialize;
use serde_json::json;

use freightwatch_core::config::{AppConfig, LoadOptions};

use crate::commands::CommandResult;

#[derive(Debug, Deserialize)]
struct InvokeResponse {
    output: String,
}

pub fn run(question: &str, url: Option<&str>) -> CommandResult {
    let endpoint = match url {
        Some(explicit) => explicit.to_string(),
        None => match AppConfig::load(LoadOptions::default()) {
            Ok(config) => default_endpoint(&config),
            Err(error) => {
                return CommandResult::failure(
                    "ask",
                    "config_validation",
                    format!("configuration issue: {error}"),
                    2,
                );
            }
        },
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let client = reqwest::Client::new();
        let response = client
            .post(&endpoint)
            .json(&json!({ "query": question }))
            .send()
            .await
            .map_err(|error| ("server_unreachable", error.to_string(), 4u8))?;

        let status = response.status();
        if !status.is_success() {
            return Err(("server_error", format!("server answered {status}"), 5u8));
        }

        let payload: InvokeResponse = response
            .json()
            .await
            .map_err(|error| ("response_decode", error.to_string(), 5u8))?;
        Ok::<String, (&'static str, String, u8)>(payload.output)
    });

    match result {
        Ok(output) => CommandResult::success("ask", output),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("ask", error_class, message, exit_code)
        }
    }
}

fn default_endpoint(config: &AppConfig) -> String {
    // A wildcard bind address is not a reachable client target.
    let host = match config.server.bind_address.as_str() {
        "0.0.0.0" | "::" => "127.0.0.1",
        other => other,
    };
    format!("http://{host}:{}/invocations", config.server.port)
}
