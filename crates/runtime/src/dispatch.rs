//! Tool dispatch.
//!
//! Every pending call yields exactly one [`ToolOutput`] with the same call
//! id. Nothing raised while handling a single call escapes the dispatcher:
//! malformed payloads, unknown capabilities, invalid arguments, handler
//! errors and handler panics all become error outputs that are fed back to
//! the engine.

use crate::{Arguments, Registry, RegistryError};
use futures_util::FutureExt;
use llm::{ToolCall, ToolOutput};
use serde_json::Value;
use std::panic::AssertUnwindSafe;

impl Registry {
    /// Dispatch a batch of tool calls sequentially, in call-list order.
    pub async fn dispatch_all(&self, calls: &[ToolCall]) -> Vec<ToolOutput> {
        let mut outputs = Vec::with_capacity(calls.len());
        for call in calls {
            outputs.push(self.dispatch(call).await);
        }
        outputs
    }

    /// Dispatch a single tool call.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolOutput {
        let name = call.function.name.as_str();
        tracing::debug!("tool call {} -> {name}({})", call.id, call.function.arguments);

        let args = match parse_arguments(&call.function.arguments) {
            Ok(args) => args,
            Err(reason) => {
                tracing::warn!("malformed arguments for {name}: {reason}");
                return ToolOutput::error(
                    call.id.clone(),
                    format!("Error: could not parse the arguments for `{name}`: {reason}"),
                );
            }
        };

        let capability = match self.resolve(name) {
            Ok(capability) => capability,
            Err(e) => {
                tracing::warn!("{e}");
                return ToolOutput::error(call.id.clone(), format!("Error: {e}"));
            }
        };

        if let Err(e) = capability.validate(&args) {
            tracing::debug!("{e}");
            return ToolOutput::error(call.id.clone(), prompt(capability, &e));
        }

        let handler = capability.handler();
        let output = match AssertUnwindSafe(async { handler(args).await })
            .catch_unwind()
            .await
        {
            Ok(Ok(output)) => ToolOutput::ok(call.id.clone(), output),
            Ok(Err(e)) => {
                tracing::warn!("{name} failed: {e:#}");
                ToolOutput::error(call.id.clone(), format!("Error: {e}"))
            }
            Err(_) => {
                tracing::error!("{name} panicked");
                ToolOutput::error(
                    call.id.clone(),
                    format!("Error: `{name}` failed unexpectedly"),
                )
            }
        };

        tracing::debug!("tool output {}: {}", output.tool_call_id, output.output);
        output
    }
}

/// Parse a raw argument payload into a JSON object.
///
/// An empty payload is an empty object.
pub fn parse_arguments(raw: &str) -> Result<Arguments, String> {
    if raw.trim().is_empty() {
        return Ok(Arguments::new());
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(args)) => Ok(args),
        Ok(other) => Err(format!("expected a JSON object, got `{other}`")),
        Err(e) => Err(e.to_string()),
    }
}

/// Render a validation failure as a prompt for the missing or invalid field.
fn prompt(capability: &crate::Capability, error: &RegistryError) -> String {
    let RegistryError::InvalidArguments { field, reason, .. } = error else {
        return format!("Error: {error}");
    };

    let hint = capability
        .params
        .iter()
        .find(|p| p.name == *field)
        .map(|p| p.description.as_str())
        .filter(|d| !d.is_empty());
    match hint {
        Some(hint) => format!(
            "The `{field}` argument for `{}` is invalid ({reason}). Please ask the user for {}.",
            capability.name,
            hint.to_lowercase().trim_end_matches('.')
        ),
        None => format!(
            "The `{field}` argument for `{}` is invalid ({reason}). Please ask the user for it.",
            capability.name
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_empty_object() {
        assert!(parse_arguments("").unwrap().is_empty());
        assert!(parse_arguments("  ").unwrap().is_empty());
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(parse_arguments("[1, 2]").is_err());
        assert!(parse_arguments("\"Paris\"").is_err());
    }

    #[test]
    fn truncated_payload_is_rejected() {
        assert!(parse_arguments("{\"city\": \"Par").is_err());
    }
}
