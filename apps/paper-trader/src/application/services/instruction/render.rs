//! Response template for processed instructions.

use serde::Serialize;
use serde_json::Value;

use super::parser::{Action, extract_section};

/// Outcome of one executed action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    /// Canonical call, e.g. `get_stock_price("MSFT")`.
    pub action: String,
    /// `success`, `no_data` or `error`.
    pub status: OutcomeStatus,
    /// Result payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Explanation on `no_data` and `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// How an action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Action completed.
    Success,
    /// Action completed but the vendor had nothing to return.
    NoData,
    /// Action failed; the failure did not stop later actions.
    Error,
}

impl ActionOutcome {
    /// Successful outcome carrying `data`.
    pub fn success(action: &Action, data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                action: action.to_string(),
                status: OutcomeStatus::Success,
                data: Some(value),
                message: None,
            },
            Err(e) => Self::error(action, format!("Could not encode result: {e}")),
        }
    }

    /// Completed with nothing to show.
    pub fn no_data(action: &Action, message: impl Into<String>) -> Self {
        Self {
            action: action.to_string(),
            status: OutcomeStatus::NoData,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Failed action.
    pub fn error(action: &Action, message: impl Into<String>) -> Self {
        Self {
            action: action.to_string(),
            status: OutcomeStatus::Error,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Render the fixed `actions_taken / results / additional_info` template.
///
/// `results` holds the executed outcomes as JSON. When nothing ran, the
/// assistant's own `<results>` text is used instead. `additional_info`
/// comes from the assistant's reply; a reply with no recognizable sections
/// is passed through there whole.
#[must_use]
pub fn render_response(reply: &str, actions: &[Action], outcomes: &[ActionOutcome]) -> String {
    let actions_taken = if actions.is_empty() {
        "None".to_string()
    } else {
        actions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    };

    let results = if outcomes.is_empty() {
        extract_section(reply, "results")
            .filter(|s| !s.is_empty())
            .unwrap_or("No actions were executed.")
            .to_string()
    } else {
        serde_json::to_string_pretty(outcomes)
            .unwrap_or_else(|e| format!("Could not encode results: {e}"))
    };

    let additional_info = extract_section(reply, "additional_info").map_or_else(
        || {
            if extract_section(reply, "broker_response").is_some() {
                String::new()
            } else {
                reply.trim().to_string()
            }
        },
        ToString::to_string,
    );

    format!(
        "<broker_response>\n\
         <actions_taken>\n{actions_taken}\n</actions_taken>\n\n\
         <results>\n{results}\n</results>\n\n\
         <additional_info>\n{additional_info}\n</additional_info>\n\
         </broker_response>"
    )
}
