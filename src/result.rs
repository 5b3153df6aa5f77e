//! Command result types
//!
//! The structured unit every processed command produces, returned unchanged
//! to the caller. A result is never partially applied: either the downstream
//! mutation fully succeeded or the action is `Error` and nothing was written.

use serde::{Deserialize, Serialize};

use crate::extract::expense::ExpenseBatch;
use crate::extract::vehicle::ExtractedVehicle;

/// What the command resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateVehicle,
    AddGastos,
    Navigate,
    Success,
    Error,
}

/// Which interpreter produced the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessedBy {
    Groq,
    Gemini,
    Local,
    None,
}

/// Structured payload attached to mutating or navigation results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionData {
    Vehicle(ExtractedVehicle),
    Expenses(ExpenseBatch),
    Route(String),
}

/// The unit returned to the caller for every command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ActionData>,
    pub response: String,
    pub confidence: f32,
    pub processed_by: ProcessedBy,
}

impl CommandResult {
    pub fn success(response: impl Into<String>) -> Self {
        Self {
            action: Action::Success,
            data: None,
            response: response.into(),
            confidence: 0.95,
            processed_by: ProcessedBy::Local,
        }
    }

    pub fn error(response: impl Into<String>, confidence: f32) -> Self {
        Self {
            action: Action::Error,
            data: None,
            response: response.into(),
            confidence,
            processed_by: ProcessedBy::None,
        }
    }

    pub fn navigate(route: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            action: Action::Navigate,
            data: Some(ActionData::Route(route.into())),
            response: response.into(),
            confidence: 0.9,
            processed_by: ProcessedBy::Local,
        }
    }

}
