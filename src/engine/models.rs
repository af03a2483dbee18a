//! Shared data types exchanged with the hosting UI: events, moderator prompts
//! and terminal outcomes.

use serde::{Deserialize, Serialize};

/// A notable thing that happened during a transition. The host renders these;
/// the engine only produces them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_type: String,
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Event {
    pub fn new(event_type: &str, player: Option<&str>, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            player: player.map(str::to_string),
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Text,
    Bool,
    Select,
}

/// A question for the moderator. The engine never blocks on it: the game sits
/// in the `Special` sub-state until `resolve_decision` is called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub title: String,
    pub message: String,
    pub kind: PromptKind,
    #[serde(default)]
    pub extras: Option<String>,
    #[serde(default)]
    pub confirm_label: Option<String>,
    #[serde(default)]
    pub cancel_label: Option<String>,
    #[serde(default)]
    pub select_options: Vec<String>,
}

impl Prompt {
    pub fn boolean(title: &str, message: String, confirm: &str, cancel: &str) -> Self {
        Self {
            title: title.into(),
            message,
            kind: PromptKind::Bool,
            extras: None,
            confirm_label: Some(confirm.into()),
            cancel_label: Some(cancel.into()),
            select_options: vec![],
        }
    }

    pub fn select(title: &str, message: String, options: Vec<String>, cancel: &str) -> Self {
        Self {
            title: title.into(),
            message,
            kind: PromptKind::Select,
            extras: None,
            confirm_label: None,
            cancel_label: Some(cancel.into()),
            select_options: options,
        }
    }
}

/// The moderator's reply. `None` in `resolve_decision` means the prompt was
/// dismissed, which always selects the second (cancel) option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Bool(bool),
    Text(String),
}

impl Answer {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Answer::Bool(b) => Some(*b),
            Answer::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(s) => Some(s),
            Answer::Bool(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Good,
    Evil,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub winner: Winner,
    pub day: u32,
    #[serde(default = "default_reason")]
    pub reason: String,
}

fn default_reason() -> String {
    "normal".to_string()
}
