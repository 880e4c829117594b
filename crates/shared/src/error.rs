use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Error envelope produced by the HackMate backend's exception handler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Best human-readable text: the message, followed by field errors when present.
    pub fn display_message(&self) -> Option<String> {
        let message = self
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())?;

        match &self.field_errors {
            Some(fields) if !fields.is_empty() => {
                let details = fields
                    .iter()
                    .map(|(field, err)| format!("{field}: {err}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                Some(format!("{message} ({details})"))
            }
            _ => Some(message.to_string()),
        }
    }

    /// Parses an error payload, tolerating bodies that are not the envelope.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice::<Self>(bytes).ok()
    }
}
