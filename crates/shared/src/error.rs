use serde::{Deserialize, Serialize};

/// Wire shape of a rejected API call: `{"error": "..."}`. The message is
/// optional because some deployments return an empty body on failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }

    /// Server-supplied message, or the caller's fallback.
    pub fn message_or(self, fallback: &str) -> String {
        self.error.unwrap_or_else(|| fallback.to_string())
    }
}
