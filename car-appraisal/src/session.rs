// Session ids correlate one progress subscription with one pending request.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Client-generated token, used as the `session_id` body field and as the
/// last segment of the `/ws/{session_id}` path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh id of the form `session_<9 hex chars>_<unix millis>`.
    pub fn generate() -> Self {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let millis = chrono::Utc::now().timestamp_millis();
        SessionId(format!("session_{}_{}", &token[..9], millis))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        SessionId(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        SessionId(value)
    }
}
