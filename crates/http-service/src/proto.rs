use little_chat_service::ChatRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ReplyBody {
    pub reply: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// Flattens `detail` into a single line. Servers may send either a
    /// plain string or a structured list of validation errors.
    pub fn into_detail(self) -> Option<String> {
        match self.detail? {
            Value::Null => None,
            Value::String(detail) => Some(detail),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct HealthBody {
    pub status: String,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MessageBody<'a> {
    message: &'a str,
}

#[inline]
pub fn create_body(req: &ChatRequest) -> MessageBody<'_> {
    MessageBody {
        message: &req.message,
    }
}
