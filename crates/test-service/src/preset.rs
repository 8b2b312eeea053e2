use little_chat_service::ErrorKind;
use serde::{Deserialize, Serialize};

/// How the test service answers one request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetReply {
    #[serde(rename = "reply")]
    Reply(String),
    #[serde(rename = "failure")]
    Failure(PresetFailure),
}

impl PresetReply {
    /// Creates a successful preset.
    #[inline]
    pub fn reply<S: Into<String>>(reply: S) -> Self {
        Self::Reply(reply.into())
    }
}

/// The failures the test service can simulate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetFailure {
    /// A non-success status, optionally with a `detail` string.
    Status { code: u16, detail: Option<String> },
    /// A body that doesn't decode.
    Decode,
    /// A connection failure.
    Transport,
    /// The request timed out.
    Timeout,
}

impl PresetFailure {
    /// Returns the error kind this failure is reported as.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            PresetFailure::Status { .. } => ErrorKind::Status,
            PresetFailure::Decode => ErrorKind::Decode,
            PresetFailure::Transport => ErrorKind::Transport,
            PresetFailure::Timeout => ErrorKind::Timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_script() {
        let script: Vec<PresetReply> = serde_json::from_value(json!([
            { "type": "reply", "data": "hi there" },
            { "type": "failure", "data": { "status": { "code": 500, "detail": "boom" } } },
            { "type": "failure", "data": "transport" },
        ]))
        .unwrap();

        assert_eq!(
            script,
            vec![
                PresetReply::reply("hi there"),
                PresetReply::Failure(PresetFailure::Status {
                    code: 500,
                    detail: Some("boom".to_owned()),
                }),
                PresetReply::Failure(PresetFailure::Transport),
            ]
        );
        let PresetReply::Failure(failure) = &script[1] else {
            unreachable!();
        };
        assert_eq!(failure.kind(), ErrorKind::Status);
    }
}
