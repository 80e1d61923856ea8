use serde::{ Serialize, Deserialize };
use serde_json::Value as JsonValue;

/// Body of `POST /ask`. `question` stays loosely typed so that a missing,
/// null or non-string value is reported as "no question" instead of a
/// deserialization failure.
#[derive(Deserialize, Debug, Default)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<JsonValue>,
}

impl AskRequest {
    pub fn question(&self) -> Option<&str> {
        self.question.as_ref().and_then(JsonValue::as_str)
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
