use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /ask`. A `question` that is present but not a string is
/// treated as missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    pub question: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => Some(text),
        _ => None,
    })
}

/// Body returned from `POST /ask`. Exactly one key is ever serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AskReply {
    Answer { answer: String },
    Error { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveAndGenerateRequest {
    pub question: String,
    pub knowledge_base_id: String,
    pub model_arn: String,
}

/// The part of the service reply the bot relies on. The answer lives at
/// `output.text`; a reply without `output` is treated as malformed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrieveAndGenerateResponse {
    #[serde(default)]
    pub output: Option<GeneratedOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedOutput {
    pub text: String,
}
