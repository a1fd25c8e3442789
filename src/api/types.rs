//! Wire types for the puzzle game API

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Who wrote a dialog entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Any other or missing role; shown as the host
    #[default]
    #[serde(other)]
    Other,
}

impl Role {
    pub fn is_user(self) -> bool {
        self == Role::User
    }
}

/// One exchanged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogEntry {
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

impl DialogEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: None,
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: None,
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The mystery scenario for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mystery: String,
}

/// Body of `GET /history`
///
/// A missing or null `puzzle` means the session token is unknown or expired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub discussion: Vec<DialogEntry>,
    #[serde(default)]
    pub puzzle: Option<Puzzle>,
}

/// Body of `GET /chat`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub cid: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reply: String,
}

/// Query parameters for `/history`
#[derive(Debug, Serialize)]
pub(crate) struct HistoryQuery<'a> {
    pub cid: &'a str,
}

/// Query parameters for `/chat`; a `None` cid is sent as an explicit null
#[derive(Debug, Serialize)]
pub(crate) struct ChatQuery<'a> {
    pub question: &'a str,
    pub cid: Option<&'a str>,
}

/// Entry ids arrive as strings or numbers; anything else is dropped
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(id) => Some(id),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
