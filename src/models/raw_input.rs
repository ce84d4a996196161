//! Deserialization helpers for raw form input.
//!
//! Form fields are kept exactly as the operator typed them. Clients usually
//! send strings, but numbers and `null` are accepted and stored as text.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInput {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawInput> for String {
    fn from(raw: RawInput) -> Self {
        match raw {
            RawInput::Text(text) => text,
            RawInput::Number(number) => number.to_string(),
        }
    }
}

/// Deserializes a string, number or null into the raw input text.
pub(crate) fn raw_input<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawInput>::deserialize(deserializer)?
        .map(String::from)
        .unwrap_or_default())
}

/// Like [`raw_input`], keeping `null` distinct from an empty string.
pub(crate) fn optional_raw_input<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawInput>::deserialize(deserializer)?.map(String::from))
}
