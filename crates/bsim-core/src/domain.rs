use serde::{Deserialize, Deserializer, Serialize};

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a sent message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Supported reply/prompt locales.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
    Uz,
}

impl Language {
    /// Resolve a client-supplied language code. Anything unsupported is English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "ru" => Language::Ru,
            "uz" => Language::Uz,
            _ => Language::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
            Language::Uz => "uz",
        }
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code: Option<String> = Option::deserialize(deserializer)?;
        Ok(code.as_deref().map(Language::from_code).unwrap_or_default())
    }
}

/// One `(label, amount)` budget line recognised in free text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParsedEntry {
    pub label: String,
    pub amount: u64,
}

impl ParsedEntry {
    pub fn new(label: impl Into<String>, amount: u64) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }
}
