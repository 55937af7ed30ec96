use serde::{de, Deserialize, Deserializer, Serialize};

use crate::domain::Language;

/// The upstream provider family serving advice requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
        }
    }
}

/// Snapshot of the simulator state sent along with a chat message.
///
/// Informational only: values are folded into the prompt as-is.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserState {
    #[serde(deserialize_with = "whole_number")]
    pub month: i64,
    pub virtual_income: f64,
    pub current_balance: f64,
    pub savings: f64,
    pub debt: f64,
    pub stability_index: f64,
    pub stress_level: f64,
}

/// Accept `3` and `3.0` alike; reject fractions.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let n = serde_json::Number::deserialize(deserializer)?;
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| f as i64)
        .ok_or_else(|| de::Error::custom(format!("expected a whole number, got {n}")))
}

/// Inbound chat request from the web client.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub user_state: Option<UserState>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

/// Provider-agnostic prompt: a system instruction (with the rendered user
/// state appended) and the raw user message.
#[derive(Clone, Debug, PartialEq)]
pub struct AdvicePrompt {
    pub language: Language,
    pub system: String,
    pub user: String,
}

impl AdvicePrompt {
    /// Chat-style message list (system first, then user).
    pub fn messages(&self) -> Vec<PromptMessage> {
        vec![
            PromptMessage {
                role: Role::System,
                content: self.system.clone(),
            },
            PromptMessage {
                role: Role::User,
                content: self.user.clone(),
            },
        ]
    }

    /// Single text payload for providers without a system role.
    pub fn combined_text(&self) -> String {
        if self.system.is_empty() {
            return self.user.clone();
        }
        format!("{}\n\n{}", self.system, self.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_accepts_client_payload() {
        let req: ChatRequest = serde_json::from_str(
            r#"{
                "message": "How do I save more?",
                "language": "ru",
                "userState": {
                    "month": 3,
                    "virtualIncome": 5000000,
                    "currentBalance": 1200000.5,
                    "savings": 300000,
                    "debt": 0,
                    "stabilityIndex": 72,
                    "stressLevel": 18
                }
            }"#,
        )
        .unwrap();
        assert_eq!(req.language, Language::Ru);
        let state = req.user_state.unwrap();
        assert_eq!(state.month, 3);
        assert_eq!(state.current_balance, 1_200_000.5);
    }

    #[test]
    fn month_accepts_whole_floats_only() {
        let state = |month: &str| {
            serde_json::from_str::<UserState>(&format!(
                r#"{{"month":{month},"virtualIncome":1,"currentBalance":0,"savings":0,"debt":0,"stabilityIndex":50,"stressLevel":50}}"#
            ))
        };
        assert_eq!(state("1.0").unwrap().month, 1);
        assert_eq!(state("12").unwrap().month, 12);
        assert!(state("1.5").is_err());
        assert!(state("\"1\"").is_err());
    }

    #[test]
    fn optional_fields_default() {
        let req: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(req.language, Language::En);
        assert!(req.user_state.is_none());

        let req: ChatRequest =
            serde_json::from_str(r#"{"message":"hi","language":"fr","userState":null}"#).unwrap();
        assert_eq!(req.language, Language::En);
    }

    #[test]
    fn combined_text_joins_system_and_user() {
        let p = AdvicePrompt {
            language: Language::En,
            system: "sys".into(),
            user: "hello".into(),
        };
        assert_eq!(p.combined_text(), "sys\n\nhello");
        let messages = serde_json::to_value(p.messages()).unwrap();
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "hello");
    }
}
