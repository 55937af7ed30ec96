use std::{env, fs, net::SocketAddr, path::Path, time::Duration};

use crate::{errors::Error, model::types::ProviderKind, Result};

pub const AI_NOT_CONFIGURED: &str =
    "AI service not configured. Set OPENAI_API_KEY or USE_GEMINI=true with GEMINI_API_KEY";

/// Typed configuration, read once at process start.
///
/// Nothing in request handling reads the environment; the loaded struct is
/// passed explicitly to the transports, the relay and the HTTP router.
#[derive(Clone, Debug)]
pub struct Config {
    // Upstream A (chat completions)
    pub openai_api_key: Option<String>,
    pub openai_api_url: String,
    pub openai_model: String,

    // Upstream B (generative content)
    pub use_gemini: bool,
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub gemini_model: String,
    pub gemini_temperature: f32,
    pub gemini_streaming: bool,

    pub upstream_timeout: Duration,

    // HTTP surface
    pub bind_addr: SocketAddr,
    /// `None` means any origin.
    pub frontend_url: Option<String>,

    // Telegram
    pub telegram_bot_token: Option<String>,
    pub telegram_webhook_url: Option<String>,
    pub mini_app_url: String,
}

/// Settings for the chat-completions transport.
#[derive(Clone, Debug)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// Settings for the generative-content transport.
#[derive(Clone, Debug)]
pub struct GeminiSettings {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub streaming: bool,
    pub timeout: Duration,
}

/// The single upstream selected for this process.
#[derive(Clone, Debug)]
pub enum AdvisorBackend {
    OpenAi(OpenAiSettings),
    Gemini(GeminiSettings),
}

impl AdvisorBackend {
    pub fn provider(&self) -> ProviderKind {
        match self {
            AdvisorBackend::OpenAi(_) => ProviderKind::OpenAi,
            AdvisorBackend::Gemini(_) => ProviderKind::Gemini,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let bind_addr = match get("BIND_ADDR") {
            Some(raw) => raw.trim().parse::<SocketAddr>().map_err(|e| {
                Error::Config(format!("BIND_ADDR '{raw}' is not a socket address: {e}"))
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 8000)),
        };

        let gemini_temperature = match get("GEMINI_TEMPERATURE") {
            Some(raw) => raw
                .trim()
                .parse::<f32>()
                .map_err(|e| Error::Config(format!("GEMINI_TEMPERATURE '{raw}': {e}")))?,
            None => 0.7,
        };

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                Ok(_) => {
                    return Err(Error::Config(format!(
                        "UPSTREAM_TIMEOUT_SECS '{raw}' must be positive"
                    )))
                }
                Err(e) => return Err(Error::Config(format!("UPSTREAM_TIMEOUT_SECS '{raw}': {e}"))),
            },
            None => Duration::from_secs(60),
        };

        let frontend_url = get("FRONTEND_URL").filter(|url| url.trim() != "*");

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_api_url: get("OPENAI_API_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string()),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            use_gemini: get("USE_GEMINI").map(|s| parse_bool(&s)).unwrap_or(false),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_api_base: get("GEMINI_API_BASE").unwrap_or_else(|| {
                "https://generativelanguage.googleapis.com/v1beta/models".to_string()
            }),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.5-flash".to_string()),
            gemini_temperature,
            gemini_streaming: get("GEMINI_STREAMING").map(|s| parse_bool(&s)).unwrap_or(true),
            upstream_timeout,
            bind_addr,
            frontend_url,
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            telegram_webhook_url: get("TELEGRAM_WEBHOOK_URL"),
            mini_app_url: get("MINI_APP_URL")
                .unwrap_or_else(|| "https://your-deployed-app.com".to_string()),
        })
    }

    /// Resolve which upstream serves advice requests.
    ///
    /// Gemini wins only when it is switched on *and* has a key; otherwise an
    /// OpenAI key is required.
    pub fn advisor_backend(&self) -> Result<AdvisorBackend> {
        if self.use_gemini {
            if let Some(key) = &self.gemini_api_key {
                return Ok(AdvisorBackend::Gemini(GeminiSettings {
                    api_key: key.clone(),
                    api_base: self.gemini_api_base.clone(),
                    model: self.gemini_model.clone(),
                    temperature: self.gemini_temperature,
                    streaming: self.gemini_streaming,
                    timeout: self.upstream_timeout,
                }));
            }
        }

        if let Some(key) = &self.openai_api_key {
            return Ok(AdvisorBackend::OpenAi(OpenAiSettings {
                api_key: key.clone(),
                api_url: self.openai_api_url.clone(),
                model: self.openai_model.clone(),
                timeout: self.upstream_timeout,
            }));
        }

        Err(Error::Config(AI_NOT_CONFIGURED.to_string()))
    }

    pub fn ai_configured(&self) -> bool {
        self.advisor_backend().is_ok()
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_with_empty_environment() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr, SocketAddr::from(([0, 0, 0, 0], 8000)));
        assert_eq!(cfg.openai_model, "gpt-4o-mini");
        assert_eq!(cfg.gemini_model, "gemini-2.5-flash");
        assert!((cfg.gemini_temperature - 0.7).abs() < f32::EPSILON);
        assert!(cfg.gemini_streaming);
        assert!(!cfg.use_gemini);
        assert_eq!(cfg.upstream_timeout, Duration::from_secs(60));
        assert!(cfg.frontend_url.is_none());
        assert!(cfg.telegram_bot_token.is_none());
        assert!(!cfg.ai_configured());
    }

    #[test]
    fn missing_credentials_is_a_config_error() {
        let cfg = config(&[("USE_GEMINI", "true")]).unwrap();
        assert!(matches!(cfg.advisor_backend(), Err(Error::Config(_))));
    }

    #[test]
    fn openai_is_used_without_gemini_flag() {
        let cfg = config(&[("OPENAI_API_KEY", "sk-x"), ("GEMINI_API_KEY", "g")]).unwrap();
        let backend = cfg.advisor_backend().unwrap();
        assert_eq!(backend.provider(), ProviderKind::OpenAi);
    }

    #[test]
    fn gemini_flag_with_key_selects_gemini() {
        let cfg = config(&[
            ("OPENAI_API_KEY", "sk-x"),
            ("USE_GEMINI", "yes"),
            ("GEMINI_API_KEY", "g"),
            ("GEMINI_STREAMING", "false"),
        ])
        .unwrap();
        match cfg.advisor_backend().unwrap() {
            AdvisorBackend::Gemini(g) => {
                assert_eq!(g.api_key, "g");
                assert!(!g.streaming);
            }
            other => panic!("unexpected backend: {other:?}"),
        }
    }

    #[test]
    fn gemini_flag_without_key_falls_back_to_openai() {
        let cfg = config(&[("OPENAI_API_KEY", "sk-x"), ("USE_GEMINI", "true")]).unwrap();
        assert_eq!(
            cfg.advisor_backend().unwrap().provider(),
            ProviderKind::OpenAi
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[("OPENAI_API_KEY", "   "), ("FRONTEND_URL", "*")]).unwrap();
        assert!(cfg.openai_api_key.is_none());
        assert!(cfg.frontend_url.is_none());
    }

    #[test]
    fn malformed_values_fail_loading() {
        assert!(matches!(
            config(&[("BIND_ADDR", "not-an-addr")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config(&[("GEMINI_TEMPERATURE", "warm")]),
            Err(Error::Config(_))
        ));
        for timeout in ["soon", "0", "-5", "1.5"] {
            assert!(
                matches!(
                    config(&[("UPSTREAM_TIMEOUT_SECS", timeout)]),
                    Err(Error::Config(_))
                ),
                "{timeout}"
            );
        }
    }

    #[test]
    fn explicit_values_are_used() {
        let cfg = config(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("FRONTEND_URL", "https://budget.example"),
            ("UPSTREAM_TIMEOUT_SECS", "15"),
            ("MINI_APP_URL", "https://mini.example"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.frontend_url.as_deref(), Some("https://budget.example"));
        assert_eq!(cfg.upstream_timeout, Duration::from_secs(15));
        assert_eq!(cfg.mini_app_url, "https://mini.example");
    }
}
