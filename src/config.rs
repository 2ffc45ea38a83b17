use serde::{Deserialize, Serialize};

pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const MODEL_OVERRIDE_VAR: &str = "ANTHROPIC_MODEL";
pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub backend_base_url: String,
    pub max_tokens: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            backend_base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 4096,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build a config from `(key, value)` pairs. Unknown keys are ignored and
    /// unparseable values keep the default.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                "CHAT_RELAY_HOST" => {
                    if !value.is_empty() {
                        config.server_host = value.to_string();
                    }
                }
                "CHAT_RELAY_PORT" => match value.parse::<u16>() {
                    Ok(port) => config.server_port = port,
                    Err(_) => log::warn!("Ignoring invalid CHAT_RELAY_PORT: {}", value),
                },
                "ANTHROPIC_BASE_URL" => {
                    if !value.is_empty() {
                        config.backend_base_url = value.trim_end_matches('/').to_string();
                    }
                }
                "ANTHROPIC_MAX_TOKENS" => match value.parse::<u32>() {
                    Ok(n) if n > 0 => config.max_tokens = n,
                    _ => log::warn!("Ignoring invalid ANTHROPIC_MAX_TOKENS: {}", value),
                },
                _ => {}
            }
        }

        config
    }
}

/// Per-request snapshot of the secret values. Read once when a request
/// arrives and never refreshed during it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSecrets {
    pub api_key: Option<String>,
    pub model_override: Option<String>,
}

impl RequestSecrets {
    pub fn from_env() -> Self {
        Self {
            api_key: non_empty(std::env::var(API_KEY_VAR).ok()),
            model_override: non_empty(std::env::var(MODEL_OVERRIDE_VAR).ok()),
        }
    }

    /// Request model first, then the configured override, then the default.
    pub fn resolve_model(&self, requested: Option<&str>) -> String {
        requested
            .filter(|m| !m.is_empty())
            .or(self.model_override.as_deref())
            .unwrap_or(DEFAULT_MODEL)
            .to_string()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Where request secrets come from.
#[derive(Debug, Clone)]
pub enum SecretSource {
    Process,
    Fixed(RequestSecrets),
}

impl SecretSource {
    pub fn snapshot(&self) -> RequestSecrets {
        match self {
            SecretSource::Process => RequestSecrets::from_env(),
            SecretSource::Fixed(secrets) => secrets.clone(),
        }
    }
}
