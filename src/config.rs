use std::env;
use std::str::FromStr;

pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;
pub const MAX_SESSION_TTL_DAYS: i64 = 365;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cookie_secure: bool,
    pub session_ttl_days: i64,
    pub llm: LlmConfig,
}

/// Settings for the OpenAI-compatible chat completion endpoint.
#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 60,
            temperature: 0.4,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let defaults = LlmConfig::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:physiotrack.db?mode=rwc".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 3000),
            cookie_secure: parse_or("COOKIE_SECURE", false),
            session_ttl_days: parse_or("SESSION_TTL_DAYS", DEFAULT_SESSION_TTL_DAYS)
                .clamp(1, MAX_SESSION_TTL_DAYS),
            llm: LlmConfig {
                base_url: env::var("LLM_API_URL").unwrap_or(defaults.base_url),
                api_key: env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty()),
                model: env::var("LLM_MODEL").unwrap_or(defaults.model),
                timeout_secs: parse_or("LLM_TIMEOUT_SECS", defaults.timeout_secs),
                temperature: parse_or("LLM_TEMPERATURE", defaults.temperature),
            },
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
