use std::time::Duration;

use tracing::warn;

use crate::hooks::PromptStyle;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";
pub const DEFAULT_MAX_INPUT_CHARS: usize = 2000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Process configuration, read fresh on every invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: Option<String>,
    pub prompt_style: PromptStyle,
    pub max_input_chars: usize,
    pub llm_max_attempts: u32,
    pub llm_retry_delay: Duration,
    pub allowed_origins: Vec<String>,
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub stripe_api_base: String,
    pub vercel_url: Option<String>,
    pub debug_prompts: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: None,
            prompt_style: PromptStyle::default(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            llm_max_attempts: DEFAULT_MAX_ATTEMPTS,
            llm_retry_delay: DEFAULT_RETRY_DELAY,
            allowed_origins: Vec::new(),
            stripe_secret_key: None,
            stripe_webhook_secret: None,
            stripe_api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            vercel_url: None,
            debug_prompts: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable source. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let prompt_style = match get("HOOKS_PROMPT_STYLE") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "unknown HOOKS_PROMPT_STYLE, using default");
                defaults.prompt_style
            }),
            None => defaults.prompt_style,
        };

        Self {
            openai_api_key: get("OPENAI_API_KEY").or_else(|| get("OPENAI_KEY")),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            openai_model: get("OPENAI_MODEL"),
            prompt_style,
            max_input_chars: parse_or(
                get("HOOKS_MAX_INPUT_CHARS"),
                "HOOKS_MAX_INPUT_CHARS",
                defaults.max_input_chars,
            ),
            llm_max_attempts: parse_or(
                get("LLM_MAX_ATTEMPTS"),
                "LLM_MAX_ATTEMPTS",
                defaults.llm_max_attempts,
            )
            .max(1),
            llm_retry_delay: get("LLM_RETRY_DELAY_MS")
                .map(|raw| Duration::from_millis(parse_or(Some(raw), "LLM_RETRY_DELAY_MS", 1000)))
                .unwrap_or(defaults.llm_retry_delay),
            allowed_origins: get("ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|o| o.trim().trim_end_matches('/').to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            stripe_secret_key: get("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: get("STRIPE_WEBHOOK_SECRET"),
            stripe_api_base: get("STRIPE_API_BASE").unwrap_or(defaults.stripe_api_base),
            vercel_url: get("VERCEL_URL"),
            debug_prompts: get("DEBUG_OPENAI_RAW").as_deref() == Some("1"),
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "unparseable setting, using default");
            default
        }),
        None => default,
    }
}
