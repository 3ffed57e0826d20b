//! Prompt construction, response parsing and stock fallback content.

pub mod fallback;
pub mod parse;
pub mod prompt;

use std::str::FromStr;

use crate::clients::openai::ModelParams;
use crate::error::AppError;

pub use fallback::fallback_hooks;
pub use parse::{parse_hooks, HookSource, ParseRules, ParsedHooks};
pub use prompt::{build_prompt, Prompt};

/// Variants of the one generation pipeline. They differ in hook count,
/// model, system prompt and parser strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptStyle {
    /// Five hooks, short system prompt, sampling penalties on.
    Concise,
    #[default]
    Standard,
    /// Ten hooks built on named psychological frameworks.
    Advanced,
}

impl PromptStyle {
    pub fn hook_count(&self) -> usize {
        match self {
            PromptStyle::Concise => 5,
            PromptStyle::Standard | PromptStyle::Advanced => 10,
        }
    }

    pub fn model_params(&self) -> ModelParams {
        match self {
            PromptStyle::Concise => ModelParams {
                model: "gpt-4-turbo-preview".into(),
                max_tokens: 800,
                top_p: Some(0.9),
                frequency_penalty: Some(0.3),
                presence_penalty: Some(0.3),
                ..ModelParams::default()
            },
            PromptStyle::Standard => ModelParams {
                model: "gpt-3.5-turbo".into(),
                max_tokens: 1000,
                ..ModelParams::default()
            },
            PromptStyle::Advanced => ModelParams {
                model: "gpt-4".into(),
                max_tokens: 1200,
                top_p: Some(0.9),
                ..ModelParams::default()
            },
        }
    }

    pub fn parse_rules(&self) -> ParseRules {
        match self {
            PromptStyle::Concise | PromptStyle::Standard => ParseRules { numbered_min: 10, loose_min: 20 },
            PromptStyle::Advanced => ParseRules { numbered_min: 15, loose_min: 25 },
        }
    }

    /// Label echoed in the response so clients can tell the variants apart.
    pub fn framework(&self) -> Option<&'static str> {
        match self {
            PromptStyle::Advanced => Some("advanced-psychology"),
            _ => None,
        }
    }
}

impl FromStr for PromptStyle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "concise" | "simple" => Ok(PromptStyle::Concise),
            "standard" => Ok(PromptStyle::Standard),
            "advanced" => Ok(PromptStyle::Advanced),
            other => Err(AppError::Configuration(format!("unknown prompt style: {other}"))),
        }
    }
}
