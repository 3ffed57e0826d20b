use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::sanitize::sanitize;

/// Upper bound on hooks returned by any path.
pub const MAX_HOOKS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMethod {
    Brief,
    #[serde(alias = "raw_idea")]
    RawIdea,
    #[serde(alias = "draft_optimization")]
    DraftOptimization,
    #[serde(alias = "content_analysis")]
    ContentAnalysis,
}

impl GenerationMethod {
    pub const ALL: [GenerationMethod; 4] = [
        GenerationMethod::Brief,
        GenerationMethod::RawIdea,
        GenerationMethod::DraftOptimization,
        GenerationMethod::ContentAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMethod::Brief => "brief",
            GenerationMethod::RawIdea => "raw-idea",
            GenerationMethod::DraftOptimization => "draft-optimization",
            GenerationMethod::ContentAnalysis => "content-analysis",
        }
    }

    /// Fields that must be present and non-empty after sanitization.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            GenerationMethod::Brief => &[fields::CONTENT_TYPE, fields::PLATFORM, fields::GOAL, fields::TOPIC],
            GenerationMethod::RawIdea => &[fields::RAW_IDEA],
            GenerationMethod::DraftOptimization => &[fields::CURRENT_DRAFT],
            GenerationMethod::ContentAnalysis => &[fields::CONTENT_PIECE],
        }
    }
}

impl fmt::Display for GenerationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        GenerationMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| AppError::InvalidMethod(s.to_string()))
    }
}

/// Canonical input field names.
pub mod fields {
    pub const CONTENT_TYPE: &str = "content-type";
    pub const PLATFORM: &str = "platform";
    pub const GOAL: &str = "goal";
    pub const TOPIC: &str = "topic";
    pub const RAW_IDEA: &str = "raw-idea";
    pub const AUDIENCE: &str = "audience";
    pub const TONE: &str = "tone";
    pub const CURRENT_DRAFT: &str = "current-draft";
    pub const ISSUES: &str = "issues";
    pub const OPTIMIZATION_GOAL: &str = "optimization-goal";
    pub const FORMAT: &str = "format";
    pub const CONTENT_PIECE: &str = "content-piece";
    pub const CONTENT_FORMAT: &str = "content-format";
    pub const CHECKBOXES: &str = "checkboxes";
}

/// Older front ends posted camelCase names; map them onto the canonical ones.
fn canonical_key(key: &str) -> &str {
    match key {
        "contentType" | "content_type" => fields::CONTENT_TYPE,
        "rawIdea" | "raw_idea" => fields::RAW_IDEA,
        "draftHeadline" | "currentDraft" | "current_draft" => fields::CURRENT_DRAFT,
        "optimizationGoal" | "optimization_goal" => fields::OPTIMIZATION_GOAL,
        "contentPiece" | "content_piece" => fields::CONTENT_PIECE,
        "contentFormat" | "content_format" => fields::CONTENT_FORMAT,
        other => other,
    }
}

/// Validated, sanitized input for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub method: GenerationMethod,
    fields: BTreeMap<String, String>,
    styles: Vec<String>,
}

impl GenerationRequest {
    pub fn new(method: GenerationMethod) -> Self {
        Self { method, fields: BTreeMap::new(), styles: Vec::new() }
    }

    /// Sets a field through the sanitizer; empty results are dropped.
    pub fn with_field(mut self, key: &str, value: &str, max_chars: usize) -> Self {
        self.insert(key, value, max_chars);
        self
    }

    pub fn with_style(mut self, style: &str, max_chars: usize) -> Self {
        let clean = sanitize(style, max_chars);
        if !clean.is_empty() {
            self.styles.push(clean);
        }
        self
    }

    /// Parses a request body. Flat fields win over a legacy nested `data`
    /// object; non-string values other than the style list are ignored.
    pub fn from_json(body: &Value, max_chars: usize) -> Result<Self> {
        let obj = body
            .as_object()
            .ok_or_else(|| AppError::Validation("body must be a JSON object".into()))?;

        let method = match obj.get("method") {
            Some(Value::String(m)) => m.parse::<GenerationMethod>()?,
            Some(other) => return Err(AppError::InvalidMethod(other.to_string())),
            None => return Err(AppError::InvalidMethod("missing method".into())),
        };

        let mut request = Self::new(method);
        if let Some(Value::Object(nested)) = obj.get("data") {
            request.absorb(nested, max_chars);
        }
        request.absorb(obj, max_chars);
        Ok(request)
    }

    fn absorb(&mut self, obj: &Map<String, Value>, max_chars: usize) {
        for (key, value) in obj {
            if key == "method" || key == "data" {
                continue;
            }
            let key = canonical_key(key);
            match value {
                Value::String(s) => self.insert(key, s, max_chars),
                Value::Array(items) if key == fields::CHECKBOXES => {
                    self.styles = items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|s| sanitize(s, max_chars))
                        .filter(|s| !s.is_empty())
                        .collect();
                }
                _ => {}
            }
        }
    }

    /// Blank values never overwrite an earlier one.
    fn insert(&mut self, key: &str, value: &str, max_chars: usize) {
        let clean = sanitize(value, max_chars);
        if !clean.is_empty() {
            self.fields.insert(key.to_string(), clean);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| AppError::MissingRequiredField(key.to_string()))
    }

    /// Preferred content styles (content analysis checkboxes).
    pub fn styles(&self) -> &[String] {
        &self.styles
    }
}

/// An ordered, non-empty list of at most [`MAX_HOOKS`] hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HookList(Vec<String>);

impl HookList {
    /// Drops blank entries and caps the length. `None` when nothing is left.
    pub fn new<I, S>(hooks: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let hooks: Vec<String> = hooks
            .into_iter()
            .map(Into::into)
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .take(MAX_HOOKS)
            .collect();
        if hooks.is_empty() {
            None
        } else {
            Some(Self(hooks))
        }
    }

    /// Like [`HookList::new`], but never empty: `placeholder` stands in when
    /// every entry was blank.
    pub fn new_or<I, S>(hooks: I, placeholder: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(hooks).unwrap_or_else(|| Self(vec![placeholder.to_string()]))
    }

    pub fn truncate(mut self, max_count: usize) -> Self {
        self.0.truncate(max_count.clamp(1, MAX_HOOKS));
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub success: bool,
    pub hooks: HookList,
    pub method: GenerationMethod,
    pub timestamp: DateTime<Utc>,
    /// True when the hooks are stock fallback content, not model output.
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_names_accept_both_spellings() {
        assert_eq!("raw-idea".parse::<GenerationMethod>().unwrap(), GenerationMethod::RawIdea);
        assert_eq!("raw_idea".parse::<GenerationMethod>().unwrap(), GenerationMethod::RawIdea);
        assert_eq!(" Brief ".parse::<GenerationMethod>().unwrap(), GenerationMethod::Brief);
        assert!(matches!(
            "general".parse::<GenerationMethod>(),
            Err(AppError::InvalidMethod(_))
        ));
    }

    #[test]
    fn method_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_value(GenerationMethod::ContentAnalysis).unwrap(),
            json!("content-analysis")
        );
        let m: GenerationMethod = serde_json::from_value(json!("draft_optimization")).unwrap();
        assert_eq!(m, GenerationMethod::DraftOptimization);
    }

    #[test]
    fn flat_body_is_parsed_and_sanitized() {
        let body = json!({
            "method": "brief",
            "content-type": "  thread ",
            "platform": "<script>x</script>LinkedIn",
            "goal": "leads",
            "topic": "cold email",
            "count": 3
        });
        let req = GenerationRequest::from_json(&body, 2000).unwrap();
        assert_eq!(req.method, GenerationMethod::Brief);
        assert_eq!(req.get("content-type"), Some("thread"));
        assert_eq!(req.get("platform"), Some("LinkedIn"));
        assert_eq!(req.get("count"), None);
    }

    #[test]
    fn nested_data_and_camel_case_are_normalized() {
        let body = json!({
            "method": "raw_idea",
            "data": { "rawIdea": "remote work is lonely", "tone": "wry" },
            "tone": "bold"
        });
        let req = GenerationRequest::from_json(&body, 2000).unwrap();
        assert_eq!(req.method, GenerationMethod::RawIdea);
        assert_eq!(req.get(fields::RAW_IDEA), Some("remote work is lonely"));
        assert_eq!(req.get(fields::TONE), Some("bold"));
    }

    #[test]
    fn blank_flat_value_keeps_nested_one() {
        let body = json!({
            "method": "raw-idea",
            "data": { "raw-idea": "async standups", "tone": "wry" },
            "tone": "  ",
            "audience": "<script>x</script>"
        });
        let req = GenerationRequest::from_json(&body, 2000).unwrap();
        assert_eq!(req.get(fields::TONE), Some("wry"));
        assert_eq!(req.get(fields::AUDIENCE), None);
    }

    #[test]
    fn checkboxes_become_styles() {
        let body = json!({
            "method": "content-analysis",
            "content-piece": "a long essay",
            "checkboxes": ["question", "", 7, "story"]
        });
        let req = GenerationRequest::from_json(&body, 2000).unwrap();
        assert_eq!(req.styles(), ["question".to_string(), "story".to_string()]);
    }

    #[test]
    fn missing_or_non_string_method_is_invalid() {
        assert!(matches!(
            GenerationRequest::from_json(&json!({"topic": "x"}), 2000),
            Err(AppError::InvalidMethod(_))
        ));
        assert!(matches!(
            GenerationRequest::from_json(&json!({"method": 4}), 2000),
            Err(AppError::InvalidMethod(_))
        ));
        assert!(matches!(
            GenerationRequest::from_json(&json!(["brief"]), 2000),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn field_emptied_by_sanitizer_is_missing() {
        let req = GenerationRequest::new(GenerationMethod::RawIdea).with_field(
            fields::RAW_IDEA,
            "<script>alert(1)</script>",
            2000,
        );
        assert!(matches!(
            req.require(fields::RAW_IDEA),
            Err(AppError::MissingRequiredField(f)) if f == "raw-idea"
        ));
    }

    #[test]
    fn hook_list_drops_blanks_and_caps_length() {
        assert!(HookList::new(["", "  "]).is_none());
        let many = (0..30).map(|i| format!("hook {i}"));
        let list = HookList::new(many).unwrap();
        assert_eq!(list.len(), MAX_HOOKS);
        assert_eq!(list.truncate(0).len(), 1);
    }

    #[test]
    fn result_serializes_wire_shape() {
        let result = GenerationResult {
            success: true,
            hooks: HookList::new(["one"]).unwrap(),
            method: GenerationMethod::Brief,
            timestamp: Utc::now(),
            degraded: false,
            framework: None,
        };
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v["hooks"], json!(["one"]));
        assert_eq!(v["method"], json!("brief"));
        assert!(v.get("framework").is_none());
        assert!(v["timestamp"].as_str().unwrap().contains('T'));
    }
}
