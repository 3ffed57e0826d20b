use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::models::{HookList, MAX_HOOKS};

static ENUMERATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.:\-)]\s").expect("valid regex"));
static ENUMERATOR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.:\-)]\s*").expect("valid regex"));

/// Below this many numbered hooks the loose line scan is tried.
const MIN_NUMBERED: usize = 5;
const META_PHRASES: [&str; 3] = ["here are", "hook", "framework"];
const QUOTE_PAIRS: [(char, char); 4] = [('"', '"'), ('\'', '\''), ('“', '”'), ('‘', '’')];

/// Length thresholds (in characters) for the two parsing tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseRules {
    /// Numbered entries must be longer than this.
    pub numbered_min: usize,
    /// Un-numbered candidate lines must be longer than this.
    pub loose_min: usize,
}

impl Default for ParseRules {
    fn default() -> Self {
        Self { numbered_min: 10, loose_min: 20 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookSource {
    /// The model answered with a JSON array of strings.
    Structured,
    Numbered,
    Loose,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedHooks {
    pub hooks: HookList,
    pub source: HookSource,
}

/// Extracts hooks from free-form model output. Never fails: when nothing
/// usable is found the `fallback` list is returned instead.
pub fn parse_hooks<F>(raw: &str, max_count: usize, rules: &ParseRules, fallback: F) -> ParsedHooks
where
    F: FnOnce() -> HookList,
{
    let max_count = max_count.clamp(1, MAX_HOOKS);

    if let Some(hooks) = structured(raw) {
        return ParsedHooks { hooks: hooks.truncate(max_count), source: HookSource::Structured };
    }

    let lines: Vec<&str> = raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let numbered: Vec<String> = lines
        .iter()
        .filter(|line| ENUMERATED.is_match(line))
        .map(|line| unquote(ENUMERATOR_PREFIX.replace(line, "").trim()).to_string())
        .filter(|hook| !hook.is_empty())
        .collect();

    let strong: Vec<String> = numbered
        .iter()
        .filter(|hook| hook.chars().count() > rules.numbered_min)
        .cloned()
        .collect();

    if strong.len() >= MIN_NUMBERED {
        if let Some(hooks) = HookList::new(strong.iter().cloned()) {
            return ParsedHooks { hooks: hooks.truncate(max_count), source: HookSource::Numbered };
        }
    }

    debug!(numbered = numbered.len(), strong = strong.len(), "few numbered hooks, scanning loose lines");

    let loose = lines.iter().filter_map(|line| loose_candidate(line, rules));
    if let Some(hooks) = HookList::new(loose) {
        return ParsedHooks { hooks: hooks.truncate(max_count), source: HookSource::Loose };
    }

    // Short but well-formed numbered answers still beat stock text.
    let last_resort = if strong.is_empty() { numbered } else { strong };
    if let Some(hooks) = HookList::new(last_resort) {
        return ParsedHooks { hooks: hooks.truncate(max_count), source: HookSource::Numbered };
    }

    warn!(raw_len = raw.len(), "no hooks found in model output, using fallback");
    ParsedHooks { hooks: fallback().truncate(max_count), source: HookSource::Fallback }
}

fn structured(raw: &str) -> Option<HookList> {
    let trimmed = raw.trim();
    if !trimmed.starts_with('[') {
        return None;
    }
    let items: Vec<String> = serde_json::from_str(trimmed).ok()?;
    HookList::new(items.iter().map(|s| unquote(s.trim()).to_string()))
}

fn loose_candidate(line: &str, rules: &ParseRules) -> Option<String> {
    if line.chars().count() <= rules.loose_min {
        return None;
    }
    let lower = line.to_lowercase();
    if META_PHRASES.iter().any(|p| lower.contains(p)) {
        return None;
    }
    // Header heuristic; also catches lines with no letters at all.
    if line == line.to_uppercase() {
        return None;
    }
    let cleaned = ENUMERATOR_PREFIX.replace(line, "");
    Some(unquote(cleaned.trim()).to_string())
}

/// Removes one pair of quotes wrapping the whole hook.
fn unquote(hook: &str) -> &str {
    for (open, close) in QUOTE_PAIRS {
        if let Some(inner) = hook.strip_prefix(open).and_then(|h| h.strip_suffix(close)) {
            return inner.trim();
        }
    }
    hook
}
