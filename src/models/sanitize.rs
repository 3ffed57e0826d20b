//! Best-effort markup and length guard for free-text input.
//!
//! This is not an HTML parser. It removes the handful of shapes that matter
//! when user text is echoed back into a page: script blocks, `javascript:`
//! schemes and inline event-handler attributes.

use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script\s*>").expect("valid regex"));
static JS_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript\s*:").expect("valid regex"));
// Handler attributes only count inside a tag; prose like "online=yes" stays.
static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<[^>]*?)\s+on[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).expect("valid regex")
});

pub fn sanitize(value: &str, max_chars: usize) -> String {
    let mut out = value.to_string();
    // Removal can splice a new match together ("javajavascript:script:"),
    // so strip until nothing changes.
    loop {
        let next = strip_once(&out);
        if next == out {
            break;
        }
        out = next;
    }

    let trimmed = out.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => trimmed[..cut].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

fn strip_once(value: &str) -> String {
    let value = SCRIPT_BLOCK.replace_all(value, "");
    let value = JS_SCHEME.replace_all(&value, "");
    EVENT_HANDLER.replace_all(&value, "${1}").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_keeps_plain_text() {
        assert_eq!(sanitize("  grow my newsletter  ", 2000), "grow my newsletter");
    }

    #[test]
    fn removes_script_blocks_across_lines() {
        let got = sanitize("before<SCRIPT type=x>\nalert(1)\n</script >after", 2000);
        assert_eq!(got, "beforeafter");
    }

    #[test]
    fn removes_javascript_scheme_and_handlers() {
        let got = sanitize(r#"<a href="javascript:run()" onclick = "x">link</a>"#, 2000);
        assert!(!got.to_lowercase().contains("javascript:"));
        assert!(!got.contains("onclick"));
        assert!(got.contains("link"));
    }

    #[test]
    fn every_handler_in_a_tag_is_removed() {
        let got = sanitize(r#"<img src=x onerror=alert(1) onload='y'>caption"#, 2000);
        assert_eq!(got, "<img src=x>caption");
    }

    #[test]
    fn prose_with_on_words_is_kept() {
        let text = "Set online=true and one = two for conversion";
        assert_eq!(sanitize(text, 2000), text);
    }

    #[test]
    fn spliced_patterns_do_not_survive() {
        let got = sanitize("javajavascript:script:alert", 2000);
        assert_eq!(got, "alert");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        let got = sanitize("héllo wörld", 4);
        assert_eq!(got, "héll");
    }

    #[test]
    fn sanitizing_twice_changes_nothing() {
        let inputs = [
            "  <script>x</script> hello onload= there  ",
            "javascript:javascript:",
            "a very long line that will get cut right here      and not further",
            "plain",
            "",
        ];
        for input in inputs {
            let once = sanitize(input, 40);
            assert_eq!(sanitize(&once, 40), once, "input: {input:?}");
        }
    }
}
