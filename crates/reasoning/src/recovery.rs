//! Recovery of a structured insight from free-form final text.
//!
//! Reasoning services wrap their JSON in prose, code fences, or stray
//! thinking fragments. Recovery never fails outright: a completed
//! conversation always yields *some* insight, in the worst case a degraded
//! one carrying a parse-error flag and a best-effort summary.

use regex::Regex;
use serde_json::Value as JsonValue;
use std::sync::OnceLock;
use tracing::debug;

use edgemind_core::Insight;

/// Strip common code fences that models keep adding around JSON.
pub fn strip_code_fences(input: &str) -> String {
    input
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Extract the balanced `{...}` object starting at byte offset `start`.
///
/// Tracks string and escape state so braces inside string literals do not
/// truncate (or extend) the scan. Returns the exact source slice.
pub fn extract_balanced_object(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte offsets of every `{` in `text`.
fn brace_positions(text: &str) -> Vec<usize> {
    text.bytes()
        .enumerate()
        .filter_map(|(i, b)| (b == b'{').then_some(i))
        .collect()
}

/// Whether a parsed candidate carries the insight schema's signature field.
fn matches_signature(value: &JsonValue) -> bool {
    value.as_object().is_some_and(|obj| obj.contains_key("summary"))
}

fn summary_fallback_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""summary"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("summary fallback regex")
    })
}

/// Recover an [`Insight`] from the final text of a completed conversation.
///
/// Strategy: strip fences, scan the balanced object from the **first**
/// opening brace; if that candidate is not structurally valid or lacks the
/// signature fields, re-scan from the **last** opening brace backward until a
/// schema-matching object turns up. Failing all of that, a regex pulls a
/// best-effort summary and the insight is returned degraded.
pub fn recover_insight(raw: &str) -> Insight {
    let cleaned = strip_code_fences(raw);
    let positions = brace_positions(&cleaned);

    let mut candidates = Vec::with_capacity(2);
    if let Some(&first) = positions.first() {
        candidates.push(first);
    }
    // Last-brace rescan order: newest object first, skipping the position we
    // already tried.
    candidates.extend(positions.iter().rev().copied().filter(|p| Some(p) != positions.first()));

    for start in candidates {
        let Some(candidate) = extract_balanced_object(&cleaned, start) else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<JsonValue>(candidate) else {
            continue;
        };
        if !matches_signature(&value) {
            continue;
        }
        match serde_json::from_value::<Insight>(value.clone()) {
            Ok(insight) => return insight,
            Err(e) => {
                // Signature matched but the schema did not; keep the summary
                // rather than discarding the whole conversation.
                debug!(error = %e, "insight candidate failed schema deserialization");
                let summary = value["summary"].as_str().unwrap_or_default().to_string();
                return Insight::parse_degraded(summary);
            }
        }
    }

    // No recoverable object at all: best-effort summary extraction.
    if let Some(caps) = summary_fallback_regex().captures(&cleaned) {
        let escaped = &caps[1];
        let summary = serde_json::from_str::<String>(&format!("\"{escaped}\""))
            .unwrap_or_else(|_| escaped.to_string());
        return Insight::parse_degraded(summary);
    }

    Insight::parse_degraded(truncated_prose(&cleaned))
}

/// When not even a summary field exists, keep the leading prose as context.
fn truncated_prose(text: &str) -> String {
    const MAX: usize = 240;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "reasoning service returned no parsable analysis".to_string();
    }
    match trimmed.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgemind_core::Severity;

    #[test]
    fn nested_braces_and_quotes_do_not_truncate_extraction() {
        let raw = r#"Sure, here it is: {"summary":"ok {nested}", "anomalies":[]}"#;
        let start = raw.find('{').unwrap();
        assert_eq!(
            extract_balanced_object(raw, start),
            Some(r#"{"summary":"ok {nested}", "anomalies":[]}"#)
        );

        let insight = recover_insight(raw);
        assert_eq!(insight.summary, "ok {nested}");
        assert!(!insight.is_degraded());
    }

    #[test]
    fn escaped_quote_inside_string_is_handled() {
        let raw = r#"{"summary":"operator said \"stop\"","anomalies":[]}"#;
        let insight = recover_insight(raw);
        assert_eq!(insight.summary, r#"operator said "stop""#);
    }

    #[test]
    fn code_fences_are_stripped() {
        let raw = "```json\n{\"summary\":\"fenced\",\"severity\":\"high\"}\n```";
        let insight = recover_insight(raw);
        assert_eq!(insight.summary, "fenced");
        assert_eq!(insight.severity, Severity::High);
    }

    #[test]
    fn last_brace_rescan_finds_the_real_object() {
        let raw = r#"{"scratch": "ignore me"} and the answer: {"summary":"real one","anomalies":[]}"#;
        let insight = recover_insight(raw);
        assert_eq!(insight.summary, "real one");
        assert!(!insight.is_degraded());
    }

    #[test]
    fn unparsable_text_degrades_with_regex_summary() {
        // Unbalanced object: no candidate survives the scan.
        let raw = r#"The gist: "summary": "availability slipping at Enterprise B" and {"#;
        let insight = recover_insight(raw);
        assert!(insight.degraded.parse_error);
        assert_eq!(insight.summary, "availability slipping at Enterprise B");
    }

    #[test]
    fn prose_only_text_degrades_with_truncated_prose() {
        let insight = recover_insight("All lines nominal, nothing to report.");
        assert!(insight.degraded.parse_error);
        assert_eq!(insight.summary, "All lines nominal, nothing to report.");
    }

    #[test]
    fn empty_text_degrades_with_placeholder() {
        let insight = recover_insight("");
        assert!(insight.degraded.parse_error);
        assert!(!insight.summary.is_empty());
    }
}
