//! Recovery of a JSON value from free text.
//!
//! Generated answers often wrap the payload in markdown fences or prose.
//! Strategies run from most to least structured: the whole string, fenced
//! blocks, bare bracket blocks, then a bracket scan.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Which strategy produced an extracted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStrategy {
    Direct,
    FencedJson,
    Fenced,
    BareObject,
    BareArray,
    Scan,
}

impl fmt::Display for ExtractStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExtractStrategy::Direct => "whole string",
            ExtractStrategy::FencedJson => "```json fence",
            ExtractStrategy::Fenced => "``` fence",
            ExtractStrategy::BareObject => "bare {...}",
            ExtractStrategy::BareArray => "bare [...]",
            ExtractStrategy::Scan => "bracket scan",
        };
        f.write_str(label)
    }
}

fn patterns() -> &'static [(ExtractStrategy, Regex)] {
    static PATTERNS: OnceLock<Vec<(ExtractStrategy, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (ExtractStrategy::FencedJson, r"(?i)```json\s*(\{[\s\S]*?\})\s*```"),
            (ExtractStrategy::Fenced, r"```\s*(\{[\s\S]*?\})\s*```"),
            (ExtractStrategy::BareObject, r"(\{[\s\S]*?\})"),
            (ExtractStrategy::BareArray, r"(\[[\s\S]*?\])"),
        ]
        .into_iter()
        .map(|(strategy, src)| {
            let re = Regex::new(src).expect("extraction pattern should compile");
            (strategy, re)
        })
        .collect()
    })
}

/// Pass non-string values through; extract from strings.
pub fn extract(input: &Value) -> Option<Value> {
    match input {
        Value::String(text) => extract_from_str(text).map(|(value, _)| value),
        other => Some(other.clone()),
    }
}

/// Recover a JSON value from `text`, reporting the strategy that worked.
pub fn extract_from_str(text: &str) -> Option<(Value, ExtractStrategy)> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some((value, ExtractStrategy::Direct));
    }

    for (strategy, re) in patterns() {
        let Some(caps) = re.captures(text) else {
            continue;
        };
        let Some(candidate) = caps.get(1) else {
            continue;
        };
        if let Ok(value) = serde_json::from_str::<Value>(candidate.as_str()) {
            return Some((value, *strategy));
        }
    }

    scan(text).map(|value| (value, ExtractStrategy::Scan))
}

/// Shortest-first parse of substrings starting at the first bracket.
fn scan(text: &str) -> Option<Value> {
    let start = text.find(|c: char| c == '{' || c == '[')?;
    let tail = &text[start..];
    tail.char_indices()
        .filter(|(_, c)| *c == '}' || *c == ']')
        .find_map(|(idx, c)| serde_json::from_str::<Value>(&tail[..idx + c.len_utf8()]).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_string_passes_through() {
        let input = json!({"layers": []});
        assert_eq!(extract(&input), Some(input.clone()));
        assert_eq!(extract(&json!(42)), Some(json!(42)));
    }

    #[test]
    fn test_direct_parse() {
        let (value, strategy) = extract_from_str(r#" {"a": 1} "#).unwrap();
        assert_eq!(value, json!({"a": 1}));
        assert_eq!(strategy, ExtractStrategy::Direct);
    }

    #[test]
    fn test_fenced_json_in_prose() {
        let text = "Here is the answer: ```json\n{\"duration\":1,\"layers\":[]}\n```";
        let (value, strategy) = extract_from_str(text).unwrap();
        assert_eq!(value, json!({"duration": 1, "layers": []}));
        assert_eq!(strategy, ExtractStrategy::FencedJson);
    }

    #[test]
    fn test_fence_tag_case_insensitive() {
        let text = "```JSON\n{\"x\": 2}\n```";
        assert_eq!(extract_from_str(text).unwrap().1, ExtractStrategy::FencedJson);
    }

    #[test]
    fn test_untagged_fence() {
        let text = "see:\n```\n{\"x\": 2}\n```\nthanks";
        let (value, strategy) = extract_from_str(text).unwrap();
        assert_eq!(value, json!({"x": 2}));
        assert_eq!(strategy, ExtractStrategy::Fenced);
    }

    #[test]
    fn test_bare_object_in_prose() {
        let (value, strategy) = extract_from_str("result {\"x\": 1} done").unwrap();
        assert_eq!(value, json!({"x": 1}));
        assert_eq!(strategy, ExtractStrategy::BareObject);
    }

    #[test]
    fn test_bare_array_in_prose() {
        let (value, strategy) = extract_from_str("layers: [1, 2] ok").unwrap();
        assert_eq!(value, json!([1, 2]));
        assert_eq!(strategy, ExtractStrategy::BareArray);
    }

    #[test]
    fn test_nested_object_needs_scan() {
        // The lazy bare-object pattern stops at the first closing brace.
        let text = "scene: {\"a\": {\"b\": 1}} end";
        let (value, strategy) = extract_from_str(text).unwrap();
        assert_eq!(value, json!({"a": {"b": 1}}));
        assert_eq!(strategy, ExtractStrategy::Scan);
    }

    #[test]
    fn test_bare_array_pattern_precedes_scan() {
        let text = "scene: {\"layers\": [{\"type\": \"rect\"}]} end";
        let (value, strategy) = extract_from_str(text).unwrap();
        assert_eq!(value, json!([{"type": "rect"}]));
        assert_eq!(strategy, ExtractStrategy::BareArray);
    }

    #[test]
    fn test_scan_handles_multibyte_text() {
        let text = "résumé → {\"é\": {\"ü\": 1}} ✓";
        let (value, _) = extract_from_str(text).unwrap();
        assert_eq!(value, json!({"é": {"ü": 1}}));
    }

    #[test]
    fn test_nothing_parses() {
        assert!(extract_from_str("not json").is_none());
        assert!(extract_from_str("{ broken").is_none());
        assert!(extract_from_str("").is_none());
        assert!(extract(&json!("no brackets here")).is_none());
    }
}
