use serde::Serialize;
use serde_json::{Map, Value};

use crate::props::coerce_number;

/// Span assumed when an animation gives a start but no end.
pub const DEFAULT_SPAN_MS: f64 = 1000.0;

/// A linear tween of one numeric property over `[start, end]` milliseconds
/// of scene time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animation {
    /// Payload name of the animated property (`"x"`, `"opacity"`, ...).
    pub property: String,
    pub start: f64,
    pub end: f64,
    pub from: f64,
    pub to: f64,
}

impl Animation {
    pub fn new(property: impl Into<String>, start: f64, end: f64, from: f64, to: f64) -> Self {
        Self {
            property: property.into(),
            start,
            end,
            from,
            to,
        }
    }

    /// Read an animation entry from a payload object.
    ///
    /// Returns `None` when there is no property name to animate. Malformed
    /// numeric fields fall back to their defaults; a missing `to` holds `from`.
    pub fn from_json(map: &Map<String, Value>) -> Option<Self> {
        let property = match map.get("property") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return None,
        };
        let field = |name: &str| map.get(name).and_then(coerce_number);
        let start = field("start").unwrap_or(0.0);
        let end = field("end").unwrap_or(start + DEFAULT_SPAN_MS);
        let from = field("from").unwrap_or(0.0);
        let to = field("to").unwrap_or(from);
        Some(Self::new(property, start, end, from, to))
    }

    /// An animation with a non-positive span never applies.
    pub fn is_inert(&self) -> bool {
        !(self.end > self.start)
    }

    /// Value of the property at scene time `t_ms`.
    ///
    /// `None` before `start` (the base prop stays in effect) and for inert
    /// animations. Between `start` and `end` the value is interpolated
    /// linearly; after `end` it holds at `to`.
    pub fn value_at(&self, t_ms: f64) -> Option<f64> {
        if self.is_inert() || t_ms < self.start {
            return None;
        }
        if t_ms >= self.end {
            return Some(self.to);
        }
        let progress = (t_ms - self.start) / (self.end - self.start);
        Some(self.from + (self.to - self.from) * progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Option<Animation> {
        Animation::from_json(value.as_object().unwrap())
    }

    #[test]
    fn test_linear_tween() {
        let anim = Animation::new("x", 0.0, 2000.0, 100.0, 300.0);
        assert_eq!(anim.value_at(0.0), Some(100.0));
        assert_eq!(anim.value_at(1000.0), Some(200.0));
        assert_eq!(anim.value_at(2000.0), Some(300.0));
        assert_eq!(anim.value_at(3000.0), Some(300.0));
    }

    #[test]
    fn test_before_start_is_unset() {
        let anim = Animation::new("y", 500.0, 1500.0, 0.0, 10.0);
        assert_eq!(anim.value_at(499.0), None);
        assert_eq!(anim.value_at(500.0), Some(0.0));
    }

    #[test]
    fn test_zero_span_is_inert() {
        let anim = Animation::new("x", 1000.0, 1000.0, 0.0, 50.0);
        assert!(anim.is_inert());
        assert_eq!(anim.value_at(0.0), None);
        assert_eq!(anim.value_at(5000.0), None);
        assert!(Animation::new("x", 10.0, 5.0, 0.0, 1.0).is_inert());
    }

    #[test]
    fn test_defaults_from_payload() {
        let anim = parse(json!({"property": "opacity", "start": 250, "from": 0.2})).unwrap();
        assert_eq!(anim.end, 1250.0);
        assert_eq!(anim.to, 0.2);
        assert_eq!(anim.value_at(700.0), Some(0.2));
    }

    #[test]
    fn test_malformed_fields_do_not_fail() {
        let anim = parse(json!({"property": "x", "start": "soon", "end": [], "from": {}, "to": "9"})).unwrap();
        assert_eq!(anim.start, 0.0);
        assert_eq!(anim.end, 1000.0);
        assert_eq!(anim.from, 0.0);
        assert_eq!(anim.to, 9.0);
    }

    #[test]
    fn test_missing_property_is_dropped() {
        assert!(parse(json!({"start": 0, "end": 100})).is_none());
        assert!(parse(json!({"property": 3})).is_none());
        assert!(parse(json!({"property": ""})).is_none());
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let anim = parse(json!({"property": "x", "start": "0", "end": "100", "from": "1", "to": "2"})).unwrap();
        assert_eq!(anim.value_at(50.0), Some(1.5));
    }
}
