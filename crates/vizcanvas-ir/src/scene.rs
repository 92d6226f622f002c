use serde::Serialize;
use serde_json::Value;
use vizcanvas_core::Duration;

use crate::layer::Layer;
use crate::props::coerce_number;

/// Loop period of a scene that declares none.
pub const DEFAULT_DURATION_MS: u64 = 5000;

/// A normalized, drawable scene: an ordered layer stack that loops every
/// `duration_ms` milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    /// Loop period, always positive.
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    /// Bottom to top draw order.
    pub layers: Vec<Layer>,
}

impl Scene {
    /// Create a scene; a zero duration is replaced by the default.
    pub fn new(duration_ms: u64, layers: Vec<Layer>) -> Self {
        Self {
            duration_ms: if duration_ms == 0 {
                DEFAULT_DURATION_MS
            } else {
                duration_ms
            },
            layers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Scene time for a given amount of elapsed playback time.
    ///
    /// Elapsed time beyond the duration wraps back into `[0, duration]`.
    pub fn effective_time(&self, elapsed: Duration) -> Duration {
        elapsed.wrap(self.duration_ms)
    }

    /// Number of animations across all layers.
    pub fn animation_count(&self) -> usize {
        self.layers.iter().map(|l| l.animations.len()).sum()
    }
}

/// Read a payload `duration` field.
///
/// Accepts numbers and numeric strings, rounded to whole milliseconds. A
/// missing, malformed, or non-positive value yields `default_ms`.
pub fn parse_duration(value: Option<&Value>, default_ms: u64) -> u64 {
    match value.and_then(coerce_number) {
        Some(ms) if ms.round() >= 1.0 => {
            let rounded = ms.round();
            if rounded >= u64::MAX as f64 {
                u64::MAX
            } else {
                rounded as u64
            }
        }
        _ => default_ms,
    }
}
