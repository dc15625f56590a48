//! Cost deviation bands
//!
//! Maps one event's cost against the average and an upper threshold
//! (normally p99) of its event type. The result drives the deviation bar:
//! how far the bar fills and which color it takes.
//!
//! Above the average, the bar fills proportionally to the cost's position
//! between the average and the threshold. At or below the average, it fills
//! proportionally to how far under the average the cost is.
//!
//! # Examples
//!
//! ```
//! use costline_deviation::cost_deviation::{ColorBucket, event_cost_deviation};
//!
//! let deviation = event_cost_deviation(150.0, 100.0, 200.0);
//! assert_eq!(deviation.deviation_percent, 50.0);
//! assert_eq!(deviation.bar_fill_percent, 50.0);
//! assert_eq!(deviation.color_bucket, ColorBucket::Elevated);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position below which an above-average cost is `Moderate`
pub const MODERATE_CUTOFF: f64 = 0.5;

/// Position below which an above-average cost is `Elevated`; `Extreme` above
pub const ELEVATED_CUTOFF: f64 = 0.85;

/// Color class of a deviation bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBucket {
    /// At or below the average
    Below,
    /// Above average, in the lower half of the way to the threshold
    Moderate,
    /// Above average, approaching the threshold
    Elevated,
    /// At or beyond 85% of the way to the threshold
    Extreme,
}

impl ColorBucket {
    /// Bucket of an above-average position in `[0, 1+]`
    pub fn for_position(position: f64) -> Self {
        if position < MODERATE_CUTOFF {
            Self::Moderate
        } else if position < ELEVATED_CUTOFF {
            Self::Elevated
        } else {
            Self::Extreme
        }
    }

    /// All buckets, lowest first
    pub const ALL: [ColorBucket; 4] = [Self::Below, Self::Moderate, Self::Elevated, Self::Extreme];
}

impl fmt::Display for ColorBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Below => write!(f, "below"),
            Self::Moderate => write!(f, "moderate"),
            Self::Elevated => write!(f, "elevated"),
            Self::Extreme => write!(f, "extreme"),
        }
    }
}

/// Visual deviation of one event's cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostDeviation {
    /// Signed offset from the average, in percent of the average
    pub deviation_percent: f64,
    /// Whether the cost is strictly above the average
    pub is_above_average: bool,
    /// Normalized position the bar fill is derived from
    pub position: f64,
    /// Bar fill in `[0, 100]`
    pub bar_fill_percent: f64,
    /// Bar color class
    pub color_bucket: ColorBucket,
}

/// Compute the deviation of `event_cost` against its type's reference costs
///
/// Every division is guarded: a non-positive average yields a deviation of
/// zero, and a threshold at or under the average yields an empty bar.
pub fn event_cost_deviation(event_cost: f64, average_cost: f64, threshold_cost: f64) -> CostDeviation {
    let deviation_percent = if average_cost > 0.0 {
        (event_cost - average_cost) / average_cost * 100.0
    } else {
        0.0
    };
    let is_above_average = event_cost > average_cost;

    if is_above_average {
        let range = threshold_cost - average_cost;
        let position = if range > 0.0 {
            (event_cost - average_cost) / range
        } else {
            0.0
        };

        CostDeviation {
            deviation_percent,
            is_above_average,
            position,
            bar_fill_percent: clamp_percent(position * 100.0),
            color_bucket: ColorBucket::for_position(position),
        }
    } else {
        let position = if average_cost > 0.0 {
            event_cost / average_cost
        } else {
            1.0
        };

        CostDeviation {
            deviation_percent,
            is_above_average,
            position,
            bar_fill_percent: clamp_percent((1.0 - position) * 100.0),
            color_bucket: ColorBucket::Below,
        }
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
