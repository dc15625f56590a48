//! Reference costs resolved from event statistics

use crate::cost_deviation::{CostDeviation, event_cost_deviation};
use costline_core::types::{Event, EventStatistics, Statistic};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Average and threshold cost of one event type
///
/// # Examples
/// ```
/// use costline_core::types::{CostInfo, CurrencyCode, Event};
/// use costline_deviation::CostReference;
/// use rust_decimal::Decimal;
///
/// let reference = CostReference::new(1.0, 2.0);
/// let event = Event::new("evt_1", "api_request", "2024-01-05T10:00:00Z")
///     .with_cost(CostInfo::new(Decimal::new(15, 1), CurrencyCode::new("USD")));
///
/// let deviation = reference.deviation_for(&event).unwrap();
/// assert_eq!(deviation.bar_fill_percent, 50.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostReference {
    /// Average cost
    pub average: f64,
    /// Upper reference cost (p99 unless configured otherwise)
    pub threshold: f64,
}

impl CostReference {
    /// Create a new CostReference
    pub fn new(average: f64, threshold: f64) -> Self {
        Self { average, threshold }
    }

    /// Resolve the `_cost_amount` average and `threshold` statistic
    ///
    /// Returns `None` when either value is missing or not a decimal.
    pub fn from_statistics(stats: &EventStatistics, threshold: Statistic) -> Option<Self> {
        let average = stats.cost_metric(Statistic::Average)?;
        let threshold = stats.cost_metric(threshold)?;
        Some(Self::new(average, threshold))
    }

    /// Deviation of `cost` against this reference
    pub fn deviation(&self, cost: f64) -> CostDeviation {
        event_cost_deviation(cost, self.average, self.threshold)
    }

    /// Deviation of an event's cost; `None` when the event has no cost
    pub fn deviation_for(&self, event: &Event) -> Option<CostDeviation> {
        event.cost.as_ref().map(|cost| self.deviation(cost.amount_f64()))
    }
}

/// Cost references keyed by event type name
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    references: HashMap<String, CostReference>,
}

impl ReferenceTable {
    /// Build from a statistics export, skipping types without cost data
    pub fn from_statistics<'a, I>(stats: I, threshold: Statistic) -> Self
    where
        I: IntoIterator<Item = &'a EventStatistics>,
    {
        let mut references = HashMap::new();
        for entry in stats {
            match CostReference::from_statistics(entry, threshold) {
                Some(reference) => {
                    references.insert(entry.name.as_str().to_string(), reference);
                }
                None => debug!(
                    "No average/{} cost statistics for event type '{}'",
                    threshold, entry.name
                ),
            }
        }
        Self { references }
    }

    /// Reference of an event type
    pub fn get(&self, name: &str) -> Option<&CostReference> {
        self.references.get(name)
    }

    /// Deviation of an event against its own type's reference
    pub fn deviation_for(&self, event: &Event) -> Option<CostDeviation> {
        self.get(event.name.as_str())?.deviation_for(event)
    }

    /// Number of event types with a reference
    pub fn len(&self) -> usize {
        self.references.len()
    }

    /// Whether no event type has a reference
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}
