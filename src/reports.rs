//! Report rows assembled from events and references

use costline_core::types::Event;
use costline_deviation::{CostDeviation, CostReference, ReferenceTable};
use serde::Serialize;
use tracing::debug;

/// One costed event with its deviation against its type's reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationRow {
    /// The event
    pub event: Event,
    /// Reference costs of the event's type
    pub reference: CostReference,
    /// Deviation against `reference`
    pub deviation: CostDeviation,
}

/// Build deviation rows for every costed event with a known reference
///
/// Events keep their input order. Events without a cost, or whose type has
/// no reference, are left out.
pub fn deviation_rows(events: Vec<Event>, references: &ReferenceTable) -> Vec<DeviationRow> {
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for event in events {
        let Some(reference) = references.get(event.name.as_str()).copied() else {
            skipped += 1;
            continue;
        };
        let Some(deviation) = reference.deviation_for(&event) else {
            skipped += 1;
            continue;
        };
        rows.push(DeviationRow {
            event,
            reference,
            deviation,
        });
    }

    if skipped > 0 {
        debug!("Skipped {} events without cost or reference statistics", skipped);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use costline_core::types::{CostInfo, CurrencyCode, EventStatistics, Statistic};
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn test_deviation_rows_skip_uncosted_and_unknown() {
        let stats: Vec<EventStatistics> = serde_json::from_value(json!([{
            "name": "api_request",
            "averages": { "_cost_amount": "1.00" },
            "p99": { "_cost_amount": "2.00" }
        }]))
        .unwrap();
        let table = ReferenceTable::from_statistics(&stats, Statistic::P99);
        let usd = CurrencyCode::new("USD");
        let events = vec![
            Event::new("a", "api_request", "2024-01-02T00:00:00Z")
                .with_cost(CostInfo::new(Decimal::new(150, 2), usd.clone())),
            Event::new("b", "api_request", "2024-01-02T00:00:00Z"),
            Event::new("c", "page_view", "2024-01-02T00:00:00Z")
                .with_cost(CostInfo::new(Decimal::new(1, 0), usd)),
        ];

        let rows = deviation_rows(events, &table);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].event.id.as_str(), "a");
        assert_eq!(rows[0].deviation.bar_fill_percent, 50.0);
    }
}
