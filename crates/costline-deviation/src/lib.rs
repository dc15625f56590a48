//! Cost deviation signals for costline
//!
//! Compares an event's cost against the average and percentile statistics of
//! its event type, producing the bar fill and color bucket of a deviation
//! bar. Colors come from a lookup table handed to the rendering layer.

pub mod cost_deviation;
pub mod palette;
pub mod reference;

pub use cost_deviation::{ColorBucket, CostDeviation, event_cost_deviation};
pub use palette::{ColorPalette, ColorToken};
pub use reference::{CostReference, ReferenceTable};
