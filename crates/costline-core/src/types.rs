//! Core domain types for costline
//!
//! Strongly-typed wrappers for the billing event records and per-type
//! statistics consumed from the billing API exports, plus the date types used
//! for day bucketing.
//!
//! Loose JSON metadata is resolved once, in [`Event::from_raw`]. Everything
//! downstream reads the typed [`Event::cost`] field instead of digging into
//! `metadata` again.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Metadata key holding the `{ amount, currency }` cost object of an event
pub const COST_METADATA_KEY: &str = "_cost";

/// Aggregate field name under which statistics report event cost amounts
pub const COST_AMOUNT_FIELD: &str = "_cost_amount";

/// Currency assumed when a cost object omits its currency
pub const DEFAULT_CURRENCY: &str = "USD";

/// Strongly-typed event identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Create a new EventId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EventId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Event type name
///
/// Events and their aggregate statistics are organized under this key.
///
/// # Examples
/// ```
/// use costline_core::types::EventName;
///
/// let name = EventName::new("api_request");
/// assert_eq!(name.as_str(), "api_request");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventName(String);

impl EventName {
    /// Create a new EventName from any string-like type
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO timestamp wrapper for UTC timestamps
///
/// # Examples
/// ```
/// use costline_core::types::ISOTimestamp;
///
/// let ts = ISOTimestamp::parse("2024-01-15T23:30:00-05:00").unwrap();
/// assert_eq!(ts.to_daily_date().to_string(), "2024-01-16");
/// assert!(ISOTimestamp::parse("yesterday").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ISOTimestamp(DateTime<Utc>);

impl ISOTimestamp {
    /// Create a new ISOTimestamp
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parse an RFC 3339 timestamp, normalizing it to UTC
    pub fn parse(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Get the inner DateTime
    pub fn inner(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Convert to DailyDate using UTC
    pub fn to_daily_date(&self) -> DailyDate {
        DailyDate::new(self.0.date_naive())
    }

    /// Convert to DailyDate using specified timezone
    pub fn to_daily_date_with_tz(&self, tz: &Tz) -> DailyDate {
        let local_dt = self.0.with_timezone(tz);
        DailyDate::new(local_dt.date_naive())
    }
}

impl AsRef<DateTime<Utc>> for ISOTimestamp {
    fn as_ref(&self) -> &DateTime<Utc> {
        &self.0
    }
}

/// Calendar date without time information
///
/// # Examples
/// ```
/// use costline_core::types::DailyDate;
///
/// let daily = DailyDate::from_ymd(2024, 1, 15).unwrap();
/// assert_eq!(daily.format("%Y-%m-%d"), "2024-01-15");
/// assert_eq!(daily.format("%B %d, %Y"), "January 15, 2024");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Create from year, month and day; `None` for impossible dates
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// Create from a timestamp using specified timezone
    pub fn from_timestamp_with_tz(ts: &ISOTimestamp, tz: &Tz) -> Self {
        ts.to_daily_date_with_tz(tz)
    }

    /// The following calendar day
    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// The preceding calendar day
    pub fn pred(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    /// Whole days from `self` to `other` (negative when `other` is earlier)
    pub fn days_until(&self, other: &DailyDate) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for DailyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Bucket key for day grouping
///
/// Events whose timestamp could not be parsed are not dropped; they share the
/// `Invalid` bucket, which sorts after every real date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayKey {
    /// A calendar day in the bucketing timezone
    Date(DailyDate),
    /// Timestamp missing or malformed
    Invalid,
}

impl DayKey {
    /// Derive the bucket key of an optional timestamp in `tz`
    pub fn from_timestamp(ts: Option<&ISOTimestamp>, tz: &Tz) -> Self {
        match ts {
            Some(ts) => Self::Date(ts.to_daily_date_with_tz(tz)),
            None => Self::Invalid,
        }
    }

    /// The calendar day, if this key names one
    pub fn as_date(&self) -> Option<DailyDate> {
        match self {
            Self::Date(date) => Some(*date),
            Self::Invalid => None,
        }
    }
}

impl From<DailyDate> for DayKey {
    fn from(date: DailyDate) -> Self {
        Self::Date(date)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{date}"),
            Self::Invalid => write!(f, "Invalid Date"),
        }
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// ISO 4217 currency code, normalized to upper case
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a new CurrencyCode
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed cost of a single event
///
/// # Examples
/// ```
/// use costline_core::types::CostInfo;
/// use serde_json::json;
///
/// let metadata = json!({ "_cost": { "amount": "0.0125", "currency": "eur" } });
/// let cost = CostInfo::from_metadata(metadata.as_object().unwrap()).unwrap();
/// assert_eq!(cost.currency.as_str(), "EUR");
/// assert_eq!(cost.amount_f64(), 0.0125);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostInfo {
    /// Cost amount
    pub amount: Decimal,
    /// Currency of `amount`
    pub currency: CurrencyCode,
}

impl CostInfo {
    /// Create a new CostInfo
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Resolve the `_cost` object of an event's metadata
    ///
    /// Returns `None` when the object is absent or its amount is not a
    /// decimal. The amount may be a decimal string or a JSON number.
    pub fn from_metadata(metadata: &Map<String, Value>) -> Option<Self> {
        let cost = metadata.get(COST_METADATA_KEY)?.as_object()?;

        let amount = match cost.get("amount")? {
            Value::String(s) => parse_decimal(s),
            Value::Number(n) => parse_decimal(&n.to_string()),
            _ => None,
        };
        let Some(amount) = amount else {
            tracing::debug!("Ignoring cost metadata with unparseable amount: {:?}", cost);
            return None;
        };

        let currency = cost
            .get("currency")
            .and_then(Value::as_str)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_CURRENCY);

        Some(Self::new(amount, CurrencyCode::new(currency)))
    }

    /// Amount as a float, for visual computations
    pub fn amount_f64(&self) -> f64 {
        self.amount.to_f64().unwrap_or(0.0)
    }
}

/// Parse a decimal string in plain or scientific notation
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Raw event record as exported by the billing API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    /// Event identifier
    pub id: String,
    /// Event type name
    pub name: String,
    /// Human readable label
    #[serde(default)]
    pub label: String,
    /// ISO-8601 timestamp
    #[serde(default)]
    pub timestamp: String,
    /// Parent event for nested events
    #[serde(default, alias = "parentId")]
    pub parent_id: Option<String>,
    /// Free-form metadata; may carry `_cost`
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Billing event with its timestamp and cost resolved
///
/// # Examples
/// ```
/// use costline_core::types::Event;
///
/// let event = Event::new("evt_1", "api_request", "2024-01-05T08:00:00Z");
/// assert!(event.timestamp.is_some());
/// assert!(event.cost.is_none());
/// assert_eq!(event.cost_amount(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Event identifier
    pub id: EventId,
    /// Event type name
    pub name: EventName,
    /// Human readable label
    pub label: String,
    /// Parsed timestamp; `None` when the raw value is malformed
    #[serde(skip)]
    pub timestamp: Option<ISOTimestamp>,
    /// Timestamp exactly as received
    #[serde(rename = "timestamp")]
    pub raw_timestamp: String,
    /// Parent event identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<EventId>,
    /// Free-form metadata
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// Resolved `_cost` metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostInfo>,
}

impl Event {
    /// Create an event with no label, parent, metadata, or cost
    pub fn new(id: impl Into<String>, name: impl Into<String>, timestamp: impl Into<String>) -> Self {
        let raw_timestamp = timestamp.into();
        Self {
            id: EventId::new(id),
            name: EventName::new(name),
            label: String::new(),
            timestamp: ISOTimestamp::parse(&raw_timestamp),
            raw_timestamp,
            parent_id: None,
            metadata: Map::new(),
            cost: None,
        }
    }

    /// Create from a raw API record, resolving timestamp and cost
    pub fn from_raw(raw: RawEvent) -> Self {
        let timestamp = ISOTimestamp::parse(&raw.timestamp);
        if timestamp.is_none() {
            tracing::debug!(
                "Event {} has malformed timestamp '{}'",
                raw.id,
                raw.timestamp
            );
        }
        let cost = CostInfo::from_metadata(&raw.metadata);

        Self {
            id: EventId::new(raw.id),
            name: EventName::new(raw.name),
            label: raw.label,
            timestamp,
            raw_timestamp: raw.timestamp,
            parent_id: raw.parent_id.map(EventId::new),
            metadata: raw.metadata,
            cost,
        }
    }

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the parent event
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(EventId::new(parent_id));
        self
    }

    /// Attach a cost
    pub fn with_cost(mut self, cost: CostInfo) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Cost amount as a float; `0.0` when the event carries no cost
    pub fn cost_amount(&self) -> f64 {
        self.cost.as_ref().map(CostInfo::amount_f64).unwrap_or(0.0)
    }

    /// Bucket key of this event in `tz`
    pub fn day_key(&self, tz: &Tz) -> DayKey {
        DayKey::from_timestamp(self.timestamp.as_ref(), tz)
    }
}

/// Aggregate statistic selectable from an [`EventStatistics`] record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    /// Sum over the period
    Total,
    /// Mean over the period
    Average,
    /// 10th percentile
    P10,
    /// Median
    P50,
    /// 95th percentile
    P95,
    /// 99th percentile
    #[default]
    P99,
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Total => write!(f, "total"),
            Self::Average => write!(f, "average"),
            Self::P10 => write!(f, "p10"),
            Self::P50 => write!(f, "p50"),
            Self::P95 => write!(f, "p95"),
            Self::P99 => write!(f, "p99"),
        }
    }
}

impl FromStr for Statistic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "total" => Ok(Self::Total),
            "average" | "avg" => Ok(Self::Average),
            "p10" => Ok(Self::P10),
            "p50" | "median" => Ok(Self::P50),
            "p95" => Ok(Self::P95),
            "p99" => Ok(Self::P99),
            _ => Err(format!("Invalid statistic: {s}")),
        }
    }
}

/// Per-type aggregate statistics for a period
///
/// Every map is keyed by aggregate field name (e.g. `_cost_amount`) and holds
/// decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventStatistics {
    /// Event type these statistics describe
    pub name: EventName,
    /// Number of events of this type in the period
    #[serde(default)]
    pub occurrences: u64,
    /// Sums over the period
    #[serde(default)]
    pub totals: HashMap<String, String>,
    /// Means over the period
    #[serde(default)]
    pub averages: HashMap<String, String>,
    /// 10th percentiles
    #[serde(default)]
    pub p10: HashMap<String, String>,
    /// Medians
    #[serde(default)]
    pub p50: HashMap<String, String>,
    /// 95th percentiles
    #[serde(default)]
    pub p95: HashMap<String, String>,
    /// 99th percentiles, the default deviation threshold
    #[serde(default)]
    pub p99: HashMap<String, String>,
}

impl EventStatistics {
    /// Raw map backing a statistic
    pub fn values(&self, statistic: Statistic) -> &HashMap<String, String> {
        match statistic {
            Statistic::Total => &self.totals,
            Statistic::Average => &self.averages,
            Statistic::P10 => &self.p10,
            Statistic::P50 => &self.p50,
            Statistic::P95 => &self.p95,
            Statistic::P99 => &self.p99,
        }
    }

    /// Numeric value of `statistic` for `field`, if present and decimal
    pub fn metric(&self, statistic: Statistic, field: &str) -> Option<f64> {
        self.values(statistic)
            .get(field)
            .and_then(|s| parse_decimal(s))
            .and_then(|d| d.to_f64())
    }

    /// Numeric value of `statistic` for the event cost amount field
    pub fn cost_metric(&self, statistic: Statistic) -> Option<f64> {
        self.metric(statistic, COST_AMOUNT_FIELD)
    }
}
