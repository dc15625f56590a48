//! Common test utilities and helpers for costline tests
//!
//! Builders for raw billing events and statistics records, plus helpers that
//! write them into temporary data directories the loader can read.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use costline::data_loader::DataLoader;
use costline::types::{DailyDate, EventStatistics};
use once_cell::sync::Lazy;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Event type names used across tests
pub const TEST_EVENT_NAMES: &[&str] = &["api_request", "storage_write", "batch_job"];

/// Statistics for `api_request`: average 1.00 USD, p95 2.00, p99 3.00
pub static API_REQUEST_STATS: Lazy<EventStatistics> =
    Lazy::new(|| stats_record("api_request", "1.00", "2.00", "3.00"));

/// Builder for raw event records as exported by the events endpoint
pub struct EventBuilder {
    id: String,
    name: String,
    label: String,
    timestamp: String,
    parent_id: Option<String>,
    cost: Option<(String, Option<String>)>,
}

impl EventBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: TEST_EVENT_NAMES[0].to_string(),
            label: String::new(),
            timestamp: "2024-01-01T12:00:00Z".to_string(),
            parent_id: None,
            cost: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn at(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = ts.to_rfc3339();
        self
    }

    /// Noon UTC on the given day
    pub fn on(self, year: i32, month: u32, day: u32) -> Self {
        self.at(Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap())
    }

    pub fn with_raw_timestamp(mut self, raw: &str) -> Self {
        self.timestamp = raw.to_string();
        self
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent_id = Some(parent.to_string());
        self
    }

    /// Attach a `_cost` object; `currency` of `None` leaves the field out
    pub fn with_cost(mut self, amount: &str, currency: Option<&str>) -> Self {
        self.cost = Some((amount.to_string(), currency.map(str::to_string)));
        self
    }

    pub fn build(self) -> Value {
        let mut metadata = serde_json::Map::new();
        if let Some((amount, currency)) = self.cost {
            let mut cost = serde_json::Map::new();
            cost.insert("amount".to_string(), Value::String(amount));
            if let Some(currency) = currency {
                cost.insert("currency".to_string(), Value::String(currency));
            }
            metadata.insert("_cost".to_string(), Value::Object(cost));
        }

        let mut record = json!({
            "id": self.id,
            "name": self.name,
            "label": self.label,
            "timestamp": self.timestamp,
            "metadata": metadata,
        });
        if let Some(parent) = self.parent_id {
            record["parent_id"] = Value::String(parent);
        }
        record
    }

    #[allow(clippy::wrong_self_convention)]
    pub fn to_jsonl(self) -> String {
        self.build().to_string()
    }
}

/// Statistics record with cost average, p95 and p99
pub fn stats_record(name: &str, average: &str, p95: &str, p99: &str) -> EventStatistics {
    let field = |value: &str| HashMap::from([("_cost_amount".to_string(), value.to_string())]);
    serde_json::from_value(json!({
        "name": name,
        "occurrences": 100,
        "averages": field(average),
        "p95": field(p95),
        "p99": field(p99),
    }))
    .unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> DailyDate {
    DailyDate::from_ymd(year, month, day).unwrap()
}

/// Temporary data directory the tests write pages into
pub struct TestDataDir {
    pub dir: TempDir,
}

impl TestDataDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Write a plain JSON array page
    pub async fn write_list_page(&self, file_name: &str, events: Vec<Value>) -> PathBuf {
        self.write_file(file_name, &Value::Array(events).to_string())
            .await
    }

    /// Write a `{ data, has_more }` envelope page
    pub async fn write_envelope_page(
        &self,
        file_name: &str,
        events: Vec<Value>,
        has_more: bool,
    ) -> PathBuf {
        let page = json!({ "data": events, "has_more": has_more });
        self.write_file(file_name, &page.to_string()).await
    }

    /// Write one record per line
    pub async fn write_jsonl(&self, file_name: &str, lines: Vec<String>) -> PathBuf {
        self.write_file(file_name, &lines.join("\n")).await
    }

    /// Write a statistics export
    pub async fn write_statistics(&self, file_name: &str, stats: &[EventStatistics]) -> PathBuf {
        let content = serde_json::to_string(stats).unwrap();
        self.write_file(file_name, &content).await
    }

    pub async fn write_file(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(file_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.unwrap();
        }
        let mut file = fs::File::create(&path).await.unwrap();
        file.write_all(content.as_bytes()).await.unwrap();
        file.flush().await.unwrap();
        path
    }

    pub async fn loader(&self) -> DataLoader {
        DataLoader::new(Some(self.dir.path()))
            .await
            .expect("Failed to create DataLoader")
    }
}
