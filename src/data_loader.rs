//! Data loader for exported billing event pages
//!
//! Events arrive as pages fetched from the billing API and saved to disk,
//! either as JSON pages or as JSONL files with one event per line. This
//! module finds those files, streams their events and resolves each raw
//! record into a typed [`Event`] exactly once.
//!
//! # Data location
//!
//! The loader reads `<platform data dir>/costline` (e.g.
//! `~/.local/share/costline` on Linux) unless an explicit path is given. The
//! CLI takes that path from `--data-path` or `COSTLINE_DATA_PATH`. The path
//! may be a directory, searched recursively, or a single file.
//!
//! # Examples
//!
//! ```no_run
//! use costline::data_loader::DataLoader;
//! use futures::StreamExt;
//!
//! # async fn example() -> costline::Result<()> {
//! let loader = DataLoader::new(None).await?;
//!
//! let events = loader.load_events();
//! tokio::pin!(events);
//! while let Some(event) = events.next().await {
//!     let event = event?;
//!     println!("{} {}", event.raw_timestamp, event.name);
//! }
//! # Ok(())
//! # }
//! ```

use costline_core::error::{CostlineError, Result};
use costline_core::types::{Event, EventStatistics, RawEvent};
use futures::StreamExt;
use futures::stream::Stream;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Directory name under the platform data dir
pub const DATA_DIR_NAME: &str = "costline";

/// One saved page of the events list endpoint
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventPage {
    List(Vec<RawEvent>),
    Envelope {
        data: Vec<RawEvent>,
        #[serde(default)]
        has_more: bool,
    },
}

impl EventPage {
    fn into_events(self) -> Vec<RawEvent> {
        match self {
            Self::List(events) => events,
            Self::Envelope { data, has_more } => {
                if has_more {
                    debug!("Page reports more results; only saved pages are loaded");
                }
                data
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatisticsPage {
    List(Vec<EventStatistics>),
    Envelope { data: Vec<EventStatistics> },
}

/// Loader for saved event pages
pub struct DataLoader {
    /// Directories or files searched for pages
    data_paths: Vec<PathBuf>,
}

impl DataLoader {
    /// Create a loader over `path_override`, or the default data directory
    ///
    /// # Errors
    ///
    /// Returns [`CostlineError::Config`] when the explicit path does not
    /// exist and [`CostlineError::NoDataDirectory`] when no default
    /// directory is present.
    pub async fn new(path_override: Option<&Path>) -> Result<Self> {
        if let Some(path) = path_override {
            if !tokio::fs::try_exists(path).await? {
                return Err(CostlineError::Config(format!(
                    "data path {} does not exist",
                    path.display()
                )));
            }
            return Ok(Self::from_paths(vec![path.to_path_buf()]));
        }

        let paths = Self::discover_data_paths().await;
        if paths.is_empty() {
            return Err(CostlineError::NoDataDirectory);
        }

        debug!("Discovered {} event data directories", paths.len());
        Ok(Self::from_paths(paths))
    }

    /// Create a loader over explicit paths without checking them
    pub fn from_paths(data_paths: Vec<PathBuf>) -> Self {
        Self { data_paths }
    }

    async fn discover_data_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(data_dir) = dirs::data_dir() {
            let path = data_dir.join(DATA_DIR_NAME);
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                paths.push(path);
            }
        }

        paths
    }

    /// Find every `.json` and `.jsonl` file under the data paths, sorted
    pub async fn find_event_files(&self) -> Result<Vec<PathBuf>> {
        let roots = self.data_paths.clone();

        let mut files = tokio::task::spawn_blocking(move || {
            let mut files = Vec::new();
            for root in roots {
                for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
                    if entry.file_type().is_file() && is_event_file(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
            }
            files
        })
        .await
        .map_err(|e| CostlineError::Io(std::io::Error::other(e)))?;

        files.sort();
        files.dedup();
        debug!("Found {} event files", files.len());
        Ok(files)
    }

    /// Stream every event once, in file order
    ///
    /// Events repeated across pages are yielded only on first sight.
    pub fn load_events(&self) -> impl Stream<Item = Result<Event>> + '_ {
        async_stream::stream! {
            let files = match self.find_event_files().await {
                Ok(files) => files,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let mut seen = HashSet::new();
            for file_path in files {
                let raw_events = Self::parse_file_stream(file_path);
                tokio::pin!(raw_events);
                while let Some(result) = raw_events.next().await {
                    match result {
                        Ok(raw) => {
                            if seen.insert(raw.id.clone()) {
                                yield Ok(Event::from_raw(raw));
                            } else {
                                debug!("Skipping duplicate event {}", raw.id);
                            }
                        }
                        Err(e) => {
                            yield Err(e);
                        }
                    }
                }
            }
        }
    }

    /// Load every event, newest first
    ///
    /// Events without a valid timestamp sort last, in load order.
    pub async fn load_events_sorted(&self) -> Result<Vec<Event>> {
        let stream = self.load_events();
        tokio::pin!(stream);

        let mut events = Vec::new();
        while let Some(event) = stream.next().await {
            events.push(event?);
        }

        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        debug!("Loaded {} events", events.len());
        Ok(events)
    }

    /// Parse one page file as a stream of raw events
    ///
    /// Lines and pages that do not hold events are logged and skipped; only
    /// I/O failures are yielded as errors.
    fn parse_file_stream(path: PathBuf) -> impl Stream<Item = Result<RawEvent>> {
        async_stream::stream! {
            if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
                let file = match tokio::fs::File::open(&path).await {
                    Ok(f) => f,
                    Err(e) => {
                        yield Err(e.into());
                        return;
                    }
                };

                let mut reader = BufReader::new(file);
                let mut buf = Vec::new();
                let mut line_number = 0;
                loop {
                    buf.clear();
                    match reader.read_until(b'\n', &mut buf).await {
                        Ok(0) => break,
                        Ok(_) => {}
                        Err(e) => {
                            yield Err(e.into());
                            return;
                        }
                    }
                    line_number += 1;

                    let line = match std::str::from_utf8(&buf) {
                        Ok(line) => line.trim(),
                        Err(e) => {
                            warn!(
                                "Skipping line {} in {}: invalid UTF-8 ({})",
                                line_number,
                                path.display(),
                                e
                            );
                            continue;
                        }
                    };
                    if line.is_empty() {
                        continue;
                    }

                    match serde_json::from_str::<RawEvent>(line) {
                        Ok(raw) => yield Ok(raw),
                        Err(e) => {
                            warn!(
                                "Failed to parse line {} in {}: {}",
                                line_number,
                                path.display(),
                                e
                            );
                        }
                    }
                }
            } else {
                let content = match tokio::fs::read(&path).await {
                    Ok(content) => content,
                    Err(e) => {
                        yield Err(e.into());
                        return;
                    }
                };

                match serde_json::from_slice::<EventPage>(&content) {
                    Ok(page) => {
                        for raw in page.into_events() {
                            yield Ok(raw);
                        }
                    }
                    Err(e) => {
                        warn!("Skipping {}: not an event page ({})", path.display(), e);
                    }
                }
            }
        }
    }

    /// Get the searched data paths
    pub fn paths(&self) -> &[PathBuf] {
        &self.data_paths
    }
}

fn is_event_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("json") | Some("jsonl")
    )
}

/// Load a statistics export
///
/// Accepts a JSON array of statistics records or a `{ "data": [...] }`
/// envelope.
pub async fn load_statistics(path: &Path) -> Result<Vec<EventStatistics>> {
    let content = tokio::fs::read_to_string(path).await?;
    let page: StatisticsPage =
        serde_json::from_str(&content).map_err(|e| CostlineError::Parse {
            file: path.to_path_buf(),
            error: e.to_string(),
        })?;

    let stats = match page {
        StatisticsPage::List(stats) => stats,
        StatisticsPage::Envelope { data } => data,
    };
    debug!("Loaded statistics for {} event types", stats.len());
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;

    async fn write(path: &Path, content: &str) {
        let mut file = tokio::fs::File::create(path).await.unwrap();
        file.write_all(content.as_bytes()).await.unwrap();
    }

    #[tokio::test]
    async fn test_jsonl_parsing_skips_bad_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("events.jsonl");
        write(
            &path,
            concat!(
                r#"{"id":"evt_1","name":"api_request","timestamp":"2024-01-01T00:00:00Z"}"#,
                "\n\n",
                "not json\n",
                r#"{"id":"evt_2","name":"api_request","timestamp":"2024-01-02T00:00:00Z","metadata":{"_cost":{"amount":"0.5","currency":"USD"}}}"#,
                "\n",
            ),
        )
        .await;

        let stream = DataLoader::parse_file_stream(path);
        tokio::pin!(stream);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.id, "evt_1");
        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.id, "evt_2");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_json_envelope_page() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("page-1.json");
        write(
            &path,
            r#"{"data":[{"id":"evt_1","name":"api_request","timestamp":"2024-01-01T00:00:00Z"}],"has_more":true}"#,
        )
        .await;

        let stream = DataLoader::parse_file_stream(path);
        tokio::pin!(stream);

        assert_eq!(stream.next().await.unwrap().unwrap().id, "evt_1");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_non_event_json_page_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("page-1.json");
        write(&path, r#"{"events": 3}"#).await;

        let stream = DataLoader::parse_file_stream(path);
        tokio::pin!(stream);

        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_jsonl_invalid_utf8_line_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("events.jsonl");
        let mut content = Vec::new();
        content.extend_from_slice(
            br#"{"id":"a","name":"api_request","timestamp":"2024-01-01T00:00:00Z"}"#,
        );
        content.extend_from_slice(b"\n\xff\xfe garbage\n");
        content.extend_from_slice(
            br#"{"id":"b","name":"api_request","timestamp":"2024-01-02T00:00:00Z"}"#,
        );
        tokio::fs::write(&path, content).await.unwrap();

        let stream = DataLoader::parse_file_stream(path);
        tokio::pin!(stream);

        assert_eq!(stream.next().await.unwrap().unwrap().id, "a");
        assert_eq!(stream.next().await.unwrap().unwrap().id, "b");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_missing_override_is_config_error() {
        let result = DataLoader::new(Some(Path::new("/nonexistent/costline/data"))).await;
        assert!(matches!(result, Err(CostlineError::Config(_))));
    }

    #[tokio::test]
    async fn test_find_event_files_recurses_and_filters() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("2024").join("01");
        tokio::fs::create_dir_all(&nested).await.unwrap();
        write(&nested.join("page-2.json"), "[]").await;
        write(&temp_dir.path().join("page-1.jsonl"), "").await;
        write(&temp_dir.path().join("notes.txt"), "ignored").await;

        let loader = DataLoader::from_paths(vec![temp_dir.path().to_path_buf()]);
        let files = loader.find_event_files().await.unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| is_event_file(f)));
    }
}
