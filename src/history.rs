use crate::controller::ResultConsumer;
use crate::session::RoundResult;
use directories::ProjectDirs;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Where finished rounds go. Recording is best-effort: failures are
/// swallowed at this boundary and never reach the game.
pub trait ResultStore: Send + Sync {
    fn record(&self, result: &RoundResult);
    /// Stored results in insertion order. Empty when the store is
    /// unreachable.
    fn recent(&self) -> Vec<RoundResult>;
}

impl<T: ResultStore + ?Sized> ResultStore for Arc<T> {
    fn record(&self, result: &RoundResult) {
        (**self).record(result);
    }

    fn recent(&self) -> Vec<RoundResult> {
        (**self).recent()
    }
}

/// Backend over HTTP: `POST /api/results` to record, `GET /api/results` to
/// list. Records fire-and-forget on a detached thread so a slow or dead
/// backend can't stall the event loop.
pub struct HttpResultStore {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpResultStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn results_url(&self) -> String {
        format!("{}/api/results", self.base_url)
    }
}

impl ResultStore for HttpResultStore {
    fn record(&self, result: &RoundResult) {
        let url = self.results_url();
        let client = self.client.clone();
        let body = result.clone();
        thread::spawn(move || {
            let _ = client.post(url).json(&body).send();
        });
    }

    fn recent(&self) -> Vec<RoundResult> {
        self.client
            .get(self.results_url())
            .send()
            .and_then(|resp| resp.json::<Vec<RoundResult>>())
            .unwrap_or_default()
    }
}

/// Local round log, one CSV row per finished round under the platform
/// config dir. Header is emitted on first write.
pub struct CsvResultStore {
    path: PathBuf,
}

impl CsvResultStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "blitztype") {
            pd.config_dir().join("rounds.csv")
        } else {
            PathBuf::from("blitztype_rounds.csv")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    fn append(&self, result: &RoundResult) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let needs_header = !self.path.exists();
        let file = OpenOptions::new().append(true).create(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(result)?;
        writer.flush()?;
        Ok(())
    }
}

impl ResultStore for CsvResultStore {
    fn record(&self, result: &RoundResult) {
        let _ = self.append(result);
    }

    fn recent(&self) -> Vec<RoundResult> {
        let Ok(mut reader) = csv::Reader::from_path(&self.path) else {
            return vec![];
        };
        reader
            .deserialize::<RoundResult>()
            .filter_map(|row| row.ok())
            .collect()
    }
}

/// In-memory store for headless runs and tests.
#[derive(Default, Clone)]
pub struct MemoryResultStore {
    results: Arc<Mutex<Vec<RoundResult>>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryResultStore {
    fn record(&self, result: &RoundResult) {
        if let Ok(mut results) = self.results.lock() {
            results.push(result.clone());
        }
    }

    fn recent(&self) -> Vec<RoundResult> {
        self.results.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

/// The consumer handed to the controller: fans the single finalized result
/// out to every registered store.
pub struct StoreConsumer {
    stores: Vec<Box<dyn ResultStore>>,
}

impl StoreConsumer {
    pub fn new(stores: Vec<Box<dyn ResultStore>>) -> Self {
        Self { stores }
    }
}

impl ResultConsumer for StoreConsumer {
    fn on_finish(&mut self, result: &RoundResult) {
        for store in &self.stores {
            store.record(result);
        }
    }
}
