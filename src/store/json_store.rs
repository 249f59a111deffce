use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

use crate::session::result::SessionReport;
use crate::store::schema::HistoryData;

const HISTORY_FILE: &str = "history.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocadrill");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => T::default(),
            }
        } else {
            T::default()
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Session history. A stale schema starts over from empty.
    pub fn load_history(&self) -> HistoryData {
        let data: HistoryData = self.load(HISTORY_FILE);
        if data.needs_reset() {
            HistoryData::default()
        } else {
            data
        }
    }

    pub fn save_history(&self, data: &HistoryData) -> Result<()> {
        self.save(HISTORY_FILE, data)
    }

    pub fn append_report(&self, report: &SessionReport) -> Result<usize> {
        let mut history = self.load_history();
        history.sessions.push(report.clone());
        self.save_history(&history)?;
        Ok(history.sessions.len())
    }
}
