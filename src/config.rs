use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::pool::Policy;
use crate::session::quiz::{Mode, QuizSettings};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_manifest")]
    pub manifest: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default)]
    pub policy: Policy,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_missed_log")]
    pub missed_log: String,
    #[serde(default = "default_save_file")]
    pub save_file: String,
    #[serde(default = "default_dump_file")]
    pub dump_file: String,
    #[serde(default = "default_list_page_size")]
    pub list_page_size: usize,
    #[serde(default = "default_dump_page_size")]
    pub dump_page_size: usize,
    #[serde(default = "default_dump_words_per_line")]
    pub dump_words_per_line: usize,
    #[serde(default = "default_history_enabled")]
    pub history_enabled: bool,
}

fn default_manifest() -> String {
    "file.list".to_string()
}
fn default_max_attempts() -> usize {
    1000
}
fn default_missed_log() -> String {
    "wrong.txt".to_string()
}
fn default_save_file() -> String {
    "save.txt".to_string()
}
fn default_dump_file() -> String {
    "dump.txt".to_string()
}
fn default_list_page_size() -> usize {
    500
}
fn default_dump_page_size() -> usize {
    100
}
fn default_dump_words_per_line() -> usize {
    10
}
fn default_history_enabled() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            max_attempts: default_max_attempts(),
            policy: Policy::default(),
            mode: Mode::default(),
            missed_log: default_missed_log(),
            save_file: default_save_file(),
            dump_file: default_dump_file(),
            list_page_size: default_list_page_size(),
            dump_page_size: default_dump_page_size(),
            dump_words_per_line: default_dump_words_per_line(),
            history_enabled: default_history_enabled(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocadrill")
            .join("config.toml")
    }

    /// Reset zero counts, which would stall a session or a listing.
    pub fn normalize(&mut self) {
        if self.max_attempts == 0 {
            self.max_attempts = default_max_attempts();
        }
        if self.list_page_size == 0 {
            self.list_page_size = default_list_page_size();
        }
        if self.dump_page_size == 0 {
            self.dump_page_size = default_dump_page_size();
        }
        if self.dump_words_per_line == 0 {
            self.dump_words_per_line = default_dump_words_per_line();
        }
    }

    pub fn quiz_settings(&self) -> QuizSettings {
        QuizSettings {
            policy: self.policy,
            mode: self.mode,
            max_attempts: self.max_attempts,
        }
    }
}
