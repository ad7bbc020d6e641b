use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SplitbookError};
use crate::models::Party;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_party_a_name")]
    pub party_a_name: String,
    #[serde(default = "default_party_b_name")]
    pub party_b_name: String,
}

fn default_party_a_name() -> String {
    "Party A".to_string()
}

fn default_party_b_name() -> String {
    "Party B".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            party_a_name: default_party_a_name(),
            party_b_name: default_party_b_name(),
        }
    }
}

impl Settings {
    /// Display name for a party, e.g. in the balance line.
    pub fn name_of(&self, party: Party) -> &str {
        match party {
            Party::A => &self.party_a_name,
            Party::B => &self.party_b_name,
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("splitbook")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("splitbook")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| SplitbookError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}

pub fn db_path() -> PathBuf {
    get_data_dir().join("splitbook.db")
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/test".to_string(),
            party_a_name: "Alice".to_string(),
            party_b_name: "Bob".to_string(),
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.party_a_name, "Alice");
        assert_eq!(loaded.party_b_name, "Bob");
        assert_eq!(loaded.data_dir, "/tmp/test");
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.party_a_name, "Party A");
        assert_eq!(s.party_b_name, "Party B");
        assert!(!s.data_dir.is_empty());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/test", "party_a_name": "Alice"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.party_a_name, "Alice");
        assert_eq!(s.party_b_name, "Party B");
    }

    #[test]
    fn test_name_of() {
        let s = Settings {
            data_dir: String::new(),
            party_a_name: "Alice".to_string(),
            party_b_name: "Bob".to_string(),
        };
        assert_eq!(s.name_of(Party::A), "Alice");
        assert_eq!(s.name_of(Party::B), "Bob");
    }
}
