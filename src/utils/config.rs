use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::error::{RatError, RatResult};

pub const DEFAULT_DIRB_WORDLIST: &str = "/usr/share/dirb/wordlists/common.txt";
pub const DEFAULT_HYDRA_WORDLIST: &str = "wordlist.txt";
pub const DEFAULT_GOBUSTER_WORDLIST: &str = "/usr/share/wordlists/dirb/common.txt";

/// Main toolkit configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RatConfig {
    /// Directory holding the phase result trees
    pub output_root: PathBuf,
    pub targets_file: PathBuf,
    pub log_file: PathBuf,
    pub wordlists: WordlistConfig,
    /// Per-invocation limit for external tools, unlimited when unset
    pub tool_timeout_secs: Option<u64>,
    pub probe_timeout_secs: u64,
}

impl Default for RatConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            targets_file: PathBuf::from("targets.txt"),
            log_file: PathBuf::from("rat_debug.log"),
            wordlists: WordlistConfig::default(),
            tool_timeout_secs: None,
            probe_timeout_secs: 3,
        }
    }
}

impl RatConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> RatResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RatError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse configuration from JSON text; missing fields take their defaults
    pub fn from_json(content: &str) -> RatResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| RatError::Configuration(format!("Invalid configuration: {}", e)))
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_secs.map(Duration::from_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// The wordlists a builder may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordlistSlot {
    Dirb,
    Hydra,
    Gobuster,
}

impl WordlistSlot {
    pub const ALL: [WordlistSlot; 3] = [WordlistSlot::Dirb, WordlistSlot::Hydra, WordlistSlot::Gobuster];

    pub fn name(&self) -> &'static str {
        match self {
            WordlistSlot::Dirb => "dirb",
            WordlistSlot::Hydra => "hydra",
            WordlistSlot::Gobuster => "gobuster",
        }
    }
}

impl fmt::Display for WordlistSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wordlist selection, passed to the command builder on every call
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WordlistConfig {
    pub dirb: PathBuf,
    pub hydra: PathBuf,
    pub gobuster: PathBuf,
}

impl Default for WordlistConfig {
    fn default() -> Self {
        Self {
            dirb: PathBuf::from(DEFAULT_DIRB_WORDLIST),
            hydra: PathBuf::from(DEFAULT_HYDRA_WORDLIST),
            gobuster: PathBuf::from(DEFAULT_GOBUSTER_WORDLIST),
        }
    }
}

impl WordlistConfig {
    pub fn get(&self, slot: WordlistSlot) -> &Path {
        match slot {
            WordlistSlot::Dirb => &self.dirb,
            WordlistSlot::Hydra => &self.hydra,
            WordlistSlot::Gobuster => &self.gobuster,
        }
    }

    /// Replace a wordlist without checking the path
    pub fn set_unchecked(&mut self, slot: WordlistSlot, path: impl Into<PathBuf>) {
        let path = path.into();
        match slot {
            WordlistSlot::Dirb => self.dirb = path,
            WordlistSlot::Hydra => self.hydra = path,
            WordlistSlot::Gobuster => self.gobuster = path,
        }
    }

    /// Replace a wordlist, requiring the file to exist
    pub fn set(&mut self, slot: WordlistSlot, path: impl Into<PathBuf>) -> RatResult<()> {
        let path = path.into();
        if !path.is_file() {
            return Err(RatError::Configuration(format!(
                "Wordlist not found at: {}",
                path.display()
            )));
        }
        self.set_unchecked(slot, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rat_config_default() {
        let config = RatConfig::default();

        assert_eq!(config.output_root, PathBuf::from("."));
        assert_eq!(config.targets_file, PathBuf::from("targets.txt"));
        assert_eq!(config.log_file, PathBuf::from("rat_debug.log"));
        assert_eq!(config.tool_timeout(), None);
        assert_eq!(config.probe_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_wordlist_config_default() {
        let wordlists = WordlistConfig::default();

        assert_eq!(wordlists.get(WordlistSlot::Dirb), Path::new(DEFAULT_DIRB_WORDLIST));
        assert_eq!(wordlists.get(WordlistSlot::Hydra), Path::new(DEFAULT_HYDRA_WORDLIST));
        assert_eq!(wordlists.get(WordlistSlot::Gobuster), Path::new(DEFAULT_GOBUSTER_WORDLIST));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = RatConfig::from_json(
            r#"{"output_root": "/tmp/rat", "tool_timeout_secs": 120, "wordlists": {"hydra": "pw.txt"}}"#,
        )
        .unwrap();

        assert_eq!(config.output_root, PathBuf::from("/tmp/rat"));
        assert_eq!(config.tool_timeout(), Some(Duration::from_secs(120)));
        assert_eq!(config.wordlists.hydra, PathBuf::from("pw.txt"));
        assert_eq!(config.wordlists.dirb, PathBuf::from(DEFAULT_DIRB_WORDLIST));
        assert_eq!(config.log_file, PathBuf::from("rat_debug.log"));
    }

    #[test]
    fn test_config_invalid_json() {
        let result = RatConfig::from_json("{not json");
        assert!(matches!(result, Err(RatError::Configuration(_))));
    }

    #[test]
    fn test_set_wordlist_requires_existing_file() {
        let mut wordlists = WordlistConfig::default();
        let result = wordlists.set(WordlistSlot::Dirb, "/definitely/not/here.txt");

        assert!(result.is_err());
        assert_eq!(wordlists.dirb, PathBuf::from(DEFAULT_DIRB_WORDLIST));
    }

    #[test]
    fn test_set_wordlist_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("words.txt");
        std::fs::write(&list, "admin\nlogin\n").unwrap();

        let mut wordlists = WordlistConfig::default();
        wordlists.set(WordlistSlot::Gobuster, &list).unwrap();

        assert_eq!(wordlists.get(WordlistSlot::Gobuster), list.as_path());
    }
}
