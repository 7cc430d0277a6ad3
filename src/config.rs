use crate::bank::Bank;
use crate::handoff::Handoff;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The scoring knobs a single session runs with, resolved from the
/// config plus any per-bank overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scoring {
    pub coins_per_correct: u32,
    pub xp_per_session: u32,
    pub correct_reveal_ms: u64,
    pub incorrect_reveal_ms: u64,
    pub default_time_limit_secs: Option<u64>,
}

/// Persisted user configuration. Fields missing from an older config
/// file fall back to their defaults instead of failing the load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub coins_per_correct: u32,
    pub xp_per_session: u32,
    pub pass_fraction: f64,
    pub correct_reveal_ms: u64,
    pub incorrect_reveal_ms: u64,
    pub question_time_limit_secs: Option<u64>,
    pub reflex_duration_secs: u64,
    pub reflex_pass_score: u32,
    pub handoff_coins_per_level: u32,
    pub handoff_start_coins: u32,
    pub handoff_start_xp: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coins_per_correct: 1,
            xp_per_session: 10,
            pass_fraction: 0.6,
            correct_reveal_ms: 1500,
            incorrect_reveal_ms: 800,
            question_time_limit_secs: None,
            reflex_duration_secs: 30,
            reflex_pass_score: 10,
            handoff_coins_per_level: 5,
            handoff_start_coins: 5,
            handoff_start_xp: 10,
        }
    }
}

impl Config {
    pub fn scoring_for(&self, bank: &Bank) -> Scoring {
        Scoring {
            coins_per_correct: bank.coins_per_correct.unwrap_or(self.coins_per_correct),
            xp_per_session: self.xp_per_session,
            correct_reveal_ms: self.correct_reveal_ms,
            incorrect_reveal_ms: self.incorrect_reveal_ms,
            default_time_limit_secs: self.question_time_limit_secs,
        }
    }

    /// Correct answers needed to pass: the bank's own mark if it sets
    /// one, otherwise `pass_fraction` of the bank rounded up.
    pub fn pass_mark_for(&self, bank: &Bank) -> usize {
        self.pass_mark_for_count(bank, bank.len())
    }

    /// Pass mark for a session that plays `count` of the bank's
    /// questions. A bank-level mark is capped so a shortened session
    /// stays winnable.
    pub fn pass_mark_for_count(&self, bank: &Bank, count: usize) -> usize {
        match bank.pass_mark {
            Some(mark) => mark.min(count),
            None => (count as f64 * self.pass_fraction).ceil() as usize,
        }
    }

    pub fn starting_handoff(&self) -> Handoff {
        Handoff {
            coins_per_level: self.handoff_coins_per_level,
            total_coins: self.handoff_start_coins,
            total_xp: self.handoff_start_xp,
            next_game: None,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "qwiz") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("qwiz_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
