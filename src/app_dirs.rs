use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Prefer the XDG-style ~/.local/state directory, falling back to the
    /// platform-specific local data directory.
    fn state_dir() -> Option<PathBuf> {
        match std::env::var_os("HOME") {
            Some(home) => Some(PathBuf::from(home).join(".local/state/qwiz")),
            None => ProjectDirs::from("", "", "qwiz").map(|pd| pd.data_local_dir().to_path_buf()),
        }
    }

    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("stats.db"))
    }

    pub fn session_log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("sessions.csv"))
    }
}
