use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Directory for the diagnostics log, under $HOME/.local/state/taptime when possible
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("taptime"))
        } else {
            ProjectDirs::from("", "", "taptime").map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("taptime.log"))
            .unwrap_or_else(|| PathBuf::from("taptime.log"))
    }

    /// Exports land in the working directory unless configured otherwise
    pub fn default_export_dir() -> PathBuf {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_has_file_name() {
        assert_eq!(
            AppDirs::log_path().file_name().and_then(|n| n.to_str()),
            Some("taptime.log")
        );
    }
}
