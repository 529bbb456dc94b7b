use crate::error::CoreResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_STATE_DIR: &str = "CYBERLAB_STATE_DIR";
pub const ENV_INSTRUCTOR: &str = "CYBERLAB_INSTRUCTOR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabConfig {
    /// Directory holding one blob file per storage key.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,
    /// Shows instructor guidance panels.
    #[serde(default)]
    pub instructor: bool,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".cyberlab_state")
}

fn default_toast_duration_ms() -> u64 {
    3200
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            toast_duration_ms: default_toast_duration_ms(),
            instructor: false,
        }
    }
}

impl LabConfig {
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let bytes = fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Like `load`, but a missing or broken file yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("Failed to load config at {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(ENV_STATE_DIR).ok(),
            std::env::var(ENV_INSTRUCTOR).ok(),
        )
    }

    pub fn with_overrides(mut self, state_dir: Option<String>, instructor: Option<String>) -> Self {
        if let Some(dir) = state_dir.filter(|d| !d.trim().is_empty()) {
            self.state_dir = PathBuf::from(dir);
        }
        if let Some(flag) = instructor {
            self.instructor = parse_instructor_flag(&flag);
        }
        self
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

/// `?instructor=` style flag: "1", "true", "yes", "on" (any case, surrounding blanks ignored).
pub fn parse_instructor_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructor_flag_values() {
        for on in ["1", "true", "YES", " on "] {
            assert!(parse_instructor_flag(on), "{on}");
        }
        for off in ["", "0", "false", "no", "instructor"] {
            assert!(!parse_instructor_flag(off), "{off}");
        }
    }

    #[test]
    fn partial_config_takes_defaults() {
        let cfg: LabConfig = serde_json::from_str(r#"{"instructor": true}"#).unwrap();
        assert!(cfg.instructor);
        assert_eq!(cfg.toast_duration_ms, 3200);
        assert_eq!(cfg.state_dir, PathBuf::from(".cyberlab_state"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let cfg = LabConfig::default().with_overrides(Some("/tmp/labs".to_string()), Some("on".to_string()));
        assert_eq!(cfg.state_dir, PathBuf::from("/tmp/labs"));
        assert!(cfg.instructor);

        let cfg = cfg.with_overrides(Some("  ".to_string()), None);
        assert_eq!(cfg.state_dir, PathBuf::from("/tmp/labs"));
    }

    #[test]
    fn broken_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lab.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert_eq!(LabConfig::load_or_default(Some(&path)), LabConfig::default());
        assert!(LabConfig::load(&path).is_err());
    }
}
