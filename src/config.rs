use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::ReportRoot;

pub const CONFIG_FILE: &str = "rvr-compare.json";
pub const CONFIG_ENV: &str = "RVR_COMPARE_CONFIG";
pub const REPORTS_DIR_ENV: &str = "RVR_REPORTS_DIR";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Runtime settings. Every field has a default so a partial JSON file works.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the `vendor/model/version/testConfig` report tree.
    pub reports_dir: PathBuf,
    /// File name prefix of the PDF rendition stored next to each report.
    pub pdf_prefix: String,
    /// Throughput floor used for the effective-range statistic.
    pub effective_range_floor_mbps: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("./reports"),
            pdf_prefix: "report".to_string(),
            effective_range_floor_mbps: 10.0,
        }
    }
}

impl Settings {
    /// Settings for this process: config file, then environment, then the
    /// first command-line argument.
    pub fn load() -> Self {
        let config = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        let reports_env = std::env::var_os(REPORTS_DIR_ENV).map(PathBuf::from);
        let cli_dir = std::env::args_os().nth(1).map(PathBuf::from);
        Self::resolve(&config, reports_env, cli_dir)
    }

    pub fn resolve(config: &Path, reports_env: Option<PathBuf>, cli_dir: Option<PathBuf>) -> Self {
        let mut settings = Self::from_file(config);
        if let Some(dir) = reports_env {
            settings.reports_dir = dir;
        }
        if let Some(dir) = cli_dir {
            settings.reports_dir = dir;
        }
        log::info!("Reports directory: {}", settings.reports_dir.display());
        settings
    }

    /// Read a JSON settings file. A missing file gives the defaults, as does
    /// a malformed one (with a warning).
    pub fn from_file(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                log::warn!("Could not read {}: {e}; using defaults", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(settings) => {
                log::debug!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn report_root(&self) -> ReportRoot {
        ReportRoot::new(&self.reports_dir, &self.pdf_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rvr-compare-config-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = scratch("missing");
        assert_eq!(Settings::from_file(&dir.join("nope.json")), Settings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = scratch("partial");
        let path = dir.join(CONFIG_FILE);
        fs::write(&path, r#"{ "pdf_prefix": "rvr" }"#).unwrap();
        let s = Settings::from_file(&path);
        assert_eq!(s.pdf_prefix, "rvr");
        assert_eq!(s.reports_dir, PathBuf::from("./reports"));
        assert_eq!(s.effective_range_floor_mbps, 10.0);
    }

    #[test]
    fn malformed_file_falls_back() {
        let dir = scratch("malformed");
        let path = dir.join(CONFIG_FILE);
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::from_file(&path), Settings::default());
    }

    #[test]
    fn cli_argument_beats_environment() {
        let dir = scratch("override");
        let path = dir.join(CONFIG_FILE);
        fs::write(&path, r#"{ "reports_dir": "/from/file" }"#).unwrap();

        let s = Settings::resolve(&path, Some("/from/env".into()), None);
        assert_eq!(s.reports_dir, PathBuf::from("/from/env"));

        let s = Settings::resolve(&path, Some("/from/env".into()), Some("/from/cli".into()));
        assert_eq!(s.reports_dir, PathBuf::from("/from/cli"));
    }
}
