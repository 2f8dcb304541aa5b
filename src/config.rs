//! Rater configuration.
//!
//! Stored as a JSON object on disk; every field is optional:
//! ```json
//! {
//!   "use_gpa_scale": false,
//!   "period_order": "newest_first",
//!   "overall_marker": "总",
//!   "placeholder": "-.--"
//! }
//! ```

use crate::analyzers::grade::ScaleMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable naming a config file to load.
pub const CONFIG_ENV: &str = "GPA_RATER_CONFIG";

/// How the supplied periods relate to chronology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodOrder {
    /// Latest period first, as transcript pages list them.
    #[default]
    NewestFirst,
    OldestFirst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaterConfig {
    /// Measure presentation ratios on the 4-point scale instead of percentages.
    pub use_gpa_scale: bool,
    pub period_order: PeriodOrder,
    /// Text marking the overall summary period in a label.
    pub overall_marker: String,
    /// Shown where no value can be displayed.
    pub placeholder: String,
}

impl Default for RaterConfig {
    fn default() -> Self {
        Self {
            use_gpa_scale: false,
            period_order: PeriodOrder::NewestFirst,
            overall_marker: "总".to_string(),
            placeholder: "-.--".to_string(),
        }
    }
}

impl RaterConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{path}'"))?;
        let config: RaterConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid config '{path}'"))?;
        debug!(path, ?config, "Loaded config");
        Ok(config)
    }

    /// Loads from `path` if given, else from [`CONFIG_ENV`], else defaults.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => match std::env::var(CONFIG_ENV) {
                Ok(p) if !p.is_empty() => Self::load(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn scale_mode(&self) -> ScaleMode {
        ScaleMode::from_flag(self.use_gpa_scale)
    }

    pub fn is_overall_label(&self, label: &str) -> bool {
        !self.overall_marker.is_empty() && label.contains(&self.overall_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: RaterConfig =
            serde_json::from_str(r#"{ "use_gpa_scale": true, "period_order": "oldest_first" }"#)
                .unwrap();
        assert_eq!(config.scale_mode(), ScaleMode::Gpa);
        assert_eq!(config.period_order, PeriodOrder::OldestFirst);
        assert_eq!(config.overall_marker, "总");
        assert_eq!(config.placeholder, "-.--");
    }

    #[test]
    fn test_load_from_file() {
        let path = format!("{}/gpa_rater_test_config.json", env::temp_dir().display());
        fs::write(&path, r#"{ "overall_marker": "Overall" }"#).unwrap();

        let config = RaterConfig::load(&path).unwrap();
        assert!(config.is_overall_label("Overall GPA"));
        assert!(!config.is_overall_label("2023 Fall"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file_errors() {
        assert!(RaterConfig::load("/nonexistent/gpa_rater.json").is_err());
    }
}
