use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MoodcastError, Result};
use crate::types::PromptSettings;

/// Top-level configuration for Moodcast.
///
/// Loaded from `~/.moodcast/config.toml` by default. Every section falls back
/// to its defaults when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoodcastConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    /// Settings seeded into storage the first time a user runs a cycle.
    #[serde(default)]
    pub prompts: PromptSettings,
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub queue: QueueConfig,
}

impl MoodcastConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MoodcastConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or is invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.prompts.validate()?;
        self.trigger.validate()?;
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the SQLite state database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.moodcast/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Time windows used by the trigger evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Minimum hours between two fires with the same trigger source.
    pub cooldown_hours: u32,
    /// How long a dismissal keeps suppressing its trigger source.
    pub dismissal_window_hours: u32,
    /// Calendar events starting within this many minutes count as imminent.
    pub calendar_horizon_minutes: u32,
    /// Days of trigger history retained.
    pub log_retention_days: u32,
}

/// Upper bounds for `[trigger]` values.
pub const MAX_RETENTION_DAYS: u32 = 3650;
pub const MAX_WINDOW_HOURS: u32 = MAX_RETENTION_DAYS * 24;
pub const MAX_HORIZON_MINUTES: u32 = 7 * 24 * 60;

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            cooldown_hours: 3,
            dismissal_window_hours: 24,
            calendar_horizon_minutes: 60,
            log_retention_days: 7,
        }
    }
}

impl TriggerConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::try_hours(i64::from(self.cooldown_hours)).unwrap_or(Duration::MAX)
    }

    pub fn dismissal_window(&self) -> Duration {
        Duration::try_hours(i64::from(self.dismissal_window_hours)).unwrap_or(Duration::MAX)
    }

    pub fn log_retention(&self) -> Duration {
        Duration::try_days(i64::from(self.log_retention_days)).unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> Result<()> {
        if self.log_retention_days == 0 {
            return Err(MoodcastError::Config(
                "trigger.log_retention_days must be at least 1".to_string(),
            ));
        }
        if self.log_retention_days > MAX_RETENTION_DAYS {
            return Err(MoodcastError::Config(format!(
                "trigger.log_retention_days must be at most {}",
                MAX_RETENTION_DAYS
            )));
        }
        if self.cooldown_hours > MAX_WINDOW_HOURS || self.dismissal_window_hours > MAX_WINDOW_HOURS
        {
            return Err(MoodcastError::Config(format!(
                "trigger.cooldown_hours and trigger.dismissal_window_hours must be at most {}",
                MAX_WINDOW_HOURS
            )));
        }
        if self.calendar_horizon_minutes > MAX_HORIZON_MINUTES {
            return Err(MoodcastError::Config(format!(
                "trigger.calendar_horizon_minutes must be at most {}",
                MAX_HORIZON_MINUTES
            )));
        }
        // The daily cap and cooldown read the log, so it must cover them.
        let retention_hours = self.log_retention_days.saturating_mul(24);
        if retention_hours < self.cooldown_hours.max(self.dismissal_window_hours) {
            return Err(MoodcastError::Config(format!(
                "trigger.log_retention_days ({}) is shorter than the cooldown or dismissal window",
                self.log_retention_days
            )));
        }
        Ok(())
    }
}

/// Queue assembly configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Below this many filtered candidates the orchestrator asks the sourcer
    /// for a broader pool once.
    pub min_candidates: usize,
    /// Seed for deterministic pool shuffling. Unset keeps sourcer order.
    pub shuffle_seed: Option<u64>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            min_candidates: 5,
            shuffle_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = MoodcastConfig::default();
        assert_eq!(config.general.data_dir, "~/.moodcast/data");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.trigger.cooldown_hours, 3);
        assert_eq!(config.trigger.dismissal_window_hours, 24);
        assert_eq!(config.trigger.calendar_horizon_minutes, 60);
        assert_eq!(config.trigger.log_retention_days, 7);
        assert_eq!(config.queue.min_candidates, 5);
        assert!(config.queue.shuffle_seed.is_none());
        assert_eq!(config.prompts.max_prompts_per_day, 3);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
data_dir = "/custom/data"
log_level = "debug"

[prompts]
quiet_hours_start = 23
quiet_hours_end = 6
max_prompts_per_day = 5
weather_enabled = false

[trigger]
cooldown_hours = 2

[queue]
min_candidates = 8
shuffle_seed = 42
"#;
        let file = create_temp_config(content);
        let config = MoodcastConfig::load(file.path()).unwrap();
        assert_eq!(config.general.data_dir, "/custom/data");
        assert_eq!(config.prompts.quiet_hours_start, 23);
        assert_eq!(config.prompts.max_prompts_per_day, 5);
        assert!(!config.prompts.weather_enabled);
        assert!(config.prompts.calendar_enabled);
        assert_eq!(config.trigger.cooldown_hours, 2);
        assert_eq!(config.trigger.log_retention_days, 7);
        assert_eq!(config.queue.min_candidates, 8);
        assert_eq!(config.queue.shuffle_seed, Some(42));
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let file = create_temp_config("[general]\nlog_level = \"warn\"\n");
        let config = MoodcastConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.trigger.cooldown_hours, 3);
        assert_eq!(config.prompts.quiet_hours_start, 22);
    }

    #[test]
    fn test_load_rejects_invalid_settings() {
        let file = create_temp_config("[prompts]\nmax_prompts_per_day = 0\n");
        let err = MoodcastConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, MoodcastError::InvalidSettings(_)));
    }

    #[test]
    fn test_load_rejects_short_retention() {
        let file = create_temp_config("[trigger]\nlog_retention_days = 0\n");
        assert!(MoodcastConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_validate_rejects_huge_windows() {
        let retention = TriggerConfig {
            log_retention_days: 200_000_000,
            ..TriggerConfig::default()
        };
        assert!(matches!(retention.validate(), Err(MoodcastError::Config(_))));

        let cooldown = TriggerConfig {
            cooldown_hours: u32::MAX,
            ..TriggerConfig::default()
        };
        assert!(cooldown.validate().is_err());

        let horizon = TriggerConfig {
            calendar_horizon_minutes: MAX_HORIZON_MINUTES + 1,
            ..TriggerConfig::default()
        };
        assert!(horizon.validate().is_err());

        let widest = TriggerConfig {
            cooldown_hours: MAX_WINDOW_HOURS,
            dismissal_window_hours: MAX_WINDOW_HOURS,
            calendar_horizon_minutes: MAX_HORIZON_MINUTES,
            log_retention_days: MAX_RETENTION_DAYS,
        };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_durations_saturate() {
        let config = TriggerConfig {
            log_retention_days: u32::MAX,
            ..TriggerConfig::default()
        };
        assert_eq!(config.log_retention(), Duration::MAX);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = MoodcastConfig::load_or_default(Path::new("/nonexistent/moodcast.toml"));
        assert_eq!(config.general.data_dir, "~/.moodcast/data");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = MoodcastConfig::default();
        config.queue.shuffle_seed = Some(7);
        config.prompts.max_prompts_per_day = 4;
        config.save(&path).unwrap();

        let reloaded = MoodcastConfig::load(&path).unwrap();
        assert_eq!(reloaded.queue.shuffle_seed, Some(7));
        assert_eq!(reloaded.prompts, config.prompts);
        assert_eq!(reloaded.trigger.cooldown_hours, config.trigger.cooldown_hours);
    }

    #[test]
    fn test_trigger_durations() {
        let trigger = TriggerConfig::default();
        assert_eq!(trigger.cooldown(), Duration::hours(3));
        assert_eq!(trigger.dismissal_window(), Duration::hours(24));
        assert_eq!(trigger.log_retention(), Duration::days(7));
    }
}
