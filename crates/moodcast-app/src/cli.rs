//! CLI argument definitions for the Moodcast application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

use moodcast_core::types::TriggerCategory;

/// Moodcast: ambient-signal listening prompts with familiar/discovery queues.
#[derive(Parser, Debug)]
#[command(name = "moodcast", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Data directory for the SQLite state database.
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one prompt cycle against a fixture file and print the outcome.
    Cycle {
        /// JSON fixture with context signals and candidate pools.
        #[arg(short = 'f', long = "fixture")]
        fixture: PathBuf,
        /// Evaluate as if it were this time (RFC 3339). Defaults to now.
        #[arg(long = "at")]
        at: Option<DateTime<FixedOffset>>,
    },
    /// Show what the trigger would decide, without sourcing or logging.
    Evaluate {
        #[arg(short = 'f', long = "fixture")]
        fixture: PathBuf,
        #[arg(long = "at")]
        at: Option<DateTime<FixedOffset>>,
    },
    /// Mark a fired prompt as dismissed.
    Dismiss {
        /// Trigger log entry id printed by `cycle`.
        entry_id: Uuid,
    },
    /// Print the persisted trigger log.
    Log,
    /// Show or change prompt settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// List the vibe catalog.
    Vibes,
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    Show,
    Set {
        /// First quiet hour (0-23).
        #[arg(long = "quiet-start")]
        quiet_start: Option<u8>,
        /// Hour quiet hours end (0-23, exclusive).
        #[arg(long = "quiet-end")]
        quiet_end: Option<u8>,
        #[arg(long = "max-per-day")]
        max_per_day: Option<u32>,
        /// Enable a trigger category (calendar, location, weather, time).
        #[arg(long = "enable")]
        enable: Vec<TriggerCategory>,
        /// Disable a trigger category.
        #[arg(long = "disable")]
        disable: Vec<TriggerCategory>,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > MOODCAST_CONFIG env var > ~/.moodcast/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("MOODCAST_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the data directory.
    ///
    /// Priority: --data-dir flag > MOODCAST_DATA_DIR env var > config value.
    pub fn resolve_data_dir(&self, config_data_dir: &str) -> PathBuf {
        if let Some(ref p) = self.data_dir {
            return p.clone();
        }
        if let Ok(p) = std::env::var("MOODCAST_DATA_DIR") {
            return expand_home(&p);
        }
        expand_home(config_data_dir)
    }

    /// Resolve the log filter used when RUST_LOG is unset.
    ///
    /// Priority: --log-level flag > config value.
    pub fn resolve_log_level(&self, config_log_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_log_level.to_string())
    }
}

fn home_dir() -> Option<String> {
    #[cfg(target_os = "windows")]
    let home = std::env::var("USERPROFILE").ok();
    #[cfg(not(target_os = "windows"))]
    let home = std::env::var("HOME").ok();
    home
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")), home_dir()) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        (Some(rest), None) => PathBuf::from(".").join(rest),
        (None, _) => PathBuf::from(path),
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    match home_dir() {
        Some(home) => PathBuf::from(home).join(".moodcast").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_flag_beats_config_values() {
        let args = parse(&["moodcast", "--data-dir", "/tmp/mc", "--log-level", "debug", "log"]);
        assert_eq!(args.resolve_data_dir("~/.moodcast/data"), PathBuf::from("/tmp/mc"));
        assert_eq!(args.resolve_log_level("info"), "debug");
    }

    #[test]
    fn test_config_log_level_used_without_flag() {
        let args = parse(&["moodcast", "vibes"]);
        assert_eq!(args.resolve_log_level("warn"), "warn");
    }

    #[test]
    fn test_expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/var/lib/moodcast"), PathBuf::from("/var/lib/moodcast"));
        assert!(!expand_home("~/data").to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_cycle_parses_fixture_and_time() {
        let args = parse(&[
            "moodcast",
            "cycle",
            "--fixture",
            "rain.json",
            "--at",
            "2026-10-18T10:00:00+02:00",
        ]);
        match args.command {
            Command::Cycle { fixture, at } => {
                assert_eq!(fixture, PathBuf::from("rain.json"));
                assert_eq!(at.unwrap().offset().local_minus_utc(), 7200);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_settings_set_parses_categories() {
        let args = parse(&[
            "moodcast",
            "settings",
            "set",
            "--max-per-day",
            "5",
            "--disable",
            "weather",
            "--disable",
            "time",
        ]);
        match args.command {
            Command::Settings {
                action:
                    SettingsAction::Set {
                        max_per_day,
                        disable,
                        enable,
                        ..
                    },
            } => {
                assert_eq!(max_per_day, Some(5));
                assert_eq!(disable, [TriggerCategory::Weather, TriggerCategory::Time]);
                assert!(enable.is_empty());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_category_rejected() {
        assert!(CliArgs::try_parse_from(["moodcast", "settings", "set", "--enable", "mood"]).is_err());
    }

    #[test]
    fn test_dismiss_requires_uuid() {
        assert!(CliArgs::try_parse_from(["moodcast", "dismiss", "not-a-uuid"]).is_err());
        let id = Uuid::new_v4().to_string();
        assert!(CliArgs::try_parse_from(["moodcast", "dismiss", id.as_str()]).is_ok());
    }
}
