//! Moodcast application binary - composition root.
//!
//! 1. Load configuration from TOML
//! 2. Open the SQLite state database
//! 3. Wire fixture-backed collaborators into the prompt orchestrator
//! 4. Run the requested subcommand and print its result as JSON

mod cli;
mod fixture;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use clap::Parser;
use serde::Serialize;

use moodcast_core::config::MoodcastConfig;
use moodcast_core::types::PromptSettings;
use moodcast_prompt::{
    Clock, ContextSnapshotBuilder, FixedClock, PromptOrchestrator, SystemClock, CATALOG,
};
use moodcast_storage::{Database, PromptStateRepository};

use cli::{CliArgs, Command, SettingsAction};
use fixture::Fixture;

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_orchestrator(
    config: &MoodcastConfig,
    fixture: &Fixture,
    repo: PromptStateRepository,
    at: Option<DateTime<FixedOffset>>,
) -> PromptOrchestrator {
    let clock: Arc<dyn Clock> = match at {
        Some(at) => Arc::new(FixedClock(at)),
        None => Arc::new(SystemClock),
    };
    PromptOrchestrator::new(
        ContextSnapshotBuilder::from_shared(Arc::new(fixture.signals())),
        Arc::new(fixture.sourcer()),
        Arc::new(fixture.notifier()),
        repo,
    )
    .with_clock(clock)
    .with_trigger_config(&config.trigger)
    .with_queue_config(config.queue.clone())
}

fn apply_settings_changes(
    mut settings: PromptSettings,
    action: SettingsAction,
) -> Option<PromptSettings> {
    match action {
        SettingsAction::Show => None,
        SettingsAction::Set {
            quiet_start,
            quiet_end,
            max_per_day,
            enable,
            disable,
        } => {
            if let Some(hour) = quiet_start {
                settings.quiet_hours_start = hour;
            }
            if let Some(hour) = quiet_end {
                settings.quiet_hours_end = hour;
            }
            if let Some(max) = max_per_day {
                settings.max_prompts_per_day = max;
            }
            for category in enable {
                settings.set_enabled(category, true);
            }
            for category in disable {
                settings.set_enabled(category, false);
            }
            Some(settings)
        }
    }
}

fn open_state(data_dir: &Path) -> Result<PromptStateRepository, Box<dyn std::error::Error>> {
    let db_path = data_dir.join("moodcast.db");
    let db = Database::new(&db_path)?;
    tracing::info!(path = %db_path.display(), "SQLite database opened");
    Ok(PromptStateRepository::new(Arc::new(db)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing starts so its log level can apply.
    let config_file = args.resolve_config_path();
    let loaded = if config_file.exists() {
        Some(MoodcastConfig::load(&config_file))
    } else {
        None
    };
    let config_level = match &loaded {
        Some(Ok(config)) => config.general.log_level.clone(),
        _ => MoodcastConfig::default().general.log_level,
    };
    init_tracing(&args.resolve_log_level(&config_level));

    let config = match loaded {
        Some(Ok(config)) => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
            config
        }
        Some(Err(e)) => {
            tracing::warn!(path = %config_file.display(), error = %e, "Invalid config, using defaults");
            MoodcastConfig::default()
        }
        None => {
            tracing::debug!(path = %config_file.display(), "No config file, using defaults");
            MoodcastConfig::default()
        }
    };

    if let Command::Vibes = args.command {
        for vibe in CATALOG {
            println!(
                "{:<20} {:<20} {:>3} min  {:>3} BPM",
                vibe.id, vibe.label, vibe.target_duration_minutes, vibe.mood.tempo_bpm
            );
        }
        return Ok(());
    }

    let data_dir = args.resolve_data_dir(&config.general.data_dir);
    let repo = open_state(&data_dir)?;

    match args.command {
        Command::Cycle { fixture, at } => {
            let fixture = Fixture::load(&fixture)?;
            let settings = repo.load_settings_or_seed(&config.prompts)?;
            let orchestrator = build_orchestrator(&config, &fixture, repo, at);
            let outcome = orchestrator.run_prompt_cycle(&fixture.taste, &settings).await;
            print_json(&outcome)?;
        }
        Command::Evaluate { fixture, at } => {
            let fixture = Fixture::load(&fixture)?;
            let settings = repo.load_settings_or_seed(&config.prompts)?;
            let orchestrator = build_orchestrator(&config, &fixture, repo, at);
            print_json(&orchestrator.preview(&settings).await)?;
        }
        Command::Dismiss { entry_id } => {
            let orchestrator = build_orchestrator(&config, &Fixture::default(), repo, None);
            orchestrator.dismiss(entry_id).await?;
            println!("Dismissed {}", entry_id);
        }
        Command::Log => {
            print_json(&repo.load_log()?)?;
        }
        Command::Settings { action } => {
            let current = repo.load_settings_or_seed(&config.prompts)?;
            match apply_settings_changes(current.clone(), action) {
                Some(updated) => {
                    repo.save_settings(&updated)?;
                    print_json(&updated)?;
                }
                None => print_json(&current)?,
            }
        }
        Command::Vibes => {}
    }

    Ok(())
}
