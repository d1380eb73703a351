//! Trigger evaluation.
//!
//! Decides whether a context warrants a prompt right now. Rules are checked
//! in a fixed order and the first match suppresses:
//!
//! 1. quiet hours
//! 2. trigger category disabled
//! 3. cooldown on the same trigger source
//! 4. daily prompt limit
//! 5. recent dismissal of the same trigger source
//! 6. time-of-day trigger with no corroborating signal
//!
//! Evaluation is a pure function of (context, settings, log). It never reads
//! the system clock and never mutates the log; recording a fire is the
//! caller's job.

use std::fmt;

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Serialize, Serializer};
use tracing::{debug, info};

use moodcast_core::config::TriggerConfig;
use moodcast_core::types::{
    window_start, ContextSnapshot, PromptSettings, TriggerCategory, TriggerLog, TriggerSource,
    VibeProfile,
};

use crate::vibe::{resolve_vibe, DEFAULT_CALENDAR_HORIZON_MINUTES};

// =============================================================================
// Policy
// =============================================================================

/// Time windows used by the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerPolicy {
    pub cooldown: Duration,
    pub dismissal_window: Duration,
    pub calendar_horizon_minutes: i64,
    /// How long fired entries are kept in the log.
    pub log_retention: Duration,
}

impl Default for TriggerPolicy {
    fn default() -> Self {
        Self {
            cooldown: Duration::hours(3),
            dismissal_window: Duration::hours(24),
            calendar_horizon_minutes: DEFAULT_CALENDAR_HORIZON_MINUTES,
            log_retention: Duration::days(7),
        }
    }
}

impl From<&TriggerConfig> for TriggerPolicy {
    fn from(config: &TriggerConfig) -> Self {
        Self {
            cooldown: config.cooldown(),
            dismissal_window: config.dismissal_window(),
            calendar_horizon_minutes: i64::from(config.calendar_horizon_minutes),
            log_retention: config.log_retention(),
        }
    }
}

// =============================================================================
// Decision
// =============================================================================

/// Why a cycle did not produce a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuppressionReason {
    QuietHours,
    CategoryDisabled(TriggerCategory),
    CooldownSameTrigger,
    DailyLimitReached,
    RecentlyDismissed,
    InsufficientContextForTimeOnly,
    /// The candidate sourcer failed after a fire decision.
    GenerationError,
    /// Nothing playable survived filtering and assembly.
    InsufficientCandidates,
    /// The trigger log could not be read.
    StateUnavailable,
}

impl fmt::Display for SuppressionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuppressionReason::QuietHours => f.write_str("quiet_hours"),
            SuppressionReason::CategoryDisabled(category) => {
                write!(f, "{}_prompts_disabled", category)
            }
            SuppressionReason::CooldownSameTrigger => f.write_str("cooldown_same_trigger"),
            SuppressionReason::DailyLimitReached => f.write_str("daily_limit_reached"),
            SuppressionReason::RecentlyDismissed => f.write_str("recently_dismissed"),
            SuppressionReason::InsufficientContextForTimeOnly => {
                f.write_str("insufficient_context_for_time_only")
            }
            SuppressionReason::GenerationError => f.write_str("generation_error"),
            SuppressionReason::InsufficientCandidates => f.write_str("insufficient_candidates"),
            SuppressionReason::StateUnavailable => f.write_str("state_unavailable"),
        }
    }
}

impl Serialize for SuppressionReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Fire { vibe: &'static VibeProfile },
    Suppress { reason: SuppressionReason },
}

/// Outcome of one evaluation. Always carries the derived trigger source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerDecision {
    pub trigger_source: TriggerSource,
    #[serde(flatten)]
    pub verdict: Verdict,
}

impl TriggerDecision {
    fn fire(trigger_source: TriggerSource, vibe: &'static VibeProfile) -> Self {
        Self {
            trigger_source,
            verdict: Verdict::Fire { vibe },
        }
    }

    fn suppress(trigger_source: TriggerSource, reason: SuppressionReason) -> Self {
        Self {
            trigger_source,
            verdict: Verdict::Suppress { reason },
        }
    }

    pub fn should_fire(&self) -> bool {
        matches!(self.verdict, Verdict::Fire { .. })
    }

    pub fn vibe(&self) -> Option<&'static VibeProfile> {
        match self.verdict {
            Verdict::Fire { vibe } => Some(vibe),
            Verdict::Suppress { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<SuppressionReason> {
        match self.verdict {
            Verdict::Fire { .. } => None,
            Verdict::Suppress { reason } => Some(reason),
        }
    }
}

// =============================================================================
// Evaluator
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct TriggerEvaluator {
    policy: TriggerPolicy,
}

impl TriggerEvaluator {
    pub fn new(policy: TriggerPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TriggerPolicy {
        &self.policy
    }

    pub fn evaluate(
        &self,
        context: &ContextSnapshot,
        settings: &PromptSettings,
        log: &TriggerLog,
    ) -> TriggerDecision {
        let resolution = resolve_vibe(context, self.policy.calendar_horizon_minutes);
        let source = resolution.trigger_source;
        let now = context.captured_at.with_timezone(&Utc);

        if let Some(reason) = self.suppression(context, settings, log, &source, now) {
            debug!(trigger_source = %source, reason = %reason, "Prompt suppressed");
            return TriggerDecision::suppress(source, reason);
        }

        info!(
            trigger_source = %source,
            vibe = resolution.vibe.id,
            "Prompt trigger fired"
        );
        TriggerDecision::fire(source, resolution.vibe)
    }

    fn suppression(
        &self,
        context: &ContextSnapshot,
        settings: &PromptSettings,
        log: &TriggerLog,
        source: &TriggerSource,
        now: DateTime<Utc>,
    ) -> Option<SuppressionReason> {
        if settings.in_quiet_hours(context.hour()) {
            return Some(SuppressionReason::QuietHours);
        }

        if !settings.is_enabled(source.category) {
            return Some(SuppressionReason::CategoryDisabled(source.category));
        }

        let cooldown_start = window_start(now, self.policy.cooldown);
        if log
            .fired_since(cooldown_start)
            .any(|e| e.trigger_source == *source)
        {
            return Some(SuppressionReason::CooldownSameTrigger);
        }

        let fired_today = log.fired_since(start_of_day(context)).count();
        if fired_today >= settings.max_prompts_per_day as usize {
            return Some(SuppressionReason::DailyLimitReached);
        }

        let dismissal_start = window_start(now, self.policy.dismissal_window);
        if log
            .fired_since(dismissal_start)
            .any(|e| e.dismissed && e.trigger_source == *source)
        {
            return Some(SuppressionReason::RecentlyDismissed);
        }

        if source.category == TriggerCategory::Time && !context.has_ambient_signal() {
            return Some(SuppressionReason::InsufficientContextForTimeOnly);
        }

        None
    }
}

/// Evaluate with the default policy.
pub fn evaluate_trigger(
    context: &ContextSnapshot,
    settings: &PromptSettings,
    log: &TriggerLog,
) -> TriggerDecision {
    TriggerEvaluator::default().evaluate(context, settings, log)
}

/// Local midnight of the snapshot's day, as a UTC instant.
fn start_of_day(context: &ContextSnapshot) -> DateTime<Utc> {
    let local = context.captured_at;
    let since_midnight = Duration::seconds(i64::from(local.num_seconds_from_midnight()))
        + Duration::nanoseconds(i64::from(local.nanosecond()));
    (local - since_midnight).with_timezone(&Utc)
}
