//! Prompt cycle orchestrator.
//!
//! Coordinates one end-to-end cycle: snapshot the context, evaluate the
//! trigger, source candidates for the inferred vibe, assemble a queue, record
//! the fire in the trigger log and notify the user.
//!
//! Every collaborator failure resolves to a returned outcome. A sourcing
//! failure after a fire decision is reported as `generation_error` and does
//! not write to the log, so it does not consume cooldown or daily quota. An
//! unreadable trigger log ends the cycle as `state_unavailable`; the stored
//! history is never overwritten from a log that could not be read.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use moodcast_core::config::{QueueConfig, TriggerConfig};
use moodcast_core::types::{
    ContextSnapshot, GeneratedQueue, PromptSettings, TasteProfile, TriggerLog, TriggerLogEntry,
    TriggerSource,
};
use moodcast_storage::PromptStateRepository;

use crate::context::ContextSnapshotBuilder;
use crate::error::PromptError;
use crate::notifier::Notifier;
use crate::queue::{assemble_pools, filter_candidates, CandidatePools, PoolShuffle};
use crate::sourcing::{broaden_description, describe_mood, CandidateSourcer, SourcedCandidates};
use crate::trigger::{SuppressionReason, TriggerDecision, TriggerEvaluator, TriggerPolicy, Verdict};
use crate::vibe::resolve_vibe;

// =============================================================================
// Clock
// =============================================================================

/// Source of the local wall-clock time for a cycle.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of one prompt cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CycleOutcome {
    Fired {
        queue: GeneratedQueue,
        /// `None` when the notifier did not show anything.
        notification_id: Option<String>,
        /// Trigger log entry recorded for this fire.
        entry_id: Uuid,
    },
    Suppressed {
        reason: SuppressionReason,
        trigger_source: TriggerSource,
    },
}

impl CycleOutcome {
    pub fn is_fired(&self) -> bool {
        matches!(self, CycleOutcome::Fired { .. })
    }

    pub fn reason(&self) -> Option<SuppressionReason> {
        match self {
            CycleOutcome::Fired { .. } => None,
            CycleOutcome::Suppressed { reason, .. } => Some(*reason),
        }
    }

    fn suppressed(reason: SuppressionReason, trigger_source: TriggerSource) -> Self {
        CycleOutcome::Suppressed {
            reason,
            trigger_source,
        }
    }
}

/// Dry-run evaluation: the snapshot and what the trigger would decide.
#[derive(Debug, Clone, Serialize)]
pub struct CyclePreview {
    pub context: ContextSnapshot,
    pub decision: TriggerDecision,
}

// =============================================================================
// Orchestrator
// =============================================================================

pub struct PromptOrchestrator {
    context: ContextSnapshotBuilder,
    sourcer: Arc<dyn CandidateSourcer>,
    notifier: Arc<dyn Notifier>,
    state: PromptStateRepository,
    clock: Arc<dyn Clock>,
    evaluator: TriggerEvaluator,
    queue: QueueConfig,
    /// Held for a whole cycle so the log read-then-append cannot interleave.
    cycle_guard: Mutex<()>,
}

impl PromptOrchestrator {
    pub fn new(
        context: ContextSnapshotBuilder,
        sourcer: Arc<dyn CandidateSourcer>,
        notifier: Arc<dyn Notifier>,
        state: PromptStateRepository,
    ) -> Self {
        Self {
            context,
            sourcer,
            notifier,
            state,
            clock: Arc::new(SystemClock),
            evaluator: TriggerEvaluator::default(),
            queue: QueueConfig::default(),
            cycle_guard: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_trigger_config(mut self, config: &TriggerConfig) -> Self {
        self.evaluator = TriggerEvaluator::new(TriggerPolicy::from(config));
        self
    }

    pub fn with_queue_config(mut self, config: QueueConfig) -> Self {
        self.queue = config;
        self
    }

    /// Run one full prompt cycle.
    pub async fn run_prompt_cycle(
        &self,
        taste: &TasteProfile,
        settings: &PromptSettings,
    ) -> CycleOutcome {
        let _guard = self.cycle_guard.lock().await;

        let context = self.context.build(self.clock.now()).await;
        let log = match self.state.load_log() {
            Ok(log) => log,
            Err(e) => {
                let source = resolve_vibe(&context, self.evaluator.policy().calendar_horizon_minutes)
                    .trigger_source;
                warn!(trigger_source = %source, error = %e, "Trigger log unavailable, skipping cycle");
                return CycleOutcome::suppressed(SuppressionReason::StateUnavailable, source);
            }
        };
        let decision = self.evaluator.evaluate(&context, settings, &log);
        let source = decision.trigger_source;
        let vibe = match decision.verdict {
            Verdict::Fire { vibe } => vibe,
            Verdict::Suppress { reason } => return CycleOutcome::suppressed(reason, source),
        };

        let description = describe_mood(vibe, &source, &context);
        let mut sourced = match self.sourcer.source_candidates(&description, taste).await {
            Ok(sourced) => sourced,
            Err(e) => {
                warn!(trigger_source = %source, error = %e, "Candidate sourcing failed");
                return CycleOutcome::suppressed(SuppressionReason::GenerationError, source);
            }
        };

        let mut pools = self.prepare_pools(sourced.clone());
        if pools.len() < self.queue.min_candidates {
            debug!(
                candidates = pools.len(),
                min = self.queue.min_candidates,
                "Too few candidates, broadening request"
            );
            let broad = broaden_description(&description);
            match self.sourcer.source_candidates(&broad, taste).await {
                Ok(extra) => {
                    sourced.extend(extra);
                    pools = self.prepare_pools(sourced);
                }
                Err(e) => {
                    warn!(trigger_source = %source, error = %e, "Broadened sourcing failed");
                    return CycleOutcome::suppressed(SuppressionReason::GenerationError, source);
                }
            }
        }

        let assembled = assemble_pools(pools, vibe.target_duration_ms());
        if assembled.is_empty() {
            info!(trigger_source = %source, vibe = vibe.id, "No playable candidates");
            return CycleOutcome::suppressed(SuppressionReason::InsufficientCandidates, source);
        }

        let generated_at = context.captured_at.with_timezone(&Utc);
        let entry = TriggerLogEntry::new(vibe.id, source.clone(), generated_at);
        let entry_id = entry.id;
        let next_log = log.appended(entry, self.evaluator.policy().log_retention);
        if let Err(e) = self.state.save_log(&next_log) {
            error!(entry_id = %entry_id, error = %e, "Failed to persist trigger log");
        }

        let notification_id = match self.notifier.notify(vibe, &context).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Notification failed");
                None
            }
        };

        let queue = GeneratedQueue::new(assembled, vibe, context, generated_at);
        info!(
            trigger_source = %source,
            vibe = vibe.id,
            tracks = queue.tracks.len(),
            minutes = queue.total_duration_minutes(),
            notified = notification_id.is_some(),
            "Prompt cycle fired"
        );

        CycleOutcome::Fired {
            queue,
            notification_id,
            entry_id,
        }
    }

    /// Evaluate the current context without sourcing or touching the log.
    ///
    /// An unreadable log is evaluated as empty; nothing is written.
    pub async fn preview(&self, settings: &PromptSettings) -> CyclePreview {
        let context = self.context.build(self.clock.now()).await;
        let log = self.state.load_log().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load trigger log, previewing against an empty log");
            TriggerLog::new()
        });
        let decision = self.evaluator.evaluate(&context, settings, &log);
        CyclePreview { context, decision }
    }

    /// Mark a fired prompt as dismissed by the user.
    pub async fn dismiss(&self, entry_id: Uuid) -> Result<(), PromptError> {
        let _guard = self.cycle_guard.lock().await;

        let log = self.state.load_log()?;
        let next = log
            .with_dismissed(entry_id)
            .ok_or(PromptError::EntryNotFound(entry_id))?;
        self.state.save_log(&next)?;
        info!(entry_id = %entry_id, "Prompt dismissed");
        Ok(())
    }

    fn prepare_pools(&self, sourced: SourcedCandidates) -> CandidatePools {
        let SourcedCandidates {
            mut familiar,
            mut discovery,
        } = sourced;
        PoolShuffle::from_seed(self.queue.shuffle_seed).apply(&mut familiar, &mut discovery);
        filter_candidates(familiar, discovery)
    }
}

impl std::fmt::Debug for PromptOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptOrchestrator")
            .field("evaluator", &self.evaluator)
            .field("queue", &self.queue)
            .finish()
    }
}
