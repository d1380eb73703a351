//! Prompt engine for Moodcast.
//!
//! Decides when ambient context warrants a listening prompt, builds a
//! familiar/discovery queue for the inferred vibe, and records fired prompts
//! in the trigger log.

pub mod context;
pub mod error;
pub mod notifier;
pub mod orchestrator;
pub mod queue;
pub mod sourcing;
pub mod trigger;
pub mod vibe;

pub use context::{
    CalendarSource, ContextSnapshotBuilder, LocationSource, StaticSignals, WeatherSource,
};
pub use error::{NotifyError, PromptError, SignalError, SourcingError};
pub use notifier::{LogNotifier, Notifier};
pub use orchestrator::{
    Clock, CycleOutcome, CyclePreview, FixedClock, PromptOrchestrator, SystemClock,
};
pub use queue::{assemble_pools, assemble_queue, filter_candidates, CandidatePools, PoolShuffle};
pub use sourcing::{broaden_description, describe_mood, CandidateSourcer, SourcedCandidates};
pub use trigger::{
    evaluate_trigger, SuppressionReason, TriggerDecision, TriggerEvaluator, TriggerPolicy,
    Verdict,
};
pub use vibe::{infer_vibe, resolve_vibe, vibe_by_id, VibeResolution, CATALOG};
