use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MoodcastError, Result};

// =============================================================================
// Enums - Context Signals
// =============================================================================

/// Coarse category of where the user currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationCategory {
    Home,
    Work,
    Gym,
    Commute,
    Outdoors,
    Cafe,
    /// No location signal (permission denied, lookup failed, unmapped place).
    #[default]
    Unknown,
}

impl LocationCategory {
    pub const ALL: [LocationCategory; 7] = [
        LocationCategory::Home,
        LocationCategory::Work,
        LocationCategory::Gym,
        LocationCategory::Commute,
        LocationCategory::Outdoors,
        LocationCategory::Cafe,
        LocationCategory::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LocationCategory::Home => "home",
            LocationCategory::Work => "work",
            LocationCategory::Gym => "gym",
            LocationCategory::Commute => "commute",
            LocationCategory::Outdoors => "outdoors",
            LocationCategory::Cafe => "cafe",
            LocationCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LocationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LocationCategory {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown location category: {}", s))
    }
}

/// Normalized weather condition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherTag {
    Clear,
    Cloudy,
    Rain,
    Snow,
    Storm,
    Fog,
    Hot,
    #[default]
    Unknown,
}

impl WeatherTag {
    pub const ALL: [WeatherTag; 8] = [
        WeatherTag::Clear,
        WeatherTag::Cloudy,
        WeatherTag::Rain,
        WeatherTag::Snow,
        WeatherTag::Storm,
        WeatherTag::Fog,
        WeatherTag::Hot,
        WeatherTag::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherTag::Clear => "clear",
            WeatherTag::Cloudy => "cloudy",
            WeatherTag::Rain => "rain",
            WeatherTag::Snow => "snow",
            WeatherTag::Storm => "storm",
            WeatherTag::Fog => "fog",
            WeatherTag::Hot => "hot",
            WeatherTag::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WeatherTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WeatherTag {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| format!("Unknown weather tag: {}", s))
    }
}

/// Time-of-day bucket. The six buckets partition the 24 hours of a day.
///
/// Always derived from a wall clock, so there is no unknown bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    /// 00:00 - 04:59
    LateNight,
    /// 05:00 - 07:59
    EarlyMorning,
    /// 08:00 - 11:59
    Morning,
    /// 12:00 - 16:59
    Afternoon,
    /// 17:00 - 20:59
    Evening,
    /// 21:00 - 23:59
    Night,
}

impl TimeBucket {
    pub const ALL: [TimeBucket; 6] = [
        TimeBucket::LateNight,
        TimeBucket::EarlyMorning,
        TimeBucket::Morning,
        TimeBucket::Afternoon,
        TimeBucket::Evening,
        TimeBucket::Night,
    ];

    /// Bucket for an hour of day. Hours past 23 wrap modulo 24.
    pub fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            0..=4 => TimeBucket::LateNight,
            5..=7 => TimeBucket::EarlyMorning,
            8..=11 => TimeBucket::Morning,
            12..=16 => TimeBucket::Afternoon,
            17..=20 => TimeBucket::Evening,
            _ => TimeBucket::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBucket::LateNight => "late_night",
            TimeBucket::EarlyMorning => "early_morning",
            TimeBucket::Morning => "morning",
            TimeBucket::Afternoon => "afternoon",
            TimeBucket::Evening => "evening",
            TimeBucket::Night => "night",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeBucket {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| format!("Unknown time bucket: {}", s))
    }
}

/// Category of a calendar event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Workout,
    Focus,
    Meeting,
    Social,
    Travel,
    Relax,
    Other,
    #[default]
    Unknown,
}

impl EventCategory {
    pub const ALL: [EventCategory; 8] = [
        EventCategory::Workout,
        EventCategory::Focus,
        EventCategory::Meeting,
        EventCategory::Social,
        EventCategory::Travel,
        EventCategory::Relax,
        EventCategory::Other,
        EventCategory::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Workout => "workout",
            EventCategory::Focus => "focus",
            EventCategory::Meeting => "meeting",
            EventCategory::Social => "social",
            EventCategory::Travel => "travel",
            EventCategory::Relax => "relax",
            EventCategory::Other => "other",
            EventCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventCategory {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown event category: {}", s))
    }
}

// =============================================================================
// Context Snapshot
// =============================================================================

/// The nearest upcoming calendar event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingEvent {
    pub category: EventCategory,
    pub title: String,
    /// Minutes until the event starts. Negative once it has started.
    pub minutes_until_start: i64,
}

impl UpcomingEvent {
    pub fn new(category: EventCategory, title: impl Into<String>, minutes_until_start: i64) -> Self {
        Self {
            category,
            title: title.into(),
            minutes_until_start,
        }
    }

    /// Whether the event starts within `horizon_minutes` (and has not started yet).
    pub fn starts_within(&self, horizon_minutes: i64) -> bool {
        (0..=horizon_minutes).contains(&self.minutes_until_start)
    }
}

/// Point-in-time view of the user's ambient context.
///
/// Built once per evaluation cycle and never mutated afterwards. A missing
/// signal is represented by the `Unknown` variant (or `None` for the event),
/// never by an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub location: LocationCategory,
    pub weather: WeatherTag,
    pub time_bucket: TimeBucket,
    pub upcoming_event: Option<UpcomingEvent>,
    /// Local wall-clock time the snapshot was taken.
    pub captured_at: DateTime<FixedOffset>,
}

impl ContextSnapshot {
    /// Aggregate already-resolved signals. The time bucket is derived from
    /// `captured_at`.
    pub fn from_signals(
        location: LocationCategory,
        weather: WeatherTag,
        upcoming_event: Option<UpcomingEvent>,
        captured_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            location,
            weather,
            time_bucket: TimeBucket::from_hour(captured_at.hour()),
            upcoming_event,
            captured_at,
        }
    }

    /// Local hour of day (0-23).
    pub fn hour(&self) -> u32 {
        self.captured_at.hour()
    }

    /// True when at least one of location, weather, or calendar is known.
    pub fn has_ambient_signal(&self) -> bool {
        self.location != LocationCategory::Unknown
            || self.weather != WeatherTag::Unknown
            || self.upcoming_event.is_some()
    }
}

// =============================================================================
// Vibe Profiles
// =============================================================================

/// Target audio-mood coordinates. Ratios are in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MoodTargets {
    pub energy: f32,
    pub valence: f32,
    pub danceability: f32,
    pub acousticness: f32,
    pub tempo_bpm: f32,
}

/// A named listening mood with a target queue length.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VibeProfile {
    pub id: &'static str,
    pub label: &'static str,
    pub mood: MoodTargets,
    pub target_duration_minutes: u32,
}

impl VibeProfile {
    pub fn target_duration_ms(&self) -> u64 {
        u64::from(self.target_duration_minutes) * 60_000
    }
}

// =============================================================================
// Trigger Sources & Log
// =============================================================================

/// Which context dimension caused a cycle to consider firing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCategory {
    Calendar,
    Location,
    Weather,
    Time,
}

impl TriggerCategory {
    pub const ALL: [TriggerCategory; 4] = [
        TriggerCategory::Calendar,
        TriggerCategory::Location,
        TriggerCategory::Weather,
        TriggerCategory::Time,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerCategory::Calendar => "calendar",
            TriggerCategory::Location => "location",
            TriggerCategory::Weather => "weather",
            TriggerCategory::Time => "time",
        }
    }
}

impl fmt::Display for TriggerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TriggerCategory {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown trigger category: {}", s))
    }
}

/// Category plus value, e.g. `weather:rain`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerSource {
    pub category: TriggerCategory,
    pub value: String,
}

impl TriggerSource {
    pub fn new(category: TriggerCategory, value: impl Into<String>) -> Self {
        Self {
            category,
            value: value.into(),
        }
    }
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.value)
    }
}

impl std::str::FromStr for TriggerSource {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (category, value) = s
            .split_once(':')
            .ok_or_else(|| format!("Trigger source missing ':' separator: {}", s))?;
        if value.is_empty() {
            return Err(format!("Trigger source has an empty value: {}", s));
        }
        Ok(Self::new(category.parse()?, value))
    }
}

/// One fired prompt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggerLogEntry {
    pub id: Uuid,
    pub vibe_id: String,
    pub trigger_source: TriggerSource,
    pub fired_at: DateTime<Utc>,
    /// Set later, when the user dismisses the prompt.
    #[serde(default)]
    pub dismissed: bool,
}

impl TriggerLogEntry {
    pub fn new(vibe_id: impl Into<String>, trigger_source: TriggerSource, fired_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            vibe_id: vibe_id.into(),
            trigger_source,
            fired_at,
            dismissed: false,
        }
    }
}

/// Append-only history of fired prompts, bounded to a rolling window.
///
/// Treated as a value: appending or dismissing produces a new log which the
/// caller persists as a whole.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerLog {
    entries: Vec<TriggerLogEntry>,
}

/// Start of a window of length `window` ending at `now`, clamped to the
/// earliest representable instant.
pub fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl TriggerLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<TriggerLogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TriggerLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&TriggerLogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries fired at or after `since`.
    pub fn fired_since(&self, since: DateTime<Utc>) -> impl Iterator<Item = &TriggerLogEntry> {
        self.entries.iter().filter(move |e| e.fired_at >= since)
    }

    /// New log with `entry` appended and everything older than
    /// `entry.fired_at - retention` dropped.
    pub fn appended(&self, entry: TriggerLogEntry, retention: Duration) -> TriggerLog {
        let mut next = self.pruned(entry.fired_at, retention);
        next.entries.push(entry);
        next
    }

    /// New log keeping only entries fired within `retention` of `now`.
    pub fn pruned(&self, now: DateTime<Utc>, retention: Duration) -> TriggerLog {
        let cutoff = window_start(now, retention);
        TriggerLog {
            entries: self
                .entries
                .iter()
                .filter(|e| e.fired_at >= cutoff)
                .cloned()
                .collect(),
        }
    }

    /// New log with the given entry marked dismissed, or `None` if no entry
    /// has that id.
    pub fn with_dismissed(&self, id: Uuid) -> Option<TriggerLog> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        let mut next = self.clone();
        next.entries[pos].dismissed = true;
        Some(next)
    }
}

// =============================================================================
// Prompt Settings
// =============================================================================

/// Per-user prompt preferences. Changed only by explicit user action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    pub calendar_enabled: bool,
    pub location_enabled: bool,
    pub weather_enabled: bool,
    pub time_enabled: bool,
    /// First quiet hour (inclusive, 0-23).
    pub quiet_hours_start: u8,
    /// End of quiet hours (exclusive, 0-23). Equal to start means no quiet hours.
    pub quiet_hours_end: u8,
    pub max_prompts_per_day: u32,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            calendar_enabled: true,
            location_enabled: true,
            weather_enabled: true,
            time_enabled: true,
            quiet_hours_start: 22,
            quiet_hours_end: 7,
            max_prompts_per_day: 3,
        }
    }
}

impl PromptSettings {
    pub fn is_enabled(&self, category: TriggerCategory) -> bool {
        match category {
            TriggerCategory::Calendar => self.calendar_enabled,
            TriggerCategory::Location => self.location_enabled,
            TriggerCategory::Weather => self.weather_enabled,
            TriggerCategory::Time => self.time_enabled,
        }
    }

    pub fn set_enabled(&mut self, category: TriggerCategory, enabled: bool) {
        match category {
            TriggerCategory::Calendar => self.calendar_enabled = enabled,
            TriggerCategory::Location => self.location_enabled = enabled,
            TriggerCategory::Weather => self.weather_enabled = enabled,
            TriggerCategory::Time => self.time_enabled = enabled,
        }
    }

    /// Whether `hour` falls in `[quiet_hours_start, quiet_hours_end)`,
    /// wrapping past midnight when start > end.
    pub fn in_quiet_hours(&self, hour: u32) -> bool {
        let start = u32::from(self.quiet_hours_start);
        let end = u32::from(self.quiet_hours_end);
        if start == end {
            false
        } else if start < end {
            hour >= start && hour < end
        } else {
            hour >= start || hour < end
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.quiet_hours_start > 23 || self.quiet_hours_end > 23 {
            return Err(MoodcastError::InvalidSettings(format!(
                "quiet hours must be within 0-23, got {}-{}",
                self.quiet_hours_start, self.quiet_hours_end
            )));
        }
        if self.max_prompts_per_day == 0 {
            return Err(MoodcastError::InvalidSettings(
                "max_prompts_per_day must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Tracks & Queues
// =============================================================================

/// A candidate track returned by the sourcer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    /// Identity of the first credited artist.
    pub artist_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub duration_ms: u64,
}

impl Track {
    pub fn new(id: impl Into<String>, artist_key: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            id: id.into(),
            artist_key: artist_key.into(),
            title: None,
            duration_ms,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Which pool a queued track came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackOrigin {
    Familiar,
    Discovery,
}

impl fmt::Display for TrackOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackOrigin::Familiar => write!(f, "familiar"),
            TrackOrigin::Discovery => write!(f, "discovery"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedTrack {
    pub track: Track,
    pub origin: TrackOrigin,
}

/// Output of queue assembly, before it is tied to a vibe and context.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AssembledQueue {
    pub tracks: Vec<QueuedTrack>,
    pub familiar_count: usize,
    pub discovery_count: usize,
}

impl AssembledQueue {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.tracks.iter().map(|t| t.track.duration_ms).sum()
    }
}

/// A delivered queue. Superseded, never mutated, by the next cycle.
#[derive(Clone, Debug, Serialize)]
pub struct GeneratedQueue {
    pub tracks: Vec<QueuedTrack>,
    pub vibe: &'static VibeProfile,
    pub context: ContextSnapshot,
    pub familiar_count: usize,
    pub discovery_count: usize,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedQueue {
    pub fn new(
        assembled: AssembledQueue,
        vibe: &'static VibeProfile,
        context: ContextSnapshot,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            tracks: assembled.tracks,
            vibe,
            context,
            familiar_count: assembled.familiar_count,
            discovery_count: assembled.discovery_count,
            generated_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.tracks.iter().map(|t| t.track.duration_ms).sum()
    }

    pub fn total_duration_minutes(&self) -> f64 {
        self.total_duration_ms() as f64 / 60_000.0
    }
}

/// User taste data forwarded untouched to the candidate sourcer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TasteProfile {
    pub top_artists: Vec<String>,
    pub top_genres: Vec<String>,
    pub recent_track_ids: Vec<String>,
}
