//! Candidate sourcing seam and mood descriptions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use moodcast_core::types::{
    ContextSnapshot, LocationCategory, TasteProfile, TimeBucket, Track, TriggerCategory,
    TriggerSource, VibeProfile, WeatherTag,
};

use crate::error::SourcingError;

/// Familiar and discovery candidates returned by one sourcing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcedCandidates {
    pub familiar: Vec<Track>,
    pub discovery: Vec<Track>,
}

impl SourcedCandidates {
    pub fn len(&self) -> usize {
        self.familiar.len() + self.discovery.len()
    }

    pub fn is_empty(&self) -> bool {
        self.familiar.is_empty() && self.discovery.is_empty()
    }

    /// Append `other`'s candidates after this set's, per pool.
    pub fn extend(&mut self, other: SourcedCandidates) {
        self.familiar.extend(other.familiar);
        self.discovery.extend(other.discovery);
    }
}

/// External recommendation service.
///
/// The two pools are independent read-only lookups, so the default
/// `source_candidates` runs them concurrently. Implementations carry their
/// own timeout and retry policy.
#[async_trait]
pub trait CandidateSourcer: Send + Sync {
    /// Tracks matching the user's known taste.
    async fn familiar(
        &self,
        mood_description: &str,
        taste: &TasteProfile,
    ) -> Result<Vec<Track>, SourcingError>;

    /// Novel suggestions for the mood.
    async fn discovery(
        &self,
        mood_description: &str,
        taste: &TasteProfile,
    ) -> Result<Vec<Track>, SourcingError>;

    async fn source_candidates(
        &self,
        mood_description: &str,
        taste: &TasteProfile,
    ) -> Result<SourcedCandidates, SourcingError> {
        let (familiar, discovery) = tokio::try_join!(
            self.familiar(mood_description, taste),
            self.discovery(mood_description, taste),
        )?;
        Ok(SourcedCandidates {
            familiar,
            discovery,
        })
    }
}

fn energy_word(energy: f32) -> &'static str {
    if energy < 0.4 {
        "calm"
    } else if energy < 0.7 {
        "steady"
    } else {
        "energetic"
    }
}

fn valence_word(valence: f32) -> &'static str {
    if valence < 0.4 {
        "melancholic"
    } else if valence < 0.7 {
        "warm"
    } else {
        "upbeat"
    }
}

fn texture_word(acousticness: f32, danceability: f32) -> Option<&'static str> {
    if acousticness >= 0.6 {
        Some("acoustic")
    } else if danceability >= 0.7 {
        Some("danceable")
    } else if acousticness <= 0.1 {
        Some("electronic")
    } else {
        None
    }
}

fn time_phrase(bucket: TimeBucket) -> &'static str {
    match bucket {
        TimeBucket::LateNight => "late night",
        TimeBucket::EarlyMorning => "early morning",
        TimeBucket::Morning => "morning",
        TimeBucket::Afternoon => "afternoon",
        TimeBucket::Evening => "evening",
        TimeBucket::Night => "night",
    }
}

fn weather_adjective(weather: WeatherTag) -> Option<&'static str> {
    match weather {
        WeatherTag::Cloudy => Some("cloudy"),
        WeatherTag::Rain => Some("rainy"),
        WeatherTag::Snow => Some("snowy"),
        WeatherTag::Storm => Some("stormy"),
        WeatherTag::Fog => Some("foggy"),
        WeatherTag::Hot => Some("hot"),
        WeatherTag::Clear => Some("clear"),
        WeatherTag::Unknown => None,
    }
}

fn location_phrase(location: LocationCategory) -> &'static str {
    match location {
        LocationCategory::Home => "at home",
        LocationCategory::Work => "at work",
        LocationCategory::Gym => "at the gym",
        LocationCategory::Commute => "on the commute",
        LocationCategory::Outdoors => "outdoors",
        LocationCategory::Cafe => "at a cafe",
        LocationCategory::Unknown => "right now",
    }
}

/// Short phrase for the signal that decided the vibe.
fn context_cue(source: &TriggerSource, context: &ContextSnapshot) -> String {
    let time = time_phrase(context.time_bucket);
    match source.category {
        TriggerCategory::Calendar => match &context.upcoming_event {
            Some(event) if !event.title.trim().is_empty() => {
                format!("before {}", event.title.trim())
            }
            _ => format!("before your {} {}", source.value, time),
        },
        TriggerCategory::Location => {
            format!("{} for the {}", location_phrase(context.location), time)
        }
        TriggerCategory::Weather | TriggerCategory::Time => match weather_adjective(context.weather) {
            Some(adjective) => format!("for a {} {}", adjective, time),
            None => format!("for the {}", time),
        },
    }
}

/// Natural-language mood description sent to the sourcer, e.g.
/// `Rainy Day Mellow: calm, melancholic, acoustic music around 85 BPM for a
/// rainy afternoon`.
///
/// `source` is the trigger source the evaluator resolved for `vibe`.
pub fn describe_mood(
    vibe: &VibeProfile,
    source: &TriggerSource,
    context: &ContextSnapshot,
) -> String {
    let mood = vibe.mood;
    let mut words = vec![energy_word(mood.energy), valence_word(mood.valence)];
    words.extend(texture_word(mood.acousticness, mood.danceability));

    format!(
        "{}: {} music around {} BPM {}",
        vibe.label,
        words.join(", "),
        mood.tempo_bpm.round() as u32,
        context_cue(source, context)
    )
}

/// Looser variant of a mood description for the one broadening retry.
pub fn broaden_description(description: &str) -> String {
    format!(
        "{}; also include related genres, adjacent artists and nearby tempos",
        description
    )
}
