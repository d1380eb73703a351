//! Static vibe catalog and context-to-vibe inference.
//!
//! Inference walks the context dimensions from most to least specific
//! (calendar, location, weather, time of day) and stops at the first one
//! with a mapping. Time of day always maps, so inference is total.

use moodcast_core::types::{
    ContextSnapshot, EventCategory, LocationCategory, MoodTargets, TimeBucket, TriggerCategory,
    TriggerSource, VibeProfile, WeatherTag,
};

/// Calendar events further away than this do not influence the vibe.
pub const DEFAULT_CALENDAR_HORIZON_MINUTES: i64 = 60;

// =============================================================================
// Profiles
// =============================================================================

const fn profile(
    id: &'static str,
    label: &'static str,
    energy: f32,
    valence: f32,
    danceability: f32,
    acousticness: f32,
    tempo_bpm: f32,
    target_duration_minutes: u32,
) -> VibeProfile {
    VibeProfile {
        id,
        label,
        mood: MoodTargets {
            energy,
            valence,
            danceability,
            acousticness,
            tempo_bpm,
        },
        target_duration_minutes,
    }
}

pub static SUNRISE_CALM: VibeProfile = profile("sunrise_calm", "Sunrise Calm", 0.30, 0.60, 0.35, 0.70, 90.0, 30);
pub static MORNING_BOOST: VibeProfile = profile("morning_boost", "Morning Boost", 0.70, 0.80, 0.65, 0.30, 118.0, 45);
pub static AFTERNOON_GROOVE: VibeProfile = profile("afternoon_groove", "Afternoon Groove", 0.60, 0.70, 0.70, 0.25, 112.0, 60);
pub static EVENING_UNWIND: VibeProfile = profile("evening_unwind", "Evening Unwind", 0.40, 0.55, 0.45, 0.55, 96.0, 60);
pub static NIGHT_DRIFT: VibeProfile = profile("night_drift", "Night Drift", 0.25, 0.40, 0.30, 0.60, 80.0, 45);
pub static LATE_NIGHT_LOFI: VibeProfile = profile("late_night_lofi", "Late Night Lo-Fi", 0.20, 0.35, 0.40, 0.50, 75.0, 40);

pub static HOME_COMFORT: VibeProfile = profile("home_comfort", "Home Comfort", 0.40, 0.65, 0.45, 0.60, 98.0, 60);
pub static DEEP_FOCUS: VibeProfile = profile("deep_focus", "Deep Focus", 0.35, 0.50, 0.20, 0.65, 95.0, 50);
pub static WORKOUT_HYPE: VibeProfile = profile("workout_hype", "Workout Hype", 0.90, 0.75, 0.80, 0.05, 140.0, 45);
pub static COMMUTE_CRUISE: VibeProfile = profile("commute_cruise", "Commute Cruise", 0.60, 0.65, 0.60, 0.30, 110.0, 30);
pub static OPEN_AIR: VibeProfile = profile("open_air", "Open Air", 0.65, 0.80, 0.60, 0.40, 116.0, 45);
pub static CAFE_ACOUSTIC: VibeProfile = profile("cafe_acoustic", "Cafe Acoustic", 0.35, 0.60, 0.40, 0.80, 92.0, 40);

pub static GREY_SKY: VibeProfile = profile("grey_sky", "Grey Sky Indie", 0.45, 0.45, 0.50, 0.50, 104.0, 45);
pub static RAINY_DAY: VibeProfile = profile("rainy_day", "Rainy Day Mellow", 0.30, 0.35, 0.30, 0.75, 85.0, 45);
pub static SNOW_COZY: VibeProfile = profile("snow_cozy", "Snowed-In Cozy", 0.30, 0.60, 0.30, 0.80, 88.0, 60);
pub static STORM_WATCH: VibeProfile = profile("storm_watch", "Storm Watch", 0.55, 0.30, 0.30, 0.40, 100.0, 40);
pub static FOG_AMBIENT: VibeProfile = profile("fog_ambient", "Fog Ambient", 0.20, 0.40, 0.20, 0.60, 72.0, 40);
pub static SUMMER_HEAT: VibeProfile = profile("summer_heat", "Summer Heat", 0.80, 0.85, 0.80, 0.20, 124.0, 45);

pub static PRE_MEETING_RESET: VibeProfile = profile("pre_meeting_reset", "Pre-Meeting Reset", 0.40, 0.60, 0.30, 0.60, 96.0, 15);
pub static SOCIAL_WARMUP: VibeProfile = profile("social_warmup", "Social Warm-Up", 0.75, 0.85, 0.80, 0.20, 120.0, 30);
pub static JOURNEY_MODE: VibeProfile = profile("journey_mode", "Journey Mode", 0.55, 0.65, 0.50, 0.40, 108.0, 60);
pub static SLOW_DOWN: VibeProfile = profile("slow_down", "Slow Down", 0.20, 0.55, 0.30, 0.75, 78.0, 45);

/// Every profile, in display order.
pub static CATALOG: &[&VibeProfile] = &[
    &SUNRISE_CALM,
    &MORNING_BOOST,
    &AFTERNOON_GROOVE,
    &EVENING_UNWIND,
    &NIGHT_DRIFT,
    &LATE_NIGHT_LOFI,
    &HOME_COMFORT,
    &DEEP_FOCUS,
    &WORKOUT_HYPE,
    &COMMUTE_CRUISE,
    &OPEN_AIR,
    &CAFE_ACOUSTIC,
    &GREY_SKY,
    &RAINY_DAY,
    &SNOW_COZY,
    &STORM_WATCH,
    &FOG_AMBIENT,
    &SUMMER_HEAT,
    &PRE_MEETING_RESET,
    &SOCIAL_WARMUP,
    &JOURNEY_MODE,
    &SLOW_DOWN,
];

// =============================================================================
// Mapping tables
// =============================================================================

// `other` and `unknown` events have no entry and fall through.
static CALENDAR_VIBES: &[(EventCategory, &VibeProfile)] = &[
    (EventCategory::Workout, &WORKOUT_HYPE),
    (EventCategory::Focus, &DEEP_FOCUS),
    (EventCategory::Meeting, &PRE_MEETING_RESET),
    (EventCategory::Social, &SOCIAL_WARMUP),
    (EventCategory::Travel, &JOURNEY_MODE),
    (EventCategory::Relax, &SLOW_DOWN),
];

static LOCATION_VIBES: &[(LocationCategory, &VibeProfile)] = &[
    (LocationCategory::Home, &HOME_COMFORT),
    (LocationCategory::Work, &DEEP_FOCUS),
    (LocationCategory::Gym, &WORKOUT_HYPE),
    (LocationCategory::Commute, &COMMUTE_CRUISE),
    (LocationCategory::Outdoors, &OPEN_AIR),
    (LocationCategory::Cafe, &CAFE_ACOUSTIC),
];

// `clear` is intentionally absent: clear skies defer to time of day.
static WEATHER_VIBES: &[(WeatherTag, &VibeProfile)] = &[
    (WeatherTag::Cloudy, &GREY_SKY),
    (WeatherTag::Rain, &RAINY_DAY),
    (WeatherTag::Snow, &SNOW_COZY),
    (WeatherTag::Storm, &STORM_WATCH),
    (WeatherTag::Fog, &FOG_AMBIENT),
    (WeatherTag::Hot, &SUMMER_HEAT),
];

fn time_vibe(bucket: TimeBucket) -> &'static VibeProfile {
    match bucket {
        TimeBucket::LateNight => &LATE_NIGHT_LOFI,
        TimeBucket::EarlyMorning => &SUNRISE_CALM,
        TimeBucket::Morning => &MORNING_BOOST,
        TimeBucket::Afternoon => &AFTERNOON_GROOVE,
        TimeBucket::Evening => &EVENING_UNWIND,
        TimeBucket::Night => &NIGHT_DRIFT,
    }
}

fn lookup<K: PartialEq>(table: &'static [(K, &'static VibeProfile)], key: K) -> Option<&'static VibeProfile> {
    table.iter().find(|(k, _)| *k == key).map(|(_, vibe)| *vibe)
}

// =============================================================================
// Inference
// =============================================================================

/// The vibe for a context and the dimension that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct VibeResolution {
    pub trigger_source: TriggerSource,
    pub vibe: &'static VibeProfile,
}

/// Walk calendar > location > weather > time and return the first match.
pub fn resolve_vibe(context: &ContextSnapshot, calendar_horizon_minutes: i64) -> VibeResolution {
    if let Some(event) = context
        .upcoming_event
        .as_ref()
        .filter(|e| e.starts_within(calendar_horizon_minutes))
    {
        if let Some(vibe) = lookup(CALENDAR_VIBES, event.category) {
            return VibeResolution {
                trigger_source: TriggerSource::new(TriggerCategory::Calendar, event.category.as_str()),
                vibe,
            };
        }
    }

    if context.location != LocationCategory::Unknown {
        if let Some(vibe) = lookup(LOCATION_VIBES, context.location) {
            return VibeResolution {
                trigger_source: TriggerSource::new(TriggerCategory::Location, context.location.as_str()),
                vibe,
            };
        }
    }

    if !matches!(context.weather, WeatherTag::Unknown | WeatherTag::Clear) {
        if let Some(vibe) = lookup(WEATHER_VIBES, context.weather) {
            return VibeResolution {
                trigger_source: TriggerSource::new(TriggerCategory::Weather, context.weather.as_str()),
                vibe,
            };
        }
    }

    VibeResolution {
        trigger_source: TriggerSource::new(TriggerCategory::Time, context.time_bucket.as_str()),
        vibe: time_vibe(context.time_bucket),
    }
}

/// Infer the vibe for a context using the default calendar horizon.
pub fn infer_vibe(context: &ContextSnapshot) -> &'static VibeProfile {
    resolve_vibe(context, DEFAULT_CALENDAR_HORIZON_MINUTES).vibe
}

pub fn vibe_by_id(id: &str) -> Option<&'static VibeProfile> {
    CATALOG.iter().copied().find(|v| v.id == id)
}
