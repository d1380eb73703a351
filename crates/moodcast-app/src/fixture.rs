//! JSON fixtures standing in for live signal, recommendation, and
//! notification services.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use moodcast_core::error::MoodcastError;
use moodcast_core::types::{LocationCategory, TasteProfile, Track, UpcomingEvent, WeatherTag};
use moodcast_prompt::{CandidateSourcer, LogNotifier, SourcingError, StaticSignals};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub location: LocationCategory,
    pub weather: WeatherTag,
    pub event: Option<UpcomingEvent>,
    pub taste: TasteProfile,
    pub familiar: Vec<Track>,
    pub discovery: Vec<Track>,
    /// When set, every sourcing request fails with this message.
    pub sourcing_error: Option<String>,
    pub notifications_enabled: bool,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            location: LocationCategory::Unknown,
            weather: WeatherTag::Unknown,
            event: None,
            taste: TasteProfile::default(),
            familiar: Vec::new(),
            discovery: Vec::new(),
            sourcing_error: None,
            notifications_enabled: true,
        }
    }
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self, MoodcastError> {
        let content = std::fs::read_to_string(path)?;
        let fixture: Fixture = serde_json::from_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            familiar = fixture.familiar.len(),
            discovery = fixture.discovery.len(),
            "Fixture loaded"
        );
        Ok(fixture)
    }

    pub fn signals(&self) -> StaticSignals {
        StaticSignals {
            location: self.location,
            weather: self.weather,
            event: self.event.clone(),
        }
    }

    pub fn sourcer(&self) -> FixtureSourcer {
        FixtureSourcer {
            familiar: self.familiar.clone(),
            discovery: self.discovery.clone(),
            failure: self.sourcing_error.clone(),
        }
    }

    pub fn notifier(&self) -> LogNotifier {
        LogNotifier::new(self.notifications_enabled)
    }
}

/// Serves the fixture pools for every mood description.
#[derive(Debug, Clone)]
pub struct FixtureSourcer {
    familiar: Vec<Track>,
    discovery: Vec<Track>,
    failure: Option<String>,
}

impl FixtureSourcer {
    fn check(&self) -> Result<(), SourcingError> {
        match &self.failure {
            Some(message) => Err(SourcingError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CandidateSourcer for FixtureSourcer {
    async fn familiar(
        &self,
        mood_description: &str,
        _taste: &TasteProfile,
    ) -> Result<Vec<Track>, SourcingError> {
        self.check()?;
        tracing::debug!(mood = mood_description, "Serving familiar pool");
        Ok(self.familiar.clone())
    }

    async fn discovery(
        &self,
        _mood_description: &str,
        _taste: &TasteProfile,
    ) -> Result<Vec<Track>, SourcingError> {
        self.check()?;
        Ok(self.discovery.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodcast_core::types::EventCategory;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "location": "unknown",
        "weather": "rain",
        "event": { "category": "focus", "title": "Write report", "minutes_until_start": 90 },
        "familiar": [ { "id": "f1", "artist_key": "a1", "title": "Old Friend", "duration_ms": 200000 } ],
        "discovery": [ { "id": "d1", "artist_key": "b1", "duration_ms": 180000 } ]
    }"#;

    #[test]
    fn test_parse_fixture_with_defaults() {
        let fixture: Fixture = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(fixture.weather, WeatherTag::Rain);
        assert_eq!(fixture.event.as_ref().unwrap().category, EventCategory::Focus);
        assert_eq!(fixture.familiar[0].title.as_deref(), Some("Old Friend"));
        assert!(fixture.notifications_enabled);
        assert!(fixture.sourcing_error.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let fixture = Fixture::load(file.path()).unwrap();
        assert_eq!(fixture.discovery.len(), 1);
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ weather: ").unwrap();
        assert!(matches!(
            Fixture::load(file.path()),
            Err(MoodcastError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_sourcer_serves_pools() {
        let fixture: Fixture = serde_json::from_str(SAMPLE).unwrap();
        let sourced = fixture
            .sourcer()
            .source_candidates("anything", &TasteProfile::default())
            .await
            .unwrap();
        assert_eq!(sourced.familiar.len(), 1);
        assert_eq!(sourced.discovery.len(), 1);
    }

    #[tokio::test]
    async fn test_sourcer_failure() {
        let fixture = Fixture {
            sourcing_error: Some("recommendations offline".to_string()),
            ..Fixture::default()
        };
        let result = fixture
            .sourcer()
            .source_candidates("anything", &TasteProfile::default())
            .await;
        assert!(matches!(result, Err(SourcingError::Unavailable(_))));
    }
}
