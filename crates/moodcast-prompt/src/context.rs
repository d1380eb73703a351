//! Context snapshot construction from signal sources.
//!
//! Each source is asked once per cycle. A transport failure degrades that
//! field to unknown; it never fails the snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use tracing::warn;

use moodcast_core::types::{ContextSnapshot, LocationCategory, UpcomingEvent, WeatherTag};

use crate::error::SignalError;

/// Coarse location of the user. `Unknown` for "no data".
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn location(&self) -> Result<LocationCategory, SignalError>;
}

/// Current weather at the user's location. `Unknown` for "no data".
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn weather(&self) -> Result<WeatherTag, SignalError>;
}

/// Nearest upcoming calendar event relative to `now`, if any.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn next_event(
        &self,
        now: DateTime<FixedOffset>,
    ) -> Result<Option<UpcomingEvent>, SignalError>;
}

/// Fixed signal values.
#[derive(Debug, Clone, Default)]
pub struct StaticSignals {
    pub location: LocationCategory,
    pub weather: WeatherTag,
    pub event: Option<UpcomingEvent>,
}

impl StaticSignals {
    pub fn new(location: LocationCategory, weather: WeatherTag) -> Self {
        Self {
            location,
            weather,
            event: None,
        }
    }

    pub fn with_event(mut self, event: UpcomingEvent) -> Self {
        self.event = Some(event);
        self
    }
}

#[async_trait]
impl LocationSource for StaticSignals {
    async fn location(&self) -> Result<LocationCategory, SignalError> {
        Ok(self.location)
    }
}

#[async_trait]
impl WeatherSource for StaticSignals {
    async fn weather(&self) -> Result<WeatherTag, SignalError> {
        Ok(self.weather)
    }
}

#[async_trait]
impl CalendarSource for StaticSignals {
    async fn next_event(
        &self,
        _now: DateTime<FixedOffset>,
    ) -> Result<Option<UpcomingEvent>, SignalError> {
        Ok(self.event.clone())
    }
}

/// Queries the three signal sources concurrently and aggregates the result.
#[derive(Clone)]
pub struct ContextSnapshotBuilder {
    location: Arc<dyn LocationSource>,
    weather: Arc<dyn WeatherSource>,
    calendar: Arc<dyn CalendarSource>,
}

impl ContextSnapshotBuilder {
    pub fn new(
        location: Arc<dyn LocationSource>,
        weather: Arc<dyn WeatherSource>,
        calendar: Arc<dyn CalendarSource>,
    ) -> Self {
        Self {
            location,
            weather,
            calendar,
        }
    }

    /// Builder whose three sources are all backed by one value.
    pub fn from_shared<S>(signals: Arc<S>) -> Self
    where
        S: LocationSource + WeatherSource + CalendarSource + 'static,
    {
        Self::new(signals.clone(), signals.clone(), signals)
    }

    pub async fn build(&self, now: DateTime<FixedOffset>) -> ContextSnapshot {
        let (location, weather, event) = tokio::join!(
            self.location.location(),
            self.weather.weather(),
            self.calendar.next_event(now),
        );

        let location = location.unwrap_or_else(|e| {
            warn!(source = "location", error = %e, "Signal unavailable, using unknown");
            LocationCategory::Unknown
        });
        let weather = weather.unwrap_or_else(|e| {
            warn!(source = "weather", error = %e, "Signal unavailable, using unknown");
            WeatherTag::Unknown
        });
        let event = event.unwrap_or_else(|e| {
            warn!(source = "calendar", error = %e, "Signal unavailable, using no event");
            None
        });

        ContextSnapshot::from_signals(location, weather, event, now)
    }
}

impl std::fmt::Debug for ContextSnapshotBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextSnapshotBuilder").finish()
    }
}
