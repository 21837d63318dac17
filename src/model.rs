//! Core domain types for the itinerary engine.
//!
//! Everything here is a plain value object: candidates arrive from the
//! upstream recommendation stage, confirmed bookings from document
//! extraction, and the engine only ever reads them. Pool membership is
//! decided by content (id + name), never by identity.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::DayFailure;

/// Latitude/longitude pair in degrees.
pub type LatLng = (f64, f64);

/// Day-part a candidate or booking is tagged for.
///
/// The `Hotel*` variants are anchor blocks: they are never supplied by the
/// recommendation stage, only synthesized for an accommodation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeBlock {
    Breakfast,
    MorningActivity,
    Lunch,
    AfternoonActivity,
    Cafe,
    Dinner,
    EveningActivity,
    /// Overflow bucket for bookings outside the regular day (23:00-06:00).
    LateActivity,
    HotelStart,
    HotelCheckin,
    HotelCheckout,
    HotelReturn,
}

impl TimeBlock {
    /// Buckets a booking's start hour into a day-part.
    pub fn from_start_hour(hour: u32) -> Self {
        match hour {
            6..=9 => Self::Breakfast,
            10..=11 => Self::MorningActivity,
            12..=13 => Self::Lunch,
            14..=16 => Self::AfternoonActivity,
            17..=19 => Self::Dinner,
            20..=22 => Self::EveningActivity,
            _ => Self::LateActivity,
        }
    }

    /// Ordering used when merging selected places into a day, before any
    /// anchors exist. Blocks outside the regular sequence sort last.
    pub fn day_order(self) -> u32 {
        match self {
            Self::Breakfast => 1,
            Self::MorningActivity => 2,
            Self::Lunch => 3,
            Self::AfternoonActivity => 4,
            Self::Cafe => 5,
            Self::Dinner => 6,
            Self::EveningActivity => 7,
            _ => 999,
        }
    }

    /// Canonical anchor-aware ordering for a finished day. Blocks not in
    /// the canonical list hold a fixed mid-day position.
    pub fn canonical_order(self) -> u32 {
        match self {
            Self::HotelStart => 0,
            Self::HotelCheckout => 1,
            Self::MorningActivity => 2,
            Self::Lunch => 3,
            Self::AfternoonActivity => 4,
            Self::HotelCheckin => 5,
            Self::Dinner => 6,
            Self::EveningActivity => 7,
            Self::HotelReturn => 8,
            _ => 5,
        }
    }

    pub fn is_anchor(self) -> bool {
        matches!(
            self,
            Self::HotelStart | Self::HotelCheckin | Self::HotelCheckout | Self::HotelReturn
        )
    }
}

/// How the traveler moves between stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportMode {
    Car,
    PublicTransport,
    Walking,
}

/// Which edge weight the visit-order refinement minimizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizationStrategy {
    Distance,
    Time,
    #[default]
    Balanced,
}

/// A ranked place recommendation eligible for inclusion in a day's plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    /// Free-form category tag, e.g. "food" or "sightseeing".
    pub category: String,
    /// Missing for bookings extracted from documents without geocoding.
    pub coords: Option<LatLng>,
    pub block: Option<TimeBlock>,
    /// 1 = required, anything greater = optional.
    pub priority: u8,
    /// 0-5 scale.
    pub rating: f64,
    pub visit_minutes: u32,
}

impl Place {
    /// Content key used for pool membership tests.
    pub fn key(&self) -> (&str, &str) {
        (&self.id, &self.name)
    }

    pub fn same_as(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

/// Booking document kind, as reported by the extraction stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingKind {
    Flight,
    Hotel,
    Train,
    Event,
    Restaurant,
    Attraction,
    CarRental,
    Other,
}

impl BookingKind {
    /// Category tag a booking contributes when it becomes a scheduled place.
    pub fn category_tag(self) -> &'static str {
        match self {
            Self::Flight | Self::Train | Self::CarRental => "transport",
            Self::Hotel => "lodging",
            Self::Event => "event",
            Self::Restaurant => "food",
            Self::Attraction => "sightseeing",
            Self::Other => "other",
        }
    }
}

/// An immovable calendar event derived from a traveler's booking documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedEntry {
    pub title: String,
    pub kind: BookingKind,
    /// Address or venue text from the document.
    pub location: String,
    pub coords: Option<LatLng>,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
}

/// Where a scheduled stop came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopOrigin {
    /// Immovable, from a confirmed booking.
    Confirmed,
    /// Chosen by the engine from the candidate pool.
    Suggested,
    /// Synthesized lodging marker.
    Anchor,
}

/// Travel cost from the previous stop in a day's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_km: f64,
    pub duration_min: f64,
}

/// One entry of a day plan: a place (or anchor) in its time block,
/// annotated with the leg that reaches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledStop {
    pub block: TimeBlock,
    pub place: Place,
    pub origin: StopOrigin,
    /// None for the first stop of the day.
    pub leg: Option<RouteLeg>,
}

impl ScheduledStop {
    /// Builds a stop from a block-tagged place. Places without a block
    /// cannot be scheduled.
    pub fn new(place: Place, origin: StopOrigin) -> Option<Self> {
        let block = place.block?;
        Some(Self {
            block,
            place,
            origin,
            leg: None,
        })
    }
}

/// Ordered visiting sequence for one day (1-indexed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    pub stops: Vec<ScheduledStop>,
    pub total_distance_km: f64,
    pub total_duration_min: f64,
}

impl DayPlan {
    pub fn stats(&self) -> DayStats {
        let segments = self.stops.len().saturating_sub(1);
        let (avg_km, avg_min) = if segments > 0 {
            (
                self.total_distance_km / segments as f64,
                self.total_duration_min / segments as f64,
            )
        } else {
            (0.0, 0.0)
        };
        DayStats {
            segments,
            avg_leg_distance_km: avg_km,
            avg_leg_duration_min: avg_min,
        }
    }
}

/// Aggregate route shape of one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayStats {
    pub segments: usize,
    pub avg_leg_distance_km: f64,
    pub avg_leg_duration_min: f64,
}

/// Everything one optimization run needs. Constructed per call and fully
/// consumed within it; the engine keeps no state between invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub trip_days: u32,
    pub start_date: NaiveDate,
    pub transport_mode: TransportMode,
    pub strategy: OptimizationStrategy,
    /// Explicit lodging anchor; when absent the pools are scanned for one.
    pub accommodation: Option<Place>,
    /// Ranked candidate pool per day number.
    pub daily_candidates: BTreeMap<u32, Vec<Place>>,
    pub confirmed: Vec<ConfirmedEntry>,
}

impl TripRequest {
    pub fn total_candidates(&self) -> usize {
        self.daily_candidates.values().map(Vec::len).sum()
    }
}

/// Result of one optimization run: the days that planned successfully,
/// plus a failure report for any that did not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    pub days: BTreeMap<u32, DayPlan>,
    pub failures: Vec<DayFailure>,
}

impl PlanResult {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
