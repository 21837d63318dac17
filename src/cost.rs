//! Route cost calculation (local estimate + provider seam).
//!
//! Distances use great-circle (Haversine) math and a per-mode speed table.
//! Less accurate than a real routing provider (ignores roads) but always
//! available; when a provider is configured its answer is preferred and
//! this module is the per-call fallback.

use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::model::{LatLng, RouteLeg, ScheduledStop, TransportMode};

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Leg estimate when either endpoint has no coordinates (bookings
/// extracted from documents are often not geocoded).
pub const UNKNOWN_LEG_KM: f64 = 5.0;

const CAR_SPEED_KMH: f64 = 40.0;
const PUBLIC_TRANSPORT_SPEED_KMH: f64 = 25.0;
const WALKING_SPEED_KMH: f64 = 4.0;

/// Assumed average travel speed for a transport mode.
pub fn speed_kmh(mode: TransportMode) -> f64 {
    match mode {
        TransportMode::Car => CAR_SPEED_KMH,
        TransportMode::PublicTransport => PUBLIC_TRANSPORT_SPEED_KMH,
        TransportMode::Walking => WALKING_SPEED_KMH,
    }
}

/// Haversine distance between two points in kilometers.
pub fn haversine_km(from: LatLng, to: LatLng) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Travel time in minutes for a distance at the mode's assumed speed.
pub fn duration_min(distance_km: f64, mode: TransportMode) -> f64 {
    distance_km / speed_kmh(mode) * 60.0
}

/// Local leg estimate between two optionally-located points.
pub fn leg_between(from: Option<LatLng>, to: Option<LatLng>, mode: TransportMode) -> RouteLeg {
    let distance_km = match (from, to) {
        (Some(a), Some(b)) => haversine_km(a, b),
        _ => UNKNOWN_LEG_KM,
    };
    RouteLeg {
        distance_km,
        duration_min: duration_min(distance_km, mode),
    }
}

/// Local leg estimates along an ordered coordinate sequence.
pub fn local_legs(coords: &[Option<LatLng>], mode: TransportMode) -> Vec<RouteLeg> {
    coords
        .windows(2)
        .map(|pair| leg_between(pair[0], pair[1], mode))
        .collect()
}

/// External source of real-route distances and durations.
///
/// One logical call covers one day's ordered stops and returns one leg per
/// consecutive pair. Implementations must be synchronously callable;
/// substituting the built-in estimate simply means passing no provider.
pub trait RouteCostProvider {
    fn route_legs(
        &self,
        waypoints: &[LatLng],
        mode: TransportMode,
    ) -> Result<Vec<RouteLeg>, ProviderError>;
}

/// Annotates a day's stops with legs and returns (total km, total minutes).
///
/// Prefers the provider when one is configured and every stop is located;
/// any provider failure downgrades to the local estimate for this day only.
pub fn annotate_day<P>(
    stops: &mut [ScheduledStop],
    mode: TransportMode,
    provider: Option<&P>,
) -> (f64, f64)
where
    P: RouteCostProvider + ?Sized,
{
    if let Some(first) = stops.first_mut() {
        first.leg = None;
    }
    if stops.len() < 2 {
        return (0.0, 0.0);
    }

    let coords: Vec<Option<LatLng>> = stops.iter().map(|s| s.place.coords).collect();
    let legs = provider_legs(&coords, mode, provider).unwrap_or_else(|| local_legs(&coords, mode));

    let mut total_km = 0.0;
    let mut total_min = 0.0;
    for (i, leg) in legs.into_iter().enumerate() {
        total_km += leg.distance_km;
        total_min += leg.duration_min;
        stops[i + 1].leg = Some(leg);
    }
    (total_km, total_min)
}

fn provider_legs<P>(
    coords: &[Option<LatLng>],
    mode: TransportMode,
    provider: Option<&P>,
) -> Option<Vec<RouteLeg>>
where
    P: RouteCostProvider + ?Sized,
{
    let provider = provider?;
    let waypoints: Option<Vec<LatLng>> = coords.iter().copied().collect();
    let Some(waypoints) = waypoints else {
        debug!("stop without coordinates, using local estimates");
        return None;
    };

    match provider.route_legs(&waypoints, mode) {
        Ok(legs) if legs.len() == waypoints.len() - 1 => Some(legs),
        Ok(legs) => {
            warn!(
                got = legs.len(),
                expected = waypoints.len() - 1,
                "provider leg count mismatch, using local estimates"
            );
            None
        }
        Err(err) => {
            warn!(error = %err, "route provider failed, using local estimates");
            None
        }
    }
}
