//! Request orchestration: selection policy, per-day pipelines, aggregation.
//!
//! Each day is an independent unit of work: days run in parallel, and a
//! failure in one day is reported alongside the plans of the others
//! instead of aborting the request.

use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::panic::{AssertUnwindSafe, catch_unwind};

use rayon::prelude::*;
use tracing::{debug, error, info};

use crate::anchors;
use crate::balance;
use crate::beam::{self, BeamOptions};
use crate::cluster::{self, ClusterOptions};
use crate::cost::{self, RouteCostProvider};
use crate::error::DayFailure;
use crate::merge;
use crate::model::{
    DayPlan, Place, PlanResult, ScheduledStop, StopOrigin, TimeBlock, TransportMode, TripRequest,
};
use crate::order;

/// Tunable planning policy. The multi-path thresholds and daily caps are
/// inherited heuristics; override them rather than re-tuning in place.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub beam: BeamOptions,
    pub cluster: ClusterOptions,
    /// Beam search engages strictly above this many total candidates.
    pub multi_path_min_candidates: usize,
    /// Beam search engages strictly below this many confirmed bookings.
    pub multi_path_max_confirmed: usize,
    /// Maximum selected stops per day before the café slot.
    pub daily_activity_cap: usize,
    /// Hard per-day stop ceiling; keeps the itinerary walkable.
    pub daily_stop_cap: usize,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            beam: BeamOptions::default(),
            cluster: ClusterOptions::default(),
            multi_path_min_candidates: 20,
            multi_path_max_confirmed: 3,
            daily_activity_cap: 6,
            daily_stop_cap: 8,
        }
    }
}

/// Plans the whole trip. Day plans are joined into a day-keyed map; days
/// that fail unexpectedly are listed in `failures` and never take their
/// siblings down with them.
pub fn plan<P>(request: &TripRequest, provider: Option<&P>, options: &PlanOptions) -> PlanResult
where
    P: RouteCostProvider + Sync + ?Sized,
{
    let total_candidates = request.total_candidates();
    let confirmed_count = request.confirmed.len();
    let use_beam = total_candidates > options.multi_path_min_candidates
        && confirmed_count < options.multi_path_max_confirmed;
    info!(
        trip_days = request.trip_days,
        total_candidates, confirmed_count, use_beam, "planning trip"
    );

    let confirmed_by_day = merge::confirmed_by_day(&request.confirmed, request.start_date);
    let hotel = anchors::find_accommodation(
        request.accommodation.as_ref(),
        request.daily_candidates.values().flatten(),
    );

    let outcomes: Vec<(u32, Result<DayPlan, DayFailure>)> = (1..=request.trip_days)
        .into_par_iter()
        .map(|day| {
            let confirmed = confirmed_by_day
                .get(&day)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                plan_day(day, request, use_beam, confirmed, hotel.as_ref(), provider, options)
            }))
            .map_err(|panic| DayFailure {
                day,
                reason: panic_message(panic.as_ref()),
            });
            (day, outcome)
        })
        .collect();

    let mut days = BTreeMap::new();
    let mut failures = Vec::new();
    for (day, outcome) in outcomes {
        match outcome {
            Ok(day_plan) => {
                days.insert(day, day_plan);
            }
            Err(failure) => {
                error!(day = failure.day, reason = %failure.reason, "day planning failed");
                failures.push(failure);
            }
        }
    }

    PlanResult { days, failures }
}

fn plan_day<P>(
    day: u32,
    request: &TripRequest,
    use_beam: bool,
    confirmed: &[Place],
    hotel: Option<&Place>,
    provider: Option<&P>,
    options: &PlanOptions,
) -> DayPlan
where
    P: RouteCostProvider + ?Sized,
{
    let candidates = request
        .daily_candidates
        .get(&day)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut stops = if use_beam {
        beam_day(candidates, confirmed, request.transport_mode, options)
    } else {
        merge::merge_day(
            candidates,
            confirmed,
            options.daily_activity_cap,
            options.daily_stop_cap,
        )
    };

    anchors::schedule_day(&mut stops, hotel, day, request.trip_days);
    order::optimize_visit_order(&mut stops, request.transport_mode, request.strategy);
    let (total_distance_km, total_duration_min) =
        cost::annotate_day(&mut stops, request.transport_mode, provider);

    debug!(day, stops = stops.len(), total_distance_km, "day planned");
    DayPlan {
        day,
        stops,
        total_distance_km,
        total_duration_min,
    }
}

/// Beam selection for one day: the search runs over the blocks left free
/// by confirmed bookings, then the picks merge back in day order.
fn beam_day(
    candidates: &[Place],
    confirmed: &[Place],
    mode: TransportMode,
    options: &PlanOptions,
) -> Vec<ScheduledStop> {
    let occupied: HashSet<TimeBlock> = confirmed.iter().filter_map(|p| p.block).collect();

    let mut by_block: BTreeMap<TimeBlock, Vec<Place>> = BTreeMap::new();
    for place in candidates {
        let Some(block) = place.block else { continue };
        if occupied.contains(&block) {
            continue;
        }
        by_block.entry(block).or_default().push(place.clone());
    }

    let path = beam::select_path(&by_block, mode, &options.beam);

    let mut stops: Vec<ScheduledStop> = confirmed
        .iter()
        .cloned()
        .filter_map(|p| ScheduledStop::new(p, StopOrigin::Confirmed))
        .collect();
    stops.extend(
        path.places
            .into_iter()
            .filter_map(|p| ScheduledStop::new(p, StopOrigin::Suggested)),
    );
    stops.sort_by_key(|s| s.block.day_order());
    stops
}

/// Builds per-day candidate pools from a flat pool: required candidates
/// are clustered geographically onto days, then each day is topped up to
/// the category quotas from the optional candidates.
pub fn distribute_candidates(
    pool: &[Place],
    trip_days: u32,
    quotas: &BTreeMap<String, usize>,
    options: &ClusterOptions,
) -> BTreeMap<u32, Vec<Place>> {
    let required: Vec<Place> = pool.iter().filter(|p| p.priority == 1).cloned().collect();
    let mut optional: Vec<Place> = pool.iter().filter(|p| p.priority > 1).cloned().collect();

    let buckets = cluster::cluster_by_location(&required, trip_days as usize, options);

    let mut days: BTreeMap<u32, Vec<Place>> = (1..=trip_days).map(|d| (d, Vec::new())).collect();
    for (i, bucket) in buckets.into_iter().enumerate() {
        days.entry(i as u32 + 1).or_default().extend(bucket);
    }

    balance::balance_categories(&mut days, &mut optional, quotas);
    info!(
        required = required.len(),
        optional_unused = optional.len(),
        trip_days,
        "distributed candidates"
    );
    days
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unidentified panic".to_string()
    }
}
