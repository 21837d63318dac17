//! Visit-order refinement: nearest-neighbor construction plus 2-opt.
//!
//! Confirmed bookings and lodging anchors never move; only the suggested
//! stops are reordered, as a standalone subsequence written back into the
//! slots they vacated.

use tracing::debug;

use crate::cost;
use crate::model::{LatLng, OptimizationStrategy, ScheduledStop, StopOrigin, TransportMode};

const MAX_TWO_OPT_PASSES: usize = 100;

/// Reorders the day's suggested stops to shorten the route. Two or fewer
/// movable stops are left as they are.
pub fn optimize_visit_order(
    stops: &mut [ScheduledStop],
    mode: TransportMode,
    strategy: OptimizationStrategy,
) {
    let movable: Vec<usize> = stops
        .iter()
        .enumerate()
        .filter(|(_, s)| s.origin == StopOrigin::Suggested)
        .map(|(i, _)| i)
        .collect();
    if movable.len() <= 2 {
        return;
    }

    let segment: Vec<ScheduledStop> = movable.iter().map(|&i| stops[i].clone()).collect();
    let coords: Vec<Option<LatLng>> = segment.iter().map(|s| s.place.coords).collect();

    let mut route = nearest_neighbor(&coords, mode, strategy);
    two_opt(&mut route, &coords, mode, strategy);

    for (&slot, &ri) in movable.iter().zip(route.iter()) {
        stops[slot] = segment[ri].clone();
    }
}

/// Greedy construction: start at the northernmost point, repeatedly hop
/// to the nearest unvisited one.
fn nearest_neighbor(
    coords: &[Option<LatLng>],
    mode: TransportMode,
    strategy: OptimizationStrategy,
) -> Vec<usize> {
    let n = coords.len();

    let mut start = 0;
    let mut best_lat = f64::NEG_INFINITY;
    for (i, c) in coords.iter().enumerate() {
        if let Some((lat, _)) = c {
            if *lat > best_lat {
                best_lat = *lat;
                start = i;
            }
        }
    }

    let mut route = Vec::with_capacity(n);
    let mut visited = vec![false; n];
    route.push(start);
    visited[start] = true;
    let mut current = start;

    while route.len() < n {
        let mut next = None;
        let mut best = f64::INFINITY;
        for (j, visited_j) in visited.iter().enumerate() {
            if *visited_j {
                continue;
            }
            let weight = edge_weight(coords[current], coords[j], mode, strategy);
            if weight < best {
                best = weight;
                next = Some(j);
            }
        }
        let Some(j) = next else { break };
        route.push(j);
        visited[j] = true;
        current = j;
    }

    route
}

/// Local improvement: reverse any sub-route whose reversal shortens the
/// path, rescanning until a clean pass or the pass cap.
fn two_opt(
    route: &mut [usize],
    coords: &[Option<LatLng>],
    mode: TransportMode,
    strategy: OptimizationStrategy,
) {
    let n = route.len();
    if n < 3 {
        return;
    }

    for pass in 0..MAX_TWO_OPT_PASSES {
        let mut improved = false;
        for i in 0..n - 1 {
            for j in (i + 1)..n {
                if reversal_delta(route, coords, i, j, mode, strategy) < 0.0 {
                    route[i..=j].reverse();
                    improved = true;
                }
            }
        }
        if !improved {
            debug!(passes = pass + 1, "visit order stable");
            return;
        }
    }
}

/// Weight change from reversing `route[i..=j]`. Interior edges keep their
/// length under a symmetric metric, so only the two boundary edges count.
fn reversal_delta(
    route: &[usize],
    coords: &[Option<LatLng>],
    i: usize,
    j: usize,
    mode: TransportMode,
    strategy: OptimizationStrategy,
) -> f64 {
    let mut delta = 0.0;
    if i > 0 {
        let before = coords[route[i - 1]];
        delta += edge_weight(before, coords[route[j]], mode, strategy)
            - edge_weight(before, coords[route[i]], mode, strategy);
    }
    if j + 1 < route.len() {
        let after = coords[route[j + 1]];
        delta += edge_weight(coords[route[i]], after, mode, strategy)
            - edge_weight(coords[route[j]], after, mode, strategy);
    }
    delta
}

fn edge_weight(
    from: Option<LatLng>,
    to: Option<LatLng>,
    mode: TransportMode,
    strategy: OptimizationStrategy,
) -> f64 {
    let leg = cost::leg_between(from, to, mode);
    match strategy {
        OptimizationStrategy::Distance => leg.distance_km,
        OptimizationStrategy::Time => leg.duration_min,
        OptimizationStrategy::Balanced => {
            0.5 * (leg.distance_km / 10.0) + 0.5 * (leg.duration_min / 30.0)
        }
    }
}
