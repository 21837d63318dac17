//! Beam search across per-time-block candidate lists.
//!
//! A bounded approximation of dynamic programming over the block-by-block
//! candidate lattice: at each block only the `width` cheapest partial
//! paths survive. Width 1 degenerates to pure greedy; wider beams can
//! only match or beat it.

use std::collections::BTreeMap;

use tracing::debug;

use crate::cost;
use crate::model::{Place, TimeBlock, TransportMode};

/// Blocks considered by the selector, in day order. Only blocks actually
/// present in the input are processed.
pub const BLOCK_SEQUENCE: [TimeBlock; 6] = [
    TimeBlock::Breakfast,
    TimeBlock::MorningActivity,
    TimeBlock::Lunch,
    TimeBlock::AfternoonActivity,
    TimeBlock::Dinner,
    TimeBlock::EveningActivity,
];

/// Tunable search parameters. The defaults are inherited heuristics, not
/// derived values; override rather than re-tune in place.
#[derive(Debug, Clone)]
pub struct BeamOptions {
    /// Partial paths kept per block.
    pub width: usize,
    pub distance_weight: f64,
    pub time_weight: f64,
    pub rating_weight: f64,
}

impl Default for BeamOptions {
    fn default() -> Self {
        Self {
            width: 3,
            distance_weight: 0.4,
            time_weight: 0.3,
            rating_weight: 0.3,
        }
    }
}

/// Best combination found: one place per processed block, plus its
/// accumulated transition cost.
#[derive(Debug, Clone)]
pub struct BeamPath {
    pub places: Vec<Place>,
    pub cost: f64,
}

/// Partial path as candidate indices, one per processed block so far.
#[derive(Debug, Clone)]
struct PathState {
    picks: Vec<usize>,
    cost: f64,
}

/// Chooses the lowest-cost place combination across the day's blocks.
/// A day with no eligible blocks yields an empty path.
pub fn select_path(
    candidates: &BTreeMap<TimeBlock, Vec<Place>>,
    mode: TransportMode,
    options: &BeamOptions,
) -> BeamPath {
    let blocks: Vec<&[Place]> = BLOCK_SEQUENCE
        .iter()
        .filter_map(|b| candidates.get(b).map(Vec::as_slice))
        .filter(|list| !list.is_empty())
        .collect();

    if blocks.is_empty() {
        return BeamPath {
            places: Vec::new(),
            cost: 0.0,
        };
    }

    let mut beam: Vec<PathState> = blocks[0]
        .iter()
        .enumerate()
        .map(|(ci, _)| PathState {
            picks: vec![ci],
            cost: 0.0,
        })
        .collect();

    for (bi, block) in blocks.iter().enumerate().skip(1) {
        let mut expanded = Vec::with_capacity(beam.len() * block.len());
        for state in &beam {
            let from = &blocks[bi - 1][state.picks[bi - 1]];
            for (ci, candidate) in block.iter().enumerate() {
                let mut picks = state.picks.clone();
                picks.push(ci);
                expanded.push(PathState {
                    cost: state.cost + transition_cost(from, candidate, mode, options),
                    picks,
                });
            }
        }
        // Stable sort: cost ties keep expansion enumeration order.
        expanded.sort_by(|a, b| a.cost.total_cmp(&b.cost));
        expanded.truncate(options.width);
        beam = expanded;
        debug!(block = bi, kept = beam.len(), "beam advanced");
    }

    beam.sort_by(|a, b| a.cost.total_cmp(&b.cost));
    let best = &beam[0];
    BeamPath {
        places: best
            .picks
            .iter()
            .enumerate()
            .map(|(bi, &ci)| blocks[bi][ci].clone())
            .collect(),
        cost: best.cost,
    }
}

/// Cost of moving from one place to the next: normalized distance and
/// travel time, plus a penalty for lower-rated destinations.
pub fn transition_cost(
    from: &Place,
    to: &Place,
    mode: TransportMode,
    options: &BeamOptions,
) -> f64 {
    let leg = cost::leg_between(from.coords, to.coords, mode);
    let distance_cost = leg.distance_km / 10.0;
    let time_cost = leg.duration_min / 30.0;
    let rating_cost = (5.0 - to.rating) / 5.0;

    options.distance_weight * distance_cost
        + options.time_weight * time_cost
        + options.rating_weight * rating_cost
}
