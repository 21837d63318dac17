//! Geographic clustering of required candidates into trip days.
//!
//! k-means over candidate coordinates, seeded k-means++ style: the first
//! centroid is a uniformly random candidate, every later one is the
//! candidate farthest (by minimum Haversine distance) from the centroids
//! chosen so far. Bucket i feeds day i + 1.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::cost::haversine_km;
use crate::model::{LatLng, Place};

const MAX_ITERATIONS: usize = 100;

#[derive(Debug, Clone)]
pub struct ClusterOptions {
    pub max_iterations: usize,
    /// Fixed RNG seed for reproducible runs; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            max_iterations: MAX_ITERATIONS,
            seed: None,
        }
    }
}

/// Partitions candidates into `k` location buckets. Every candidate lands
/// in exactly one bucket; buckets beyond the available spread stay empty.
/// Candidates without coordinates fall into the first bucket.
pub fn cluster_by_location(places: &[Place], k: usize, options: &ClusterOptions) -> Vec<Vec<Place>> {
    let mut buckets: Vec<Vec<Place>> = vec![Vec::new(); k];
    if k == 0 || places.is_empty() {
        return buckets;
    }

    let mut centroids = seed_centroids(places, k, options);
    let mut assignment: Vec<usize> = vec![0; places.len()];

    for iteration in 0..options.max_iterations {
        for (i, place) in places.iter().enumerate() {
            assignment[i] = match place.coords {
                Some(coords) => nearest_centroid(coords, &centroids),
                None => 0,
            };
        }

        let mut moved = false;
        for (ci, centroid) in centroids.iter_mut().enumerate() {
            let mut lat_sum = 0.0;
            let mut lng_sum = 0.0;
            let mut count = 0usize;
            for (i, place) in places.iter().enumerate() {
                if assignment[i] != ci {
                    continue;
                }
                if let Some((lat, lng)) = place.coords {
                    lat_sum += lat;
                    lng_sum += lng;
                    count += 1;
                }
            }
            // An empty cluster keeps its previous centroid.
            if count > 0 {
                let mean = (lat_sum / count as f64, lng_sum / count as f64);
                if mean != *centroid {
                    *centroid = mean;
                    moved = true;
                }
            }
        }

        if !moved {
            debug!(iterations = iteration + 1, "clustering converged");
            break;
        }
    }

    for (i, place) in places.iter().enumerate() {
        buckets[assignment[i]].push(place.clone());
    }
    buckets
}

fn seed_centroids(places: &[Place], k: usize, options: &ClusterOptions) -> Vec<LatLng> {
    let located: Vec<(usize, LatLng)> = places
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.coords.map(|c| (i, c)))
        .collect();
    if located.is_empty() {
        return vec![(0.0, 0.0)];
    }

    let mut rng: StdRng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut chosen = vec![false; places.len()];
    let (first_index, first) = located[rng.gen_range(0..located.len())];
    chosen[first_index] = true;
    let mut centroids = vec![first];

    while centroids.len() < k.min(located.len()) {
        // Maximin: the unchosen candidate farthest from the chosen set.
        let mut best: Option<(usize, LatLng)> = None;
        let mut best_dist = 0.0;
        for &(i, coords) in &located {
            if chosen[i] {
                continue;
            }
            let min_dist = centroids
                .iter()
                .map(|&c| haversine_km(coords, c))
                .fold(f64::INFINITY, f64::min);
            if min_dist > best_dist {
                best_dist = min_dist;
                best = Some((i, coords));
            }
        }
        // Only co-located duplicates remain; no further spread to gain.
        let Some((index, coords)) = best else { break };
        chosen[index] = true;
        centroids.push(coords);
    }

    centroids
}

fn nearest_centroid(coords: LatLng, centroids: &[LatLng]) -> usize {
    let mut nearest = 0;
    let mut min_dist = f64::INFINITY;
    for (i, &centroid) in centroids.iter().enumerate() {
        let dist = haversine_km(coords, centroid);
        if dist < min_dist {
            min_dist = dist;
            nearest = i;
        }
    }
    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TimeBlock;

    fn place(id: &str, lat: f64, lng: f64) -> Place {
        Place {
            id: id.to_string(),
            name: id.to_string(),
            category: "sightseeing".to_string(),
            coords: Some((lat, lng)),
            block: Some(TimeBlock::MorningActivity),
            priority: 1,
            rating: 4.0,
            visit_minutes: 60,
        }
    }

    fn seeded() -> ClusterOptions {
        ClusterOptions {
            seed: Some(7),
            ..ClusterOptions::default()
        }
    }

    fn bucket_ids(buckets: &[Vec<Place>]) -> Vec<String> {
        let mut ids: Vec<String> = buckets
            .iter()
            .flat_map(|b| b.iter().map(|p| p.id.clone()))
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn every_candidate_lands_in_exactly_one_bucket() {
        let places: Vec<Place> = (0..8)
            .map(|i| place(&format!("p{i}"), 37.0 + f64::from(i) * 0.01, 127.0))
            .collect();
        let buckets = cluster_by_location(&places, 3, &seeded());
        assert_eq!(buckets.len(), 3);
        let mut expected: Vec<String> = places.iter().map(|p| p.id.clone()).collect();
        expected.sort();
        assert_eq!(bucket_ids(&buckets), expected);
    }

    #[test]
    fn more_buckets_than_candidates() {
        let places = vec![place("a", 37.0, 127.0), place("b", 38.0, 128.0)];
        let buckets = cluster_by_location(&places, 5, &seeded());
        assert_eq!(buckets.len(), 5);
        assert_eq!(buckets.iter().map(Vec::len).sum::<usize>(), 2);
    }

    #[test]
    fn single_bucket_takes_everything() {
        let places: Vec<Place> = (0..4)
            .map(|i| place(&format!("p{i}"), 37.0 + f64::from(i), 127.0))
            .collect();
        let buckets = cluster_by_location(&places, 1, &seeded());
        assert_eq!(buckets[0].len(), 4);
    }

    #[test]
    fn empty_input_yields_empty_buckets() {
        let buckets = cluster_by_location(&[], 3, &seeded());
        assert_eq!(buckets.len(), 3);
        assert!(buckets.iter().all(Vec::is_empty));
    }

    #[test]
    fn separated_groups_stay_together() {
        // Two tight groups ~200km apart.
        let places = vec![
            place("n1", 37.50, 127.00),
            place("n2", 37.52, 127.01),
            place("s1", 35.50, 127.00),
            place("s2", 35.52, 127.01),
        ];
        let buckets = cluster_by_location(&places, 2, &seeded());
        for bucket in &buckets {
            let north = bucket.iter().filter(|p| p.id.starts_with('n')).count();
            let south = bucket.iter().filter(|p| p.id.starts_with('s')).count();
            assert!(
                north == 0 || south == 0,
                "bucket mixes groups: {north} north, {south} south"
            );
        }
    }

    #[test]
    fn seeded_runs_are_deterministic() {
        let places: Vec<Place> = (0..10)
            .map(|i| place(&format!("p{i}"), 37.0 + f64::from(i) * 0.3, 127.0 - f64::from(i) * 0.2))
            .collect();
        let first = cluster_by_location(&places, 3, &seeded());
        let second = cluster_by_location(&places, 3, &seeded());
        assert_eq!(first, second);
    }

    #[test]
    fn unlocated_candidates_fall_into_first_bucket() {
        let mut orphan = place("orphan", 0.0, 0.0);
        orphan.coords = None;
        let places = vec![place("a", 37.0, 127.0), orphan];
        let buckets = cluster_by_location(&places, 2, &seeded());
        assert!(buckets[0].iter().any(|p| p.id == "orphan"));
    }
}
