//! Category top-up of per-day pools from the optional candidates.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::model::Place;

/// Tops each day up to the per-category quotas, consuming the optional
/// pool in its input order. A pooled candidate is used at most once across
/// the whole trip; running out before a quota is met is not an error.
pub fn balance_categories(
    days: &mut BTreeMap<u32, Vec<Place>>,
    pool: &mut Vec<Place>,
    quotas: &BTreeMap<String, usize>,
) {
    for (&day, places) in days.iter_mut() {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for place in places.iter() {
            *counts.entry(place.category.clone()).or_default() += 1;
        }

        for (category, &quota) in quotas {
            let current = counts.get(category).copied().unwrap_or(0);
            if current >= quota {
                continue;
            }
            let needed = quota - current;

            let picked: Vec<Place> = pool
                .iter()
                .filter(|p| p.category == *category)
                .take(needed)
                .cloned()
                .collect();
            if picked.is_empty() {
                continue;
            }

            pool.retain(|p| !picked.iter().any(|q| q.same_as(p)));
            debug!(day, category = %category, added = picked.len(), "topped up category");
            places.extend(picked);
        }
    }
}
