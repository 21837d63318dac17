//! Greedy merge of confirmed bookings with ranked candidates.
//!
//! Confirmed entries claim their day and time block first; candidates
//! colliding with a claimed block are excluded, and the remaining blocks
//! fill greedily by rating.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{NaiveDate, Timelike};
use tracing::debug;

use crate::model::{ConfirmedEntry, Place, ScheduledStop, StopOrigin, TimeBlock};

/// Visit length assumed for a booking without an end time.
const DEFAULT_BOOKING_MINUTES: u32 = 60;

/// Converts a booking into an immovable scheduled place. Bookings carry
/// maximum rating so no ranking step can displace them.
pub fn confirmed_to_place(entry: &ConfirmedEntry, seq: usize) -> Place {
    let visit_minutes = entry
        .end
        .map(|end| {
            let minutes = (end - entry.start).num_minutes();
            u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
        })
        .unwrap_or(DEFAULT_BOOKING_MINUTES);

    Place {
        id: format!("booking-{seq}"),
        name: entry.title.clone(),
        category: entry.kind.category_tag().to_string(),
        coords: entry.coords,
        block: Some(TimeBlock::from_start_hour(entry.start.hour())),
        priority: 1,
        rating: 5.0,
        visit_minutes,
    }
}

/// Maps bookings to trip days (day 1 = the start date). Entries dated
/// before the trip cannot be placed and are dropped.
pub fn confirmed_by_day(
    entries: &[ConfirmedEntry],
    start_date: NaiveDate,
) -> BTreeMap<u32, Vec<Place>> {
    let mut by_day: BTreeMap<u32, Vec<Place>> = BTreeMap::new();
    for (seq, entry) in entries.iter().enumerate() {
        let offset = (entry.start.date() - start_date).num_days() + 1;
        let Ok(day) = u32::try_from(offset) else {
            debug!(title = %entry.title, "booking predates the trip, dropped");
            continue;
        };
        if day < 1 {
            debug!(title = %entry.title, "booking predates the trip, dropped");
            continue;
        }
        by_day.entry(day).or_default().push(confirmed_to_place(entry, seq));
    }
    by_day
}

/// Greedy fill for one day: confirmed stops first, then the best-rated
/// breakfast/lunch/dinner, then activities by rating up to the daily cap,
/// then one café if room remains.
pub fn merge_day(
    candidates: &[Place],
    confirmed: &[Place],
    activity_cap: usize,
    stop_cap: usize,
) -> Vec<ScheduledStop> {
    let mut selected: Vec<ScheduledStop> = confirmed
        .iter()
        .cloned()
        .filter_map(|p| ScheduledStop::new(p, StopOrigin::Confirmed))
        .collect();

    let occupied: HashSet<TimeBlock> = selected.iter().map(|s| s.block).collect();

    let mut by_block: HashMap<TimeBlock, Vec<&Place>> = HashMap::new();
    for place in candidates {
        let Some(block) = place.block else { continue };
        if occupied.contains(&block) {
            continue;
        }
        by_block.entry(block).or_default().push(place);
    }

    for meal in [TimeBlock::Breakfast, TimeBlock::Lunch, TimeBlock::Dinner] {
        push_best(&mut selected, by_block.get(&meal));
    }

    let remaining = activity_cap.saturating_sub(selected.len());
    let mut activities: Vec<&Place> = Vec::new();
    for block in [
        TimeBlock::MorningActivity,
        TimeBlock::AfternoonActivity,
        TimeBlock::EveningActivity,
    ] {
        if let Some(list) = by_block.get(&block) {
            activities.extend(list.iter().copied());
        }
    }
    activities.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    for place in activities.into_iter().take(remaining) {
        if let Some(stop) = ScheduledStop::new(place.clone(), StopOrigin::Suggested) {
            selected.push(stop);
        }
    }

    if selected.len() < stop_cap {
        push_best(&mut selected, by_block.get(&TimeBlock::Cafe));
    }

    selected
}

/// Appends the best-rated entry of a block list, ties going to the
/// earliest-ranked candidate.
fn push_best(selected: &mut Vec<ScheduledStop>, list: Option<&Vec<&Place>>) {
    let Some(list) = list else { return };
    let mut best: Option<&Place> = None;
    for &place in list {
        if best.is_none_or(|b| place.rating > b.rating) {
            best = Some(place);
        }
    }
    if let Some(place) = best {
        if let Some(stop) = ScheduledStop::new(place.clone(), StopOrigin::Suggested) {
            selected.push(stop);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn candidate(id: &str, block: TimeBlock, rating: f64) -> Place {
        Place {
            id: id.to_string(),
            name: id.to_string(),
            category: "food".to_string(),
            coords: Some((37.5, 127.0)),
            block: Some(block),
            priority: 1,
            rating,
            visit_minutes: 60,
        }
    }

    fn booking(title: &str, datetime: &str) -> ConfirmedEntry {
        ConfirmedEntry {
            title: title.to_string(),
            kind: crate::model::BookingKind::Restaurant,
            location: "Somewhere 12".to_string(),
            coords: None,
            start: NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M")
                .expect("test datetime"),
            end: None,
        }
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).expect("test date")
    }

    #[test]
    fn booking_two_days_after_start_lands_on_day_three() {
        let by_day = confirmed_by_day(&[booking("dinner cruise", "2026-03-03 19:30")], start());
        let day3 = by_day.get(&3).expect("day 3 entry");
        assert_eq!(day3.len(), 1);
        assert_eq!(day3[0].block, Some(TimeBlock::Dinner));
        assert_eq!(day3[0].rating, 5.0);
    }

    #[test]
    fn booking_before_the_trip_is_dropped() {
        let by_day = confirmed_by_day(&[booking("early flight", "2026-02-27 09:00")], start());
        assert!(by_day.is_empty());
    }

    #[test]
    fn booking_duration_comes_from_its_window() {
        let mut entry = booking("museum tour", "2026-03-02 14:00");
        entry.end = NaiveDateTime::parse_from_str("2026-03-02 15:30", "%Y-%m-%d %H:%M").ok();
        let place = confirmed_to_place(&entry, 0);
        assert_eq!(place.visit_minutes, 90);
        assert_eq!(place.block, Some(TimeBlock::AfternoonActivity));
    }

    #[test]
    fn colliding_candidates_are_excluded() {
        let confirmed = vec![confirmed_to_place(&booking("set lunch", "2026-03-01 12:30"), 0)];
        let candidates = vec![
            candidate("rival-lunch", TimeBlock::Lunch, 4.9),
            candidate("dinner", TimeBlock::Dinner, 4.0),
        ];
        let day = merge_day(&candidates, &confirmed, 6, 8);
        assert!(day.iter().all(|s| s.place.id != "rival-lunch"));
        assert!(day.iter().any(|s| s.place.id == "dinner"));
        assert_eq!(day[0].origin, StopOrigin::Confirmed);
    }

    #[test]
    fn best_rated_meal_wins() {
        let candidates = vec![
            candidate("ok-lunch", TimeBlock::Lunch, 3.9),
            candidate("great-lunch", TimeBlock::Lunch, 4.7),
            candidate("other-lunch", TimeBlock::Lunch, 4.2),
        ];
        let day = merge_day(&candidates, &[], 6, 8);
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].place.id, "great-lunch");
    }

    #[test]
    fn rating_tie_goes_to_the_earlier_candidate() {
        let candidates = vec![
            candidate("first", TimeBlock::Dinner, 4.5),
            candidate("second", TimeBlock::Dinner, 4.5),
        ];
        let day = merge_day(&candidates, &[], 6, 8);
        assert_eq!(day[0].place.id, "first");
    }

    #[test]
    fn activities_fill_to_the_cap_by_rating() {
        let mut candidates = vec![
            candidate("breakfast", TimeBlock::Breakfast, 4.0),
            candidate("lunch", TimeBlock::Lunch, 4.0),
            candidate("dinner", TimeBlock::Dinner, 4.0),
        ];
        for i in 0..5 {
            candidates.push(candidate(
                &format!("act{i}"),
                TimeBlock::AfternoonActivity,
                3.0 + f64::from(i) * 0.3,
            ));
        }
        let day = merge_day(&candidates, &[], 6, 8);
        // Three meals plus the three best-rated activities.
        assert_eq!(day.len(), 6);
        let activity_ids: Vec<&str> = day
            .iter()
            .filter(|s| s.block == TimeBlock::AfternoonActivity)
            .map(|s| s.place.id.as_str())
            .collect();
        assert_eq!(activity_ids, vec!["act4", "act3", "act2"]);
    }

    #[test]
    fn cafe_joins_only_under_the_stop_cap() {
        let mut candidates = vec![candidate("cafe", TimeBlock::Cafe, 4.8)];
        let mut confirmed = Vec::new();
        for i in 0..8 {
            confirmed.push(confirmed_to_place(
                &booking(&format!("b{i}"), "2026-03-01 12:30"),
                i,
            ));
        }
        let full_day = merge_day(&candidates, &confirmed, 6, 8);
        assert!(full_day.iter().all(|s| s.place.id != "cafe"));

        candidates.push(candidate("lunch", TimeBlock::Lunch, 4.0));
        let light_day = merge_day(&candidates, &[], 6, 8);
        assert!(light_day.iter().any(|s| s.place.id == "cafe"));
    }

    #[test]
    fn empty_inputs_make_an_empty_day() {
        assert!(merge_day(&[], &[], 6, 8).is_empty());
    }
}
