//! Lodging anchor insertion and canonical day ordering.
//!
//! When a trip has an accommodation, each day gains synthetic stops
//! bounding its route: check-in and evening return on day one, departure
//! and return on interior days, check-out first thing on the last day.
//! Every day (hotel or not) ends canonically ordered by time block.

use tracing::debug;

use crate::model::{Place, ScheduledStop, StopOrigin, TimeBlock};

/// Day-one check-in lands after the early activity slots.
const CHECKIN_INSERT_INDEX: usize = 3;
const CHECK_MINUTES: u32 = 30;

const LODGING_CATEGORIES: [&str; 3] = ["hotel", "accommodation", "lodging"];

/// Picks the accommodation anchor: an explicit one wins, otherwise the
/// first pool place that looks like lodging.
pub fn find_accommodation<'a>(
    explicit: Option<&Place>,
    pools: impl IntoIterator<Item = &'a Place>,
) -> Option<Place> {
    if let Some(hotel) = explicit {
        return Some(hotel.clone());
    }
    pools.into_iter().find(|p| is_lodging(p)).cloned()
}

fn is_lodging(place: &Place) -> bool {
    let category = place.category.to_ascii_lowercase();
    LODGING_CATEGORIES.contains(&category.as_str())
        || place.name.to_ascii_lowercase().contains("hotel")
}

/// Inserts the day's lodging anchors (when a hotel exists) and sorts the
/// day into canonical block order. The sort is stable, so stops sharing a
/// block keep their relative order.
pub fn schedule_day(stops: &mut Vec<ScheduledStop>, hotel: Option<&Place>, day: u32, trip_days: u32) {
    if let Some(hotel) = hotel {
        if day == 1 {
            let at = CHECKIN_INSERT_INDEX.min(stops.len());
            stops.insert(
                at,
                anchor_stop(
                    hotel,
                    TimeBlock::HotelCheckin,
                    format!("{}-checkin", hotel.id),
                    "check-in",
                    CHECK_MINUTES,
                ),
            );
            stops.push(anchor_stop(
                hotel,
                TimeBlock::HotelReturn,
                format!("{}-return-{day}", hotel.id),
                "return",
                0,
            ));
        } else if day == trip_days {
            stops.insert(
                0,
                anchor_stop(
                    hotel,
                    TimeBlock::HotelCheckout,
                    format!("{}-checkout", hotel.id),
                    "check-out",
                    CHECK_MINUTES,
                ),
            );
        } else {
            stops.insert(
                0,
                anchor_stop(
                    hotel,
                    TimeBlock::HotelStart,
                    format!("{}-start-{day}", hotel.id),
                    "depart",
                    0,
                ),
            );
            stops.push(anchor_stop(
                hotel,
                TimeBlock::HotelReturn,
                format!("{}-return-{day}", hotel.id),
                "return",
                0,
            ));
        }
        debug!(day, hotel = %hotel.name, "anchored day around lodging");
    }

    stops.sort_by_key(|s| s.block.canonical_order());
}

fn anchor_stop(
    hotel: &Place,
    block: TimeBlock,
    id: String,
    label: &str,
    minutes: u32,
) -> ScheduledStop {
    ScheduledStop {
        block,
        origin: StopOrigin::Anchor,
        leg: None,
        place: Place {
            id,
            name: format!("{} ({label})", hotel.name),
            category: "lodging".to_string(),
            coords: hotel.coords,
            block: Some(block),
            priority: 1,
            rating: hotel.rating,
            visit_minutes: minutes,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel() -> Place {
        Place {
            id: "h1".to_string(),
            name: "Grand Hotel".to_string(),
            category: "lodging".to_string(),
            coords: Some((37.56, 126.98)),
            block: None,
            priority: 1,
            rating: 4.8,
            visit_minutes: 0,
        }
    }

    fn stop(id: &str, block: TimeBlock) -> ScheduledStop {
        ScheduledStop {
            block,
            origin: StopOrigin::Suggested,
            leg: None,
            place: Place {
                id: id.to_string(),
                name: id.to_string(),
                category: "sightseeing".to_string(),
                coords: Some((37.5, 127.0)),
                block: Some(block),
                priority: 1,
                rating: 4.0,
                visit_minutes: 60,
            },
        }
    }

    fn blocks(stops: &[ScheduledStop]) -> Vec<TimeBlock> {
        stops.iter().map(|s| s.block).collect()
    }

    #[test]
    fn first_day_gets_checkin_and_return() {
        let mut day = vec![
            stop("a", TimeBlock::MorningActivity),
            stop("b", TimeBlock::Lunch),
            stop("c", TimeBlock::AfternoonActivity),
            stop("d", TimeBlock::Dinner),
        ];
        schedule_day(&mut day, Some(&hotel()), 1, 3);
        assert_eq!(
            blocks(&day),
            vec![
                TimeBlock::MorningActivity,
                TimeBlock::Lunch,
                TimeBlock::AfternoonActivity,
                TimeBlock::HotelCheckin,
                TimeBlock::Dinner,
                TimeBlock::HotelReturn,
            ]
        );
    }

    #[test]
    fn interior_day_departs_and_returns() {
        let mut day = vec![stop("a", TimeBlock::Lunch), stop("b", TimeBlock::Dinner)];
        schedule_day(&mut day, Some(&hotel()), 2, 3);
        assert_eq!(day[0].block, TimeBlock::HotelStart);
        assert_eq!(day.last().map(|s| s.block), Some(TimeBlock::HotelReturn));
    }

    #[test]
    fn last_day_checks_out_first() {
        let mut day = vec![stop("a", TimeBlock::Lunch)];
        schedule_day(&mut day, Some(&hotel()), 3, 3);
        assert_eq!(day[0].block, TimeBlock::HotelCheckout);
        assert_eq!(day[0].origin, StopOrigin::Anchor);
    }

    #[test]
    fn one_day_trip_uses_the_checkin_shape() {
        let mut day = vec![stop("a", TimeBlock::Lunch)];
        schedule_day(&mut day, Some(&hotel()), 1, 1);
        assert!(day.iter().any(|s| s.block == TimeBlock::HotelCheckin));
        assert!(day.iter().any(|s| s.block == TimeBlock::HotelReturn));
        assert!(day.iter().all(|s| s.block != TimeBlock::HotelCheckout));
    }

    #[test]
    fn no_hotel_still_sorts_canonically() {
        let mut day = vec![
            stop("dinner", TimeBlock::Dinner),
            stop("breakfast", TimeBlock::Breakfast),
            stop("morning", TimeBlock::MorningActivity),
        ];
        schedule_day(&mut day, None, 1, 2);
        // Breakfast is not in the canonical list; it holds the mid-day slot.
        assert_eq!(
            blocks(&day),
            vec![TimeBlock::MorningActivity, TimeBlock::Breakfast, TimeBlock::Dinner]
        );
    }

    #[test]
    fn equal_blocks_keep_relative_order() {
        let mut day = vec![
            stop("first", TimeBlock::AfternoonActivity),
            stop("second", TimeBlock::AfternoonActivity),
            stop("early", TimeBlock::MorningActivity),
        ];
        schedule_day(&mut day, None, 1, 2);
        assert_eq!(day[1].place.id, "first");
        assert_eq!(day[2].place.id, "second");
    }

    #[test]
    fn accommodation_detection() {
        let by_category = hotel();
        let mut by_name = hotel();
        by_name.category = "stay".to_string();
        by_name.name = "Riverside Hotel Annex".to_string();
        let plain = Place {
            id: "p".to_string(),
            name: "Old Palace".to_string(),
            category: "sightseeing".to_string(),
            coords: None,
            block: None,
            priority: 1,
            rating: 4.0,
            visit_minutes: 60,
        };

        assert!(find_accommodation(None, [&plain, &by_name]).is_some());
        assert!(find_accommodation(None, [&plain]).is_none());
        let explicit = find_accommodation(Some(&by_category), [&plain]);
        assert_eq!(explicit.map(|p| p.id), Some("h1".to_string()));
    }
}
