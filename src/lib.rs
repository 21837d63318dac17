//! itinerary-planner core
//!
//! Multi-day itinerary route optimization: distributes ranked place
//! candidates across trip days, merges immovable confirmed bookings,
//! anchors days around the accommodation, and refines each day's visiting
//! order for travel cost. Every run is a pure function of its request.

pub mod model;
pub mod error;
pub mod cost;
pub mod osrm;
pub mod cluster;
pub mod balance;
pub mod anchors;
pub mod merge;
pub mod beam;
pub mod order;
pub mod planner;
