//! Station Module
//!
//! Cache policy for station data: keys, TTL, invalidation and miss
//! coalescing in front of the station API.

pub mod keys;
mod service;
mod single_flight;

pub use service::{SharedCache, StationData, StationService};
pub use single_flight::InFlight;
