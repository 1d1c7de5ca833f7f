//! Cache Module
//!
//! In-memory TTL storage for station data.

mod clock;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// TTL in seconds used when none is configured
pub const DEFAULT_TTL_SECS: u64 = 60;
