//! Session statistics for HandBand.
//!
//! Tracks how often the sensor was polled and how it fared, so a session
//! can be summarized at exit and inspected later with `handband status`.

pub mod session;

// Re-export commonly used types
pub use session::{
    create_shared_stats, create_shared_stats_with_persistence, CumulativeTotals, SessionStats,
    SharedSessionStats, StatsSnapshot,
};
