//! Polling statistics for a harness session.
//!
//! Counters always describe the running session. When persistence is
//! enabled, the totals of earlier sessions are kept apart and only combined
//! with this session's counts in [`SessionStats::totals`] and on save.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Counters for the current session.
#[derive(Debug)]
pub struct SessionStats {
    /// Unique id of this session
    session_id: Uuid,
    /// Number of times the sensor was polled
    polls: AtomicU64,
    /// Number of successful transforms
    transforms: AtomicU64,
    /// Number of polls that ended in a sensor error
    sensor_failures: AtomicU64,
    /// Number of inputs outside [-1, 1] (passed through, clamped or rejected)
    out_of_range_inputs: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
    /// Totals of all earlier persisted sessions
    previous: CumulativeTotals,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl SessionStats {
    /// Create a new, empty set of counters.
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            polls: AtomicU64::new(0),
            transforms: AtomicU64::new(0),
            sensor_failures: AtomicU64::new(0),
            out_of_range_inputs: AtomicU64::new(0),
            session_start: Utc::now(),
            previous: CumulativeTotals::default(),
            persist_path: None,
        }
    }

    /// Create session counters that also remember the totals stored at
    /// `path`, so they can be carried forward on save.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);

        if let Err(e) = stats.load() {
            tracing::warn!("Could not load previous session stats: {e}");
        }

        stats
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Record a sensor poll.
    pub fn record_poll(&self) {
        self.polls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed transform.
    pub fn record_transform(&self) {
        self.transforms.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a sensor failure.
    pub fn record_sensor_failure(&self) {
        self.sensor_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an input outside the normalized range.
    pub fn record_out_of_range(&self) {
        self.out_of_range_inputs.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the statistics of this session only.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            session_id: self.session_id,
            polls: self.polls.load(Ordering::Relaxed),
            transforms: self.transforms.load(Ordering::Relaxed),
            sensor_failures: self.sensor_failures.load(Ordering::Relaxed),
            out_of_range_inputs: self.out_of_range_inputs.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Earlier persisted totals plus this session.
    pub fn totals(&self) -> CumulativeTotals {
        let session = self.snapshot();
        CumulativeTotals {
            sessions: self.previous.sessions + 1,
            polls: self.previous.polls + session.polls,
            transforms: self.previous.transforms + session.transforms,
            sensor_failures: self.previous.sensor_failures + session.sensor_failures,
            out_of_range_inputs: self.previous.out_of_range_inputs + session.out_of_range_inputs,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        let totals = self.totals();
        format!(
            "Session Statistics ({}):\n\
             - Sensor polls: {}\n\
             - Transforms: {}\n\
             - Sensor failures: {}\n\
             - Out-of-range inputs: {}\n\
             - Session duration: {} seconds\n\
             \n\
             Cumulative over {} session(s):\n\
             - Sensor polls: {}\n\
             - Transforms: {}\n\
             - Sensor failures: {}\n\
             - Out-of-range inputs: {}",
            stats.session_id,
            stats.polls,
            stats.transforms,
            stats.sensor_failures,
            stats.out_of_range_inputs,
            stats.session_duration_secs,
            totals.sessions,
            totals.polls,
            totals.transforms,
            totals.sensor_failures,
            totals.out_of_range_inputs
        )
    }

    /// Save cumulative totals to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let persisted = PersistedStats {
                totals: self.totals(),
                last_session_id: self.session_id,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load earlier totals from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;
                self.previous = persisted.totals;
            }
        }
        Ok(())
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the session counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub session_id: Uuid,
    pub polls: u64,
    pub transforms: u64,
    pub sensor_failures: u64,
    pub out_of_range_inputs: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Counters summed over every persisted session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CumulativeTotals {
    pub sessions: u64,
    pub polls: u64,
    pub transforms: u64,
    pub sensor_failures: u64,
    pub out_of_range_inputs: u64,
}

/// On-disk format.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    #[serde(flatten)]
    totals: CumulativeTotals,
    last_session_id: Uuid,
    last_updated: DateTime<Utc>,
}

/// Session stats shared between the harness and the binary.
pub type SharedSessionStats = Arc<SessionStats>;

/// Create new shared session stats.
pub fn create_shared_stats() -> SharedSessionStats {
    Arc::new(SessionStats::new())
}

/// Create new shared session stats with persistence.
pub fn create_shared_stats_with_persistence(path: PathBuf) -> SharedSessionStats {
    Arc::new(SessionStats::with_persistence(path))
}
