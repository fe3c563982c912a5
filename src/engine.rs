//! # Progress Engine
//!
//! Stateful activity store that keeps the collection on the Rust side so the
//! rendering layer only sends new records and asks for derived views.
//!
//! ## Architecture
//!
//! The engine is a singleton that manages:
//! - The append-only activity collection and its input version
//! - Memoised pipeline results keyed by (filter params, version, reference time)
//! - The active [`ProgressConfig`]
//!
//! Every append bumps the version and invalidates the memo, so a result is
//! never served for a collection it was not computed from.

use std::sync::Mutex;

use chrono::{Local, NaiveDateTime, Timelike};
use log::{debug, info};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::buckets::{
    current_year_distance_km, goal_progress, recent_paces, weekly_distance_buckets, GoalProgress,
};
use crate::error::Result;
use crate::filter::{available_years, FilterParams};
use crate::lru_cache::LruCache;
use crate::metrics::parse_activities_json;
use crate::pipeline::{compute_progress, ProgressData};
use crate::stats::YearStats;
use crate::{BucketPoint, ProgressConfig, RawActivity};

#[cfg(not(feature = "parallel"))]
use crate::stats::year_stats_all;

#[cfg(feature = "parallel")]
use crate::stats::year_stats_all_parallel;

/// Memo key: a result is valid for one filter, one collection state and one
/// reference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    params: FilterParams,
    version: u64,
    now: NaiveDateTime,
}

// ============================================================================
// Progress Engine
// ============================================================================

/// The stateful progress engine.
pub struct ProgressEngine {
    activities: Vec<RawActivity>,
    /// Bumped on every change to the collection
    version: u64,
    cache: LruCache<CacheKey, ProgressData>,
    config: ProgressConfig,
    /// Pinned "now"; the local clock is used when unset
    reference_time: Option<NaiveDateTime>,
}

impl ProgressEngine {
    /// Create an empty engine with default configuration.
    pub fn new() -> Self {
        let config = ProgressConfig::default();
        Self {
            activities: Vec::new(),
            version: 0,
            cache: LruCache::new(config.cache_capacity),
            config,
            reference_time: None,
        }
    }

    /// Create an empty engine with a validated custom configuration.
    pub fn with_config(config: ProgressConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cache: LruCache::new(config.cache_capacity),
            config,
            ..Self::new()
        })
    }

    // ========================================================================
    // Activity Management
    // ========================================================================

    /// Append records to the collection.
    pub fn append_activities(&mut self, activities: Vec<RawActivity>) {
        if activities.is_empty() {
            return;
        }
        let added = activities.len();
        self.activities.extend(activities);
        self.bump_version();
        info!(
            "[ProgressEngine] Appended {} activities ({} total, version {})",
            added,
            self.activities.len(),
            self.version
        );
    }

    /// Parse a JSON array of records and append them.
    ///
    /// Returns the number of records appended. A malformed document leaves
    /// the collection untouched.
    pub fn load_json(&mut self, json: &str) -> Result<usize> {
        let activities = parse_activities_json(json)?;
        let count = activities.len();
        self.append_activities(activities);
        Ok(count)
    }

    /// Drop all activities and memoised results.
    pub fn clear(&mut self) {
        self.activities.clear();
        self.cache.clear();
        self.version += 1;
        info!("[ProgressEngine] Cleared (version {})", self.version);
    }

    fn bump_version(&mut self) {
        self.version += 1;
        let version = self.version;
        self.cache.retain(|key| key.version == version);
        debug!(
            "[ProgressEngine] Invalidated memo, {} results kept",
            self.cache.len()
        );
    }

    pub fn activities(&self) -> &[RawActivity] {
        &self.activities
    }

    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Replace the configuration. Memoised results are dropped since they
    /// depend on it.
    pub fn set_config(&mut self, config: ProgressConfig) -> Result<()> {
        config.validate()?;
        self.cache.clear();
        self.cache.set_capacity(config.cache_capacity);
        self.config = config;
        info!("[ProgressEngine] Configuration updated");
        Ok(())
    }

    pub fn config(&self) -> &ProgressConfig {
        &self.config
    }

    /// Pin "now" for every derived view, or unpin with `None`.
    pub fn set_reference_time(&mut self, now: Option<NaiveDateTime>) {
        self.reference_time = now;
    }

    /// The reference time for derived views: the pinned time, or the local
    /// clock.
    pub fn now(&self) -> NaiveDateTime {
        self.reference_time
            .unwrap_or_else(|| Local::now().naive_local())
    }

    /// Reference time for the progress memo key.
    ///
    /// Unpinned, the clock is truncated to the minute so that repeated calls
    /// within a minute share memoised results. Only the time windows see
    /// this time, and they reach back months.
    fn memo_time(&self) -> NaiveDateTime {
        let now = self.now();
        if self.reference_time.is_some() {
            return now;
        }
        now.with_nanosecond(0)
            .and_then(|t| t.with_second(0))
            .unwrap_or(now)
    }

    // ========================================================================
    // Derived Views
    // ========================================================================

    /// Pipeline result for a filter, memoised.
    pub fn progress(&mut self, params: &FilterParams) -> ProgressData {
        let key = CacheKey {
            params: *params,
            version: self.version,
            now: self.memo_time(),
        };

        if let Some(data) = self.cache.get_cloned(&key) {
            debug!("[ProgressEngine] Memo hit for {:?}", params);
            return data;
        }

        let data = compute_progress(&self.activities, params, key.now, &self.config);
        self.cache.insert(key, data.clone());
        data
    }

    /// Weekly distance buckets over the whole collection.
    pub fn weekly_buckets(&self) -> Vec<BucketPoint> {
        weekly_distance_buckets(&self.activities, self.config.weekly_bucket_count, self.now())
    }

    /// Raw speed of the most recent activities.
    pub fn recent_paces(&self) -> Vec<BucketPoint> {
        recent_paces(&self.activities, self.config.recent_pace_count)
    }

    /// Per-year roll-ups, newest first, followed by the total.
    pub fn year_stats(&self) -> Vec<YearStats> {
        #[cfg(feature = "parallel")]
        {
            year_stats_all_parallel(&self.activities)
        }
        #[cfg(not(feature = "parallel"))]
        {
            year_stats_all(&self.activities)
        }
    }

    pub fn available_years(&self) -> Vec<i32> {
        available_years(&self.activities)
    }

    /// Progress towards the configured yearly goal in the current year.
    pub fn goal_progress(&self) -> GoalProgress {
        goal_progress(
            current_year_distance_km(&self.activities, self.now()),
            self.config.yearly_goal_km,
        )
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    pub fn stats(&self) -> EngineStats {
        let counters = self.cache.counters();
        EngineStats {
            activity_count: self.activities.len() as u32,
            version: self.version,
            cached_result_count: self.cache.len() as u32,
            cache_hits: counters.hits,
            cache_misses: counters.misses,
        }
    }
}

impl Default for ProgressEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine statistics for monitoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct EngineStats {
    pub activity_count: u32,
    pub version: u64,
    pub cached_result_count: u32,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

// ============================================================================
// Global Singleton
// ============================================================================

/// Global engine instance.
///
/// Lets FFI calls share one collection without passing it back and forth
/// across the FFI boundary.
pub static ENGINE: Lazy<Mutex<ProgressEngine>> = Lazy::new(|| Mutex::new(ProgressEngine::new()));

/// Run a closure with the global engine locked.
///
/// A poisoned lock is recovered rather than propagated.
pub fn with_engine<F, R>(f: F) -> R
where
    F: FnOnce(&mut ProgressEngine) -> R,
{
    let mut engine = ENGINE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut engine)
}

// ============================================================================
// FFI Exports
// ============================================================================

#[cfg(feature = "ffi")]
pub mod engine_ffi {
    use super::*;
    use crate::filter::{ActivityType, TimeRange};
    use log::{info, warn};

    /// Initialize the engine (call once at app startup).
    #[uniffi::export]
    pub fn engine_init() {
        crate::init_logging();
        info!("[ProgressEngine] Initialized");
    }

    /// Clear all engine state.
    #[uniffi::export]
    pub fn engine_clear() {
        with_engine(|e| e.clear());
    }

    /// Append activities from a JSON array.
    /// Returns the total activity count afterwards.
    #[uniffi::export]
    pub fn engine_load_json(json: String) -> u32 {
        with_engine(|e| {
            if let Err(err) = e.load_json(&json) {
                warn!("[ProgressEngine] Rejected activity document: {}", err);
            }
            e.activity_count() as u32
        })
    }

    /// Pin the reference time ("YYYY-MM-DD HH:MM:SS"); empty unpins it.
    #[uniffi::export]
    pub fn engine_set_reference_time(now: String) {
        let pinned = crate::units::parse_start_date(&now);
        if pinned.is_none() && !now.is_empty() {
            warn!("[ProgressEngine] Unreadable reference time '{}'", now);
        }
        with_engine(|e| e.set_reference_time(pinned));
    }

    /// Memoised pipeline result as JSON.
    /// Returns "{}" for an unknown selector.
    #[uniffi::export]
    pub fn engine_get_progress_json(
        activity_type: String,
        time_range: String,
        year: Option<i32>,
    ) -> String {
        let params = match (
            activity_type.parse::<ActivityType>(),
            time_range.parse::<TimeRange>(),
        ) {
            (Ok(activity_type), Ok(time_range)) => FilterParams {
                activity_type,
                time_range,
                year,
            },
            (Err(err), _) | (_, Err(err)) => {
                warn!("[ProgressEngine] {}", err);
                return "{}".to_string();
            }
        };
        let data = with_engine(|e| e.progress(&params));
        serde_json::to_string(&data).unwrap_or_else(|_| "{}".to_string())
    }

    /// Weekly distance buckets as JSON.
    #[uniffi::export]
    pub fn engine_get_weekly_buckets_json() -> String {
        let buckets = with_engine(|e| e.weekly_buckets());
        serde_json::to_string(&buckets).unwrap_or_else(|_| "[]".to_string())
    }

    /// Recent paces as JSON.
    #[uniffi::export]
    pub fn engine_get_recent_paces_json() -> String {
        let paces = with_engine(|e| e.recent_paces());
        serde_json::to_string(&paces).unwrap_or_else(|_| "[]".to_string())
    }

    /// Per-year roll-ups as JSON.
    #[uniffi::export]
    pub fn engine_get_year_stats_json() -> String {
        let stats = with_engine(|e| e.year_stats());
        serde_json::to_string(&stats).unwrap_or_else(|_| "[]".to_string())
    }

    /// Yearly goal progress as JSON.
    #[uniffi::export]
    pub fn engine_get_goal_progress_json() -> String {
        let goal = with_engine(|e| e.goal_progress());
        serde_json::to_string(&goal).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get engine statistics.
    #[uniffi::export]
    pub fn engine_get_stats() -> EngineStats {
        with_engine(|e| e.stats())
    }
}
