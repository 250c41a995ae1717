//! Grade report caching using Moka.
//!
//! Scraping the grade list is the slowest step of every grade request, so the
//! built report is kept per student and term filter for a few minutes.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use tracing::warn;

use super::gpa::GradeReport;
use crate::identity::HashedStudentId;

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Key: hashed student id and term filter (empty for all terms).
type CacheKey = (HashedStudentId, String);

/// Cache for grade reports.
#[derive(Clone)]
pub struct GradeReportCache {
    cache: Cache<CacheKey, Arc<GradeReport>>,
}

impl GradeReportCache {
    /// Creates a cache with default settings: 1000 entries, 5 minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache with custom capacity and TTL.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .support_invalidation_closures()
            .build();

        Self { cache }
    }

    /// Returns the cached report, if still fresh.
    #[must_use]
    pub fn get(&self, student: &HashedStudentId, semester: &str) -> Option<Arc<GradeReport>> {
        self.cache.get(&(student.clone(), semester.to_string()))
    }

    /// Stores a report and returns the shared handle.
    pub fn insert(
        &self,
        student: &HashedStudentId,
        semester: &str,
        report: GradeReport,
    ) -> Arc<GradeReport> {
        let report = Arc::new(report);
        self.cache
            .insert((student.clone(), semester.to_string()), Arc::clone(&report));
        report
    }

    /// Drops every cached report of one student.
    pub fn invalidate_student(&self, student: &HashedStudentId) {
        let target = student.clone();
        if let Err(e) = self
            .cache
            .invalidate_entries_if(move |(owner, _), _| *owner == target)
        {
            warn!(error = %e, "Predicate invalidation unavailable, clearing all grade reports");
            self.cache.invalidate_all();
        }
    }

    /// Invalidates all cached entries.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Returns the number of entries currently in the cache.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs pending maintenance so counts and evictions are up to date.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for GradeReportCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GradeReportCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradeReportCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}
