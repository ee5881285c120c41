//! Emission data store
//!
//! This module defines the `EmissionRepository` trait, the narrow read-only
//! interface the analytics engine queries, and its implementations.
//!
//! ## Flex Point
//! Adding a new store (e.g. a SQL database) requires:
//! 1. Create `src/store/{name}.rs` implementing `EmissionRepository`
//! 2. Add `pub mod {name};` below
//! 3. Construct it in `cli::open_store`

pub mod memory;
pub mod synthetic;

pub use memory::InMemoryStore;

use crate::error::Result;
use crate::model::{EmissionSample, GeoKey, GeoLevel, MonthlyAggregate, Period, YearMonth};

/// Read-only access to emission records
///
/// Implementations must be thread-safe (Send + Sync) to be shared by the
/// async server. All names passed in are expected upper-case; use the
/// `GeoKey` constructors to normalize them.
pub trait EmissionRepository: Send + Sync {
    /// Monthly aggregates of every geography at `group_by` level inside
    /// `scope`, restricted to `period`
    ///
    /// Rows are ordered by geography, then by (year, month). Geographies
    /// without samples in the period produce no rows.
    fn fetch_monthly_aggregates(
        &self,
        scope: &GeoKey,
        group_by: GeoLevel,
        period: &Period,
    ) -> Result<Vec<MonthlyAggregate>>;

    /// Raw samples inside `scope` for `period`
    fn fetch_samples(&self, scope: &GeoKey, period: &Period) -> Result<Vec<EmissionSample>>;

    /// Names of all known states, sorted
    fn states(&self) -> Result<Vec<String>>;

    /// Names of all known districts of a state, sorted
    fn districts(&self, state: &str) -> Result<Vec<String>>;

    /// Months that have at least one sample, most recent first
    fn available_periods(&self) -> Result<Vec<YearMonth>>;
}
