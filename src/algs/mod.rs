//! Re-export public algorithms.

pub mod cost_search;
pub mod frontier;
pub mod query;
pub mod travel_cost;

pub use cost_search::{CostSearch, DEFAULT_MAX_FUEL, SearchConfig, SearchResult};
pub use frontier::{FrontierTotals, aggregate, frontier_set};
pub use query::{Metric, query, total_cost_for_point, total_distance_for_point};
