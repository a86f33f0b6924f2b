//! Frontier aggregation of a finished search.
//!
//! The frontier is every visited vertex that no other visited vertex was
//! reached from: the tips of the explored branches, including branches cut
//! short by the budget. Summing costs only at the tips avoids counting the
//! shared prefix of overlapping paths more than once, which makes the totals
//! comparable between start points.
//!
//! Sums are taken over the frontier in ascending vertex order, so the
//! floating-point result does not depend on hash-map iteration order.

use crate::algs::cost_search::SearchResult;
use crate::topology::vertex::VertexId;

/// Totals accumulated over a search frontier.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrontierTotals {
    /// Sum of cumulative costs over the frontier.
    pub total_cost: f64,
    /// Sum of cumulative distances over the frontier.
    pub total_distance: f64,
    /// Number of frontier vertices.
    pub frontier_len: usize,
}

/// Visited vertices that are never a predecessor, ascending.
///
/// Never empty: if the start has no admissible neighbour it is its own
/// frontier.
pub fn frontier_set(result: &SearchResult) -> Vec<VertexId> {
    let interior = result.interior();
    let mut out: Vec<VertexId> = result
        .predecessor
        .keys()
        .copied()
        .filter(|v| !interior.contains(v))
        .collect();
    out.sort_unstable();
    out
}

/// Sum cumulative cost and distance over the frontier of `result`.
pub fn aggregate(result: &SearchResult) -> FrontierTotals {
    let frontier = frontier_set(result);
    let mut totals = FrontierTotals {
        frontier_len: frontier.len(),
        ..FrontierTotals::default()
    };
    for v in &frontier {
        totals.total_cost += result.cumulative_cost.get(v).copied().unwrap_or_default();
        totals.total_distance += result
            .cumulative_distance
            .get(v)
            .copied()
            .unwrap_or_default();
    }
    totals
}
