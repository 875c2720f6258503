// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Maximum over a pool of cost partitionings.
//!
//! The runtime evaluator consumes the abstraction arena together with a
//! generated pool. Abstractions that neither certify dead ends nor carry a
//! stored lookup table in any pool member are dropped; the rest are reduced
//! to their mapping functions. Every estimate then maps the state once,
//! rejects certified dead ends, and returns the maximum over all members.

use crate::cost_partitioning::CostPartitioningHeuristic;
use crate::heuristic::Heuristic;
use crate::stats::EvaluatorStatistics;
use crate::unsolvability::UnsolvabilityHeuristic;
use fixedbitset::FixedBitSet;
use saturn_core::num::{Cost, INF};
use saturn_model::abstraction::{Abstractions, MappingFunction};
use tracing::{debug, info};

/// Admissible maximum over a pool of cost partitioning heuristics.
pub struct MaxCostPartitioningHeuristic<S> {
    // `None` for abstractions no member or certificate refers to.
    mapping_functions: Vec<Option<Box<dyn MappingFunction<S>>>>,
    pool: Vec<CostPartitioningHeuristic>,
    unsolvability: UnsolvabilityHeuristic,
    abstract_state_ids: Vec<usize>,
    num_best_order: Vec<u64>,
    num_evaluations: u64,
    num_dead_ends: u64,
    statistics: EvaluatorStatistics,
}

impl<S> MaxCostPartitioningHeuristic<S> {
    /// Builds the evaluator, consuming the arena.
    ///
    /// # Panics
    ///
    /// Panics if `pool` is empty.
    pub fn new(
        abstractions: Abstractions<S>,
        pool: Vec<CostPartitioningHeuristic>,
        unsolvability: UnsolvabilityHeuristic,
    ) -> Self {
        assert!(
            !pool.is_empty(),
            "called `MaxCostPartitioningHeuristic::new` with an empty pool"
        );

        let num_abstractions = abstractions.len();
        let mut useful = FixedBitSet::with_capacity(num_abstractions);
        unsolvability.mark_useful_abstractions(&mut useful);
        for cp in &pool {
            cp.mark_useful_abstractions(&mut useful);
        }

        let statistics = EvaluatorStatistics {
            num_orders: pool.len(),
            num_abstractions,
            num_useful_abstractions: useful.count_ones(..),
            num_stored_lookup_tables: pool.iter().map(CostPartitioningHeuristic::num_lookup_tables).sum(),
            num_possible_lookup_tables: pool.len().saturating_mul(num_abstractions),
            num_stored_values: pool.iter().map(CostPartitioningHeuristic::num_heuristic_values).sum(),
            num_possible_values: pool.len().saturating_mul(abstractions.total_num_states()),
        };
        info!(
            num_orders = statistics.num_orders,
            useful_abstractions = statistics.num_useful_abstractions,
            num_abstractions,
            stored_values_pct = statistics.stored_values_percentage(),
            "Built maximum over cost partitionings"
        );
        debug!("{statistics}");

        let mapping_functions = abstractions.into_mapping_functions(&useful);
        let num_best_order = vec![0; pool.len()];
        Self {
            mapping_functions,
            pool,
            unsolvability,
            abstract_state_ids: Vec::with_capacity(num_abstractions),
            num_best_order,
            num_evaluations: 0,
            num_dead_ends: 0,
            statistics,
        }
    }

    /// Evaluates the pool at precomputed abstract state ids.
    ///
    /// Ids of dropped abstractions are never read.
    pub fn compute_max_h(&mut self, abstract_state_ids: &[usize]) -> Cost {
        debug_assert_eq!(
            abstract_state_ids.len(),
            self.mapping_functions.len(),
            "called `MaxCostPartitioningHeuristic::compute_max_h` with ids of the wrong length"
        );

        if self.unsolvability.is_unsolvable(abstract_state_ids) {
            self.num_dead_ends = self.num_dead_ends.saturating_add(1);
            return INF;
        }

        let mut max_h: Cost = 0;
        let mut best = 0;
        for (i, cp) in self.pool.iter().enumerate() {
            let h = cp.compute_heuristic(abstract_state_ids);
            if h == INF {
                self.num_best_order[i] = self.num_best_order[i].saturating_add(1);
                return INF;
            }
            if h > max_h {
                max_h = h;
                best = i;
            }
        }
        self.num_best_order[best] = self.num_best_order[best].saturating_add(1);
        max_h
    }

    #[inline]
    pub fn pool(&self) -> &[CostPartitioningHeuristic] {
        &self.pool
    }

    #[inline]
    pub fn num_orders(&self) -> usize {
        self.pool.len()
    }

    /// How often each member produced the maximum.
    #[inline]
    pub fn num_best_order(&self) -> &[u64] {
        &self.num_best_order
    }

    /// Members that produced the maximum at least once.
    #[inline]
    pub fn num_probably_useful_orders(&self) -> usize {
        self.num_best_order.iter().filter(|&&count| count > 0).count()
    }

    /// Returns `true` if the mapping function of abstraction `index` was
    /// kept.
    #[inline]
    pub fn is_useful(&self, index: usize) -> bool {
        self.mapping_functions.get(index).is_some_and(Option::is_some)
    }

    #[inline]
    pub fn statistics(&self) -> &EvaluatorStatistics {
        &self.statistics
    }

    #[inline]
    pub fn num_evaluations(&self) -> u64 {
        self.num_evaluations
    }

    #[inline]
    pub fn num_dead_ends(&self) -> u64 {
        self.num_dead_ends
    }
}

impl<S> Heuristic<S> for MaxCostPartitioningHeuristic<S> {
    fn name(&self) -> &str {
        "MaxCostPartitioningHeuristic"
    }

    fn estimate(&mut self, state: &S) -> Cost {
        self.num_evaluations = self.num_evaluations.saturating_add(1);

        let mut ids = std::mem::take(&mut self.abstract_state_ids);
        ids.clear();
        ids.extend(
            self.mapping_functions
                .iter()
                .map(|function| function.as_ref().map_or(0, |f| f.abstract_state_id(state))),
        );
        let h = self.compute_max_h(&ids);
        self.abstract_state_ids = ids;
        h
    }

    fn report_statistics(&self) {
        info!(
            num_orders = self.pool.len(),
            probably_useful = self.num_probably_useful_orders(),
            evaluations = self.num_evaluations,
            dead_ends = self.num_dead_ends,
            "Probably useful orders"
        );
        debug!(num_best_order = ?self.num_best_order, "Maximizing orders");
    }
}

impl<S> std::fmt::Debug for MaxCostPartitioningHeuristic<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaxCostPartitioningHeuristic")
            .field("num_orders", &self.pool.len())
            .field("statistics", &self.statistics)
            .field("num_best_order", &self.num_best_order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saturn_model::abstraction::Abstraction;
    use saturn_model::explicit::{ExplicitAbstraction, Transition};
    use saturn_model::index::AbstractionIndex;

    // a0: two states, a1: three states with state 2 unable to reach the
    // goal, a2: a single goal state that never contributes.
    fn abstractions() -> Abstractions<usize> {
        let a0: Box<dyn Abstraction<usize>> = Box::new(ExplicitAbstraction::new(
            2,
            vec![Transition::new(0, 0, 1)],
            vec![],
            vec![1],
            |s: &usize| s % 2,
        ));
        let a1: Box<dyn Abstraction<usize>> = Box::new(ExplicitAbstraction::new(
            3,
            vec![Transition::new(1, 0, 0)],
            vec![],
            vec![0],
            |s: &usize| s % 3,
        ));
        let a2: Box<dyn Abstraction<usize>> =
            Box::new(ExplicitAbstraction::new(1, vec![], vec![], vec![0], |_: &usize| 0));
        vec![a0, a1, a2].into_iter().collect()
    }

    fn table(abstraction: usize, values: Vec<Cost>) -> CostPartitioningHeuristic {
        let mut cp = CostPartitioningHeuristic::new();
        cp.add_h_values(AbstractionIndex::new(abstraction), values);
        cp
    }

    fn pool() -> Vec<CostPartitioningHeuristic> {
        vec![table(0, vec![4, 0]), table(1, vec![1, 6, 0])]
    }

    #[test]
    fn test_max_over_members() {
        let mut h = MaxCostPartitioningHeuristic::new(abstractions(), pool(), UnsolvabilityHeuristic::default());
        assert_eq!(h.estimate(&0), 4);
        assert_eq!(h.estimate(&1), 6);
        assert_eq!(h.estimate(&3), 1);
        assert_eq!(h.estimate(&2), 4);
        assert_eq!(h.num_best_order(), &[2, 2]);
        assert_eq!(h.num_probably_useful_orders(), 2);
        assert_eq!(h.num_evaluations(), 4);
    }

    #[test]
    fn test_ties_go_to_first_member() {
        let pool = vec![table(0, vec![3, 0]), table(1, vec![3, 0, 0])];
        let mut h = MaxCostPartitioningHeuristic::new(abstractions(), pool, UnsolvabilityHeuristic::default());
        assert_eq!(h.estimate(&0), 3);
        // State 5 maps to zero everywhere.
        assert_eq!(h.estimate(&5), 0);
        assert_eq!(h.num_best_order(), &[2, 0]);
    }

    #[test]
    fn test_useless_abstractions_are_dropped() {
        let h = MaxCostPartitioningHeuristic::new(abstractions(), pool(), UnsolvabilityHeuristic::default());
        assert!(h.is_useful(0));
        assert!(h.is_useful(1));
        assert!(!h.is_useful(2));

        let stats = h.statistics();
        assert_eq!(stats.num_orders, 2);
        assert_eq!(stats.num_abstractions, 3);
        assert_eq!(stats.num_useful_abstractions, 2);
        assert_eq!(stats.num_stored_lookup_tables, 2);
        assert_eq!(stats.num_possible_lookup_tables, 6);
        assert_eq!(stats.num_stored_values, 5);
        assert_eq!(stats.num_possible_values, 12);
    }

    #[test]
    fn test_certified_dead_end_short_circuits() {
        let abstractions = abstractions();
        let unsolvability = UnsolvabilityHeuristic::new(&abstractions, &[1]);
        let pool = vec![table(0, vec![4, 0])];
        let mut h = MaxCostPartitioningHeuristic::new(abstractions, pool, unsolvability);
        // The certificate keeps a1 alive although no member uses it.
        assert!(h.is_useful(1));
        assert_eq!(h.estimate(&2), INF);
        assert_eq!(h.num_dead_ends(), 1);
        assert_eq!(h.num_best_order(), &[0]);
        assert_eq!(h.estimate(&0), 4);
    }

    #[test]
    fn test_infinite_member_is_counted() {
        let pool = vec![table(0, vec![4, 0]), table(0, vec![INF, 0])];
        let mut h = MaxCostPartitioningHeuristic::new(abstractions(), pool, UnsolvabilityHeuristic::default());
        assert_eq!(h.estimate(&0), INF);
        assert_eq!(h.num_best_order(), &[0, 1]);
        assert_eq!(h.num_dead_ends(), 0);
    }

    #[test]
    #[should_panic(expected = "empty pool")]
    fn test_empty_pool_panics() {
        let _ = MaxCostPartitioningHeuristic::new(abstractions(), Vec::new(), UnsolvabilityHeuristic::default());
    }
}
