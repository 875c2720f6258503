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

//! Saturated cost partitioning computed during search.
//!
//! Instead of generating a pool up front, the online heuristic starts with an
//! empty pool and grows it while the search evaluates states. For every state
//! that is not a certified dead end it evaluates the maximum over the stored
//! partitions. If its `RecomputePolicy` fires, it additionally partitions the
//! costs along an order tailored to the state, and keeps the new partition if
//! it strictly improves the state's estimate.

use crate::config::OnlineConfig;
use crate::cost_partitioning::CostPartitioningHeuristic;
use crate::heuristic::Heuristic;
use crate::order_policy::OrderPolicy;
use crate::saturation::CostPartitioningFunction;
use crate::unsolvability::UnsolvabilityHeuristic;
use fixedbitset::FixedBitSet;
use saturn_core::num::{Cost, INF};
use saturn_model::abstraction::Abstractions;
use saturn_model::task::FactState;
use tracing::info;

/// Decides for which states a new cost partitioning is computed.
pub trait RecomputePolicy<S> {
    /// Returns the name of the policy.
    fn name(&self) -> &str;

    /// Called once per evaluated, non-dead-end state.
    fn should_recompute(&mut self, state: &S) -> bool;
}

impl<S> std::fmt::Debug for dyn RecomputePolicy<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RecomputePolicy {{ name: {} }}", self.name())
    }
}

/// Fires for the first state and then for every `interval`-th state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EveryNthState {
    interval: usize,
    num_seen: usize,
}

impl EveryNthState {
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn new(interval: usize) -> Self {
        assert!(interval >= 1, "called `EveryNthState::new` with interval 0");
        Self { interval, num_seen: 0 }
    }

    #[inline]
    pub fn interval(&self) -> usize {
        self.interval
    }
}

impl<S> RecomputePolicy<S> for EveryNthState {
    fn name(&self) -> &str {
        "EveryNthState"
    }

    fn should_recompute(&mut self, _state: &S) -> bool {
        let fire = self.num_seen % self.interval == 0;
        self.num_seen = self.num_seen.wrapping_add(1);
        fire
    }
}

/// Fires for states that contain a fact no earlier state contained, but at
/// most once per `interval` states.
///
/// A fact counts as seen once any state containing it was evaluated, also if
/// the policy did not fire for that state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovelFactPolicy {
    interval: usize,
    // `fact_offsets[var] + val` is the bit of fact `(var, val)`.
    fact_offsets: Vec<usize>,
    seen_facts: FixedBitSet,
    states_since_last_fire: usize,
}

impl NovelFactPolicy {
    /// Creates the policy for variables with the given domain sizes.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn new(domain_sizes: &[usize], interval: usize) -> Self {
        assert!(interval >= 1, "called `NovelFactPolicy::new` with interval 0");
        let mut fact_offsets = Vec::with_capacity(domain_sizes.len());
        let mut num_facts = 0;
        for &size in domain_sizes {
            fact_offsets.push(num_facts);
            num_facts += size;
        }
        Self {
            interval,
            fact_offsets,
            seen_facts: FixedBitSet::with_capacity(num_facts),
            states_since_last_fire: interval,
        }
    }

    #[inline]
    pub fn interval(&self) -> usize {
        self.interval
    }

    /// Returns the number of distinct facts seen so far.
    #[inline]
    pub fn num_seen_facts(&self) -> usize {
        self.seen_facts.count_ones(..)
    }

    /// Marks the facts of `state` as seen; returns `true` if one was new.
    fn visit<S: FactState + ?Sized>(&mut self, state: &S) -> bool {
        debug_assert_eq!(state.num_variables(), self.fact_offsets.len());
        let mut novel = false;
        for (var, &offset) in self.fact_offsets.iter().enumerate() {
            let bit = offset + state.value(var);
            novel |= !self.seen_facts.put(bit);
        }
        novel
    }
}

impl<S: FactState> RecomputePolicy<S> for NovelFactPolicy {
    fn name(&self) -> &str {
        "NovelFactPolicy"
    }

    fn should_recompute(&mut self, state: &S) -> bool {
        self.states_since_last_fire = self.states_since_last_fire.saturating_add(1);
        let novel = self.visit(state);
        if novel && self.states_since_last_fire >= self.interval {
            self.states_since_last_fire = 0;
            return true;
        }
        false
    }
}

/// Grows a pool of saturated cost partitionings during search.
pub struct OnlineSaturatedHeuristic<S, P, F, R> {
    abstractions: Abstractions<S>,
    costs: Vec<Cost>,
    order_policy: P,
    cp_function: F,
    recompute_policy: R,
    config: OnlineConfig,
    unsolvability: UnsolvabilityHeuristic,
    pool: Vec<CostPartitioningHeuristic>,
    pool_size_bytes: usize,
    abstract_state_ids: Vec<usize>,
    remaining_costs: Vec<Cost>,
    num_evaluated_states: u64,
    num_dead_ends: u64,
    num_computed: u64,
}

impl<S, P, F, R> OnlineSaturatedHeuristic<S, P, F, R>
where
    P: OrderPolicy<S>,
    F: CostPartitioningFunction<S>,
    R: RecomputePolicy<S>,
{
    /// Creates the heuristic and initializes `order_policy` for
    /// `abstractions` under `costs`.
    pub fn new(
        abstractions: Abstractions<S>,
        costs: Vec<Cost>,
        mut order_policy: P,
        cp_function: F,
        recompute_policy: R,
        config: OnlineConfig,
    ) -> Self {
        order_policy.initialize(&abstractions, &costs);
        let unsolvability = UnsolvabilityHeuristic::new(&abstractions, &costs);
        let num_abstractions = abstractions.len();
        let num_operators = costs.len();
        Self {
            abstractions,
            costs,
            order_policy,
            cp_function,
            recompute_policy,
            config,
            unsolvability,
            pool: Vec::new(),
            pool_size_bytes: 0,
            abstract_state_ids: Vec::with_capacity(num_abstractions),
            remaining_costs: Vec::with_capacity(num_operators),
            num_evaluated_states: 0,
            num_dead_ends: 0,
            num_computed: 0,
        }
    }

    /// The partitions stored so far.
    #[inline]
    pub fn pool(&self) -> &[CostPartitioningHeuristic] {
        &self.pool
    }

    /// Partitions computed so far, stored or not.
    #[inline]
    pub fn num_computed(&self) -> u64 {
        self.num_computed
    }

    #[inline]
    pub fn num_evaluated_states(&self) -> u64 {
        self.num_evaluated_states
    }

    #[inline]
    pub fn num_dead_ends(&self) -> u64 {
        self.num_dead_ends
    }

    fn can_store(&self) -> bool {
        self.config.store_cost_partitionings
            && self.pool_size_bytes < self.config.max_size_kb.saturating_mul(1024)
    }

    fn compute_max_h(&self, abstract_state_ids: &[usize]) -> Cost {
        let mut max_h: Cost = 0;
        for cp in &self.pool {
            let h = cp.compute_heuristic(abstract_state_ids);
            if h == INF {
                return INF;
            }
            max_h = max_h.max(h);
        }
        max_h
    }
}

impl<S, P, F, R> Heuristic<S> for OnlineSaturatedHeuristic<S, P, F, R>
where
    P: OrderPolicy<S>,
    F: CostPartitioningFunction<S>,
    R: RecomputePolicy<S>,
{
    fn name(&self) -> &str {
        "OnlineSaturatedHeuristic"
    }

    fn estimate(&mut self, state: &S) -> Cost {
        self.num_evaluated_states = self.num_evaluated_states.saturating_add(1);

        let mut ids = std::mem::take(&mut self.abstract_state_ids);
        self.abstractions.abstract_state_ids_into(state, &mut ids);

        let h = if self.unsolvability.is_unsolvable(&ids) {
            self.num_dead_ends = self.num_dead_ends.saturating_add(1);
            INF
        } else {
            let mut max_h = self.compute_max_h(&ids);
            if max_h != INF && self.recompute_policy.should_recompute(state) {
                let is_initial = self.num_evaluated_states == 1;
                let order = self.order_policy.compute_order_for_state(&ids, is_initial);
                self.remaining_costs.clear();
                self.remaining_costs.extend_from_slice(&self.costs);
                let cp = self
                    .cp_function
                    .compute(&self.abstractions, &order, &mut self.remaining_costs, &ids);
                self.num_computed = self.num_computed.saturating_add(1);

                let h = cp.compute_heuristic(&ids);
                if h > max_h {
                    max_h = h;
                    if self.can_store() {
                        self.pool_size_bytes = self.pool_size_bytes.saturating_add(cp.estimate_size_in_bytes());
                        self.pool.push(cp);
                    }
                }
            }
            max_h
        };

        self.abstract_state_ids = ids;
        h
    }

    fn report_statistics(&self) {
        info!(
            policy = self.recompute_policy.name(),
            evaluated_states = self.num_evaluated_states,
            dead_ends = self.num_dead_ends,
            computed = self.num_computed,
            stored = self.pool.len(),
            stored_kb = self.pool_size_bytes / 1024,
            "Online cost partitioning statistics"
        );
    }
}

impl<S, P, F, R> std::fmt::Debug for OnlineSaturatedHeuristic<S, P, F, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnlineSaturatedHeuristic")
            .field("config", &self.config)
            .field("num_stored", &self.pool.len())
            .field("num_computed", &self.num_computed)
            .field("num_evaluated_states", &self.num_evaluated_states)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order_policy::{GreedyOrderPolicy, ScoringFunction};
    use crate::saturation::compute_saturated_cost_partitioning;
    use saturn_model::abstraction::Abstraction;
    use saturn_model::projection::project;
    use saturn_model::task::{Operator, SasTask};

    type State = Vec<usize>;

    fn two_switches() -> SasTask {
        SasTask::new(
            vec![2, 2],
            vec![
                Operator::new("set-x", vec![(0, 0)], vec![(0, 1)], 3),
                Operator::new("set-y", vec![(1, 0)], vec![(1, 1)], 5),
                Operator::new("set-both", vec![(0, 0), (1, 0)], vec![(0, 1), (1, 1)], 10),
            ],
            vec![0, 0],
            vec![(0, 1), (1, 1)],
        )
    }

    fn projections(task: &SasTask, patterns: &[&[usize]]) -> Abstractions<State> {
        patterns
            .iter()
            .map(|pattern| -> Box<dyn Abstraction<State>> { Box::new(project(task, pattern)) })
            .collect()
    }

    fn heuristic<R: RecomputePolicy<State>>(
        task: &SasTask,
        patterns: &[&[usize]],
        recompute_policy: R,
        config: OnlineConfig,
    ) -> impl Heuristic<State> {
        OnlineSaturatedHeuristic::new(
            projections(task, patterns),
            task.operator_costs(),
            GreedyOrderPolicy::new(ScoringFunction::default()),
            compute_saturated_cost_partitioning::<State>,
            recompute_policy,
            config,
        )
    }

    #[test]
    fn test_every_nth_state() {
        let mut policy = EveryNthState::new(3);
        let fired: Vec<bool> = (0..7).map(|_| RecomputePolicy::<State>::should_recompute(&mut policy, &vec![0])).collect();
        assert_eq!(fired, vec![true, false, false, true, false, false, true]);
    }

    #[test]
    fn test_novel_fact_policy_debounces() {
        let mut policy = NovelFactPolicy::new(&[2, 2], 2);
        assert!(policy.should_recompute(&vec![0, 0]));
        assert!(!policy.should_recompute(&vec![0, 0]));
        assert!(policy.should_recompute(&vec![1, 0]));
        // Novel, but too soon after the last recomputation.
        assert!(!policy.should_recompute(&vec![1, 1]));
        assert!(!policy.should_recompute(&vec![1, 1]));
        assert_eq!(policy.num_seen_facts(), 4);
    }

    #[test]
    fn test_stores_only_improving_partitions() {
        let task = two_switches();
        let mut h = OnlineSaturatedHeuristic::new(
            projections(&task, &[&[0], &[1]]),
            task.operator_costs(),
            GreedyOrderPolicy::new(ScoringFunction::MaxHeuristic),
            compute_saturated_cost_partitioning::<State>,
            EveryNthState::new(1),
            OnlineConfig::default(),
        );
        assert_eq!(h.estimate(&vec![0, 0]), 8);
        assert_eq!(h.pool().len(), 1);
        assert_eq!(h.estimate(&vec![0, 0]), 8);
        assert_eq!(h.estimate(&vec![1, 0]), 5);
        assert_eq!(h.estimate(&vec![1, 1]), 0);
        assert_eq!(h.pool().len(), 1);
        assert_eq!(h.num_computed(), 4);
        assert_eq!(h.num_evaluated_states(), 4);
    }

    #[test]
    fn test_storing_can_be_disabled() {
        let task = two_switches();
        let config = OnlineConfig {
            store_cost_partitionings: false,
            ..Default::default()
        };
        let mut h = heuristic(&task, &[&[0], &[1]], EveryNthState::new(1), config);
        assert_eq!(h.estimate(&vec![0, 0]), 8);
        assert_eq!(h.estimate(&vec![0, 0]), 8);

        let config = OnlineConfig {
            max_size_kb: 0,
            ..Default::default()
        };
        let mut h = heuristic(&task, &[&[0], &[1]], EveryNthState::new(1), config);
        assert_eq!(h.estimate(&vec![0, 0]), 8);
    }

    #[test]
    fn test_without_recomputation_estimate_is_zero() {
        let task = two_switches();
        // Interval 2 skips the second state, and nothing was stored for it.
        let config = OnlineConfig {
            store_cost_partitionings: false,
            ..Default::default()
        };
        let mut h = heuristic(&task, &[&[0], &[1]], EveryNthState::new(2), config);
        assert_eq!(h.estimate(&vec![0, 0]), 8);
        assert_eq!(h.estimate(&vec![0, 0]), 0);
    }

    #[test]
    fn test_dead_ends_skip_recomputation() {
        let task = SasTask::new(
            vec![3],
            vec![
                Operator::new("good", vec![(0, 0)], vec![(0, 1)], 1),
                Operator::new("bad", vec![(0, 0)], vec![(0, 2)], 1),
            ],
            vec![0],
            vec![(0, 1)],
        );
        let mut h = OnlineSaturatedHeuristic::new(
            projections(&task, &[&[0]]),
            task.operator_costs(),
            GreedyOrderPolicy::new(ScoringFunction::default()),
            compute_saturated_cost_partitioning::<State>,
            NovelFactPolicy::new(task.domain_sizes(), 1),
            OnlineConfig::default(),
        );
        assert_eq!(h.estimate(&vec![2]), INF);
        assert_eq!(h.num_dead_ends(), 1);
        assert_eq!(h.num_computed(), 0);
        assert_eq!(h.estimate(&vec![0]), 1);
        assert_eq!(h.num_computed(), 1);
    }
}
