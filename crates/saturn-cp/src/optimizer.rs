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

//! Hill climbing over saturation orders.
//!
//! The optimizer improves an order for one particular state. Starting from
//! the incumbent order and its partition, it walks the neighbors produced by
//! an `OrderNeighborhood`. The first neighbor whose partition yields a
//! strictly higher estimate for the state becomes the new incumbent, and
//! the scan restarts from there. The climb ends at a local optimum, when the
//! incumbent already proves the state unsolvable, or when the timer expires.
//! The timer is checked before every neighbor is computed.

use crate::cost_partitioning::CostPartitioningHeuristic;
use crate::saturation::CostPartitioningFunction;
use crate::stats::OptimizationStatistics;
use saturn_core::num::{Cost, INF};
use saturn_core::timer::CountdownTimer;
use saturn_model::abstraction::Abstractions;
use saturn_model::order::Order;
use std::time::Instant;

/// Moves between orders.
pub trait OrderNeighborhood {
    type Move: Copy;

    /// Returns the name of the neighborhood.
    fn name(&self) -> &str;

    /// Lists the moves applicable to `order`.
    fn moves(&self, order: &Order) -> Vec<Self::Move>;

    /// Applies `mv` to `order` in place.
    fn apply(&self, order: &mut Order, mv: Self::Move);

    /// Reverts a previous `apply` of `mv`.
    fn undo(&self, order: &mut Order, mv: Self::Move);
}

/// All pairwise swaps of two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SwapNeighborhood;

impl OrderNeighborhood for SwapNeighborhood {
    type Move = (usize, usize);

    fn name(&self) -> &str {
        "SwapNeighborhood"
    }

    fn moves(&self, order: &Order) -> Vec<(usize, usize)> {
        let n = order.len();
        (0..n).flat_map(|i| (i + 1..n).map(move |j| (i, j))).collect()
    }

    #[inline]
    fn apply(&self, order: &mut Order, (i, j): (usize, usize)) {
        order.swap(i, j);
    }

    #[inline]
    fn undo(&self, order: &mut Order, (i, j): (usize, usize)) {
        order.swap(i, j);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizationTerminationReason {
    /// No neighbor improves the incumbent.
    LocalOptimum,

    /// The incumbent already proves the state unsolvable.
    Unsolvable,

    /// The time budget ran out.
    TimeLimit,
}

impl std::fmt::Display for OptimizationTerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizationTerminationReason::LocalOptimum => write!(f, "Local Optimum Reached"),
            OptimizationTerminationReason::Unsolvable => write!(f, "Incumbent Proves Unsolvability"),
            OptimizationTerminationReason::TimeLimit => write!(f, "Time Limit Reached"),
        }
    }
}

/// The result of a hill-climbing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizationOutcome {
    order: Order,
    cost_partitioning: CostPartitioningHeuristic,
    h_value: Cost,
    termination_reason: OptimizationTerminationReason,
    statistics: OptimizationStatistics,
}

impl OptimizationOutcome {
    #[inline]
    pub fn order(&self) -> &Order {
        &self.order
    }

    #[inline]
    pub fn cost_partitioning(&self) -> &CostPartitioningHeuristic {
        &self.cost_partitioning
    }

    /// The incumbent's estimate for the optimized state.
    #[inline]
    pub fn h_value(&self) -> Cost {
        self.h_value
    }

    #[inline]
    pub fn termination_reason(&self) -> OptimizationTerminationReason {
        self.termination_reason
    }

    #[inline]
    pub fn statistics(&self) -> &OptimizationStatistics {
        &self.statistics
    }

    /// Splits the outcome into the incumbent order and partition.
    #[inline]
    pub fn into_parts(self) -> (Order, CostPartitioningHeuristic, OptimizationStatistics) {
        (self.order, self.cost_partitioning, self.statistics)
    }
}

/// First-improvement hill climbing.
#[derive(Debug, Clone, Default)]
pub struct HillClimbingOptimizer<N> {
    neighborhood: N,
}

impl<N: OrderNeighborhood> HillClimbingOptimizer<N> {
    #[inline]
    pub fn new(neighborhood: N) -> Self {
        Self { neighborhood }
    }

    #[inline]
    pub fn neighborhood(&self) -> &N {
        &self.neighborhood
    }

    /// Improves `order` for the state with `abstract_state_ids`.
    ///
    /// `cost_partitioning` must be the partition of `order` under `costs`.
    /// Every neighbor is partitioned from a fresh copy of `costs`.
    #[allow(clippy::too_many_arguments)]
    pub fn optimize<S, F>(
        &self,
        cp_function: &F,
        abstractions: &Abstractions<S>,
        costs: &[Cost],
        abstract_state_ids: &[usize],
        order: Order,
        cost_partitioning: CostPartitioningHeuristic,
        timer: &CountdownTimer,
    ) -> OptimizationOutcome
    where
        F: CostPartitioningFunction<S> + ?Sized,
    {
        let start_time = Instant::now();
        let mut statistics = OptimizationStatistics::default();
        let mut order = order;
        let mut incumbent = cost_partitioning;
        let mut incumbent_h = incumbent.compute_heuristic(abstract_state_ids);
        let mut remaining_costs = Vec::with_capacity(costs.len());

        let termination_reason = 'climb: loop {
            if incumbent_h == INF {
                break OptimizationTerminationReason::Unsolvable;
            }

            let mut improved = false;
            for mv in self.neighborhood.moves(&order) {
                if timer.is_expired() {
                    break 'climb OptimizationTerminationReason::TimeLimit;
                }

                self.neighborhood.apply(&mut order, mv);
                remaining_costs.clear();
                remaining_costs.extend_from_slice(costs);
                let candidate = cp_function.compute(abstractions, &order, &mut remaining_costs, abstract_state_ids);
                let candidate_h = candidate.compute_heuristic(abstract_state_ids);
                statistics.on_neighbor_evaluated();

                if candidate_h > incumbent_h {
                    incumbent = candidate;
                    incumbent_h = candidate_h;
                    statistics.on_improvement();
                    improved = true;
                    break;
                }
                self.neighborhood.undo(&mut order, mv);
            }

            if !improved {
                break OptimizationTerminationReason::LocalOptimum;
            }
        };

        statistics.set_total_time(start_time.elapsed());
        OptimizationOutcome {
            order,
            cost_partitioning: incumbent,
            h_value: incumbent_h,
            termination_reason,
            statistics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saturation::compute_saturated_cost_partitioning;
    use saturn_model::abstraction::Abstraction;
    use saturn_model::explicit::{ExplicitAbstraction, Transition};
    use saturn_model::index::AbstractionIndex;
    use std::time::Duration;

    fn raw(order: &Order) -> Vec<usize> {
        order.iter().map(AbstractionIndex::get).collect()
    }

    // Two states 0 -> 1 (goal) connected by each operator in `ops`.
    fn edge(ops: &[usize]) -> Box<dyn Abstraction<usize>> {
        Box::new(ExplicitAbstraction::new(
            2,
            ops.iter().map(|&op| Transition::new(0, op, 1)).collect(),
            vec![],
            vec![1],
            |s: &usize| s % 2,
        ))
    }

    // a0 reaches the goal from state 0 with op1 and from state 1 with op0.
    // Saturating a0 first spends op0 on state 1, which the evaluated state
    // never visits, and starves a1, which needs op0.
    fn abstractions() -> Abstractions<usize> {
        let a0: Box<dyn Abstraction<usize>> = Box::new(ExplicitAbstraction::new(
            3,
            vec![Transition::new(0, 1, 2), Transition::new(1, 0, 2)],
            vec![],
            vec![2],
            |s: &usize| s % 3,
        ));
        vec![a0, edge(&[0])].into_iter().collect()
    }

    fn start(order: &[usize], abstractions: &Abstractions<usize>, costs: &[Cost]) -> (Order, CostPartitioningHeuristic) {
        let order = Order::from_indices(order);
        let mut remaining = costs.to_vec();
        let cp = compute_saturated_cost_partitioning(abstractions, &order, &mut remaining, &[0, 0]);
        (order, cp)
    }

    #[test]
    fn test_swap_moves() {
        let moves = SwapNeighborhood.moves(&Order::default_order(3));
        assert_eq!(moves, vec![(0, 1), (0, 2), (1, 2)]);
        assert!(SwapNeighborhood.moves(&Order::default_order(1)).is_empty());
    }

    #[test]
    fn test_climbs_to_better_order() {
        let abstractions = abstractions();
        let costs = [4, 5];
        let (order, cp) = start(&[0, 1], &abstractions, &costs);
        // a0 takes all of op0, a1 gets nothing.
        assert_eq!(cp.compute_heuristic(&[0, 0]), 5);

        let optimizer = HillClimbingOptimizer::new(SwapNeighborhood);
        let timer = CountdownTimer::unlimited();
        let compute = compute_saturated_cost_partitioning::<usize>;
        let outcome = optimizer.optimize(&compute, &abstractions, &costs, &[0, 0], order, cp, &timer);

        // a1 first takes op0 (4), a0 then still has op1 (5).
        assert_eq!(raw(outcome.order()), vec![1, 0]);
        assert_eq!(outcome.h_value(), 9);
        assert_eq!(outcome.termination_reason(), OptimizationTerminationReason::LocalOptimum);
        assert_eq!(outcome.statistics().improvements, 1);
        assert_eq!(outcome.statistics().neighbors_evaluated, 2);
    }

    #[test]
    fn test_expired_timer_keeps_incumbent() {
        let abstractions = abstractions();
        let costs = [4, 5];
        let (order, cp) = start(&[0, 1], &abstractions, &costs);
        let optimizer = HillClimbingOptimizer::new(SwapNeighborhood);
        let timer = CountdownTimer::new(Duration::ZERO);
        let compute = compute_saturated_cost_partitioning::<usize>;
        let outcome = optimizer.optimize(&compute, &abstractions, &costs, &[0, 0], order.clone(), cp.clone(), &timer);

        assert_eq!(outcome.termination_reason(), OptimizationTerminationReason::TimeLimit);
        assert_eq!(outcome.order(), &order);
        assert_eq!(outcome.cost_partitioning(), &cp);
        assert_eq!(outcome.statistics().neighbors_evaluated, 0);
    }

    #[test]
    fn test_infinite_incumbent_stops_immediately() {
        let dead: Box<dyn Abstraction<usize>> =
            Box::new(ExplicitAbstraction::new(2, vec![], vec![], vec![1], |s: &usize| s % 2));
        let abstractions: Abstractions<usize> = vec![edge(&[0]), dead].into_iter().collect();
        let costs = [1];
        let (order, cp) = start(&[0, 1], &abstractions, &costs);
        let optimizer = HillClimbingOptimizer::new(SwapNeighborhood);
        let compute = compute_saturated_cost_partitioning::<usize>;
        let outcome = optimizer.optimize(
            &compute,
            &abstractions,
            &costs,
            &[0, 0],
            order,
            cp,
            &CountdownTimer::unlimited(),
        );
        assert_eq!(outcome.termination_reason(), OptimizationTerminationReason::Unsolvable);
        assert_eq!(outcome.h_value(), INF);
    }

    #[test]
    fn test_local_optimum_without_improvement() {
        let abstractions = abstractions();
        let costs = [4, 5];
        let (order, cp) = start(&[1, 0], &abstractions, &costs);
        let optimizer = HillClimbingOptimizer::new(SwapNeighborhood);
        let compute = compute_saturated_cost_partitioning::<usize>;
        let outcome = optimizer.optimize(
            &compute,
            &abstractions,
            &costs,
            &[0, 0],
            order.clone(),
            cp,
            &CountdownTimer::unlimited(),
        );
        assert_eq!(outcome.termination_reason(), OptimizationTerminationReason::LocalOptimum);
        assert_eq!(outcome.order(), &order);
        assert_eq!(outcome.statistics().improvements, 0);
    }
}
