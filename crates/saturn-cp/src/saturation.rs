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

//! Saturated cost partitioning.
//!
//! Saturation processes the abstractions in a given order. Each abstraction
//! computes its goal distances under the costs that are still available,
//! stores them, and then gives back everything it did not need: only its
//! saturated costs are subtracted from the remaining budget. Later
//! abstractions in the order therefore see a reduced but never negative
//! cost function, and the sum of all stored tables stays admissible.
//!
//! `CostPartitioningFunction` is the seam through which generators and
//! online heuristics run a partitioning; closures with the right signature
//! implement it directly.

use crate::cost_partitioning::CostPartitioningHeuristic;
use saturn_core::num::{Cost, InfinityArithmetic};
use saturn_model::abstraction::Abstractions;
use saturn_model::order::Order;

/// Computes a cost partitioning for a complete order.
///
/// `remaining_costs` is consumed: on return it holds whatever the
/// partitioning left unused. `abstract_state_ids` are the ids of the state
/// the order was computed for; functions may use them to focus the
/// partitioning on that state.
pub trait CostPartitioningFunction<S> {
    fn compute(
        &self,
        abstractions: &Abstractions<S>,
        order: &Order,
        remaining_costs: &mut [Cost],
        abstract_state_ids: &[usize],
    ) -> CostPartitioningHeuristic;
}

impl<S, F> CostPartitioningFunction<S> for F
where
    F: Fn(&Abstractions<S>, &Order, &mut [Cost], &[usize]) -> CostPartitioningHeuristic,
{
    #[inline]
    fn compute(
        &self,
        abstractions: &Abstractions<S>,
        order: &Order,
        remaining_costs: &mut [Cost],
        abstract_state_ids: &[usize],
    ) -> CostPartitioningHeuristic {
        self(abstractions, order, remaining_costs, abstract_state_ids)
    }
}

/// Subtracts `saturated_costs` from `remaining_costs`. Infinite remaining
/// costs stay infinite.
///
/// # Panics
///
/// Panics in debug builds if a saturated cost exceeds the remaining cost.
pub fn reduce_costs(remaining_costs: &mut [Cost], saturated_costs: &[Cost]) {
    debug_assert_eq!(remaining_costs.len(), saturated_costs.len());
    for (op, (remaining, &saturated)) in remaining_costs.iter_mut().zip(saturated_costs).enumerate() {
        debug_assert!(
            saturated <= *remaining,
            "called `reduce_costs` with saturated cost {saturated} above remaining cost {remaining} for operator {op}"
        );
        *remaining = remaining.left_sub(saturated);
    }
}

/// Saturated cost partitioning over a complete `order`.
///
/// # Panics
///
/// Panics if `order` is not a permutation of all abstractions.
pub fn compute_saturated_cost_partitioning<S>(
    abstractions: &Abstractions<S>,
    order: &Order,
    remaining_costs: &mut [Cost],
    _abstract_state_ids: &[usize],
) -> CostPartitioningHeuristic {
    order.assert_complete(abstractions.len());

    let num_operators = remaining_costs.len();
    let mut cp = CostPartitioningHeuristic::new();
    for index in order {
        let abstraction = abstractions.get(index);
        let h_values = abstraction.compute_goal_distances(remaining_costs);
        let saturated_costs = abstraction.compute_saturated_costs(&h_values, num_operators);
        reduce_costs(remaining_costs, &saturated_costs);
        cp.add_h_values(index, h_values);
    }
    cp
}
