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

//! Uniform cost partitioning.
//!
//! Uniform cost partitioning splits the cost of every operator evenly among
//! the abstractions in which the operator induces a state-changing
//! transition. Abstractions in which an operator only loops do not need any
//! of its cost.
//!
//! The opportunistic variant walks an order: each abstraction receives an
//! even share of what is left among itself and the abstractions still to
//! come, and hands its unused share on by subtracting only its saturated
//! costs. Both functions fit `CostPartitioningFunction`, so pools of uniform
//! partitions are generated and evaluated like saturated ones.

use crate::cost_partitioning::CostPartitioningHeuristic;
use crate::saturation::reduce_costs;
use saturn_core::num::{Cost, INF};
use saturn_model::abstraction::Abstractions;
use saturn_model::order::Order;

/// Counts, per operator, the abstractions in which it is active.
fn count_active_abstractions<S>(abstractions: &Abstractions<S>, num_operators: usize) -> Vec<usize> {
    let mut counts = vec![0; num_operators];
    for (_, abstraction) in abstractions.iter() {
        for &op in abstraction.active_operators() {
            counts[op] += 1;
        }
    }
    counts
}

#[inline]
fn divide(cost: Cost, parts: usize) -> Cost {
    if cost == INF || parts <= 1 {
        return cost;
    }
    match Cost::try_from(parts) {
        Ok(parts) => cost / parts,
        Err(_) => 0,
    }
}

/// Uniform cost partitioning. The order only decides the sequence in which
/// tables are stored.
pub fn compute_uniform_cost_partitioning<S>(
    abstractions: &Abstractions<S>,
    order: &Order,
    remaining_costs: &mut [Cost],
    _abstract_state_ids: &[usize],
) -> CostPartitioningHeuristic {
    order.assert_complete(abstractions.len());

    let num_operators = remaining_costs.len();
    let counts = count_active_abstractions(abstractions, num_operators);
    let mut cp = CostPartitioningHeuristic::new();
    let mut shares = vec![0; num_operators];
    for index in order {
        let abstraction = abstractions.get(index);
        shares.fill(0);
        for &op in abstraction.active_operators() {
            shares[op] = divide(remaining_costs[op], counts[op]);
        }
        cp.add_h_values(index, abstraction.compute_goal_distances(&shares));
    }

    // Only the rounding remainder of a finite cost is left over.
    for (cost, &count) in remaining_costs.iter_mut().zip(&counts) {
        if count > 0 && *cost != INF {
            *cost -= divide(*cost, count).saturating_mul(Cost::try_from(count).unwrap_or(Cost::MAX));
        }
    }
    cp
}

/// Opportunistic uniform cost partitioning over a complete `order`.
pub fn compute_opportunistic_uniform_cost_partitioning<S>(
    abstractions: &Abstractions<S>,
    order: &Order,
    remaining_costs: &mut [Cost],
    _abstract_state_ids: &[usize],
) -> CostPartitioningHeuristic {
    order.assert_complete(abstractions.len());

    let num_operators = remaining_costs.len();
    let mut remaining_users = count_active_abstractions(abstractions, num_operators);
    let mut cp = CostPartitioningHeuristic::new();
    let mut shares = vec![0; num_operators];
    for index in order {
        let abstraction = abstractions.get(index);
        shares.fill(0);
        for &op in abstraction.active_operators() {
            shares[op] = divide(remaining_costs[op], remaining_users[op]);
            remaining_users[op] -= 1;
        }
        let h_values = abstraction.compute_goal_distances(&shares);
        let saturated_costs = abstraction.compute_saturated_costs(&h_values, num_operators);
        reduce_costs(remaining_costs, &saturated_costs);
        cp.add_h_values(index, h_values);
    }
    cp
}
