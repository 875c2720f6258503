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

//! Order policies.
//!
//! An order policy proposes the saturation order for a given state. The
//! generator asks it once for the initial state and once per sampled state.
//!
//! - `RandomOrderPolicy`: a uniformly random permutation, ignoring the state.
//! - `GreedyOrderPolicy`: sorts abstractions by a `ScoringFunction` that
//!   combines the abstraction's estimate for the state with the costs it
//!   would take away from the other abstractions.

use rand::Rng;
use saturn_core::array_pool::ArrayPool;
use saturn_core::num::{Cost, INF};
use saturn_model::abstraction::Abstractions;
use saturn_model::index::AbstractionIndex;
use saturn_model::order::Order;

/// Proposes saturation orders for states.
pub trait OrderPolicy<S> {
    /// Returns the name of the policy.
    fn name(&self) -> &str;

    /// Prepares the policy for `abstractions` under the full `costs`.
    /// Called once before any order is requested.
    fn initialize(&mut self, abstractions: &Abstractions<S>, costs: &[Cost]);

    /// Returns a complete order for the state with the given abstract state
    /// ids.
    fn compute_order_for_state(&mut self, abstract_state_ids: &[usize], is_initial: bool) -> Order;
}

impl<S> std::fmt::Debug for dyn OrderPolicy<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderPolicy {{ name: {} }}", self.name())
    }
}

/// Uniformly random orders.
#[derive(Debug, Clone)]
pub struct RandomOrderPolicy<R> {
    rng: R,
    num_abstractions: usize,
}

impl<R: Rng> RandomOrderPolicy<R> {
    #[inline]
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            num_abstractions: 0,
        }
    }
}

impl<S, R: Rng> OrderPolicy<S> for RandomOrderPolicy<R> {
    fn name(&self) -> &str {
        "RandomOrderPolicy"
    }

    fn initialize(&mut self, abstractions: &Abstractions<S>, _costs: &[Cost]) {
        self.num_abstractions = abstractions.len();
    }

    fn compute_order_for_state(&mut self, _abstract_state_ids: &[usize], _is_initial: bool) -> Order {
        Order::random(self.num_abstractions, &mut self.rng)
    }
}

/// How a greedy policy ranks abstractions. Higher scores come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScoringFunction {
    /// Prefer abstractions with a high estimate for the state.
    MaxHeuristic,
    /// Prefer abstractions that take little contested cost.
    MinStolenCosts,
    /// Prefer a high estimate per unit of contested cost.
    #[default]
    MaxHeuristicPerStolenCosts,
}

impl ScoringFunction {
    #[inline]
    fn score(self, h: Cost, stolen_costs: Cost) -> f64 {
        let h = if h == INF { f64::INFINITY } else { f64::from(h) };
        let stolen = f64::from(stolen_costs);
        match self {
            ScoringFunction::MaxHeuristic => h,
            ScoringFunction::MinStolenCosts => -stolen,
            ScoringFunction::MaxHeuristicPerStolenCosts => h / stolen.max(1.0),
        }
    }
}

impl std::fmt::Display for ScoringFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringFunction::MaxHeuristic => write!(f, "max_heuristic"),
            ScoringFunction::MinStolenCosts => write!(f, "min_stolen_costs"),
            ScoringFunction::MaxHeuristicPerStolenCosts => write!(f, "max_heuristic_per_stolen_costs"),
        }
    }
}

/// Greedy orders, sorted by score for the requested state.
///
/// `initialize` computes each abstraction's goal distances and saturated
/// costs under the full costs. An operator whose saturated costs summed over
/// all abstractions exceed its cost is contested; the stolen costs of an
/// abstraction are its share of that excess.
#[derive(Debug, Clone, Default)]
pub struct GreedyOrderPolicy {
    scoring_function: ScoringFunction,
    h_values: ArrayPool<Cost>,
    stolen_costs: Vec<Cost>,
}

impl GreedyOrderPolicy {
    #[inline]
    pub fn new(scoring_function: ScoringFunction) -> Self {
        Self {
            scoring_function,
            h_values: ArrayPool::new(),
            stolen_costs: Vec::new(),
        }
    }

    #[inline]
    pub fn scoring_function(&self) -> ScoringFunction {
        self.scoring_function
    }

    /// The stolen costs per abstraction, valid after `initialize`.
    #[inline]
    pub fn stolen_costs(&self) -> &[Cost] {
        &self.stolen_costs
    }
}

impl<S> OrderPolicy<S> for GreedyOrderPolicy {
    fn name(&self) -> &str {
        "GreedyOrderPolicy"
    }

    fn initialize(&mut self, abstractions: &Abstractions<S>, costs: &[Cost]) {
        let num_operators = costs.len();
        let mut h_values = ArrayPool::with_capacity(abstractions.len(), abstractions.total_num_states());
        let mut saturated_costs = Vec::with_capacity(abstractions.len());
        for (_, abstraction) in abstractions.iter() {
            let h = abstraction.compute_goal_distances(costs);
            saturated_costs.push(abstraction.compute_saturated_costs(&h, num_operators));
            h_values.push(h);
        }

        let mut excess: Vec<i64> = costs.iter().map(|&c| -i64::from(c)).collect();
        for costs_of_abstraction in &saturated_costs {
            for (e, &c) in excess.iter_mut().zip(costs_of_abstraction) {
                *e += i64::from(c);
            }
        }

        self.stolen_costs = saturated_costs
            .iter()
            .map(|costs_of_abstraction| {
                let stolen: i64 = costs_of_abstraction
                    .iter()
                    .zip(&excess)
                    .zip(costs)
                    .filter(|&(_, &cost)| cost != INF)
                    .map(|((&c, &e), _)| i64::from(c).min(e.max(0)))
                    .sum();
                Cost::try_from(stolen).unwrap_or(INF - 1)
            })
            .collect();
        self.h_values = h_values;
    }

    fn compute_order_for_state(&mut self, abstract_state_ids: &[usize], _is_initial: bool) -> Order {
        debug_assert_eq!(
            self.h_values.len(),
            abstract_state_ids.len(),
            "called `GreedyOrderPolicy::compute_order_for_state` before `initialize` or with ids of the wrong length"
        );

        let mut scored: Vec<(f64, AbstractionIndex)> = self
            .h_values
            .iter()
            .zip(&self.stolen_costs)
            .enumerate()
            .map(|(i, (h, &stolen))| {
                let score = self.scoring_function.score(h[abstract_state_ids[i]], stolen);
                (score, AbstractionIndex::new(i))
            })
            .collect();
        // Stable sort keeps ties in index order.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Order::new(scored.into_iter().map(|(_, index)| index).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use saturn_model::abstraction::Abstraction;
    use saturn_model::explicit::{ExplicitAbstraction, Transition};

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

    // a0 needs op0 (cost 2); a1 needs op0 too; a2 needs op1 (cost 5) alone.
    fn abstractions() -> Abstractions<usize> {
        vec![edge(&[0]), edge(&[0]), edge(&[1])].into_iter().collect()
    }

    #[test]
    fn test_random_policy_returns_permutations() {
        let abstractions = abstractions();
        let mut policy = RandomOrderPolicy::new(ChaCha8Rng::seed_from_u64(1));
        OrderPolicy::<usize>::initialize(&mut policy, &abstractions, &[2, 5]);
        for _ in 0..10 {
            let order = OrderPolicy::<usize>::compute_order_for_state(&mut policy, &[0, 0, 0], false);
            assert!(order.is_complete(3));
        }
    }

    #[test]
    fn test_stolen_costs_count_contested_cost() {
        let abstractions = abstractions();
        let mut policy = GreedyOrderPolicy::new(ScoringFunction::MaxHeuristicPerStolenCosts);
        OrderPolicy::<usize>::initialize(&mut policy, &abstractions, &[2, 5]);
        // op0: 2 + 2 saturated vs. cost 2, excess 2. op1 is uncontested.
        assert_eq!(policy.stolen_costs(), &[2, 2, 0]);
    }

    #[test]
    fn test_max_heuristic_prefers_high_estimates() {
        let abstractions = abstractions();
        let mut policy = GreedyOrderPolicy::new(ScoringFunction::MaxHeuristic);
        OrderPolicy::<usize>::initialize(&mut policy, &abstractions, &[2, 5]);
        let order = OrderPolicy::<usize>::compute_order_for_state(&mut policy, &[0, 0, 0], true);
        assert_eq!(raw(&order), vec![2, 0, 1]);
        // In the goal state every estimate is zero; ties keep index order.
        let order = OrderPolicy::<usize>::compute_order_for_state(&mut policy, &[1, 1, 1], false);
        assert_eq!(raw(&order), vec![0, 1, 2]);
    }

    #[test]
    fn test_min_stolen_costs_prefers_uncontested() {
        let abstractions = abstractions();
        let mut policy = GreedyOrderPolicy::new(ScoringFunction::MinStolenCosts);
        OrderPolicy::<usize>::initialize(&mut policy, &abstractions, &[2, 5]);
        let order = OrderPolicy::<usize>::compute_order_for_state(&mut policy, &[0, 0, 0], false);
        assert_eq!(raw(&order), vec![2, 0, 1]);
    }

    #[test]
    fn test_infinite_estimates_come_first() {
        let dead: Box<dyn Abstraction<usize>> =
            Box::new(ExplicitAbstraction::new(2, vec![], vec![], vec![1], |s: &usize| s % 2));
        let abstractions: Abstractions<usize> = vec![edge(&[0]), dead].into_iter().collect();
        let mut policy = GreedyOrderPolicy::new(ScoringFunction::MaxHeuristicPerStolenCosts);
        OrderPolicy::<usize>::initialize(&mut policy, &abstractions, &[3]);
        let order = OrderPolicy::<usize>::compute_order_for_state(&mut policy, &[0, 0], false);
        assert_eq!(raw(&order), vec![1, 0]);
    }

    #[test]
    fn test_scoring_function_display() {
        assert_eq!(ScoringFunction::default().to_string(), "max_heuristic_per_stolen_costs");
    }
}
