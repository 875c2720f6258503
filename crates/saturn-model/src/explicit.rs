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

//! Explicit abstractions.
//!
//! `ExplicitAbstraction` stores its abstract transition system as a list of
//! labelled transitions `<src, op, target>` plus the set of operators that
//! only induce self-loops. Goal distances are computed with a backward
//! Dijkstra search from all goal states; saturated costs follow directly from
//! the goal distances: an operator needs exactly the largest drop in goal
//! distance it realises on any transition between solvable states.
//!
//! Self-loops never need any cost, so they are not stored as transitions.
//! Transitions between unsolvable states, or into them, do not constrain the
//! saturated costs either.

use crate::abstraction::{Abstraction, MappingFunction};
use saturn_core::num::{Cost, INF, InfinityArithmetic};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A state-changing transition `src --op--> target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Transition {
    pub src: usize,
    pub op: usize,
    pub target: usize,
}

impl Transition {
    /// Creates a transition.
    ///
    /// # Panics
    ///
    /// Panics if `src == target`; self-loops are described by looping
    /// operators instead.
    #[inline]
    pub fn new(src: usize, op: usize, target: usize) -> Self {
        assert!(
            src != target,
            "called `Transition::new` with a self-loop on state {src} for operator {op}"
        );
        Self { src, op, target }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{},{},{}>", self.src, self.op, self.target)
    }
}

/// An abstraction given by an explicit labelled transition system.
pub struct ExplicitAbstraction<S> {
    num_states: usize,
    transitions: Vec<Transition>,
    // Incoming transitions per target state as `(op, src)`.
    backward_graph: Vec<Vec<(usize, usize)>>,
    active_operators: Vec<usize>,
    looping_operators: Vec<usize>,
    goal_states: Vec<usize>,
    mapping: Box<dyn Fn(&S) -> usize>,
}

impl<S> ExplicitAbstraction<S> {
    /// Creates an abstraction over `num_states` abstract states.
    ///
    /// # Panics
    ///
    /// Panics if a transition or goal state refers to a state outside
    /// `0..num_states`.
    pub fn new<F>(
        num_states: usize,
        transitions: Vec<Transition>,
        looping_operators: Vec<usize>,
        goal_states: Vec<usize>,
        mapping: F,
    ) -> Self
    where
        F: Fn(&S) -> usize + 'static,
    {
        let mut backward_graph = vec![Vec::new(); num_states];
        for t in &transitions {
            assert!(
                t.src < num_states && t.target < num_states,
                "called `ExplicitAbstraction::new` with transition {t} outside of {num_states} states"
            );
            backward_graph[t.target].push((t.op, t.src));
        }
        for &goal in &goal_states {
            assert!(
                goal < num_states,
                "called `ExplicitAbstraction::new` with goal state {goal} outside of {num_states} states"
            );
        }

        let mut active_operators: Vec<usize> = transitions.iter().map(|t| t.op).collect();
        active_operators.sort_unstable();
        active_operators.dedup();

        let mut looping_operators = looping_operators;
        looping_operators.sort_unstable();
        looping_operators.dedup();

        Self {
            num_states,
            transitions,
            backward_graph,
            active_operators,
            looping_operators,
            goal_states,
            mapping: Box::new(mapping),
        }
    }

    /// Returns the state-changing transitions.
    #[inline]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

impl<S: 'static> Abstraction<S> for ExplicitAbstraction<S> {
    #[inline]
    fn num_states(&self) -> usize {
        self.num_states
    }

    #[inline]
    fn abstract_state_id(&self, state: &S) -> usize {
        (self.mapping)(state)
    }

    fn compute_goal_distances(&self, costs: &[Cost]) -> Vec<Cost> {
        let mut distances = vec![INF; self.num_states];
        let mut queue = BinaryHeap::new();
        for &goal in &self.goal_states {
            if distances[goal] != 0 {
                distances[goal] = 0;
                queue.push(Reverse((0, goal)));
            }
        }

        while let Some(Reverse((distance, state))) = queue.pop() {
            if distance > distances[state] {
                continue;
            }
            for &(op, src) in &self.backward_graph[state] {
                let cost = costs[op];
                debug_assert!(
                    cost >= 0,
                    "called `ExplicitAbstraction::compute_goal_distances` with negative cost {cost} for operator {op}"
                );
                let candidate = distance.left_add(cost);
                if candidate < distances[src] {
                    distances[src] = candidate;
                    queue.push(Reverse((candidate, src)));
                }
            }
        }
        distances
    }

    fn compute_saturated_costs(&self, h_values: &[Cost], num_operators: usize) -> Vec<Cost> {
        debug_assert_eq!(h_values.len(), self.num_states);

        let mut saturated_costs = vec![0; num_operators];
        for t in &self.transitions {
            let (h_src, h_target) = (h_values[t.src], h_values[t.target]);
            if h_src == INF || h_target == INF {
                continue;
            }
            let needed = h_src - h_target;
            if needed > saturated_costs[t.op] {
                saturated_costs[t.op] = needed;
            }
        }
        saturated_costs
    }

    #[inline]
    fn active_operators(&self) -> &[usize] {
        &self.active_operators
    }

    #[inline]
    fn looping_operators(&self) -> &[usize] {
        &self.looping_operators
    }

    #[inline]
    fn goal_states(&self) -> &[usize] {
        &self.goal_states
    }

    fn into_mapping_function(self: Box<Self>) -> Box<dyn MappingFunction<S>> {
        Box::new(self.mapping)
    }
}

impl<S> std::fmt::Debug for ExplicitAbstraction<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplicitAbstraction")
            .field("num_states", &self.num_states)
            .field("transitions", &self.transitions)
            .field("looping_operators", &self.looping_operators)
            .field("goal_states", &self.goal_states)
            .finish_non_exhaustive()
    }
}
