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

//! Finite-domain planning tasks.
//!
//! `SasTask` is a deliberately small representation of a planning task in
//! finite-domain form: a set of variables with finite domains, a complete
//! initial assignment, a partial goal assignment, and operators with
//! preconditions, effects, and a non-negative cost. States are plain
//! `Vec<usize>` assignments.
//!
//! Two interfaces decouple the cost partitioning crate from this concrete
//! representation: `TransitionModel` (what a random-walk sampler needs) and
//! `FactState` (what a fact-novelty policy needs).

use saturn_core::num::Cost;

/// A variable-value pair.
pub type Fact = (usize, usize);

/// The successor structure of a task, as seen by samplers.
pub trait TransitionModel<S> {
    fn initial_state(&self) -> S;

    /// Appends all successors of `state` to `successors`.
    fn successors(&self, state: &S, successors: &mut Vec<S>);

    /// The mean operator cost, used to scale random walk lengths.
    fn average_operator_cost(&self) -> f64;
}

/// Read access to the facts of a state.
pub trait FactState {
    fn num_variables(&self) -> usize;
    fn value(&self, var: usize) -> usize;
}

impl FactState for Vec<usize> {
    #[inline]
    fn num_variables(&self) -> usize {
        self.len()
    }

    #[inline]
    fn value(&self, var: usize) -> usize {
        self[var]
    }
}

impl FactState for [usize] {
    #[inline]
    fn num_variables(&self) -> usize {
        self.len()
    }

    #[inline]
    fn value(&self, var: usize) -> usize {
        self[var]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub name: String,
    pub preconditions: Vec<Fact>,
    pub effects: Vec<Fact>,
    pub cost: Cost,
}

impl Operator {
    pub fn new(name: impl Into<String>, preconditions: Vec<Fact>, effects: Vec<Fact>, cost: Cost) -> Self {
        Self {
            name: name.into(),
            preconditions,
            effects,
            cost,
        }
    }

    /// Returns `true` if all preconditions hold in `state`.
    #[inline]
    pub fn is_applicable<S: FactState + ?Sized>(&self, state: &S) -> bool {
        self.preconditions.iter().all(|&(var, val)| state.value(var) == val)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SasTask {
    domain_sizes: Vec<usize>,
    operators: Vec<Operator>,
    initial_state: Vec<usize>,
    goal: Vec<Fact>,
}

impl SasTask {
    /// Creates a task.
    ///
    /// # Panics
    ///
    /// Panics if a fact refers to an unknown variable or to a value outside
    /// its domain, if the initial state does not assign every variable, or if
    /// an operator has a negative cost.
    pub fn new(
        domain_sizes: Vec<usize>,
        operators: Vec<Operator>,
        initial_state: Vec<usize>,
        goal: Vec<Fact>,
    ) -> Self {
        assert_eq!(
            initial_state.len(),
            domain_sizes.len(),
            "called `SasTask::new` with an initial state of the wrong length"
        );
        let check_fact = |&(var, val): &Fact, context: &str| {
            assert!(
                var < domain_sizes.len() && val < domain_sizes[var],
                "called `SasTask::new` with invalid fact ({var}, {val}) in {context}"
            );
        };
        for (var, &val) in initial_state.iter().enumerate() {
            check_fact(&(var, val), "the initial state");
        }
        for fact in &goal {
            check_fact(fact, "the goal");
        }
        for op in &operators {
            assert!(
                op.cost >= 0,
                "called `SasTask::new` with negative cost for operator {}",
                op.name
            );
            for fact in op.preconditions.iter().chain(&op.effects) {
                check_fact(fact, &op.name);
            }
        }

        Self {
            domain_sizes,
            operators,
            initial_state,
            goal,
        }
    }

    #[inline]
    pub fn num_variables(&self) -> usize {
        self.domain_sizes.len()
    }

    #[inline]
    pub fn domain_sizes(&self) -> &[usize] {
        &self.domain_sizes
    }

    #[inline]
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    #[inline]
    pub fn num_operators(&self) -> usize {
        self.operators.len()
    }

    #[inline]
    pub fn goal(&self) -> &[Fact] {
        &self.goal
    }

    #[inline]
    pub fn initial_state_ref(&self) -> &[usize] {
        &self.initial_state
    }

    /// The cost of every operator, indexed by operator.
    pub fn operator_costs(&self) -> Vec<Cost> {
        self.operators.iter().map(|op| op.cost).collect()
    }

    pub fn is_goal<S: FactState + ?Sized>(&self, state: &S) -> bool {
        self.goal.iter().all(|&(var, val)| state.value(var) == val)
    }

    /// Applies `op` to `state`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `op` is not applicable in `state`.
    pub fn apply(&self, state: &[usize], op: usize) -> Vec<usize> {
        let operator = &self.operators[op];
        debug_assert!(
            operator.is_applicable(state),
            "called `SasTask::apply` with inapplicable operator {}",
            operator.name
        );
        let mut successor = state.to_vec();
        for &(var, val) in &operator.effects {
            successor[var] = val;
        }
        successor
    }

    /// Iterates over the operators applicable in `state`.
    pub fn applicable_operators<'a>(&'a self, state: &'a [usize]) -> impl Iterator<Item = usize> + 'a {
        self.operators
            .iter()
            .enumerate()
            .filter(move |(_, op)| op.is_applicable(state))
            .map(|(i, _)| i)
    }
}

impl TransitionModel<Vec<usize>> for SasTask {
    fn initial_state(&self) -> Vec<usize> {
        self.initial_state.clone()
    }

    fn successors(&self, state: &Vec<usize>, successors: &mut Vec<Vec<usize>>) {
        for op in self.applicable_operators(state) {
            successors.push(self.apply(state, op));
        }
    }

    fn average_operator_cost(&self) -> f64 {
        if self.operators.is_empty() {
            return 0.0;
        }
        let total: f64 = self.operators.iter().map(|op| f64::from(op.cost)).sum();
        total / self.operators.len() as f64
    }
}
