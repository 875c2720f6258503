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

//! Projections of a `SasTask` onto a pattern of variables.
//!
//! A projection keeps only the variables of its pattern and ignores all
//! others. Abstract states are ranked in mixed radix over the pattern's
//! domain sizes. The result is an `ExplicitAbstraction`, so its goal
//! distances form a pattern database.

use crate::explicit::{ExplicitAbstraction, Transition};
use crate::task::SasTask;

/// Mixed-radix ranking of the pattern variables of a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRanking {
    pattern: Vec<usize>,
    multipliers: Vec<usize>,
    num_states: usize,
}

impl PatternRanking {
    /// Creates the ranking for `pattern`.
    ///
    /// # Panics
    ///
    /// Panics if the pattern contains a duplicate or unknown variable, or if
    /// the number of abstract states does not fit into `usize`.
    pub fn new(task: &SasTask, pattern: &[usize]) -> Self {
        let mut sorted = pattern.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(
            sorted.len(),
            pattern.len(),
            "called `PatternRanking::new` with duplicate variables in pattern {pattern:?}"
        );

        let mut multipliers = Vec::with_capacity(sorted.len());
        let mut num_states: usize = 1;
        for &var in &sorted {
            assert!(
                var < task.num_variables(),
                "called `PatternRanking::new` with unknown variable {var}"
            );
            multipliers.push(num_states);
            num_states = num_states
                .checked_mul(task.domain_sizes()[var])
                .unwrap_or_else(|| panic!("called `PatternRanking::new` with pattern {pattern:?} too large to rank"));
        }

        Self {
            pattern: sorted,
            multipliers,
            num_states,
        }
    }

    #[inline]
    pub fn pattern(&self) -> &[usize] {
        &self.pattern
    }

    #[inline]
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Ranks a concrete state.
    #[inline]
    pub fn rank(&self, state: &[usize]) -> usize {
        self.pattern
            .iter()
            .zip(&self.multipliers)
            .map(|(&var, &m)| state[var] * m)
            .sum()
    }

    /// The value of pattern position `i` in abstract state `rank`.
    #[inline]
    fn value_at(&self, rank: usize, i: usize, domain_size: usize) -> usize {
        (rank / self.multipliers[i]) % domain_size
    }
}

/// Builds the projection of `task` onto `pattern`.
///
/// An operator induces a transition in every abstract state satisfying its
/// projected preconditions. If applying its projected effects leaves the
/// abstract state unchanged, the operator is recorded as looping instead.
pub fn project(task: &SasTask, pattern: &[usize]) -> ExplicitAbstraction<Vec<usize>> {
    let ranking = PatternRanking::new(task, pattern);
    let domain_sizes: Vec<usize> = ranking.pattern.iter().map(|&v| task.domain_sizes()[v]).collect();
    let position_of = |var: usize| ranking.pattern.iter().position(|&v| v == var);

    let mut transitions = Vec::new();
    let mut looping_operators = Vec::new();
    for (op_id, op) in task.operators().iter().enumerate() {
        let preconditions: Vec<(usize, usize)> = op
            .preconditions
            .iter()
            .filter_map(|&(var, val)| position_of(var).map(|i| (i, val)))
            .collect();
        let effects: Vec<(usize, usize)> = op
            .effects
            .iter()
            .filter_map(|&(var, val)| position_of(var).map(|i| (i, val)))
            .collect();

        for src in 0..ranking.num_states {
            let applicable = preconditions
                .iter()
                .all(|&(i, val)| ranking.value_at(src, i, domain_sizes[i]) == val);
            if !applicable {
                continue;
            }
            let mut target = src;
            for &(i, val) in &effects {
                let old = ranking.value_at(target, i, domain_sizes[i]);
                target = target - old * ranking.multipliers[i] + val * ranking.multipliers[i];
            }
            if target == src {
                looping_operators.push(op_id);
            } else {
                transitions.push(Transition::new(src, op_id, target));
            }
        }
    }

    let goal: Vec<(usize, usize)> = task
        .goal()
        .iter()
        .filter_map(|&(var, val)| position_of(var).map(|i| (i, val)))
        .collect();
    let goal_states: Vec<usize> = (0..ranking.num_states)
        .filter(|&s| goal.iter().all(|&(i, val)| ranking.value_at(s, i, domain_sizes[i]) == val))
        .collect();

    let num_states = ranking.num_states;
    ExplicitAbstraction::new(
        num_states,
        transitions,
        looping_operators,
        goal_states,
        move |state: &Vec<usize>| ranking.rank(state),
    )
}
