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

//! Order-independent dead-end detection.
//!
//! An abstract state from which no abstract goal state is reachable proves
//! every concrete state mapped onto it unsolvable, regardless of how costs
//! are partitioned. The unsolvability heuristic records these states once per
//! abstraction, so the runtime evaluator can reject dead ends before it
//! evaluates any partition.

use fixedbitset::FixedBitSet;
use saturn_core::num::{Cost, INF};
use saturn_model::abstraction::Abstractions;
use saturn_model::index::AbstractionIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
struct UnsolvabilityInfo {
    abstraction: AbstractionIndex,
    unsolvable_states: FixedBitSet,
}

/// Dead-end certificates of all abstractions with unsolvable states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnsolvabilityHeuristic {
    unsolvability_infos: Vec<UnsolvabilityInfo>,
}

impl UnsolvabilityHeuristic {
    /// Collects the unsolvable abstract states of every abstraction under
    /// `costs`.
    pub fn new<S>(abstractions: &Abstractions<S>, costs: &[Cost]) -> Self {
        let mut unsolvability_infos = Vec::new();
        for (index, abstraction) in abstractions.iter() {
            let h_values = abstraction.compute_goal_distances(costs);
            let mut unsolvable_states = FixedBitSet::with_capacity(h_values.len());
            for (state, &h) in h_values.iter().enumerate() {
                if h == INF {
                    unsolvable_states.insert(state);
                }
            }
            if !unsolvable_states.is_clear() {
                unsolvability_infos.push(UnsolvabilityInfo {
                    abstraction: index,
                    unsolvable_states,
                });
            }
        }
        Self { unsolvability_infos }
    }

    /// Returns `true` if some abstraction maps the state onto an unsolvable
    /// abstract state.
    #[inline]
    pub fn is_unsolvable(&self, abstract_state_ids: &[usize]) -> bool {
        self.unsolvability_infos
            .iter()
            .any(|info| info.unsolvable_states.contains(abstract_state_ids[info.abstraction.get()]))
    }

    /// Flags every abstraction that can certify a dead end.
    pub fn mark_useful_abstractions(&self, useful: &mut FixedBitSet) {
        for info in &self.unsolvability_infos {
            useful.insert(info.abstraction.get());
        }
    }

    /// Returns the number of abstractions with at least one unsolvable state.
    #[inline]
    pub fn num_certifying_abstractions(&self) -> usize {
        self.unsolvability_infos.len()
    }
}
