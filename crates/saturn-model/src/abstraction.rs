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

//! Abstraction interfaces and the owning abstraction arena.
//!
//! An abstraction maps every concrete state of a task onto one of finitely
//! many abstract states. Goal distances in the abstract transition system are
//! admissible estimates for the concrete states mapped onto them. Cost
//! partitioning only needs three things from an abstraction: goal distances
//! under a given operator cost function, the saturated costs that preserve a
//! given vector of goal distances, and the state mapping itself.
//!
//! Construction-time data such as transition systems are expensive to keep
//! around. `Abstraction::into_mapping_function` consumes the abstraction and
//! returns only the mapping, so a runtime heuristic can drop everything else.

use crate::index::AbstractionIndex;
use fixedbitset::FixedBitSet;
use saturn_core::num::Cost;

/// Maps concrete states onto abstract state ids.
pub trait MappingFunction<S> {
    fn abstract_state_id(&self, state: &S) -> usize;
}

impl<S, F> MappingFunction<S> for F
where
    F: Fn(&S) -> usize,
{
    #[inline]
    fn abstract_state_id(&self, state: &S) -> usize {
        self(state)
    }
}

/// A finite abstraction of a planning task over concrete states `S`.
pub trait Abstraction<S> {
    /// Returns the number of abstract states.
    fn num_states(&self) -> usize;

    /// Maps a concrete state onto its abstract state id.
    fn abstract_state_id(&self, state: &S) -> usize;

    /// Computes the goal distance of every abstract state under `costs`.
    ///
    /// Abstract states from which no goal state is reachable get `INF`.
    fn compute_goal_distances(&self, costs: &[Cost]) -> Vec<Cost>;

    /// Computes the minimal operator costs that preserve `h_values`.
    ///
    /// If `h_values` are the goal distances under some cost function `c`,
    /// the result is bounded by `c` component-wise.
    fn compute_saturated_costs(&self, h_values: &[Cost], num_operators: usize) -> Vec<Cost>;

    /// Operators inducing state-changing transitions.
    fn active_operators(&self) -> &[usize];

    /// Operators inducing self-loops. May overlap with the active operators.
    fn looping_operators(&self) -> &[usize];

    /// Abstract goal states.
    fn goal_states(&self) -> &[usize];

    /// Consumes the abstraction, keeping only its state mapping.
    fn into_mapping_function(self: Box<Self>) -> Box<dyn MappingFunction<S>>;
}

/// The arena owning all abstractions of a task, addressed by
/// `AbstractionIndex`.
pub struct Abstractions<S> {
    abstractions: Vec<Box<dyn Abstraction<S>>>,
}

impl<S> Abstractions<S> {
    #[inline]
    pub fn new(abstractions: Vec<Box<dyn Abstraction<S>>>) -> Self {
        Self { abstractions }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.abstractions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.abstractions.is_empty()
    }

    /// Returns the abstraction at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not within `0..len()`.
    #[inline]
    pub fn get(&self, index: AbstractionIndex) -> &dyn Abstraction<S> {
        self.abstractions[index.get()].as_ref()
    }

    /// Iterates over all abstractions together with their indices.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (AbstractionIndex, &dyn Abstraction<S>)> {
        self.abstractions
            .iter()
            .enumerate()
            .map(|(i, a)| (AbstractionIndex::new(i), a.as_ref()))
    }

    /// Iterates over the indices `0..len()`.
    #[inline]
    pub fn indices(&self) -> impl ExactSizeIterator<Item = AbstractionIndex> {
        AbstractionIndex::range(self.len())
    }

    /// Returns the sum of the abstract state counts.
    pub fn total_num_states(&self) -> usize {
        self.abstractions.iter().map(|a| a.num_states()).sum()
    }

    /// Maps `state` through every abstraction.
    pub fn abstract_state_ids(&self, state: &S) -> Vec<usize> {
        let mut ids = Vec::with_capacity(self.len());
        self.abstract_state_ids_into(state, &mut ids);
        ids
    }

    /// Maps `state` through every abstraction, reusing `ids`.
    pub fn abstract_state_ids_into(&self, state: &S, ids: &mut Vec<usize>) {
        ids.clear();
        ids.extend(self.abstractions.iter().map(|a| a.abstract_state_id(state)));
    }

    /// Consumes the arena. Abstractions flagged in `useful` are turned into
    /// their mapping functions; all others are dropped and leave `None`.
    ///
    /// # Panics
    ///
    /// Panics if `useful` has fewer bits than there are abstractions.
    pub fn into_mapping_functions(
        self,
        useful: &FixedBitSet,
    ) -> Vec<Option<Box<dyn MappingFunction<S>>>> {
        assert!(
            useful.len() >= self.len(),
            "called `Abstractions::into_mapping_functions` with {} usefulness flags for {} abstractions",
            useful.len(),
            self.len()
        );

        self.abstractions
            .into_iter()
            .enumerate()
            .map(|(i, abstraction)| useful[i].then(|| abstraction.into_mapping_function()))
            .collect()
    }
}

impl<S> std::ops::Index<AbstractionIndex> for Abstractions<S> {
    type Output = dyn Abstraction<S>;

    #[inline]
    fn index(&self, index: AbstractionIndex) -> &Self::Output {
        self.abstractions[index.get()].as_ref()
    }
}

impl<S> FromIterator<Box<dyn Abstraction<S>>> for Abstractions<S> {
    fn from_iter<I: IntoIterator<Item = Box<dyn Abstraction<S>>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<S> std::fmt::Debug for Abstractions<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Abstractions")
            .field("num_abstractions", &self.len())
            .field("total_num_states", &self.total_num_states())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explicit::{ExplicitAbstraction, Transition};

    // Two-state chain 1 -> 0 on operator `op`, goal 0, mapping by modulo.
    fn chain(op: usize, modulus: usize) -> Box<dyn Abstraction<usize>> {
        Box::new(ExplicitAbstraction::new(
            2,
            vec![Transition::new(1, op, 0)],
            vec![],
            vec![0],
            move |s: &usize| s % modulus % 2,
        ))
    }

    #[test]
    fn test_arena_indexing_and_ids() {
        let abstractions: Abstractions<usize> = vec![chain(0, 2), chain(1, 3)].into_iter().collect();
        assert_eq!(abstractions.len(), 2);
        assert_eq!(abstractions.total_num_states(), 4);
        assert_eq!(abstractions[AbstractionIndex::new(1)].active_operators(), &[1]);
        assert_eq!(abstractions.get(AbstractionIndex::new(0)).num_states(), 2);

        // 5 % 2 % 2 = 1, 5 % 3 % 2 = 0
        assert_eq!(abstractions.abstract_state_ids(&5), vec![1, 0]);

        let indices: Vec<usize> = abstractions.indices().map(AbstractionIndex::get).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_into_mapping_functions_keeps_only_useful() {
        let abstractions: Abstractions<usize> =
            vec![chain(0, 2), chain(1, 3), chain(2, 4)].into_iter().collect();
        let mut useful = FixedBitSet::with_capacity(3);
        useful.insert(0);
        useful.insert(2);

        let functions = abstractions.into_mapping_functions(&useful);
        assert_eq!(functions.len(), 3);
        assert!(functions[1].is_none());
        let f0 = functions[0].as_ref().expect("useful abstraction keeps its mapping");
        let f2 = functions[2].as_ref().expect("useful abstraction keeps its mapping");
        assert_eq!(f0.abstract_state_id(&3), 1);
        assert_eq!(f2.abstract_state_id(&6), 0);
    }

    #[test]
    #[should_panic(expected = "usefulness flags")]
    fn test_into_mapping_functions_rejects_short_bitset() {
        let abstractions: Abstractions<usize> = vec![chain(0, 2), chain(1, 2)].into_iter().collect();
        let useful = FixedBitSet::with_capacity(1);
        let _ = abstractions.into_mapping_functions(&useful);
    }

    #[test]
    fn test_closures_are_mapping_functions() {
        let f = |s: &usize| s * 2;
        assert_eq!(MappingFunction::abstract_state_id(&f, &4), 8);
    }
}
