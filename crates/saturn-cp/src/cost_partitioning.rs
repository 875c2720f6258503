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

//! Cost partitioning heuristics.
//!
//! A `CostPartitioningHeuristic` is the result of one cost partitioning run:
//! for every abstraction it holds the abstract goal distances under that
//! abstraction's share of the operator costs. The heuristic value of a state
//! is the sum of the looked-up values of its abstract states, which is
//! admissible because the shares sum to at most the original costs.
//!
//! Tables consisting only of zeros contribute nothing and are not stored.
//! All stored tables live in a single `ArrayPool`, so a heuristic costs one
//! allocation for its values no matter how many abstractions it covers.
//!
//! Heuristics are immutable once built; the generator, the diversifier and
//! the runtime evaluator only ever read them.

use fixedbitset::FixedBitSet;
use saturn_core::array_pool::ArrayPool;
use saturn_core::num::{Cost, INF};
use saturn_model::index::AbstractionIndex;

/// The lookup tables of a single cost partitioning.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CostPartitioningHeuristic {
    // `abstraction_ids[i]` owns `h_values.slice(i)`.
    abstraction_ids: Vec<AbstractionIndex>,
    h_values: ArrayPool<Cost>,
}

impl CostPartitioningHeuristic {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the goal distances of `abstraction`.
    ///
    /// Tables whose values are all zero are dropped, since they cannot
    /// contribute to any estimate.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if a table for `abstraction` is already stored
    /// or if `h_values` contains a negative value.
    pub fn add_h_values(&mut self, abstraction: AbstractionIndex, h_values: Vec<Cost>) {
        debug_assert!(
            !self.abstraction_ids.contains(&abstraction),
            "called `CostPartitioningHeuristic::add_h_values` twice for {abstraction}"
        );
        debug_assert!(
            h_values.iter().all(|&h| h >= 0),
            "called `CostPartitioningHeuristic::add_h_values` with negative values for {abstraction}"
        );

        if h_values.iter().any(|&h| h != 0) {
            self.abstraction_ids.push(abstraction);
            self.h_values.push(h_values);
        }
    }

    /// Sums the stored values at the given abstract state ids.
    ///
    /// `abstract_state_ids[i]` must be the abstract state of the evaluated
    /// state in abstraction `i`. Returns `INF` as soon as any looked-up value
    /// is infinite.
    #[inline]
    pub fn compute_heuristic(&self, abstract_state_ids: &[usize]) -> Cost {
        let mut sum: Cost = 0;
        for (table, &abstraction) in self.abstraction_ids.iter().enumerate() {
            let h = self.h_values.slice(table)[abstract_state_ids[abstraction.get()]];
            debug_assert!(h >= 0);
            if h == INF {
                return INF;
            }
            sum = sum.saturating_add(h);
        }
        debug_assert!(sum < INF, "finite lookups summed to the infinite sentinel");
        sum
    }

    /// Returns the number of stored lookup tables.
    #[inline]
    pub fn num_lookup_tables(&self) -> usize {
        self.abstraction_ids.len()
    }

    /// Returns the number of stored values over all lookup tables.
    #[inline]
    pub fn num_heuristic_values(&self) -> usize {
        self.h_values.num_entries()
    }

    /// Returns an estimate of the memory held by this heuristic.
    pub fn estimate_size_in_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.num_lookup_tables()
                * (std::mem::size_of::<AbstractionIndex>() + std::mem::size_of::<usize>())
            + self.num_heuristic_values() * std::mem::size_of::<Cost>()
    }

    /// Returns `estimate_size_in_bytes` in whole kibibytes.
    #[inline]
    pub fn estimate_size_in_kb(&self) -> usize {
        self.estimate_size_in_bytes() / 1024
    }

    /// Flags every abstraction that has a stored lookup table.
    ///
    /// # Panics
    ///
    /// Panics if `useful` is too short for a stored abstraction.
    pub fn mark_useful_abstractions(&self, useful: &mut FixedBitSet) {
        for abstraction in &self.abstraction_ids {
            useful.insert(abstraction.get());
        }
    }

    /// Iterates over the stored tables together with their abstractions.
    pub fn lookup_tables(&self) -> impl ExactSizeIterator<Item = (AbstractionIndex, &[Cost])> + '_ {
        self.abstraction_ids.iter().copied().zip(self.h_values.iter())
    }

    /// Returns the stored table of `abstraction`, if any.
    pub fn lookup_table(&self, abstraction: AbstractionIndex) -> Option<&[Cost]> {
        self.abstraction_ids
            .iter()
            .position(|&a| a == abstraction)
            .map(|table| self.h_values.slice(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(i: usize) -> AbstractionIndex {
        AbstractionIndex::new(i)
    }

    #[test]
    fn test_zero_tables_are_not_stored() {
        let mut cp = CostPartitioningHeuristic::new();
        cp.add_h_values(idx(0), vec![0, 0, 0]);
        cp.add_h_values(idx(1), vec![3, 0]);
        assert_eq!(cp.num_lookup_tables(), 1);
        assert_eq!(cp.num_heuristic_values(), 2);
        assert_eq!(cp.lookup_table(idx(0)), None);
        assert_eq!(cp.lookup_table(idx(1)), Some(&[3, 0][..]));
    }

    #[test]
    fn test_compute_heuristic_sums_tables() {
        let mut cp = CostPartitioningHeuristic::new();
        cp.add_h_values(idx(2), vec![1, 4]);
        cp.add_h_values(idx(0), vec![5, 0, 2]);
        // ids per abstraction: a0 -> 2, a1 -> whatever, a2 -> 1
        assert_eq!(cp.compute_heuristic(&[2, 7, 1]), 6);
        assert_eq!(cp.compute_heuristic(&[1, 7, 0]), 1);
    }

    #[test]
    fn test_compute_heuristic_is_infinite_on_dead_end() {
        let mut cp = CostPartitioningHeuristic::new();
        cp.add_h_values(idx(0), vec![1, INF]);
        cp.add_h_values(idx(1), vec![7, 7]);
        assert_eq!(cp.compute_heuristic(&[1, 0]), INF);
        assert_eq!(cp.compute_heuristic(&[0, 0]), 8);
    }

    #[test]
    fn test_empty_heuristic_is_zero() {
        let cp = CostPartitioningHeuristic::new();
        assert_eq!(cp.compute_heuristic(&[0, 0]), 0);
        assert_eq!(cp.num_lookup_tables(), 0);
        assert_eq!(cp.estimate_size_in_bytes(), std::mem::size_of::<CostPartitioningHeuristic>());
    }

    #[test]
    fn test_size_estimate_grows_with_values() {
        let mut small = CostPartitioningHeuristic::new();
        small.add_h_values(idx(0), vec![1; 10]);
        let mut large = CostPartitioningHeuristic::new();
        large.add_h_values(idx(0), vec![1; 1000]);
        assert!(large.estimate_size_in_bytes() > small.estimate_size_in_bytes());
        assert_eq!(
            large.estimate_size_in_bytes() - small.estimate_size_in_bytes(),
            990 * std::mem::size_of::<Cost>()
        );
        assert!(large.estimate_size_in_kb() >= 3);
    }

    #[test]
    fn test_mark_useful_abstractions() {
        let mut cp = CostPartitioningHeuristic::new();
        cp.add_h_values(idx(1), vec![1]);
        cp.add_h_values(idx(3), vec![0]);
        let mut useful = FixedBitSet::with_capacity(4);
        cp.mark_useful_abstractions(&mut useful);
        assert_eq!(useful.ones().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_lookup_tables_iterates_in_insertion_order() {
        let mut cp = CostPartitioningHeuristic::new();
        cp.add_h_values(idx(4), vec![2]);
        cp.add_h_values(idx(1), vec![0, 9]);
        let tables: Vec<(usize, Vec<Cost>)> = cp.lookup_tables().map(|(a, t)| (a.get(), t.to_vec())).collect();
        assert_eq!(tables, vec![(4, vec![2]), (1, vec![0, 9])]);
    }
}
