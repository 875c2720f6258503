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

//! Diversification of cost partitioning pools.
//!
//! The diversifier keeps a fixed panel of sample states, given by their
//! abstract state ids, and for every sample the best heuristic value any
//! admitted partition has achieved so far. A candidate partition is diverse
//! if it beats this value on at least one sample. Admitting only diverse
//! partitions keeps the pool small without giving up estimates that the
//! samples show to be valuable.
//!
//! Best-known values start out unknown (`-1`), never decrease, and an entry
//! that reaches `INF` is final.

use crate::cost_partitioning::CostPartitioningHeuristic;
use saturn_core::array_pool::ArrayPool;
use saturn_core::num::{Cost, INF};

/// The best-known value of a sample that no partition has been scored on.
pub const UNKNOWN_H_VALUE: Cost = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diversifier {
    sample_ids: ArrayPool<usize>,
    best_known_values: Vec<Cost>,
}

impl Diversifier {
    /// Creates a diversifier for a panel of abstract state id vectors. By
    /// convention, the first entry belongs to the initial state.
    ///
    /// # Panics
    ///
    /// Panics if `panel` is empty.
    pub fn new(panel: Vec<Vec<usize>>) -> Self {
        assert!(!panel.is_empty(), "called `Diversifier::new` with an empty sample panel");

        let num_samples = panel.len();
        let total_ids = panel.iter().map(Vec::len).sum();
        let mut sample_ids = ArrayPool::with_capacity(num_samples, total_ids);
        for ids in panel {
            sample_ids.push(ids);
        }

        Self {
            sample_ids,
            best_known_values: vec![UNKNOWN_H_VALUE; num_samples],
        }
    }

    /// Scores `cp` on every sample and returns `true` if it beats the
    /// best-known value on at least one. In that case every improved value
    /// is raised; otherwise nothing changes.
    pub fn is_diverse(&mut self, cp: &CostPartitioningHeuristic) -> bool {
        let scores = self.score(cp);
        let is_diverse = self.improves(&scores);
        if is_diverse {
            self.raise(&scores);
        }
        is_diverse
    }

    /// Evaluates `cp` on every sample without touching the best-known
    /// values.
    pub fn score(&self, cp: &CostPartitioningHeuristic) -> Vec<Cost> {
        self.sample_ids.iter().map(|ids| cp.compute_heuristic(ids)).collect()
    }

    /// Returns `true` if `scores` beat the best-known value on at least one
    /// sample.
    #[inline]
    pub fn improves(&self, scores: &[Cost]) -> bool {
        debug_assert_eq!(scores.len(), self.num_samples());
        scores.iter().zip(&self.best_known_values).any(|(&h, &best)| h > best)
    }

    /// Raises every best-known value that `scores` beat.
    pub fn raise(&mut self, scores: &[Cost]) {
        debug_assert_eq!(scores.len(), self.num_samples());
        for (&h, best) in scores.iter().zip(self.best_known_values.iter_mut()) {
            if h > *best {
                debug_assert!(*best != INF);
                *best = h;
            }
        }
    }

    /// The mean best-known value over samples whose value is known and
    /// finite, or `0.0` if there are none.
    pub fn compute_avg_finite_sample_h_value(&self) -> f64 {
        let (sum, count) = self
            .best_known_values
            .iter()
            .filter(|&&h| h != UNKNOWN_H_VALUE && h != INF)
            .fold((0.0, 0usize), |(sum, count), &h| (sum + f64::from(h), count + 1));
        if count == 0 { 0.0 } else { sum / count as f64 }
    }

    #[inline]
    pub fn num_samples(&self) -> usize {
        self.best_known_values.len()
    }

    #[inline]
    pub fn best_known_values(&self) -> &[Cost] {
        &self.best_known_values
    }

    /// Returns the abstract state ids of sample `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not within `0..num_samples()`.
    #[inline]
    pub fn sample(&self, index: usize) -> &[usize] {
        self.sample_ids.slice(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use saturn_model::index::AbstractionIndex;

    // A partition with a single table over abstraction 0 whose value at
    // abstract state `i` is `values[i]`. Sample `i` maps onto state `i`.
    fn scoring(values: &[Cost]) -> CostPartitioningHeuristic {
        let mut cp = CostPartitioningHeuristic::new();
        cp.add_h_values(AbstractionIndex::new(0), values.to_vec());
        cp
    }

    fn panel(n: usize) -> Vec<Vec<usize>> {
        (0..n).map(|i| vec![i]).collect()
    }

    #[test]
    fn test_first_candidate_is_always_diverse() {
        let mut diversifier = Diversifier::new(panel(2));
        assert_eq!(diversifier.best_known_values(), &[UNKNOWN_H_VALUE, UNKNOWN_H_VALUE]);
        // An all-zero partition still beats the unknown value.
        assert!(diversifier.is_diverse(&CostPartitioningHeuristic::new()));
        assert_eq!(diversifier.best_known_values(), &[0, 0]);
    }

    #[test]
    fn test_improvement_on_one_sample_suffices() {
        let mut diversifier = Diversifier::new(panel(3));
        assert!(diversifier.is_diverse(&scoring(&[5, INF, 2])));
        assert_eq!(diversifier.best_known_values(), &[5, INF, 2]);

        assert!(diversifier.is_diverse(&scoring(&[5, INF, 3])));
        assert_eq!(diversifier.best_known_values(), &[5, INF, 3]);

        assert!(!diversifier.is_diverse(&scoring(&[4, INF, 2])));
        assert_eq!(diversifier.best_known_values(), &[5, INF, 3]);
    }

    #[test]
    fn test_regressions_elsewhere_are_ignored() {
        let mut diversifier = Diversifier::new(panel(2));
        assert!(diversifier.is_diverse(&scoring(&[4, 4])));
        assert!(diversifier.is_diverse(&scoring(&[1, 6])));
        assert_eq!(diversifier.best_known_values(), &[4, 6]);
    }

    #[test]
    fn test_average_ignores_infinite_and_unknown() {
        let mut diversifier = Diversifier::new(panel(3));
        assert_eq!(diversifier.compute_avg_finite_sample_h_value(), 0.0);
        diversifier.is_diverse(&scoring(&[5, INF, 2]));
        assert!((diversifier.compute_avg_finite_sample_h_value() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_average_is_zero_when_all_infinite() {
        let mut diversifier = Diversifier::new(panel(1));
        diversifier.is_diverse(&scoring(&[INF]));
        assert_eq!(diversifier.compute_avg_finite_sample_h_value(), 0.0);
    }

    #[test]
    fn test_samples_are_kept_verbatim() {
        let diversifier = Diversifier::new(vec![vec![0, 3], vec![2, 1]]);
        assert_eq!(diversifier.num_samples(), 2);
        assert_eq!(diversifier.sample(1), &[2, 1]);
    }

    #[test]
    fn test_scoring_leaves_values_untouched() {
        let mut diversifier = Diversifier::new(panel(2));
        diversifier.is_diverse(&scoring(&[3, 1]));

        let scores = diversifier.score(&scoring(&[2, 7]));
        assert_eq!(scores, vec![2, 7]);
        assert!(diversifier.improves(&scores));
        assert_eq!(diversifier.best_known_values(), &[3, 1]);

        diversifier.raise(&scores);
        assert_eq!(diversifier.best_known_values(), &[3, 7]);
    }

    #[test]
    #[should_panic(expected = "empty sample panel")]
    fn test_empty_panel_panics() {
        let _ = Diversifier::new(Vec::new());
    }

    fn sample_value() -> impl Strategy<Value = Cost> {
        prop_oneof![4 => 0..50, 1 => Just(INF)]
    }

    proptest! {
        #[test]
        fn best_known_values_only_rise(
            candidates in prop::collection::vec(prop::collection::vec(sample_value(), 4), 1..12)
        ) {
            let mut diversifier = Diversifier::new(panel(4));
            for values in &candidates {
                let before = diversifier.best_known_values().to_vec();
                let is_diverse = diversifier.is_diverse(&scoring(values));
                let after = diversifier.best_known_values();

                for i in 0..4 {
                    prop_assert!(after[i] >= before[i]);
                    if before[i] == INF {
                        prop_assert_eq!(after[i], INF);
                    }
                    prop_assert_eq!(after[i], before[i].max(values[i]));
                }
                prop_assert_eq!(is_diverse, values.iter().zip(&before).any(|(&h, &best)| h > best));
                if !is_diverse {
                    prop_assert_eq!(after, before.as_slice());
                }
            }
        }
    }
}
