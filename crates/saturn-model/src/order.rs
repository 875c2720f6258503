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

//! Saturation orders.
//!
//! An `Order` is a sequence of distinct abstraction indices. Cost
//! partitioning functions process abstractions in this sequence, so the
//! order decides which abstraction gets to consume costs first. Internally
//! an order may be a partial prefix (for example a canonical systematic
//! order); before it is handed to a cost partitioning function it is
//! completed so that it contains every abstraction exactly once.
//!
//! Duplicates and out-of-range indices are contract violations. `Order::new`
//! rejects duplicates eagerly, and `assert_complete` checks the permutation
//! property against a concrete number of abstractions.

use crate::index::AbstractionIndex;
use fixedbitset::FixedBitSet;
use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Order {
    indices: Vec<AbstractionIndex>,
}

impl Order {
    /// Creates an order from distinct indices.
    ///
    /// # Panics
    ///
    /// Panics if `indices` contains a duplicate.
    pub fn new(indices: Vec<AbstractionIndex>) -> Self {
        let order = Self { indices };
        assert!(
            order.is_unique(),
            "called `Order::new` with duplicate abstraction indices: {order}"
        );
        order
    }

    /// Creates an order from raw indices.
    ///
    /// # Panics
    ///
    /// Panics if `indices` contains a duplicate.
    pub fn from_indices(indices: &[usize]) -> Self {
        Self::new(indices.iter().copied().map(AbstractionIndex::new).collect())
    }

    /// The identity order `0, 1, ..., num_abstractions - 1`.
    pub fn default_order(num_abstractions: usize) -> Self {
        Self {
            indices: AbstractionIndex::range(num_abstractions).collect(),
        }
    }

    /// A uniformly random permutation of all abstractions.
    pub fn random<R: Rng + ?Sized>(num_abstractions: usize, rng: &mut R) -> Self {
        let mut order = Self::default_order(num_abstractions);
        order.indices.shuffle(rng);
        order
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[AbstractionIndex] {
        &self.indices
    }

    #[inline]
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, AbstractionIndex>> {
        self.indices.iter().copied()
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<AbstractionIndex> {
        self.indices.get(position).copied()
    }

    /// Swaps the abstractions at two positions.
    ///
    /// # Panics
    ///
    /// Panics if a position is not within `0..len()`.
    #[inline]
    pub fn swap(&mut self, a: usize, b: usize) {
        self.indices.swap(a, b);
    }

    /// Returns `true` if no index occurs twice.
    pub fn is_unique(&self) -> bool {
        let bound = self.indices.iter().map(|i| i.get() + 1).max().unwrap_or(0);
        let mut seen = FixedBitSet::with_capacity(bound);
        self.indices.iter().all(|i| !seen.put(i.get()))
    }

    /// Returns `true` if this order is a permutation of `0..num_abstractions`.
    pub fn is_complete(&self, num_abstractions: usize) -> bool {
        self.len() == num_abstractions
            && self.indices.iter().all(|i| i.get() < num_abstractions)
            && self.is_unique()
    }

    /// Asserts that this order is a permutation of `0..num_abstractions`.
    ///
    /// # Panics
    ///
    /// Panics with a description of the order if it is not.
    #[inline]
    pub fn assert_complete(&self, num_abstractions: usize) {
        assert!(
            self.is_complete(num_abstractions),
            "order {self} is not a permutation of {num_abstractions} abstractions"
        );
    }

    /// Completes a partial order: keeps this order as a prefix and appends
    /// all missing abstractions in a freshly shuffled sequence.
    ///
    /// # Panics
    ///
    /// Panics if this order contains an index `>= num_abstractions`.
    pub fn complete_randomly<R: Rng + ?Sized>(&self, num_abstractions: usize, rng: &mut R) -> Order {
        let mut used = FixedBitSet::with_capacity(num_abstractions);
        for index in &self.indices {
            assert!(
                index.get() < num_abstractions,
                "called `Order::complete_randomly` with {index} out of range for {num_abstractions} abstractions"
            );
            used.insert(index.get());
        }

        let mut rest: Vec<AbstractionIndex> = AbstractionIndex::range(num_abstractions)
            .filter(|i| !used.contains(i.get()))
            .collect();
        rest.shuffle(rng);

        let mut indices = Vec::with_capacity(num_abstractions);
        indices.extend_from_slice(&self.indices);
        indices.extend(rest);
        Order { indices }
    }
}

impl<'a> IntoIterator for &'a Order {
    type Item = AbstractionIndex;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, AbstractionIndex>>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.indices.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", index.get())?;
        }
        write!(f, "]")
    }
}
