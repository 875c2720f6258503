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

//! # Array Pool
//!
//! A compact representation of a large collection of arrays that are
//! appended individually but live and die together. All elements are stored
//! back to back in a single `Vec<T>`, and a second vector records where each
//! array starts. Compared to a `Vec<Vec<T>>` this saves one heap allocation
//! and one header per array and keeps consecutive arrays adjacent in memory.
//!
//! ## Highlights
//!
//! - `push` moves the elements of a vector into the shared buffer and returns
//!   the index of the new array. Indices are assigned sequentially.
//! - `slice` returns exactly the elements pushed at an index. Slices are
//!   computed from stored offsets against the current buffer; the borrow
//!   checker prevents holding a slice across a later `push`, which may
//!   reallocate the buffer.
//! - `reserve` is a pure capacity hint.
//!
//! ## Usage
//!
//! ```rust
//! use saturn_core::array_pool::ArrayPool;
//!
//! let mut pool = ArrayPool::new();
//! let a = pool.push(vec![1, 2, 3]);
//! let b = pool.push(vec![]);
//! let c = pool.push(vec![4]);
//!
//! assert_eq!(pool.len(), 3);
//! assert_eq!(pool.slice(a), &[1, 2, 3]);
//! assert!(pool.slice(b).is_empty());
//! assert_eq!(pool.slice(c), &[4]);
//! ```

/// Append-only storage for many arrays in one contiguous buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayPool<T> {
    data: Vec<T>,
    positions: Vec<usize>,
}

impl<T> Default for ArrayPool<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ArrayPool<T> {
    /// Creates an empty pool without allocating.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            positions: Vec::new(),
        }
    }

    /// Creates an empty pool with room for `num_arrays` arrays holding
    /// `total_entries` elements in total.
    #[inline]
    pub fn with_capacity(num_arrays: usize, total_entries: usize) -> Self {
        Self {
            data: Vec::with_capacity(total_entries),
            positions: Vec::with_capacity(num_arrays),
        }
    }

    /// Appends the elements of `array` as a new array and returns its index.
    #[inline]
    pub fn push(&mut self, array: Vec<T>) -> usize {
        let index = self.positions.len();
        self.positions.push(self.data.len());
        self.data.extend(array);
        index
    }

    /// Returns the elements pushed at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not within `0..len()`.
    #[inline]
    pub fn slice(&self, index: usize) -> &[T] {
        assert!(
            index < self.positions.len(),
            "called `ArrayPool::slice` with index out of bounds: the len is {} but the index is {}",
            self.positions.len(),
            index
        );

        let start = self.positions[index];
        let end = self
            .positions
            .get(index + 1)
            .copied()
            .unwrap_or(self.data.len());
        &self.data[start..end]
    }

    /// Reserves capacity for `num_arrays` further arrays with
    /// `total_entries` further elements.
    #[inline]
    pub fn reserve(&mut self, num_arrays: usize, total_entries: usize) {
        self.positions.reserve(num_arrays);
        self.data.reserve(total_entries);
    }

    /// Returns the number of arrays in the pool.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if no array has been pushed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns the total number of elements over all arrays.
    #[inline]
    pub fn num_entries(&self) -> usize {
        self.data.len()
    }

    /// Returns an iterator over all arrays in push order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        (0..self.len()).map(move |index| self.slice(index))
    }
}

impl<T> FromIterator<Vec<T>> for ArrayPool<T> {
    fn from_iter<I: IntoIterator<Item = Vec<T>>>(iter: I) -> Self {
        let mut pool = Self::new();
        for array in iter {
            pool.push(array);
        }
        pool
    }
}
