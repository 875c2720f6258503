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

//! The state-level heuristic interface.
//!
//! `Heuristic` is what an outer search consumes: a state goes in, an
//! admissible estimate comes out, with `INF` marking proven dead ends.
//! Implementations keep their own diagnostic counters, hence `&mut self`.

use saturn_core::num::Cost;

/// An admissible estimator of the remaining cost of a state.
pub trait Heuristic<S> {
    /// Returns the name of the heuristic.
    fn name(&self) -> &str;

    /// Estimates the cost of reaching a goal from `state`.
    ///
    /// Returns `INF` if the state is recognized as a dead end.
    fn estimate(&mut self, state: &S) -> Cost;

    /// Logs the counters collected while estimating.
    fn report_statistics(&self) {}
}

impl<S> std::fmt::Debug for dyn Heuristic<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Heuristic {{ name: {} }}", self.name())
    }
}
