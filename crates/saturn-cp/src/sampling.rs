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

//! State sampling.
//!
//! The generator samples states to fill the diversification panel and to
//! pick states for which new orders are computed. `RandomWalkSampler`
//! performs random walks from the initial state whose length is drawn from
//! a binomial distribution scaled by the initial estimate, so that typical
//! walks end roughly in the middle of a plan.

use rand::Rng;
use saturn_core::num::{Cost, INF};
use saturn_model::task::TransitionModel;

/// Walk length parameter used when the initial estimate carries no
/// information.
pub const DEFAULT_WALK_LENGTH_TRIALS: u64 = 10;

/// Produces sample states.
pub trait Sampler<S> {
    /// Samples a state. `init_h` is the initial state's estimate and
    /// `is_dead_end` recognizes states that should not be returned.
    fn sample_state(&mut self, init_h: Cost, is_dead_end: &dyn Fn(&S) -> bool) -> S;
}

/// Random walks over a `TransitionModel`.
#[derive(Debug, Clone)]
pub struct RandomWalkSampler<'a, M, R> {
    model: &'a M,
    rng: R,
}

impl<'a, M, R: Rng> RandomWalkSampler<'a, M, R> {
    #[inline]
    pub fn new(model: &'a M, rng: R) -> Self {
        Self { model, rng }
    }

    /// The number of Bernoulli trials of the walk length distribution:
    /// four times the initial estimate in units of the average operator
    /// cost, rounded.
    pub fn walk_length_trials(init_h: Cost, average_operator_cost: f64) -> u64 {
        debug_assert!(init_h != INF, "random walks need a finite initial estimate");
        if init_h <= 0 || average_operator_cost <= 0.0 || !average_operator_cost.is_finite() {
            return DEFAULT_WALK_LENGTH_TRIALS;
        }
        (4.0 * f64::from(init_h) / average_operator_cost).round() as u64
    }

}

impl<S, M, R> Sampler<S> for RandomWalkSampler<'_, M, R>
where
    M: TransitionModel<S>,
    R: Rng,
{
    fn sample_state(&mut self, init_h: Cost, is_dead_end: &dyn Fn(&S) -> bool) -> S {
        let trials = Self::walk_length_trials(init_h, self.model.average_operator_cost());

        // Each successful trial is one step, so the number of steps follows
        // `Binomial(trials, 0.5)` and the walk stops at its first state
        // without successors.
        let mut state = self.model.initial_state();
        let mut successors = Vec::new();
        for _ in 0..trials {
            if !self.rng.random_bool(0.5) {
                continue;
            }
            successors.clear();
            self.model.successors(&state, &mut successors);
            if successors.is_empty() {
                break;
            }
            let pick = self.rng.random_range(0..successors.len());
            state = successors.swap_remove(pick);
            if is_dead_end(&state) {
                state = self.model.initial_state();
            }
        }
        state
    }
}
