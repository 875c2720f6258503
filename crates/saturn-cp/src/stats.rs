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

//! Statistics for pool generation, order optimization, and evaluation.
//!
//! All counters are updated with saturating arithmetic so they can be bumped
//! from inner loops without overflow checks. Each container implements
//! `Display` for a human-readable summary; monitors log these summaries.

use std::time::Duration;

/// Counters of a single hill-climbing run, also accumulated over a whole
/// generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OptimizationStatistics {
    /// Neighbor orders whose partition was computed and evaluated.
    pub neighbors_evaluated: u64,

    /// Neighbors that replaced the incumbent.
    pub improvements: u64,

    /// Time spent climbing.
    pub time_total: Duration,
}

impl OptimizationStatistics {
    #[inline]
    pub fn on_neighbor_evaluated(&mut self) {
        self.neighbors_evaluated = self.neighbors_evaluated.saturating_add(1);
    }

    #[inline]
    pub fn on_improvement(&mut self) {
        self.improvements = self.improvements.saturating_add(1);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }

    /// Adds the counters of `other` to these.
    #[inline]
    pub fn merge(&mut self, other: &OptimizationStatistics) {
        self.neighbors_evaluated = self.neighbors_evaluated.saturating_add(other.neighbors_evaluated);
        self.improvements = self.improvements.saturating_add(other.improvements);
        self.time_total = self.time_total.saturating_add(other.time_total);
    }
}

impl std::fmt::Display for OptimizationStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Order Optimization Statistics:")?;
        writeln!(f, "   Neighbors Evaluated: {}", self.neighbors_evaluated)?;
        writeln!(f, "   Improvements:        {}", self.improvements)?;
        writeln!(f, "   Total Time:          {:?}", self.time_total)?;
        Ok(())
    }
}

/// Counters of one pool generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GenerationStatistics {
    /// Size of the diversification panel, including the initial state.
    pub num_samples: u64,

    /// Completed systematic orders whose partition was computed.
    pub systematic_candidates: u64,

    /// Systematic partitions admitted to the pool.
    pub systematic_admitted: u64,

    /// Candidates of the sampling phase whose partition was computed.
    pub sampled_candidates: u64,

    /// Sampling-phase partitions admitted to the pool.
    pub sampled_admitted: u64,

    /// Orders that were handed to the hill climber.
    pub optimized_orders: u64,

    /// Hill-climbing counters summed over all optimized orders.
    pub optimization: OptimizationStatistics,

    /// Members of the returned pool.
    pub pool_size: u64,

    /// Estimated memory of the returned pool.
    pub pool_size_bytes: u64,

    /// Time spent drawing the panel.
    pub time_sampling: Duration,

    /// Time spent in the systematic phase.
    pub time_systematic: Duration,

    /// Wall-clock time of the whole generation.
    pub time_total: Duration,
}

impl GenerationStatistics {
    #[inline]
    pub fn on_systematic_candidate(&mut self, admitted: bool) {
        self.systematic_candidates = self.systematic_candidates.saturating_add(1);
        if admitted {
            self.systematic_admitted = self.systematic_admitted.saturating_add(1);
        }
    }

    #[inline]
    pub fn on_sampled_candidate(&mut self, admitted: bool) {
        self.sampled_candidates = self.sampled_candidates.saturating_add(1);
        if admitted {
            self.sampled_admitted = self.sampled_admitted.saturating_add(1);
        }
    }

    #[inline]
    pub fn on_order_optimized(&mut self, statistics: &OptimizationStatistics) {
        self.optimized_orders = self.optimized_orders.saturating_add(1);
        self.optimization.merge(statistics);
    }

    /// Candidates that were computed but not admitted.
    #[inline]
    pub fn rejected_candidates(&self) -> u64 {
        let candidates = self.systematic_candidates.saturating_add(self.sampled_candidates);
        let admitted = self.systematic_admitted.saturating_add(self.sampled_admitted);
        candidates.saturating_sub(admitted)
    }
}

impl std::fmt::Display for GenerationStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cost Partitioning Generation Statistics:")?;
        writeln!(f, "   Samples:               {}", self.num_samples)?;
        writeln!(
            f,
            "   Systematic Orders:     {} admitted / {} computed",
            self.systematic_admitted, self.systematic_candidates
        )?;
        writeln!(
            f,
            "   Sampled Orders:        {} admitted / {} computed",
            self.sampled_admitted, self.sampled_candidates
        )?;
        writeln!(f, "   Rejected Orders:       {}", self.rejected_candidates())?;
        writeln!(f, "   Optimized Orders:      {}", self.optimized_orders)?;
        writeln!(f, "   Neighbors Evaluated:   {}", self.optimization.neighbors_evaluated)?;
        writeln!(f, "   Improving Neighbors:   {}", self.optimization.improvements)?;
        writeln!(f, "   Pool Size:             {}", self.pool_size)?;
        writeln!(f, "   Pool Size (KiB):       {}", self.pool_size_bytes / 1024)?;
        writeln!(f, "   Sampling Time:         {:?}", self.time_sampling)?;
        writeln!(f, "   Systematic Time:       {:?}", self.time_systematic)?;
        writeln!(f, "   Total Time:            {:?}", self.time_total)?;
        Ok(())
    }
}

/// Memory diagnostics of a runtime evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EvaluatorStatistics {
    pub num_orders: usize,
    pub num_abstractions: usize,
    pub num_useful_abstractions: usize,
    pub num_stored_lookup_tables: usize,
    pub num_possible_lookup_tables: usize,
    pub num_stored_values: usize,
    pub num_possible_values: usize,
}

impl EvaluatorStatistics {
    /// Percentage of `part` in `whole`; `0.0` for an empty whole.
    #[inline]
    fn percentage(part: usize, whole: usize) -> f64 {
        if whole == 0 {
            0.0
        } else {
            part as f64 / whole as f64 * 100.0
        }
    }

    #[inline]
    pub fn stored_lookup_tables_percentage(&self) -> f64 {
        Self::percentage(self.num_stored_lookup_tables, self.num_possible_lookup_tables)
    }

    #[inline]
    pub fn stored_values_percentage(&self) -> f64 {
        Self::percentage(self.num_stored_values, self.num_possible_values)
    }
}

impl std::fmt::Display for EvaluatorStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cost Partitioning Evaluator Statistics:")?;
        writeln!(f, "   Orders:                {}", self.num_orders)?;
        writeln!(
            f,
            "   Useful Abstractions:   {}/{}",
            self.num_useful_abstractions, self.num_abstractions
        )?;
        writeln!(
            f,
            "   Stored Lookup Tables:  {}/{} = {:.2}%",
            self.num_stored_lookup_tables,
            self.num_possible_lookup_tables,
            self.stored_lookup_tables_percentage()
        )?;
        writeln!(
            f,
            "   Stored Values:         {}/{} = {:.2}%",
            self.num_stored_values,
            self.num_possible_values,
            self.stored_values_percentage()
        )?;
        Ok(())
    }
}
