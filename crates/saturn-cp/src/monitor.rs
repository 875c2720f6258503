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

//! Monitoring interface for pool generation.
//!
//! The generator reports its progress through a `GenerationMonitor`: the
//! initial estimate, the drawn panel, every candidate partition and whether
//! it was admitted, and every optimized order. A monitor can also end the
//! generation early by returning `GenerationCommand::Terminate`; the
//! generator then behaves as if its time budget had run out, so the pool is
//! still never empty.
//!
//! `LogGenerationMonitor` forwards all events to `tracing`. No subscriber is
//! installed here; binaries decide where the events go.

use crate::config::GeneratorConfig;
use crate::optimizer::OptimizationTerminationReason;
use crate::stats::{GenerationStatistics, OptimizationStatistics};
use saturn_core::num::{Cost, INF};
use std::time::Duration;
use tracing::{debug, info};

/// The phase a candidate partition was computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationPhase {
    Systematic,
    Sampling,
}

impl std::fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationPhase::Systematic => write!(f, "systematic"),
            GenerationPhase::Sampling => write!(f, "sampling"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GenerationCommand {
    #[default]
    Continue,
    Terminate(String),
}

/// Observes a pool generation.
pub trait GenerationMonitor {
    /// Returns the name of the monitor.
    fn name(&self) -> &str;

    /// Called before anything is computed.
    fn on_start(&mut self, num_abstractions: usize, config: &GeneratorConfig);

    /// Called once the initial partition has been evaluated.
    fn on_initial_estimate(&mut self, init_h: Cost);

    /// Called once the diversification panel has been drawn.
    fn on_samples_drawn(&mut self, num_samples: usize, elapsed: Duration);

    /// Called for every computed candidate partition.
    fn on_candidate(&mut self, phase: GenerationPhase, admitted: bool, statistics: &GenerationStatistics);

    /// Called after an order has been improved by hill climbing.
    fn on_order_optimized(
        &mut self,
        reason: OptimizationTerminationReason,
        statistics: &OptimizationStatistics,
    );

    /// Called with the final statistics.
    fn on_end(&mut self, statistics: &GenerationStatistics);

    /// Decides whether the generation continues.
    fn generation_command(&mut self, _statistics: &GenerationStatistics) -> GenerationCommand {
        GenerationCommand::Continue
    }
}

impl std::fmt::Debug for dyn GenerationMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GenerationMonitor {{ name: {} }}", self.name())
    }
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NoOpGenerationMonitor;

impl GenerationMonitor for NoOpGenerationMonitor {
    fn name(&self) -> &str {
        "NoOpGenerationMonitor"
    }

    fn on_start(&mut self, _num_abstractions: usize, _config: &GeneratorConfig) {}

    fn on_initial_estimate(&mut self, _init_h: Cost) {}

    fn on_samples_drawn(&mut self, _num_samples: usize, _elapsed: Duration) {}

    fn on_candidate(&mut self, _phase: GenerationPhase, _admitted: bool, _statistics: &GenerationStatistics) {}

    fn on_order_optimized(
        &mut self,
        _reason: OptimizationTerminationReason,
        _statistics: &OptimizationStatistics,
    ) {
    }

    fn on_end(&mut self, _statistics: &GenerationStatistics) {}
}

/// Emits `tracing` events.
///
/// Start, panel, and end are logged at `info`; each candidate and optimized
/// order at `debug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LogGenerationMonitor;

impl GenerationMonitor for LogGenerationMonitor {
    fn name(&self) -> &str {
        "LogGenerationMonitor"
    }

    fn on_start(&mut self, num_abstractions: usize, config: &GeneratorConfig) {
        info!(num_abstractions, %config, "Generating cost partitionings");
    }

    fn on_initial_estimate(&mut self, init_h: Cost) {
        if init_h == INF {
            info!("Initial state is unsolvable");
        } else {
            info!(init_h, "Initial state estimate");
        }
    }

    fn on_samples_drawn(&mut self, num_samples: usize, elapsed: Duration) {
        info!(num_samples, ?elapsed, "Sampled states for diversification");
    }

    fn on_candidate(&mut self, phase: GenerationPhase, admitted: bool, statistics: &GenerationStatistics) {
        debug!(
            %phase,
            admitted,
            systematic_admitted = statistics.systematic_admitted,
            sampled_admitted = statistics.sampled_admitted,
            "Evaluated candidate cost partitioning"
        );
    }

    fn on_order_optimized(
        &mut self,
        reason: OptimizationTerminationReason,
        statistics: &OptimizationStatistics,
    ) {
        debug!(
            %reason,
            neighbors = statistics.neighbors_evaluated,
            improvements = statistics.improvements,
            "Optimized order"
        );
    }

    fn on_end(&mut self, statistics: &GenerationStatistics) {
        info!(
            pool_size = statistics.pool_size,
            pool_size_kb = statistics.pool_size_bytes / 1024,
            rejected = statistics.rejected_candidates(),
            time = ?statistics.time_total,
            "Finished generating cost partitionings"
        );
    }
}

/// Stops the generation once the pool holds `limit` members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolSizeLimitMonitor {
    limit: u64,
}

impl PoolSizeLimitMonitor {
    #[inline]
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }

    #[inline]
    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl GenerationMonitor for PoolSizeLimitMonitor {
    fn name(&self) -> &str {
        "PoolSizeLimitMonitor"
    }

    fn on_start(&mut self, _num_abstractions: usize, _config: &GeneratorConfig) {}

    fn on_initial_estimate(&mut self, _init_h: Cost) {}

    fn on_samples_drawn(&mut self, _num_samples: usize, _elapsed: Duration) {}

    fn on_candidate(&mut self, _phase: GenerationPhase, _admitted: bool, _statistics: &GenerationStatistics) {}

    fn on_order_optimized(
        &mut self,
        _reason: OptimizationTerminationReason,
        _statistics: &OptimizationStatistics,
    ) {
    }

    fn on_end(&mut self, _statistics: &GenerationStatistics) {}

    fn generation_command(&mut self, statistics: &GenerationStatistics) -> GenerationCommand {
        let admitted = statistics.systematic_admitted.saturating_add(statistics.sampled_admitted);
        if admitted >= self.limit {
            GenerationCommand::Terminate(format!(
                "Pool size limit reached: {} (admitted={})",
                self.limit, admitted
            ))
        } else {
            GenerationCommand::Continue
        }
    }
}
