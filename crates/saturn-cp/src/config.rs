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

//! Configuration of pool generation and of the online heuristic.
//!
//! `GeneratorConfig` is immutable and always valid; it is obtained from a
//! `GeneratorConfigBuilder`, whose `build` rejects settings the generator
//! cannot honor. Limits that are not set stay unlimited.

use std::time::Duration;
use thiserror::Error;

/// Default wall-clock budget of a generation.
pub const DEFAULT_MAX_TIME: Duration = Duration::from_secs(200);

/// Default size of the diversification panel.
pub const DEFAULT_NUM_SAMPLES: usize = 1000;

/// Default hill-climbing budget per order.
pub const DEFAULT_MAX_OPTIMIZATION_TIME: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum GeneratorConfigError {
    #[error("max_orders must be at least 1")]
    ZeroMaxOrders,
    #[error("num_samples must be at least 1")]
    ZeroSamples,
}

/// Limits and switches of a pool generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeneratorConfig {
    max_orders: usize,
    max_size_kb: usize,
    max_time: Duration,
    diversify: bool,
    num_samples: usize,
    max_optimization_time: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_orders: usize::MAX,
            max_size_kb: usize::MAX,
            max_time: DEFAULT_MAX_TIME,
            diversify: true,
            num_samples: DEFAULT_NUM_SAMPLES,
            max_optimization_time: DEFAULT_MAX_OPTIMIZATION_TIME,
        }
    }
}

impl GeneratorConfig {
    #[inline]
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::new()
    }

    /// Maximum number of pool members.
    #[inline]
    pub fn max_orders(&self) -> usize {
        self.max_orders
    }

    /// Maximum accumulated size of the partitions admitted after the
    /// systematic phase.
    #[inline]
    pub fn max_size_kb(&self) -> usize {
        self.max_size_kb
    }

    /// `max_size_kb` in bytes, saturating.
    #[inline]
    pub fn max_size_bytes(&self) -> usize {
        self.max_size_kb.saturating_mul(1024)
    }

    #[inline]
    pub fn max_time(&self) -> Duration {
        self.max_time
    }

    #[inline]
    pub fn diversify(&self) -> bool {
        self.diversify
    }

    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    #[inline]
    pub fn max_optimization_time(&self) -> Duration {
        self.max_optimization_time
    }
}

impl std::fmt::Display for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let limit = |value: usize| {
            if value == usize::MAX {
                "unlimited".to_string()
            } else {
                value.to_string()
            }
        };
        write!(
            f,
            "GeneratorConfig(max_orders: {}, max_size_kb: {}, max_time: {:?}, diversify: {}, num_samples: {}, max_optimization_time: {:?})",
            limit(self.max_orders),
            limit(self.max_size_kb),
            self.max_time,
            self.diversify,
            self.num_samples,
            self.max_optimization_time
        )
    }
}

/// Builder for `GeneratorConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn max_orders(mut self, max_orders: usize) -> Self {
        self.config.max_orders = max_orders;
        self
    }

    #[inline]
    pub fn max_size_kb(mut self, max_size_kb: usize) -> Self {
        self.config.max_size_kb = max_size_kb;
        self
    }

    #[inline]
    pub fn max_time(mut self, max_time: Duration) -> Self {
        self.config.max_time = max_time;
        self
    }

    #[inline]
    pub fn diversify(mut self, diversify: bool) -> Self {
        self.config.diversify = diversify;
        self
    }

    #[inline]
    pub fn num_samples(mut self, num_samples: usize) -> Self {
        self.config.num_samples = num_samples;
        self
    }

    #[inline]
    pub fn max_optimization_time(mut self, max_optimization_time: Duration) -> Self {
        self.config.max_optimization_time = max_optimization_time;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> Result<GeneratorConfig, GeneratorConfigError> {
        if self.config.max_orders == 0 {
            return Err(GeneratorConfigError::ZeroMaxOrders);
        }
        if self.config.num_samples == 0 {
            return Err(GeneratorConfigError::ZeroSamples);
        }
        Ok(self.config)
    }
}

/// Settings of the online heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OnlineConfig {
    /// Whether improving partitions are kept for later states.
    pub store_cost_partitionings: bool,

    /// Stop storing once the stored partitions exceed this size.
    pub max_size_kb: usize,
}

impl Default for OnlineConfig {
    fn default() -> Self {
        Self {
            store_cost_partitionings: true,
            max_size_kb: usize::MAX,
        }
    }
}
