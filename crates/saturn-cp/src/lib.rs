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

//! Saturn CP: saturated cost partitioning heuristics
//!
//! Builds admissible goal-distance estimates for optimal planning by
//! combining many abstraction heuristics through cost partitioning. Each
//! operator's cost is split among the abstractions so that the sum of their
//! estimates never overestimates, and each abstraction in an order only
//! consumes the cost it actually needs (saturation), leaving the rest for the
//! abstractions after it.
//!
//! Core flow
//! - Build an `Abstractions<S>` arena (see `saturn_model`).
//! - Choose an `order_policy::OrderPolicy`, a
//!   `saturation::CostPartitioningFunction`, and a `sampling::Sampler`.
//! - Run `generator::CostPartitioningGenerator` under a `config::GeneratorConfig`
//!   to obtain a diverse pool of `cost_partitioning::CostPartitioningHeuristic`s.
//! - Hand the arena and the pool to `max_cp::MaxCostPartitioningHeuristic`,
//!   which answers `heuristic::Heuristic::estimate` queries.
//!
//! Alternatively, `online::OnlineSaturatedHeuristic` grows its pool while the
//! search evaluates states.
//!
//! Assumptions and guarantees
//! - Every pool member is admissible on its own, so is the maximum.
//! - The generated pool is never empty; it holds exactly one member if the
//!   initial state was proven unsolvable.
//! - Budgets are cooperative; a computation in progress is always finished.
//!
//! Module map
//! - `config`: generator and online settings, validated by a builder.
//! - `cost_partitioning`: lookup tables of one partitioning.
//! - `diversifier`: admission filter over a panel of sample states.
//! - `generator`: pool generation (systematic, sampled, optimized orders).
//! - `heuristic`: the state-level `Heuristic` interface.
//! - `max_cp`: the runtime evaluator (maximum over the pool).
//! - `monitor`: generation monitors (no-op, logging, pool size limit).
//! - `online`: partitions computed during search.
//! - `optimizer`: hill climbing over order neighborhoods.
//! - `order_policy`: random and greedy orders.
//! - `sampling`: random-walk state sampling.
//! - `saturation`: the saturated cost partitioning function.
//! - `stats`: counters and timing.
//! - `systematic`: canonical partial orders.
//! - `uniform`: uniform and opportunistic uniform partitioning.
//! - `unsolvability`: order-independent dead-end detection.

pub mod config;
pub mod cost_partitioning;
pub mod diversifier;
pub mod generator;
pub mod heuristic;
pub mod max_cp;
pub mod monitor;
pub mod online;
pub mod optimizer;
pub mod order_policy;
pub mod sampling;
pub mod saturation;
pub mod stats;
pub mod systematic;
pub mod uniform;
pub mod unsolvability;
