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

//! Generation of cost partitioning pools.
//!
//! The generator builds a bounded, diverse pool of cost partitioning
//! heuristics whose maximum is used as the final estimate. It runs in up to
//! three stages under a single wall-clock budget:
//!
//! 1. **Initial partition.** The order policy proposes an order for the
//!    initial state. If the resulting partition proves the initial state
//!    unsolvable, the pool consists of that partition alone.
//! 2. **Systematic phase.** Every canonical partial order is completed with
//!    a shuffled suffix and partitioned. Systematic admissions do not count
//!    against the size limit.
//! 3. **Sampling phase.** The first candidate is the initial partition; each
//!    later candidate is computed for the order the policy proposes for a
//!    sampled state. Candidates are improved by hill climbing before they
//!    are offered to the pool.
//!
//! With diversification enabled, a candidate is admitted only if it raises
//! the best-known estimate of at least one sample. A candidate is always
//! admitted while the pool is empty, so the pool is never empty, even with a
//! zero time budget. Budgets are cooperative: a partition that is being
//! computed when the budget runs out is still finished and considered.

use crate::config::GeneratorConfig;
use crate::cost_partitioning::CostPartitioningHeuristic;
use crate::diversifier::Diversifier;
use crate::monitor::{GenerationCommand, GenerationMonitor, GenerationPhase};
use crate::optimizer::{HillClimbingOptimizer, OrderNeighborhood, SwapNeighborhood};
use crate::order_policy::OrderPolicy;
use crate::sampling::Sampler;
use crate::saturation::CostPartitioningFunction;
use crate::stats::GenerationStatistics;
use crate::systematic::SystematicOrders;
use rand::Rng;
use saturn_core::num::{Cost, INF};
use saturn_core::timer::CountdownTimer;
use saturn_model::abstraction::Abstractions;
use saturn_model::order::Order;
use std::time::{Duration, Instant};
use tracing::debug;

/// The result of a pool generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pool: Vec<CostPartitioningHeuristic>,
    initial_h_value: Cost,
    sample_h_values: Vec<Cost>,
    statistics: GenerationStatistics,
}

impl GenerationOutcome {
    /// The generated pool. Never empty.
    #[inline]
    pub fn pool(&self) -> &[CostPartitioningHeuristic] {
        &self.pool
    }

    #[inline]
    pub fn into_pool(self) -> Vec<CostPartitioningHeuristic> {
        self.pool
    }

    /// The estimate of the initial partition for the initial state.
    #[inline]
    pub fn initial_h_value(&self) -> Cost {
        self.initial_h_value
    }

    /// Returns `true` if the initial partition proved the task unsolvable.
    /// The pool then holds exactly that partition.
    #[inline]
    pub fn is_unsolvable(&self) -> bool {
        self.initial_h_value == INF
    }

    /// The best estimate the pool achieves on each diversification sample,
    /// with the initial state first. Empty without diversification or if
    /// the task is unsolvable.
    #[inline]
    pub fn sample_h_values(&self) -> &[Cost] {
        &self.sample_h_values
    }

    #[inline]
    pub fn statistics(&self) -> &GenerationStatistics {
        &self.statistics
    }
}

/// Builds pools of cost partitioning heuristics.
#[derive(Debug, Clone)]
pub struct CostPartitioningGenerator<N = SwapNeighborhood> {
    config: GeneratorConfig,
    systematic_orders: SystematicOrders,
    optimizer: HillClimbingOptimizer<N>,
}

impl CostPartitioningGenerator<SwapNeighborhood> {
    /// Creates a generator that optimizes orders with pairwise swaps.
    #[inline]
    pub fn new(config: GeneratorConfig, systematic_orders: SystematicOrders) -> Self {
        Self::with_optimizer(config, systematic_orders, HillClimbingOptimizer::new(SwapNeighborhood))
    }
}

impl<N: OrderNeighborhood> CostPartitioningGenerator<N> {
    /// Creates a generator with a custom order optimizer.
    ///
    /// # Panics
    ///
    /// Panics if `config` allows no pool member or no sample. Configurations
    /// from `GeneratorConfigBuilder::build` never do.
    pub fn with_optimizer(
        config: GeneratorConfig,
        systematic_orders: SystematicOrders,
        optimizer: HillClimbingOptimizer<N>,
    ) -> Self {
        assert!(
            config.max_orders() >= 1,
            "called `CostPartitioningGenerator::with_optimizer` with max_orders = 0"
        );
        assert!(
            config.num_samples() >= 1,
            "called `CostPartitioningGenerator::with_optimizer` with num_samples = 0"
        );
        Self {
            config,
            systematic_orders,
            optimizer,
        }
    }

    #[inline]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    #[inline]
    pub fn systematic_orders(&self) -> &SystematicOrders {
        &self.systematic_orders
    }

    /// Generates a pool for `abstractions` under the operator `costs`.
    ///
    /// # Panics
    ///
    /// Panics if the systematic orders were validated against a different
    /// number of abstractions.
    #[allow(clippy::too_many_arguments)]
    pub fn generate<S, P, F, Sa, R, M>(
        &self,
        abstractions: &Abstractions<S>,
        initial_state: &S,
        costs: &[Cost],
        order_policy: &mut P,
        cp_function: &F,
        sampler: &mut Sa,
        rng: &mut R,
        monitor: &mut M,
    ) -> GenerationOutcome
    where
        P: OrderPolicy<S> + ?Sized,
        F: CostPartitioningFunction<S> + ?Sized,
        Sa: Sampler<S> + ?Sized,
        R: Rng + ?Sized,
        M: GenerationMonitor + ?Sized,
    {
        assert!(
            self.systematic_orders.is_empty() || self.systematic_orders.num_abstractions() == abstractions.len(),
            "called `CostPartitioningGenerator::generate` with {} abstractions but systematic orders for {}",
            abstractions.len(),
            self.systematic_orders.num_abstractions()
        );

        let start_time = Instant::now();
        let timer = CountdownTimer::new(self.config.max_time());
        let mut stats = GenerationStatistics::default();
        monitor.on_start(abstractions.len(), &self.config);

        order_policy.initialize(abstractions, costs);
        let init_ids = abstractions.abstract_state_ids(initial_state);
        let init_order = order_policy.compute_order_for_state(&init_ids, true);
        let init_cp = partition(cp_function, abstractions, &init_order, costs, &init_ids);
        let init_h = init_cp.compute_heuristic(&init_ids);
        monitor.on_initial_estimate(init_h);

        if init_h == INF {
            let pool = vec![init_cp];
            return self.finish(pool, init_h, stats, start_time, monitor);
        }

        let dead_end_detector = init_cp.clone();
        let is_dead_end =
            |state: &S| dead_end_detector.compute_heuristic(&abstractions.abstract_state_ids(state)) == INF;

        let mut diversifier = if self.config.diversify() {
            let sampling_start = Instant::now();
            let mut panel = vec![init_ids.clone()];
            while panel.len() < self.config.num_samples() && !timer.is_expired() {
                let sample = sampler.sample_state(init_h, &is_dead_end);
                panel.push(abstractions.abstract_state_ids(&sample));
            }
            stats.num_samples = panel.len() as u64;
            stats.time_sampling = sampling_start.elapsed();
            monitor.on_samples_drawn(panel.len(), stats.time_sampling);
            Some(Diversifier::new(panel))
        } else {
            None
        };

        let mut pool: Vec<CostPartitioningHeuristic> = Vec::new();

        let systematic_start = Instant::now();
        for partial_order in &self.systematic_orders {
            if pool.len() >= self.config.max_orders() {
                break;
            }
            if !pool.is_empty() && should_stop(&timer, monitor, &stats) {
                break;
            }

            let order = partial_order.complete_randomly(abstractions.len(), rng);
            let cp = partition(cp_function, abstractions, &order, costs, &init_ids);
            let admitted = is_admissible_candidate(diversifier.as_mut(), &cp, pool.is_empty());
            if admitted {
                pool.push(cp);
            }
            stats.on_systematic_candidate(admitted);
            monitor.on_candidate(GenerationPhase::Systematic, admitted, &stats);
        }
        stats.time_systematic = systematic_start.elapsed();

        let max_size_bytes = self.config.max_size_bytes();
        let mut size_bytes: usize = 0;
        let mut initial_candidate = Some((init_order, init_cp));
        loop {
            if pool.len() >= self.config.max_orders() {
                break;
            }
            if !pool.is_empty() && (size_bytes >= max_size_bytes || should_stop(&timer, monitor, &stats)) {
                break;
            }

            let (ids, order, cp) = match initial_candidate.take() {
                Some((order, cp)) => (init_ids.clone(), order, cp),
                None => {
                    let sample = sampler.sample_state(init_h, &is_dead_end);
                    let ids = abstractions.abstract_state_ids(&sample);
                    let order = order_policy.compute_order_for_state(&ids, false);
                    let cp = partition(cp_function, abstractions, &order, costs, &ids);
                    (ids, order, cp)
                }
            };

            let optimization_time = timer.remaining().min(self.config.max_optimization_time());
            let cp = if optimization_time > Duration::ZERO {
                let outcome = self.optimizer.optimize(
                    cp_function,
                    abstractions,
                    costs,
                    &ids,
                    order,
                    cp,
                    &CountdownTimer::new(optimization_time),
                );
                stats.on_order_optimized(outcome.statistics());
                monitor.on_order_optimized(outcome.termination_reason(), outcome.statistics());
                let (_, cp, _) = outcome.into_parts();
                cp
            } else {
                cp
            };

            // Best-known sample values are only raised once the candidate
            // is known to fit.
            let scores = diversifier.as_ref().map(|diversifier| diversifier.score(&cp));
            let is_diverse = match (&diversifier, &scores) {
                (Some(diversifier), Some(scores)) => diversifier.improves(scores),
                _ => true,
            };
            if !is_diverse && !pool.is_empty() {
                stats.on_sampled_candidate(false);
                monitor.on_candidate(GenerationPhase::Sampling, false, &stats);
                continue;
            }

            let candidate_size = cp.estimate_size_in_bytes();
            if !pool.is_empty() && size_bytes.saturating_add(candidate_size) > max_size_bytes {
                debug!(size_bytes, candidate_size, max_size_bytes, "Size limit reached");
                stats.on_sampled_candidate(false);
                monitor.on_candidate(GenerationPhase::Sampling, false, &stats);
                break;
            }
            if let (Some(diversifier), Some(scores)) = (diversifier.as_mut(), &scores) {
                diversifier.raise(scores);
            }
            size_bytes = size_bytes.saturating_add(candidate_size);
            pool.push(cp);
            stats.on_sampled_candidate(true);
            monitor.on_candidate(GenerationPhase::Sampling, true, &stats);
        }

        let sample_h_values = match &diversifier {
            Some(diversifier) => {
                debug!(
                    avg_sample_h = diversifier.compute_avg_finite_sample_h_value(),
                    num_samples = diversifier.num_samples(),
                    "Average finite best-known sample estimate"
                );
                diversifier.best_known_values().to_vec()
            }
            None => Vec::new(),
        };

        let mut outcome = self.finish(pool, init_h, stats, start_time, monitor);
        outcome.sample_h_values = sample_h_values;
        outcome
    }

    fn finish<M>(
        &self,
        pool: Vec<CostPartitioningHeuristic>,
        initial_h_value: Cost,
        mut stats: GenerationStatistics,
        start_time: Instant,
        monitor: &mut M,
    ) -> GenerationOutcome
    where
        M: GenerationMonitor + ?Sized,
    {
        debug_assert!(!pool.is_empty(), "generated an empty pool");
        stats.pool_size = pool.len() as u64;
        stats.pool_size_bytes = pool.iter().map(|cp| cp.estimate_size_in_bytes() as u64).sum();
        stats.time_total = start_time.elapsed();
        monitor.on_end(&stats);
        GenerationOutcome {
            pool,
            initial_h_value,
            sample_h_values: Vec::new(),
            statistics: stats,
        }
    }
}

/// Partitions a fresh copy of `costs` along `order`.
#[inline]
fn partition<S, F>(
    cp_function: &F,
    abstractions: &Abstractions<S>,
    order: &Order,
    costs: &[Cost],
    abstract_state_ids: &[usize],
) -> CostPartitioningHeuristic
where
    F: CostPartitioningFunction<S> + ?Sized,
{
    let mut remaining_costs = costs.to_vec();
    cp_function.compute(abstractions, order, &mut remaining_costs, abstract_state_ids)
}

/// Runs the diversification filter. An empty pool accepts everything, but
/// the filter still records the candidate's values.
#[inline]
fn is_admissible_candidate(
    diversifier: Option<&mut Diversifier>,
    cp: &CostPartitioningHeuristic,
    pool_is_empty: bool,
) -> bool {
    let is_diverse = diversifier.is_none_or(|diversifier| diversifier.is_diverse(cp));
    is_diverse || pool_is_empty
}

fn should_stop<M>(timer: &CountdownTimer, monitor: &mut M, stats: &GenerationStatistics) -> bool
where
    M: GenerationMonitor + ?Sized,
{
    if timer.is_expired() {
        return true;
    }
    match monitor.generation_command(stats) {
        GenerationCommand::Continue => false,
        GenerationCommand::Terminate(reason) => {
            debug!(%reason, monitor = monitor.name(), "Generation terminated by monitor");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{NoOpGenerationMonitor, PoolSizeLimitMonitor};
    use crate::order_policy::RandomOrderPolicy;
    use crate::saturation::compute_saturated_cost_partitioning;
    use crate::systematic::SingletonPrefixes;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use saturn_model::abstraction::Abstraction;
    use saturn_model::explicit::{ExplicitAbstraction, Transition};
    use saturn_model::index::AbstractionIndex;

    // States are integers; every sample is the wrapped state.
    struct ConstantSampler(usize);

    impl Sampler<usize> for ConstantSampler {
        fn sample_state(&mut self, _init_h: Cost, _is_dead_end: &dyn Fn(&usize) -> bool) -> usize {
            self.0
        }
    }

    // Two states 0 -> 1 (goal) on operator `op`.
    fn edge(op: usize) -> Box<dyn Abstraction<usize>> {
        Box::new(ExplicitAbstraction::new(
            2,
            vec![Transition::new(0, op, 1)],
            vec![],
            vec![1],
            |s: &usize| usize::from(*s != 0),
        ))
    }

    fn abstractions() -> Abstractions<usize> {
        vec![edge(0), edge(0), edge(1)].into_iter().collect()
    }

    fn generate(
        config: GeneratorConfig,
        systematic: SystematicOrders,
        abstractions: &Abstractions<usize>,
        costs: &[Cost],
    ) -> GenerationOutcome {
        let generator = CostPartitioningGenerator::new(config, systematic);
        let mut policy = RandomOrderPolicy::new(ChaCha8Rng::seed_from_u64(1));
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        generator.generate(
            abstractions,
            &0,
            costs,
            &mut policy,
            &compute_saturated_cost_partitioning::<usize>,
            &mut ConstantSampler(0),
            &mut rng,
            &mut NoOpGenerationMonitor,
        )
    }

    fn quick_config() -> GeneratorConfig {
        GeneratorConfig::builder()
            .max_time(Duration::from_millis(200))
            .num_samples(3)
            .max_optimization_time(Duration::from_millis(20))
            .build()
            .expect("valid config")
    }

    #[test]
    fn test_zero_time_budget_yields_one_member() {
        let config = GeneratorConfig::builder().max_time(Duration::ZERO).build().expect("valid config");
        let outcome = generate(config, SystematicOrders::empty(), &abstractions(), &[3, 4]);
        assert_eq!(outcome.pool().len(), 1);
        assert_eq!(outcome.initial_h_value(), 7);
        assert!(!outcome.is_unsolvable());
        assert_eq!(outcome.statistics().optimized_orders, 0);
    }

    #[test]
    fn test_zero_time_budget_prefers_first_systematic_order() {
        let abstractions = abstractions();
        let config = GeneratorConfig::builder().max_time(Duration::ZERO).build().expect("valid config");
        let systematic = SystematicOrders::from_source(&SingletonPrefixes, &abstractions);
        let outcome = generate(config, systematic, &abstractions, &[3, 4]);
        assert_eq!(outcome.pool().len(), 1);
        assert_eq!(outcome.statistics().systematic_admitted, 1);
        assert_eq!(outcome.statistics().sampled_candidates, 0);
    }

    #[test]
    fn test_max_orders_bounds_the_whole_pool() {
        let abstractions = abstractions();
        let config = GeneratorConfig::builder()
            .max_orders(2)
            .diversify(false)
            .max_time(Duration::from_secs(5))
            .build()
            .expect("valid config");
        let systematic = SystematicOrders::from_source(&SingletonPrefixes, &abstractions);
        let outcome = generate(config, systematic, &abstractions, &[3, 4]);
        assert_eq!(outcome.pool().len(), 2);
        assert_eq!(outcome.statistics().systematic_candidates, 2);
    }

    #[test]
    fn test_unsolvable_initial_state_yields_singleton() {
        let dead: Box<dyn Abstraction<usize>> =
            Box::new(ExplicitAbstraction::new(2, vec![], vec![], vec![1], |s: &usize| usize::from(*s != 0)));
        let abstractions: Abstractions<usize> = vec![edge(0), dead].into_iter().collect();
        let outcome = generate(quick_config(), SystematicOrders::empty(), &abstractions, &[1, 1]);
        assert!(outcome.is_unsolvable());
        assert_eq!(outcome.pool().len(), 1);
        assert_eq!(outcome.pool()[0].compute_heuristic(&[0, 0]), INF);
        assert_eq!(outcome.statistics().num_samples, 0);
    }

    #[test]
    fn test_diversification_rejects_duplicates() {
        let abstractions = abstractions();
        let outcome = generate(quick_config(), SystematicOrders::empty(), &abstractions, &[3, 4]);
        // Every sample is the initial state, so nothing can beat the first
        // admitted partition.
        assert_eq!(outcome.pool().len(), 1);
        assert!(outcome.statistics().sampled_candidates >= 1);
        assert_eq!(outcome.statistics().num_samples, 3);
    }

    #[test]
    fn test_monitor_can_stop_generation() {
        let abstractions = abstractions();
        let config = GeneratorConfig::builder()
            .diversify(false)
            .max_time(Duration::from_secs(5))
            .build()
            .expect("valid config");
        let generator = CostPartitioningGenerator::new(config, SystematicOrders::empty());
        let mut policy = RandomOrderPolicy::new(ChaCha8Rng::seed_from_u64(4));
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let outcome = generator.generate(
            &abstractions,
            &0,
            &[3, 4],
            &mut policy,
            &compute_saturated_cost_partitioning::<usize>,
            &mut ConstantSampler(0),
            &mut rng,
            &mut PoolSizeLimitMonitor::new(3),
        );
        assert_eq!(outcome.pool().len(), 3);
    }

    // A small table for the initial state and a table over 300 abstract
    // states for every other state.
    fn small_or_large(
        _abstractions: &Abstractions<usize>,
        _order: &Order,
        _remaining_costs: &mut [Cost],
        abstract_state_ids: &[usize],
    ) -> CostPartitioningHeuristic {
        let mut cp = CostPartitioningHeuristic::new();
        if abstract_state_ids[0] == 0 {
            cp.add_h_values(AbstractionIndex::new(0), vec![2, 0]);
        } else {
            cp.add_h_values(AbstractionIndex::new(1), vec![5; 300]);
        }
        cp
    }

    #[test]
    fn test_oversized_candidate_leaves_sample_values_untouched() {
        let small: Box<dyn Abstraction<usize>> = Box::new(ExplicitAbstraction::new(
            2,
            vec![Transition::new(0, 0, 1)],
            vec![],
            vec![1],
            |s: &usize| usize::from(*s != 0),
        ));
        let large: Box<dyn Abstraction<usize>> =
            Box::new(ExplicitAbstraction::new(300, vec![], vec![], vec![0], |s: &usize| s % 300));
        let abstractions: Abstractions<usize> = vec![small, large].into_iter().collect();

        let config = GeneratorConfig::builder()
            .max_size_kb(1)
            .max_time(Duration::from_secs(5))
            .num_samples(3)
            .max_optimization_time(Duration::ZERO)
            .build()
            .expect("valid config");
        let generator = CostPartitioningGenerator::new(config, SystematicOrders::empty());
        let mut policy = RandomOrderPolicy::new(ChaCha8Rng::seed_from_u64(1));
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let outcome = generator.generate(
            &abstractions,
            &0,
            &[1],
            &mut policy,
            &small_or_large,
            &mut ConstantSampler(1),
            &mut rng,
            &mut NoOpGenerationMonitor,
        );

        // The second candidate beats every sample but does not fit.
        assert_eq!(outcome.pool().len(), 1);
        assert_eq!(outcome.statistics().sampled_candidates, 2);
        assert_eq!(outcome.sample_h_values(), &[2, 0, 0]);
    }

    #[test]
    fn test_sample_values_match_the_pool() {
        let abstractions = abstractions();
        let outcome = generate(quick_config(), SystematicOrders::empty(), &abstractions, &[3, 4]);
        assert_eq!(outcome.sample_h_values(), &[7, 7, 7]);

        let config = GeneratorConfig::builder()
            .diversify(false)
            .max_time(Duration::ZERO)
            .build()
            .expect("valid config");
        let outcome = generate(config, SystematicOrders::empty(), &abstractions, &[3, 4]);
        assert!(outcome.sample_h_values().is_empty());
    }

    #[test]
    #[should_panic(expected = "systematic orders for 2")]
    fn test_mismatched_systematic_orders_panic() {
        let systematic = SystematicOrders::new(vec![Order::from_indices(&[0])], 2);
        let _ = generate(quick_config(), systematic, &abstractions(), &[1, 1]);
    }
}
