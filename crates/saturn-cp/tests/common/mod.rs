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

#![allow(dead_code)]

use saturn_core::num::{Cost, INF};
use saturn_cp::config::GeneratorConfig;
use saturn_model::abstraction::{Abstraction, Abstractions};
use saturn_model::projection::project;
use saturn_model::task::{Operator, SasTask};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

pub type State = Vec<usize>;

/// Two binary switches; the goal needs both on. Setting both at once is
/// more expensive than setting them one by one.
pub fn two_switches() -> SasTask {
    SasTask::new(
        vec![2, 2],
        vec![
            Operator::new("set-x", vec![(0, 0)], vec![(0, 1)], 3),
            Operator::new("set-y", vec![(1, 0)], vec![(1, 1)], 5),
            Operator::new("set-both", vec![(0, 0), (1, 0)], vec![(0, 1), (1, 1)], 10),
        ],
        vec![0, 0],
        vec![(0, 1), (1, 1)],
    )
}

/// A counter over 0..=3 with a trap value 4 that cannot reach the goal 3.
pub fn counter_with_trap() -> SasTask {
    let mut operators: Vec<Operator> = (0..3)
        .map(|v| Operator::new(format!("inc-{v}"), vec![(0, v)], vec![(0, v + 1)], 2))
        .collect();
    operators.push(Operator::new("fall", vec![(0, 1)], vec![(0, 4)], 1));
    SasTask::new(vec![5], operators, vec![0], vec![(0, 3)])
}

pub fn projections(task: &SasTask, patterns: &[Vec<usize>]) -> Abstractions<State> {
    patterns
        .iter()
        .map(|pattern| -> Box<dyn Abstraction<State>> { Box::new(project(task, pattern)) })
        .collect()
}

/// One singleton pattern per variable.
pub fn singleton_patterns(task: &SasTask) -> Vec<Vec<usize>> {
    (0..task.num_variables()).map(|var| vec![var]).collect()
}

/// Every state of the task, in mixed-radix order.
pub fn all_states(task: &SasTask) -> Vec<State> {
    let mut states = vec![Vec::new()];
    for &size in task.domain_sizes() {
        states = states
            .into_iter()
            .flat_map(|prefix| {
                (0..size).map(move |val| {
                    let mut state = prefix.clone();
                    state.push(val);
                    state
                })
            })
            .collect();
    }
    states
}

/// Optimal goal distance of every state, by backward Dijkstra over the
/// explicit state space. Indexed like `all_states`.
pub fn optimal_goal_distances(task: &SasTask) -> Vec<Cost> {
    let states = all_states(task);
    let index_of = |state: &[usize]| -> usize {
        state
            .iter()
            .zip(task.domain_sizes())
            .fold(0, |acc, (&val, &size)| acc * size + val)
    };

    let mut backward: Vec<Vec<(usize, Cost)>> = vec![Vec::new(); states.len()];
    for (src, state) in states.iter().enumerate() {
        for op in task.applicable_operators(state) {
            let target = index_of(&task.apply(state, op));
            backward[target].push((src, task.operators()[op].cost));
        }
    }

    let mut distances = vec![INF; states.len()];
    let mut queue = BinaryHeap::new();
    for (i, state) in states.iter().enumerate() {
        if task.is_goal(state) {
            distances[i] = 0;
            queue.push(Reverse((0, i)));
        }
    }
    while let Some(Reverse((distance, state))) = queue.pop() {
        if distance > distances[state] {
            continue;
        }
        for &(src, cost) in &backward[state] {
            let candidate = distance + cost;
            if candidate < distances[src] {
                distances[src] = candidate;
                queue.push(Reverse((candidate, src)));
            }
        }
    }
    distances
}

pub fn quick_config() -> GeneratorConfig {
    GeneratorConfig::builder()
        .max_time(Duration::from_millis(300))
        .num_samples(20)
        .max_optimization_time(Duration::from_millis(20))
        .build()
        .expect("valid config")
}
