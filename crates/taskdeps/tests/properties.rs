//! Property-based tests for dependency graph invariants.
//!
//! These tests verify the behavioral contracts of the service:
//! - The stored graph stays acyclic under any sequence of adds and removes
//! - An add is accepted exactly when a reference model says it is legal
//! - Every rejected cycle comes with a path that starts and ends at the dependent

mod common;

use common::{Fixture, todo_tasks};
use proptest::prelude::*;
use std::collections::HashSet;
use taskdeps::domain::{NewDependency, TaskId};

const TASK_COUNT: usize = 6;
const NAMES: [&str; TASK_COUNT] = ["t0", "t1", "t2", "t3", "t4", "t5"];

// =============================================================================
// Strategies
// =============================================================================

#[derive(Clone, Debug)]
enum Op {
    Add(usize, usize),
    Remove(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..TASK_COUNT, 0..TASK_COUNT).prop_map(|(a, b)| Op::Add(a, b)),
        1 => (0..TASK_COUNT, 0..TASK_COUNT).prop_map(|(a, b)| Op::Remove(a, b)),
    ]
}

// =============================================================================
// Reference model
// =============================================================================

/// Whether `to` is reachable from `from` in `edges`
fn reaches(edges: &HashSet<(usize, usize)>, from: usize, to: usize) -> bool {
    let mut stack = vec![from];
    let mut seen = HashSet::new();
    while let Some(node) = stack.pop() {
        if node == to {
            return true;
        }
        if !seen.insert(node) {
            continue;
        }
        stack.extend(edges.iter().filter(|(a, _)| *a == node).map(|(_, b)| *b));
    }
    false
}

fn index_of(id: &TaskId) -> usize {
    NAMES
        .iter()
        .position(|name| *name == id.as_str())
        .unwrap()
}

/// Exhaustive check: no stored edge's prerequisite reaches back to its dependent
fn is_acyclic(edges: &[(TaskId, TaskId)]) -> bool {
    let set: HashSet<(usize, usize)> = edges
        .iter()
        .map(|(a, b)| (index_of(a), index_of(b)))
        .collect();
    set.iter().all(|&(a, b)| !reaches(&set, b, a))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn graph_stays_acyclic_and_matches_model(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let rt = runtime();
        rt.block_on(async {
            let fixture = Fixture::new(todo_tasks(&NAMES));
            let mut model: HashSet<(usize, usize)> = HashSet::new();

            for op in ops {
                match op {
                    Op::Add(a, b) => {
                        let legal = a != b && !model.contains(&(a, b)) && !reaches(&model, b, a);
                        let result = fixture
                            .service
                            .add_dependency(NewDependency::blocks(NAMES[a], NAMES[b], "prop"))
                            .await;

                        prop_assert_eq!(result.is_ok(), legal, "add {} -> {}", a, b);
                        if legal {
                            model.insert((a, b));
                        }
                    }
                    Op::Remove(a, b) => {
                        let removed = fixture
                            .service
                            .remove_dependency_by_tasks(&TaskId::new(NAMES[a]), &TaskId::new(NAMES[b]))
                            .await
                            .unwrap();
                        prop_assert_eq!(removed, model.remove(&(a, b)));
                    }
                }
            }

            let stored: Vec<(TaskId, TaskId)> = fixture
                .store
                .export_all()
                .await
                .unwrap()
                .into_iter()
                .map(|e| (e.task_id, e.depends_on_task_id))
                .collect();
            prop_assert_eq!(stored.len(), model.len());
            prop_assert!(is_acyclic(&stored));
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn rejected_cycles_report_closed_paths(ops in proptest::collection::vec((0..TASK_COUNT, 0..TASK_COUNT), 1..25)) {
        let rt = runtime();
        rt.block_on(async {
            let fixture = Fixture::new(todo_tasks(&NAMES));

            for (a, b) in ops {
                let task_id = TaskId::new(NAMES[a]);
                let depends_on = TaskId::new(NAMES[b]);
                let detection = fixture
                    .service
                    .detect_circular_dependency(&task_id, &depends_on)
                    .await
                    .unwrap();

                if detection.has_cycle {
                    let path = detection.cycle_path.unwrap();
                    prop_assert_eq!(path.first(), Some(&task_id));
                    prop_assert_eq!(path.last(), Some(&task_id));
                    if a != b {
                        prop_assert_eq!(path.get(1), Some(&depends_on));
                    }
                } else {
                    // Anything without a cycle can only fail as a duplicate
                    let _ = fixture
                        .service
                        .add_dependency(NewDependency::blocks(NAMES[a], NAMES[b], "prop"))
                        .await;
                }
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
