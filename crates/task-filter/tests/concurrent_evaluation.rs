//! Sharing one compiled filter across threads.

use std::thread;

use chrono::{NaiveDate, NaiveDateTime};
use task_filter_rs::{compile_filter, FilterConfig, FilterEngine, FilterEvaluator, Task};

fn reference() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

fn make_tasks(count: usize) -> Vec<Task> {
    (0..count)
        .map(|i| {
            let mut task = Task::new(format!("task {i}"));
            task.project = Some(if i % 2 == 0 { "work" } else { "home" }.to_string());
            task.urgency = (i % 20) as f64;
            if i % 5 == 0 {
                task.tags.insert("done".to_string());
            }
            task
        })
        .collect()
}

fn expected(tasks: &[Task]) -> Vec<&str> {
    tasks
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 2 == 0 && i % 5 != 0 && i % 20 > 10)
        .map(|(_, t)| t.description.as_str())
        .collect()
}

const EXPRESSION: &str = "project:work not +done urgency.over:10";

#[test]
fn test_parallel_batch_preserves_input_order() {
    let tasks = make_tasks(5_000);
    let node = compile_filter(EXPRESSION).unwrap();

    let engine = FilterEngine::new(FilterConfig {
        parallel_threshold: 64,
        ..FilterConfig::default()
    });
    let found: Vec<&str> = engine
        .evaluator(&node, reference())
        .filter_tasks(&tasks)
        .into_iter()
        .map(|t| t.description.as_str())
        .collect();

    assert_eq!(found, expected(&tasks));
}

#[test]
fn test_sequential_and_parallel_agree() {
    let tasks = make_tasks(1_000);
    let node = compile_filter(EXPRESSION).unwrap();

    let sequential = FilterEngine::new(FilterConfig {
        parallel_threshold: usize::MAX,
        ..FilterConfig::default()
    });
    let parallel = FilterEngine::new(FilterConfig {
        parallel_threshold: 0,
        ..FilterConfig::default()
    });

    assert_eq!(
        sequential.evaluator(&node, reference()).filter_tasks(&tasks),
        parallel.evaluator(&node, reference()).filter_tasks(&tasks)
    );
}

#[test]
fn test_evaluator_shared_across_scoped_threads() {
    let tasks = make_tasks(2_000);
    let node = compile_filter(EXPRESSION).unwrap();
    let evaluator = FilterEvaluator::new(&node, reference());

    let chunks: Vec<Vec<&Task>> = thread::scope(|scope| {
        let handles: Vec<_> = tasks
            .chunks(300)
            .map(|chunk| {
                let evaluator = &evaluator;
                scope.spawn(move || {
                    chunk
                        .iter()
                        .filter(|task| evaluator.matches(*task))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    let found: Vec<&str> = chunks
        .into_iter()
        .flatten()
        .map(|t| t.description.as_str())
        .collect();
    assert_eq!(found, expected(&tasks));
}
