//! Tests for sweep enumeration and execution.

use super::*;
use crate::report::CsvTable;
use crate::test_utils::ScriptedSolver;
use crate::TrialError;
use cubesweep_config::{ParallelismSweepConfig, SizeSweepConfig};

fn algorithms(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn size_shape(parallelism: usize) -> SweepShape {
    SweepShape::Size(SizeSweepConfig {
        parallelism,
        modes: vec![Mode::Sequential, Mode::Parallel],
    })
}

#[test]
fn test_size_sweep_order() {
    let corpus = Corpus::from_lines(["R U R' U'", "F2 B2", "D"]);
    let algs = algorithms(&["bfs", "astar"]);
    let points = plan(&size_shape(8), &algs, &corpus).unwrap();

    assert_eq!(points.len(), 2 * 2 * 3);
    let labels: Vec<(usize, &str, String)> = points
        .iter()
        .map(|p| (p.axis, p.trial.algorithm, p.secondary.to_string()))
        .collect();
    let expected: Vec<(usize, &str, String)> = [
        (4, "bfs", "s"),
        (2, "bfs", "s"),
        (1, "bfs", "s"),
        (4, "bfs", "p"),
        (2, "bfs", "p"),
        (1, "bfs", "p"),
        (4, "astar", "s"),
        (2, "astar", "s"),
        (1, "astar", "s"),
        (4, "astar", "p"),
        (2, "astar", "p"),
        (1, "astar", "p"),
    ]
    .into_iter()
    .map(|(a, alg, s)| (a, alg, s.to_string()))
    .collect();
    assert_eq!(labels, expected);

    // Parallel points carry the fixed degree.
    assert!(points
        .iter()
        .filter(|p| p.trial.mode == Mode::Parallel)
        .all(|p| p.trial.parallelism == 8));
}

#[test]
fn test_size_sweep_is_reproducible() {
    let corpus = Corpus::from_lines(["R U", "F2 B2 L"]);
    let algs = algorithms(&["bfs", "astar"]);
    let first = plan(&size_shape(4), &algs, &corpus).unwrap();
    let second = plan(&size_shape(4), &algs, &corpus).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_parallelism_sweep_order() {
    let corpus = Corpus::from_lines(["A", "B C", "D E F", "G"]);
    let algs = algorithms(&["bfs", "astar"]);
    let shape = SweepShape::Parallelism(ParallelismSweepConfig {
        min_parallelism: 1,
        max_parallelism: 3,
        first_row: 1,
        last_row: 2,
    });
    let points = plan(&shape, &algs, &corpus).unwrap();

    assert_eq!(points.len(), 2 * 3 * 2);
    let labels: Vec<(usize, &str, SecondaryAxis)> = points
        .iter()
        .map(|p| (p.axis, p.trial.algorithm, p.secondary))
        .collect();
    assert_eq!(
        labels[..6],
        [
            (2, "bfs", SecondaryAxis::Parallelism(1)),
            (3, "bfs", SecondaryAxis::Parallelism(1)),
            (2, "bfs", SecondaryAxis::Parallelism(2)),
            (3, "bfs", SecondaryAxis::Parallelism(2)),
            (2, "bfs", SecondaryAxis::Parallelism(3)),
            (3, "bfs", SecondaryAxis::Parallelism(3)),
        ]
    );
    assert_eq!(labels[6], (2, "astar", SecondaryAxis::Parallelism(1)));
    assert!(points.iter().all(|p| p.trial.mode == Mode::Parallel));
    assert_eq!(points[0].trial.scramble.text(), "B C");
    assert_eq!(points[0].trial.request(), "B C\np\nbfs 1");
}

#[test]
fn test_parallelism_sweep_rejects_rows_beyond_corpus() {
    let corpus = Corpus::from_lines(["A", "B"]);
    let algs = algorithms(&["bfs"]);
    let solver = ScriptedSolver::new([1.0]);
    let controller = SweepController::new(
        SweepShape::Parallelism(ParallelismSweepConfig::default()),
        algs,
        Aggregator::new(&solver),
    );

    let mut sink = Vec::new();
    let err = controller.run_sweep(&corpus, &mut sink).unwrap_err();
    assert!(matches!(
        err,
        SweepError::CorpusRange {
            first: 39,
            last: 49,
            len: 2
        }
    ));
    // Detected before any trial runs.
    assert_eq!(solver.calls(), 0);
    assert!(sink.is_empty());
}

#[test]
fn test_end_to_end_size_sweep() {
    let corpus = Corpus::from_lines(["R U R' U'", "F2 B2"]);
    let solver = ScriptedSolver::new([0.5]);
    let controller = SweepController::new(
        size_shape(8),
        algorithms(&["bfs"]),
        Aggregator::new(&solver).with_runs(1),
    );

    let mut table = CsvTable::new(Vec::new());
    let rows = controller.run_sweep(&corpus, &mut table).unwrap();

    assert_eq!(rows.len(), 4);
    assert_eq!(
        String::from_utf8(table.into_inner()).unwrap(),
        "4,bfs,s,0.500\n2,bfs,s,0.500\n4,bfs,p,0.500\n2,bfs,p,0.500\n"
    );
    assert_eq!(solver.calls(), 4);
}

#[test]
fn test_rows_carry_rounded_mean() {
    let corpus = Corpus::from_lines(["R U"]);
    let solver = ScriptedSolver::new([1.0, 2.0, 3.0]);
    let shape = SweepShape::Size(SizeSweepConfig {
        parallelism: 2,
        modes: vec![Mode::Sequential],
    });
    let controller = SweepController::new(
        shape,
        algorithms(&["bfs"]),
        Aggregator::new(&solver).with_runs(3),
    );

    let rows = controller.run_sweep(&corpus, &mut Vec::new()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].time, 2.0);
    assert_eq!(rows[0].secondary, SecondaryAxis::Mode(Mode::Sequential));
}

#[test]
fn test_fail_fast_writes_no_partial_row() {
    let corpus = Corpus::from_lines(["R U", "F"]);
    // Third point's second trial fails: points 1 and 2 use calls 1-4.
    let solver = ScriptedSolver::new([1.0]).fail_on_call(6);
    let controller = SweepController::new(
        size_shape(8),
        algorithms(&["bfs"]),
        Aggregator::new(&solver).with_runs(2),
    );

    let mut table = CsvTable::new(Vec::new());
    let err = controller.run_sweep(&corpus, &mut table).unwrap_err();

    match err {
        SweepError::Trial { point, source } => {
            assert!(point.contains("corpus row 1"));
            assert!(point.contains("mode=p"));
            assert!(matches!(source, TrialError::MalformedSolverOutput { .. }));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(solver.calls(), 6);
    assert_eq!(table.rows_written(), 2);
    assert_eq!(
        String::from_utf8(table.into_inner()).unwrap(),
        "2,bfs,s,1.000\n1,bfs,s,1.000\n"
    );
}

#[test]
fn test_skip_policy_continues_past_failed_point() {
    let corpus = Corpus::from_lines(["R U", "F"]);
    let solver = ScriptedSolver::new([0.25]).fail_when(|t| t.scramble.text() == "F");
    let controller = SweepController::new(
        size_shape(8),
        algorithms(&["bfs"]),
        Aggregator::new(&solver).with_runs(1),
    )
    .with_failure_policy(FailurePolicy::Skip);

    let mut table = CsvTable::new(Vec::new());
    let rows = controller.run_sweep(&corpus, &mut table).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(
        String::from_utf8(table.into_inner()).unwrap(),
        "2,bfs,s,0.250\n2,bfs,p,0.250\n"
    );
}

#[test]
fn test_from_config() {
    let config = SweepConfig::new()
        .with_runs(5)
        .with_algorithms(["astar"])
        .with_shape(size_shape(3));
    let solver = ScriptedSolver::new([1.0]);
    let controller = SweepController::from_config(&config, &solver);

    assert_eq!(controller.aggregator().runs(), 5);
    assert_eq!(controller.algorithms(), ["astar".to_string()]);
    assert_eq!(controller.shape(), &size_shape(3));
}

#[test]
fn test_point_display_names_row_and_trial() {
    let corpus = Corpus::from_lines(["U"]);
    let algs = algorithms(&["bfs"]);
    let points = plan(&size_shape(8), &algs, &corpus).unwrap();
    assert_eq!(
        points[1].to_string(),
        "corpus row 1: algorithm=bfs mode=p parallelism=8 scramble=\"U\""
    );
}
