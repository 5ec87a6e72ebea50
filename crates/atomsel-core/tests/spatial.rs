mod common;

use atomsel::core::models::system::AtomicSystem;
use atomsel::engine::config::{EvaluatorConfigBuilder, SpatialBackend};
use atomsel::engine::evaluator::Evaluator;
use common::{clustered_system, distance, lattice_system, random_system};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Atoms within `radius` of any target, by exhaustive comparison.
fn brute_force_within(system: &AtomicSystem, targets: &[usize], radius: f64) -> Vec<usize> {
    (0..system.len())
        .filter(|&i| targets.iter().any(|&t| distance(system, i, t) <= radius))
        .collect()
}

fn pick_targets(system: &AtomicSystem, count: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut targets: Vec<usize> = (0..count).map(|_| rng.gen_range(0..system.len())).collect();
    targets.sort_unstable();
    targets.dedup();
    targets
}

fn within_expression(radius: f64, targets: &[usize]) -> String {
    let list: Vec<String> = targets.iter().map(usize::to_string).collect();
    format!("within {radius} of index {}", list.join(" "))
}

fn evaluators() -> [Evaluator; 2] {
    [SpatialBackend::Grid, SpatialBackend::KdTree]
        .map(|backend| Evaluator::with_config(EvaluatorConfigBuilder::new().backend(backend).build()))
}

fn check_against_brute_force(system: &AtomicSystem, radii: &[f64], seed: u64) {
    for evaluator in evaluators() {
        for (round, &radius) in radii.iter().enumerate() {
            let targets = pick_targets(system, 12, seed + round as u64);
            let expression = within_expression(radius, &targets);
            let mask = evaluator.select(&expression, system).unwrap();
            assert_eq!(
                mask.indices(),
                brute_force_within(system, &targets, radius),
                "{:?}: {expression}",
                evaluator.config().backend
            );
        }
    }
}

#[test]
fn within_matches_brute_force_on_scattered_coordinates() {
    let system = random_system(150, 40.0, 101);
    check_against_brute_force(&system, &[0.8, 2.5, 5.0, 9.75], 1);
}

#[test]
fn lattice_coordinates_sharing_axis_values_are_searchable() {
    let system = lattice_system(10, 1.5);
    for evaluator in evaluators() {
        let mask = evaluator.select("within 1.5 of index 0", &system).unwrap();
        assert_eq!(mask.indices(), vec![0, 1, 10, 100], "{:?}", evaluator.config().backend);
    }
    check_against_brute_force(&system, &[0.0, 1.5, 2.2, 4.0], 3);
}

#[test]
fn within_matches_brute_force_on_clustered_coordinates() {
    let system = clustered_system(900, 202);
    check_against_brute_force(&system, &[0.3, 1.0, 2.2, 4.0], 2);
}

#[test]
fn zero_radius_selects_only_the_targets() {
    let system = random_system(80, 30.0, 303);
    let targets = pick_targets(&system, 10, 3);
    for evaluator in evaluators() {
        let mask = evaluator.select(&within_expression(0.0, &targets), &system).unwrap();
        assert_eq!(mask.indices(), targets);
    }
}

#[test]
fn radius_beyond_the_span_selects_everything() {
    for system in [random_system(60, 30.0, 404), clustered_system(300, 405)] {
        let targets = pick_targets(&system, 1, 4);
        for evaluator in evaluators() {
            let mask = evaluator.select(&within_expression(1.0e4, &targets), &system).unwrap();
            assert_eq!(mask.count(), system.len());
        }
    }
}

#[test]
fn exwithin_is_within_minus_targets() {
    let system = clustered_system(400, 505);
    let targets = pick_targets(&system, 8, 5);
    let list: Vec<String> = targets.iter().map(usize::to_string).collect();
    let evaluator = Evaluator::new();

    let within = evaluator.select(&within_expression(1.5, &targets), &system).unwrap();
    let exwithin = evaluator
        .select(&format!("exwithin 1.5 of index {}", list.join(" ")), &system)
        .unwrap();
    let expected: Vec<usize> = within
        .indices()
        .into_iter()
        .filter(|i| !targets.contains(i))
        .collect();
    assert_eq!(exwithin.indices(), expected);
}
