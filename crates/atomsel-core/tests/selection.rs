mod common;

use atomsel::core::select::{SelectionError, parse};
use atomsel::engine::config::EvaluatorConfigBuilder;
use atomsel::engine::evaluator::{Evaluator, evaluate};
use atomsel::engine::mask::Mask;
use common::{random_system, ten_atom_system};
use nalgebra::Point3;

const EXPRESSIONS: &[&str] = &[
    "protein",
    "water or ion",
    "backbone and not name CA",
    "sidechain",
    "hydrogen",
    "charged or aromatic",
    "resname ALA LYS and chain A",
    "name C* and not element C",
    "resnum 5 to 20 or resnum > 40",
    "resid 1:10 and beta < 50",
    "index 0 5 10 15:30",
    "x > 10 and y <= 12.5",
    "within 3 of resname NA",
    "exwithin 4.5 of (water and chain W)",
    "same residue as within 2 of ion",
    "same chain as resnum 3",
    "protein and not within 6 of water",
    "not (hydrophobic or acidic)",
];

const SIMPLE: &[&str] = &[
    "protein",
    "water",
    "name CA",
    "chain A",
    "resnum < 20",
    "beta >= 30",
    "element O N",
];

fn select(evaluator: &Evaluator, expression: &str, system: &atomsel::core::models::system::AtomicSystem) -> Mask {
    evaluator
        .select(expression, system)
        .unwrap_or_else(|e| panic!("'{expression}' failed: {e}"))
}

#[test]
fn end_to_end_protein_near_water() {
    let system = ten_atom_system();
    let evaluator = Evaluator::new();

    assert_eq!(select(&evaluator, "protein", &system).count(), 8);
    assert_eq!(select(&evaluator, "water", &system).count(), 2);
    assert_eq!(
        select(&evaluator, "protein and within 5 of water", &system).indices(),
        vec![0, 6, 7]
    );
}

#[test]
fn spatial_predicate_needs_an_explicit_operator() {
    let system = ten_atom_system();
    let err = parse("protein within 5 of water").unwrap_err();
    assert!(matches!(err, SelectionError::Syntax { position: 8, .. }));
    assert!(Evaluator::new().select("protein within 5 of water", &system).is_err());
    assert!(Evaluator::new().select("protein and within 5 of water", &system).is_ok());
}

#[test]
fn negation_is_the_exact_complement() {
    let system = random_system(60, 30.0, 11);
    let evaluator = Evaluator::new();
    for expression in EXPRESSIONS {
        let mask = select(&evaluator, expression, &system);
        let negated = select(&evaluator, &format!("not ({expression})"), &system);
        assert_eq!(negated, mask.not(), "{expression}");
    }
}

#[test]
fn and_equals_elementwise_conjunction() {
    let system = random_system(60, 30.0, 12);
    let evaluator = Evaluator::with_config(EvaluatorConfigBuilder::new().use_cache(false).build());
    for a in SIMPLE {
        for b in SIMPLE {
            let combined = select(&evaluator, &format!("{a} and {b}"), &system);
            let expected = select(&evaluator, a, &system).and(&select(&evaluator, b, &system));
            assert_eq!(combined, expected, "{a} and {b}");
        }
    }
}

#[test]
fn repeated_evaluation_is_idempotent_with_and_without_cache() {
    let system = random_system(50, 25.0, 13);
    let cached = Evaluator::new();
    let uncached = Evaluator::with_config(EvaluatorConfigBuilder::new().use_cache(false).build());
    for expression in EXPRESSIONS {
        let first = select(&cached, expression, &system);
        assert_eq!(select(&cached, expression, &system), first, "{expression}");
        assert_eq!(select(&uncached, expression, &system), first, "{expression}");
        assert_eq!(select(&uncached, expression, &system), first, "{expression}");
    }
    assert!(cached.cache().stats().hits > 0);
}

#[test]
fn explicit_cache_object_gives_the_same_masks() {
    let system = random_system(40, 20.0, 14);
    let cache = atomsel::engine::cache::SelectionCache::new();
    for expression in EXPRESSIONS {
        let node = parse(expression).unwrap();
        let with_cache = evaluate(&node, &system, Some(&cache)).unwrap();
        let without = evaluate(&node, &system, None).unwrap();
        assert_eq!(with_cache, without, "{expression}");
    }
    assert_eq!(cache.version(), Some(system.version()));
}

#[test]
fn mutation_invalidates_cached_masks() {
    let mut system = ten_atom_system();
    let evaluator = Evaluator::new();
    let expression = "protein and within 5 of water";
    assert_eq!(select(&evaluator, expression, &system).indices(), vec![0, 6, 7]);

    let version = system.version();
    system.update_coordinates(|coords| {
        coords[8] = Point3::new(100.0, 0.0, 0.0);
    });
    assert_ne!(system.version(), version);
    assert_eq!(select(&evaluator, expression, &system).indices(), vec![6, 7]);

    system
        .set_coordinates(vec![Point3::origin(); system.len()])
        .unwrap();
    assert_eq!(select(&evaluator, expression, &system).count(), 8);
}

#[test]
fn canonical_form_reparses_to_the_same_tree() {
    for expression in EXPRESSIONS {
        let tree = parse(expression).unwrap();
        assert_eq!(parse(&tree.to_string()).unwrap(), tree, "{expression}");
    }
}

#[test]
fn errors_are_reported_per_category() {
    let system = ten_atom_system();
    let evaluator = Evaluator::new();
    assert!(matches!(
        evaluator.select("resnum > abc", &system),
        Err(SelectionError::InvalidValue { .. })
    ));
    assert!(matches!(
        evaluator.select("charge < 0", &system),
        Err(SelectionError::FieldNotFound { .. })
    ));
    assert!(matches!(
        evaluator.select("(protein", &system),
        Err(SelectionError::Syntax { .. })
    ));
    assert!(matches!(
        evaluator.select("protein", &atomsel::core::models::system::AtomicSystem::empty()),
        Err(SelectionError::EmptyInput)
    ));
}
