use super::cache::SelectionCache;
use super::config::{EvaluatorConfig, SpatialBackend};
use super::error::SelectionError;
use super::mask::Mask;
use super::spatial::{NeighborSearch, SpatialIndex};
use crate::core::models::field::{Field, TextField};
use crate::core::models::system::AtomicSystem;
use crate::core::select::ast::{Keyword, Node, NumericTest, SameEntity, Test, TextPattern};
use crate::core::select::parse;
use crate::core::utils::identifiers as ids;
use nalgebra::Point3;
use rustc_hash::FxHashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, instrument, trace};

#[derive(Debug)]
struct BuiltIndex {
    version: u64,
    backend: SpatialBackend,
    index: Arc<SpatialIndex>,
}

/// Lazily built spatial index over all atoms of the last system queried.
///
/// Rebuilt when the system version or backend changes, or when a radius larger
/// than the built one is requested. An index built for a larger radius serves
/// smaller ones.
#[derive(Debug, Default)]
pub(crate) struct IndexSlot {
    built: Mutex<Option<BuiltIndex>>,
    rebuilds: AtomicUsize,
}

impl IndexSlot {
    fn acquire(
        &self,
        system: &AtomicSystem,
        backend: SpatialBackend,
        radius: f64,
    ) -> Result<Arc<SpatialIndex>, SelectionError> {
        let mut built = self.built.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = built.as_ref()
            && current.version == system.version()
            && current.backend == backend
            && current.index.max_radius() >= radius
        {
            let built_radius = current.index.max_radius();
            if built_radius.is_finite() && built_radius > radius {
                debug!(
                    version = system.version(),
                    radius,
                    built_radius,
                    "Reusing spatial index built for a larger radius."
                );
            }
            return Ok(Arc::clone(&current.index));
        }

        debug!(
            version = system.version(),
            radius,
            ?backend,
            atoms = system.len(),
            "Building spatial index."
        );
        let index = Arc::new(SpatialIndex::build(
            backend,
            system.coordinates(),
            None,
            radius,
        )?);
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
        *built = Some(BuiltIndex {
            version: system.version(),
            backend,
            index: Arc::clone(&index),
        });
        Ok(index)
    }

    fn rebuilds(&self) -> usize {
        self.rebuilds.load(Ordering::Relaxed)
    }

    fn clear(&self) {
        *self.built.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Evaluates a parsed selection against `system`.
///
/// When `cache` is given, masks of every sub-expression are looked up and
/// stored under the system's current version. Proximity predicates use a grid
/// index built for this call only; use [`Evaluator`] to keep it across calls.
///
/// # Errors
///
/// - [`SelectionError::EmptyInput`] if the system has no atoms.
/// - [`SelectionError::FieldNotFound`] if an optional column is missing.
/// - [`SelectionError::InvalidValue`] if a proximity predicate meets a
///   non-finite coordinate.
pub fn evaluate(
    node: &Node,
    system: &AtomicSystem,
    cache: Option<&SelectionCache>,
) -> Result<Mask, SelectionError> {
    let slot = IndexSlot::default();
    Evaluation::new(node, system, cache, &slot, SpatialBackend::default()).run(node)
}

/// Stateful evaluator owning a selection cache and a spatial index.
///
/// Both are scoped to the version of the system last queried and dropped or
/// rebuilt automatically when it changes.
#[derive(Debug, Default)]
pub struct Evaluator {
    config: EvaluatorConfig,
    cache: SelectionCache,
    index: IndexSlot,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EvaluatorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn cache(&self) -> &SelectionCache {
        &self.cache
    }

    /// Number of times the spatial index has been (re)built.
    pub fn index_rebuilds(&self) -> usize {
        self.index.rebuilds()
    }

    /// Drops cached masks and the spatial index.
    pub fn reset(&self) {
        self.cache.clear();
        self.index.clear();
    }

    /// Parses and evaluates `expression`.
    #[instrument(level = "debug", skip_all, fields(expression = %expression))]
    pub fn select(&self, expression: &str, system: &AtomicSystem) -> Result<Mask, SelectionError> {
        let node = parse(expression)?;
        self.evaluate(&node, system)
    }

    pub fn evaluate(&self, node: &Node, system: &AtomicSystem) -> Result<Mask, SelectionError> {
        let cache = self.config.use_cache.then_some(&self.cache);
        Evaluation::new(node, system, cache, &self.index, self.config.backend).run(node)
    }
}

/// One walk over a syntax tree.
struct Evaluation<'a> {
    system: &'a AtomicSystem,
    cache: Option<&'a SelectionCache>,
    slot: &'a IndexSlot,
    backend: SpatialBackend,
    /// Largest radius in the tree, so one index build serves every predicate.
    radius_class: f64,
}

impl<'a> Evaluation<'a> {
    fn new(
        root: &Node,
        system: &'a AtomicSystem,
        cache: Option<&'a SelectionCache>,
        slot: &'a IndexSlot,
        backend: SpatialBackend,
    ) -> Self {
        Self {
            system,
            cache,
            slot,
            backend,
            radius_class: root.max_radius().unwrap_or(0.0),
        }
    }

    fn run(&self, root: &Node) -> Result<Mask, SelectionError> {
        if self.system.is_empty() {
            return Err(SelectionError::EmptyInput);
        }
        self.eval(root)
    }

    fn eval(&self, node: &Node) -> Result<Mask, SelectionError> {
        let Some(cache) = self.cache else {
            return self.compute(node);
        };
        let key = node.canonical();
        let version = self.system.version();
        if let Some(mask) = cache.get(&key, version) {
            trace!(key = %key, "Selection cache hit.");
            return Ok(mask);
        }
        let mask = self.compute(node)?;
        cache.insert(key, version, mask.clone());
        Ok(mask)
    }

    fn compute(&self, node: &Node) -> Result<Mask, SelectionError> {
        match node {
            Node::Keyword(keyword) => Ok(self.keyword(*keyword)),
            Node::Comparison { field, test } => self.comparison(*field, test),
            Node::Not(inner) => Ok(self.eval(inner)?.not()),
            Node::And(l, r) => {
                let (l, r) = self.both(l, r)?;
                Ok(l.and(&r))
            }
            Node::Or(l, r) => {
                let (l, r) = self.both(l, r)?;
                Ok(l.or(&r))
            }
            Node::Within { radius, target } => {
                let target = self.eval(target)?;
                self.within(*radius, &target)
            }
            Node::Exwithin { radius, target } => {
                let target = self.eval(target)?;
                Ok(self.within(*radius, &target)?.and_not(&target))
            }
            Node::SameAs { entity, target } => {
                let target = self.eval(target)?;
                self.same_as(*entity, &target)
            }
        }
    }

    /// Evaluates both children; neither is skipped based on the other's result.
    fn both(&self, l: &Node, r: &Node) -> Result<(Mask, Mask), SelectionError> {
        #[cfg(feature = "parallel")]
        let (l, r) = rayon::join(|| self.eval(l), || self.eval(r));

        #[cfg(not(feature = "parallel"))]
        let (l, r) = (self.eval(l), self.eval(r));

        Ok((l?, r?))
    }

    fn keyword(&self, keyword: Keyword) -> Mask {
        let system = self.system;
        let n = system.len();
        let names = system.text_column(TextField::Name).unwrap_or_default();
        let resnames = system.text_column(TextField::Resname).unwrap_or_default();
        let elements = system.text_column(TextField::Element);

        let by_resname = |predicate: fn(&str) -> bool| -> Mask {
            resnames.iter().map(|r| predicate(r)).collect()
        };
        let hydrogen = || -> Mask {
            (0..n)
                .map(|i| ids::is_hydrogen(&names[i], elements.map(|e| e[i].as_str())))
                .collect()
        };

        match keyword {
            Keyword::All => Mask::all(n),
            Keyword::None => Mask::none(n),
            Keyword::Protein => by_resname(ids::is_protein_residue),
            Keyword::Water => by_resname(ids::is_water_residue),
            Keyword::Nucleic => by_resname(ids::is_nucleic_residue),
            Keyword::Ion => by_resname(ids::is_ion_residue),
            Keyword::Acidic => by_resname(ids::is_acidic_residue),
            Keyword::Basic => by_resname(ids::is_basic_residue),
            Keyword::Aromatic => by_resname(ids::is_aromatic_residue),
            Keyword::Hydrophobic => by_resname(ids::is_hydrophobic_residue),
            Keyword::Charged => {
                by_resname(|r| ids::is_acidic_residue(r) || ids::is_basic_residue(r))
            }
            Keyword::Hetero => {
                by_resname(|r| !ids::is_protein_residue(r) && !ids::is_nucleic_residue(r))
            }
            Keyword::Backbone => (0..n)
                .map(|i| ids::is_protein_residue(&resnames[i]) && ids::is_backbone_atom(&names[i]))
                .collect(),
            Keyword::Sidechain => (0..n)
                .map(|i| {
                    ids::is_protein_residue(&resnames[i])
                        && !ids::is_backbone_atom(&names[i])
                        && !ids::is_backbone_hydrogen(&names[i])
                })
                .collect(),
            Keyword::Calpha => (0..n)
                .map(|i| ids::is_protein_residue(&resnames[i]) && names[i].trim() == "CA")
                .collect(),
            Keyword::Hydrogen => hydrogen(),
            Keyword::Heavy => hydrogen().not(),
        }
    }

    fn comparison(&self, field: Field, test: &Test) -> Result<Mask, SelectionError> {
        let missing = || SelectionError::FieldNotFound {
            field: field.name().to_string(),
        };
        match (field, test) {
            (Field::Text(f), Test::Text { negated, patterns }) => {
                let column = self.system.text_column(f).ok_or_else(missing)?;
                Ok(text_mask(column, patterns, *negated))
            }
            (Field::Integer(f), Test::Numeric(test)) => {
                let column = self.system.integer_column(f).ok_or_else(missing)?;
                Ok(column.iter().map(|&v| test.matches_integer(v)).collect())
            }
            (Field::Float(f), Test::Numeric(test)) => {
                let column = self.system.float_column(f).ok_or_else(missing)?;
                Ok(float_mask(&column, test))
            }
            _ => Err(SelectionError::InvalidValue {
                value: field.name().to_string(),
                message: format!("test does not match the type of field '{field}'"),
                position: None,
            }),
        }
    }

    fn within(&self, radius: f64, target: &Mask) -> Result<Mask, SelectionError> {
        let n = self.system.len();
        if !target.any() {
            return Ok(Mask::none(n));
        }
        let index = self
            .slot
            .acquire(self.system, self.backend, self.radius_class.max(radius))?;

        let coordinates = self.system.coordinates();
        let queries: Vec<Point3<f64>> = target.iter_indices().map(|i| coordinates[i]).collect();
        let neighbors = index.query_within_set(&queries, radius)?;

        let mut result = Mask::none(n);
        for neighbor in neighbors {
            result.set(neighbor.index, true);
        }
        Ok(result)
    }

    fn same_as(&self, entity: SameEntity, target: &Mask) -> Result<Mask, SelectionError> {
        let missing = |field: Field| SelectionError::FieldNotFound {
            field: field.name().to_string(),
        };
        let mask = match entity {
            SameEntity::Residue => {
                let resindices = self.system.resindices();
                group_mask(resindices, target, |&r| r)
            }
            SameEntity::Field(field @ Field::Text(f)) => {
                let column = self.system.text_column(f).ok_or_else(|| missing(field))?;
                group_mask(column, target, |v| v.as_str())
            }
            SameEntity::Field(field @ Field::Integer(f)) => {
                let column = self
                    .system
                    .integer_column(f)
                    .ok_or_else(|| missing(field))?;
                group_mask(&column[..], target, |&v| v)
            }
            SameEntity::Field(field @ Field::Float(f)) => {
                let column = self.system.float_column(f).ok_or_else(|| missing(field))?;
                // Compare by bit pattern, folding -0.0 into 0.0.
                group_mask(&column[..], target, |&v| (v + 0.0).to_bits())
            }
        };
        Ok(mask)
    }
}

fn text_mask(column: &[String], patterns: &[TextPattern], negated: bool) -> Mask {
    column
        .iter()
        .map(|value| patterns.iter().any(|p| p.matches(value)) != negated)
        .collect()
}

fn float_mask(column: &[f64], test: &NumericTest) -> Mask {
    column.iter().map(|&v| test.matches_float(v)).collect()
}

/// Selects every atom whose key occurs among the atoms of `target`.
fn group_mask<'c, T, K, F>(column: &'c [T], target: &Mask, key: F) -> Mask
where
    K: std::hash::Hash + Eq,
    F: Fn(&'c T) -> K,
{
    let keys: FxHashSet<K> = target.iter_indices().map(|i| key(&column[i])).collect();
    column.iter().map(|v| keys.contains(&key(v))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::builder::AtomicSystemBuilder;
    use crate::core::models::system::Columns;
    use crate::engine::config::EvaluatorConfigBuilder;

    fn peptide_with_water() -> AtomicSystem {
        let mut builder = AtomicSystemBuilder::new();
        builder
            .add_atom(Atom::new("N", "ALA", 1, "A", Point3::new(0.0, 0.0, 0.0)).with_element("N"))
            .add_atom(Atom::new("CA", "ALA", 1, "A", Point3::new(1.5, 0.0, 0.0)).with_element("C"))
            .add_atom(Atom::new("CB", "ALA", 1, "A", Point3::new(1.5, 1.5, 0.0)).with_element("C"))
            .add_atom(Atom::new("HA", "ALA", 1, "A", Point3::new(1.5, -1.0, 0.0)).with_element("H"))
            .add_atom(Atom::new("N", "LYS", 2, "A", Point3::new(3.0, 0.0, 0.0)).with_element("N"))
            .add_atom(Atom::new("CA", "LYS", 2, "A", Point3::new(4.5, 0.0, 0.0)).with_element("C"))
            .add_atom(Atom::new("NZ", "LYS", 2, "A", Point3::new(9.0, 0.0, 0.0)).with_element("N"))
            .add_atom(Atom::new("OW", "HOH", 10, "W", Point3::new(10.0, 0.0, 0.0)).with_element("O"))
            .add_atom(Atom::new("OW", "HOH", 11, "W", Point3::new(30.0, 0.0, 0.0)).with_element("O"))
            .add_atom(Atom::new("NA", "NA", 12, "I", Point3::new(-20.0, 0.0, 0.0)).with_element("NA"));
        builder.build().unwrap()
    }

    fn select(expression: &str, system: &AtomicSystem) -> Vec<usize> {
        Evaluator::new().select(expression, system).unwrap().indices()
    }

    #[test]
    fn keywords_classify_atoms() {
        let system = peptide_with_water();
        assert_eq!(select("protein", &system), vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(select("water", &system), vec![7, 8]);
        assert_eq!(select("ion", &system), vec![9]);
        assert_eq!(select("backbone", &system), vec![0, 1, 4, 5]);
        assert_eq!(select("sidechain", &system), vec![2, 6]);
        assert_eq!(select("calpha", &system), vec![1, 5]);
        assert_eq!(select("hydrogen", &system), vec![3]);
        assert_eq!(select("heavy", &system).len(), 9);
        assert_eq!(select("basic", &system), vec![4, 5, 6]);
        assert_eq!(select("charged", &system), vec![4, 5, 6]);
        assert_eq!(select("hydrophobic", &system), vec![0, 1, 2, 3]);
        assert_eq!(select("hetero", &system), vec![7, 8, 9]);
        assert_eq!(select("all", &system).len(), 10);
        assert!(select("none", &system).is_empty());
    }

    #[test]
    fn comparisons_cover_text_numeric_and_derived_fields() {
        let system = peptide_with_water();
        assert_eq!(select("name CA CB", &system), vec![1, 2, 5]);
        assert_eq!(select("name C*", &system), vec![1, 2, 5]);
        assert_eq!(select("chain != A", &system), vec![7, 8, 9]);
        assert_eq!(select("resnum 2 to 10", &system), vec![4, 5, 6, 7]);
        assert_eq!(select("resid < 2", &system), vec![0, 1, 2, 3]);
        assert_eq!(select("index 0 9", &system), vec![0, 9]);
        assert_eq!(select("resindex 1", &system), vec![4, 5, 6]);
        assert_eq!(select("x >= 10", &system), vec![7, 8]);
        assert_eq!(select("element N", &system), vec![0, 4, 6]);
    }

    #[test]
    fn boolean_operators_combine_masks() {
        let system = peptide_with_water();
        assert_eq!(select("protein and name CA", &system), vec![1, 5]);
        assert_eq!(select("water or ion", &system), vec![7, 8, 9]);
        assert_eq!(select("not protein", &system), vec![7, 8, 9]);
        assert_eq!(select("protein name N", &system), vec![0, 4]);
    }

    #[test]
    fn within_includes_targets_and_exwithin_excludes_them() {
        let system = peptide_with_water();
        assert_eq!(select("within 1.5 of name NZ", &system), vec![6, 7]);
        assert_eq!(select("exwithin 1.5 of name NZ", &system), vec![7]);
        assert_eq!(select("within 0 of water", &system), vec![7, 8]);
        assert_eq!(select("within 1000 of ion", &system).len(), 10);
        assert!(select("within 5 of none", &system).is_empty());
    }

    #[test]
    fn same_as_expands_to_groups() {
        let system = peptide_with_water();
        assert_eq!(select("same residue as name NZ", &system), vec![4, 5, 6]);
        assert_eq!(select("same chain as index 8", &system), vec![7, 8]);
        assert_eq!(
            select("same residue as within 1.5 of water", &system),
            vec![4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn missing_optional_column_is_field_not_found() {
        let system = peptide_with_water();
        let err = Evaluator::new().select("beta > 10", &system).unwrap_err();
        assert_eq!(
            err,
            SelectionError::FieldNotFound {
                field: "beta".into()
            }
        );
        assert!(matches!(
            Evaluator::new().select("same segment as protein", &system),
            Err(SelectionError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn empty_system_is_empty_input() {
        let system = AtomicSystem::empty();
        assert_eq!(
            evaluate(&parse("all").unwrap(), &system, None),
            Err(SelectionError::EmptyInput)
        );
    }

    #[test]
    fn non_finite_coordinates_fail_proximity_predicates_only() {
        let columns = Columns {
            names: vec!["CA".into(), "OW".into()],
            resnames: vec!["ALA".into(), "HOH".into()],
            resnums: vec![1, 2],
            chains: vec!["A".into(), "W".into()],
            coordinates: vec![Point3::origin(), Point3::new(f64::NAN, 0.0, 0.0)],
            ..Columns::default()
        };
        let system = AtomicSystem::from_columns(columns).unwrap();
        let evaluator = Evaluator::new();
        assert_eq!(evaluator.select("water", &system).unwrap().indices(), vec![1]);
        assert!(matches!(
            evaluator.select("within 3 of water", &system),
            Err(SelectionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn cache_hits_are_counted_and_results_match_uncached() {
        let system = peptide_with_water();
        let cached = Evaluator::new();
        let uncached = Evaluator::with_config(EvaluatorConfigBuilder::new().use_cache(false).build());
        let expression = "protein and within 5 of water";

        let first = cached.select(expression, &system).unwrap();
        let second = cached.select(expression, &system).unwrap();
        assert_eq!(first, second);
        assert!(cached.cache().stats().hits >= 1);
        assert_eq!(first, uncached.select(expression, &system).unwrap());
        assert!(uncached.cache().is_empty());
    }

    #[test]
    fn index_is_reused_for_smaller_radii_and_rebuilt_for_larger_ones() {
        let system = peptide_with_water();
        let evaluator = Evaluator::with_config(EvaluatorConfigBuilder::new().use_cache(false).build());

        evaluator.select("within 4 of water", &system).unwrap();
        assert_eq!(evaluator.index_rebuilds(), 1);
        evaluator.select("within 2 of water", &system).unwrap();
        assert_eq!(evaluator.index_rebuilds(), 1);
        evaluator.select("within 6 of water", &system).unwrap();
        assert_eq!(evaluator.index_rebuilds(), 2);
    }

    #[test]
    fn version_change_invalidates_cache_and_index() {
        let mut system = peptide_with_water();
        let evaluator = Evaluator::new();

        let before = evaluator.select("within 2 of water", &system).unwrap();
        assert_eq!(before.indices(), vec![6, 7, 8]);

        system.update_coordinates(|coords| coords[8] = Point3::new(-20.5, 0.0, 0.0));
        let after = evaluator.select("within 2 of water", &system).unwrap();
        assert_eq!(after.indices(), vec![6, 7, 8, 9]);
        assert_eq!(evaluator.index_rebuilds(), 2);
    }

    #[test]
    fn kd_tree_backend_matches_grid() {
        let system = peptide_with_water();
        let kd = Evaluator::with_config(
            EvaluatorConfigBuilder::new()
                .backend(SpatialBackend::KdTree)
                .build(),
        );
        for expression in ["within 1.5 of name NZ", "exwithin 4 of protein", "within 0 of ion"] {
            assert_eq!(
                kd.select(expression, &system).unwrap(),
                Evaluator::new().select(expression, &system).unwrap(),
                "{expression}"
            );
        }
    }
}
