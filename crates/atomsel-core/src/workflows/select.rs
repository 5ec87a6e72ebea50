use crate::core::models::system::AtomicSystem;
use crate::core::select::parse;
use crate::engine::config::EvaluatorConfig;
use crate::engine::error::SelectionError;
use crate::engine::evaluator::Evaluator;
use crate::engine::mask::Mask;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    /// The expression in canonical form.
    pub canonical: String,
    pub mask: Mask,
}

impl SelectionResult {
    pub fn count(&self) -> usize {
        self.mask.count()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.mask.indices()
    }
}

/// Parses `expression` and evaluates it against `system`.
#[instrument(skip_all, name = "select_workflow")]
pub fn run(
    system: &AtomicSystem,
    expression: &str,
    config: &EvaluatorConfig,
) -> Result<SelectionResult, SelectionError> {
    let node = parse(expression)?;
    let canonical = node.to_string();
    info!(selection = %canonical, atoms = system.len(), "Evaluating selection.");

    let mask = Evaluator::with_config(*config).evaluate(&node, system)?;

    info!(
        "Selection complete. {} of {} atom(s) selected.",
        mask.count(),
        system.len()
    );
    Ok(SelectionResult { canonical, mask })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::builder::AtomicSystemBuilder;
    use nalgebra::Point3;

    fn system() -> AtomicSystem {
        let mut builder = AtomicSystemBuilder::new();
        builder
            .add_atom(Atom::new("CA", "ALA", 1, "A", Point3::new(0.0, 0.0, 0.0)))
            .add_atom(Atom::new("CB", "ALA", 1, "A", Point3::new(1.0, 0.0, 0.0)))
            .add_atom(Atom::new("OW", "HOH", 2, "W", Point3::new(2.0, 0.0, 0.0)));
        builder.build().unwrap()
    }

    #[test]
    fn run_reports_canonical_text_and_mask() {
        let result = run(&system(), "name CA or water", &EvaluatorConfig::default()).unwrap();
        assert_eq!(result.canonical, "(name CA or water)");
        assert_eq!(result.indices(), vec![0, 2]);
        assert_eq!(result.count(), 2);
    }

    #[test]
    fn run_propagates_parse_errors() {
        assert!(matches!(
            run(&system(), "name", &EvaluatorConfig::default()),
            Err(SelectionError::Syntax { .. })
        ));
    }
}
