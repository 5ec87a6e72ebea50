pub mod check;
pub mod contacts;
pub mod select;

use crate::error::{CliError, Result};
use atomsel::core::io::table;
use atomsel::core::models::system::AtomicSystem;
use atomsel::core::select::SelectionError;
use std::path::Path;
use tracing::info;

fn load_table(path: &Path) -> Result<AtomicSystem> {
    info!("Loading atom table from {:?}", path);
    let system = table::read_table(path).map_err(|e| CliError::table(path, e))?;
    info!(
        "Loaded {} atom(s) in {} residue(s).",
        system.len(),
        system.residue_count()
    );
    Ok(system)
}

/// Echoes `expression` with a caret under the offending token before the
/// error is propagated.
fn explain(expression: &str, error: SelectionError) -> CliError {
    if error.position().is_some() {
        eprintln!("{}", error.render(expression));
    }
    error.into()
}
