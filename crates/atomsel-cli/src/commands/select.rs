use super::{explain, load_table};
use crate::cli::{OutputFormat, SelectArgs};
use crate::config::PartialAppConfig;
use crate::error::{CliError, Result};
use atomsel::core::io::table;
use atomsel::workflows;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing::info;

pub fn run(args: SelectArgs, config: PartialAppConfig) -> Result<()> {
    let evaluator_config = config.merge_select(&args);
    let system = load_table(&args.input)?;

    let result = workflows::select::run(&system, &args.expression, &evaluator_config)
        .map_err(|e| explain(&args.expression, e))?;
    info!(
        "'{}' selected {} of {} atom(s).",
        result.canonical,
        result.count(),
        system.len()
    );

    if let Some(output) = &args.output {
        let mut writer = BufWriter::new(File::create(output)?);
        let rows = table::write_table(&system, Some(&result.mask), &mut writer)
            .map_err(|e| CliError::table(output, e))?;
        writer.flush()?;
        println!("Wrote {} atom(s) to {}", rows, output.display());
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match args.format {
        OutputFormat::Count => writeln!(out, "{}", result.count())?,
        OutputFormat::Indices => {
            for index in result.mask.iter_indices() {
                writeln!(out, "{}", index)?;
            }
        }
        OutputFormat::Table => {
            table::write_table(&system, Some(&result.mask), &mut out)
                .map_err(|e| CliError::Other(e.into()))?;
        }
    }
    out.flush()?;
    Ok(())
}
