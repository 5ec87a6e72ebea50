use super::{explain, load_table};
use crate::cli::ContactsArgs;
use crate::config::PartialAppConfig;
use crate::error::Result;
use atomsel::core::select::parse;
use atomsel::workflows;
use std::io::{self, BufWriter, Write};
use tracing::info;

pub fn run(args: ContactsArgs, config: PartialAppConfig) -> Result<()> {
    let contacts_config = config.merge_contacts(&args)?;
    for expression in args.first.iter().chain(args.second.iter()) {
        parse(expression).map_err(|e| explain(expression, e))?;
    }
    let system = load_table(&args.input)?;

    let result = workflows::contacts::run(
        &system,
        args.first.as_deref(),
        args.second.as_deref(),
        &contacts_config,
    )?;

    info!(
        "{} contact(s) involving {} and {} atom(s).",
        result.contacts.len(),
        result.first_in_contact.count(),
        result.second_in_contact.count()
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "index_a,index_b,distance")?;
    for contact in &result.contacts {
        writeln!(
            out,
            "{},{},{:.4}",
            contact.index_a, contact.index_b, contact.distance
        )?;
    }
    out.flush()?;
    Ok(())
}
