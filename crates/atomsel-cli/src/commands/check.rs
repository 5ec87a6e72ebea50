use super::explain;
use crate::cli::CheckArgs;
use crate::error::Result;
use atomsel::core::select::parse;
use tracing::info;

pub fn run(args: CheckArgs) -> Result<()> {
    let tree = parse(&args.expression).map_err(|e| explain(&args.expression, e))?;
    info!("Expression parsed successfully.");
    println!("{}", tree);
    Ok(())
}
