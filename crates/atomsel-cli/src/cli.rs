use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "atomsel - select atoms from molecular structures with a small query language and find spatial contacts.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S contacts.radius=4.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", global = true)]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a selection expression against an atom table.
    Select(SelectArgs),
    /// Find pairs of atoms within a distance of each other.
    Contacts(ContactsArgs),
    /// Parse a selection expression and print its canonical form.
    Check(CheckArgs),
}

/// Spatial index used for proximity predicates.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendArg {
    Grid,
    KdTree,
}

/// How to print the selected atoms.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One atom index per line.
    #[default]
    Indices,
    /// Only the number of selected atoms.
    Count,
    /// The selected rows as a CSV atom table.
    Table,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameResidueArg {
    Include,
    Exclude,
}

/// Arguments for the `select` subcommand.
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Path to the input atom table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// The selection expression, e.g. "protein and within 5 of water".
    #[arg(required = true, value_name = "EXPRESSION")]
    pub expression: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Indices)]
    pub format: OutputFormat,

    /// Write the selected atoms as a CSV table to this path instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Override the spatial index backend from the config file.
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Disable the selection cache, overriding the config file.
    #[arg(long)]
    pub no_cache: bool,
}

/// Arguments for the `contacts` subcommand.
#[derive(Args, Debug)]
pub struct ContactsArgs {
    /// Path to the input atom table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Contact distance. Overrides `contacts.radius` from the config file.
    #[arg(short, long, value_name = "FLOAT")]
    pub radius: Option<f64>,

    /// Selection of the first atom set. Defaults to all atoms.
    #[arg(long, value_name = "EXPRESSION")]
    pub first: Option<String>,

    /// Selection of the second atom set. Without it, contacts within the first set are reported.
    #[arg(long, value_name = "EXPRESSION")]
    pub second: Option<String>,

    /// Whether self-contacts between atoms of one residue are reported.
    #[arg(long, value_enum)]
    pub same_residue: Option<SameResidueArg>,

    /// Override the spatial index backend from the config file.
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// The selection expression to parse.
    #[arg(required = true, value_name = "EXPRESSION")]
    pub expression: String,
}
