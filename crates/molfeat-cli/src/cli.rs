use clap::{Args, Parser, Subcommand};
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
    about = "molfeat CLI - inspect, convert and assemble precomputed molecular and atomic feature files.",
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
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a molecule-level feature file and print a summary of its contents.
    Inspect(InspectArgs),
    /// Convert a molecule-level feature file into a compressed .npz archive.
    Convert(ConvertArgs),
    /// Load per-atom descriptors for a list of molecules.
    Atoms(AtomsArgs),
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Feature file (.npz, .npy, .csv, .txt, .pkl, .pckl or .pickle).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Feature file in any supported format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Destination archive. `.npz` is appended if missing.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arguments for the `atoms` subcommand.
#[derive(Args, Debug)]
pub struct AtomsArgs {
    /// Atom descriptor file (.pkl, .pckl, .pickle or .sdf).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// CSV file with a header line listing the molecules, one SMILES per row.
    /// Required for .sdf input.
    #[arg(short, long, value_name = "PATH")]
    pub smiles: Option<PathBuf>,

    /// Column of the SMILES file that holds the SMILES. Defaults to the first column.
    #[arg(long, value_name = "NAME")]
    pub smiles_column: Option<String>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override `atom-descriptors.smiles-column`: the SD data field that identifies records.
    #[arg(long, value_name = "NAME")]
    pub index_field: Option<String>,

    /// Override `atom-descriptors.columns`: the SD data fields to read, comma-separated.
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Pad descriptor lists shorter than the atom count with zeros instead of failing.
    #[arg(long)]
    pub pad_short: bool,

    /// Write the descriptor blocks to a compressed archive as mol_0, mol_1, ...
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
