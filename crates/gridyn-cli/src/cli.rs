use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gridyn", author, version, about = "Schema-driven power-system dynamics data decoder", long_about = None)]
pub struct Cli {
    /// Set the logging level (overrides `core.log_level` from the config file)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// Config file to use instead of ~/.gridyn/config.toml
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a DYR or TOML file and report its records and validation issues
    Decode(DecodeArgs),
    /// Re-encode a DYR or TOML file
    Convert(ConvertArgs),
    /// Inspect model schemas
    Schemas {
        #[command(subcommand)]
        command: SchemaCommands,
    },
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Input file (.dyr or .toml; other extensions are sniffed)
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Directory of YAML model schemas
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub schemas: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Fail when any validation issue is reported
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input file (.dyr or .toml; other extensions are sniffed)
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Directory of YAML model schemas
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub schemas: Option<PathBuf>,

    /// Target format
    #[arg(long, value_enum, default_value_t = ConvertTarget::Toml)]
    pub to: ConvertTarget,

    /// Output file (TOML, default stdout) or directory (Arrow)
    #[arg(short, long, value_hint = ValueHint::AnyPath)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// List the models in a schema directory
    List {
        /// Directory of YAML model schemas
        #[arg(long, value_hint = ValueHint::DirPath)]
        schemas: Option<PathBuf>,
        /// Only list models in this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Show the fields of one model
    Show {
        /// Model name (e.g. GENROU)
        model: String,
        /// Directory of YAML model schemas
        #[arg(long, value_hint = ValueHint::DirPath)]
        schemas: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tab-aligned tables
    Summary,
    /// JSON document
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvertTarget {
    /// TOML arrays of tables
    Toml,
    /// One Arrow IPC stream per model
    Arrow,
}
