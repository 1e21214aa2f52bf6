pub mod cli;
pub mod config;

pub use cli::{Cli, Commands, ConvertArgs, ConvertTarget, DecodeArgs, OutputFormat, SchemaCommands};
pub use config::{load_config, GridynConfig};
