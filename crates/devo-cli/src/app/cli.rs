//! Command-line surface of the child application.

use clap::{Parser, Subcommand};
use devo_plugins::PluginKind;

/// devo: builds machine images through external plugins.
#[derive(Parser, Debug)]
#[command(
    name = "devo",
    version,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
pub(crate) struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub(crate) command: Option<CliCommand>,
}

/// Commands understood by devo.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Prints the devo version.
    Version,
    /// Lists resolved plugins as `<kind> <name> => <path>`.
    Plugins {
        /// Restricts the listing to one kind (builder, post-processor or
        /// provisioner).
        #[arg(long)]
        kind: Option<PluginKind>,
    },
}
