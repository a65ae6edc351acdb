//! The application run by the supervised child.
//!
//! Everything the commands need is gathered once into an [`AppContext`] and
//! passed explicitly; there are no process-wide command or plugin tables.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use devo_config::{Config, ConfigError};
use devo_plugins::{
    BuiltinCatalog, DiscoveryError, PluginDiscovery, PluginKind, PluginRegistry, SearchContext,
};
use thiserror::Error;
use tracing::{debug, warn};

mod cli;

use self::cli::{Cli, CliCommand};
use crate::ui::TaggedUi;

const APP_TARGET: &str = "devo_cli::app";

/// Version reported by `devo version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors surfaced by the child application.
#[derive(Debug, Error)]
pub enum AppError {
    /// The configuration file could not be loaded.
    #[error("failed to load configuration: {source}")]
    Config {
        /// Underlying configuration error.
        #[source]
        source: ConfigError,
    },
    /// Plugin discovery failed.
    #[error("failed to discover plugins: {source}")]
    Discovery {
        /// Underlying discovery error.
        #[source]
        source: DiscoveryError,
    },
    /// Command-line arguments were invalid.
    #[error("{0}")]
    Usage(clap::Error),
    /// Writing to the user failed.
    #[error("failed to write output: {source}")]
    Output {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl From<ConfigError> for AppError {
    fn from(source: ConfigError) -> Self {
        Self::Config { source }
    }
}

impl From<DiscoveryError> for AppError {
    fn from(source: DiscoveryError) -> Self {
        Self::Discovery { source }
    }
}

impl From<io::Error> for AppError {
    fn from(source: io::Error) -> Self {
        Self::Output { source }
    }
}

/// State shared by every command for one run.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: Config,
    plugins: PluginRegistry,
    catalog: BuiltinCatalog,
    run_id: Option<String>,
}

impl AppContext {
    /// Assembles a context from already resolved parts.
    #[must_use]
    pub const fn new(
        config: Config,
        plugins: PluginRegistry,
        catalog: BuiltinCatalog,
        run_id: Option<String>,
    ) -> Self {
        Self {
            config,
            plugins,
            catalog,
            run_id,
        }
    }

    /// Loads the configuration and discovers plugins.
    ///
    /// Configuration file mappings seed the registry, so every discovered
    /// plugin overrides them. A missing home directory falls back to the
    /// default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] when the configuration file is unreadable
    /// or invalid, and [`AppError::Discovery`] when discovery fails.
    pub fn bootstrap(catalog: BuiltinCatalog, search: &SearchContext) -> Result<Self, AppError> {
        let config = match Config::load() {
            Ok(config) => config,
            Err(ConfigError::HomeDirectory) => {
                warn!(
                    target: APP_TARGET,
                    "home directory unavailable; using default configuration"
                );
                Config::default()
            }
            Err(error) => return Err(error.into()),
        };
        let plugins = discover_plugins(&config, &catalog, search)?;
        let run_id = std::env::var(devo_config::env::RUN_ID).ok();
        Ok(Self::new(config, plugins, catalog, run_id))
    }

    /// Loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Resolved plugins.
    #[must_use]
    pub const fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Plugins compiled into this binary.
    #[must_use]
    pub const fn catalog(&self) -> &BuiltinCatalog {
        &self.catalog
    }

    /// Identifier of this run, when supervised.
    #[must_use]
    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }
}

/// Seeds the registry from `config` and runs discovery over it.
///
/// # Errors
///
/// Returns [`AppError::Discovery`] when discovery fails.
pub fn discover_plugins(
    config: &Config,
    catalog: &BuiltinCatalog,
    search: &SearchContext,
) -> Result<PluginRegistry, AppError> {
    let mut seed = PluginRegistry::new();
    seed.seed(PluginKind::Builder, config.builders());
    seed.seed(PluginKind::PostProcessor, config.post_processors());
    seed.seed(PluginKind::Provisioner, config.provisioners());
    Ok(PluginDiscovery::new(catalog).discover(seed, search)?)
}

/// Parses `args` and runs the selected command.
///
/// Help and version requests print on the output tag and succeed. Usage and
/// command errors print on the error tag and exit with code 1.
pub fn run<I, W>(args: I, context: &AppContext, ui: &mut TaggedUi<W>) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
{
    match dispatch(args, context, ui) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            debug!(target: APP_TARGET, error = %error, "command failed");
            let _ = ui.error(&error.to_string());
            ExitCode::FAILURE
        }
    }
}

fn dispatch<I, W>(args: I, context: &AppContext, ui: &mut TaggedUi<W>) -> Result<(), AppError>
where
    I: IntoIterator<Item = OsString>,
    W: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) if is_informational(error.kind()) => {
            ui.output(&error.render().to_string())?;
            return Ok(());
        }
        Err(error) => return Err(AppError::Usage(error)),
    };

    match cli.command {
        Some(CliCommand::Version) => ui.output(&format!("Devo v{VERSION}"))?,
        Some(CliCommand::Plugins { kind }) => list_plugins(context, kind, ui)?,
        None => {
            let help = <Cli as clap::CommandFactory>::command().render_help();
            ui.output(&help.to_string())?;
        }
    }
    Ok(())
}

const fn is_informational(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

fn list_plugins<W: Write>(
    context: &AppContext,
    only: Option<PluginKind>,
    ui: &mut TaggedUi<W>,
) -> io::Result<()> {
    let kinds = only.map_or_else(|| PluginKind::ALL.to_vec(), |kind| vec![kind]);
    for kind in kinds {
        for (name, path) in context.plugins().entries(kind) {
            ui.output(&format!("{kind} {name} => {path}"))?;
        }
    }
    Ok(())
}
