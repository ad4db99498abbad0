use crate::error::ConfigError;
use std::path::{Path, PathBuf};

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    is_sql_identifier, DatabaseSettings, ResourceSettings, ServerSettings, Settings,
};

/// The file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides, e.g. `MARQUEE__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "MARQUEE";

/// Command-line flags for locating the configuration file.
#[cfg_attr(feature = "clap", derive(clap::Args))]
#[derive(Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to the TOML configuration file [default: config.toml, optional]
    #[cfg_attr(feature = "clap", arg(long, short = 'c'))]
    pub config: Option<PathBuf>,
}

/// Loads and validates the service configuration.
///
/// Sources are layered, later ones winning:
/// 1. the TOML file (`config.toml` in the working directory when `path` is
///    `None`, in which case a missing file is fine),
/// 2. `MARQUEE__*` environment variables,
/// 3. `DATABASE_URL`, after loading a `.env` file if one exists.
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();

    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?.validate()?;
    tracing::debug!(
        resources = settings.resources.len(),
        "Configuration loaded."
    );
    Ok(settings)
}

/// Parses configuration from TOML text alone, without consulting the
/// environment. Used by tests and by tooling that embeds a config.
pub fn load_config_from_str(toml: &str) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;
    builder.try_deserialize::<Settings>()?.validate()
}
