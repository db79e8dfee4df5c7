/// Application name
pub const APP_NAME: &str = "Strata";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file looked up by the CLI
pub const DEFAULT_CONFIG_FILE: &str = "strata.toml";

/// Environment variable overriding the configuration file location
pub const CONFIG_ENV_VAR: &str = "STRATA_CONFIG";
