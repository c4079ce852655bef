//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use ado_mcp_common::{Config, LogFormat};

use crate::error::Result;

/// MCP server for Azure DevOps variable groups and service connections.
///
/// Configuration is read from the environment (and `.env`) unless a TOML
/// file is given. Flags override either source.
#[derive(Debug, Parser)]
#[command(name = "ado-mcp", version, about)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "ADO_MCP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, ignore_case = true, value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: Option<String>,

    /// Logging format: json or text
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Start serving without first checking that Azure DevOps is reachable
    #[arg(long)]
    pub skip_connection_check: bool,
}

impl Cli {
    /// Loads the configuration and applies flag overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or is invalid.
    pub fn load_config(&self) -> Result<Config> {
        let config = Config::load(self.config.as_deref())?;
        Ok(self.apply(config))
    }

    /// Applies flag overrides to an already loaded configuration.
    #[must_use]
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(level) = &self.log_level {
            config = config.with_log_level(level.to_uppercase());
        }
        if let Some(format) = self.log_format {
            config = config.with_log_format(format);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["ado-mcp"]).unwrap();
        assert!(cli.log_level.is_none());
        assert!(cli.log_format.is_none());
        assert!(!cli.skip_connection_check);
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::try_parse_from([
            "ado-mcp",
            "--log-level",
            "debug",
            "--log-format",
            "TEXT",
            "--skip-connection-check",
        ])
        .unwrap();

        let config = cli.apply(Config::new("contoso", "test-pat"));
        assert_eq!(config.log_level, "DEBUG");
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(cli.skip_connection_check);
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!(Cli::try_parse_from(["ado-mcp", "--log-level", "TRACE"]).is_err());
        assert!(Cli::try_parse_from(["ado-mcp", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn test_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ado-mcp.toml");
        std::fs::write(
            &path,
            "organization = \"contoso\"\npersonal_access_token = \"file-pat\"\nlog_level = \"ERROR\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "ado-mcp",
            "--config",
            path.to_str().unwrap(),
            "--log-level",
            "warning",
        ])
        .unwrap();

        let config = cli.load_config().unwrap();
        assert_eq!(config.organization, "contoso");
        assert_eq!(config.log_level, "WARNING");
    }
}
