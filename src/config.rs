//! Layered configuration: built-in defaults, optional TOML file, then
//! `CHRONYWATCH__*` environment variables.
//!
//! ```toml
//! [server]
//! listen_addr = "0.0.0.0:5000"
//! refresh = "1s"
//!
//! [command]
//! program = "chronyc"
//! args = ["clients"]
//! sudo = true
//! timeout = "5s"
//!
//! [log]
//! filter = "info"
//! ```
//!
//! Environment example: `CHRONYWATCH__SERVER__LISTEN_ADDR=127.0.0.1:8080`.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::data::duration::{format_duration, parse_duration};
use crate::server::ServerConfig;
use crate::source::CommandSource;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "CHRONYWATCH";

/// Shortest accepted polling interval. Every poll from every open page
/// runs the command once.
pub const MIN_REFRESH: Duration = Duration::from_millis(250);

/// Complete application settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub command: CommandSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind the dashboard to
    pub listen_addr: String,
    /// Browser polling interval, e.g. "1s"
    pub refresh: String,
    /// Prefix for `/metrics` series
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandSettings {
    pub program: String,
    pub args: Vec<String>,
    /// Run through `sudo -n`
    pub sudo: bool,
    /// Hard limit per invocation, e.g. "5s"
    pub timeout: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            refresh: "1s".to_string(),
            namespace: None,
        }
    }
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            program: "chronyc".to_string(),
            args: vec!["clients".to_string()],
            sudo: true,
            timeout: "5s".to_string(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional TOML file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&Settings::default()).context("Failed to encode default settings")?,
        );

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(" ")
                    .with_list_parse_key("command.args")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}

impl ServerSettings {
    pub fn refresh(&self) -> Result<Duration> {
        let refresh = parse_duration(&self.refresh)
            .with_context(|| format!("Invalid server.refresh: {}", self.refresh))?;
        if refresh < MIN_REFRESH {
            bail!(
                "server.refresh must be at least {}, got {}",
                format_duration(MIN_REFRESH),
                self.refresh
            );
        }
        Ok(refresh)
    }

    /// Convert into the server's own config.
    pub fn to_server_config(&self) -> Result<ServerConfig> {
        let mut builder = ServerConfig::builder()
            .listen_addr(self.listen_addr.clone())
            .refresh(self.refresh()?);
        if let Some(ns) = &self.namespace {
            builder = builder.namespace(ns.clone());
        }
        Ok(builder.build())
    }
}

impl CommandSettings {
    pub fn timeout(&self) -> Result<Duration> {
        let timeout = parse_duration(&self.timeout)
            .with_context(|| format!("Invalid command.timeout: {}", self.timeout))?;
        if timeout.is_zero() {
            bail!("command.timeout must be greater than zero");
        }
        Ok(timeout)
    }

    /// Build the command source these settings describe.
    pub fn to_source(&self) -> Result<CommandSource> {
        Ok(CommandSource::new(self.program.clone(), self.args.clone())
            .with_sudo(self.sudo)
            .with_timeout(self.timeout()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.listen_addr, "0.0.0.0:5000");
        assert_eq!(settings.server.refresh().unwrap(), Duration::from_secs(1));
        assert_eq!(settings.command.timeout().unwrap(), Duration::from_secs(5));

        let source = settings.command.to_source().unwrap();
        assert_eq!(source.command_line(), "sudo -n chronyc clients");
    }

    #[test]
    fn test_load_without_file_gives_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.command, CommandSettings::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
listen_addr = "127.0.0.1:8123"
refresh = "2s"
namespace = "lab"

[command]
sudo = false
timeout = "750ms"
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.server.listen_addr, "127.0.0.1:8123");
        assert_eq!(settings.server.namespace.as_deref(), Some("lab"));
        assert!(!settings.command.sudo);
        assert_eq!(settings.command.program, "chronyc");
        assert_eq!(settings.command.args, vec!["clients".to_string()]);

        let server = settings.server.to_server_config().unwrap();
        assert_eq!(server.refresh, Duration::from_secs(2));

        let source = settings.command.to_source().unwrap();
        assert_eq!(source.command_line(), "chronyc clients");
        assert_eq!(source.timeout(), Duration::from_millis(750));
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Settings::load(Some(Path::new("/nonexistent/chronywatch.toml"))).is_err());
    }

    #[test]
    fn test_invalid_duration_is_reported() {
        let settings = CommandSettings {
            timeout: "soon".to_string(),
            ..CommandSettings::default()
        };
        let err = settings.to_source().unwrap_err();
        assert!(err.to_string().contains("command.timeout"));
    }

    #[test]
    fn test_refresh_below_minimum_is_rejected() {
        for refresh in ["0s", "0ms", "100ms"] {
            let settings = ServerSettings {
                refresh: refresh.to_string(),
                ..ServerSettings::default()
            };
            let err = settings.to_server_config().unwrap_err();
            assert!(err.to_string().contains("server.refresh must be at least 250ms"), "{}", err);
        }

        let settings = ServerSettings {
            refresh: "250ms".to_string(),
            ..ServerSettings::default()
        };
        assert_eq!(settings.to_server_config().unwrap().refresh, MIN_REFRESH);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let settings = CommandSettings {
            timeout: "0s".to_string(),
            ..CommandSettings::default()
        };
        assert!(settings.to_source().is_err());
    }
}
