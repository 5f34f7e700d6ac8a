//! Server configuration.
//!
//! All settings have defaults matching the classic deployment
//! (`127.0.0.1:5555`, backlog of 10, `server_log.txt`). Command-line flags
//! override them.

use crate::logsink::DEFAULT_LOG_FILE;
use crate::{DEFAULT_HOST, DEFAULT_PORT, MAX_CLIENTS};
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Listen backlog hint passed to the OS
    pub backlog: u32,
    /// Where calculation records are appended
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backlog: MAX_CLIENTS,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    Run(Config),
    Help,
    Version,
}

/// Command-line parsing errors.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("invalid value for {flag}: {value}")]
    InvalidNumber { flag: String, value: String },

    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

impl Config {
    /// Parses configuration from command-line arguments (program name excluded).
    pub fn from_args<I, S>(args: I) -> Result<ConfigAction, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--host" | "-h" => {
                    config.host = next_value(&mut args, &arg)?;
                }
                "--port" | "-p" => {
                    config.port = parse_number(&next_value(&mut args, &arg)?, &arg)?;
                }
                "--backlog" | "-b" => {
                    config.backlog = parse_number(&next_value(&mut args, &arg)?, &arg)?;
                }
                "--log-file" | "-l" => {
                    config.log_file = PathBuf::from(next_value(&mut args, &arg)?);
                }
                "--help" => return Ok(ConfigAction::Help),
                "--version" | "-v" => return Ok(ConfigAction::Version),
                other => return Err(ConfigError::UnknownArgument(other.to_string())),
            }
        }

        Ok(ConfigAction::Run(config))
    }

    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, ConfigError> {
    args.next()
        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}
