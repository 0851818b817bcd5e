//! Runtime settings.
//!
//! Settings are layered with the `config` crate, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. the optional file given with `--config`
//! 3. environment variables prefixed `POSTFIX_EXPORTER_`
//!    (e.g. `POSTFIX_EXPORTER_SPOOL_PATH=/srv/postfix`)
//! 4. flags passed on the command line
//!
//! They are read once at startup and never change afterwards.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::cli::Args;
use crate::error::{ExporterError, Result};
use crate::logging::LogLevel;

pub const ENV_PREFIX: &str = "POSTFIX_EXPORTER";

pub const DEFAULT_LISTEN_ADDR: &str = ":9706";
pub const DEFAULT_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_SPOOL_PATH: &str = "/var/spool/postfix";
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Address the HTTP endpoint listens on.
    pub listen_addr: String,
    /// Seconds between sampling passes.
    pub interval_secs: u64,
    pub log_level: String,
    /// Root of the Postfix spool.
    pub spool_path: PathBuf,
    pub metrics_path: String,
}

impl Settings {
    /// Load settings from every layer, reading the process environment.
    pub fn load(args: &Args) -> Result<Self> {
        Self::load_from(args, None)
    }

    /// Load settings using `env` in place of the process environment when
    /// given.
    pub fn load_from(args: &Args, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("listen_addr", DEFAULT_LISTEN_ADDR)?
            .set_default("interval_secs", DEFAULT_INTERVAL_SECS as i64)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("spool_path", DEFAULT_SPOOL_PATH)?
            .set_default("metrics_path", DEFAULT_METRICS_PATH)?;

        if let Some(path) = &args.config {
            builder = builder.add_source(File::from(path.as_path()));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("listen_addr", args.telemetry_addr.clone())?
            .set_override_option("interval_secs", args.query_interval.map(|v| v as i64))?
            .set_override_option("log_level", args.log_level.clone())?
            .set_override_option(
                "spool_path",
                args.spool_path
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option("metrics_path", args.metrics_path.clone())?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(ExporterError::InvalidInterval(self.interval_secs));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::parse(&self.log_level)
    }
}
