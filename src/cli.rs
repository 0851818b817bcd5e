//! Command-line flags.
//!
//! Flag names are dotted (`--spool.path`) for compatibility with existing
//! deployments. Every flag is optional; defaults are applied when the
//! settings are layered (see [`crate::settings`]).

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "postfix-exporter")]
#[command(about = "Prometheus exporter for Postfix spool queue sizes")]
pub struct Args {
    /// host:port for postfix exporter [default: :9706]
    #[arg(long = "telemetry.addr", value_name = "ADDR")]
    pub telemetry_addr: Option<String>,

    /// How often should daemon read metrics, in seconds [default: 15]
    #[arg(long = "query.interval", value_name = "SECONDS")]
    pub query_interval: Option<u64>,

    /// Logging level (debug or info) [default: info]
    #[arg(long = "log.level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Path to Postfix spool directory [default: /var/spool/postfix]
    #[arg(long = "spool.path", value_name = "DIR")]
    pub spool_path: Option<PathBuf>,

    /// Path under which to expose metrics [default: /metrics]
    #[arg(long = "web.metrics-path", value_name = "PATH")]
    pub metrics_path: Option<String>,

    /// Optional settings file (TOML, YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Sample the spool once, write the snapshot as JSON to FILE and exit
    #[arg(short, long, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_dotted_flags() {
        let args = Args::try_parse_from([
            "postfix-exporter",
            "--telemetry.addr",
            "127.0.0.1:9100",
            "--query.interval",
            "30",
            "--log.level",
            "debug",
            "--spool.path",
            "/srv/postfix",
        ])
        .unwrap();

        assert_eq!(args.telemetry_addr.as_deref(), Some("127.0.0.1:9100"));
        assert_eq!(args.query_interval, Some(30));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.spool_path, Some(PathBuf::from("/srv/postfix")));
        assert!(args.export.is_none());
    }

    #[test]
    fn no_flags_leaves_everything_unset() {
        let args = Args::try_parse_from(["postfix-exporter"]).unwrap();
        assert!(args.telemetry_addr.is_none());
        assert!(args.query_interval.is_none());
        assert!(args.config.is_none());
    }

    #[test]
    fn rejects_non_numeric_interval() {
        assert!(Args::try_parse_from(["postfix-exporter", "--query.interval", "soon"]).is_err());
    }
}
