//! Command-line and environment configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use clicker_core::config::{DEFAULT_MAX_IDLE_SECS, DEFAULT_PRESTIGE_THRESHOLD};
use clicker_core::EngineConfig;

/// Default port for the clicker server.
pub const DEFAULT_PORT: u16 = 8473;

/// Command-line arguments for clicker-server.
#[derive(Debug, Clone, Parser)]
#[command(name = "clicker-server")]
#[command(about = "Authoritative game engine for an incremental clicker game")]
#[command(version)]
pub struct CliArgs {
    /// Port to listen on
    #[arg(long, env = "CLICKER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind to
    #[arg(long, env = "CLICKER_BIND", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,

    /// Directory for persisted sessions (in-memory only when unset)
    #[arg(long, env = "CLICKER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON file with the upgrade catalog (built-in catalog when unset)
    #[arg(long, env = "CLICKER_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Lifetime and per-run points required to prestige
    #[arg(long, env = "CLICKER_PRESTIGE_THRESHOLD", default_value_t = DEFAULT_PRESTIGE_THRESHOLD)]
    pub prestige_threshold: f64,

    /// Longest idle interval credited by one passive tick, in seconds
    #[arg(long, env = "CLICKER_MAX_IDLE_SECS", default_value_t = DEFAULT_MAX_IDLE_SECS)]
    pub max_idle_secs: u64,

    /// Allowed CORS origin (repeatable; localhost dev origins when unset)
    #[arg(long = "cors-origin")]
    pub cors_origins: Vec<String>,
}

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Directory for persisted sessions.
    pub data_dir: Option<PathBuf>,
    /// Upgrade catalog file.
    pub catalog: Option<PathBuf>,
    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
    /// Engine tuning.
    pub engine: EngineConfig,
}

impl ServerConfig {
    /// Socket address to listen on.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            data_dir: None,
            catalog: None,
            cors_origins: default_cors_origins(DEFAULT_PORT),
            engine: EngineConfig::default(),
        }
    }
}

impl From<CliArgs> for ServerConfig {
    fn from(args: CliArgs) -> Self {
        let cors_origins = if args.cors_origins.is_empty() {
            default_cors_origins(args.port)
        } else {
            args.cors_origins
        };
        Self {
            bind: args.bind,
            port: args.port,
            data_dir: args.data_dir,
            catalog: args.catalog,
            cors_origins,
            engine: EngineConfig::default()
                .with_prestige_threshold(args.prestige_threshold)
                .with_max_idle_secs(args.max_idle_secs),
        }
    }
}

/// Localhost origins allowed when none are configured.
#[must_use]
pub fn default_cors_origins(port: u16) -> Vec<String> {
    vec![
        format!("http://localhost:{port}"),
        format!("http://127.0.0.1:{port}"),
        // Common frontend dev servers
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(), // Vite
        "http://localhost:8080".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
        "http://127.0.0.1:8080".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["clicker-server"]).expect("parse");
        let config = ServerConfig::from(args);

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(config.data_dir.is_none());
        let threshold = config.engine.prestige_threshold;
        assert!((threshold - DEFAULT_PRESTIGE_THRESHOLD).abs() < f64::EPSILON);
        assert_eq!(config.engine.max_idle_secs, DEFAULT_MAX_IDLE_SECS);
        assert!(config.cors_origins.contains(&"http://localhost:8473".to_string()));
    }

    #[test]
    fn test_overrides() {
        let args = CliArgs::try_parse_from([
            "clicker-server",
            "--port",
            "9000",
            "--bind",
            "0.0.0.0",
            "--data-dir",
            "/tmp/clicker",
            "--prestige-threshold",
            "5000",
            "--max-idle-secs",
            "60",
            "--cors-origin",
            "https://game.example",
            "--cors-origin",
            "https://beta.game.example",
        ])
        .expect("parse");
        let config = ServerConfig::from(args);

        assert_eq!(config.socket_addr(), "0.0.0.0:9000".parse().expect("addr"));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/clicker")));
        assert!((config.engine.prestige_threshold - 5000.0).abs() < f64::EPSILON);
        assert_eq!(config.engine.max_idle_secs, 60);
        assert_eq!(
            config.cors_origins,
            vec!["https://game.example", "https://beta.game.example"]
        );
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(CliArgs::try_parse_from(["clicker-server", "--port", "not-a-port"]).is_err());
    }
}
