// Application configuration, loaded from environment variables and CLI flags.

use std::path::PathBuf;
use std::time::Duration;

use crate::ad_sdk::AdSdkConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server to.
    pub bind_addr: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// JSON file with the retired route table. Built-in table when unset.
    pub retirements_file: Option<PathBuf>,
    /// Endpoint of the topic-discovery flow.
    pub topic_discovery_url: Option<String>,
    pub topic_discovery_timeout: Duration,
    pub ad_sdk: AdSdkConfig,
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `BIND_ADDR` - Bind address (default: `0.0.0.0`)
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `RETIREMENTS_FILE` - Path to a JSON retirement table
    /// - `TOPIC_DISCOVERY_URL` - Upstream topic-discovery endpoint
    /// - `TOPIC_DISCOVERY_TIMEOUT_SECS` - Upstream timeout (default: 30)
    /// - `AD_SDK_SCRIPT_URL`, `AD_SDK_PUBLISHER_ID`, `AD_SDK_TOKEN` - Ad SDK loader
    /// - `AD_SDK_ALLOWED_DOMAINS`, `AD_SDK_BLOCKED_DOMAINS` - Comma-separated lists
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    /// - `--retirements <PATH>` - Override the retirement table file
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Build a config from explicit args and an env lookup.
    pub fn from_sources(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let bind_addr = env("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string());

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env("PORT").and_then(|v| v.parse().ok()))
            .unwrap_or(3000);

        let retirements_file = Self::parse_cli_value(args, "--retirements")
            .or_else(|| env("RETIREMENTS_FILE"))
            .map(PathBuf::from);

        let topic_discovery_timeout = env("TOPIC_DISCOVERY_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let ad_sdk = AdSdkConfig {
            script_url: env("AD_SDK_SCRIPT_URL"),
            publisher_id: env("AD_SDK_PUBLISHER_ID"),
            token: env("AD_SDK_TOKEN"),
            allowed_domains: split_list(env("AD_SDK_ALLOWED_DOMAINS")),
            blocked_domains: split_list(env("AD_SDK_BLOCKED_DOMAINS")),
        };

        Config {
            bind_addr,
            port,
            retirements_file,
            topic_discovery_url: env("TOPIC_DISCOVERY_URL"),
            topic_discovery_timeout,
            ad_sdk,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}

fn split_list(raw: Option<String>) -> Vec<String> {
    raw.map(|v| {
        v.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}
