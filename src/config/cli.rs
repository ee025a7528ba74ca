//! Command-line and environment overrides.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::schema::BehaviorConfig;
use crate::config::size::ByteSize;

#[derive(Debug, Default, Parser)]
#[command(name = "flaky-backend")]
#[command(version, about = "HTTP backend that fails, stalls and disappears on purpose", long_about = None)]
pub struct Args {
    /// Port of the manual-kill listener
    #[arg(short, long, env = "FLAKY_PORT")]
    pub port: Option<u16>,

    /// Interface both listeners bind to
    #[arg(long, env = "FLAKY_HOST")]
    pub host: Option<String>,

    /// Port of the jitter listener
    #[arg(long, env = "FLAKY_JITTER_PORT")]
    pub jitter_port: Option<u16>,

    /// Log every request with its elapsed time and status
    #[arg(short, long, env = "FLAKY_VERBOSE")]
    pub verbose: bool,

    /// Body returned by /success and /wait
    #[arg(short, long, env = "FLAKY_CONTENT")]
    pub content: Option<String>,

    /// Response header as Name:Value (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Time the manual-kill listener stays down (e.g. 5s)
    #[arg(long, env = "FLAKY_DEAD_TIME", value_parser = humantime::parse_duration)]
    pub dead_time: Option<Duration>,

    /// Shortest /wait delay
    #[arg(long, visible_alias = "min-wait", env = "FLAKY_MIN_DELAY", value_parser = humantime::parse_duration)]
    pub min_delay: Option<Duration>,

    /// Longest /wait delay
    #[arg(long, visible_alias = "max-wait", env = "FLAKY_MAX_DELAY", value_parser = humantime::parse_duration)]
    pub max_delay: Option<Duration>,

    /// Draw /wait delays between --min-delay and --max-delay
    #[arg(long, visible_alias = "random-wait", env = "FLAKY_RANDOM_DELAY")]
    pub random_delay: bool,

    /// Smallest /content_size body (e.g. 10KB)
    #[arg(long, visible_alias = "min-size", env = "FLAKY_MIN_BODY_SIZE")]
    pub min_body_size: Option<ByteSize>,

    /// Largest /content_size body (e.g. 100KB)
    #[arg(long, visible_alias = "max-size", env = "FLAKY_MAX_BODY_SIZE")]
    pub max_body_size: Option<ByteSize>,

    /// Draw /content_size lengths between --min-body-size and --max-body-size
    #[arg(long, visible_alias = "random-size", env = "FLAKY_RANDOM_BODY_SIZE")]
    pub random_body_size: bool,

    /// Up/down toggle period of the jitter listener; 0s disables it
    #[arg(long, env = "FLAKY_JITTER_INTERVAL", value_parser = humantime::parse_duration)]
    pub jitter_interval: Option<Duration>,

    /// Prometheus scrape address
    #[arg(long, env = "FLAKY_METRICS_ADDRESS")]
    pub metrics_address: Option<String>,

    /// TOML file with defaults for every option above
    #[arg(long, env = "FLAKY_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Overlay the explicitly given flags onto `config`.
    ///
    /// Boolean switches can only turn a behavior on; a file that enables
    /// one cannot be overridden back to off from the command line.
    pub fn apply(self, config: &mut BehaviorConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(jitter_port) = self.jitter_port {
            config.jitter_port = jitter_port;
        }
        config.verbose |= self.verbose;
        if let Some(content) = self.content {
            config.content = content;
        }
        if !self.headers.is_empty() {
            config.headers = self.headers;
        }
        if let Some(dead_time) = self.dead_time {
            config.dead_time = dead_time;
        }
        if let Some(min_delay) = self.min_delay {
            config.min_delay = min_delay;
        }
        if let Some(max_delay) = self.max_delay {
            config.max_delay = max_delay;
        }
        config.random_delay |= self.random_delay;
        if let Some(size) = self.min_body_size {
            config.min_body_size = size.as_u64();
        }
        if let Some(size) = self.max_body_size {
            config.max_body_size = size.as_u64();
        }
        config.random_body_size |= self.random_body_size;
        if let Some(interval) = self.jitter_interval {
            config.jitter_interval = interval;
        }
        if let Some(address) = self.metrics_address {
            config.metrics_address = Some(address);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "flaky-backend",
            "--port",
            "9000",
            "--content",
            "boom",
            "-H",
            "Age:1",
            "-H",
            "Content-type:text/plain",
            "--dead-time",
            "10s",
            "--min-wait",
            "11s",
            "--max-wait",
            "12s",
            "--random-wait",
            "--min-size",
            "1KB",
            "--max-size",
            "2KB",
            "--random-size",
        ])
        .unwrap();

        let mut config = BehaviorConfig::default();
        args.apply(&mut config);

        assert_eq!(config.port, 9000);
        assert_eq!(config.content, "boom");
        assert_eq!(config.headers, vec!["Age:1", "Content-type:text/plain"]);
        assert_eq!(config.dead_time, Duration::from_secs(10));
        assert_eq!(config.min_delay, Duration::from_secs(11));
        assert_eq!(config.max_delay, Duration::from_secs(12));
        assert!(config.random_delay);
        assert_eq!(config.min_body_size, 1_000);
        assert_eq!(config.max_body_size, 2_000);
        assert!(config.random_body_size);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn absent_flags_keep_existing_values() {
        let mut config = BehaviorConfig {
            port: 1234,
            random_delay: true,
            ..BehaviorConfig::default()
        };
        Args::default().apply(&mut config);
        assert_eq!(config.port, 1234);
        assert!(config.random_delay);
    }
}
