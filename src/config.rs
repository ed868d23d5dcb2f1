//!
//! Server configuration.
//!
//! The primary source is environment variables; an optional
//! line-oriented config file (directive name, whitespace, arguments,
//! `#`-comments, blank lines skipped) can override them. A malformed
//! config file line is a warning, not a process exit — this server's
//! directive set is small enough that failing soft and falling back to
//! the default is kinder to operators than refusing to start.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_DUMP_PATH: &str = "dump.rgb.json";
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub dump_path: String,
    pub sweep_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            addr: DEFAULT_ADDR.parse().expect("default addr is valid"),
            dump_path: DEFAULT_DUMP_PATH.to_string(),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl Config {
    /// Builds configuration from `REDLITE_ADDR` / `REDLITE_DUMP_PATH` /
    /// `REDLITE_SWEEP_INTERVAL_SECS`, then applies `path` (if given and
    /// present on disk) on top.
    pub fn load(path: Option<&str>) -> Config {
        let mut config = Config::from_env();
        if let Some(path) = path {
            config.apply_file(path);
        }
        config
    }

    fn from_env() -> Config {
        let mut config = Config::default();
        if let Ok(addr) = std::env::var("REDLITE_ADDR") {
            match addr.parse() {
                Ok(parsed) => config.addr = parsed,
                Err(_) => log::warn!("REDLITE_ADDR={addr:?} is not a valid socket address, ignoring"),
            }
        }
        if let Ok(path) = std::env::var("REDLITE_DUMP_PATH") {
            config.dump_path = path;
        }
        if let Ok(secs) = std::env::var("REDLITE_SWEEP_INTERVAL_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) => config.sweep_interval = Duration::from_secs(secs),
                Err(_) => log::warn!("REDLITE_SWEEP_INTERVAL_SECS={secs:?} is not a valid integer, ignoring"),
            }
        }
        config
    }

    fn apply_file(&mut self, path: &str) {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("could not open config file '{path}': {e}");
                return;
            }
        };
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let Ok(line) = line else { continue };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let argv: Vec<&str> = trimmed.split_whitespace().collect();
            match (argv[0].to_ascii_lowercase().as_str(), argv.len()) {
                ("bind", 2) => match argv[1].parse() {
                    Ok(addr) => self.addr = addr,
                    Err(_) => log::warn!("{path}:{}: invalid bind address '{}'", line_num + 1, argv[1]),
                },
                ("dir", 2) => self.dump_path = argv[1].to_string(),
                ("sweep-interval-secs", 2) => match argv[1].parse() {
                    Ok(secs) => self.sweep_interval = Duration::from_secs(secs),
                    Err(_) => log::warn!("{path}:{}: invalid sweep interval '{}'", line_num + 1, argv[1]),
                },
                _ => log::warn!("{path}:{}: unknown directive '{}'", line_num + 1, trimmed),
            }
        }
    }
}
