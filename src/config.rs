/*
 *  config.rs
 *
 *  infocolumn - keeps the column talking
 *	(c) 2016-26 Information Column maintainers
 *
 *	Built-in defaults, layered with a YAML file and then command line flags
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use clap::{Args, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::fs;
use thiserror::Error;

use crate::layout::DEFAULT_WELCOME;
use crate::logging;
use crate::manager::DEFAULT_STATUS;
use crate::motd::MessageOfTheDay;
use crate::protocol::constants::{ADDRESS_MAX, LINES_PER_PAGE};
use crate::transport::{TransportClient, CONTROLLER_PORT};

pub const DEFAULT_API_URL: &str = "https://koala.svsticky.nl/api/activities";

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub daemon: DaemonConfig,
    pub source: SourceConfig,
    pub display: DisplayConfig,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Controller hostname or IP. Only required when frames are sent.
    pub host: Option<String>,
    pub address: u8,
    pub port: u16,
    pub timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self { host: None, address: 0, port: CONTROLLER_PORT, timeout_secs: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveHours {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub interval_minutes: u32,
    pub active_hours: Option<ActiveHours>,
    /// Negative values drop that many activities from the end.
    pub max_events: Option<i64>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self { interval_minutes: 1, active_hours: None, max_events: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { url: DEFAULT_API_URL.to_string(), timeout_secs: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub welcome: Vec<String>,
    pub default_status: String,
    pub motd: Vec<String>,
    pub motd_probability: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            welcome: DEFAULT_WELCOME.iter().map(|s| s.to_string()).collect(),
            default_status: DEFAULT_STATUS.to_string(),
            motd: Vec::new(),
            motd_probability: 0.1,
        }
    }
}

impl Config {
    /// The controller host, or a validation error naming the missing flag.
    pub fn host(&self) -> Result<&str, ConfigError> {
        self.connection
            .host
            .as_deref()
            .ok_or_else(|| ConfigError::Validation("no controller host, pass --host or set connection.host".into()))
    }

    pub fn transport(&self) -> TransportClient {
        TransportClient::new(self.connection.port, Duration::from_secs(self.connection.timeout_secs))
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }

    pub fn motd(&self) -> MessageOfTheDay {
        MessageOfTheDay::new(self.display.motd.clone(), self.display.motd_probability)
    }

    pub fn active_hours(&self) -> Option<(u32, u32)> {
        self.daemon.active_hours.map(|h| (h.start, h.end))
    }
}

/// Flags shared by the daemon and the one-shot tools. All optional so they
/// can be layered over the YAML file.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Controller IP or hostname
    #[arg(long)]
    pub host: Option<String>,
    /// Controller index on the wire
    #[arg(long)]
    pub index: Option<u8>,
    /// Controller TCP port
    #[arg(long)]
    pub port: Option<u16>,
    /// Log level: error, warn, info, debug or trace
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Defaults, then YAML (explicit path or search), then flags, then
/// validation.
pub fn load(args: &ConnectionArgs) -> Result<Config, ConfigError> {
    let mut cfg = match args.config.as_ref() {
        Some(p) if p.exists() => read_yaml(p)?,
        Some(p) => {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
        None => match find_config_file() {
            Some(p) => read_yaml(&p)?,
            None => Config::default(),
        },
    };

    apply_cli_overrides(&mut cfg, args);
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
pub fn find_config_file() -> Option<PathBuf> {
    if let Some(home) = home_dir() {
        let p = home.join(".config/infocolumn/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".infocolumn/daemon.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["infocolumn.yaml", "config/infocolumn.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

pub fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    // an empty file is valid and means "all defaults"
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(s)?)
}

fn apply_cli_overrides(cfg: &mut Config, args: &ConnectionArgs) {
    if args.host.is_some()      { cfg.connection.host = args.host.clone(); }
    if let Some(index) = args.index { cfg.connection.address = index; }
    if let Some(port) = args.port   { cfg.connection.port = port; }
    if args.log_level.is_some() { cfg.log_level = args.log_level.clone(); }
}

fn check(ok: bool, message: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if ok { Ok(()) } else { Err(ConfigError::Validation(message())) }
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let conn = &cfg.connection;
    check(conn.address <= ADDRESS_MAX, || {
        format!("connection address must be 0..={ADDRESS_MAX}, got {}", conn.address)
    })?;
    check(conn.port != 0, || "connection port must not be 0".into())?;
    check(conn.timeout_secs >= 1, || "connection timeout_secs must be >= 1".into())?;
    if let Some(host) = conn.host.as_deref() {
        check(!host.trim().is_empty(), || "connection host must not be empty".into())?;
    }

    let daemon = &cfg.daemon;
    check((1..=59).contains(&daemon.interval_minutes), || {
        format!("daemon interval_minutes must be 1..=59, got {}", daemon.interval_minutes)
    })?;
    if let Some(hours) = daemon.active_hours {
        check(hours.start <= 23 && hours.end <= 23, || "daemon active_hours must be 0..=23".into())?;
        check(hours.start <= hours.end, || {
            format!("daemon active_hours start {} is after end {}", hours.start, hours.end)
        })?;
    }

    check(cfg.source.timeout_secs >= 1, || "source timeout_secs must be >= 1".into())?;
    check(!cfg.source.url.trim().is_empty(), || "source url must not be empty".into())?;

    let display = &cfg.display;
    check(display.welcome.len() == LINES_PER_PAGE, || {
        format!("display welcome must have exactly {LINES_PER_PAGE} lines, got {}", display.welcome.len())
    })?;
    check((0.0..=1.0).contains(&display.motd_probability), || {
        format!("display motd_probability must be within 0..=1, got {}", display.motd_probability)
    })?;

    if let Some(level) = cfg.log_level.as_deref() {
        check(logging::parse_level(level).is_some(), || format!("unknown log_level {level:?}"))?;
    }
    Ok(())
}

/// Pretty YAML of the effective config.
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}
