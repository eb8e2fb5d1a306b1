//! Configuration: toml file merged with CLI overrides.
//!
//! The file lives at `~/.config/minnow/config.toml`. Nickname and server
//! must come from one of the two sources; their absence is a startup
//! failure, never a runtime one.

use std::path::PathBuf;

use anyhow::{Result, bail};
use serde::Deserialize;

use minnow_engine::UnknownTargetPolicy;

pub const DEFAULT_PORT: u16 = 6667;

/// User configuration as read from disk.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// IRC nickname.
    pub nick: Option<String>,
    /// Server hostname.
    pub server: Option<String>,
    /// Server port. Default: 6667.
    pub port: Option<u16>,
    /// Server password (PASS), if the server requires one.
    pub password: Option<String>,
    /// Create a channel on the first message for an unknown target
    /// instead of dropping it.
    pub auto_create_channels: Option<bool>,
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("minnow")
        .join("config.toml")
}

impl Config {
    pub fn load() -> Self {
        let path = config_path();
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(s) => match toml::from_str(&s) {
                    Ok(c) => return c,
                    Err(e) => eprintln!("Warning: bad config file {}: {e}", path.display()),
                },
                Err(e) => eprintln!("Warning: can't read {}: {e}", path.display()),
            }
        }
        Self::default()
    }
}

/// Effective startup values: CLI overrides > config file > defaults.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub nick: String,
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub unknown_target: UnknownTargetPolicy,
}

impl Resolved {
    pub fn merge(cli: &crate::Cli, config: &Config) -> Result<Self> {
        let Some(nick) = cli.nick.clone().or_else(|| config.nick.clone()) else {
            bail!(
                "no nickname configured (pass --nick or set `nick` in {})",
                config_path().display()
            );
        };
        let Some(host) = cli.server.clone().or_else(|| config.server.clone()) else {
            bail!(
                "no server configured (pass --server or set `server` in {})",
                config_path().display()
            );
        };
        let port = cli.port.or(config.port).unwrap_or(DEFAULT_PORT);
        let password = cli.password.clone().or_else(|| config.password.clone());
        let unknown_target = if cli.auto_create || config.auto_create_channels.unwrap_or(false) {
            UnknownTargetPolicy::AutoCreate
        } else {
            UnknownTargetPolicy::Drop
        };

        Ok(Self {
            nick,
            host,
            port,
            password,
            unknown_target,
        })
    }
}
