//! Server configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then CLI flags
//! (which also read `HSLTALKS_*` environment variables).

use anyhow::{Context, Result};
use clap::Parser;
use hsltalks_core::page::{DEFAULT_MAP_URL, DEFAULT_QR_URL};
use hsltalks_core::{PageConfig, ReplyScript, ScriptScope};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::routes::Route;

#[derive(Parser, Debug, Clone)]
#[command(name = "hsltalks-server", version, about = "Split-screen map and scripted chat demo")]
pub struct Cli {
    /// TOML config file
    #[arg(long, env = "HSLTALKS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "HSLTALKS_BIND")]
    pub bind: Option<SocketAddr>,

    /// Directory served under /static
    #[arg(long, env = "HSLTALKS_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// JSON reply script replacing the built-in one
    #[arg(long, env = "HSLTALKS_SCRIPT")]
    pub script: Option<PathBuf>,

    /// per-visitor or global
    #[arg(long, env = "HSLTALKS_SCRIPT_SCOPE")]
    pub scope: Option<ScriptScope>,

    /// Debug logging
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub static_dir: PathBuf,
    pub map_url: String,
    pub qr_url: String,
    pub script_path: Option<PathBuf>,
    pub script_scope: ScriptScope,
    pub session_idle_secs: u64,
    pub prune_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5001)),
            static_dir: PathBuf::from("static"),
            map_url: DEFAULT_MAP_URL.to_string(),
            qr_url: DEFAULT_QR_URL.to_string(),
            script_path: None,
            script_scope: ScriptScope::default(),
            session_idle_secs: 60 * 60,
            prune_interval_secs: 5 * 60,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse server config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(bind) = cli.bind {
            config.bind = bind;
        }
        if let Some(static_dir) = &cli.static_dir {
            config.static_dir = static_dir.clone();
        }
        if let Some(script) = &cli.script {
            config.script_path = Some(script.clone());
        }
        if let Some(scope) = cli.scope {
            config.script_scope = scope;
        }
        Ok(config)
    }

    pub fn page_config(&self) -> PageConfig {
        PageConfig {
            map_url: self.map_url.clone(),
            qr_url: self.qr_url.clone(),
            reply_path: Route::Handle.path().to_string(),
            ..PageConfig::default()
        }
    }

    pub fn load_script(&self) -> Result<ReplyScript> {
        match &self.script_path {
            Some(path) => ReplyScript::from_file(path)
                .with_context(|| format!("Failed to load reply script: {}", path.display())),
            None => Ok(ReplyScript::builtin()),
        }
    }
}
