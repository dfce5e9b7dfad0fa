use anyhow::Result;
use hsltalks_core::{PageConfig, ScriptScope, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub page: Arc<PageConfig>,
}

impl AppState {
    pub fn new(sessions: SessionStore, page: PageConfig) -> Self {
        Self {
            sessions: Arc::new(sessions),
            page: Arc::new(page),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let script = config.load_script()?;
        let replies = script.remaining();
        let state = Self::new(
            SessionStore::new(script, config.script_scope),
            config.page_config(),
        );

        let scope = state.sessions.scope();
        info!("Reply script ready: replies={}, scope={}", replies, scope);
        if let Some(notice) = scope_notice(scope) {
            warn!("{}", notice);
        }
        Ok(state)
    }
}

/// Startup notice for scopes that behave differently from a single shared
/// script played to every visitor.
pub fn scope_notice(scope: ScriptScope) -> Option<&'static str> {
    match scope {
        ScriptScope::PerVisitor => Some(
            "Script scope is per-visitor: each visitor replays the script from the start. \
             Pass --scope global for one script shared by all visitors.",
        ),
        ScriptScope::Global => None,
    }
}

/// Periodically drop sessions that have been idle for longer than `max_idle`.
pub fn spawn_session_pruner(
    sessions: Arc<SessionStore>,
    max_idle: Duration,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    let max_idle_ms = i64::try_from(max_idle.as_millis()).unwrap_or(i64::MAX);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            let removed = sessions.prune_idle(max_idle_ms);
            if removed > 0 {
                debug!("Session sweep: removed={}, live={}", removed, sessions.len());
            }
        }
    })
}
