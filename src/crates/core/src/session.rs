//! Visitor sessions
//!
//! Each visitor owns a copy of the reply script, keyed by an opaque session
//! id carried in a cookie. In [`ScriptScope::Global`] every visitor shares a
//! single script instead.

use crate::errors::{HslTalksError, HslTalksResult};
use crate::message::Message;
use crate::script::ReplyScript;
use dashmap::DashMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key of the shared script in global scope.
pub const GLOBAL_SESSION_ID: &str = "global";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptScope {
    /// One script per visitor
    #[default]
    PerVisitor,
    /// One script for everybody; each request gets whatever is next globally
    Global,
}

impl ScriptScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptScope::PerVisitor => "per-visitor",
            ScriptScope::Global => "global",
        }
    }
}

impl fmt::Display for ScriptScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per-visitor" | "per_visitor" | "visitor" => Ok(ScriptScope::PerVisitor),
            "global" => Ok(ScriptScope::Global),
            other => Err(format!(
                "unknown script scope '{}', expected 'per-visitor' or 'global'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    pub id: String,
    /// Minted by this call; the caller should hand the id to the visitor.
    pub is_new: bool,
}

struct SessionEntry {
    script: ReplyScript,
    last_seen_ms: i64,
}

impl SessionEntry {
    fn new(script: ReplyScript, now_ms: i64) -> Self {
        Self {
            script,
            last_seen_ms: now_ms,
        }
    }
}

pub struct SessionStore {
    template: ReplyScript,
    scope: ScriptScope,
    sessions: DashMap<String, SessionEntry>,
}

impl SessionStore {
    pub fn new(template: ReplyScript, scope: ScriptScope) -> Self {
        let sessions = DashMap::new();
        if scope == ScriptScope::Global {
            sessions.insert(
                GLOBAL_SESSION_ID.to_string(),
                SessionEntry::new(template.clone(), now_ms()),
            );
        }
        Self {
            template,
            scope,
            sessions,
        }
    }

    pub fn scope(&self) -> ScriptScope {
        self.scope
    }

    /// Reuse the requested session if it is still live, otherwise start a
    /// fresh one with a full script. Only the page load should call this.
    pub fn resolve(&self, requested: Option<&str>) -> ResolvedSession {
        let now = now_ms();

        if self.scope == ScriptScope::Global {
            if let Some(mut entry) = self.sessions.get_mut(GLOBAL_SESSION_ID) {
                entry.last_seen_ms = now;
            }
            return ResolvedSession {
                id: GLOBAL_SESSION_ID.to_string(),
                is_new: false,
            };
        }

        if let Some(id) = requested {
            if let Some(mut entry) = self.sessions.get_mut(id) {
                entry.last_seen_ms = now;
                return ResolvedSession {
                    id: id.to_string(),
                    is_new: false,
                };
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.sessions
            .insert(id.clone(), SessionEntry::new(self.template.clone(), now));
        debug!("Session created: session_id={}", id);
        ResolvedSession { id, is_new: true }
    }

    /// Find an existing session without minting one. A missing or unknown id
    /// is [`HslTalksError::SessionNotFound`] in per-visitor scope.
    pub fn lookup(&self, requested: Option<&str>) -> HslTalksResult<String> {
        if self.scope == ScriptScope::Global {
            return Ok(GLOBAL_SESSION_ID.to_string());
        }
        match requested {
            Some(id) if self.sessions.contains_key(id) => Ok(id.to_string()),
            Some(id) => Err(HslTalksError::SessionNotFound(id.to_string())),
            None => Err(HslTalksError::SessionNotFound("<no session>".to_string())),
        }
    }

    /// Pop the next reply for a session.
    pub fn next_reply(&self, id: &str) -> HslTalksResult<Message> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| HslTalksError::SessionNotFound(id.to_string()))?;
        entry.last_seen_ms = now_ms();
        entry.script.pop_next()
    }

    pub fn remaining(&self, id: &str) -> Option<usize> {
        self.sessions.get(id).map(|entry| entry.script.remaining())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions idle for longer than `max_idle_ms`. The shared global
    /// script is never dropped.
    pub fn prune_idle(&self, max_idle_ms: i64) -> usize {
        self.prune_idle_at(now_ms(), max_idle_ms)
    }

    fn prune_idle_at(&self, now_ms: i64, max_idle_ms: i64) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|id, entry| {
            id == GLOBAL_SESSION_ID || now_ms - entry.last_seen_ms <= max_idle_ms
        });
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            debug!("Pruned idle sessions: removed={}", removed);
        }
        removed
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_step_script() -> ReplyScript {
        ReplyScript::new(vec![
            Message::assistant_text("one"),
            Message::assistant_text("two"),
        ])
        .unwrap()
    }

    #[test]
    fn unknown_or_missing_id_mints_new_session() {
        let store = SessionStore::new(two_step_script(), ScriptScope::PerVisitor);

        let first = store.resolve(None);
        assert!(first.is_new);

        let stale = store.resolve(Some("not-a-session"));
        assert!(stale.is_new);
        assert_ne!(stale.id, "not-a-session");

        let again = store.resolve(Some(&first.id));
        assert_eq!(again, ResolvedSession { id: first.id.clone(), is_new: false });
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn visitors_get_independent_scripts() {
        let store = SessionStore::new(two_step_script(), ScriptScope::PerVisitor);
        let a = store.resolve(None).id;
        let b = store.resolve(None).id;

        assert_eq!(store.next_reply(&a).unwrap(), Message::assistant_text("one"));
        assert_eq!(store.next_reply(&a).unwrap(), Message::assistant_text("two"));
        assert!(matches!(store.next_reply(&a), Err(HslTalksError::ScriptComplete)));

        assert_eq!(store.remaining(&b), Some(2));
        assert_eq!(store.next_reply(&b).unwrap(), Message::assistant_text("one"));
    }

    #[test]
    fn global_scope_shares_one_script() {
        let store = SessionStore::new(two_step_script(), ScriptScope::Global);
        let a = store.resolve(Some("anything"));
        let b = store.resolve(None);
        assert_eq!(a.id, GLOBAL_SESSION_ID);
        assert_eq!(b.id, GLOBAL_SESSION_ID);
        assert!(!a.is_new);

        assert_eq!(store.next_reply(&a.id).unwrap(), Message::assistant_text("one"));
        assert_eq!(store.next_reply(&b.id).unwrap(), Message::assistant_text("two"));
        assert!(matches!(store.next_reply(&a.id), Err(HslTalksError::ScriptComplete)));
    }

    #[test]
    fn lookup_never_creates_sessions() {
        let store = SessionStore::new(two_step_script(), ScriptScope::PerVisitor);
        assert!(matches!(store.lookup(None), Err(HslTalksError::SessionNotFound(_))));
        assert!(matches!(
            store.lookup(Some("stale")),
            Err(HslTalksError::SessionNotFound(_))
        ));
        assert_eq!(store.len(), 0);

        let id = store.resolve(None).id;
        assert_eq!(store.lookup(Some(&id)).unwrap(), id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn global_lookup_ignores_cookie() {
        let store = SessionStore::new(two_step_script(), ScriptScope::Global);
        assert_eq!(store.lookup(None).unwrap(), GLOBAL_SESSION_ID);
        assert_eq!(store.lookup(Some("whatever")).unwrap(), GLOBAL_SESSION_ID);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn next_reply_for_unknown_session_fails() {
        let store = SessionStore::new(two_step_script(), ScriptScope::PerVisitor);
        assert!(matches!(
            store.next_reply("missing"),
            Err(HslTalksError::SessionNotFound(_))
        ));
    }

    #[test]
    fn prune_drops_only_idle_sessions() {
        let store = SessionStore::new(two_step_script(), ScriptScope::PerVisitor);
        let idle = store.resolve(None).id;
        let active = store.resolve(None).id;

        let now = now_ms();
        store.sessions.get_mut(&idle).unwrap().last_seen_ms = now - 10_000;

        assert_eq!(store.prune_idle_at(now, 5_000), 1);
        assert_eq!(store.remaining(&idle), None);
        assert_eq!(store.remaining(&active), Some(2));
    }

    #[test]
    fn prune_keeps_global_script() {
        let store = SessionStore::new(two_step_script(), ScriptScope::Global);
        assert_eq!(store.prune_idle_at(now_ms() + 1_000_000, 0), 0);
        assert_eq!(store.remaining(GLOBAL_SESSION_ID), Some(2));
    }

    #[test]
    fn scope_parses_from_str() {
        assert_eq!("global".parse::<ScriptScope>().unwrap(), ScriptScope::Global);
        assert_eq!(
            "Per-Visitor".parse::<ScriptScope>().unwrap(),
            ScriptScope::PerVisitor
        );
        assert!("everyone".parse::<ScriptScope>().is_err());
    }
}
