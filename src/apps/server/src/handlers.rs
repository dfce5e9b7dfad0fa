//! HTTP handlers
//!
//! Thin transport over the core session store and renderers.

use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use hsltalks_core::{render_page, Message, ResolvedSession};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "hsltalks_session";

/// Body of the chat form. The text is echoed back, never interpreted.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatForm {
    pub msg: String,
}

/// What a submission appends to the history: the visitor's own bubble
/// followed by the next scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatFragments {
    pub user: Message,
    pub reply: Message,
}

impl ChatFragments {
    pub fn render(&self) -> String {
        let mut out = self.user.render();
        out.push_str(&self.reply.render());
        out
    }
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = state.sessions.resolve(session_cookie(&headers).as_deref());
    let page = Html(render_page(&state.page)).into_response();
    with_session_cookie(page, &session)
}

pub async fn handle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ChatForm>,
) -> Result<Response, ApiError> {
    // Sessions are only minted by the page load; a stale or missing cookie
    // gets no script.
    let session_id = state.sessions.lookup(session_cookie(&headers).as_deref())?;
    let reply = state.sessions.next_reply(&session_id)?;
    debug!(
        "Reply dispensed: session_id={}, remaining={}",
        session_id,
        state.sessions.remaining(&session_id).unwrap_or(0)
    );

    let fragments = ChatFragments {
        user: Message::user(form.msg),
        reply,
    };
    Ok(Html(fragments.render()).into_response())
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

fn with_session_cookie(mut response: Response, session: &ResolvedSession) -> Response {
    if !session.is_new {
        return response;
    }
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, session.id
    );
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().insert(SET_COOKIE, value);
        }
        Err(e) => warn!("Failed to set session cookie: {}", e),
    }
    response
}
