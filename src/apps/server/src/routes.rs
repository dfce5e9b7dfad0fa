//! Route table
//!
//! Every (method, path) pair the server answers, and the handler behind it.

use axum::http::Method;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::handlers;
use crate::state::AppState;

/// Mount point of the static asset directory.
pub const STATIC_PREFIX: &str = "/static";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Full page
    Index,
    /// Chat form submission, answers with two fragments
    Handle,
}

impl Route {
    pub const ALL: [Route; 2] = [Route::Index, Route::Handle];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Index => "/",
            Route::Handle => "/handle",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Route::Index => Method::GET,
            Route::Handle => Method::POST,
        }
    }

    fn handler(&self) -> MethodRouter<AppState> {
        match self {
            Route::Index => get(handlers::index),
            Route::Handle => post(handlers::handle),
        }
    }
}

pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let mut router = Router::new();
    for route in Route::ALL {
        debug!("Route registered: {} {}", route.method(), route.path());
        router = router.route(route.path(), route.handler());
    }

    router
        .nest_service(STATIC_PREFIX, ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
