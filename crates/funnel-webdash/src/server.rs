//! Dashboard server bootstrap, router wiring and form handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use axum::extract::{Form, Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use funnel_webdash_core::{DashboardSession, EditOutcome, ViewIntent, TASK_LIST_PATH};
use funnel_webdash_ui::{
    render_funnel_webdash_shell, FunnelWebdashShellContext, DRAWER_CLOSE_ENDPOINT,
    DRAWER_OPEN_ENDPOINT, FILTER_STATE_ENDPOINT, FILTER_TAGS_ENDPOINT,
};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::config::FunnelWebdashConfig;

const FILTERS_API_ENDPOINT: &str = "/dashboard/api/filters";
const FILTER_TAG_ENDPOINT: &str = "/dashboard/filters/tags/{index}";
const FILTER_TAG_REMOVE_ENDPOINT: &str = "/dashboard/filters/tags/{index}/remove";

/// Shared state: the configuration plus the single dashboard session.
pub struct FunnelWebdashServerState {
    config: FunnelWebdashConfig,
    session: Mutex<DashboardSession>,
}

impl FunnelWebdashServerState {
    pub fn new(config: FunnelWebdashConfig) -> Self {
        let mut session = DashboardSession::new(config.initial_filters.clone())
            .with_page_size(config.page_size);
        session.on_filter_change(|revision, filters| {
            info!(
                revision,
                state_filter = filters.state_filter(),
                tag_rows = filters.tag_filters().len(),
                active_tags = filters.active_tags().count(),
                "dashboard filters changed"
            );
        });
        Self {
            config,
            session: Mutex::new(session),
        }
    }

    pub fn config(&self) -> &FunnelWebdashConfig {
        &self.config
    }

    fn lock_session(&self) -> MutexGuard<'_, DashboardSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub async fn run_funnel_webdash_server(config: FunnelWebdashConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind funnel web dashboard on {}", config.bind))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve bound dashboard address")?;
    info!(
        addr = %local_addr,
        tes_server = %config.tes_server,
        page_size = config.page_size,
        "funnel web dashboard listening"
    );

    let state = Arc::new(FunnelWebdashServerState::new(config));
    let app = build_funnel_webdash_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("funnel web dashboard server exited unexpectedly")?;
    info!("funnel web dashboard stopped");
    Ok(())
}

pub fn build_funnel_webdash_router(state: Arc<FunnelWebdashServerState>) -> Router {
    Router::new()
        .route(FILTERS_API_ENDPOINT, get(handle_filters_snapshot))
        .route(FILTER_STATE_ENDPOINT, post(handle_set_state_filter))
        .route(FILTER_TAGS_ENDPOINT, post(handle_add_tag_filter))
        .route(FILTER_TAG_ENDPOINT, post(handle_set_tag_field))
        .route(FILTER_TAG_REMOVE_ENDPOINT, post(handle_remove_tag_filter))
        .route(DRAWER_OPEN_ENDPOINT, post(handle_open_drawer))
        .route(DRAWER_CLOSE_ENDPOINT, post(handle_close_drawer))
        .fallback(handle_dashboard_page)
        .with_state(state)
}

/// Only same-origin absolute paths are accepted as redirect targets.
fn resolve_return_to(raw: &str) -> String {
    let trimmed = raw.trim();
    let same_origin = trimmed.starts_with('/')
        && !trimmed.starts_with("//")
        && !trimmed.contains('\\')
        && !trimmed.chars().any(char::is_control);
    if same_origin {
        trimmed.to_string()
    } else {
        TASK_LIST_PATH.to_string()
    }
}

fn parse_row_index(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()
}

fn redirect_after_edit(action: &'static str, outcome: EditOutcome, return_to: &str) -> Response {
    debug!(action, outcome = outcome.as_str(), return_to, "dashboard filter edit handled");
    Redirect::to(&resolve_return_to(return_to)).into_response()
}

#[derive(Debug, Deserialize, Default)]
struct ReturnToForm {
    #[serde(default)]
    return_to: String,
}

#[derive(Debug, Deserialize, Default)]
struct StateFilterForm {
    #[serde(default)]
    value: String,
    #[serde(default)]
    return_to: String,
}

#[derive(Debug, Deserialize, Default)]
struct TagFieldForm {
    #[serde(default)]
    field: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    return_to: String,
}

async fn handle_dashboard_page(
    State(state): State<Arc<FunnelWebdashServerState>>,
    method: Method,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let composed = state.lock_session().compose(uri.path());
    if let Some(target) = composed.resolution.redirect_to {
        return Redirect::to(target).into_response();
    }
    let status = if composed.resolution.intent == ViewIntent::NotFound {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    let html = render_funnel_webdash_shell(&FunnelWebdashShellContext {
        composed,
        tes_server: state.config().tes_server.clone(),
    });
    (status, Html(html)).into_response()
}

async fn handle_filters_snapshot(
    State(state): State<Arc<FunnelWebdashServerState>>,
) -> Json<serde_json::Value> {
    let session = state.lock_session();
    Json(json!({
        "revision": session.revision(),
        "drawer": session.drawer().as_str(),
        "pageSize": session.page_size(),
        "filters": session.filters(),
    }))
}

async fn handle_set_state_filter(
    State(state): State<Arc<FunnelWebdashServerState>>,
    Form(form): Form<StateFilterForm>,
) -> Response {
    let outcome = state.lock_session().set_state_filter(form.value);
    redirect_after_edit("set-state-filter", outcome, &form.return_to)
}

async fn handle_add_tag_filter(
    State(state): State<Arc<FunnelWebdashServerState>>,
    Form(form): Form<ReturnToForm>,
) -> Response {
    let outcome = state.lock_session().add_tag_filter();
    redirect_after_edit("add-tag", outcome, &form.return_to)
}

async fn handle_set_tag_field(
    State(state): State<Arc<FunnelWebdashServerState>>,
    Path(index): Path<String>,
    Form(form): Form<TagFieldForm>,
) -> Response {
    let Some(index) = parse_row_index(&index) else {
        debug!(index = %index, "ignored tag edit with non-numeric row index");
        return Redirect::to(&resolve_return_to(&form.return_to)).into_response();
    };
    let outcome = state
        .lock_session()
        .set_tag_at(index, form.field, form.value);
    redirect_after_edit("set-tag", outcome, &form.return_to)
}

async fn handle_remove_tag_filter(
    State(state): State<Arc<FunnelWebdashServerState>>,
    Path(index): Path<String>,
    Form(form): Form<ReturnToForm>,
) -> Response {
    let Some(index) = parse_row_index(&index) else {
        debug!(index = %index, "ignored tag removal with non-numeric row index");
        return Redirect::to(&resolve_return_to(&form.return_to)).into_response();
    };
    let outcome = state.lock_session().remove_tag_filter_at(index);
    redirect_after_edit("remove-tag", outcome, &form.return_to)
}

async fn handle_open_drawer(
    State(state): State<Arc<FunnelWebdashServerState>>,
    Form(form): Form<ReturnToForm>,
) -> Response {
    let drawer = state.lock_session().open_drawer();
    debug!(drawer = drawer.as_str(), "dashboard drawer opened");
    Redirect::to(&resolve_return_to(&form.return_to)).into_response()
}

async fn handle_close_drawer(
    State(state): State<Arc<FunnelWebdashServerState>>,
    Form(form): Form<ReturnToForm>,
) -> Response {
    let drawer = state.lock_session().close_drawer();
    debug!(drawer = drawer.as_str(), "dashboard drawer closed");
    Redirect::to(&resolve_return_to(&form.return_to)).into_response()
}
