//! The console HTTP server: a static shell page plus server-rendered
//! HTML fragments for the catalog, forms, results and the status panel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::client::Backend;
use crate::dispatch::{self, DispatchOutcome};
use crate::forms;
use crate::markdown::MarkdownRenderer;
use crate::registry::{OperationKind, Registry};
use crate::render;
use crate::shell;
use crate::status::StatusHub;

/// Shared console state handed to every handler.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    registry: Registry,
    backend: Backend,
    hub: StatusHub,
    /// Bumped on every form open. Replies stamped with an older value are
    /// discarded instead of rendered into the result area.
    generation: AtomicU64,
    markdown: OnceLock<MarkdownRenderer>,
}

impl Console {
    pub fn new(registry: Registry, backend: Backend, hub: StatusHub) -> Self {
        Console {
            inner: Arc::new(ConsoleInner {
                registry,
                backend,
                hub,
                generation: AtomicU64::new(0),
                markdown: OnceLock::new(),
            }),
        }
    }

    pub fn hub(&self) -> &StatusHub {
        &self.inner.hub
    }

    fn markdown(&self) -> &MarkdownRenderer {
        self.inner.markdown.get_or_init(MarkdownRenderer::new)
    }

    fn bump_generation(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current_generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }
}

pub fn router(console: Console) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/console/catalog", get(get_catalog))
        .route("/console/ops/{id}/form", get(get_form))
        .route("/console/ops/{id}/dispatch", post(post_dispatch))
        .route("/console/status/panel", get(get_status_panel))
        .route("/console/status/summary", get(get_status_summary))
        .route("/console/workers/{name}", post(post_worker))
        .route("/console/workers", post(post_workers_bulk))
        .layer(TraceLayer::new_for_http())
        .with_state(console)
}

/// Bind and serve until the shutdown token fires.
pub async fn serve(bind: &str, console: Console, shutdown: CancellationToken) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(addr = %listener.local_addr()?, "console listening");
    axum::serve(listener, router(console))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(shell::SHELL_HTML)
}

async fn get_catalog() -> Html<String> {
    Html(forms::catalog())
}

fn not_found(id: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Html(render::error_panel(&format!("unknown operation `{id}`"))),
    )
        .into_response()
}

async fn get_form(State(console): State<Console>, Path(id): Path<String>) -> impl IntoResponse {
    let Some(op) = console.inner.registry.get(&id) else {
        return not_found(&id);
    };
    // A new selection invalidates whatever was still in flight.
    let generation = console.bump_generation();
    if op.kind == OperationKind::StatusPanel {
        console.inner.hub.poke();
        let (phase, snapshot, error) = console.inner.hub.view().await;
        return Html(render::status_panel(phase, snapshot.as_ref(), error.as_deref()))
            .into_response();
    }
    Html(forms::operation_form(op, generation)).into_response()
}

fn wrap_result(outcome: DispatchOutcome) -> String {
    match outcome.toast {
        Some(toast) => format!("{}{}", render::toast_marker(&toast), outcome.html),
        None => outcome.html,
    }
}

async fn post_dispatch(
    State(console): State<Console>,
    Path(id): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> impl IntoResponse {
    let Some(op) = console.inner.registry.get(&id) else {
        return not_found(&id);
    };
    if op.kind == OperationKind::StatusPanel {
        console.inner.hub.refresh_once().await;
        let (phase, snapshot, error) = console.inner.hub.view().await;
        return Html(render::status_panel(phase, snapshot.as_ref(), error.as_deref()))
            .into_response();
    }
    let (generation, fields) = forms::split_generation(fields);
    let outcome = dispatch::execute(&console.inner.backend, op, &fields, console.markdown()).await;
    console.inner.hub.announce();
    // The reply may have raced a newer form open; never write into a result
    // area that belongs to a different selection.
    if generation.is_some_and(|stamp| stamp < console.current_generation()) {
        return Html(render::discarded_note()).into_response();
    }
    Html(wrap_result(outcome)).into_response()
}

#[derive(Deserialize)]
struct PanelQuery {
    #[serde(default)]
    refresh: bool,
}

async fn get_status_panel(
    State(console): State<Console>,
    Query(query): Query<PanelQuery>,
) -> Html<String> {
    if query.refresh {
        console.inner.hub.refresh_once().await;
    }
    let (phase, snapshot, error) = console.inner.hub.view().await;
    Html(render::status_panel(phase, snapshot.as_ref(), error.as_deref()))
}

async fn get_status_summary(State(console): State<Console>) -> Html<String> {
    let (_, snapshot, _) = console.inner.hub.view().await;
    Html(render::status_summary(snapshot.as_ref()))
}

#[derive(Deserialize)]
struct ToggleForm {
    desired: bool,
}

async fn post_worker(
    State(console): State<Console>,
    Path(name): Path<String>,
    Form(form): Form<ToggleForm>,
) -> Html<String> {
    match console.inner.hub.set_worker(&name, form.desired).await {
        Ok(()) => {
            let verb = if form.desired { "started" } else { "stopped" };
            Html(format!(
                "{}{}",
                render::toast_marker(&format!("worker {name} {verb}")),
                render::worker_row(&name, form.desired),
            ))
        }
        Err(error) => {
            // Rollback: the row the control came from showed the opposite of
            // the requested state, so that is what gets restored.
            Html(format!(
                "{}{}",
                render::toast_marker(&format!("toggle failed: {error}")),
                render::worker_row(&name, !form.desired),
            ))
        }
    }
}

#[derive(Deserialize)]
struct BulkForm {
    enable: bool,
}

async fn post_workers_bulk(
    State(console): State<Console>,
    Form(form): Form<BulkForm>,
) -> Html<String> {
    match console.inner.hub.bulk_set(form.enable).await {
        Ok(outcome) => {
            let verb = if form.enable { "Started" } else { "Stopped" };
            Html(render::toast_marker(&format!(
                "{verb} {}/{} workers",
                outcome.succeeded, outcome.requested,
            )))
        }
        Err(error) => Html(render::toast_marker(&format!("bulk toggle failed: {error}"))),
    }
}
