//! Request building and reply classification for catalog operations.
//!
//! The builder turns free-text form fields into one outbound request; the
//! classifier routes the reply body to the renderer owned by the operation's
//! kind. A non-2xx status is still classified; only transport failures
//! short-circuit to the error panel.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::client::{Backend, BackendReply};
use crate::markdown::{looks_like_markdown, MarkdownRenderer};
use crate::registry::{Method, OperationDescriptor, OperationKind};
use crate::render;
use crate::types::{HostScanResponse, PortCatalogResponse, RangeScanResponse};

/// Outbound payload produced from submitted form fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Prepared {
    Get { query: Vec<(String, String)> },
    Post { body: Value },
}

/// Build the outbound request for one dispatch.
///
/// GET keeps every non-empty field as a query pair in submission order.
/// POST drops blank fields, coerces `"on"`/`"true"`/`"false"` to booleans,
/// and rewrites a textual `ports` field into an integer list.
pub fn prepare(op: &OperationDescriptor, fields: &[(String, String)]) -> Prepared {
    match op.method {
        Method::Get => Prepared::Get {
            query: fields
                .iter()
                .filter(|(_, value)| !value.is_empty())
                .cloned()
                .collect(),
        },
        Method::Post => Prepared::Post {
            body: build_post_body(fields),
        },
    }
}

fn coerce(value: &str) -> Value {
    if value.eq_ignore_ascii_case("on") || value.eq_ignore_ascii_case("true") {
        Value::Bool(true)
    } else if value.eq_ignore_ascii_case("false") {
        Value::Bool(false)
    } else {
        Value::String(value.to_string())
    }
}

fn parse_ports(raw: &str) -> Vec<Value> {
    raw.split(',')
        .filter_map(|token| token.trim().parse::<i64>().ok())
        .map(Value::from)
        .collect()
}

fn build_post_body(fields: &[(String, String)]) -> Value {
    let mut map = Map::new();
    for (name, value) in fields {
        if value.trim().is_empty() {
            continue;
        }
        map.insert(name.clone(), coerce(value));
    }
    // Boolean coercion ran first, so a literal `ports=true` stays a flag and
    // only genuine text gets the comma-list treatment.
    let parsed = match map.get("ports") {
        Some(Value::String(raw)) => Some(parse_ports(raw)),
        _ => None,
    };
    if let Some(ports) = parsed {
        if ports.is_empty() {
            map.remove("ports");
        } else {
            map.insert("ports".to_string(), Value::Array(ports));
        }
    }
    Value::Object(map)
}

/// Rendered outcome of one dispatch.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub html: String,
    /// Transport and HTTP success; worker-start announcements key off this.
    pub ok: bool,
    /// Transient confirmation for operations that start a background worker.
    pub toast: Option<String>,
}

/// Send the prepared request and render the reply.
pub async fn execute(
    backend: &Backend,
    op: &OperationDescriptor,
    fields: &[(String, String)],
    markdown: &MarkdownRenderer,
) -> DispatchOutcome {
    let sent = match prepare(op, fields) {
        Prepared::Get { query } => backend.get_operation(op.path, &query).await,
        Prepared::Post { body } => backend.post_operation(op.path, &body).await,
    };
    match sent {
        Ok(reply) => {
            let toast = (op.starts_worker && reply.ok).then(|| format!("{} started", op.title));
            DispatchOutcome {
                html: classify(op, &reply, markdown),
                ok: reply.ok,
                toast,
            }
        }
        Err(error) => DispatchOutcome {
            html: render::error_panel(&error.to_string()),
            ok: false,
            toast: None,
        },
    }
}

/// Route a reply body to its renderer.
pub fn classify(op: &OperationDescriptor, reply: &BackendReply, markdown: &MarkdownRenderer) -> String {
    match serde_json::from_str::<Value>(&reply.body) {
        Ok(value) => classify_json(op.kind, &value, reply.status),
        Err(_) => {
            if looks_like_markdown(&reply.body) {
                format!(
                    "<div class=\"response-box\">{}</div>",
                    markdown.to_html(&reply.body),
                )
            } else {
                render::plain_text(&reply.body)
            }
        }
    }
}

fn classify_json(kind: OperationKind, value: &Value, status: u16) -> String {
    match kind {
        OperationKind::HostScan => match HostScanResponse::deserialize(value) {
            Ok(resp) => render::host_scan(&resp),
            Err(_) => render::raw_json_panel(value),
        },
        OperationKind::RangeScan => match RangeScanResponse::deserialize(value) {
            Ok(resp) => render::range_scan(&resp),
            Err(_) => render::raw_json_panel(value),
        },
        OperationKind::PortCatalog => match PortCatalogResponse::deserialize(value) {
            Ok(resp) => render::ports_list(&resp.common_ports, "No common ports listed."),
            Err(_) => render::raw_json_panel(value),
        },
        OperationKind::Generic | OperationKind::StatusPanel => render::two_pane(value, status),
    }
}
