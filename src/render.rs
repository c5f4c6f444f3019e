//! HTML fragment rendering for backend replies.
//!
//! Every value that reaches an HTML string goes through [`escape_html`] first;
//! the renderers never interpolate raw backend text.

use serde_json::Value;

use crate::status::PanelPhase;
use crate::types::{
    HostScanResponse, HostScanResult, PortResult, PortStatus, RangeScanResponse, StatusSnapshot,
};

/// Items rendered per list before the "N more" suffix takes over.
const LIST_CAP: usize = 200;

/// Nesting depth at which objects collapse into a disclosure widget.
const MAX_OBJECT_DEPTH: usize = 2;

/// Escape a string for HTML text and attribute positions.
pub fn escape_html(unsafe_text: &str) -> String {
    let mut out = String::with_capacity(unsafe_text.len());
    for ch in unsafe_text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

fn badge(status: PortStatus) -> String {
    let class = match status {
        PortStatus::Open => "badge badge-open",
        PortStatus::Filtered => "badge badge-filtered",
        PortStatus::Closed => "badge badge-closed",
    };
    format!("<span class=\"{class}\">{}</span>", status.label())
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Sort a port list for display: open ports first, then filtered, then the
/// rest, ascending port number within each bucket. The sort is stable, so
/// equal entries keep their reply order. Every scan view uses this one order.
pub fn sort_ports(results: &mut [PortResult]) {
    results.sort_by(|a, b| {
        let a_filtered = a.status() == PortStatus::Filtered;
        let b_filtered = b.status() == PortStatus::Filtered;
        b.open
            .cmp(&a.open)
            .then(b_filtered.cmp(&a_filtered))
            .then(a.port.cmp(&b.port))
    });
}

/// One host of a range scan with its derived counters.
struct HostView {
    host: String,
    results: Vec<PortResult>,
    duration_seconds: Option<f64>,
    error: Option<String>,
    open_count: usize,
    filtered_count: usize,
}

impl HostView {
    fn from(entry: &HostScanResult) -> Self {
        let mut results = entry.results.clone();
        sort_ports(&mut results);
        let open_count = results.iter().filter(|r| r.open).count();
        let filtered_count = results
            .iter()
            .filter(|r| r.status() == PortStatus::Filtered)
            .count();
        HostView {
            host: entry.host.clone(),
            results,
            duration_seconds: entry.duration_seconds,
            error: entry.error.clone(),
            open_count,
            filtered_count,
        }
    }
}

/// Order hosts for display: any open port wins, any filtered port comes next,
/// remaining hosts sort by name. Errored hosts have no ports and land last.
fn sort_hosts(hosts: &mut [HostView]) {
    hosts.sort_by(|a, b| {
        (b.open_count > 0)
            .cmp(&(a.open_count > 0))
            .then((b.filtered_count > 0).cmp(&(a.filtered_count > 0)))
            .then_with(|| a.host.cmp(&b.host))
    });
}

fn methods_line(methods: &[String]) -> String {
    if methods.is_empty() {
        return String::new();
    }
    let joined = methods
        .iter()
        .map(|m| escape_html(m))
        .collect::<Vec<_>>()
        .join(", ");
    format!("<div class=\"card-methods\"><strong>Methods:</strong> {joined}</div>")
}

fn product_line(entry: &PortResult) -> String {
    if entry.product.is_empty() {
        return String::new();
    }
    let mut text = escape_html(&entry.product);
    if !entry.version.is_empty() {
        text.push_str(" v");
        text.push_str(&escape_html(&entry.version));
    }
    format!("<div class=\"card-product\">{text}</div>")
}

fn vulns_line(vulnerabilities: &[String]) -> String {
    if vulnerabilities.is_empty() {
        return String::new();
    }
    let joined = vulnerabilities
        .iter()
        .map(|v| escape_html(v))
        .collect::<Vec<_>>()
        .join(", ");
    format!("<div class=\"card-vulns\"><strong>Vulns:</strong> {joined}</div>")
}

fn port_card(entry: &PortResult, host: Option<&str>) -> String {
    // Scan cards identify the target; catalog cards have no host to name.
    let identity = match host {
        Some(host) => format!(
            "<div class=\"card-identity\">{}:{}/{}</div>",
            escape_html(host),
            entry.port,
            escape_html(entry.transport()),
        ),
        None => String::new(),
    };
    format!(
        "<div class=\"port-card\">\
           <div>\
             <div class=\"card-port\">{port}</div>\
             <div class=\"card-service\">{service}</div>\
             {identity}{product}{methods}{vulns}\
           </div>\
           <div class=\"card-side\"><div class=\"card-side-label\">Port</div>{badge}</div>\
         </div>",
        port = entry.port,
        service = escape_html(&entry.service),
        product = product_line(entry),
        methods = methods_line(&entry.methods),
        vulns = vulns_line(&entry.vulnerabilities),
        badge = badge(entry.status()),
    )
}

fn ports_grid(entries: &[PortResult], host: Option<&str>, empty_message: &str) -> String {
    if entries.is_empty() {
        return format!("<div class=\"muted\">{}</div>", escape_html(empty_message));
    }
    let cards: String = entries.iter().map(|entry| port_card(entry, host)).collect();
    format!("<div class=\"card-grid\">{cards}</div>")
}

/// Render the common-port catalog as a card grid, in the order given.
pub fn ports_list(entries: &[PortResult], empty_message: &str) -> String {
    ports_grid(entries, None, empty_message)
}

/// Render a single-host scan: sort the ports, then the same card grid with a
/// `host:port/protocol` identity line per card.
pub fn host_scan(resp: &HostScanResponse) -> String {
    let mut sorted = resp.results.clone();
    sort_ports(&mut sorted);
    ports_grid(
        &sorted,
        Some(&resp.host),
        "No ports found or the response is empty.",
    )
}

fn range_port_item(entry: &PortResult) -> String {
    let mut sub = escape_html(entry.transport());
    if !entry.product.is_empty() {
        sub.push_str(" · ");
        sub.push_str(&escape_html(&entry.product));
    }
    format!(
        "<div class=\"port-item\">\
           <div>\
             <div class=\"port-item-title\">{port} · {service}</div>\
             <div class=\"port-item-sub\">{sub}</div>\
           </div>\
           <div>{badge}</div>\
         </div>",
        port = entry.port,
        service = escape_html(&entry.service),
        badge = badge(entry.status()),
    )
}

fn host_card(view: &HostView) -> String {
    let host = escape_html(&view.host);
    if let Some(error) = &view.error {
        return format!(
            "<div class=\"host-card\">\
               <div class=\"host-name\">{host}</div>\
               <div class=\"host-error\">Error: {}</div>\
             </div>",
            escape_html(error),
        );
    }
    let closed_count = view.results.len() - view.open_count;
    let duration = match view.duration_seconds {
        Some(d) if d > 0.0 => format!("{d}s"),
        _ => String::new(),
    };
    let ports: String = view.results.iter().map(range_port_item).collect();
    format!(
        "<div class=\"host-card\" data-host=\"{host}\">\
           <div class=\"host-header\">\
             <div class=\"host-title\">\
               <button class=\"host-toggle\" aria-expanded=\"true\">&#9662;</button>\
               <div>\
                 <div class=\"host-name\">{host}</div>\
                 <div class=\"host-summary\">Ports detected: {total} · Open: {open} · Closed: {closed}</div>\
               </div>\
             </div>\
             <div class=\"host-duration\">{duration}</div>\
           </div>\
           <div class=\"host-body\">{ports}</div>\
         </div>",
        total = view.results.len(),
        open = view.open_count,
        closed = closed_count,
    )
}

/// Render a range scan as host cards, most interesting hosts first.
pub fn range_scan(resp: &RangeScanResponse) -> String {
    if resp.hosts.is_empty() {
        return "<div class=\"muted\">No results obtained.</div>".to_string();
    }
    let mut views: Vec<HostView> = resp.hosts.iter().map(HostView::from).collect();
    sort_hosts(&mut views);
    let cards: String = views.iter().map(host_card).collect();
    format!("<div class=\"host-grid\">{cards}</div>")
}

fn render_friendly(value: &Value, depth: usize) -> String {
    match value {
        Value::Null => "<span class=\"response-value\">(null)</span>".to_string(),
        Value::Bool(b) => format!("<span class=\"response-value\">{b}</span>"),
        Value::Number(n) => format!("<span class=\"response-value\">{n}</span>"),
        Value::String(s) => format!("<span class=\"response-value\">{}</span>", escape_html(s)),
        Value::Array(items) => {
            if items.is_empty() {
                return "<span class=\"response-value\">(empty)</span>".to_string();
            }
            let mut out = String::from("<ul class=\"response-list\">");
            for item in items.iter().take(LIST_CAP) {
                out.push_str("<li>");
                out.push_str(&render_friendly(item, depth + 1));
                out.push_str("</li>");
            }
            if items.len() > LIST_CAP {
                out.push_str(&format!("<li>... {} more</li>", items.len() - LIST_CAP));
            }
            out.push_str("</ul>");
            out
        }
        Value::Object(map) => {
            if depth >= MAX_OBJECT_DEPTH {
                return format!(
                    "<details><summary>Object (show JSON)</summary><pre>{}</pre></details>",
                    escape_html(&pretty_json(value)),
                );
            }
            let mut out = String::from("<div>");
            for (key, val) in map {
                let class = if val.is_object() || val.is_array() {
                    " class=\"response-row-block\""
                } else {
                    ""
                };
                out.push_str(&format!(
                    "<div{class}><span class=\"response-key\">{}:</span> {}</div>",
                    escape_html(key),
                    render_friendly(val, depth + 1),
                ));
            }
            out.push_str("</div>");
            out
        }
    }
}

fn panel(header_meta: &str, header_extra: &str, body: &str) -> String {
    format!(
        "<div class=\"panel\">\
           <div class=\"panel-head\">\
             <div class=\"response-meta\">{header_meta}</div>\
             <div>{header_extra}<button class=\"panel-toggle\">&#9662;</button></div>\
           </div>\
           <div class=\"panel-body\">{body}</div>\
         </div>"
    )
}

/// Friendly key/value panel for arbitrary JSON, headed by the HTTP status.
pub fn friendly_panel(value: &Value, status: u16) -> String {
    panel(
        &format!("Status: {status}"),
        "",
        &render_friendly(value, 0),
    )
}

/// Collapsible raw-JSON panel with a copy button.
pub fn raw_json_panel(value: &Value) -> String {
    let body = format!(
        "<div class=\"raw-box\"><pre>{}</pre></div>",
        escape_html(&pretty_json(value)),
    );
    panel(
        "Raw JSON",
        "<button class=\"copy-json-btn\" type=\"button\">Copy JSON</button> ",
        &body,
    )
}

/// Two-pane layout for generic replies: friendly view plus raw JSON.
pub fn two_pane(value: &Value, status: u16) -> String {
    format!(
        "<div class=\"response-two-col\">\
           <div class=\"left-pane\">{}</div>\
           <div class=\"right-pane\">{}</div>\
         </div>",
        friendly_panel(value, status),
        raw_json_panel(value),
    )
}

/// Escaped preformatted block for plain-text replies.
pub fn plain_text(text: &str) -> String {
    format!("<pre>{}</pre>", escape_html(text))
}

/// Error panel for transport failures and console-side errors.
pub fn error_panel(message: &str) -> String {
    format!(
        "<div class=\"response-error\">Error: {}</div>",
        escape_html(message),
    )
}

/// Inert marker for a reply that arrived after the user moved on.
pub fn discarded_note() -> String {
    "<div class=\"response-meta discarded\">Discarded stale response.</div>".to_string()
}

/// Invisible marker the shell turns into a transient toast.
pub fn toast_marker(message: &str) -> String {
    format!(
        "<div class=\"toast-note\" data-toast=\"{}\"></div>",
        escape_html(message),
    )
}

/// One worker row of the status panel. The toggle carries the state it wants
/// to reach, so a swapped-in row is always consistent with its own control.
pub fn worker_row(name: &str, running: bool) -> String {
    let (state_class, state_label, action) = if running {
        ("worker-state on", "running", "Stop")
    } else {
        ("worker-state off", "stopped", "Start")
    };
    let escaped = escape_html(name);
    format!(
        "<div class=\"worker-row\" data-worker=\"{escaped}\">\
           <div class=\"worker-name\">{escaped}</div>\
           <div class=\"{state_class}\">{state_label}</div>\
           <button class=\"worker-toggle\" data-worker=\"{escaped}\" data-desired=\"{desired}\">{action}</button>\
         </div>",
        desired = !running,
    )
}

/// The live status panel: infra and UI flags plus one toggle row per worker.
pub fn status_panel(phase: PanelPhase, snapshot: Option<&StatusSnapshot>, error: Option<&str>) -> String {
    let mut out = String::from(
        "<div class=\"status-panel\">\
         <div class=\"panel-actions\">\
         <button id=\"btn-status-refresh\" type=\"button\">Refresh</button>\
         </div>",
    );
    match phase {
        PanelPhase::Idle => out.push_str("<div class=\"muted\">Status not fetched yet.</div>"),
        PanelPhase::Fetching if snapshot.is_none() => {
            out.push_str("<div class=\"muted\">Fetching status...</div>")
        }
        _ => {}
    }
    if let Some(err) = error {
        out.push_str(&format!(
            "<div class=\"response-error\">Status error: {}</div>",
            escape_html(err),
        ));
    }
    if let Some(snap) = snapshot {
        let infra = if snap.infra_ready {
            "<span class=\"flag ok\">OK</span>"
        } else {
            "<span class=\"flag bad\">NO</span>"
        };
        let ui = if snap.ui_initialized {
            "<span class=\"flag ok\">yes</span>"
        } else {
            "<span class=\"flag bad\">no</span>"
        };
        out.push_str(&format!(
            "<div class=\"status-flags\">Infra ready: {infra} · UI initialized: {ui}</div>"
        ));
        if let Some(fetched_at) = &snap.fetched_at {
            out.push_str(&format!(
                "<div class=\"muted panel-updated\">Updated {}</div>",
                escape_html(fetched_at),
            ));
        }
        if let Some(infra_error) = &snap.infra_error {
            out.push_str(&format!(
                "<div class=\"response-error\">Infra: {}</div>",
                escape_html(infra_error),
            ));
        }
        out.push_str(
            "<div class=\"worker-actions\">\
               <button id=\"btn-start-all\">Start all</button>\
               <button id=\"btn-stop-all\">Stop all</button>\
             </div>",
        );
        out.push_str("<div class=\"worker-list\">");
        for (name, running) in &snap.workers {
            out.push_str(&worker_row(name, *running));
        }
        out.push_str("</div>");
    }
    out.push_str("</div>");
    out
}

/// One-line status summary used by the shell header.
pub fn status_summary(snapshot: Option<&StatusSnapshot>) -> String {
    let Some(snap) = snapshot else {
        return "<span class=\"muted\">Status unknown</span>".to_string();
    };
    let running = snap.running_workers();
    let workers = if running.is_empty() {
        "none".to_string()
    } else {
        escape_html(&running.join(", "))
    };
    format!(
        "Infra: {} · UI init: {} · Workers: {workers}",
        if snap.infra_ready { "OK" } else { "NO" },
        if snap.ui_initialized { "yes" } else { "no" },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HostScanResult;

    fn port(number: u16, open: bool, state: &str) -> PortResult {
        PortResult {
            port: number,
            open,
            state: state.to_string(),
            ..PortResult::default()
        }
    }

    #[test]
    fn escape_covers_html_metacharacters() {
        assert_eq!(
            escape_html(r#"<b a="x">&'</b>"#),
            "&lt;b a=&quot;x&quot;&gt;&amp;&#039;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn sort_buckets_open_then_filtered_then_closed() {
        let mut results = vec![
            port(21, false, "closed"),
            port(53, false, "filtered"),
            port(443, true, ""),
            port(22, false, "Filtered "),
            port(80, true, ""),
        ];
        sort_ports(&mut results);
        let order: Vec<u16> = results.iter().map(|r| r.port).collect();
        assert_eq!(order, vec![80, 443, 22, 53, 21]);
    }

    #[test]
    fn sort_orders_ports_ascending_within_a_bucket() {
        let mut results = vec![
            port(8080, true, "open"),
            port(443, false, "closed"),
            port(80, true, "open"),
            port(22, false, "closed"),
        ];
        sort_ports(&mut results);
        let order: Vec<(u16, bool)> = results.iter().map(|r| (r.port, r.open)).collect();
        assert_eq!(order, vec![(80, true), (8080, true), (22, false), (443, false)]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut first = port(80, true, "open");
        first.service = "first".into();
        let mut second = port(80, true, "open");
        second.service = "second".into();
        let mut results = vec![first, second];
        sort_ports(&mut results);
        assert_eq!(results[0].service, "first");
        assert_eq!(results[1].service, "second");
    }

    #[test]
    fn hosts_with_open_ports_render_before_lexicographic_order() {
        let resp = RangeScanResponse {
            scanned: Some(2),
            hosts: vec![
                HostScanResult {
                    host: "10.0.0.2".into(),
                    results: vec![port(22, false, "filtered")],
                    ..HostScanResult::default()
                },
                HostScanResult {
                    host: "10.0.0.1".into(),
                    results: vec![port(80, true, "")],
                    ..HostScanResult::default()
                },
            ],
            duration_seconds: None,
        };
        let html = range_scan(&resp);
        let first = html.find("data-host=\"10.0.0.1\"").unwrap();
        let second = html.find("data-host=\"10.0.0.2\"").unwrap();
        assert!(first < second);
    }

    #[test]
    fn errored_host_renders_error_card_without_ports() {
        let resp = RangeScanResponse {
            scanned: None,
            hosts: vec![HostScanResult {
                host: "10.0.0.9".into(),
                error: Some("unreachable <host>".into()),
                ..HostScanResult::default()
            }],
            duration_seconds: None,
        };
        let html = range_scan(&resp);
        assert!(html.contains("Error: unreachable &lt;host&gt;"));
        assert!(!html.contains("host-body"));
        assert!(!html.contains("Ports detected"));
    }

    #[test]
    fn host_summary_counts_open_and_closed() {
        let resp = RangeScanResponse {
            scanned: None,
            hosts: vec![HostScanResult {
                host: "10.0.0.5".into(),
                results: vec![
                    port(80, true, ""),
                    port(22, false, "filtered"),
                    port(21, false, "closed"),
                ],
                duration_seconds: Some(1.5),
                error: None,
            }],
            duration_seconds: None,
        };
        let html = range_scan(&resp);
        assert!(html.contains("Ports detected: 3 · Open: 1 · Closed: 2"));
        assert!(html.contains("1.5s"));
    }

    #[test]
    fn ports_list_uses_tri_state_badges() {
        let entries = vec![
            port(80, true, ""),
            port(53, true, "filtered"),
            port(21, false, ""),
        ];
        let html = ports_list(&entries, "nothing");
        assert!(html.contains(">OPEN</span>"));
        assert!(html.contains(">FILTERED</span>"));
        assert!(html.contains(">CLOSED</span>"));
    }

    #[test]
    fn empty_ports_list_shows_message() {
        let html = ports_list(&[], "No common ports listed.");
        assert!(html.contains("No common ports listed."));
        assert!(!html.contains("port-card"));
    }

    #[test]
    fn host_scan_cards_carry_identity_and_vulns() {
        let resp = HostScanResponse {
            host: "192.168.1.7".into(),
            results: vec![PortResult {
                port: 443,
                service: "https".into(),
                open: true,
                vulnerabilities: vec!["CVE-2024-0001".into()],
                ..PortResult::default()
            }],
            duration_seconds: None,
        };
        let html = host_scan(&resp);
        assert!(html.contains("192.168.1.7:443/tcp"));
        assert!(html.contains("CVE-2024-0001"));
        // Catalog cards carry no identity line.
        assert!(!ports_list(&resp.results, "x").contains("card-identity"));
    }

    #[test]
    fn friendly_marks_null_and_empty_list() {
        let value = serde_json::json!({"a": null, "b": []});
        let html = friendly_panel(&value, 200);
        assert!(html.contains("(null)"));
        assert!(html.contains("(empty)"));
        assert!(html.contains("Status: 200"));
    }

    #[test]
    fn friendly_caps_long_lists() {
        let items: Vec<u32> = (0..250).collect();
        let value = serde_json::json!(items);
        let html = friendly_panel(&value, 200);
        assert!(html.contains("... 50 more"));
        assert_eq!(html.matches("<li>").count(), 201);
    }

    #[test]
    fn deep_objects_collapse_into_disclosure() {
        let value = serde_json::json!({"a": {"b": {"c": {"d": 1}}}});
        let html = friendly_panel(&value, 200);
        assert!(html.contains("<details><summary>Object (show JSON)</summary>"));
        assert!(html.contains("&quot;d&quot;: 1"));
    }

    #[test]
    fn two_pane_holds_friendly_and_raw_views() {
        let value = serde_json::json!({"message": "ok"});
        let html = two_pane(&value, 201);
        assert!(html.contains("left-pane"));
        assert!(html.contains("right-pane"));
        assert!(html.contains("Copy JSON"));
        assert!(html.contains("Status: 201"));
    }

    #[test]
    fn malicious_payload_never_reaches_markup() {
        let mut evil = port(80, true, "");
        evil.service = "<script>alert(1)</script>".into();
        let html = ports_list(&[evil], "none");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));

        let value = serde_json::json!({"<img onerror=x>": "<svg/onload=1>"});
        let html = two_pane(&value, 200);
        assert!(!html.contains("<img"));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn status_panel_renders_worker_rows_and_flags() {
        let snap: StatusSnapshot = serde_json::from_str(
            r#"{"infra_ready":true,"ui_initialized":false,
                "workers":{"spacy_nlp":true,"dynamic_spider":false}}"#,
        )
        .unwrap();
        let html = status_panel(PanelPhase::Rendered, Some(&snap), None);
        assert!(html.contains("data-worker=\"spacy_nlp\""));
        assert!(html.contains("data-desired=\"false\""));
        assert!(html.contains("data-worker=\"dynamic_spider\""));
        assert!(html.contains("data-desired=\"true\""));
        assert!(html.contains(">Stop</button>"));
        assert!(html.contains(">Start</button>"));
    }

    #[test]
    fn status_panel_keeps_last_snapshot_on_error() {
        let snap: StatusSnapshot =
            serde_json::from_str(r#"{"infra_ready":true,"ui_initialized":true,"workers":{}}"#)
                .unwrap();
        let html = status_panel(PanelPhase::Errored, Some(&snap), Some("connect refused"));
        assert!(html.contains("Status error: connect refused"));
        assert!(html.contains("Infra ready:"));
    }

    #[test]
    fn status_summary_lists_running_or_none() {
        let snap: StatusSnapshot = serde_json::from_str(
            r#"{"infra_ready":true,"ui_initialized":true,
                "workers":{"b":true,"a":true,"c":false}}"#,
        )
        .unwrap();
        assert_eq!(
            status_summary(Some(&snap)),
            "Infra: OK · UI init: yes · Workers: a, b"
        );
        let idle: StatusSnapshot =
            serde_json::from_str(r#"{"infra_ready":false,"ui_initialized":false,"workers":{}}"#)
                .unwrap();
        assert_eq!(
            status_summary(Some(&idle)),
            "Infra: NO · UI init: no · Workers: none"
        );
        assert!(status_summary(None).contains("Status unknown"));
    }
}
