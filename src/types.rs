use std::collections::BTreeMap;

use serde::Deserialize;

/// Display status derived from a port's `open` flag and raw `state` string.
///
/// `filtered` wins over `open` wins over `closed`; a port is never shown in two
/// states at once. The variant order doubles as the range-scan sort priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PortStatus {
    Open,
    Filtered,
    Closed,
}

impl PortStatus {
    pub fn label(self) -> &'static str {
        match self {
            PortStatus::Open => "OPEN",
            PortStatus::Filtered => "FILTERED",
            PortStatus::Closed => "CLOSED",
        }
    }
}

/// One probed port as reported by the backend.
///
/// Every field is optional on the wire; catalog entries carry only
/// `port`/`service`/`methods` while scan results add state and product data.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct PortResult {
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub methods: Vec<String>,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub vulnerabilities: Vec<String>,
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub protocol: Option<String>,
}

impl PortResult {
    /// Raw state lowercased and trimmed, the form all comparisons use.
    pub fn normalized_state(&self) -> String {
        self.state.trim().to_ascii_lowercase()
    }

    /// Derived tri-state: `filtered` beats the `open` flag, which beats closed.
    pub fn status(&self) -> PortStatus {
        if self.normalized_state() == "filtered" {
            PortStatus::Filtered
        } else if self.open {
            PortStatus::Open
        } else {
            PortStatus::Closed
        }
    }

    /// Transport protocol, defaulting to `tcp` when the backend omits it.
    pub fn transport(&self) -> &str {
        self.protocol.as_deref().unwrap_or("tcp")
    }
}

/// Response of a single-host scan (`POST /network/scan`).
#[derive(Deserialize, Debug, Clone, Default)]
pub struct HostScanResponse {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub results: Vec<PortResult>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

/// Per-host entry of a range scan. `error` and `results` are mutually
/// exclusive: a host that failed carries no port list.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct HostScanResult {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub results: Vec<PortResult>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of a range scan (`POST /network/scan_range`).
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RangeScanResponse {
    #[serde(default)]
    pub scanned: Option<u64>,
    #[serde(default)]
    pub hosts: Vec<HostScanResult>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

/// Response of the common-port catalog (`GET /network/ports`).
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PortCatalogResponse {
    #[serde(default)]
    pub common_ports: Vec<PortResult>,
}

/// Aggregate backend status (`GET /status`). Sourced fresh on every poll;
/// a refresh replaces the whole snapshot, workers are never merged.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub infra_ready: bool,
    #[serde(default)]
    pub infra_error: Option<String>,
    #[serde(default)]
    pub ui_initialized: bool,
    #[serde(default)]
    pub workers: BTreeMap<String, bool>,
    /// RFC3339 fetch time stamped by the console, never present on the wire.
    #[serde(skip)]
    pub fetched_at: Option<String>,
}

impl StatusSnapshot {
    /// Names of workers currently flagged as running, in name order.
    pub fn running_workers(&self) -> Vec<&str> {
        self.workers
            .iter()
            .filter(|(_, running)| **running)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(open: bool, state: &str) -> PortResult {
        PortResult {
            port: 80,
            open,
            state: state.to_string(),
            ..PortResult::default()
        }
    }

    #[test]
    fn filtered_takes_precedence_over_open() {
        assert_eq!(port(true, "filtered").status(), PortStatus::Filtered);
        assert_eq!(port(true, " Filtered ").status(), PortStatus::Filtered);
    }

    #[test]
    fn open_flag_beats_closed() {
        assert_eq!(port(true, "open").status(), PortStatus::Open);
        assert_eq!(port(true, "").status(), PortStatus::Open);
        assert_eq!(port(false, "closed").status(), PortStatus::Closed);
        assert_eq!(port(false, "unknown").status(), PortStatus::Closed);
    }

    #[test]
    fn protocol_defaults_to_tcp() {
        assert_eq!(port(true, "open").transport(), "tcp");
        let udp = PortResult {
            protocol: Some("udp".into()),
            ..PortResult::default()
        };
        assert_eq!(udp.transport(), "udp");
    }

    #[test]
    fn catalog_entries_deserialize_with_defaults() {
        let raw = r#"{"common_ports":[{"port":22,"service":"ssh","methods":["SSH","SFTP"]}]}"#;
        let parsed: PortCatalogResponse = serde_json::from_str(raw).unwrap();
        let entry = &parsed.common_ports[0];
        assert_eq!(entry.port, 22);
        assert!(!entry.open);
        assert_eq!(entry.status(), PortStatus::Closed);
        assert_eq!(entry.transport(), "tcp");
    }

    #[test]
    fn status_snapshot_lists_running_workers_sorted() {
        let raw = r#"{"infra_ready":true,"ui_initialized":true,
            "workers":{"zeta":true,"alpha":true,"mid":false}}"#;
        let snap: StatusSnapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snap.running_workers(), vec!["alpha", "zeta"]);
        assert!(snap.infra_error.is_none());
    }
}
