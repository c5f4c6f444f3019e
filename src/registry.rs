use std::collections::{HashMap, HashSet};

use thiserror::Error;

/// HTTP method of a catalog operation. The catalog only ever uses these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// How the console interprets an operation's reply.
///
/// Resolved per descriptor when the registry is built, so a reply is never
/// routed to a renderer by re-matching its request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Arbitrary JSON, text or markdown; the recursive renderer handles it.
    Generic,
    /// `{common_ports: [...]}` catalog payload.
    PortCatalog,
    /// Single-host scan payload, normalized and sorted before rendering.
    HostScan,
    /// Range-scan payload with per-host result groups.
    RangeScan,
    /// Short-circuits to the live status panel instead of dispatching.
    StatusPanel,
}

/// One free-text input field of an operation form.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub placeholder: &'static str,
}

/// One dispatchable backend operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub method: Method,
    pub path: &'static str,
    pub params: &'static [ParamSpec],
    pub desc: &'static str,
    pub kind: OperationKind,
    /// Form carries an extra `use_nmap` checkbox, checked by default.
    pub nmap_toggle: bool,
    /// A successful dispatch announces that a background worker was started.
    pub starts_worker: bool,
}

/// A named group of operations in the catalog sidebar.
#[derive(Debug, Clone, Copy)]
pub struct OperationGroup {
    pub name: &'static str,
    pub ops: &'static [OperationDescriptor],
}

/// Group names folded under the OSINT umbrella in the catalog listing.
pub const OSINT_GROUPS: &[&str] = &["Scrapy", "SpaCy", "Tiny", "LLM"];

/// The full operation catalog, fixed at compile time.
static GROUPS: &[OperationGroup] = &[
    OperationGroup {
        name: "Scrapy",
        ops: &[
            OperationDescriptor {
                id: "scrape-news",
                title: "Scrape News",
                method: Method::Get,
                path: "/newsSpider/scrape-news",
                params: &[],
                desc: "Scrape the configured news sources and normalize the articles.",
                kind: OperationKind::Generic,
                nmap_toggle: false,
                starts_worker: true,
            },
            OperationDescriptor {
                id: "start-google-alerts",
                title: "Start Google Alerts",
                method: Method::Get,
                path: "/newsSpider/start-google-alerts",
                params: &[],
                desc: "Start collection of the configured Google Alerts.",
                kind: OperationKind::Generic,
                nmap_toggle: false,
                starts_worker: true,
            },
            OperationDescriptor {
                id: "save-feed-google-alerts",
                title: "Save Feed Google Alerts",
                method: Method::Post,
                path: "/newsSpider/save-feed-google-alerts",
                params: &[ParamSpec {
                    name: "link",
                    placeholder: "feed URL or text",
                }],
                desc: "Store a Google Alerts feed in the database.",
                kind: OperationKind::Generic,
                nmap_toggle: false,
                starts_worker: false,
            },
            OperationDescriptor {
                id: "scrapy-google-dk-feeds",
                title: "Scrapy Google DK Feeds",
                method: Method::Get,
                path: "/newsSpider/scrapy/google-dk/feeds",
                params: &[],
                desc: "Crawl and list feeds discovered for Google DK.",
                kind: OperationKind::Generic,
                nmap_toggle: false,
                starts_worker: true,
            },
            OperationDescriptor {
                id: "scrapy-google-dk-news",
                title: "Scrapy Google DK News",
                method: Method::Get,
                path: "/newsSpider/scrapy/google-dk/news",
                params: &[],
                desc: "Crawl news articles from Google DK.",
                kind: OperationKind::Generic,
                nmap_toggle: false,
                starts_worker: true,
            },
        ],
    },
    OperationGroup {
        name: "SpaCy",
        ops: &[OperationDescriptor {
            id: "start-spacy",
            title: "Start SpaCy",
            method: Method::Get,
            path: "/start-spacy",
            params: &[],
            desc: "Start or load the SpaCy text-processing pipeline.",
            kind: OperationKind::Generic,
            nmap_toggle: false,
            starts_worker: true,
        }],
    },
    OperationGroup {
        name: "Tiny",
        ops: &[
            OperationDescriptor {
                id: "search-and-insert-rss",
                title: "Search and Insert RSS",
                method: Method::Get,
                path: "/postgre-ttrss/search-and-insert-rss",
                params: &[ParamSpec {
                    name: "link",
                    placeholder: "query (optional)",
                }],
                desc: "Search RSS items by query and insert the new ones.",
                kind: OperationKind::Generic,
                nmap_toggle: false,
                starts_worker: true,
            },
            OperationDescriptor {
                id: "feeds",
                title: "List Feeds",
                method: Method::Get,
                path: "/postgre-ttrss/feeds",
                params: &[],
                desc: "List the feeds stored in the database.",
                kind: OperationKind::Generic,
                nmap_toggle: false,
                starts_worker: false,
            },
        ],
    },
    OperationGroup {
        name: "LLM",
        ops: &[OperationDescriptor {
            id: "llm-updater",
            title: "LLM Updater",
            method: Method::Get,
            path: "/llm/updater",
            params: &[],
            desc: "Start the model updater in the background.",
            kind: OperationKind::Generic,
            nmap_toggle: false,
            starts_worker: true,
        }],
    },
    OperationGroup {
        name: "Network",
        ops: &[
            OperationDescriptor {
                id: "network-scan",
                title: "Network Scan",
                method: Method::Post,
                path: "/network/scan",
                params: &[
                    ParamSpec {
                        name: "host",
                        placeholder: "IP or hostname",
                    },
                    ParamSpec {
                        name: "ports",
                        placeholder: "comma-separated ports (optional)",
                    },
                ],
                desc: "Scan common ports on a single host. Scan only hosts you are allowed to.",
                kind: OperationKind::HostScan,
                nmap_toggle: true,
                starts_worker: false,
            },
            OperationDescriptor {
                id: "network-scan-range",
                title: "Network Range Scan",
                method: Method::Post,
                path: "/network/scan_range",
                params: &[
                    ParamSpec {
                        name: "cidr",
                        placeholder: "CIDR (e.g. 192.168.1.0/28)",
                    },
                    ParamSpec {
                        name: "start",
                        placeholder: "start IP (e.g. 192.168.1.1)",
                    },
                    ParamSpec {
                        name: "end",
                        placeholder: "end IP (optional)",
                    },
                    ParamSpec {
                        name: "ports",
                        placeholder: "comma-separated ports (optional)",
                    },
                    ParamSpec {
                        name: "concurrency",
                        placeholder: "concurrency (optional, default 20)",
                    },
                ],
                desc: "Scan an address range and report per-host port state. Use with permission.",
                kind: OperationKind::RangeScan,
                nmap_toggle: true,
                starts_worker: false,
            },
            OperationDescriptor {
                id: "network-ports",
                title: "List Common Ports",
                method: Method::Get,
                path: "/network/ports",
                params: &[],
                desc: "List the common ports suggested for scanning.",
                kind: OperationKind::PortCatalog,
                nmap_toggle: false,
                starts_worker: false,
            },
        ],
    },
    OperationGroup {
        name: "Status",
        ops: &[OperationDescriptor {
            id: "system-status-op",
            title: "System Status",
            method: Method::Get,
            path: "/status",
            params: &[],
            desc: "Show infrastructure, UI and worker state.",
            kind: OperationKind::StatusPanel,
            nmap_toggle: false,
            starts_worker: false,
        }],
    },
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate operation id `{0}`")]
    DuplicateId(String),
    #[error("duplicate backend path `{0}`")]
    DuplicatePath(String),
    #[error("group `{0}` has no operations")]
    EmptyGroup(String),
    #[error("catalog needs exactly one status panel operation, found {0}")]
    StatusPanelCount(usize),
    #[error("operation `{id}`: duplicate field `{field}`")]
    DuplicateField { id: String, field: String },
    #[error("operation `{id}`: kind {kind:?} requires method {expected}")]
    KindMethodMismatch {
        id: String,
        kind: OperationKind,
        expected: &'static str,
    },
    #[error("operation `{id}`: a status panel operation takes no fields")]
    StatusPanelWithFields { id: String },
    #[error("operation `{id}`: the nmap toggle belongs to scan operations only")]
    NmapToggleMismatch { id: String },
}

/// Validated catalog with id lookup. Built once at startup; any kind or id
/// inconsistency in the static table is a startup error, not a runtime 404.
pub struct Registry {
    by_id: HashMap<&'static str, &'static OperationDescriptor>,
}

impl Registry {
    pub fn new() -> Result<Self, RegistryError> {
        let mut by_id = HashMap::new();
        let mut paths = HashSet::new();
        let mut status_panels = 0;
        for group in GROUPS {
            if group.ops.is_empty() {
                return Err(RegistryError::EmptyGroup(group.name.to_string()));
            }
            for op in group.ops {
                validate(op)?;
                if by_id.insert(op.id, op).is_some() {
                    return Err(RegistryError::DuplicateId(op.id.to_string()));
                }
                if !paths.insert(op.path) {
                    return Err(RegistryError::DuplicatePath(op.path.to_string()));
                }
                if op.kind == OperationKind::StatusPanel {
                    status_panels += 1;
                }
            }
        }
        if status_panels != 1 {
            return Err(RegistryError::StatusPanelCount(status_panels));
        }
        Ok(Registry { by_id })
    }

    pub fn get(&self, id: &str) -> Option<&'static OperationDescriptor> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Catalog groups in declaration order.
    pub fn groups() -> &'static [OperationGroup] {
        GROUPS
    }

    /// Whether a group is listed under the OSINT umbrella.
    pub fn is_osint(group: &str) -> bool {
        OSINT_GROUPS.contains(&group)
    }
}

fn validate(op: &OperationDescriptor) -> Result<(), RegistryError> {
    let mismatch = |expected: &'static str| RegistryError::KindMethodMismatch {
        id: op.id.to_string(),
        kind: op.kind,
        expected,
    };
    match op.kind {
        OperationKind::HostScan | OperationKind::RangeScan => {
            if op.method != Method::Post {
                return Err(mismatch("POST"));
            }
        }
        OperationKind::PortCatalog | OperationKind::StatusPanel => {
            if op.method != Method::Get {
                return Err(mismatch("GET"));
            }
        }
        OperationKind::Generic => {}
    }
    if op.kind == OperationKind::StatusPanel && !op.params.is_empty() {
        return Err(RegistryError::StatusPanelWithFields {
            id: op.id.to_string(),
        });
    }
    let scan_form = matches!(
        op.kind,
        OperationKind::HostScan | OperationKind::RangeScan
    );
    if op.nmap_toggle != scan_form {
        return Err(RegistryError::NmapToggleMismatch {
            id: op.id.to_string(),
        });
    }
    let mut names = HashSet::new();
    for param in op.params {
        if !names.insert(param.name) {
            return Err(RegistryError::DuplicateField {
                id: op.id.to_string(),
                field: param.name.to_string(),
            });
        }
    }
    Ok(())
}
