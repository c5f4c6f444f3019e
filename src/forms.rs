//! Registry-driven HTML for the catalog sidebar and operation forms.

use crate::registry::{OperationDescriptor, OperationGroup, Registry};
use crate::render::escape_html;

/// Hidden form field carrying the selection generation stamp.
pub const GENERATION_FIELD: &str = "_generation";

fn group_block(group: &OperationGroup) -> String {
    let mut out = format!(
        "<div class=\"controller-block\"><h3>{}</h3>",
        escape_html(group.name),
    );
    for op in group.ops {
        out.push_str(&format!(
            "<button class=\"op-button\" type=\"button\" data-op=\"{}\">{}</button>",
            escape_html(op.id),
            escape_html(op.title),
        ));
    }
    out.push_str("</div>");
    out
}

/// Sidebar catalog: the OSINT umbrella groups first, then the rest.
/// The umbrella is presentation only; dispatch never looks at it.
pub fn catalog() -> String {
    let mut out = String::from(
        "<div class=\"controller-category\">\
           <button class=\"controller-category-header\" type=\"button\">\
             <span>OSINT</span><span class=\"toggle-icon\">&#9662;</span>\
           </button>\
           <div class=\"controller-category-inner\">",
    );
    for group in Registry::groups() {
        if Registry::is_osint(group.name) {
            out.push_str(&group_block(group));
        }
    }
    out.push_str("</div></div>");
    for group in Registry::groups() {
        if !Registry::is_osint(group.name) {
            out.push_str(&group_block(group));
        }
    }
    out
}

/// Form fragment for one operation, stamped with the current selection
/// generation. Same descriptor and generation in, same markup out.
pub fn operation_form(op: &OperationDescriptor, generation: u64) -> String {
    let mut out = format!(
        "<h2 id=\"op-title\">{title}</h2>\
         <div class=\"op-desc\">{desc}</div>\
         <div class=\"op-meta\">{method} {path}</div>",
        title = escape_html(op.title),
        desc = escape_html(op.desc),
        method = op.method.as_str(),
        path = escape_html(op.path),
    );
    out.push_str(&format!(
        "<form id=\"op-form\" data-op=\"{}\">\
         <input type=\"hidden\" name=\"{GENERATION_FIELD}\" value=\"{generation}\">",
        escape_html(op.id),
    ));
    for param in op.params {
        out.push_str(&format!(
            "<label class=\"field-label\"><input name=\"{}\" placeholder=\"{}\"></label>",
            escape_html(param.name),
            escape_html(param.placeholder),
        ));
    }
    if op.nmap_toggle {
        out.push_str(
            "<label class=\"nmap-label\">\
             <input type=\"checkbox\" name=\"use_nmap\" checked> Use nmap when available\
             </label>",
        );
    }
    out.push_str("<button type=\"submit\" class=\"op-submit\">Send</button></form>");
    out
}

/// Pull the hidden generation stamp out of submitted form pairs.
pub fn split_generation(fields: Vec<(String, String)>) -> (Option<u64>, Vec<(String, String)>) {
    let mut generation = None;
    let mut rest = Vec::with_capacity(fields.len());
    for (name, value) in fields {
        if name == GENERATION_FIELD {
            generation = value.parse().ok();
        } else {
            rest.push((name, value));
        }
    }
    (generation, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_every_operation_once() {
        let html = catalog();
        let reg = Registry::new().unwrap();
        for group in Registry::groups() {
            for op in group.ops {
                let marker = format!("data-op=\"{}\"", op.id);
                assert_eq!(html.matches(&marker).count(), 1, "{}", op.id);
            }
        }
        assert_eq!(html.matches("OSINT").count(), 1);
        assert_eq!(reg.len(), 13);
    }

    #[test]
    fn osint_umbrella_wraps_pipeline_groups_only() {
        let html = catalog();
        let inner_end = html.find("</div></div>").unwrap();
        let umbrella = &html[..inner_end];
        assert!(umbrella.contains("<h3>Scrapy</h3>"));
        assert!(umbrella.contains("<h3>LLM</h3>"));
        assert!(!umbrella.contains("<h3>Network</h3>"));
        assert!(!umbrella.contains("<h3>Status</h3>"));
    }

    #[test]
    fn form_synthesis_is_idempotent() {
        let reg = Registry::new().unwrap();
        let op = reg.get("network-scan-range").unwrap();
        assert_eq!(operation_form(op, 5), operation_form(op, 5));
    }

    #[test]
    fn form_renders_params_in_declared_order() {
        let reg = Registry::new().unwrap();
        let op = reg.get("network-scan-range").unwrap();
        let html = operation_form(op, 1);
        let positions: Vec<usize> = ["cidr", "start", "end", "ports", "concurrency"]
            .iter()
            .map(|name| html.find(&format!("name=\"{name}\"")).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn nmap_checkbox_appears_only_on_scan_forms() {
        let reg = Registry::new().unwrap();
        let scan = operation_form(reg.get("network-scan").unwrap(), 1);
        assert!(scan.contains("name=\"use_nmap\" checked"));
        let feeds = operation_form(reg.get("feeds").unwrap(), 1);
        assert!(!feeds.contains("use_nmap"));
    }

    #[test]
    fn form_carries_generation_stamp() {
        let reg = Registry::new().unwrap();
        let html = operation_form(reg.get("feeds").unwrap(), 42);
        assert!(html.contains("name=\"_generation\" value=\"42\""));
    }

    #[test]
    fn split_generation_extracts_the_stamp() {
        let fields = vec![
            ("_generation".to_string(), "9".to_string()),
            ("host".to_string(), "10.0.0.1".to_string()),
        ];
        let (generation, rest) = split_generation(fields);
        assert_eq!(generation, Some(9));
        assert_eq!(rest, vec![("host".to_string(), "10.0.0.1".to_string())]);

        let (missing, rest) = split_generation(vec![("host".to_string(), "x".to_string())]);
        assert_eq!(missing, None);
        assert_eq!(rest.len(), 1);
    }
}
