//! Key/value table for a single compute node.
//!
//! The host only emits the node fetch marker; this renderer is exported for
//! the node view that fetches the record from the task server.

use funnel_webdash_core::{encode_path_segment, TASK_LIST_PATH};
use leptos::prelude::*;
use serde::Deserialize;

use crate::format::{format_resources, format_timestamp, Resources};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// Node record as returned by the task server's node endpoint.
pub struct NodeRecord {
    pub id: String,
    pub hostname: String,
    pub state: String,
    pub resources: Option<Resources>,
    pub available: Option<Resources>,
    pub last_ping: String,
    pub version: String,
    #[serde(alias = "task_ids")]
    pub task_ids: Vec<String>,
}

fn node_info_rows(node: &NodeRecord) -> Vec<(&'static str, String)> {
    let rows = [
        ("ID", node.id.clone()),
        ("Hostname", node.hostname.clone()),
        ("State", node.state.clone()),
        (
            "Resources",
            node.resources.as_ref().map(format_resources).unwrap_or_default(),
        ),
        (
            "Available",
            node.available.as_ref().map(format_resources).unwrap_or_default(),
        ),
        ("Last Ping", format_timestamp(&node.last_ping)),
        ("Version", node.version.clone()),
    ];
    rows.into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
}

/// Public `fn` `render_node_info_table` in `funnel-webdash-ui`.
pub fn render_node_info_table(node: &NodeRecord) -> String {
    let rows = node_info_rows(node);
    let row_count_value = (rows.len() + usize::from(!node.task_ids.is_empty())).to_string();
    let task_ids = node.task_ids.clone();
    let tasks_row = (!task_ids.is_empty()).then(|| {
        view! {
            <tr data-node-info-key="Tasks">
                <th scope="row">Tasks</th>
                <td>
                    {task_ids
                        .into_iter()
                        .map(|task_id| {
                            let href = format!("{TASK_LIST_PATH}/{}", encode_path_segment(&task_id));
                            view! {
                                <a data-task-link=task_id.clone() href=href>{task_id.clone()}</a>
                            }
                        })
                        .collect_view()}
                </td>
            </tr>
        }
    });

    let table = view! {
        <table
            id="funnel-webdash-node-info"
            data-component="NodeInfo"
            data-node-info-row-count=row_count_value
        >
            <tbody>
                {rows
                    .into_iter()
                    .map(|(key, value)| {
                        view! {
                            <tr data-node-info-key=key>
                                <th scope="row">{key}</th>
                                <td>{value}</td>
                            </tr>
                        }
                    })
                    .collect_view()}
                {tasks_row}
            </tbody>
        </table>
    };
    table.to_html()
}

#[cfg(test)]
mod tests {
    use super::{render_node_info_table, NodeRecord};
    use crate::format::Resources;

    fn sample_node() -> NodeRecord {
        NodeRecord {
            id: "node-1".to_string(),
            hostname: "worker-a".to_string(),
            state: "ALIVE".to_string(),
            resources: Some(Resources {
                cpu_cores: 8,
                ram_gb: 32.0,
                ..Resources::default()
            }),
            available: None,
            last_ping: "2018-06-01T00:00:00Z".to_string(),
            version: String::new(),
            task_ids: vec!["t-1".to_string(), "t-2".to_string()],
        }
    }

    #[test]
    fn functional_node_info_table_renders_present_rows_and_task_links() {
        let html = render_node_info_table(&sample_node());
        assert!(html.contains("id=\"funnel-webdash-node-info\""));
        assert!(html.contains("data-node-info-row-count=\"6\""));
        assert!(html.contains("data-node-info-key=\"Hostname\""));
        assert!(html.contains("data-node-info-key=\"Resources\""));
        assert!(html.contains("data-node-info-key=\"Last Ping\""));
        assert!(html.contains("data-task-link=\"t-2\" href=\"/tasks/t-2\""));
    }

    #[test]
    fn regression_task_links_encode_ids_as_single_segment() {
        let node = NodeRecord {
            task_ids: vec!["run 1/a?b".to_string()],
            ..NodeRecord::default()
        };
        let html = render_node_info_table(&node);
        assert!(html.contains("href=\"/tasks/run%201%2Fa%3Fb\""));
        assert!(html.contains("data-task-link=\"run 1/a?b\""));
    }

    #[test]
    fn regression_node_info_table_skips_empty_values() {
        let html = render_node_info_table(&sample_node());
        assert!(!html.contains("data-node-info-key=\"Available\""));
        assert!(!html.contains("data-node-info-key=\"Version\""));
    }

    #[test]
    fn unit_node_record_parses_backend_payload() {
        let node: NodeRecord = serde_json::from_str(
            r#"{"id": "n", "hostname": "h", "task_ids": ["a"], "resources": {"cpuCores": 2}}"#,
        )
        .expect("parse node payload");
        assert_eq!(node.task_ids, vec!["a".to_string()]);
        assert_eq!(node.resources.map(|r| r.cpu_cores), Some(2));
    }
}
