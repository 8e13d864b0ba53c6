//! Leptos SSR shell for the Funnel web dashboard.
//!
//! Renders a [`ComposedView`] into the app bar, navigation drawer, filter
//! panel and the main region of the view the router selected. Every control
//! is a plain form post back to the dashboard host, so the markup carries the
//! whole edit surface without client-side script.

use funnel_webdash_core::{
    backend_endpoint_url, decode_path_parameter, ComposedView, FilterPanelProps, TagField,
    ViewIntent, ViewProps, NODE_LIST_PATH, SERVICE_INFO_PATH, TASK_LIST_PATH,
};
use leptos::prelude::*;
use url::Url;

pub mod format;
pub mod node_info;

pub use format::{format_resources, format_timestamp, Resources};
pub use node_info::{render_node_info_table, NodeRecord};

pub const FILTER_STATE_ENDPOINT: &str = "/dashboard/filters/state";
pub const FILTER_TAGS_ENDPOINT: &str = "/dashboard/filters/tags";
pub const DRAWER_OPEN_ENDPOINT: &str = "/dashboard/drawer/open";
pub const DRAWER_CLOSE_ENDPOINT: &str = "/dashboard/drawer/close";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavItem {
    Tasks,
    Nodes,
    ServiceInfo,
}

impl NavItem {
    const ALL: [NavItem; 3] = [Self::Tasks, Self::Nodes, Self::ServiceInfo];

    fn token(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Nodes => "nodes",
            Self::ServiceInfo => "service-info",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Tasks => "Tasks",
            Self::Nodes => "Nodes",
            Self::ServiceInfo => "Service Info",
        }
    }

    fn href(self) -> &'static str {
        match self {
            Self::Tasks => TASK_LIST_PATH,
            Self::Nodes => NODE_LIST_PATH,
            Self::ServiceInfo => SERVICE_INFO_PATH,
        }
    }

    fn is_active(self, intent: &ViewIntent) -> bool {
        matches!(
            (self, intent),
            (Self::Tasks, ViewIntent::TaskList | ViewIntent::TaskDetail(_))
                | (Self::Nodes, ViewIntent::NodeList | ViewIntent::NodeDetail(_))
                | (Self::ServiceInfo, ViewIntent::ServiceInfo)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `FunnelWebdashShellContext` in `funnel-webdash-ui`.
pub struct FunnelWebdashShellContext {
    pub composed: ComposedView,
    /// Task server the views query; rendered into `data-*-href` markers.
    pub tes_server: Url,
}

fn bool_attr(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Detail ids arrive still percent-encoded from the request path; they are
/// decoded here so the backend URL encodes each one exactly once.
fn backend_detail_href(server: &Url, collection: &str, raw_id: &str) -> String {
    let id = decode_path_parameter(raw_id);
    backend_href(server, &["v1", collection, id.as_str()])
}

fn backend_href(server: &Url, segments: &[&str]) -> String {
    backend_endpoint_url(server, segments)
        .map(|url| url.to_string())
        .unwrap_or_default()
}

/// Public `fn` `render_funnel_webdash_shell` in `funnel-webdash-ui`.
pub fn render_funnel_webdash_shell(context: &FunnelWebdashShellContext) -> String {
    let composed = &context.composed;
    let intent = &composed.resolution.intent;
    let drawer_open = composed.drawer.is_open();
    let drawer_state_attr = composed.drawer.as_str();
    let return_to = intent
        .canonical_path()
        .unwrap_or_else(|| composed.path.clone());
    let revision_value = composed.revision.to_string();
    let path_parameter = intent.path_parameter().map(str::to_string);
    let menu_hidden = bool_attr(drawer_open);
    let drawer_hidden = bool_attr(!drawer_open);

    let nav_items = NavItem::ALL
        .into_iter()
        .map(|item| {
            let item_id = format!("funnel-webdash-nav-{}", item.token());
            view! {
                <li id=item_id>
                    <a
                        data-nav-item=item.token()
                        data-nav-active=bool_attr(item.is_active(intent))
                        href=item.href()
                    >
                        {item.label()}
                    </a>
                </li>
            }
        })
        .collect_view();

    let filter_panel = render_filter_panel(&composed.filter_panel, &return_to);
    let main_region = render_view_region(&composed.view, &context.tes_server);

    let shell = view! {
        <div
            id="funnel-webdash-shell"
            data-app="funnel-webdash"
            data-active-view=intent.as_str()
            data-drawer-state=drawer_state_attr
            data-filter-revision=revision_value
            data-path-parameter=path_parameter
            data-tes-server=context.tes_server.to_string()
        >
            <header id="funnel-webdash-appbar">
                <form
                    id="funnel-webdash-drawer-open"
                    method="post"
                    action=DRAWER_OPEN_ENDPOINT
                    aria-hidden=menu_hidden
                >
                    <input type="hidden" name="return_to" value=return_to.clone() />
                    <button type="submit" aria-label="Open drawer">Menu</button>
                </form>
                <h1>Funnel</h1>
                <p id="funnel-webdash-view-title">{intent.title()}</p>
            </header>
            <aside
                id="funnel-webdash-drawer"
                data-drawer-state=drawer_state_attr
                aria-hidden=drawer_hidden
            >
                <form id="funnel-webdash-drawer-close" method="post" action=DRAWER_CLOSE_ENDPOINT>
                    <input type="hidden" name="return_to" value=return_to.clone() />
                    <button type="submit" aria-label="Close drawer">Close</button>
                </form>
                <nav aria-label="Funnel navigation">
                    <ul id="funnel-webdash-nav">{nav_items}</ul>
                </nav>
                {filter_panel}
            </aside>
            <main id="funnel-webdash-content">{main_region}</main>
        </div>
    };
    shell.to_html()
}

fn render_filter_panel(panel: &FilterPanelProps, return_to: &str) -> impl IntoView {
    let visible_value = bool_attr(panel.visible);
    let hidden_value = bool_attr(!panel.visible);
    let tag_row_count_value = panel.tag_rows.len().to_string();
    let any_state_selected = panel.state_filter.is_empty();
    let state_options = panel
        .state_choices
        .iter()
        .map(|state| {
            let selected = panel.state_filter == state.as_str();
            view! {
                <option value=state.as_str() selected=selected>{state.label()}</option>
            }
        })
        .collect_view();
    let tag_rows = panel
        .tag_rows
        .iter()
        .map(|row| {
            let row_id = format!("funnel-webdash-tag-row-{}", row.index);
            let edit_action = format!("{FILTER_TAGS_ENDPOINT}/{}", row.index);
            let remove_action = format!("{FILTER_TAGS_ENDPOINT}/{}/remove", row.index);
            let key_field = TagField::Key.as_str();
            let value_field = TagField::Value.as_str();
            view! {
                <li
                    id=row_id
                    data-tag-index=row.index.to_string()
                    data-tag-key=row.key.clone()
                    data-tag-value=row.value.clone()
                >
                    <form method="post" action=edit_action.clone() data-tag-field=key_field>
                        <input type="hidden" name="field" value=key_field />
                        <input type="hidden" name="return_to" value=return_to.to_string() />
                        <input type="text" name="value" placeholder="Key" value=row.key.clone() />
                    </form>
                    <form method="post" action=edit_action data-tag-field=value_field>
                        <input type="hidden" name="field" value=value_field />
                        <input type="hidden" name="return_to" value=return_to.to_string() />
                        <input type="text" name="value" placeholder="Value" value=row.value.clone() />
                    </form>
                    <form method="post" action=remove_action data-action="remove-tag">
                        <input type="hidden" name="return_to" value=return_to.to_string() />
                        <button type="submit" aria-label="Remove tag filter">Remove</button>
                    </form>
                </li>
            }
        })
        .collect_view();

    view! {
        <section
            id="funnel-webdash-filter-panel"
            data-component="TaskFilters"
            data-panel-visible=visible_value
            aria-hidden=hidden_value
        >
            <h2>Filters</h2>
            <form
                id="funnel-webdash-state-filter"
                method="post"
                action=FILTER_STATE_ENDPOINT
                data-state-filter=panel.state_filter.clone()
            >
                <input type="hidden" name="return_to" value=return_to.to_string() />
                <label for="funnel-webdash-state-select">State</label>
                <select id="funnel-webdash-state-select" name="value">
                    <option value="" selected=any_state_selected>Any state</option>
                    {state_options}
                </select>
                <button type="submit">Apply</button>
            </form>
            <ul id="funnel-webdash-tag-filters" data-tag-row-count=tag_row_count_value>
                {tag_rows}
            </ul>
            <form id="funnel-webdash-add-tag" method="post" action=FILTER_TAGS_ENDPOINT>
                <input type="hidden" name="return_to" value=return_to.to_string() />
                <button type="submit" data-action="add-tag">Add tag filter</button>
            </form>
        </section>
    }
}

fn render_view_region(view_props: &ViewProps, server: &Url) -> AnyView {
    match view_props {
        ViewProps::TaskList { filters, query } => {
            let query_href = query
                .task_list_url(server)
                .map(|url| url.to_string())
                .unwrap_or_default();
            let active_tags = query.tags.clone();
            let active_tag_count_value = active_tags.len().to_string();
            let page_size_value = query.page_size.to_string();
            view! {
                <section
                    id="funnel-webdash-task-list"
                    data-component="TaskList"
                    data-state-filter=filters.state_filter().to_string()
                    data-active-tag-count=active_tag_count_value
                    data-page-size=page_size_value
                    data-query-href=query_href
                >
                    <h2>Tasks</h2>
                    <ul id="funnel-webdash-active-tags">
                        {active_tags
                            .into_iter()
                            .map(|tag| {
                                view! { <li data-tag-key=tag.key data-tag-value=tag.value></li> }
                            })
                            .collect_view()}
                    </ul>
                </section>
            }
            .into_any()
        }
        ViewProps::TaskDetail { task_id } => {
            let fetch_href = backend_detail_href(server, "tasks", task_id);
            view! {
                <section
                    id="funnel-webdash-task-detail"
                    data-component="Task"
                    data-task-id=task_id.clone()
                    data-fetch-href=fetch_href
                >
                    <h2>Task</h2>
                </section>
            }
            .into_any()
        }
        ViewProps::NodeList => {
            let fetch_href = backend_href(server, &["v1", "nodes"]);
            view! {
                <section id="funnel-webdash-node-list" data-component="NodeList" data-fetch-href=fetch_href>
                    <h2>Nodes</h2>
                </section>
            }
            .into_any()
        }
        ViewProps::NodeDetail { node_id } => {
            let fetch_href = backend_detail_href(server, "nodes", node_id);
            view! {
                <section
                    id="funnel-webdash-node-detail"
                    data-component="Node"
                    data-node-id=node_id.clone()
                    data-fetch-href=fetch_href
                >
                    <h2>Node</h2>
                </section>
            }
            .into_any()
        }
        ViewProps::ServiceInfo => {
            let fetch_href = backend_href(server, &["v1", "tasks", "service-info"]);
            view! {
                <section id="funnel-webdash-service-info" data-component="ServiceInfo" data-fetch-href=fetch_href>
                    <h2>Service Info</h2>
                </section>
            }
            .into_any()
        }
        ViewProps::NotFound { path } => view! {
            <section id="funnel-webdash-not-found" data-component="NoMatch" data-requested-path=path.clone()>
                <h2>Not Found</h2>
                <a href=TASK_LIST_PATH>Back to tasks</a>
            </section>
        }
        .into_any(),
    }
}
