//! Path routing for the dashboard views.
//!
//! Resolution is exact-match against a fixed table. The `/v1` prefix is a
//! cosmetic alias: `/v1/tasks/42` and `/tasks/42` resolve identically.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use thiserror::Error;
use tracing::debug;

pub const ROOT_PATH: &str = "/";
pub const TASK_LIST_PATH: &str = "/tasks";
pub const NODE_LIST_PATH: &str = "/nodes";
pub const SERVICE_INFO_PATH: &str = "/service-info";
pub const VERSION_PREFIX: &str = "/v1";

// Same set `url` applies to a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Decodes a captured path parameter back to the identifier it names.
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn decode_path_parameter(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Encodes `raw` so it occupies exactly one path segment.
pub fn encode_path_segment(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SEGMENT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Destination view selected by the current path.
pub enum ViewIntent {
    TaskList,
    TaskDetail(String),
    NodeList,
    NodeDetail(String),
    ServiceInfo,
    NotFound,
}

impl ViewIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskList => "task-list",
            Self::TaskDetail(_) => "task-detail",
            Self::NodeList => "node-list",
            Self::NodeDetail(_) => "node-detail",
            Self::ServiceInfo => "service-info",
            Self::NotFound => "not-found",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::TaskList => "Tasks",
            Self::TaskDetail(_) => "Task",
            Self::NodeList => "Nodes",
            Self::NodeDetail(_) => "Node",
            Self::ServiceInfo => "Service Info",
            Self::NotFound => "Not Found",
        }
    }

    /// Unprefixed path that resolves back to this intent. `NotFound` has none.
    pub fn canonical_path(&self) -> Option<String> {
        match self {
            Self::TaskList => Some(TASK_LIST_PATH.to_string()),
            Self::TaskDetail(task_id) => Some(format!("{TASK_LIST_PATH}/{task_id}")),
            Self::NodeList => Some(NODE_LIST_PATH.to_string()),
            Self::NodeDetail(node_id) => Some(format!("{NODE_LIST_PATH}/{node_id}")),
            Self::ServiceInfo => Some(SERVICE_INFO_PATH.to_string()),
            Self::NotFound => None,
        }
    }

    /// The captured parameter exactly as it appeared in the path.
    pub fn path_parameter(&self) -> Option<&str> {
        match self {
            Self::TaskDetail(id) | Self::NodeDetail(id) => Some(id.as_str()),
            _ => None,
        }
    }

    /// The captured parameter with percent-escapes decoded.
    pub fn decoded_path_parameter(&self) -> Option<String> {
        self.path_parameter().map(decode_path_parameter)
    }

    pub fn shows_filter_panel(&self) -> bool {
        matches!(self, Self::TaskList)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteResolution {
    pub intent: ViewIntent,
    pub show_filter_panel: bool,
    /// Set when the requested path is an alias that should be redirected.
    pub redirect_to: Option<&'static str>,
}

impl RouteResolution {
    fn matched(intent: ViewIntent) -> Self {
        Self {
            show_filter_panel: intent.shows_filter_panel(),
            intent,
            redirect_to: None,
        }
    }

    fn not_found() -> Self {
        Self::matched(ViewIntent::NotFound)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("no dashboard route matches '{path}'")]
    RouteNotFound { path: String },
    #[error("route '{template}' requires a non-empty parameter, got '{path}'")]
    MalformedPathParameter {
        template: &'static str,
        path: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Literal(&'static str),
    Param,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteKind {
    Root,
    TaskList,
    TaskDetail,
    NodeList,
    NodeDetail,
    ServiceInfo,
}

struct RouteTemplate {
    template: &'static str,
    segments: &'static [Segment],
    kind: RouteKind,
}

// Literal templates precede parameter templates sharing their prefix.
const ROUTE_TABLE: &[RouteTemplate] = &[
    RouteTemplate {
        template: "/",
        segments: &[],
        kind: RouteKind::Root,
    },
    RouteTemplate {
        template: "/tasks",
        segments: &[Segment::Literal("tasks")],
        kind: RouteKind::TaskList,
    },
    RouteTemplate {
        template: "/tasks/service-info",
        segments: &[Segment::Literal("tasks"), Segment::Literal("service-info")],
        kind: RouteKind::ServiceInfo,
    },
    RouteTemplate {
        template: "/tasks/:id",
        segments: &[Segment::Literal("tasks"), Segment::Param],
        kind: RouteKind::TaskDetail,
    },
    RouteTemplate {
        template: "/nodes",
        segments: &[Segment::Literal("nodes")],
        kind: RouteKind::NodeList,
    },
    RouteTemplate {
        template: "/nodes/:id",
        segments: &[Segment::Literal("nodes"), Segment::Param],
        kind: RouteKind::NodeDetail,
    },
    RouteTemplate {
        template: "/service-info",
        segments: &[Segment::Literal("service-info")],
        kind: RouteKind::ServiceInfo,
    },
];

/// Resolves `path`, falling back to the not-found view on any routing error.
pub fn resolve_route(path: &str) -> RouteResolution {
    match try_resolve_route(path) {
        Ok(resolution) => resolution,
        Err(error) => {
            debug!(%error, "dashboard route fell back to not-found");
            RouteResolution::not_found()
        }
    }
}

pub fn try_resolve_route(path: &str) -> Result<RouteResolution, RouteError> {
    let normalized = normalize_path(path).ok_or_else(|| RouteError::RouteNotFound {
        path: path.to_string(),
    })?;
    let segments = if normalized == ROOT_PATH {
        Vec::new()
    } else {
        normalized[1..].split('/').collect::<Vec<_>>()
    };

    for route in ROUTE_TABLE {
        match match_template(route, &segments) {
            TemplateMatch::Miss => continue,
            TemplateMatch::EmptyParam => {
                return Err(RouteError::MalformedPathParameter {
                    template: route.template,
                    path: path.to_string(),
                });
            }
            TemplateMatch::Hit(param) => {
                return Ok(build_resolution(route.kind, param));
            }
        }
    }

    Err(RouteError::RouteNotFound {
        path: path.to_string(),
    })
}

enum TemplateMatch<'a> {
    Miss,
    EmptyParam,
    Hit(Option<&'a str>),
}

fn match_template<'a>(route: &RouteTemplate, segments: &[&'a str]) -> TemplateMatch<'a> {
    if route.segments.len() != segments.len() {
        return TemplateMatch::Miss;
    }
    let mut param = None;
    for (expected, actual) in route.segments.iter().zip(segments) {
        match expected {
            Segment::Literal(literal) if literal == actual => {}
            Segment::Literal(_) => return TemplateMatch::Miss,
            Segment::Param => param = Some(*actual),
        }
    }
    match param {
        Some("") => TemplateMatch::EmptyParam,
        other => TemplateMatch::Hit(other),
    }
}

fn build_resolution(kind: RouteKind, param: Option<&str>) -> RouteResolution {
    let param = param.unwrap_or_default().to_string();
    match kind {
        RouteKind::Root => RouteResolution {
            redirect_to: Some(TASK_LIST_PATH),
            ..RouteResolution::matched(ViewIntent::TaskList)
        },
        RouteKind::TaskList => RouteResolution::matched(ViewIntent::TaskList),
        RouteKind::TaskDetail => RouteResolution::matched(ViewIntent::TaskDetail(param)),
        RouteKind::NodeList => RouteResolution::matched(ViewIntent::NodeList),
        RouteKind::NodeDetail => RouteResolution::matched(ViewIntent::NodeDetail(param)),
        RouteKind::ServiceInfo => RouteResolution::matched(ViewIntent::ServiceInfo),
    }
}

/// Drops query/fragment, one trailing slash and the version prefix.
/// Returns `None` for paths that are not absolute.
fn normalize_path(path: &str) -> Option<&str> {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    if path.is_empty() {
        return Some(ROOT_PATH);
    }
    if !path.starts_with('/') {
        return None;
    }
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };
    match path.strip_prefix(VERSION_PREFIX) {
        Some("") | Some("/") => Some(ROOT_PATH),
        Some(rest) if rest.starts_with('/') => Some(rest),
        _ => Some(path),
    }
}
