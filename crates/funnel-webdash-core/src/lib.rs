//! Filter-state and view-routing engine for the Funnel web dashboard.
//!
//! [`FilterModel`] keeps the task-list filter criteria consistent across edits,
//! [`resolve_route`] maps a URL path to a [`ViewIntent`], and
//! [`DashboardSession`] binds both into the props each view renders from.

pub mod filter_model;
pub mod router;
pub mod task_query;
pub mod task_state;
pub mod view_composer;

pub use filter_model::{
    FilterEdit, FilterEditError, FilterModel, FilterState, TagAssignmentError, TagField, TagFilter,
};
pub use router::{
    decode_path_parameter, encode_path_segment, resolve_route, try_resolve_route, RouteError,
    RouteResolution, ViewIntent, NODE_LIST_PATH, ROOT_PATH, SERVICE_INFO_PATH, TASK_LIST_PATH,
    VERSION_PREFIX,
};
pub use task_query::{backend_endpoint_url, TaskListQuery, DEFAULT_PAGE_SIZE, TASK_LIST_VIEW};
pub use task_state::TaskState;
pub use view_composer::{
    ComposedView, DashboardSession, DrawerState, EditOutcome, FilterPanelProps, TagRowProps,
    ViewProps,
};
