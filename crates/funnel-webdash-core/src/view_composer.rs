//! Dashboard session: owns the filter and drawer state and composes the props
//! for whichever view the current path selects.
//!
//! Filter edits and re-querying are separate steps. An edit that changes the
//! snapshot bumps the session revision and notifies every registered
//! listener; the active view decides whether to re-query.

use std::fmt;

use tracing::{debug, trace};

use crate::filter_model::{FilterEdit, FilterEditError, FilterModel, FilterState};
use crate::router::{resolve_route, RouteResolution, ViewIntent};
use crate::task_query::{TaskListQuery, DEFAULT_PAGE_SIZE};
use crate::task_state::TaskState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawerState {
    open: bool,
}

impl Default for DrawerState {
    fn default() -> Self {
        Self { open: true }
    }
}

impl DrawerState {
    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn as_str(self) -> &'static str {
        if self.open {
            "open"
        } else {
            "closed"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRowProps {
    pub index: usize,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPanelProps {
    pub visible: bool,
    pub state_filter: String,
    pub state_choices: Vec<TaskState>,
    pub tag_rows: Vec<TagRowProps>,
}

impl FilterPanelProps {
    fn from_snapshot(visible: bool, filters: &FilterState) -> Self {
        Self {
            visible,
            state_filter: filters.state_filter().to_string(),
            state_choices: TaskState::ALL.to_vec(),
            tag_rows: filters
                .tag_filters()
                .iter()
                .enumerate()
                .map(|(index, tag)| TagRowProps {
                    index,
                    key: tag.key.clone(),
                    value: tag.value.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Props handed to the concrete view selected by the router.
pub enum ViewProps {
    TaskList {
        filters: FilterState,
        query: TaskListQuery,
    },
    TaskDetail {
        task_id: String,
    },
    NodeList,
    NodeDetail {
        node_id: String,
    },
    ServiceInfo,
    NotFound {
        path: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedView {
    pub path: String,
    pub resolution: RouteResolution,
    pub revision: u64,
    pub drawer: DrawerState,
    pub filter_panel: FilterPanelProps,
    pub view: ViewProps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Changed { revision: u64 },
    Unchanged,
    Ignored(FilterEditError),
}

impl EditOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Changed { .. } => "changed",
            Self::Unchanged => "unchanged",
            Self::Ignored(_) => "ignored",
        }
    }
}

type FilterListener = Box<dyn FnMut(u64, &FilterState) + Send>;

/// Single writer of the dashboard's filter and drawer state.
pub struct DashboardSession {
    filters: FilterModel,
    drawer: DrawerState,
    revision: u64,
    page_size: u32,
    listeners: Vec<FilterListener>,
}

impl Default for DashboardSession {
    fn default() -> Self {
        Self::new(FilterState::default())
    }
}

impl fmt::Debug for DashboardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardSession")
            .field("filters", self.filters.snapshot())
            .field("drawer", &self.drawer)
            .field("revision", &self.revision)
            .field("page_size", &self.page_size)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl DashboardSession {
    pub fn new(initial: FilterState) -> Self {
        Self {
            filters: FilterModel::new(initial),
            drawer: DrawerState::default(),
            revision: 0,
            page_size: DEFAULT_PAGE_SIZE,
            listeners: Vec::new(),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn filters(&self) -> &FilterState {
        self.filters.snapshot()
    }

    pub fn drawer(&self) -> DrawerState {
        self.drawer
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Registers a listener called after every edit that changes the filters.
    pub fn on_filter_change(&mut self, listener: impl FnMut(u64, &FilterState) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn apply(&mut self, edit: FilterEdit) -> EditOutcome {
        let action = edit.as_str();
        let before = self.filters.snapshot().clone();
        let next = match self.filters.apply(edit) {
            Ok(next) => next,
            Err(error) => {
                debug!(action, %error, "ignored filter edit");
                return EditOutcome::Ignored(error);
            }
        };
        if next == before {
            trace!(action, "filter edit left snapshot unchanged");
            return EditOutcome::Unchanged;
        }

        self.revision += 1;
        trace!(action, revision = self.revision, "filter snapshot changed");
        for listener in &mut self.listeners {
            listener(self.revision, &next);
        }
        EditOutcome::Changed {
            revision: self.revision,
        }
    }

    pub fn set_state_filter(&mut self, value: impl Into<String>) -> EditOutcome {
        self.apply(FilterEdit::SetStateFilter(value.into()))
    }

    pub fn set_tag_at(
        &mut self,
        index: usize,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> EditOutcome {
        self.apply(FilterEdit::SetTag {
            index,
            field: field.into(),
            value: value.into(),
        })
    }

    pub fn add_tag_filter(&mut self) -> EditOutcome {
        self.apply(FilterEdit::AddTag)
    }

    pub fn remove_tag_filter_at(&mut self, index: usize) -> EditOutcome {
        self.apply(FilterEdit::RemoveTag(index))
    }

    pub fn open_drawer(&mut self) -> DrawerState {
        self.drawer.open = true;
        self.drawer
    }

    pub fn close_drawer(&mut self) -> DrawerState {
        self.drawer.open = false;
        self.drawer
    }

    pub fn toggle_drawer(&mut self) -> DrawerState {
        self.drawer.open = !self.drawer.open;
        self.drawer
    }

    /// Resolves `path` afresh and binds the latest snapshot to the selected view.
    pub fn compose(&self, path: &str) -> ComposedView {
        let resolution = resolve_route(path);
        let filters = self.filters.snapshot();
        let view = match &resolution.intent {
            ViewIntent::TaskList => ViewProps::TaskList {
                filters: filters.clone(),
                query: TaskListQuery::from_filters(filters, self.page_size),
            },
            ViewIntent::TaskDetail(task_id) => ViewProps::TaskDetail {
                task_id: task_id.clone(),
            },
            ViewIntent::NodeList => ViewProps::NodeList,
            ViewIntent::NodeDetail(node_id) => ViewProps::NodeDetail {
                node_id: node_id.clone(),
            },
            ViewIntent::ServiceInfo => ViewProps::ServiceInfo,
            ViewIntent::NotFound => ViewProps::NotFound {
                path: path.to_string(),
            },
        };

        ComposedView {
            path: path.to_string(),
            filter_panel: FilterPanelProps::from_snapshot(resolution.show_filter_panel, filters),
            resolution,
            revision: self.revision,
            drawer: self.drawer,
            view,
        }
    }
}
