//! Projection of the filter criteria into the backend task-list query.

use serde::Serialize;
use url::{form_urlencoded, Url};

use crate::filter_model::{FilterState, TagFilter};

pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const TASK_LIST_VIEW: &str = "BASIC";
const TASK_LIST_ENDPOINT: [&str; 2] = ["v1", "tasks"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// State equality plus zero or more tag equality predicates, ANDed by the backend.
pub struct TaskListQuery {
    pub view: &'static str,
    pub page_size: u32,
    pub state: Option<String>,
    pub tags: Vec<TagFilter>,
}

impl TaskListQuery {
    pub fn from_filters(filters: &FilterState, page_size: u32) -> Self {
        let state = filters
            .has_state_filter()
            .then(|| filters.state_filter().to_string());
        Self {
            view: TASK_LIST_VIEW,
            page_size,
            state,
            tags: filters.active_tags().cloned().collect(),
        }
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("view".to_string(), self.view.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ];
        if let Some(state) = &self.state {
            pairs.push(("state".to_string(), state.clone()));
        }
        pairs.extend(
            self.tags
                .iter()
                .map(|tag| (format!("tags[{}]", tag.key), tag.value.clone())),
        );
        pairs
    }

    pub fn query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }

    pub fn task_list_url(&self, server: &Url) -> Result<Url, url::ParseError> {
        let mut target = backend_endpoint_url(server, &TASK_LIST_ENDPOINT)?;
        target.set_query(Some(&self.query_string()));
        Ok(target)
    }
}

/// Appends `segments` to the task server URL. Any path already on `server`
/// is kept as a mount prefix; each segment is percent-encoded on its own.
pub fn backend_endpoint_url(server: &Url, segments: &[&str]) -> Result<Url, url::ParseError> {
    let mut target = server.clone();
    target.set_query(None);
    target.set_fragment(None);
    {
        let mut path = target
            .path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(target)
}
