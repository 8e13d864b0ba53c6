//! Task-list filter criteria: one state filter plus an ordered set of tag rows.
//!
//! Every edit produces a fresh [`FilterState`] snapshot. The tag sequence is
//! never empty; removing the last row re-seeds a blank placeholder.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
/// One tag-equality predicate forwarded to the task backend.
pub struct TagFilter {
    pub key: String,
    pub value: String,
}

impl TagFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The `{key: "", value: ""}` row the filter panel starts with.
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_blank(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }

    /// Parses the `KEY=VALUE` form accepted by `--tag` flags.
    pub fn parse_assignment(raw: &str) -> Result<Self, TagAssignmentError> {
        let parts = raw.split('=').collect::<Vec<_>>();
        let [key, value] = parts.as_slice() else {
            return Err(TagAssignmentError::Malformed {
                raw: raw.to_string(),
            });
        };
        if key.trim().is_empty() {
            return Err(TagAssignmentError::EmptyKey {
                raw: raw.to_string(),
            });
        }
        Ok(Self::new(*key, *value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Key,
    Value,
}

impl TagField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "key" => Some(Self::Key),
            "value" => Some(Self::Value),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Value => "value",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TagAssignmentError {
    #[error("tags must be of the form KEY=VALUE, got '{raw}'")]
    Malformed { raw: String },
    #[error("tag key must not be empty in '{raw}'")]
    EmptyKey { raw: String },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FilterEditError {
    #[error("tag filter index {index} is out of range for {len} rows")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Immutable snapshot of the task-list filter criteria.
pub struct FilterState {
    state_filter: String,
    tag_filters: Vec<TagFilter>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            state_filter: String::new(),
            tag_filters: vec![TagFilter::blank()],
        }
    }
}

impl FilterState {
    /// Builds an initial snapshot. An empty tag list still yields the blank row.
    pub fn seeded(
        state_filter: impl Into<String>,
        tags: impl IntoIterator<Item = TagFilter>,
    ) -> Self {
        let mut tag_filters = tags.into_iter().collect::<Vec<_>>();
        if tag_filters.is_empty() {
            tag_filters.push(TagFilter::blank());
        }
        Self {
            state_filter: state_filter.into(),
            tag_filters,
        }
    }

    pub fn state_filter(&self) -> &str {
        &self.state_filter
    }

    pub fn tag_filters(&self) -> &[TagFilter] {
        &self.tag_filters
    }

    pub fn has_state_filter(&self) -> bool {
        !self.state_filter.is_empty()
    }

    /// Rows that carry a key. Blank placeholder rows are panel scaffolding only.
    pub fn active_tags(&self) -> impl Iterator<Item = &TagFilter> {
        self.tag_filters.iter().filter(|tag| !tag.key.is_empty())
    }

    pub fn set_state_filter(&self, value: impl Into<String>) -> Self {
        Self {
            state_filter: value.into(),
            tag_filters: self.tag_filters.clone(),
        }
    }

    /// Edits one field of the row at `index`. Unknown field names leave the
    /// snapshot untouched.
    pub fn set_tag_at(
        &self,
        index: usize,
        field: &str,
        value: impl Into<String>,
    ) -> Result<Self, FilterEditError> {
        self.check_index(index)?;
        match TagField::parse(field) {
            Some(field) => self.set_tag_field_at(index, field, value),
            None => Ok(self.clone()),
        }
    }

    pub fn set_tag_field_at(
        &self,
        index: usize,
        field: TagField,
        value: impl Into<String>,
    ) -> Result<Self, FilterEditError> {
        self.check_index(index)?;
        let mut next = self.clone();
        let row = &mut next.tag_filters[index];
        match field {
            TagField::Key => row.key = value.into(),
            TagField::Value => row.value = value.into(),
        }
        Ok(next)
    }

    pub fn add_tag_filter(&self) -> Self {
        let mut next = self.clone();
        next.tag_filters.push(TagFilter::blank());
        next
    }

    pub fn remove_tag_filter_at(&self, index: usize) -> Result<Self, FilterEditError> {
        self.check_index(index)?;
        let mut tag_filters = self
            .tag_filters
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != index)
            .map(|(_, tag)| tag.clone())
            .collect::<Vec<_>>();
        if tag_filters.is_empty() {
            tag_filters.push(TagFilter::blank());
        }
        Ok(Self {
            state_filter: self.state_filter.clone(),
            tag_filters,
        })
    }

    fn check_index(&self, index: usize) -> Result<(), FilterEditError> {
        if index < self.tag_filters.len() {
            Ok(())
        } else {
            Err(FilterEditError::IndexOutOfRange {
                index,
                len: self.tag_filters.len(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Edit commands the filter panel may request.
pub enum FilterEdit {
    SetStateFilter(String),
    SetTag {
        index: usize,
        field: String,
        value: String,
    },
    AddTag,
    RemoveTag(usize),
}

impl FilterEdit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SetStateFilter(_) => "set-state-filter",
            Self::SetTag { .. } => "set-tag",
            Self::AddTag => "add-tag",
            Self::RemoveTag(_) => "remove-tag",
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Owner of the current filter snapshot.
pub struct FilterModel {
    current: FilterState,
}

impl FilterModel {
    pub fn new(initial: FilterState) -> Self {
        Self { current: initial }
    }

    pub fn snapshot(&self) -> &FilterState {
        &self.current
    }

    pub fn set_state_filter(&mut self, value: impl Into<String>) -> FilterState {
        self.replace(self.current.set_state_filter(value))
    }

    pub fn set_tag_at(
        &mut self,
        index: usize,
        field: &str,
        value: impl Into<String>,
    ) -> Result<FilterState, FilterEditError> {
        let next = self.current.set_tag_at(index, field, value)?;
        Ok(self.replace(next))
    }

    pub fn add_tag_filter(&mut self) -> FilterState {
        self.replace(self.current.add_tag_filter())
    }

    pub fn remove_tag_filter_at(&mut self, index: usize) -> Result<FilterState, FilterEditError> {
        let next = self.current.remove_tag_filter_at(index)?;
        Ok(self.replace(next))
    }

    pub fn apply(&mut self, edit: FilterEdit) -> Result<FilterState, FilterEditError> {
        match edit {
            FilterEdit::SetStateFilter(value) => Ok(self.set_state_filter(value)),
            FilterEdit::SetTag {
                index,
                field,
                value,
            } => self.set_tag_at(index, &field, value),
            FilterEdit::AddTag => Ok(self.add_tag_filter()),
            FilterEdit::RemoveTag(index) => self.remove_tag_filter_at(index),
        }
    }

    fn replace(&mut self, next: FilterState) -> FilterState {
        self.current = next;
        self.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{FilterEdit, FilterEditError, FilterModel, FilterState, TagAssignmentError, TagFilter};

    fn two_tags() -> FilterState {
        FilterState::seeded(
            "",
            [TagFilter::new("k1", "v1"), TagFilter::new("k2", "v2")],
        )
    }

    #[test]
    fn unit_default_state_has_single_blank_row_and_no_state_filter() {
        let state = FilterState::default();
        assert_eq!(state.state_filter(), "");
        assert!(!state.has_state_filter());
        assert_eq!(state.tag_filters(), &[TagFilter::blank()]);
    }

    #[test]
    fn unit_seeded_with_no_tags_keeps_placeholder_row() {
        let state = FilterState::seeded("RUNNING", Vec::new());
        assert_eq!(state.state_filter(), "RUNNING");
        assert_eq!(state.tag_filters().len(), 1);
        assert!(state.tag_filters()[0].is_blank());
    }

    #[test]
    fn unit_parse_assignment_accepts_key_value_pairs() {
        assert_eq!(
            TagFilter::parse_assignment("project=funnel"),
            Ok(TagFilter::new("project", "funnel"))
        );
        assert_eq!(
            TagFilter::parse_assignment("empty="),
            Ok(TagFilter::new("empty", ""))
        );
    }

    #[test]
    fn regression_parse_assignment_rejects_missing_or_extra_separators() {
        assert!(matches!(
            TagFilter::parse_assignment("project"),
            Err(TagAssignmentError::Malformed { .. })
        ));
        assert!(matches!(
            TagFilter::parse_assignment("a=b=c"),
            Err(TagAssignmentError::Malformed { .. })
        ));
        assert!(matches!(
            TagFilter::parse_assignment("=value"),
            Err(TagAssignmentError::EmptyKey { .. })
        ));
    }

    #[test]
    fn functional_add_tag_filter_twice_appends_blank_rows() {
        let state = FilterState::default().add_tag_filter().add_tag_filter();
        assert_eq!(state.tag_filters().len(), 3);
        assert!(state.tag_filters().iter().all(TagFilter::is_blank));
    }

    #[test]
    fn functional_remove_first_row_shifts_remaining_rows_down() {
        let state = two_tags()
            .remove_tag_filter_at(0)
            .expect("index 0 is in range");
        assert_eq!(state.tag_filters(), &[TagFilter::new("k2", "v2")]);
    }

    #[test]
    fn functional_removing_last_row_reseeds_blank_placeholder() {
        let state = FilterState::seeded("", [TagFilter::new("k1", "v1")])
            .remove_tag_filter_at(0)
            .expect("index 0 is in range");
        assert_eq!(state.tag_filters(), &[TagFilter::blank()]);
    }

    #[test]
    fn unit_set_tag_at_key_changes_only_that_field() {
        let before = two_tags();
        let after = before.set_tag_at(1, "key", "renamed").expect("in range");
        assert_eq!(after.tag_filters()[0], before.tag_filters()[0]);
        assert_eq!(after.tag_filters()[1].key, "renamed");
        assert_eq!(after.tag_filters()[1].value, "v2");
        assert_eq!(after.state_filter(), before.state_filter());
    }

    #[test]
    fn regression_set_tag_at_unknown_field_is_noop() {
        let before = two_tags();
        let after = before.set_tag_at(0, "colour", "red").expect("in range");
        assert_eq!(after, before);
    }

    #[test]
    fn regression_out_of_range_edits_report_index_and_length() {
        let state = two_tags();
        assert_eq!(
            state.set_tag_at(2, "value", "x"),
            Err(FilterEditError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            state.remove_tag_filter_at(7),
            Err(FilterEditError::IndexOutOfRange { index: 7, len: 2 })
        );
    }

    #[test]
    fn unit_active_tags_skips_rows_without_key() {
        let state = two_tags().add_tag_filter();
        let active = state.active_tags().cloned().collect::<Vec<_>>();
        assert_eq!(
            active,
            vec![TagFilter::new("k1", "v1"), TagFilter::new("k2", "v2")]
        );
    }

    #[test]
    fn functional_model_apply_keeps_current_snapshot_on_failed_edit() {
        let mut model = FilterModel::new(two_tags());
        model
            .apply(FilterEdit::SetStateFilter("COMPLETE".to_string()))
            .expect("state filter edits always succeed");
        let error = model
            .apply(FilterEdit::RemoveTag(9))
            .expect_err("index 9 is out of range");
        assert_eq!(error, FilterEditError::IndexOutOfRange { index: 9, len: 2 });
        assert_eq!(model.snapshot().state_filter(), "COMPLETE");
        assert_eq!(model.snapshot().tag_filters().len(), 2);
    }

    #[test]
    fn unit_snapshot_serializes_with_camel_case_fields() {
        let payload = serde_json::to_value(two_tags()).expect("serialize snapshot");
        assert_eq!(payload["stateFilter"], "");
        assert_eq!(payload["tagFilters"][1]["key"], "k2");
    }

    #[derive(Debug, Clone)]
    enum SequenceOp {
        Add,
        Remove(usize),
    }

    fn sequence_op() -> impl Strategy<Value = SequenceOp> {
        prop_oneof![
            Just(SequenceOp::Add),
            (0usize..16).prop_map(SequenceOp::Remove),
        ]
    }

    proptest! {
        #[test]
        fn property_add_remove_sequences_track_length_and_order(
            ops in proptest::collection::vec(sequence_op(), 0..32)
        ) {
            let mut state = FilterState::seeded(
                "",
                [TagFilter::new("seed", "0")],
            );
            let mut expected = state.tag_filters().to_vec();
            let mut label = 0usize;
            for op in ops {
                match op {
                    SequenceOp::Add => {
                        label += 1;
                        let index = state.tag_filters().len();
                        state = state
                            .add_tag_filter()
                            .set_tag_at(index, "key", format!("k{label}"))
                            .expect("freshly added row is in range");
                        expected.push(TagFilter::new(format!("k{label}"), ""));
                    }
                    SequenceOp::Remove(index) => {
                        // Only removals that keep at least one row are counted.
                        if index < expected.len() && expected.len() > 1 {
                            state = state
                                .remove_tag_filter_at(index)
                                .expect("index checked against expected");
                            expected.remove(index);
                        }
                    }
                }
                prop_assert_eq!(state.tag_filters(), expected.as_slice());
            }
        }

        #[test]
        fn property_set_tag_key_leaves_other_rows_untouched(
            keys in proptest::collection::vec("[a-z]{0,6}", 1..8),
            pick in any::<proptest::sample::Index>(),
            replacement in "[a-z0-9]{0,6}",
        ) {
            let before = FilterState::seeded(
                "RUNNING",
                keys.iter().map(|key| TagFilter::new(key.clone(), format!("{key}-v"))),
            );
            let index = pick.index(before.tag_filters().len());
            let after = before
                .set_tag_at(index, "key", replacement.clone())
                .expect("index drawn within bounds");
            for (position, (old, new)) in before
                .tag_filters()
                .iter()
                .zip(after.tag_filters())
                .enumerate()
            {
                if position == index {
                    prop_assert_eq!(&new.key, &replacement);
                    prop_assert_eq!(&new.value, &old.value);
                } else {
                    prop_assert_eq!(new, old);
                }
            }
            prop_assert_eq!(after.state_filter(), "RUNNING");
        }
    }
}
