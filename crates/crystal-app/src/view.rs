// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{ColumnSpec, DeleteAck, Record, RecordId, RecordStore, SortKey, StoreError};

pub const ROWS_PER_PAGE_CHOICES: [usize; 4] = [5, 10, 25, 50];
pub const DEFAULT_ROWS_PER_PAGE: usize = 10;

const SORT_MARK_ASC: &str = "▲";
const SORT_MARK_DESC: &str = "▼";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    #[default]
    AllFields,
    SearchableColumns,
}

impl SearchScope {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all_fields" => Some(Self::AllFields),
            "searchable_columns" => Some(Self::SearchableColumns),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllFields => "all_fields",
            Self::SearchableColumns => "searchable_columns",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    pub rows_per_page: usize,
    pub rows_per_page_choices: Vec<usize>,
    pub search_scope: SearchScope,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            rows_per_page_choices: ROWS_PER_PAGE_CHOICES.to_vec(),
            search_scope: SearchScope::AllFields,
        }
    }
}

impl ViewOptions {
    pub fn validate(&self) -> Result<()> {
        if self.rows_per_page_choices.is_empty() {
            bail!("rows per page choices must not be empty");
        }
        if self.rows_per_page_choices.contains(&0) {
            bail!("rows per page choices must be positive");
        }
        validate_rows_per_page(&self.rows_per_page_choices, self.rows_per_page)
    }
}

pub fn validate_rows_per_page(choices: &[usize], rows_per_page: usize) -> Result<()> {
    if !choices.contains(&rows_per_page) {
        bail!("rows per page must be one of {choices:?}, got {rows_per_page}");
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub records: Vec<Record>,
    pub search_query: String,
    pub sort_column: usize,
    pub sort_direction: SortDirection,
    pub rows_per_page: usize,
    pub current_page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            search_query: String::new(),
            sort_column: 0,
            sort_direction: SortDirection::Asc,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            current_page: 1,
        }
    }
}

/// The page of rows to render plus the counts for the
/// "Showing X to Y of Z entries" line. Indices are 1-based and both zero
/// when nothing matches.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleSlice<'a> {
    pub rows: Vec<&'a Record>,
    pub total_filtered_count: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub start_index: usize,
    pub end_index: usize,
}

impl VisibleSlice<'_> {
    pub fn summary(&self) -> String {
        format!(
            "Showing {} to {} of {} entries",
            self.start_index, self.end_index, self.total_filtered_count
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageButton {
    Previous { enabled: bool },
    Page { number: usize, current: bool },
    Next { enabled: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub buttons: Vec<PageButton>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed(RecordId),
    /// The record was already gone locally; nothing changed.
    AlreadyAbsent(RecordId),
    /// A failure arrived for a record that is no longer shown.
    Ignored(RecordId),
}

/// Client-side search, sort and pagination over one collection of records.
/// Each admin screen owns exactly one of these.
#[derive(Debug, Clone)]
pub struct TabularDataView {
    columns: Vec<ColumnSpec>,
    state: ViewState,
    rows_per_page_choices: Vec<usize>,
    search_scope: SearchScope,
    loading: bool,
    pending_deletes: BTreeSet<RecordId>,
}

impl TabularDataView {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns,
            state: ViewState::default(),
            rows_per_page_choices: ROWS_PER_PAGE_CHOICES.to_vec(),
            search_scope: SearchScope::AllFields,
            loading: false,
            pending_deletes: BTreeSet::new(),
        }
    }

    pub fn with_options(columns: Vec<ColumnSpec>, options: ViewOptions) -> Result<Self> {
        options.validate()?;
        let mut view = Self::new(columns);
        view.state.rows_per_page = options.rows_per_page;
        view.rows_per_page_choices = options.rows_per_page_choices;
        view.search_scope = options.search_scope;
        Ok(view)
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn rows_per_page_choices(&self) -> &[usize] {
        &self.rows_per_page_choices
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_delete_pending(&self, id: &RecordId) -> bool {
        self.pending_deletes.contains(id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.state.records.iter().any(|record| record.id() == id)
    }

    pub fn set_search_query(&mut self, text: &str) {
        self.state.search_query = text.to_owned();
        self.state.current_page = 1;
    }

    /// Same column flips direction; a new column starts ascending. Returns
    /// false for an index past the last column.
    pub fn set_sort_column(&mut self, index: usize) -> bool {
        if index >= self.columns.len() {
            return false;
        }
        if index == self.state.sort_column {
            self.state.sort_direction = self.state.sort_direction.toggled();
        } else {
            self.state.sort_column = index;
            self.state.sort_direction = SortDirection::Asc;
        }
        true
    }

    pub fn set_rows_per_page(&mut self, rows_per_page: usize) -> Result<()> {
        validate_rows_per_page(&self.rows_per_page_choices, rows_per_page)?;
        self.state.rows_per_page = rows_per_page;
        self.state.current_page = 1;
        Ok(())
    }

    /// Clamps into `[1, total_pages]` and returns the page landed on.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.state.current_page = page.clamp(1, self.total_pages());
        self.state.current_page
    }

    pub fn next_page(&mut self) -> usize {
        self.go_to_page(self.state.current_page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> usize {
        self.go_to_page(self.state.current_page.saturating_sub(1))
    }

    pub fn total_filtered_count(&self) -> usize {
        let needle = self.state.search_query.to_lowercase();
        self.state
            .records
            .iter()
            .filter(|record| self.matches(record, &needle))
            .count()
    }

    pub fn total_pages(&self) -> usize {
        pages_for(self.total_filtered_count(), self.state.rows_per_page)
    }

    pub fn visible_slice(&self) -> VisibleSlice<'_> {
        let rows = self.filtered_sorted();
        let total_filtered_count = rows.len();
        let rows_per_page = self.state.rows_per_page.max(1);
        let total_pages = pages_for(total_filtered_count, rows_per_page);
        let current_page = self.state.current_page.clamp(1, total_pages);

        let start = ((current_page - 1) * rows_per_page).min(total_filtered_count);
        let end = start.saturating_add(rows_per_page).min(total_filtered_count);
        let page_rows = rows[start..end].to_vec();

        VisibleSlice {
            rows: page_rows,
            total_filtered_count,
            total_pages,
            current_page,
            start_index: if start == end { 0 } else { start + 1 },
            end_index: end,
        }
    }

    /// Column labels with a direction mark on the active sort column only.
    pub fn header_labels(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                if index == self.state.sort_column {
                    let mark = match self.state.sort_direction {
                        SortDirection::Asc => SORT_MARK_ASC,
                        SortDirection::Desc => SORT_MARK_DESC,
                    };
                    format!("{} {mark}", column.label)
                } else {
                    column.label.clone()
                }
            })
            .collect()
    }

    pub fn pagination(&self) -> Pagination {
        let total_pages = self.total_pages();
        let current_page = self.state.current_page.clamp(1, total_pages);
        let mut buttons = Vec::with_capacity(total_pages + 2);
        buttons.push(PageButton::Previous {
            enabled: current_page > 1,
        });
        buttons.extend((1..=total_pages).map(|number| PageButton::Page {
            number,
            current: number == current_page,
        }));
        buttons.push(PageButton::Next {
            enabled: current_page < total_pages,
        });
        Pagination {
            current_page,
            total_pages,
            buttons,
        }
    }

    /// Marks a load as in flight. Returns false if one already is.
    pub fn begin_load(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    /// Applies a finished load. On failure the current records stay.
    pub fn apply_load(
        &mut self,
        result: Result<Vec<Record>, StoreError>,
    ) -> Result<usize, StoreError> {
        self.loading = false;
        let records = result?;
        let count = records.len();
        self.replace_records(records);
        Ok(count)
    }

    pub fn load(&mut self, store: &mut dyn RecordStore) -> Result<usize, StoreError> {
        self.begin_load();
        let result = store.list_records();
        self.apply_load(result)
    }

    pub fn replace_records(&mut self, records: Vec<Record>) {
        self.state.records = records;
        self.clamp_page();
    }

    pub fn begin_delete(&mut self, id: &RecordId) {
        self.pending_deletes.insert(id.clone());
    }

    /// Applies a finished delete. Success removes the record locally; a
    /// failure for a record that is already gone is dropped.
    pub fn apply_delete(
        &mut self,
        id: &RecordId,
        result: Result<DeleteAck, StoreError>,
    ) -> Result<DeleteOutcome, StoreError> {
        self.pending_deletes.remove(id);
        match result.and_then(|ack| ack.into_result()) {
            Ok(_) => {
                if self.remove_local(id) {
                    Ok(DeleteOutcome::Removed(id.clone()))
                } else {
                    Ok(DeleteOutcome::AlreadyAbsent(id.clone()))
                }
            }
            Err(_) if !self.contains(id) => Ok(DeleteOutcome::Ignored(id.clone())),
            Err(error) => Err(error),
        }
    }

    pub fn delete_record(
        &mut self,
        store: &mut dyn RecordStore,
        id: &RecordId,
    ) -> Result<DeleteOutcome, StoreError> {
        self.begin_delete(id);
        let result = store.delete_record(id);
        self.apply_delete(id, result)
    }

    fn remove_local(&mut self, id: &RecordId) -> bool {
        let before = self.state.records.len();
        self.state.records.retain(|record| record.id() != id);
        let removed = self.state.records.len() != before;
        self.clamp_page();
        removed
    }

    fn clamp_page(&mut self) {
        self.state.current_page = self.state.current_page.clamp(1, self.total_pages());
    }

    fn matches(&self, record: &Record, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        match self.search_scope {
            SearchScope::AllFields => record.any_field_contains(needle),
            SearchScope::SearchableColumns => self
                .columns
                .iter()
                .filter(|column| column.searchable)
                .any(|column| column.search_text(record).to_lowercase().contains(needle)),
        }
    }

    fn filtered_sorted(&self) -> Vec<&Record> {
        let needle = self.state.search_query.to_lowercase();
        let filtered = self
            .state
            .records
            .iter()
            .filter(|record| self.matches(record, &needle));

        let Some(column) = self.columns.get(self.state.sort_column) else {
            return filtered.collect();
        };

        let mut keyed: Vec<(SortKey, &Record)> = filtered
            .map(|record| (column.key(record), record))
            .collect();
        // Stable sort; descending flips the comparator so ties keep their
        // original relative order.
        let direction = self.state.sort_direction;
        keyed.sort_by(|(left, _), (right, _)| match direction {
            SortDirection::Asc => left.cmp_key(right),
            SortDirection::Desc => right.cmp_key(left),
        });
        keyed.into_iter().map(|(_, record)| record).collect()
    }
}

fn pages_for(count: usize, rows_per_page: usize) -> usize {
    count.div_ceil(rows_per_page.max(1)).max(1)
}
