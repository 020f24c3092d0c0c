//! Record-to-table transform and paged views over the result.
//!
//! # Design
//! - Columns come from the first record's keys, in insertion order.
//! - One array-valued column may become a nested grid per row. An explicit
//!   field name wins; otherwise the first array-valued field of the first
//!   record is used. With several array fields the first one is taken.
//! - Page totals and page slices are derived on every call, never stored.

use crate::core::pagination::{
    PaginationAction, PaginationState, clamp_page, page_count,
};
use serde_json::{Map, Value};
use std::rc::Rc;
use yew::Reducible;

/// A single input record.
pub type Record = Map<String, Value>;

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Options for [`create_grid_data`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridOptions {
    /// Render a header row.
    pub show_header: bool,
    /// Field to render as a nested grid.
    pub sub_grid_field: Option<String>,
    /// Fall back to the first array-valued field.
    pub auto_detect_sub_grid: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            show_header: true,
            sub_grid_field: None,
            auto_detect_sub_grid: true,
        }
    }
}

/// Layout facts for a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridMeta {
    /// Column index of the nested grid.
    pub sub_grid_field_idx: Option<usize>,
    /// Render a header row.
    pub show_header: bool,
}

impl Default for GridMeta {
    fn default() -> Self {
        Self {
            sub_grid_field_idx: None,
            show_header: true,
        }
    }
}

/// One row: plain cells plus an optional nested grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridRow {
    /// Cell values in column order, without the nested grid column.
    pub cells: Vec<Value>,
    /// Nested grid built from the sub-grid column.
    pub sub_grid: Option<GridData>,
}

/// Tabular data inferred from records.
#[derive(Clone, Debug, PartialEq)]
pub struct GridData {
    /// Layout facts.
    pub meta: GridMeta,
    /// Column names, including the nested grid column.
    pub columns: Vec<String>,
    /// Rows.
    pub rows: Vec<GridRow>,
}

impl Default for GridData {
    fn default() -> Self {
        Self {
            meta: GridMeta::default(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// Build grid data from records; `None` when there are no records.
#[must_use]
pub fn create_grid_data(records: &[Record], options: &GridOptions) -> Option<GridData> {
    let first = records.first()?;
    let columns: Vec<String> = first.keys().cloned().collect();

    let explicit = options
        .sub_grid_field
        .as_deref()
        .and_then(|field| columns.iter().position(|column| column == field));
    let sub_grid_field_idx = explicit.or_else(|| {
        options
            .auto_detect_sub_grid
            .then(|| first.values().position(Value::is_array))
            .flatten()
    });

    let rows = records
        .iter()
        .map(|record| build_row(record, &columns, sub_grid_field_idx))
        .collect();

    Some(GridData {
        meta: GridMeta {
            sub_grid_field_idx,
            show_header: options.show_header,
        },
        columns,
        rows,
    })
}

fn build_row(record: &Record, columns: &[String], sub_grid_idx: Option<usize>) -> GridRow {
    let mut cells: Vec<Value> = columns
        .iter()
        .map(|column| record.get(column).cloned().unwrap_or(Value::Null))
        .collect();
    let sub_grid = sub_grid_idx
        .filter(|idx| *idx < cells.len())
        .and_then(|idx| nested_grid(&cells.remove(idx)));
    GridRow { cells, sub_grid }
}

fn nested_grid(value: &Value) -> Option<GridData> {
    let records: Vec<Record> = value
        .as_array()?
        .iter()
        .filter_map(|item| item.as_object().cloned())
        .collect();
    create_grid_data(&records, &GridOptions::default())
}

/// Display text for a cell value.
#[must_use]
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Requested page position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paging {
    /// Rows per page.
    pub page_size: usize,
    /// 1-based page to show first.
    pub current_page: usize,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 1,
        }
    }
}

/// Grid data viewed one page at a time.
#[derive(Clone, Debug, PartialEq)]
pub struct PagedGrid {
    data: Rc<GridData>,
    page_size: usize,
    selected: usize,
}

impl PagedGrid {
    /// Page `data` starting at `paging.current_page` (clamped).
    #[must_use]
    pub fn new(data: GridData, paging: Paging) -> Self {
        let page_size = paging.page_size.max(1);
        let total = page_count(data.rows.len(), page_size);
        Self {
            data: Rc::new(data),
            page_size,
            selected: clamp_page(paging.current_page, total),
        }
    }

    /// Number of pages for the current page size.
    #[must_use]
    pub fn total(&self) -> usize {
        page_count(self.data.rows.len(), self.page_size)
    }

    /// Selected page, 1-based.
    #[must_use]
    pub const fn selected(&self) -> usize {
        self.selected
    }

    /// Rows per page.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Rows of the selected page.
    #[must_use]
    pub fn rows(&self) -> &[GridRow] {
        let rows = &self.data.rows;
        let start = (self.selected - 1)
            .saturating_mul(self.page_size)
            .min(rows.len());
        let end = start.saturating_add(self.page_size).min(rows.len());
        &rows[start..end]
    }

    /// Columns of the underlying grid.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.data.columns
    }

    /// Layout facts of the underlying grid.
    #[must_use]
    pub fn meta(&self) -> GridMeta {
        self.data.meta
    }

    /// Every row, regardless of page.
    #[must_use]
    pub fn all_rows(&self) -> &[GridRow] {
        &self.data.rows
    }

    /// Select a page (clamped into range).
    pub fn on_page_change(&mut self, page: usize) {
        self.selected = clamp_page(page, self.total());
    }

    /// Change the page size and re-clamp the selected page.
    pub fn on_page_size_change(&mut self, size: usize) {
        self.page_size = size.max(1);
        self.selected = clamp_page(self.selected, self.total());
    }

    /// Swap in new rows, keeping the page size and clamping the selection.
    pub fn replace_data(&mut self, data: GridData) {
        self.data = Rc::new(data);
        self.selected = clamp_page(self.selected, self.total());
    }

    /// Pagination control state matching this view.
    #[must_use]
    pub fn pagination(&self) -> PaginationState {
        PaginationState::new(self.total(), self.selected).with_page_size(self.page_size)
    }
}

/// Changes a paged grid view can apply.
#[derive(Clone, Debug, PartialEq)]
pub enum GridAction {
    /// Page navigation or page-size change.
    Paginate(PaginationAction),
    /// New data arrived; the page size is kept.
    SetData(GridData),
}

impl From<PaginationAction> for GridAction {
    fn from(action: PaginationAction) -> Self {
        Self::Paginate(action)
    }
}

impl Reducible for PagedGrid {
    type Action = GridAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            GridAction::Paginate(PaginationAction::GoTo(page)) => next.on_page_change(page),
            GridAction::Paginate(PaginationAction::Previous) => {
                next.on_page_change(next.selected.saturating_sub(1));
            }
            GridAction::Paginate(PaginationAction::Next) => next.on_page_change(next.selected + 1),
            GridAction::Paginate(PaginationAction::SetPageSize(size)) => {
                next.on_page_size_change(size);
            }
            // The page count of a grid is derived from its rows.
            GridAction::Paginate(PaginationAction::SetTotal(_)) => {}
            GridAction::SetData(data) => next.replace_data(data),
        }
        if next == *self { self } else { Rc::new(next) }
    }
}

/// Wrap grid data in a paged view; `None` passes through.
#[must_use]
pub fn paginate_grid_data(grid: Option<GridData>, paging: Option<Paging>) -> Option<PagedGrid> {
    grid.map(|data| PagedGrid::new(data, paging.unwrap_or_default()))
}
