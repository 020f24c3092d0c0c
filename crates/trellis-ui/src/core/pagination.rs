//! Pagination window computation and page-selection state.
//!
//! # Design
//! - The window is a pure function of `(selected, total, proximity)`.
//! - Long runs of pages collapse into a single ellipsis per side; short ranges
//!   never collapse.
//! - [`PaginationState`] is reducible so components own it explicitly instead
//!   of mutating shared props.

use crate::core::util::{Selector, parse_selector};
use std::rc::Rc;
use yew::Reducible;

/// Neighbouring pages shown on each side of the current page.
pub const DEFAULT_PROXIMITY: usize = 2;
/// Page-size choices offered by default.
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 15, 20];

/// Which side of the current page an ellipsis stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipSide {
    /// Pages between the first page and the window.
    Leading,
    /// Pages between the window and the last page.
    Trailing,
}

impl SkipSide {
    /// Stable render key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Leading => "skipL",
            Self::Trailing => "skipR",
        }
    }
}

/// One renderable entry in the pagination list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageItem {
    /// Link to another page.
    Page(usize),
    /// The selected page.
    Current(usize),
    /// Collapsed run of pages.
    Skip(SkipSide),
}

impl PageItem {
    /// Page number, if the item is a page.
    #[must_use]
    pub const fn page(self) -> Option<usize> {
        match self {
            Self::Page(number) | Self::Current(number) => Some(number),
            Self::Skip(_) => None,
        }
    }

    /// Stable render key (`p{n}`, `skipL`, `skipR`).
    #[must_use]
    pub fn key(self) -> String {
        match self {
            Self::Page(number) | Self::Current(number) => format!("p{number}"),
            Self::Skip(side) => side.key().to_string(),
        }
    }
}

/// Compute the pagination list around `selected`.
///
/// The leading side collapses when `selected > proximity + 3`, the trailing
/// side when `selected < total - proximity - 2`.
#[must_use]
pub fn page_window(selected: usize, total: usize, proximity: usize) -> Vec<PageItem> {
    let mut items = Vec::new();

    if selected > proximity + 3 {
        items.push(PageItem::Page(1));
        items.push(PageItem::Skip(SkipSide::Leading));
        items.extend((selected - proximity..selected).map(PageItem::Page));
    } else {
        items.extend((1..selected).map(PageItem::Page));
    }

    items.push(PageItem::Current(selected));

    if selected + proximity + 2 < total {
        items.extend((selected + 1..=selected + proximity).map(PageItem::Page));
        items.push(PageItem::Skip(SkipSide::Trailing));
        items.push(PageItem::Page(total));
    } else {
        items.extend((selected + 1..=total).map(PageItem::Page));
    }

    items
}

/// Clamp a page number into `[1, total]`, or 1 when there are no pages.
#[must_use]
pub fn clamp_page(page: usize, total: usize) -> usize {
    page.clamp(1, total.max(1))
}

/// Number of pages needed for `rows` at `page_size` (a zero size counts as 1).
#[must_use]
pub fn page_count(rows: usize, page_size: usize) -> usize {
    rows.div_ceil(page_size.max(1))
}

/// Page selection state for a pagination control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationState {
    /// Number of pages.
    pub total: usize,
    /// Selected page, 1-based.
    pub selected: usize,
    /// Page size, when the control offers a size picker.
    pub page_size: Option<usize>,
    /// Page-size choices.
    pub page_size_options: Vec<usize>,
    /// Neighbouring pages shown on each side.
    pub proximity: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            total: 0,
            selected: 1,
            page_size: None,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            proximity: DEFAULT_PROXIMITY,
        }
    }
}

impl PaginationState {
    /// State for `total` pages with `selected` clamped into range.
    #[must_use]
    pub fn new(total: usize, selected: usize) -> Self {
        Self {
            total,
            selected: clamp_page(selected, total),
            ..Self::default()
        }
    }

    /// Set the page size shown in the size picker.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set the neighbouring page count.
    #[must_use]
    pub fn with_proximity(mut self, proximity: usize) -> Self {
        self.proximity = proximity;
        self
    }

    /// Whether a previous page exists.
    #[must_use]
    pub const fn can_previous(&self) -> bool {
        self.selected > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn can_next(&self) -> bool {
        self.selected < self.total
    }

    /// Items to render for the current selection.
    #[must_use]
    pub fn items(&self) -> Vec<PageItem> {
        page_window(self.selected, self.total, self.proximity)
    }

    /// Apply an action, returning the next state.
    #[must_use]
    pub fn apply(&self, action: PaginationAction) -> Self {
        let mut next = self.clone();
        match action {
            PaginationAction::GoTo(page) => next.selected = clamp_page(page, next.total),
            PaginationAction::Previous => {
                if next.can_previous() {
                    next.selected -= 1;
                }
            }
            PaginationAction::Next => {
                if next.can_next() {
                    next.selected += 1;
                }
            }
            PaginationAction::SetPageSize(size) => {
                next.page_size = Some(size.max(1));
                next.selected = clamp_page(next.selected, next.total);
            }
            PaginationAction::SetTotal(total) => {
                next.total = total;
                next.selected = clamp_page(next.selected, total);
            }
        }
        next
    }
}

/// Changes a pagination control can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaginationAction {
    /// Jump to a page (clamped).
    GoTo(usize),
    /// Step back one page.
    Previous,
    /// Step forward one page.
    Next,
    /// Change the page size.
    SetPageSize(usize),
    /// Change the page count.
    SetTotal(usize),
}

impl Reducible for PaginationState {
    type Action = PaginationAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let next = self.apply(action);
        if next == *self { self } else { Rc::new(next) }
    }
}

/// Element selectors for each part of a pagination control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationStyle {
    /// Outer element.
    pub parent: Selector,
    /// Previous-page control.
    pub prev: Selector,
    /// Next-page control.
    pub next: Selector,
    /// List holding the page items.
    pub item_container: Selector,
    /// Optional wrapper around each item.
    pub item_outer: Option<Selector>,
    /// Page link.
    pub item: Selector,
    /// Ellipsis element.
    pub item_skip: Selector,
    /// Selected page link.
    pub item_current: Selector,
    /// Optional wrapper around the page-size picker.
    pub page_size_container: Option<Selector>,
}

impl PaginationStyle {
    /// Bulma pagination markup.
    #[must_use]
    pub fn bulma() -> Self {
        Self {
            parent: parse_selector("nav.pagination"),
            prev: parse_selector("a.pagination-previous"),
            next: parse_selector("a.pagination-next"),
            item_container: parse_selector("ul.pagination-list"),
            item_outer: Some(parse_selector("li")),
            item: parse_selector("a.pagination-link"),
            item_skip: parse_selector("span.pagination-ellipsis"),
            item_current: parse_selector("a.pagination-link.is-current"),
            page_size_container: Some(parse_selector(".select")),
        }
    }
}

impl Default for PaginationStyle {
    fn default() -> Self {
        Self::bulma()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(items: &[PageItem]) -> String {
        items
            .iter()
            .map(|item| match item {
                PageItem::Page(n) => n.to_string(),
                PageItem::Current(n) => format!("[{n}]"),
                PageItem::Skip(_) => "…".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn long_ranges_collapse_on_both_sides() {
        assert_eq!(render(&page_window(10, 20, 2)), "1 … 8 9 [10] 11 12 … 20");
    }

    #[test]
    fn short_ranges_never_collapse() {
        let items = page_window(3, 5, 2);
        assert_eq!(render(&items), "1 2 [3] 4 5");
        assert!(!items.iter().any(|item| matches!(item, PageItem::Skip(_))));
    }

    #[test]
    fn collapse_thresholds_are_exact() {
        // selected = proximity + 3 keeps every leading page.
        assert_eq!(render(&page_window(5, 5, 2)), "1 2 3 4 [5]");
        assert_eq!(render(&page_window(6, 6, 2)), "1 … 4 5 [6]");
        // selected = total - proximity - 2 keeps every trailing page.
        assert_eq!(render(&page_window(1, 5, 2)), "[1] 2 3 4 5");
        assert_eq!(render(&page_window(1, 6, 2)), "[1] 2 3 … 6");
    }

    #[test]
    fn edges_and_skip_keys() {
        assert_eq!(render(&page_window(1, 1, 2)), "[1]");
        assert_eq!(render(&page_window(1, 0, 2)), "[1]");
        let items = page_window(50, 100, 1);
        assert_eq!(render(&items), "1 … 49 [50] 51 … 100");
        assert_eq!(items[1].key(), "skipL");
        assert_eq!(items[5].key(), "skipR");
        assert_eq!(items[3].key(), "p50");
        assert_eq!(items[3].page(), Some(50));
    }

    #[test]
    fn state_actions_stay_in_range() {
        let state = PaginationState::new(4, 9);
        assert_eq!(state.selected, 4);
        assert!(!state.can_next());
        assert_eq!(state.apply(PaginationAction::Next).selected, 4);
        assert_eq!(state.apply(PaginationAction::Previous).selected, 3);
        assert_eq!(state.apply(PaginationAction::GoTo(0)).selected, 1);
        assert_eq!(state.apply(PaginationAction::SetTotal(2)).selected, 2);
        assert_eq!(state.apply(PaginationAction::SetTotal(0)).selected, 1);
        let sized = state.apply(PaginationAction::SetPageSize(0));
        assert_eq!(sized.page_size, Some(1));
    }

    #[test]
    fn reducer_keeps_identity_when_nothing_changes() {
        let state = Rc::new(PaginationState::new(3, 1));
        let same = Rc::clone(&state).reduce(PaginationAction::Previous);
        assert!(Rc::ptr_eq(&state, &same));
        let moved = state.reduce(PaginationAction::Next);
        assert_eq!(moved.selected, 2);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(23, 10), 3);
        assert_eq!(page_count(23, 5), 5);
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(3, 0), 3);
    }

    #[test]
    fn bulma_style_uses_list_items() {
        let style = PaginationStyle::default();
        assert_eq!(style.parent.tag, "nav");
        assert_eq!(style.item_current.class_attr(), "pagination-link is-current");
        assert_eq!(style.item_outer.map(|outer| outer.tag), Some("li".to_string()));
    }
}
