//! Data grid rendering with nested grids and optional paging.

use crate::components::pagination::Pagination;
use crate::core::grid::{
    GridAction, GridData, GridMeta, GridRow, PagedGrid as PagedGridState, Paging, cell_text,
};
use crate::core::pagination::{PaginationAction, PaginationStyle};
use yew::prelude::*;

/// Props for [`Grid`].
#[derive(Properties, PartialEq)]
pub struct GridProps {
    /// Table data; `None` renders the empty placeholder.
    #[prop_or_default]
    pub data: Option<GridData>,
    /// Classes for the table element.
    #[prop_or_default]
    pub class: Classes,
}

/// Table with a header row and nested grids.
#[function_component(Grid)]
pub fn grid(props: &GridProps) -> Html {
    match &props.data {
        Some(data) => render_table(&data.columns, data.meta, &data.rows, &props.class),
        None => render_table(&[], GridMeta::default(), &[], &props.class),
    }
}

fn render_table(columns: &[String], meta: GridMeta, rows: &[GridRow], class: &Classes) -> Html {
    if columns.is_empty() {
        return html! { <div class={class.clone()}>{"Empty Result"}</div> };
    }
    html! {
        <table class={class.clone()}>
            {if meta.show_header {
                html! {
                    <thead>
                        <tr>
                            {for columns.iter().map(|column| html! { <th>{column.clone()}</th> })}
                        </tr>
                    </thead>
                }
            } else {
                html! {}
            }}
            <tbody>
                {for rows.iter().enumerate().map(|(idx, row)| render_row(idx, row, meta.sub_grid_field_idx))}
            </tbody>
        </table>
    }
}

fn render_row(idx: usize, row: &GridRow, sub_grid_idx: Option<usize>) -> Html {
    let mut cells: Vec<Html> = row
        .cells
        .iter()
        .map(|value| html! { <td>{cell_text(value)}</td> })
        .collect();
    if let (Some(sub_grid), Some(at)) = (&row.sub_grid, sub_grid_idx) {
        let nested = html! { <td><Grid data={Some(sub_grid.clone())} /></td> };
        cells.insert(at.min(cells.len()), nested);
    }
    html! { <tr key={idx.to_string()}>{for cells}</tr> }
}

/// Props for [`PagedGrid`].
#[derive(Properties, PartialEq)]
pub struct PagedGridProps {
    /// Full data set.
    #[prop_or_default]
    pub data: Option<GridData>,
    /// Initial page and page size.
    #[prop_or_default]
    pub paging: Paging,
    /// Render controls above the table.
    #[prop_or_default]
    pub pagination_above: bool,
    /// Render controls below the table.
    #[prop_or(true)]
    pub pagination_below: bool,
    /// Markup for the pagination controls.
    #[prop_or_default]
    pub style: PaginationStyle,
    /// Classes for the table element.
    #[prop_or_default]
    pub class: Classes,
    /// Receives the newly selected page.
    #[prop_or_default]
    pub on_page_change: Callback<usize>,
    /// Receives the newly selected page size.
    #[prop_or_default]
    pub on_page_size_change: Callback<usize>,
}

/// Grid showing one page of rows with pagination controls.
#[function_component(PagedGrid)]
pub fn paged_grid(props: &PagedGridProps) -> Html {
    let view = {
        let data = props.data.clone().unwrap_or_default();
        let paging = props.paging;
        use_reducer(move || PagedGridState::new(data, paging))
    };

    {
        let view = view.clone();
        use_effect_with_deps(
            move |data: &Option<GridData>| {
                view.dispatch(GridAction::SetData(data.clone().unwrap_or_default()));
                || ()
            },
            props.data.clone(),
        );
    }

    let on_page_change = {
        let view = view.clone();
        let forward = props.on_page_change.clone();
        Callback::from(move |page: usize| {
            view.dispatch(PaginationAction::GoTo(page).into());
            forward.emit(page);
        })
    };
    let on_page_size_change = {
        let view = view.clone();
        let forward = props.on_page_size_change.clone();
        Callback::from(move |size: usize| {
            view.dispatch(PaginationAction::SetPageSize(size).into());
            forward.emit(size);
        })
    };

    let controls = || {
        let state = view.pagination();
        html! {
            <Pagination
                total={state.total}
                selected={state.selected}
                page_size={state.page_size}
                style={props.style.clone()}
                on_page_change={on_page_change.clone()}
                on_page_size_change={on_page_size_change.clone()}
            />
        }
    };

    html! {
        <>
            {if props.pagination_above { controls() } else { html! {} }}
            {render_table(view.columns(), view.meta(), view.rows(), &props.class)}
            {if props.pagination_below { controls() } else { html! {} }}
        </>
    }
}
