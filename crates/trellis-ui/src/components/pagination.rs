//! Pagination control rendered from a selector style table.
//!
//! # Design
//! - Element names and classes come from [`PaginationStyle`], so the same
//!   control renders Bulma markup or any other framework's.
//! - Page links are keyed (`p{n}`, `skipL`, `skipR`) for stable diffing.

use crate::components::form::Select;
use crate::core::form::SelectOption;
use crate::core::pagination::{
    DEFAULT_PAGE_SIZE_OPTIONS, DEFAULT_PROXIMITY, PageItem, PaginationAction, PaginationState,
    PaginationStyle, page_window,
};
use crate::core::util::Selector;
use yew::prelude::*;
use yew::virtual_dom::{Key, VNode, VTag};

/// Props for [`Pagination`].
#[derive(Properties, PartialEq)]
pub struct PaginationProps {
    /// Number of pages.
    #[prop_or_default]
    pub total: usize,
    /// Selected page, 1-based.
    #[prop_or(1)]
    pub selected: usize,
    /// Receives the clicked page.
    #[prop_or_default]
    pub on_page_change: Callback<usize>,
    /// Shows the page-size picker when set.
    #[prop_or_default]
    pub page_size: Option<usize>,
    /// Choices offered by the page-size picker.
    #[prop_or_else(default_page_size_options)]
    pub page_size_options: Vec<usize>,
    /// Receives the picked page size.
    #[prop_or_default]
    pub on_page_size_change: Callback<usize>,
    /// Pages shown on each side of the selected one.
    #[prop_or(DEFAULT_PROXIMITY)]
    pub proximity: usize,
    /// Previous-page label.
    #[prop_or(AttrValue::Static("←"))]
    pub prev_indicator: AttrValue,
    /// Next-page label.
    #[prop_or(AttrValue::Static("→"))]
    pub next_indicator: AttrValue,
    /// Label for collapsed page runs.
    #[prop_or(AttrValue::Static("…"))]
    pub skip_indicator: AttrValue,
    /// Element names and classes.
    #[prop_or_default]
    pub style: PaginationStyle,
}

fn default_page_size_options() -> Vec<usize> {
    DEFAULT_PAGE_SIZE_OPTIONS.to_vec()
}

fn element(selector: &Selector) -> VTag {
    let mut node = VTag::new(selector.tag.clone());
    if !selector.classes.is_empty() {
        node.add_attribute("class", selector.class_attr());
    }
    node
}

/// Key `inner`, or its `outer` wrapper when the style has one.
fn wrap(outer: Option<&Selector>, key: String, inner: Html) -> Html {
    match outer {
        Some(outer) => {
            let mut node = element(outer);
            node.key = Some(Key::from(key));
            node.add_child(inner);
            node.into()
        }
        None => {
            let mut inner = inner;
            if let VNode::VTag(tag) = &mut inner {
                tag.key = Some(Key::from(key));
            }
            inner
        }
    }
}

/// Page links with previous/next buttons and an optional page-size picker.
#[function_component(Pagination)]
pub fn pagination(props: &PaginationProps) -> Html {
    let style = &props.style;
    let selected = props.selected;
    let total = props.total;

    let item = |number: usize, current: bool| -> Html {
        let selector = if current { &style.item_current } else { &style.item };
        let onclick = {
            let on_page_change = props.on_page_change.clone();
            Callback::from(move |_: MouseEvent| on_page_change.emit(number))
        };
        let link = html! {
            <@{selector.tag.clone()}
                class={selector.class_attr()}
                aria-label={format!("Go to Page {number}")}
                aria-current={current.then_some("page")}
                {onclick}
            >
                {number}
            </@>
        };
        wrap(style.item_outer.as_ref(), format!("p{number}"), link)
    };

    let items = page_window(selected, total, props.proximity)
        .into_iter()
        .map(|entry| match entry {
            PageItem::Page(number) => item(number, false),
            PageItem::Current(number) => item(number, true),
            PageItem::Skip(side) => {
                let skip = html! {
                    <@{style.item_skip.tag.clone()} class={style.item_skip.class_attr()}>
                        {props.skip_indicator.clone()}
                    </@>
                };
                wrap(style.item_outer.as_ref(), side.key().to_string(), skip)
            }
        });

    let prev = {
        let on_page_change = props.on_page_change.clone();
        let onclick = Callback::from(move |_: MouseEvent| {
            if selected > 1 {
                on_page_change.emit(selected - 1);
            }
        });
        html! {
            <@{style.prev.tag.clone()}
                class={style.prev.class_attr()}
                disabled={selected <= 1}
                {onclick}
            >
                {props.prev_indicator.clone()}
            </@>
        }
    };
    let next = {
        let on_page_change = props.on_page_change.clone();
        let onclick = Callback::from(move |_: MouseEvent| {
            if selected < total {
                on_page_change.emit(selected + 1);
            }
        });
        html! {
            <@{style.next.tag.clone()}
                class={style.next.class_attr()}
                disabled={selected >= total}
                {onclick}
            >
                {props.next_indicator.clone()}
            </@>
        }
    };

    let mut list = element(&style.item_container);
    list.add_children(items);

    let mut parent = element(&style.parent);
    parent.add_attribute("role", "navigation");
    parent.add_attribute("aria-label", "pagination");
    if let Some(page_size) = props.page_size {
        let on_select = {
            let on_page_size_change = props.on_page_size_change.clone();
            Callback::from(move |values: Vec<String>| {
                if let Some(size) = values.first().and_then(|value| value.parse().ok()) {
                    on_page_size_change.emit(size);
                }
            })
        };
        let picker = html! {
            <Select
                options={props.page_size_options.iter().map(|size| SelectOption::from(size.to_string())).collect::<Vec<_>>()}
                selected={vec![page_size.to_string()]}
                {on_select}
            />
        };
        match &style.page_size_container {
            Some(container) => {
                let mut node = element(container);
                node.add_child(picker);
                parent.add_child(node.into());
            }
            None => parent.add_child(picker),
        }
    }
    parent.add_child(prev);
    parent.add_child(next);
    parent.add_child(list.into());
    parent.into()
}

/// Props for [`PaginationStateful`].
#[derive(Properties, PartialEq)]
pub struct PaginationStatefulProps {
    /// Number of pages.
    #[prop_or_default]
    pub total: usize,
    /// Initial page.
    #[prop_or(1)]
    pub selected: usize,
    /// Receives the clicked page.
    #[prop_or_default]
    pub on_page_change: Callback<usize>,
    /// Initial page size; shows the picker when set.
    #[prop_or_default]
    pub page_size: Option<usize>,
    /// Choices offered by the page-size picker.
    #[prop_or_else(default_page_size_options)]
    pub page_size_options: Vec<usize>,
    /// Receives the picked page size.
    #[prop_or_default]
    pub on_page_size_change: Callback<usize>,
    /// Pages shown on each side of the selected one.
    #[prop_or(DEFAULT_PROXIMITY)]
    pub proximity: usize,
    /// Element names and classes.
    #[prop_or_default]
    pub style: PaginationStyle,
}

/// Pagination that keeps its own selected page and page size.
#[function_component(PaginationStateful)]
pub fn pagination_stateful(props: &PaginationStatefulProps) -> Html {
    let state = {
        let total = props.total;
        let selected = props.selected;
        let page_size = props.page_size;
        let proximity = props.proximity;
        let options = props.page_size_options.clone();
        use_reducer(move || {
            let mut state = PaginationState::new(total, selected).with_proximity(proximity);
            state.page_size = page_size;
            state.page_size_options = options;
            state
        })
    };

    {
        let state = state.clone();
        use_effect_with_deps(
            move |total| {
                state.dispatch(PaginationAction::SetTotal(*total));
                || ()
            },
            props.total,
        );
    }

    let on_page_change = {
        let state = state.clone();
        let forward = props.on_page_change.clone();
        Callback::from(move |page: usize| {
            state.dispatch(PaginationAction::GoTo(page));
            forward.emit(page);
        })
    };
    let on_page_size_change = {
        let state = state.clone();
        let forward = props.on_page_size_change.clone();
        Callback::from(move |size: usize| {
            state.dispatch(PaginationAction::SetPageSize(size));
            forward.emit(size);
        })
    };

    html! {
        <Pagination
            total={state.total}
            selected={state.selected}
            page_size={state.page_size}
            page_size_options={state.page_size_options.clone()}
            proximity={state.proximity}
            style={props.style.clone()}
            {on_page_change}
            {on_page_size_change}
        />
    }
}
