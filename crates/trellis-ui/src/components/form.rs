//! Form controls: text input, select with option groups, theme toggle.
//!
//! # Design
//! - `Input` and `Select` are controlled: the caller owns the value.
//! - The `*Stateful` variants keep their value in a reducer and forward
//!   every change to the caller.

use crate::core::form::{
    InputState, SelectAction, SelectOption, SelectState, group_options,
};
use crate::core::theme::toggle_target;
use crate::services::theme::{self, SystemThemeWatch};
use wasm_bindgen::JsCast;
use web_sys::{HtmlOptionElement, HtmlSelectElement};
use yew::prelude::*;

/// Props for [`Input`].
#[derive(Properties, PartialEq)]
pub struct InputProps {
    /// Current value.
    #[prop_or_default]
    pub value: AttrValue,
    /// HTML input type.
    #[prop_or(AttrValue::Static("text"))]
    pub input_type: AttrValue,
    /// Placeholder text.
    #[prop_or_default]
    pub placeholder: Option<AttrValue>,
    /// Extra classes.
    #[prop_or_default]
    pub class: Classes,
    /// Receives the value after every keystroke.
    #[prop_or_default]
    pub on_input: Callback<String>,
}

/// Controlled text input.
#[function_component(Input)]
pub fn input(props: &InputProps) -> Html {
    let oninput = {
        let on_input = props.on_input.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(input) = event.target_dyn_into::<web_sys::HtmlInputElement>() {
                on_input.emit(input.value());
            }
        })
    };

    html! {
        <input
            class={props.class.clone()}
            type={props.input_type.clone()}
            value={props.value.clone()}
            placeholder={props.placeholder.clone()}
            {oninput}
        />
    }
}

/// Props for [`InputStateful`].
#[derive(Properties, PartialEq)]
pub struct InputStatefulProps {
    /// Initial value; later changes are ignored.
    #[prop_or_default]
    pub value: AttrValue,
    /// HTML input type.
    #[prop_or(AttrValue::Static("text"))]
    pub input_type: AttrValue,
    /// Placeholder text.
    #[prop_or_default]
    pub placeholder: Option<AttrValue>,
    /// Extra classes.
    #[prop_or_default]
    pub class: Classes,
    /// Receives the value after every keystroke.
    #[prop_or_default]
    pub on_input: Callback<String>,
}

/// Text input that keeps its own value.
#[function_component(InputStateful)]
pub fn input_stateful(props: &InputStatefulProps) -> Html {
    let state = {
        let initial = props.value.to_string();
        use_reducer(move || InputState { value: initial })
    };
    let on_input = {
        let state = state.clone();
        let forward = props.on_input.clone();
        Callback::from(move |value: String| {
            state.dispatch(value.clone());
            forward.emit(value);
        })
    };

    html! {
        <Input
            value={AttrValue::from(state.value.clone())}
            input_type={props.input_type.clone()}
            placeholder={props.placeholder.clone()}
            class={props.class.clone()}
            {on_input}
        />
    }
}

/// Props for [`Select`].
#[derive(Properties, PartialEq)]
pub struct SelectProps {
    /// Options in display order.
    #[prop_or_default]
    pub options: Vec<SelectOption>,
    /// `(label, count)` pairs; each group takes the next `count` options.
    #[prop_or_default]
    pub groups: Vec<(String, usize)>,
    /// Selected values.
    #[prop_or_default]
    pub selected: Vec<String>,
    /// Allow several selected options.
    #[prop_or_default]
    pub multiple: bool,
    /// Visible rows; 0 leaves the browser default.
    #[prop_or_default]
    pub size: u32,
    /// Extra classes.
    #[prop_or_default]
    pub class: Classes,
    /// Receives the selected values on change.
    #[prop_or_default]
    pub on_select: Callback<Vec<String>>,
    /// Receives the first selected index on change, or -1.
    #[prop_or_default]
    pub on_select_index: Callback<i32>,
}

/// Controlled select with optional option groups.
#[function_component(Select)]
pub fn select(props: &SelectProps) -> Html {
    let oninput = {
        let on_select = props.on_select.clone();
        let on_select_index = props.on_select_index.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(select) = event.target_dyn_into::<HtmlSelectElement>() {
                on_select.emit(selected_values(&select));
                on_select_index.emit(select.selected_index());
            }
        })
    };

    let grouped = group_options(&props.options, &props.groups);
    let option = |option: &SelectOption| {
        let selected = props.selected.iter().any(|value| value == &option.value);
        html! {
            <option value={option.value.clone()} {selected}>{option.label.clone()}</option>
        }
    };

    html! {
        <select
            class={props.class.clone()}
            multiple={props.multiple}
            size={(props.size > 0).then(|| props.size.to_string())}
            {oninput}
        >
            {for grouped.groups.iter().map(|group| html! {
                <optgroup label={group.label.clone()}>
                    {for group.options.iter().map(option)}
                </optgroup>
            })}
            {for grouped.rest.iter().map(option)}
        </select>
    }
}

fn selected_values(select: &HtmlSelectElement) -> Vec<String> {
    let options = select.selected_options();
    (0..options.length())
        .filter_map(|idx| options.item(idx))
        .filter_map(|element| element.dyn_into::<HtmlOptionElement>().ok())
        .map(|option| option.value())
        .collect()
}

/// Props for [`SelectStateful`].
#[derive(Properties, PartialEq)]
pub struct SelectStatefulProps {
    /// Options in display order.
    #[prop_or_default]
    pub options: Vec<SelectOption>,
    /// `(label, count)` pairs, as for [`Select`].
    #[prop_or_default]
    pub groups: Vec<(String, usize)>,
    /// Initial selection; the first option is used when empty.
    #[prop_or_default]
    pub selected: Vec<String>,
    /// Allow several selected options.
    #[prop_or_default]
    pub multiple: bool,
    /// Visible rows; 0 leaves the browser default.
    #[prop_or_default]
    pub size: u32,
    /// Select the first option again whenever `options` changes.
    #[prop_or_default]
    pub reset_on_options_change: bool,
    /// Extra classes.
    #[prop_or_default]
    pub class: Classes,
    /// Receives the selection, including resets and the initial pick.
    #[prop_or_default]
    pub on_select: Callback<Vec<String>>,
    /// Receives the first selected index on change, or -1.
    #[prop_or_default]
    pub on_select_index: Callback<i32>,
}

/// Select that keeps its own selection.
#[function_component(SelectStateful)]
pub fn select_stateful(props: &SelectStatefulProps) -> Html {
    let state = {
        let options = props.options.clone();
        let selected = props.selected.clone();
        let reset = props.reset_on_options_change;
        use_reducer(move || {
            let state = SelectState::new(options, selected);
            if reset {
                state.resetting_on_options_change()
            } else {
                state
            }
        })
    };

    // Report the pre-selected first option once.
    {
        let state = state.clone();
        let on_select = props.on_select.clone();
        let had_selection = !props.selected.is_empty();
        use_effect_with_deps(
            move |_| {
                if !had_selection && !state.selected.is_empty() {
                    on_select.emit(state.selected.clone());
                }
                || ()
            },
            (),
        );
    }

    {
        let state = state.clone();
        let on_select = props.on_select.clone();
        use_effect_with_deps(
            move |options: &Vec<SelectOption>| {
                let (_, reported) = state.apply(SelectAction::SetOptions(options.clone()));
                state.dispatch(SelectAction::SetOptions(options.clone()));
                if let Some(values) = reported {
                    on_select.emit(values);
                }
                || ()
            },
            props.options.clone(),
        );
    }

    let on_select = {
        let state = state.clone();
        let forward = props.on_select.clone();
        Callback::from(move |values: Vec<String>| {
            state.dispatch(SelectAction::Select(values.clone()));
            forward.emit(values);
        })
    };

    html! {
        <Select
            options={state.options.clone()}
            groups={props.groups.clone()}
            selected={state.selected.clone()}
            multiple={props.multiple}
            size={props.size}
            class={props.class.clone()}
            {on_select}
            on_select_index={props.on_select_index.clone()}
        />
    }
}

/// Props for [`ThemeToggleLink`].
#[derive(Properties, PartialEq)]
pub struct ThemeToggleLinkProps {
    /// Link title.
    #[prop_or(AttrValue::Static("toggle theme"))]
    pub title: AttrValue,
    /// Extra classes.
    #[prop_or_default]
    pub class: Classes,
    /// Link content.
    #[prop_or_default]
    pub children: Children,
}

/// Link that flips between the system theme and its opposite.
///
/// A stored choice that matches the system preference is removed, so system
/// changes keep applying until the user overrides them again.
#[function_component(ThemeToggleLink)]
pub fn theme_toggle_link(props: &ThemeToggleLinkProps) -> Html {
    use_effect_with_deps(
        |_| {
            theme::sync();
            let watch = SystemThemeWatch::new(Callback::from(|_prefers_dark: bool| {
                theme::sync();
            }));
            move || drop(watch)
        },
        (),
    );

    let onclick = Callback::from(|_: MouseEvent| {
        let target = toggle_target(theme::load_stored(), theme::system_prefers_dark());
        theme::store(target);
        theme::sync();
    });

    html! {
        <a class={props.class.clone()} title={props.title.clone()} {onclick}>
            {for props.children.iter()}
        </a>
    }
}
