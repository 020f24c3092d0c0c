//! Form control state: option grouping, input and select reducers.

use std::rc::Rc;
use yew::Reducible;

/// One `<option>` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    /// Submitted value.
    pub value: String,
    /// Visible label.
    pub label: String,
}

impl SelectOption {
    /// Option whose label differs from its value.
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

impl From<&str> for SelectOption {
    fn from(value: &str) -> Self {
        Self::new(value, value)
    }
}

impl From<String> for SelectOption {
    fn from(value: String) -> Self {
        Self::new(value.clone(), value)
    }
}

impl From<(&str, &str)> for SelectOption {
    fn from((value, label): (&str, &str)) -> Self {
        Self::new(value, label)
    }
}

/// Labelled run of options rendered as an `<optgroup>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionGroup {
    /// Group label.
    pub label: String,
    /// Options in the group.
    pub options: Vec<SelectOption>,
}

/// Options split into groups plus the ungrouped remainder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupedOptions {
    /// Groups in the order requested.
    pub groups: Vec<OptionGroup>,
    /// Options left over after every group took its share.
    pub rest: Vec<SelectOption>,
}

/// Hand each `(label, count)` group the next `count` options in order.
#[must_use]
pub fn group_options(options: &[SelectOption], groups: &[(String, usize)]) -> GroupedOptions {
    let mut offset = 0;
    let groups = groups
        .iter()
        .map(|(label, count)| {
            let start = offset.min(options.len());
            let end = offset.saturating_add(*count).min(options.len());
            offset = end;
            OptionGroup {
                label: label.clone(),
                options: options[start..end].to_vec(),
            }
        })
        .collect();
    GroupedOptions {
        groups,
        rest: options[offset.min(options.len())..].to_vec(),
    }
}

/// Text input state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    /// Current text.
    pub value: String,
}

impl Reducible for InputState {
    type Action = String;

    fn reduce(self: Rc<Self>, value: Self::Action) -> Rc<Self> {
        if self.value == value {
            self
        } else {
            Rc::new(Self { value })
        }
    }
}

/// Select control state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectState {
    /// Available options.
    pub options: Vec<SelectOption>,
    /// Selected values.
    pub selected: Vec<String>,
    /// Reset the selection whenever the option list changes.
    pub reset_on_options_change: bool,
}

/// Changes a select control can request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectAction {
    /// User picked these values.
    Select(Vec<String>),
    /// New option list arrived.
    SetOptions(Vec<SelectOption>),
}

impl SelectState {
    /// State with the first option pre-selected when nothing is chosen.
    #[must_use]
    pub fn new(options: Vec<SelectOption>, selected: Vec<String>) -> Self {
        let mut state = Self {
            options,
            selected,
            reset_on_options_change: false,
        };
        if state.selected.is_empty() {
            state.selected = state.first_value();
        }
        state
    }

    /// Enable resetting on option changes.
    #[must_use]
    pub fn resetting_on_options_change(mut self) -> Self {
        self.reset_on_options_change = true;
        self
    }

    fn first_value(&self) -> Vec<String> {
        self.options
            .first()
            .map(|option| vec![option.value.clone()])
            .unwrap_or_default()
    }

    /// Apply an action. The second value is the selection to report to the
    /// caller, when the selection changed because of a reset.
    #[must_use]
    pub fn apply(&self, action: SelectAction) -> (Self, Option<Vec<String>>) {
        let mut next = self.clone();
        match action {
            SelectAction::Select(values) => {
                next.selected = values;
                (next, None)
            }
            SelectAction::SetOptions(options) => {
                if options == next.options {
                    return (next, None);
                }
                next.options = options;
                if next.reset_on_options_change && !next.options.is_empty() {
                    next.selected = next.first_value();
                    let reported = next.selected.clone();
                    (next, Some(reported))
                } else {
                    (next, None)
                }
            }
        }
    }

    /// Whether `value` is selected.
    #[must_use]
    pub fn is_selected(&self, value: &str) -> bool {
        self.selected.iter().any(|selected| selected == value)
    }
}

impl Reducible for SelectState {
    type Action = SelectAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let (next, _) = self.apply(action);
        if next == *self { self } else { Rc::new(next) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(values: &[&str]) -> Vec<SelectOption> {
        values.iter().copied().map(SelectOption::from).collect()
    }

    #[test]
    fn groups_take_options_in_order() {
        let options = opts(&["a", "b", "c", "d", "e"]);
        let grouped = group_options(&options, &[("first".into(), 2), ("second".into(), 1)]);
        assert_eq!(grouped.groups[0].options, opts(&["a", "b"]));
        assert_eq!(grouped.groups[1].label, "second");
        assert_eq!(grouped.groups[1].options, opts(&["c"]));
        assert_eq!(grouped.rest, opts(&["d", "e"]));
    }

    #[test]
    fn oversized_groups_stop_at_the_end() {
        let options = opts(&["a", "b"]);
        let grouped = group_options(&options, &[("all".into(), 5), ("none".into(), 2)]);
        assert_eq!(grouped.groups[0].options.len(), 2);
        assert!(grouped.groups[1].options.is_empty());
        assert!(grouped.rest.is_empty());
    }

    #[test]
    fn tuple_options_keep_labels() {
        let option = SelectOption::from(("nl", "Dutch"));
        assert_eq!(option.value, "nl");
        assert_eq!(option.label, "Dutch");
    }

    #[test]
    fn first_option_is_preselected() {
        let state = SelectState::new(opts(&["x", "y"]), Vec::new());
        assert_eq!(state.selected, vec!["x"]);
        assert!(state.is_selected("x"));
        let kept = SelectState::new(opts(&["x", "y"]), vec!["y".into()]);
        assert_eq!(kept.selected, vec!["y"]);
        assert!(SelectState::new(Vec::new(), Vec::new()).selected.is_empty());
    }

    #[test]
    fn option_changes_reset_only_when_enabled() {
        let plain = SelectState::new(opts(&["x", "y"]), vec!["y".into()]);
        let (next, reported) = plain.apply(SelectAction::SetOptions(opts(&["p", "q"])));
        assert_eq!(next.selected, vec!["y"]);
        assert!(reported.is_none());

        let resetting = plain.resetting_on_options_change();
        let (next, reported) = resetting.apply(SelectAction::SetOptions(opts(&["p", "q"])));
        assert_eq!(next.selected, vec!["p"]);
        assert_eq!(reported, Some(vec!["p".to_string()]));

        let (_, unchanged) = next.apply(SelectAction::SetOptions(opts(&["p", "q"])));
        assert!(unchanged.is_none());
    }

    #[test]
    fn input_reducer_tracks_value() {
        let state = Rc::new(InputState::default());
        let typed = Rc::clone(&state).reduce("abc".to_string());
        assert_eq!(typed.value, "abc");
        let same = Rc::clone(&typed).reduce("abc".to_string());
        assert!(Rc::ptr_eq(&typed, &same));
    }
}
