//! Small parsing and formatting helpers.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse JSON text, returning `None` (and notifying `on_fail`) on error.
#[must_use]
pub fn try_parse_json<F>(text: &str, on_fail: Option<F>) -> Option<Value>
where
    F: FnOnce(&serde_json::Error),
{
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(err) => {
            if let Some(on_fail) = on_fail {
                on_fail(&err);
            }
            None
        }
    }
}

/// Parse JSON text into `T`.
///
/// Only syntax errors reach `on_fail`; a `null` document or a value of the
/// wrong shape quietly yields `None`.
#[must_use]
pub fn try_parse_json_as<T, F>(text: &str, on_fail: Option<F>) -> Option<T>
where
    T: DeserializeOwned,
    F: FnOnce(&serde_json::Error),
{
    let value = try_parse_json(text, on_fail)?;
    if value.is_null() {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// Join the non-empty items with single spaces.
#[must_use]
pub fn space_delimited<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    items
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tag name and classes parsed from a `tag.class.class` selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    /// Element name; `div` when the selector starts with a class.
    pub tag: String,
    /// Class names in order.
    pub classes: Vec<String>,
}

impl Selector {
    /// Classes joined for a `class` attribute.
    #[must_use]
    pub fn class_attr(&self) -> String {
        self.classes.join(" ")
    }
}

/// Split a `tag.class.class` selector.
#[must_use]
pub fn parse_selector(selector: &str) -> Selector {
    let mut parts = selector.trim().split('.');
    let tag = parts
        .next()
        .filter(|tag| !tag.is_empty())
        .unwrap_or("div")
        .to_string();
    let classes = parts
        .filter(|class| !class.is_empty())
        .map(str::to_string)
        .collect();
    Selector { tag, classes }
}
