//! Theme persistence and system preference access.

use crate::core::theme::{DARK_CLASS, THEME_STORAGE_KEY, ThemeMode, resolve_theme};
use gloo::console;
use gloo::storage::{LocalStorage, Storage};
use gloo::utils::{document_element, window};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{MediaQueryList, MediaQueryListEvent};
use yew::Callback;

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

fn dark_query() -> Option<MediaQueryList> {
    window().match_media(DARK_QUERY).ok().flatten()
}

/// Whether the system asks for a dark theme.
#[must_use]
pub fn system_prefers_dark() -> bool {
    dark_query().is_some_and(|media| media.matches())
}

/// Explicit choice saved in local storage.
#[must_use]
pub fn load_stored() -> Option<ThemeMode> {
    LocalStorage::get::<String>(THEME_STORAGE_KEY)
        .ok()
        .and_then(|value| ThemeMode::parse(&value))
}

/// Persist an explicit choice.
pub fn store(mode: ThemeMode) {
    if let Err(err) = LocalStorage::set(THEME_STORAGE_KEY, mode.as_str()) {
        console::error!("theme storage failed", err.to_string());
    }
}

/// Forget the explicit choice.
pub fn clear_stored() {
    LocalStorage::delete(THEME_STORAGE_KEY);
}

/// Toggle the dark class on the root element.
pub fn apply(mode: ThemeMode) {
    let classes = document_element().class_list();
    if let Err(err) = classes.toggle_with_force(DARK_CLASS, mode.is_dark()) {
        console::error!("theme class update failed", err);
    }
}

/// Resolve the stored choice against the system, clean up storage and apply.
pub fn sync() {
    let resolution = resolve_theme(load_stored(), system_prefers_dark());
    if resolution.clear_stored {
        clear_stored();
    }
    apply(resolution.mode);
}

/// Listener on the system color-scheme query; detached on drop.
pub struct SystemThemeWatch {
    media: MediaQueryList,
    handler: Closure<dyn FnMut(MediaQueryListEvent)>,
}

impl SystemThemeWatch {
    /// Report every system preference change as `prefers_dark`.
    #[must_use]
    pub fn new(on_change: Callback<bool>) -> Option<Self> {
        let media = dark_query()?;
        let handler = Closure::<dyn FnMut(_)>::wrap(Box::new(move |event: MediaQueryListEvent| {
            on_change.emit(event.matches());
        }) as Box<dyn FnMut(_)>);
        if let Err(err) =
            media.add_event_listener_with_callback("change", handler.as_ref().unchecked_ref())
        {
            console::error!("theme listener failed", err);
            return None;
        }
        Some(Self { media, handler })
    }
}

impl Drop for SystemThemeWatch {
    fn drop(&mut self) {
        if let Err(err) = self
            .media
            .remove_event_listener_with_callback("change", self.handler.as_ref().unchecked_ref())
        {
            console::error!("theme listener removal failed", err);
        }
    }
}
