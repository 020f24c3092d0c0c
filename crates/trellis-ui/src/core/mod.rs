//! Core, DOM-free primitives behind the browser widgets.
pub mod channel;
pub mod countdown;
pub mod form;
pub mod grid;
pub mod logging;
pub mod pagination;
pub mod scheduler;
pub mod theme;
pub mod util;
