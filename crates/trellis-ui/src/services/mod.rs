//! Browser bindings for the core seams: timers, sockets, theme storage and
//! console logging.

pub mod logging;
pub mod scheduler;
pub mod theme;
pub mod websocket;

pub use scheduler::BrowserScheduler;
pub use websocket::{WebSocketConnection, WebSocketTransport};
