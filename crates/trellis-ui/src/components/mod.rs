//! Yew components and hooks over the `core` state types.

pub mod form;
pub mod grid;
pub mod hooks;
pub mod pagination;

pub use form::{Input, InputStateful, Select, SelectStateful, ThemeToggleLink};
pub use grid::{Grid, PagedGrid};
pub use hooks::{
    UseCountdownHandle, UseRealtimeChannelHandle, use_countdown, use_realtime_channel,
};
pub use pagination::{Pagination, PaginationStateful};
