//! Self-healing realtime channel over a message socket.
//!
//! # Design
//! - The wrapper adds no states of its own; [`ReadyState`] mirrors the socket.
//! - On close, a [`Countdown`] from `reconnect_delay_secs` to zero drives the
//!   reconnect. Each tick is published through `on_all` for status displays.
//! - Every connect bumps a generation counter. Events tagged with an older
//!   generation come from a superseded socket and are dropped.
//! - No borrow of the channel state is held while user callbacks run.

use crate::core::countdown::{Countdown, CountdownConfig};
use crate::core::scheduler::Scheduler;
use crate::core::util::try_parse_json;
use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use thiserror::Error;
use yew::Callback;

/// Default delay before reconnecting, in seconds.
pub const DEFAULT_RECONNECT_DELAY_SECS: i64 = 5;

const RECONNECT_TICK_MS: u32 = 1_000;

/// Connection state as reported by the underlying socket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReadyState {
    /// Handshake in progress.
    Connecting,
    /// Ready to send and receive.
    Open,
    /// Close handshake in progress.
    Closing,
    /// Closed or never opened.
    Closed,
}

impl ReadyState {
    /// Numeric code used by browser sockets.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Connecting => 0,
            Self::Open => 1,
            Self::Closing => 2,
            Self::Closed => 3,
        }
    }

    /// Map a browser ready-state code; unknown codes read as closed.
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            0 => Self::Connecting,
            1 => Self::Open,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }

    /// Upper-case label for status displays.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Connecting => "CONNECTING",
            Self::Open => "OPEN",
            Self::Closing => "CLOSING",
            Self::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outbound message.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// Bare text, sent as `{"text": …}`.
    Text(String),
    /// Structured value, sent as-is unless it is a bare string.
    Json(Value),
}

impl Payload {
    /// Serialize to the wire representation.
    ///
    /// # Errors
    /// Returns [`ChannelError::Serialize`] when the value cannot be encoded.
    pub fn to_wire(&self) -> Result<String, ChannelError> {
        let encoded = match self {
            Self::Text(text) | Self::Json(Value::String(text)) => {
                serde_json::to_string(&serde_json::json!({ "text": text }))?
            }
            Self::Json(value) => serde_json::to_string(value)?,
        };
        Ok(encoded)
    }

    /// Build a structured payload from any serializable value.
    ///
    /// # Errors
    /// Returns [`ChannelError::Serialize`] when the value cannot be converted.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, ChannelError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            other => Self::Json(other),
        }
    }
}

/// Inbound message body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageData {
    /// UTF-8 text frame.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
}

impl MessageData {
    /// Text content, if this is a text frame.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }

    /// Parse a text frame as JSON; binary frames and bad JSON yield `None`.
    #[must_use]
    pub fn json(&self) -> Option<Value> {
        self.as_text()
            .and_then(|text| try_parse_json(text, None::<fn(&serde_json::Error)>))
    }
}

/// Close details reported by the socket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloseInfo {
    /// Close code (1000 for a normal close).
    pub code: u16,
    /// Close reason, possibly empty.
    pub reason: String,
    /// Whether the close handshake completed.
    pub was_clean: bool,
}

/// Event delivered by a connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Handshake completed.
    Open,
    /// Message received.
    Message(MessageData),
    /// Socket closed, locally or by the peer.
    Close(CloseInfo),
    /// Transport error.
    Error(String),
}

impl ChannelEvent {
    /// Short event name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Message(_) => "message",
            Self::Close(_) => "close",
            Self::Error(_) => "error",
        }
    }
}

/// Failures surfaced by the channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The current connection cannot carry messages.
    #[error("connection is {0}, not OPEN")]
    NotOpen(ReadyState),
    /// The payload could not be encoded.
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The transport refused to create a connection.
    #[error("connect to {url} failed: {message}")]
    Connect {
        /// Target address.
        url: String,
        /// Transport-provided detail.
        message: String,
    },
    /// The transport rejected a write.
    #[error("send failed: {0}")]
    Send(String),
}

/// Where a connection reports its events.
#[derive(Clone, Debug, PartialEq)]
pub struct EventSink {
    callback: Callback<ChannelEvent>,
}

impl EventSink {
    /// Wrap a callback as an event sink.
    #[must_use]
    pub fn new(callback: Callback<ChannelEvent>) -> Self {
        Self { callback }
    }

    /// Deliver one event.
    pub fn emit(&self, event: ChannelEvent) {
        self.callback.emit(event);
    }
}

/// One live socket.
pub trait Connection {
    /// Current socket state.
    fn ready_state(&self) -> ReadyState;

    /// Write a text frame.
    ///
    /// # Errors
    /// Returns [`ChannelError::Send`] when the socket rejects the write.
    fn send_text(&self, text: &str) -> Result<(), ChannelError>;

    /// Begin the close handshake. The close event arrives through the sink.
    fn close(&self);
}

/// Factory for connections.
pub trait Transport {
    /// Connection type produced by this transport.
    type Connection: Connection;

    /// Open a connection to `url`, reporting its events to `sink`.
    ///
    /// # Errors
    /// Returns [`ChannelError::Connect`] when the connection cannot be created.
    fn connect(&self, url: &str, sink: EventSink) -> Result<Self::Connection, ChannelError>;
}

/// Serializable channel settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    /// Seconds to wait after a close before reconnecting; `<= 0` disables.
    pub reconnect_delay_secs: i64,
    /// Sent once each time a reconnected socket opens.
    pub reconnect_message: Option<Payload>,
    /// Force event logging on or off.
    pub verbose: Option<bool>,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            reconnect_delay_secs: DEFAULT_RECONNECT_DELAY_SECS,
            reconnect_message: None,
            verbose: None,
        }
    }
}

/// Channel settings plus event handlers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChannelOptions {
    /// Reconnect and logging settings.
    pub settings: ChannelSettings,
    /// Socket opened.
    pub on_open: Option<Callback<()>>,
    /// Message received.
    pub on_message: Option<Callback<MessageData>>,
    /// Socket closed.
    pub on_close: Option<Callback<CloseInfo>>,
    /// Transport error.
    pub on_error: Option<Callback<String>>,
    /// Notified, in order, on every event and every reconnect tick.
    pub on_all: Vec<Callback<()>>,
}

impl ChannelOptions {
    /// Replace the reconnect delay.
    #[must_use]
    pub fn reconnect_delay_secs(mut self, secs: i64) -> Self {
        self.settings.reconnect_delay_secs = secs;
        self
    }

    /// Message to send after every successful reconnect.
    #[must_use]
    pub fn reconnect_message(mut self, payload: impl Into<Payload>) -> Self {
        self.settings.reconnect_message = Some(payload.into());
        self
    }

    /// Force event logging on or off.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.settings.verbose = Some(verbose);
        self
    }

    /// Attach the open handler.
    #[must_use]
    pub fn on_open(mut self, callback: Callback<()>) -> Self {
        self.on_open = Some(callback);
        self
    }

    /// Attach the message handler.
    #[must_use]
    pub fn on_message(mut self, callback: Callback<MessageData>) -> Self {
        self.on_message = Some(callback);
        self
    }

    /// Attach the close handler.
    #[must_use]
    pub fn on_close(mut self, callback: Callback<CloseInfo>) -> Self {
        self.on_close = Some(callback);
        self
    }

    /// Attach the error handler.
    #[must_use]
    pub fn on_error(mut self, callback: Callback<String>) -> Self {
        self.on_error = Some(callback);
        self
    }

    /// Append an `on_all` subscriber.
    #[must_use]
    pub fn on_all(mut self, callback: Callback<()>) -> Self {
        self.on_all.push(callback);
        self
    }

    /// Verbose unless forced, or unless any of the four event handlers is set.
    #[must_use]
    pub fn resolved_verbose(&self) -> bool {
        self.settings.verbose.unwrap_or(
            self.on_open.is_none()
                && self.on_message.is_none()
                && self.on_close.is_none()
                && self.on_error.is_none(),
        )
    }
}

struct Handlers {
    on_open: Option<Callback<()>>,
    on_message: Option<Callback<MessageData>>,
    on_close: Option<Callback<CloseInfo>>,
    on_error: Option<Callback<String>>,
}

struct ChannelState<C> {
    connection: Option<C>,
    generation: u64,
    reconnected: bool,
    reconnect_count: u32,
    countdown: Option<Countdown>,
    closed: bool,
}

struct ChannelShared<T: Transport> {
    url: String,
    transport: T,
    scheduler: Rc<dyn Scheduler>,
    handlers: Handlers,
    on_all: RefCell<Vec<Callback<()>>>,
    verbose: bool,
    reconnect_delay_secs: u32,
    reconnect_message: Option<Payload>,
    state: RefCell<ChannelState<T::Connection>>,
}

impl<T: Transport> Drop for ChannelShared<T> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if let Some(countdown) = state.countdown.take() {
            countdown.stop();
        }
        if let Some(connection) = state.connection.take() {
            if matches!(
                connection.ready_state(),
                ReadyState::Connecting | ReadyState::Open
            ) {
                connection.close();
            }
        }
    }
}

/// Reconnecting realtime channel bound to one address.
///
/// Cloning shares the channel. The socket is closed once the last handle is
/// dropped.
pub struct RealtimeChannel<T: Transport> {
    shared: Rc<ChannelShared<T>>,
}

impl<T: Transport> Clone for RealtimeChannel<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: Transport + 'static> RealtimeChannel<T> {
    /// Create the channel and open its first connection.
    #[must_use]
    pub fn connect(
        url: impl Into<String>,
        options: ChannelOptions,
        transport: T,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        let verbose = options.resolved_verbose();
        let ChannelOptions {
            settings,
            on_open,
            on_message,
            on_close,
            on_error,
            on_all,
        } = options;
        let reconnect_delay_secs = u32::try_from(settings.reconnect_delay_secs.max(0))
            .unwrap_or(u32::MAX);
        let channel = Self {
            shared: Rc::new(ChannelShared {
                url: url.into(),
                transport,
                scheduler,
                handlers: Handlers {
                    on_open,
                    on_message,
                    on_close,
                    on_error,
                },
                on_all: RefCell::new(on_all),
                verbose,
                reconnect_delay_secs,
                reconnect_message: settings.reconnect_message,
                state: RefCell::new(ChannelState {
                    connection: None,
                    generation: 0,
                    reconnected: false,
                    reconnect_count: 0,
                    countdown: None,
                    closed: false,
                }),
            }),
        };
        establish(&channel.shared, false);
        channel
    }

    /// Serialize `payload` and write it to the current connection.
    ///
    /// # Errors
    /// Returns [`ChannelError::NotOpen`] when the socket is not open,
    /// [`ChannelError::Serialize`] for unencodable payloads, or the
    /// transport's [`ChannelError::Send`].
    pub fn send(&self, payload: impl Into<Payload>) -> Result<(), ChannelError> {
        send_payload(&self.shared, &payload.into())
    }

    /// Cancel any pending countdown and reconnect immediately.
    pub fn reconnect_now(&self) {
        self.shared.state.borrow_mut().closed = false;
        reconnect(&self.shared);
    }

    /// Cancel a pending reconnect without connecting.
    pub fn reconnect_cancel(&self) {
        let countdown = {
            let mut state = self.shared.state.borrow_mut();
            state.reconnect_count = 0;
            state.countdown.take()
        };
        if let Some(countdown) = countdown {
            countdown.stop();
            if self.shared.verbose {
                tracing::info!(url = %self.shared.url, "reconnect cancelled");
            }
        }
    }

    /// Close the socket and disable reconnection.
    pub fn close(&self) {
        let countdown = {
            let mut state = self.shared.state.borrow_mut();
            state.closed = true;
            state.reconnect_count = 0;
            state.countdown.take()
        };
        if let Some(countdown) = countdown {
            countdown.stop();
        }
        let state = self.shared.state.borrow();
        if let Some(connection) = state.connection.as_ref() {
            connection.close();
        }
    }

    /// Register another `on_all` subscriber.
    pub fn subscribe_all(&self, callback: Callback<()>) {
        self.shared.on_all.borrow_mut().push(callback);
    }

    /// State of the current connection.
    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        self.shared
            .state
            .borrow()
            .connection
            .as_ref()
            .map_or(ReadyState::Closed, Connection::ready_state)
    }

    /// Label of the current connection state.
    #[must_use]
    pub fn state_label(&self) -> &'static str {
        self.ready_state().label()
    }

    /// Seconds left before the pending reconnect; zero when none is pending.
    #[must_use]
    pub fn reconnect_count(&self) -> u32 {
        self.shared.state.borrow().reconnect_count
    }

    /// Whether a reconnect countdown is running.
    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.shared
            .state
            .borrow()
            .countdown
            .as_ref()
            .is_some_and(Countdown::is_running)
    }

    /// Whether reconnection is configured.
    #[must_use]
    pub fn reconnect_enabled(&self) -> bool {
        self.shared.reconnect_delay_secs > 0
    }

    /// Target address.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.shared.url
    }
}

fn establish<T: Transport + 'static>(shared: &Rc<ChannelShared<T>>, reconnected: bool) {
    let (generation, previous) = {
        let mut state = shared.state.borrow_mut();
        state.generation = state.generation.wrapping_add(1);
        state.reconnected = reconnected;
        (state.generation, state.connection.take())
    };
    if let Some(previous) = previous {
        if matches!(
            previous.ready_state(),
            ReadyState::Connecting | ReadyState::Open
        ) {
            previous.close();
        }
    }

    let weak: Weak<ChannelShared<T>> = Rc::downgrade(shared);
    let sink = EventSink::new(Callback::from(move |event: ChannelEvent| {
        if let Some(shared) = weak.upgrade() {
            handle_event(&shared, generation, event);
        }
    }));

    if shared.verbose {
        tracing::info!(url = %shared.url, reconnected, "realtime channel connecting");
    }
    match shared.transport.connect(&shared.url, sink) {
        Ok(connection) => {
            let mut state = shared.state.borrow_mut();
            if state.generation == generation {
                state.connection = Some(connection);
            }
        }
        Err(err) => {
            tracing::warn!(url = %shared.url, error = %err, "realtime channel connect failed");
            if let Some(on_error) = &shared.handlers.on_error {
                on_error.emit(err.to_string());
            }
            notify_all(shared);
        }
    }
}

fn handle_event<T: Transport + 'static>(
    shared: &Rc<ChannelShared<T>>,
    generation: u64,
    event: ChannelEvent,
) {
    let (current, reconnected) = {
        let state = shared.state.borrow();
        (state.generation == generation, state.reconnected)
    };
    if !current {
        tracing::debug!(url = %shared.url, event = event.kind(), "ignoring event from superseded connection");
        return;
    }
    if shared.verbose {
        tracing::info!(url = %shared.url, event = event.kind(), "realtime channel event");
    }

    let handlers = &shared.handlers;
    match &event {
        ChannelEvent::Open => {
            if let Some(on_open) = &handlers.on_open {
                on_open.emit(());
            }
        }
        ChannelEvent::Message(data) => {
            if let Some(on_message) = &handlers.on_message {
                on_message.emit(data.clone());
            }
        }
        ChannelEvent::Close(info) => {
            if let Some(on_close) = &handlers.on_close {
                on_close.emit(info.clone());
            }
        }
        ChannelEvent::Error(message) => {
            if let Some(on_error) = &handlers.on_error {
                on_error.emit(message.clone());
            }
        }
    }
    notify_all(shared);

    // Handlers may have closed the channel or replaced the connection.
    let (current, closed) = {
        let state = shared.state.borrow();
        (state.generation == generation, state.closed)
    };
    if !current {
        return;
    }
    match event {
        ChannelEvent::Open if reconnected => {
            if let Some(message) = &shared.reconnect_message {
                if let Err(err) = send_payload(shared, message) {
                    tracing::warn!(url = %shared.url, error = %err, "reconnect message not sent");
                }
            }
        }
        ChannelEvent::Close(_) if !closed && shared.reconnect_delay_secs > 0 => {
            start_countdown(shared);
        }
        _ => {}
    }
}

fn notify_all<T: Transport>(shared: &ChannelShared<T>) {
    let subscribers = shared.on_all.borrow().clone();
    for subscriber in subscribers {
        subscriber.emit(());
    }
}

fn start_countdown<T: Transport + 'static>(shared: &Rc<ChannelShared<T>>) {
    let previous = shared.state.borrow_mut().countdown.take();
    if let Some(previous) = previous {
        previous.stop();
    }

    let on_tick = {
        let weak = Rc::downgrade(shared);
        Callback::from(move |(count, _end): (i64, i64)| {
            if let Some(shared) = weak.upgrade() {
                shared.state.borrow_mut().reconnect_count = u32::try_from(count).unwrap_or(0);
                notify_all(&shared);
            }
        })
    };
    let on_done = {
        let weak = Rc::downgrade(shared);
        Callback::from(move |()| {
            if let Some(shared) = weak.upgrade() {
                reconnect(&shared);
            }
        })
    };
    let config = CountdownConfig::new(i64::from(shared.reconnect_delay_secs), 0)
        .tick_rate_ms(RECONNECT_TICK_MS)
        .verbose(shared.verbose)
        .on_tick(on_tick)
        .on_done(on_done);
    let countdown = Countdown::start(config.running(false), Rc::clone(&shared.scheduler));
    shared.state.borrow_mut().countdown = Some(countdown.clone());
    countdown.resume();
}

fn reconnect<T: Transport + 'static>(shared: &Rc<ChannelShared<T>>) {
    let countdown = {
        let mut state = shared.state.borrow_mut();
        state.reconnect_count = 0;
        state.countdown.take()
    };
    if let Some(countdown) = countdown {
        countdown.stop();
    }
    establish(shared, true);
}

fn send_payload<T: Transport>(shared: &ChannelShared<T>, payload: &Payload) -> Result<(), ChannelError> {
    if shared.verbose {
        tracing::info!(url = %shared.url, ?payload, "realtime channel send");
    }
    let text = payload.to_wire()?;
    let state = shared.state.borrow();
    let ready = state
        .connection
        .as_ref()
        .map_or(ReadyState::Closed, Connection::ready_state);
    if ready != ReadyState::Open {
        tracing::debug!(url = %shared.url, state = %ready, "send skipped");
        return Err(ChannelError::NotOpen(ready));
    }
    match state.connection.as_ref() {
        Some(connection) => connection.send_text(&text),
        None => Err(ChannelError::NotOpen(ReadyState::Closed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::ManualScheduler;
    use std::cell::Cell;

    #[derive(Clone)]
    struct FakeSocket {
        url: String,
        state: Rc<Cell<ReadyState>>,
        sent: Rc<RefCell<Vec<String>>>,
        sink: EventSink,
    }

    impl FakeSocket {
        fn open(&self) {
            self.state.set(ReadyState::Open);
            self.sink.emit(ChannelEvent::Open);
        }

        fn receive(&self, text: &str) {
            self.sink
                .emit(ChannelEvent::Message(MessageData::Text(text.to_string())));
        }

        fn fail(&self, message: &str) {
            self.sink.emit(ChannelEvent::Error(message.to_string()));
        }

        fn drop_connection(&self) {
            self.state.set(ReadyState::Closed);
            self.sink.emit(ChannelEvent::Close(CloseInfo {
                code: 1006,
                reason: String::new(),
                was_clean: false,
            }));
        }
    }

    impl Connection for FakeSocket {
        fn ready_state(&self) -> ReadyState {
            self.state.get()
        }

        fn send_text(&self, text: &str) -> Result<(), ChannelError> {
            self.sent.borrow_mut().push(text.to_string());
            Ok(())
        }

        fn close(&self) {
            self.state.set(ReadyState::Closing);
        }
    }

    #[derive(Clone, Default)]
    struct FakeTransport {
        sockets: Rc<RefCell<Vec<FakeSocket>>>,
        refuse: Rc<Cell<bool>>,
    }

    impl FakeTransport {
        fn socket(&self, index: usize) -> FakeSocket {
            self.sockets.borrow()[index].clone()
        }

        fn count(&self) -> usize {
            self.sockets.borrow().len()
        }
    }

    impl Transport for FakeTransport {
        type Connection = FakeSocket;

        fn connect(&self, url: &str, sink: EventSink) -> Result<FakeSocket, ChannelError> {
            if self.refuse.get() {
                return Err(ChannelError::Connect {
                    url: url.to_string(),
                    message: "invalid url".to_string(),
                });
            }
            let socket = FakeSocket {
                url: url.to_string(),
                state: Rc::new(Cell::new(ReadyState::Connecting)),
                sent: Rc::new(RefCell::new(Vec::new())),
                sink,
            };
            self.sockets.borrow_mut().push(socket.clone());
            Ok(socket)
        }
    }

    fn counter() -> (Rc<Cell<u32>>, Callback<()>) {
        let hits = Rc::new(Cell::new(0));
        let callback = {
            let hits = hits.clone();
            Callback::from(move |()| hits.set(hits.get() + 1))
        };
        (hits, callback)
    }

    fn channel(
        options: ChannelOptions,
    ) -> (RealtimeChannel<FakeTransport>, FakeTransport, ManualScheduler) {
        let transport = FakeTransport::default();
        let scheduler = ManualScheduler::new();
        let channel = RealtimeChannel::connect(
            "ws://example.test/live",
            options,
            transport.clone(),
            Rc::new(scheduler.clone()),
        );
        (channel, transport, scheduler)
    }

    #[test]
    fn events_reach_handlers_then_all_subscribers_in_order() {
        let log = Rc::new(RefCell::new(Vec::<String>::new()));
        let push = |tag: &'static str| {
            let log = log.clone();
            Callback::from(move |()| log.borrow_mut().push(tag.to_string()))
        };
        let on_message = {
            let log = log.clone();
            Callback::from(move |data: MessageData| {
                log.borrow_mut()
                    .push(format!("message:{}", data.as_text().unwrap_or_default()));
            })
        };
        let options = ChannelOptions::default()
            .on_open(push("open"))
            .on_message(on_message)
            .on_all(push("all-1"))
            .on_all(push("all-2"));
        let (channel, transport, _scheduler) = channel(options);

        assert_eq!(channel.ready_state(), ReadyState::Connecting);
        let socket = transport.socket(0);
        assert_eq!(socket.url, "ws://example.test/live");
        socket.open();
        socket.receive("hi");

        assert_eq!(channel.state_label(), "OPEN");
        assert_eq!(
            *log.borrow(),
            vec!["open", "all-1", "all-2", "message:hi", "all-1", "all-2"]
        );
    }

    #[test]
    fn close_counts_down_then_reconnects() {
        let ticks = Rc::new(RefCell::new(Vec::new()));
        let (channel, transport, scheduler) = channel(ChannelOptions::default().reconnect_delay_secs(3));
        {
            let ticks = ticks.clone();
            let observed = channel.clone();
            channel.subscribe_all(Callback::from(move |()| {
                ticks.borrow_mut().push(observed.reconnect_count());
            }));
        }
        transport.socket(0).open();
        transport.socket(0).drop_connection();

        assert!(channel.reconnect_pending());
        assert_eq!(channel.reconnect_count(), 3);
        scheduler.advance(2_000);
        assert_eq!(transport.count(), 1);
        scheduler.advance(1_000);
        assert_eq!(transport.count(), 2);
        assert_eq!(channel.reconnect_count(), 0);
        assert!(!channel.reconnect_pending());
        assert_eq!(channel.ready_state(), ReadyState::Connecting);

        // open, close, then ticks 3, 2, 1
        assert_eq!(*ticks.borrow(), vec![0, 0, 3, 2, 1]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn reconnect_cancel_prevents_new_connection() {
        let (channel, transport, scheduler) = channel(ChannelOptions::default().reconnect_delay_secs(3));
        transport.socket(0).drop_connection();
        scheduler.advance(1_000);
        assert_eq!(channel.reconnect_count(), 2);

        channel.reconnect_cancel();
        assert_eq!(channel.reconnect_count(), 0);
        scheduler.advance(60_000);
        assert_eq!(transport.count(), 1);
        assert_eq!(channel.ready_state(), ReadyState::Closed);
    }

    #[test]
    fn non_positive_delay_disables_reconnect() {
        for delay in [0, -4] {
            let (channel, transport, scheduler) =
                channel(ChannelOptions::default().reconnect_delay_secs(delay));
            assert!(!channel.reconnect_enabled());
            transport.socket(0).drop_connection();
            scheduler.advance(60_000);
            assert_eq!(transport.count(), 1);
            assert!(!channel.reconnect_pending());
        }
    }

    #[test]
    fn send_wraps_text_and_passes_json_through() {
        let (channel, transport, _scheduler) = channel(ChannelOptions::default());
        transport.socket(0).open();
        channel.send("hello").unwrap();
        channel
            .send(serde_json::json!({ "op": "subscribe", "topic": "news" }))
            .unwrap();
        assert_eq!(
            *transport.socket(0).sent.borrow(),
            vec![
                r#"{"text":"hello"}"#.to_string(),
                r#"{"op":"subscribe","topic":"news"}"#.to_string(),
            ]
        );
    }

    #[test]
    fn bare_json_strings_use_text_envelope() {
        let (channel, transport, _scheduler) = channel(ChannelOptions::default());
        transport.socket(0).open();
        channel.send(serde_json::json!("hi")).unwrap();
        channel
            .send(Payload::Json(Value::String("there".into())))
            .unwrap();
        assert_eq!(
            *transport.socket(0).sent.borrow(),
            vec![r#"{"text":"hi"}"#.to_string(), r#"{"text":"there"}"#.to_string()]
        );
    }

    #[test]
    fn send_before_open_is_rejected_without_writing() {
        let (channel, transport, _scheduler) = channel(ChannelOptions::default());
        let err = channel.send("early").unwrap_err();
        assert!(matches!(err, ChannelError::NotOpen(ReadyState::Connecting)));
        assert!(transport.socket(0).sent.borrow().is_empty());
    }

    #[test]
    fn reconnect_message_is_sent_only_after_reconnect() {
        let options = ChannelOptions::default()
            .reconnect_delay_secs(1)
            .reconnect_message("resume");
        let (_channel, transport, scheduler) = channel(options);
        transport.socket(0).open();
        assert!(transport.socket(0).sent.borrow().is_empty());

        transport.socket(0).drop_connection();
        scheduler.advance(1_000);
        let second = transport.socket(1);
        second.open();
        assert_eq!(*second.sent.borrow(), vec![r#"{"text":"resume"}"#.to_string()]);
    }

    #[test]
    fn reconnect_now_supersedes_old_socket() {
        let (opened, on_open) = counter();
        let (closed, on_close_all) = counter();
        let on_close = Callback::from(move |_info: CloseInfo| on_close_all.emit(()));
        let options = ChannelOptions::default()
            .reconnect_delay_secs(2)
            .on_open(on_open)
            .on_close(on_close);
        let (channel, transport, scheduler) = channel(options);
        let first = transport.socket(0);
        first.open();

        channel.reconnect_now();
        assert_eq!(first.ready_state(), ReadyState::Closing);
        first.drop_connection();
        first.open();
        assert_eq!(closed.get(), 0);
        assert_eq!(opened.get(), 1);

        scheduler.advance(10_000);
        assert_eq!(transport.count(), 2);
        transport.socket(1).open();
        assert_eq!(opened.get(), 2);
    }

    #[test]
    fn cancel_during_first_tick_prevents_reconnect() {
        let (channel, transport, scheduler) = channel(ChannelOptions::default().reconnect_delay_secs(3));
        {
            let observed = channel.clone();
            channel.subscribe_all(Callback::from(move |()| {
                if observed.reconnect_count() == 3 {
                    observed.reconnect_cancel();
                }
            }));
        }
        transport.socket(0).drop_connection();

        assert!(!channel.reconnect_pending());
        assert_eq!(channel.reconnect_count(), 0);
        scheduler.advance(60_000);
        assert_eq!(transport.count(), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn close_from_close_handler_disables_reconnect() {
        let slot: Rc<RefCell<Option<RealtimeChannel<FakeTransport>>>> = Rc::default();
        let on_close = {
            let slot = slot.clone();
            Callback::from(move |_info: CloseInfo| {
                if let Some(channel) = slot.borrow().as_ref() {
                    channel.close();
                }
            })
        };
        let options = ChannelOptions::default()
            .reconnect_delay_secs(1)
            .on_close(on_close);
        let (channel, transport, scheduler) = channel(options);
        *slot.borrow_mut() = Some(channel.clone());

        transport.socket(0).open();
        transport.socket(0).drop_connection();
        assert!(!channel.reconnect_pending());
        scheduler.advance(10_000);
        assert_eq!(transport.count(), 1);
    }

    #[test]
    fn socket_errors_reach_error_handler_then_all_subscribers() {
        let log = Rc::new(RefCell::new(Vec::<String>::new()));
        let on_error = {
            let log = log.clone();
            Callback::from(move |message: String| log.borrow_mut().push(format!("error:{message}")))
        };
        let on_all = {
            let log = log.clone();
            Callback::from(move |()| log.borrow_mut().push("all".to_string()))
        };
        let options = ChannelOptions::default().on_error(on_error).on_all(on_all);
        let (channel, transport, _scheduler) = channel(options);
        transport.socket(0).fail("handshake refused");

        assert_eq!(*log.borrow(), vec!["error:handshake refused", "all"]);
        assert_eq!(channel.ready_state(), ReadyState::Connecting);
    }

    #[test]
    fn late_close_from_replaced_socket_is_ignored() {
        let (closed, on_close_all) = counter();
        let on_close = Callback::from(move |_info: CloseInfo| on_close_all.emit(()));
        let options = ChannelOptions::default()
            .reconnect_delay_secs(1)
            .on_close(on_close);
        let (channel, transport, scheduler) = channel(options);
        let first = transport.socket(0);
        first.open();
        first.drop_connection();
        scheduler.advance(1_000);
        assert_eq!(transport.count(), 2);
        assert_eq!(closed.get(), 1);

        let second = transport.socket(1);
        second.open();
        first.drop_connection();
        first.fail("late");
        assert_eq!(closed.get(), 1);
        assert!(!channel.reconnect_pending());
        assert_eq!(channel.ready_state(), ReadyState::Open);
        scheduler.advance(10_000);
        assert_eq!(transport.count(), 2);
    }

    #[test]
    fn reconnect_now_cancels_pending_countdown() {
        let (channel, transport, scheduler) = channel(ChannelOptions::default().reconnect_delay_secs(5));
        transport.socket(0).drop_connection();
        assert!(channel.reconnect_pending());
        channel.reconnect_now();
        assert_eq!(transport.count(), 2);
        assert!(!channel.reconnect_pending());
        scheduler.advance(60_000);
        assert_eq!(transport.count(), 2);
    }

    #[test]
    fn close_disables_reconnect() {
        let (channel, transport, scheduler) = channel(ChannelOptions::default().reconnect_delay_secs(1));
        let socket = transport.socket(0);
        socket.open();
        channel.close();
        assert_eq!(channel.ready_state(), ReadyState::Closing);
        socket.drop_connection();
        scheduler.advance(10_000);
        assert_eq!(transport.count(), 1);
    }

    #[test]
    fn connect_failure_is_reported_to_error_handler() {
        let transport = FakeTransport::default();
        transport.refuse.set(true);
        let errors = Rc::new(RefCell::new(Vec::new()));
        let on_error = {
            let errors = errors.clone();
            Callback::from(move |message: String| errors.borrow_mut().push(message))
        };
        let channel = RealtimeChannel::connect(
            "not a url",
            ChannelOptions::default().on_error(on_error),
            transport,
            Rc::new(ManualScheduler::new()),
        );
        assert_eq!(channel.ready_state(), ReadyState::Closed);
        assert_eq!(errors.borrow().len(), 1);
        assert!(errors.borrow()[0].contains("not a url"));
    }

    #[test]
    fn verbose_defaults_follow_handlers() {
        assert!(ChannelOptions::default().resolved_verbose());
        let (_, on_all) = counter();
        assert!(ChannelOptions::default().on_all(on_all).resolved_verbose());
        let (_, on_open) = counter();
        let quiet = ChannelOptions::default().on_open(on_open);
        assert!(!quiet.resolved_verbose());
        assert!(quiet.verbose(true).resolved_verbose());
    }

    #[test]
    fn ready_state_codes_round_trip() {
        for state in [
            ReadyState::Connecting,
            ReadyState::Open,
            ReadyState::Closing,
            ReadyState::Closed,
        ] {
            assert_eq!(ReadyState::from_code(state.code()), state);
        }
        assert_eq!(ReadyState::from_code(42), ReadyState::Closed);
        assert_eq!(ReadyState::Closing.to_string(), "CLOSING");
    }

    #[test]
    fn settings_deserialize_reconnect_message() {
        let settings: ChannelSettings =
            serde_json::from_str(r#"{"reconnect_message": "hello"}"#).unwrap();
        assert_eq!(settings.reconnect_delay_secs, 5);
        assert_eq!(settings.reconnect_message, Some(Payload::Text("hello".into())));

        let settings: ChannelSettings =
            serde_json::from_str(r#"{"reconnect_delay_secs": 0, "reconnect_message": {"op": "sync"}}"#)
                .unwrap();
        assert_eq!(settings.reconnect_delay_secs, 0);
        assert_eq!(
            settings.reconnect_message,
            Some(Payload::Json(serde_json::json!({ "op": "sync" })))
        );
    }

    #[test]
    fn message_json_helper_parses_text_frames() {
        let data = MessageData::Text(r#"{"n": 1}"#.into());
        assert_eq!(data.json(), Some(serde_json::json!({ "n": 1 })));
        assert_eq!(MessageData::Binary(vec![1, 2]).json(), None);
        assert_eq!(MessageData::Text("nope".into()).json(), None);
    }
}
