//! Hooks binding the countdown and the realtime channel to component state.

use crate::core::channel::{
    ChannelError, ChannelOptions, ChannelSettings, Payload, ReadyState, RealtimeChannel,
};
use crate::core::countdown::{Countdown, CountdownConfig, CountdownSettings};
use crate::services::{BrowserScheduler, WebSocketTransport};
use std::cell::RefCell;
use std::rc::Rc;
use yew::prelude::*;

/// Countdown value plus controls.
#[derive(Clone)]
pub struct UseCountdownHandle {
    /// Last ticked value.
    pub current: i64,
    /// Destination reached.
    pub finished: bool,
    countdown: Rc<RefCell<Option<Countdown>>>,
}

impl UseCountdownHandle {
    /// Pause ticking.
    pub fn stop(&self) {
        if let Some(countdown) = self.countdown.borrow().as_ref() {
            countdown.stop();
        }
    }

    /// Continue from the current value.
    pub fn resume(&self) {
        if let Some(countdown) = self.countdown.borrow().as_ref() {
            countdown.resume();
        }
    }

    /// Whether a tick is scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.countdown
            .borrow()
            .as_ref()
            .is_some_and(Countdown::is_running)
    }
}

/// Run a countdown for the lifetime of the component.
///
/// A new countdown starts whenever `settings` change; the previous one is
/// stopped.
#[hook]
pub fn use_countdown(settings: CountdownSettings) -> UseCountdownHandle {
    let current = use_state(move || settings.start);
    let finished = use_state(|| false);
    let countdown = use_mut_ref(|| None::<Countdown>);

    {
        let current = current.clone();
        let finished = finished.clone();
        let countdown = countdown.clone();
        use_effect_with_deps(
            move |settings: &CountdownSettings| {
                finished.set(false);
                let config = CountdownConfig {
                    settings: *settings,
                    ..CountdownConfig::default()
                }
                .on_tick(Callback::from(move |(value, _end): (i64, i64)| current.set(value)))
                .on_done(Callback::from(move |()| finished.set(true)));
                let started = Countdown::start(config, BrowserScheduler::shared());
                *countdown.borrow_mut() = Some(started.clone());
                move || started.stop()
            },
            settings,
        );
    }

    UseCountdownHandle {
        current: *current,
        finished: *finished,
        countdown,
    }
}

type WebSocketChannel = RealtimeChannel<WebSocketTransport>;

/// Realtime channel bound to a component.
#[derive(Clone)]
pub struct UseRealtimeChannelHandle {
    channel: Rc<RefCell<Option<WebSocketChannel>>>,
}

impl UseRealtimeChannelHandle {
    /// State of the current socket.
    #[must_use]
    pub fn ready_state(&self) -> ReadyState {
        self.channel
            .borrow()
            .as_ref()
            .map_or(ReadyState::Closed, RealtimeChannel::ready_state)
    }

    /// Seconds until the pending reconnect.
    #[must_use]
    pub fn reconnect_count(&self) -> u32 {
        self.channel
            .borrow()
            .as_ref()
            .map_or(0, RealtimeChannel::reconnect_count)
    }

    /// Send a message on the open socket.
    ///
    /// # Errors
    /// Returns [`ChannelError::NotOpen`] before the channel exists or while
    /// the socket is not open, plus any error from the channel itself.
    pub fn send(&self, payload: impl Into<Payload>) -> Result<(), ChannelError> {
        let channel = self.channel.borrow().clone();
        channel.map_or(Err(ChannelError::NotOpen(ReadyState::Closed)), |channel| {
            channel.send(payload)
        })
    }

    /// Skip the countdown and reconnect now.
    pub fn reconnect_now(&self) {
        if let Some(channel) = self.current() {
            channel.reconnect_now();
        }
    }

    /// Abort the pending reconnect.
    pub fn reconnect_cancel(&self) {
        if let Some(channel) = self.current() {
            channel.reconnect_cancel();
        }
    }

    /// Close without reconnecting.
    pub fn close(&self) {
        if let Some(channel) = self.current() {
            channel.close();
        }
    }

    fn current(&self) -> Option<WebSocketChannel> {
        self.channel.borrow().clone()
    }
}

/// Open a reconnecting socket to `url` and re-render on every channel event
/// and reconnect tick.
///
/// Handlers in `options` are captured when the socket is created; the
/// channel is rebuilt only when `url` or the settings change.
#[hook]
pub fn use_realtime_channel(url: AttrValue, options: ChannelOptions) -> UseRealtimeChannelHandle {
    let trigger = use_force_update();
    let channel = use_mut_ref(|| None::<WebSocketChannel>);
    let latest = use_mut_ref(ChannelOptions::default);
    let settings = options.settings.clone();
    *latest.borrow_mut() = options;

    {
        let channel = channel.clone();
        use_effect_with_deps(
            move |(url, _settings): &(AttrValue, ChannelSettings)| {
                let options = latest
                    .borrow()
                    .clone()
                    .on_all(Callback::from(move |()| trigger.force_update()));
                let connected = RealtimeChannel::connect(
                    url.to_string(),
                    options,
                    WebSocketTransport,
                    BrowserScheduler::shared(),
                );
                *channel.borrow_mut() = Some(connected.clone());
                let slot = channel;
                move || {
                    connected.close();
                    slot.borrow_mut().take();
                }
            },
            (url, settings),
        );
    }

    UseRealtimeChannelHandle { channel }
}
