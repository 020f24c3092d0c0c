//! `WebSocket` transport for [`crate::core::channel::RealtimeChannel`].
//!
//! # Design
//! - Binary frames are received as `ArrayBuffer` and copied into `Vec<u8>`.
//! - Handlers are detached when the connection is dropped, so a superseded
//!   socket never reports into the channel again.

use crate::core::channel::{
    ChannelError, ChannelEvent, CloseInfo, Connection, EventSink, MessageData, ReadyState,
    Transport,
};
use js_sys::{ArrayBuffer, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{BinaryType, CloseEvent, Event, MessageEvent, WebSocket};

/// Creates browser `WebSocket` connections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WebSocketTransport;

/// Live browser socket plus the handlers bound to it.
pub struct WebSocketConnection {
    socket: WebSocket,
    _on_open: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
    _on_error: Closure<dyn FnMut(Event)>,
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;

    fn connect(&self, url: &str, sink: EventSink) -> Result<WebSocketConnection, ChannelError> {
        let socket = WebSocket::new(url).map_err(|err| ChannelError::Connect {
            url: url.to_string(),
            message: js_error_message(&err),
        })?;
        socket.set_binary_type(BinaryType::Arraybuffer);

        let on_open = {
            let sink = sink.clone();
            Closure::<dyn FnMut(_)>::wrap(Box::new(move |_event: Event| {
                sink.emit(ChannelEvent::Open);
            }) as Box<dyn FnMut(_)>)
        };
        let on_message = {
            let sink = sink.clone();
            Closure::<dyn FnMut(_)>::wrap(Box::new(move |event: MessageEvent| {
                if let Some(data) = message_data(&event.data()) {
                    sink.emit(ChannelEvent::Message(data));
                }
            }) as Box<dyn FnMut(_)>)
        };
        let on_close = {
            let sink = sink.clone();
            Closure::<dyn FnMut(_)>::wrap(Box::new(move |event: CloseEvent| {
                sink.emit(ChannelEvent::Close(CloseInfo {
                    code: event.code(),
                    reason: event.reason(),
                    was_clean: event.was_clean(),
                }));
            }) as Box<dyn FnMut(_)>)
        };
        let on_error = Closure::<dyn FnMut(_)>::wrap(Box::new(move |event: Event| {
            sink.emit(ChannelEvent::Error(format!("websocket error ({})", event.type_())));
        }) as Box<dyn FnMut(_)>);

        socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        Ok(WebSocketConnection {
            socket,
            _on_open: on_open,
            _on_message: on_message,
            _on_close: on_close,
            _on_error: on_error,
        })
    }
}

impl Connection for WebSocketConnection {
    fn ready_state(&self) -> ReadyState {
        ReadyState::from_code(self.socket.ready_state())
    }

    fn send_text(&self, text: &str) -> Result<(), ChannelError> {
        self.socket
            .send_with_str(text)
            .map_err(|err| ChannelError::Send(js_error_message(&err)))
    }

    fn close(&self) {
        if let Err(err) = self.socket.close() {
            tracing::warn!(url = %self.socket.url(), error = %js_error_message(&err), "websocket close failed");
        }
    }
}

impl Drop for WebSocketConnection {
    fn drop(&mut self) {
        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        self.socket.set_onclose(None);
        self.socket.set_onerror(None);
    }
}

impl std::fmt::Debug for WebSocketConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketConnection")
            .field("url", &self.socket.url())
            .field("ready_state", &self.ready_state())
            .finish()
    }
}

fn message_data(data: &JsValue) -> Option<MessageData> {
    if let Some(text) = data.as_string() {
        return Some(MessageData::Text(text));
    }
    data.dyn_ref::<ArrayBuffer>()
        .map(|buffer| MessageData::Binary(Uint8Array::new(buffer).to_vec()))
}

fn js_error_message(err: &JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|error| String::from(error.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}
