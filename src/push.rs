//! Push channel: task notifications delivered over a websocket.
//!
//! The server speaks socket.io v4 on top of engine.io v4 text frames. Only
//! the handful of packet types a subscriber needs are understood:
//!
//! | frame            | meaning                     | reply |
//! |------------------|-----------------------------|-------|
//! | `0{...}`         | engine.io open              | `40`  |
//! | `2`              | engine.io ping              | `3`   |
//! | `40...`          | namespace connected         |       |
//! | `42["name",{…}]` | event                       |       |
//! | `41`, `1`        | disconnect / close          |       |
//!
//! A bare JSON envelope `{"event": "taskCreated", "data": {...}}` or a bare
//! `["taskCreated", {...}]` array is accepted as well, for servers that push
//! plain websocket messages.
//!
//! [`PushClient::subscribe`] returns a [`Subscription`]; the reader task
//! lives exactly as long as that handle.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::tasks::{Task, TaskId};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

/// Event name for a created task.
pub const TASK_CREATED: &str = "taskCreated";
/// Event name for an updated task.
pub const TASK_UPDATED: &str = "taskUpdated";
/// Event name for a deleted task.
pub const TASK_DELETED: &str = "taskDeleted";

/// A notification from the push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    /// A task was created somewhere.
    TaskCreated(Task),
    /// A task was changed somewhere.
    TaskUpdated(Task),
    /// A task was deleted somewhere.
    TaskDeleted(TaskId),
    /// The channel (re)connected; events sent before this may have been missed.
    Reconnected,
}

impl PushEvent {
    /// The wire name of the event.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TaskCreated(_) => TASK_CREATED,
            Self::TaskUpdated(_) => TASK_UPDATED,
            Self::TaskDeleted(_) => TASK_DELETED,
            Self::Reconnected => "reconnected",
        }
    }
}

/// A decoded text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Engine.io handshake; the client must connect to the default namespace.
    Open,
    /// Engine.io heartbeat; the client must answer with a pong.
    Ping,
    /// The namespace connection was acknowledged.
    Connected,
    /// The server closed the session.
    Disconnected,
    /// A task event.
    Event(PushEvent),
    /// Anything a subscriber does not care about.
    Ignored,
}

impl Frame {
    /// The text the client must send back, if any.
    #[must_use]
    pub const fn reply(&self) -> Option<&'static str> {
        match self {
            Self::Open => Some("40"),
            Self::Ping => Some("3"),
            _ => None,
        }
    }
}

/// Payload of a delete event: `{"id": ...}`, `{"_id": ...}` or the bare id.
#[derive(Deserialize)]
#[serde(untagged)]
enum DeletedPayload {
    Object {
        #[serde(alias = "_id")]
        id: TaskId,
    },
    Bare(TaskId),
}

/// Decode one text frame.
///
/// # Errors
///
/// Returns a push channel error for malformed frames, a connect error from
/// the server, or event payloads that do not describe a task.
pub fn parse_frame(text: &str) -> Result<Frame> {
    let text = text.trim();
    match text.chars().next() {
        None => Ok(Frame::Ignored),
        Some('{') => parse_envelope(text),
        Some('[') => parse_event_array(text),
        Some('0') => Ok(Frame::Open),
        Some('1') => Ok(Frame::Disconnected),
        Some('2') => Ok(Frame::Ping),
        Some('3' | '6') => Ok(Frame::Ignored),
        Some('4') => parse_socket_packet(&text[1..]),
        Some(_) => Err(Error::PushChannel(format!("unrecognised frame: {}", preview(text)))),
    }
}

/// Decode a socket.io packet (the part after the engine.io `4`).
fn parse_socket_packet(packet: &str) -> Result<Frame> {
    match packet.chars().next() {
        Some('0') => Ok(Frame::Connected),
        Some('1') => Ok(Frame::Disconnected),
        Some('2') => {
            // Optional "/namespace," and ack id sit between the type and the array.
            let start = packet
                .find('[')
                .ok_or_else(|| Error::PushChannel(format!("event without payload: {}", preview(packet))))?;
            parse_event_array(&packet[start..])
        }
        Some('4') => Err(Error::PushChannel(format!("connect refused: {}", &packet[1..]))),
        _ => Ok(Frame::Ignored),
    }
}

/// Decode `["name", payload]`.
fn parse_event_array(text: &str) -> Result<Frame> {
    let values: Vec<Value> = serde_json::from_str(text)?;
    let mut values = values.into_iter();
    let Some(Value::String(name)) = values.next() else {
        return Err(Error::PushChannel(format!("event without a name: {}", preview(text))));
    };
    event_frame(&name, values.next().unwrap_or(Value::Null))
}

/// Decode `{"event": "name", "data": payload}`.
fn parse_envelope(text: &str) -> Result<Frame> {
    #[derive(Deserialize)]
    struct Envelope {
        event: String,
        #[serde(default)]
        data: Value,
    }

    let envelope: Envelope = serde_json::from_str(text)?;
    event_frame(&envelope.event, envelope.data)
}

fn event_frame(name: &str, payload: Value) -> Result<Frame> {
    let event = match name {
        TASK_CREATED => PushEvent::TaskCreated(serde_json::from_value(payload)?),
        TASK_UPDATED => PushEvent::TaskUpdated(serde_json::from_value(payload)?),
        TASK_DELETED => match serde_json::from_value(payload)? {
            DeletedPayload::Object { id } | DeletedPayload::Bare(id) => PushEvent::TaskDeleted(id),
        },
        other => {
            debug!(event = other, "ignoring unknown push event");
            return Ok(Frame::Ignored);
        }
    };
    Ok(Frame::Event(event))
}

fn preview(text: &str) -> String {
    text.chars().take(80).collect()
}

/// Handle to a live push subscription.
///
/// Events are queued in arrival order until [`Subscription::next`] takes
/// them. Dropping the handle stops the reader task.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<PushEvent>,
    reader: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Create a subscription fed by the returned sender instead of a websocket.
    #[must_use]
    pub fn channel() -> (mpsc::UnboundedSender<PushEvent>, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (sender, Self { receiver, reader: None })
    }

    /// Wait for the next event. Returns `None` once the channel has shut down.
    pub async fn next(&mut self) -> Option<PushEvent> {
        self.receiver.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_next(&mut self) -> Option<PushEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            debug!("push subscription released");
            reader.abort();
        }
    }
}

/// Connects to the push channel.
#[derive(Debug, Clone)]
pub struct PushClient {
    url: Url,
    reconnect_delay: Duration,
}

impl PushClient {
    /// Create a client for the configured push URL.
    ///
    /// # Errors
    ///
    /// Returns a config error if the push URL is invalid.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self { url: config.push_endpoint()?, reconnect_delay: config.reconnect_delay() })
    }

    /// Create a client for an explicit URL.
    #[must_use]
    pub const fn with_url(url: Url, reconnect_delay: Duration) -> Self {
        Self { url, reconnect_delay }
    }

    /// Start reading the channel in a background task.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_loop(self.url.clone(), self.reconnect_delay, sender));
        Subscription { receiver, reader: Some(reader) }
    }
}

/// Keep a websocket open, forwarding events until the subscriber goes away.
///
/// Every successful connect, the first one included, is announced with
/// [`PushEvent::Reconnected`] so the consumer can reload whatever changed
/// before the channel was listening.
async fn read_loop(url: Url, reconnect_delay: Duration, sender: mpsc::UnboundedSender<PushEvent>) {
    loop {
        match tokio_tungstenite::connect_async(url.as_str()).await {
            Ok((socket, _)) => {
                info!(%url, "push channel connected");
                if sender.send(PushEvent::Reconnected).is_err() {
                    return;
                }

                let (mut sink, mut stream) = socket.split();
                while let Some(message) = stream.next().await {
                    let text = match message {
                        Ok(Message::Text(text)) => text,
                        Ok(Message::Close(_)) => break,
                        Ok(_) => continue,
                        Err(e) => {
                            warn!(error = %e, "push channel read failed");
                            break;
                        }
                    };
                    let frame = match parse_frame(text.as_str()) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(error = %e, "dropping push frame");
                            continue;
                        }
                    };
                    if let Some(reply) = frame.reply() {
                        if let Err(e) = sink.send(Message::text(reply.to_string())).await {
                            warn!(error = %e, "push channel write failed");
                            break;
                        }
                    }
                    match frame {
                        Frame::Event(event) => {
                            debug!(event = event.name(), "push event");
                            if sender.send(event).is_err() {
                                return;
                            }
                        }
                        Frame::Connected => debug!("push namespace connected"),
                        Frame::Disconnected => break,
                        Frame::Open | Frame::Ping | Frame::Ignored => {}
                    }
                }
                warn!("push channel disconnected");
            }
            Err(e) => warn!(%url, error = %e, "push channel connect failed"),
        }

        if sender.is_closed() {
            return;
        }
        tokio::time::sleep(reconnect_delay).await;
    }
}
