//! Async driver for the sentence link.
//!
//! Owns the WebSocket, feeds socket and timer events through a
//! [`LinkMachine`] and carries out the effects it returns. Sentence lines are
//! decoded and forwarded to the session as [`TransportEvent`]s.

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Sleep;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::error::TransportError;
use super::machine::{LinkEffect, LinkEvent, LinkMachine, RECONNECT_DELAY};
use crate::nmea::{NavPacket, SentenceDecoder};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const COMMAND_CHANNEL_SIZE: usize = 16;

/// What the transport reports to its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A `$` line. `packet` is `None` when the line failed to decode.
    Sentence {
        raw: String,
        packet: Option<NavPacket>,
    },
    /// Connected indicator changed
    Status { connected: bool },
    /// A link status line (attempt, connected, closed, error)
    Log(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TransportCommand {
    Connect { url: String },
    Disconnect,
}

/// Control handle for a running transport task.
pub struct TransportHandle {
    commands: mpsc::Sender<TransportCommand>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl TransportHandle {
    /// (Re)connect to `url` and keep reconnecting after failures.
    pub async fn connect(&self, url: impl Into<String>) -> Result<(), TransportError> {
        self.commands
            .send(TransportCommand::Connect { url: url.into() })
            .await
            .map_err(|_| TransportError::Stopped)
    }

    /// Close the link and stop reconnecting.
    pub async fn disconnect(&self) -> Result<(), TransportError> {
        self.commands
            .send(TransportCommand::Disconnect)
            .await
            .map_err(|_| TransportError::Stopped)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the task and wait for it to close the socket.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Transport task ended abnormally");
        }
    }
}

/// Spawn the transport task.
///
/// The link stays idle until [`TransportHandle::connect`] is called. The task
/// ends when `cancel` fires, the handle is dropped or the event receiver
/// closes.
pub fn spawn_transport<D, E>(
    decoder: D,
    events: mpsc::Sender<E>,
    cancel: CancellationToken,
) -> TransportHandle
where
    D: SentenceDecoder + 'static,
    E: From<TransportEvent> + Send + 'static,
{
    spawn_transport_with_delay(decoder, events, cancel, RECONNECT_DELAY)
}

/// [`spawn_transport`] with a custom reconnect delay.
pub fn spawn_transport_with_delay<D, E>(
    decoder: D,
    events: mpsc::Sender<E>,
    cancel: CancellationToken,
    reconnect_delay: Duration,
) -> TransportHandle
where
    D: SentenceDecoder + 'static,
    E: From<TransportEvent> + Send + 'static,
{
    let (commands, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
    let driver = Driver {
        machine: LinkMachine::with_delay(reconnect_delay),
        socket: None,
        reconnect: None,
        decoder,
        events,
        cancel: cancel.clone(),
    };
    let task = tokio::spawn(driver.run(command_rx));

    TransportHandle {
        commands,
        cancel,
        task,
    }
}

struct Driver<D, E> {
    machine: LinkMachine,
    socket: Option<Socket>,
    reconnect: Option<Pin<Box<Sleep>>>,
    decoder: D,
    events: mpsc::Sender<E>,
    cancel: CancellationToken,
}

impl<D, E> Driver<D, E>
where
    D: SentenceDecoder,
    E: From<TransportEvent> + Send,
{
    async fn run(mut self, mut commands: mpsc::Receiver<TransportCommand>) {
        debug!("Transport task started");
        let cancel = self.cancel.clone();

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    break;
                }

                command = commands.recv() => {
                    let event = match command {
                        Some(TransportCommand::Connect { url }) => LinkEvent::Retarget { url },
                        Some(TransportCommand::Disconnect) => LinkEvent::Shutdown,
                        None => break,
                    };
                    self.apply(event).await;
                }

                _ = reconnect_due(&mut self.reconnect) => {
                    self.reconnect = None;
                    self.apply(LinkEvent::ReconnectDue).await;
                }

                frame = next_frame(&mut self.socket) => {
                    self.on_frame(frame).await;
                }
            }

            if self.events.is_closed() {
                debug!("Transport event receiver closed");
                break;
            }
        }

        self.apply(LinkEvent::Shutdown).await;
        debug!("Transport task stopped");
    }

    /// Run `event` and every event its effects produce.
    async fn apply(&mut self, event: LinkEvent) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            trace!(state = %self.machine.state(), event = ?event, "Link event");
            for effect in self.machine.handle(event) {
                match effect {
                    LinkEffect::Open { url } => queue.push_back(self.open(&url).await),
                    LinkEffect::Close => {
                        if let Some(mut socket) = self.socket.take() {
                            if let Err(e) = socket.close(None).await {
                                debug!(error = %e, "Error closing websocket");
                            }
                        }
                        queue.push_back(LinkEvent::Closed);
                    }
                    LinkEffect::ScheduleReconnect { delay } => {
                        debug!(delay_ms = delay.as_millis() as u64, "Reconnect scheduled");
                        self.reconnect = Some(Box::pin(tokio::time::sleep(delay)));
                    }
                    LinkEffect::CancelReconnect => {
                        self.reconnect = None;
                    }
                    LinkEffect::Status { connected } => {
                        self.emit(TransportEvent::Status { connected }).await;
                    }
                    LinkEffect::Log(line) => {
                        self.emit(TransportEvent::Log(line)).await;
                    }
                }
            }
        }
    }

    async fn open(&mut self, url: &str) -> LinkEvent {
        let attempt = tokio::select! {
            attempt = tokio_tungstenite::connect_async(url) => attempt,
            _ = self.cancel.cancelled() => {
                return LinkEvent::Errored {
                    reason: "connection attempt cancelled".to_string(),
                };
            }
        };

        match attempt {
            Ok((socket, _response)) => {
                info!(url = %url, "Sentence stream connected");
                self.socket = Some(socket);
                LinkEvent::Opened
            }
            Err(source) => {
                let error = TransportError::Connect {
                    url: url.to_string(),
                    source,
                };
                warn!(error = %error, "Sentence stream connection failed");
                LinkEvent::Errored {
                    reason: error.to_string(),
                }
            }
        }
    }

    async fn on_frame(&mut self, frame: Option<Result<Message, WsError>>) {
        match frame {
            Some(Ok(Message::Text(text))) => self.on_text(&text).await,
            Some(Ok(Message::Binary(data))) => {
                let text = String::from_utf8_lossy(&data).into_owned();
                self.on_text(&text).await;
            }
            Some(Ok(Message::Close(_))) | None => {
                info!("Sentence stream closed");
                self.socket = None;
                self.apply(LinkEvent::Closed).await;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                let error = TransportError::Stream(e);
                warn!(error = %error, "Sentence stream error");
                self.apply(LinkEvent::Errored {
                    reason: error.to_string(),
                })
                .await;
            }
        }
    }

    async fn on_text(&mut self, text: &str) {
        for event in split_sentences(&self.decoder, text) {
            self.emit(event).await;
        }
    }

    async fn emit(&mut self, event: TransportEvent) {
        // A closed receiver ends the run loop on its next pass
        tokio::select! {
            _ = self.events.send(E::from(event)) => {}
            _ = self.cancel.cancelled() => {}
        }
    }
}

/// Split a frame into `$` sentence events.
///
/// Lines are trimmed; anything not starting with `$` is dropped. Lines that
/// fail to decode are still reported so they reach the raw log.
pub fn split_sentences<D>(decoder: &D, text: &str) -> Vec<TransportEvent>
where
    D: SentenceDecoder + ?Sized,
{
    text.lines()
        .map(str::trim)
        .filter(|line| line.starts_with('$'))
        .map(|line| {
            let packet = match decoder.decode(line) {
                Ok(packet) => Some(packet),
                Err(e) => {
                    trace!(line = %line, error = %e, "Dropping undecodable sentence");
                    None
                }
            };
            TransportEvent::Sentence {
                raw: line.to_string(),
                packet,
            }
        })
        .collect()
}

async fn reconnect_due(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

async fn next_frame(socket: &mut Option<Socket>) -> Option<Result<Message, WsError>> {
    match socket {
        Some(socket) => socket.next().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmea::NmeaDecoder;

    #[test]
    fn test_split_filters_non_sentence_lines() {
        let frame = "hello\r\n  $HEHDT,274.07,T*19  \r\n\r\n# comment\n$HEHDT,274.07,T*00\n";
        let events = split_sentences(&NmeaDecoder, frame);

        assert_eq!(events.len(), 2);
        match &events[0] {
            TransportEvent::Sentence { raw, packet } => {
                assert_eq!(raw, "$HEHDT,274.07,T*19");
                assert!(matches!(packet, Some(NavPacket::Hdt(_))));
            }
            other => panic!("unexpected event {:?}", other),
        }
        match &events[1] {
            TransportEvent::Sentence { packet, .. } => assert!(packet.is_none()),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_split_empty_frame() {
        assert!(split_sentences(&NmeaDecoder, "").is_empty());
        assert!(split_sentences(&NmeaDecoder, "\n\n").is_empty());
    }

    #[tokio::test]
    async fn test_idle_transport_shuts_down() {
        let (tx, _rx) = mpsc::channel::<TransportEvent>(8);
        let handle = spawn_transport(NmeaDecoder, tx, CancellationToken::new());
        assert!(!handle.is_finished());
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_commands_fail_after_shutdown_signal() {
        let (tx, rx) = mpsc::channel::<TransportEvent>(8);
        drop(rx);
        let cancel = CancellationToken::new();
        let handle = spawn_transport(NmeaDecoder, tx, cancel.clone());
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), async {
            while !handle.is_finished() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert!(matches!(
            handle.connect("ws://127.0.0.1:1").await,
            Err(TransportError::Stopped)
        ));
    }
}
