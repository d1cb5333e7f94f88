//! Correlated command channel over a [`Connection`].
//!
//! ```text
//! send(cmd) ──register──→ PendingRequests ──id──→ Request ──→ conn
//!                                ↑
//! reader task ←── conn: Ack ─────┘ (resolve by messageId)
//!             ←── conn: Event ───→ EventBus<ServerEvent>
//! ```
//!
//! Requests never block each other: any number may be outstanding, and
//! each completes when the ack carrying its id arrives, whatever order
//! the server answers in.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use cardroom_protocol::{
    Ack, AckError, Codec, Command, ErrorKind, JsonCodec, Request, RequestId, ServerEvent,
    ServerMessage,
};
use cardroom_transport::{Connection, ConnectionId};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::{ChannelConfig, ClientError, EventBus, PendingRequests};

/// State shared between the channel and its reader task.
struct Shared<C> {
    conn: C,
    codec: JsonCodec,
    pending: PendingRequests,
    events: EventBus<ServerEvent>,
    /// Set once the reader has stopped; no ack can arrive after this.
    closed: AtomicBool,
}

/// Client end of the command protocol.
pub struct CommandChannel<C: Connection> {
    shared: Arc<Shared<C>>,
    config: ChannelConfig,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Connection> CommandChannel<C> {
    /// Wraps a connection and starts the reader task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(conn: C, config: ChannelConfig) -> Self {
        let shared = Arc::new(Shared {
            conn,
            codec: JsonCodec,
            pending: PendingRequests::new(),
            events: EventBus::new(config.event_capacity),
            closed: AtomicBool::new(false),
        });
        let reader = tokio::spawn(read_loop(Arc::clone(&shared)));
        tracing::debug!(conn_id = %shared.conn.id(), "command channel opened");

        Self {
            shared,
            config,
            reader: Mutex::new(Some(reader)),
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.shared.conn.id()
    }

    /// Sends a command and waits for its ack.
    ///
    /// # Errors
    /// - [`ClientError::Rejected`] if the server answered with an error
    /// - [`ClientError::Timeout`] if no ack arrived in time
    /// - [`ClientError::Closed`] if the connection ended first
    pub async fn send(&self, command: Command) -> Result<Ack, ClientError> {
        let shared = &self.shared;
        let (message_id, reply) = shared.pending.register();

        // Checked after registering: a reader that stops later will
        // clear this entry, one that already stopped is seen here.
        if shared.closed.load(Ordering::SeqCst) {
            shared.pending.cancel(message_id);
            return Err(ClientError::Closed);
        }

        let command_name = command.name();
        let request = Request {
            message_id,
            command,
        };
        let sent = match shared.codec.encode(&request) {
            Ok(bytes) => shared.conn.send(&bytes).await.map_err(ClientError::from),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = sent {
            shared.pending.cancel(message_id);
            return Err(e);
        }
        tracing::debug!(%message_id, command = command_name, "request sent");

        let outcome = match self.config.request_timeout {
            Some(limit) => match tokio::time::timeout(limit, reply).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    shared.pending.cancel(message_id);
                    tracing::warn!(%message_id, command = command_name, "request timed out");
                    return Err(ClientError::Timeout(message_id));
                }
            },
            None => reply.await,
        };

        match outcome {
            Ok(Ok(ack)) => Ok(ack),
            Ok(Err(rejection)) => {
                tracing::debug!(%message_id, kind = %rejection.kind, "request rejected");
                Err(ClientError::Rejected(rejection))
            }
            Err(_) => Err(ClientError::Closed),
        }
    }

    /// Sends a command and decodes the ack's result fields as `T`.
    pub async fn request<T: DeserializeOwned>(&self, command: Command) -> Result<T, ClientError> {
        let ack = self.send(command).await?;
        Ok(ack.decode()?)
    }

    /// Subscribes to unsolicited server events.
    ///
    /// [`ServerEvent::Disconnected`] is published when the connection
    /// ends.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.shared.events.subscribe()
    }

    /// Number of requests still waiting for an ack.
    pub fn pending_count(&self) -> usize {
        self.shared.pending.len()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Stops the reader, fails every outstanding request with
    /// [`ClientError::Closed`], and closes the connection.
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        if let Some(reader) = self.take_reader() {
            reader.abort();
        }
        self.shared.closed.store(true, Ordering::SeqCst);
        self.shared.pending.clear();
        self.shared.conn.close().await?;
        tracing::debug!(conn_id = %self.shared.conn.id(), "command channel shut down");
        Ok(())
    }

    fn take_reader(&self) -> Option<JoinHandle<()>> {
        self.reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl<C: Connection> Drop for CommandChannel<C> {
    fn drop(&mut self) {
        if let Some(reader) = self.take_reader() {
            reader.abort();
        }
    }
}

/// What can still be read from an ack frame whose body is malformed.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum FrameHeader {
    #[serde(rename_all = "camelCase")]
    Ack { message_id: RequestId },
}

/// Reads server messages until the connection ends.
async fn read_loop<C: Connection>(shared: Arc<Shared<C>>) {
    let conn_id = shared.conn.id();

    loop {
        let data = match shared.conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "server closed the connection");
                break;
            }
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "receive failed");
                break;
            }
        };

        match shared.codec.decode::<ServerMessage>(&data) {
            Ok(ServerMessage::Ack(ack)) => {
                shared.pending.resolve(ack);
            }
            Ok(ServerMessage::Event(event)) => {
                shared.events.publish(event);
            }
            Err(e) => match shared.codec.decode::<FrameHeader>(&data) {
                Ok(FrameHeader::Ack { message_id }) => {
                    tracing::warn!(%conn_id, %message_id, error = %e, "malformed ack rejects its request");
                    let error = AckError::new(ErrorKind::BadRequest, e.to_string());
                    shared.pending.resolve(Ack::failure(message_id, error));
                }
                Err(_) => {
                    tracing::warn!(%conn_id, error = %e, "undecodable server message skipped");
                }
            },
        }
    }

    shared.closed.store(true, Ordering::SeqCst);
    shared.pending.clear();
    shared.events.publish(ServerEvent::Disconnected);
}
