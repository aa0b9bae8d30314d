//! The live session: event channel, command dispatch, and the host-facing
//! client handle.
//!
//! [`Client`] ties the pieces together: the [`gateway`](crate::gateway)
//! handshake fills the [`session`](crate::session) token store, `connect()`
//! opens the persistent event channel with that token, and `send()` queues
//! playback commands onto it. Everything the host observes comes back as
//! [`Event`]s on the receiver handed out by [`Client::new`].
//!
//! The channel does not reconnect on its own. When the transport drops, the
//! host gets [`Event::Disconnected`] and decides whether to call `connect()`
//! again; calling it again is always safe and never leaks the previous
//! connection.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    net::TcpStream,
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_tungstenite::{
    tungstenite::Message as WebsocketMessage, MaybeTlsStream, WebSocketStream,
};
use url::Url;

use crate::{
    config::Config,
    events::Event,
    gateway::{self, Gateway},
    protocol::{
        self, command,
        realtime::{ClientMessage, ServerMessage},
    },
    session::Session,
    token::Token,
};

/// Lifecycle of the event channel.
///
/// Owned by the channel itself; the host observes transitions through
/// [`Event::Connected`] and [`Event::Disconnected`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Connection {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Closing,
}

#[derive(Error, Debug)]
pub enum Error {
    /// `connect()` was called without a token in the session store. This is
    /// a programming-contract violation, not a runtime condition: set a
    /// persisted token or run `authenticate()` first.
    #[error("client must be authenticated before connecting")]
    NoToken,

    #[error("gateway error: {0}")]
    Gateway(#[from] gateway::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// State shared between the client handle and the channel task.
///
/// Guarded by a single mutex so a `send` racing a reconnect or a drop always
/// observes a consistent "connected or not" snapshot.
struct Channel {
    connection: Connection,
    commands: Option<mpsc::UnboundedSender<ClientMessage>>,
}

/// Session client for the companion API.
pub struct Client {
    config: Config,
    gateway: Gateway,
    session: Session,
    channel: Arc<Mutex<Channel>>,
    event_tx: mpsc::UnboundedSender<Event>,
    task: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl Client {
    /// Bound on the graceful-close wait during shutdown. When it elapses the
    /// channel task is aborted so resources are released regardless.
    const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

    /// Creates a new client and the event stream the host consumes.
    ///
    /// # Errors
    ///
    /// Will return `Err` if no HTTP client can be built out of the `config`
    /// fields.
    pub fn new(config: Config) -> Result<(Self, mpsc::UnboundedReceiver<Event>)> {
        let gateway = Gateway::new(&config)?;
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let client = Self {
            config,
            gateway,
            session: Session::new(),
            channel: Arc::new(Mutex::new(Channel {
                connection: Connection::Disconnected,
                commands: None,
            })),
            event_tx,
            task: None,
            shutdown_tx: None,
        };

        Ok((client, event_rx))
    }

    /// Runs the two-step authorization handshake.
    ///
    /// On success the token is stored and exactly one
    /// [`Event::Authenticated`] fires so the host can persist it. Any
    /// failure surfaces as a single [`Event::Log`] and nothing else; the
    /// host stays responsive and may simply call this again.
    pub async fn authenticate(&self) {
        let token = match self.gateway.request_code().await {
            Ok(code) => self.gateway.request_token(&code).await,
            Err(e) => Err(e),
        };

        match token {
            Ok(token) => {
                self.session.set_token(token);
                self.emit(Event::Authenticated);
            }
            Err(e) => {
                warn!("authentication failed: {e}");
                self.emit(Event::Log(format!("authentication failed: {e}")));
            }
        }
    }

    /// Opens the event channel, presenting the stored token as
    /// connection-time credential.
    ///
    /// On success the channel task starts delivering [`Event`]s and a
    /// baseline state fetch is queued before this method returns. A
    /// transport failure is not an error: it surfaces as [`Event::Log`] and
    /// the state stays `Disconnected`.
    ///
    /// Calling this while a previous channel is (or was) up tears that
    /// channel down first.
    ///
    /// # Errors
    ///
    /// Will return `Err` only on [`Error::NoToken`], before any network
    /// activity.
    pub async fn connect(&mut self) -> Result<()> {
        let token = self.session.token().ok_or(Error::NoToken)?;

        self.shutdown_channel().await;
        self.set_connection(Connection::Connecting);

        let url = self.realtime_url(&token);
        let ws_stream = match tokio_tungstenite::connect_async(url.as_str()).await {
            Ok((ws_stream, _)) => ws_stream,
            Err(e) => {
                self.set_connection(Connection::Disconnected);
                warn!("connection failed: {e}");
                self.emit(Event::Log(format!("connection failed: {e}")));
                return Ok(());
            }
        };

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        {
            let mut channel = self.channel.lock().expect("channel lock poisoned");
            channel.connection = Connection::Connected;
            channel.commands = Some(cmd_tx);
        }

        self.shutdown_tx = Some(shutdown_tx);
        self.task = Some(tokio::spawn(channel_loop(
            ws_stream,
            cmd_rx,
            shutdown_rx,
            Arc::clone(&self.channel),
            self.event_tx.clone(),
        )));

        self.emit(Event::Connected);

        // The server only pushes on change, not on connect: fetch a baseline
        // snapshot before any user command goes out.
        self.send(command::GET_STATE, None);

        Ok(())
    }

    /// Queues a playback command.
    ///
    /// The command name is forwarded verbatim; unknown names are the remote
    /// side's concern. `data` is omitted from the frame entirely when
    /// `None`.
    ///
    /// Sending while unauthenticated or not connected is a normal runtime
    /// condition (a button pressed before the channel is ready): it is a
    /// no-op that emits exactly one [`Event::Log`].
    pub fn send(&self, command: &str, data: Option<serde_json::Value>) {
        let channel = self.channel.lock().expect("channel lock poisoned");

        let commands = match &channel.commands {
            Some(commands)
                if channel.connection == Connection::Connected
                    && self.session.is_authenticated() =>
            {
                commands
            }
            _ => {
                debug!("cannot send command: not connected");
                self.emit(Event::Log("cannot send command: not connected".to_owned()));
                return;
            }
        };

        if commands.send(ClientMessage::command(command, data)).is_err() {
            // The channel task exited between the state check and this send.
            self.emit(Event::Log("cannot send command: not connected".to_owned()));
        }
    }

    /// Closes the event channel and releases the connection.
    ///
    /// Attempts a graceful close first, with a bounded wait, then aborts the
    /// channel task. Never fails and may be called any number of times.
    pub async fn stop(&mut self) {
        {
            let mut channel = self.channel.lock().expect("channel lock poisoned");
            if channel.connection == Connection::Disconnected && self.task.is_none() {
                return;
            }
            channel.connection = Connection::Closing;
            channel.commands = None;
        }

        self.shutdown_channel().await;
    }

    /// Hands the host a previously persisted token, making the client
    /// authenticated without a handshake.
    pub fn set_token(&self, token: Token) {
        self.session.set_token(token);
    }

    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.session.token()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    #[must_use]
    pub fn connection(&self) -> Connection {
        self.channel.lock().expect("channel lock poisoned").connection
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection() == Connection::Connected
    }

    /// Signals the channel task and waits for it, bounded; aborts on
    /// timeout. Leaves the channel state `Disconnected` either way.
    async fn shutdown_channel(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }

        if let Some(mut task) = self.task.take() {
            if tokio::time::timeout(Self::SHUTDOWN_TIMEOUT, &mut task)
                .await
                .is_err()
            {
                warn!("channel task did not exit within timeout; aborting");
                task.abort();
                let _ = task.await;
                // The aborted task never got to announce the disconnect.
                self.emit(Event::Disconnected);
            }
        }

        self.set_connection(Connection::Disconnected);
    }

    fn set_connection(&self, connection: Connection) {
        let mut channel = self.channel.lock().expect("channel lock poisoned");
        channel.connection = connection;
        if connection != Connection::Connected {
            channel.commands = None;
        }
    }

    fn realtime_url(&self, token: &Token) -> Url {
        let mut url = self.config.base_url.clone();

        {
            let mut segments = url
                .path_segments_mut()
                .expect("base URL cannot be a base for paths");
            segments.pop_if_empty().push("realtime");
        }

        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme).expect("invalid realtime scheme");

        url.query_pairs_mut().append_pair("token", token.as_str());
        url
    }

    fn emit(&self, event: Event) {
        // The host may have dropped the receiver; that is its choice.
        let _ = self.event_tx.send(event);
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        // `Drop` is synchronous, so the graceful path is out of reach; abort
        // the task so the connection cannot outlive the client.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// The channel task: multiplexes outbound commands and inbound frames until
/// shutdown, server close, or transport error.
async fn channel_loop(
    ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut cmd_rx: mpsc::UnboundedReceiver<ClientMessage>,
    mut shutdown_rx: oneshot::Receiver<()>,
    channel: Arc<Mutex<Channel>>,
    event_tx: mpsc::UnboundedSender<Event>,
) {
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    let reason = loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                let _ = ws_tx.send(WebsocketMessage::Close(None)).await;
                let _ = ws_tx.flush().await;
                break None;
            }

            command = cmd_rx.recv() => {
                match command {
                    Some(message) => match serde_json::to_string(&message) {
                        Ok(frame) => {
                            trace!("sending command frame");
                            if let Err(e) = ws_tx.send(WebsocketMessage::text(frame)).await {
                                break Some(format!("error sending command: {e}"));
                            }
                        }
                        Err(e) => error!("error encoding command: {e}"),
                    },
                    // Client handle is gone; nothing left to do.
                    None => break None,
                }
            }

            message = ws_rx.next() => {
                match message {
                    Some(Ok(WebsocketMessage::Text(frame))) => {
                        match protocol::json::<ServerMessage>(frame.as_str(), "realtime") {
                            Ok(ServerMessage::StateUpdate(state)) => {
                                let _ = event_tx.send(Event::StateChanged(state));
                            }
                            // A single bad frame must never take the channel
                            // down; drop it and stay subscribed.
                            Err(e) => {
                                let _ = event_tx.send(Event::Log(format!(
                                    "error parsing state-update: {e}"
                                )));
                            }
                        }
                    }
                    Some(Ok(WebsocketMessage::Ping(payload))) => {
                        trace!("ping -> pong");
                        if let Err(e) = ws_tx.send(WebsocketMessage::Pong(payload)).await {
                            break Some(format!("error sending pong: {e}"));
                        }
                    }
                    Some(Ok(WebsocketMessage::Close(payload))) => {
                        break Some(format!("connection closed by server: {payload:?}"));
                    }
                    Some(Ok(_)) => trace!("message type unimplemented"),
                    Some(Err(e)) => break Some(format!("transport error: {e}")),
                    None => break Some("connection closed by server".to_owned()),
                }
            }
        }
    };

    {
        let mut channel = channel.lock().expect("channel lock poisoned");
        channel.connection = Connection::Disconnected;
        channel.commands = None;
    }

    if let Some(reason) = reason {
        warn!("{reason}");
        let _ = event_tx.send(Event::Log(reason));
    }
    let _ = event_tx.send(Event::Disconnected);
}
