//! Agora production server.
//!
//! Presence registry and signaling relay behind a WebSocket transport:
//!
//! ```text
//! agora-server
//!   ├─ SystemEnv          (production Environment impl)
//!   ├─ WebSocket driver   (tokio + tokio-tungstenite, this module)
//!   ├─ PresenceRegistry   (who is here, where, in which room)
//!   └─ Signaling relay    (offer/answer/candidate pass-through)
//! ```
//!
//! All protocol decisions live in [`PresenceRegistry`], a pure state machine
//! that returns delivery actions. The driver owns the sockets: it serializes
//! registry operations behind one mutex and fans actions out through
//! per-connection channels, fire-and-forget.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod registry;
mod relay;
mod system_env;

use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use agora_proto::{ClientMessage, SessionId};
pub use error::ServerError;
use futures_util::{SinkExt, StreamExt};
pub use registry::{Participant, PresenceRegistry, RegistryAction};
pub use relay::relay_signal;
pub use system_env::SystemEnv;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::{Mutex, mpsc},
};
use tokio_tungstenite::{WebSocketStream, accept_async, tungstenite::Message};

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to (e.g., "0.0.0.0:9090")
    pub bind_address: String,
    /// How long a new connection may take to send its hello.
    pub hello_timeout: Duration,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:9090".to_string(), hello_timeout: Duration::from_secs(10) }
    }
}

/// Registry plus the outbound channel for every connected session.
struct State {
    registry: PresenceRegistry,
    senders: HashMap<SessionId, mpsc::UnboundedSender<String>>,
}

/// Shared server state: one registry per process, mutex-guarded so registry
/// operations never interleave.
struct Shared {
    state: Mutex<State>,
    env: SystemEnv,
}

/// Production agora server.
pub struct Server {
    listener: TcpListener,
    shared: Arc<Shared>,
    hello_timeout: Duration,
}

impl Server {
    /// Create and bind a new server.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn bind(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.bind_address).await?;
        let shared = Arc::new(Shared {
            state: Mutex::new(State { registry: PresenceRegistry::new(), senders: HashMap::new() }),
            env: SystemEnv::new(),
        });
        Ok(Self { listener, shared, hello_timeout: config.hello_timeout })
    }

    /// Get the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the server, accepting connections until shut down.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("server listening on {}", self.local_addr()?);

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let shared = Arc::clone(&self.shared);
                    let hello_timeout = self.hello_timeout;
                    tokio::spawn(async move {
                        match accept_async(stream).await {
                            Ok(ws) => handle_connection(ws, addr, shared, hello_timeout).await,
                            Err(e) => {
                                tracing::warn!(peer = %addr, error = %e, "websocket handshake failed");
                            },
                        }
                    });
                },
                Err(e) => {
                    tracing::warn!(error = %e, "accept error");
                },
            }
        }
    }
}

/// Handle one WebSocket connection: hello, register, pump, clean up.
async fn handle_connection(
    ws: WebSocketStream<TcpStream>,
    addr: SocketAddr,
    shared: Arc<Shared>,
    hello_timeout: Duration,
) {
    let (mut sink, mut stream) = ws.split();

    let Some((name, user_id)) = read_hello(&mut stream, addr, hello_timeout).await else {
        return;
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let session_id = {
        let mut state = shared.state.lock().await;
        let (session_id, actions) = state.registry.connect(&shared.env, name, user_id);
        state.senders.insert(session_id, tx);
        execute_actions(&state, actions);
        session_id
    };

    tracing::debug!(peer = %addr, session_id, "client registered");

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                let Some(text) = outbound else { break };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }

            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        let message = match ClientMessage::from_json(&text) {
                            Ok(message) => message,
                            Err(e) => {
                                tracing::warn!(session_id, error = %e, "dropping malformed message");
                                continue;
                            },
                        };
                        let mut state = shared.state.lock().await;
                        let actions = state.registry.handle_message(&shared.env, session_id, message);
                        execute_actions(&state, actions);
                    },
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(session_id, error = %e, "websocket error");
                        break;
                    },
                    _ => {},
                }
            }
        }
    }

    tracing::debug!(peer = %addr, session_id, "client disconnected");

    let mut state = shared.state.lock().await;
    state.senders.remove(&session_id);
    let actions = state.registry.disconnect(session_id);
    execute_actions(&state, actions);
}

/// Read and parse the first message as a hello.
async fn read_hello(
    stream: &mut futures_util::stream::SplitStream<WebSocketStream<TcpStream>>,
    addr: SocketAddr,
    timeout: Duration,
) -> Option<(String, Option<String>)> {
    let frame = tokio::time::timeout(timeout, stream.next()).await;

    match frame {
        Ok(Some(Ok(Message::Text(text)))) => match ClientMessage::from_json(&text) {
            Ok(ClientMessage::Hello { name, user_id }) => Some((name, user_id)),
            Ok(other) => {
                tracing::warn!(peer = %addr, ?other, "expected hello as first message");
                None
            },
            Err(e) => {
                tracing::warn!(peer = %addr, error = %e, "invalid hello message");
                None
            },
        },
        Ok(Some(Ok(_))) => {
            tracing::warn!(peer = %addr, "expected text hello, got non-text frame");
            None
        },
        Ok(Some(Err(e))) => {
            tracing::warn!(peer = %addr, error = %e, "websocket error during hello");
            None
        },
        Ok(None) => {
            tracing::debug!(peer = %addr, "connection closed before hello");
            None
        },
        Err(_) => {
            tracing::warn!(peer = %addr, "hello timeout");
            None
        },
    }
}

/// Deliver registry actions through per-session channels, fire-and-forget.
///
/// A closed channel means the recipient is tearing down; their own cleanup
/// path handles the departure, so send failures are ignored here.
fn execute_actions(state: &State, actions: Vec<RegistryAction>) {
    for action in actions {
        let (recipients, message) = match action {
            RegistryAction::Unicast { session_id, message } => (vec![session_id], message),
            RegistryAction::Broadcast { recipients, message } => (recipients, message),
        };

        let text = match message.to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode server message");
                continue;
            },
        };

        for session_id in recipients {
            if let Some(tx) = state.senders.get(&session_id) {
                let _ = tx.send(text.clone());
            }
        }
    }
}
