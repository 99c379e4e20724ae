//! Session lifecycle orchestration.
//!
//! The session provider (transport, NAT traversal, peer state sync) is an
//! external collaborator behind [`SessionProvider`]; this module folds its
//! events into the lifecycle state machine and the peer roster.
//!
//! ```text
//! idle ──join──▶ connecting ──provider ok──▶ connected ──failure──▶ error
//!   └───────────────── explicit leave, from any state ──▶ disconnected
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use syncrover_core::{PeerId, RoomId, RoverError, SessionRole};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::roster::PeerRoster;

// MARK: - SessionState

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Connecting,
    Connected,
    Disconnected,
    Error(String),
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

impl SessionState {
    pub fn label(&self) -> &str {
        match self {
            Self::Idle => "Connecting…",
            Self::Connecting => "Connecting…",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
            Self::Error(_) => "Error",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

// MARK: - ProviderEvent

/// Events surfaced by the session provider after a join request.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// The room was joined successfully.
    Connected,
    PeerJoined { peer: PeerId, role: SessionRole },
    PeerLeft { peer: PeerId },
    /// Terminal provider failure. Not retried automatically.
    Failed { reason: String },
}

// MARK: - SessionProvider

/// Narrow view of the external realtime session provider.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Request to join `room` with a signed access credential. Events for
    /// the session arrive on the returned receiver.
    async fn join_room(
        &self,
        room: &RoomId,
        token: &str,
    ) -> Result<mpsc::Receiver<ProviderEvent>, RoverError>;

    async fn leave_room(&self) -> Result<(), RoverError>;
}

// MARK: - SessionManager

/// Folds provider events into lifecycle state + roster. Role is fixed at
/// construction and never renegotiated.
#[derive(Debug)]
pub struct SessionManager {
    local: PeerId,
    role: SessionRole,
    state: SessionState,
    roster: PeerRoster,
}

impl SessionManager {
    pub fn new(local: PeerId, role: SessionRole) -> Self {
        Self {
            local,
            role,
            state: SessionState::Idle,
            roster: PeerRoster::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn local_peer(&self) -> &PeerId {
        &self.local
    }

    pub fn roster(&self) -> &PeerRoster {
        &self.roster
    }

    /// A join request was issued (credential already in hand).
    pub fn begin_connecting(&mut self) {
        debug_assert_eq!(self.state, SessionState::Idle);
        self.state = SessionState::Connecting;
    }

    pub fn apply(&mut self, event: ProviderEvent) {
        match event {
            ProviderEvent::Connected => {
                info!("Session connected as {}", self.role);
                self.state = SessionState::Connected;
            }
            ProviderEvent::PeerJoined { peer, role } => {
                debug!("Peer joined: {peer} ({role})");
                self.roster.add(peer, role);
            }
            ProviderEvent::PeerLeft { peer } => {
                debug!("Peer left: {peer}");
                self.roster.remove(&peer);
            }
            ProviderEvent::Failed { reason } => {
                self.state = SessionState::Error(reason);
            }
        }
    }

    /// Explicit leave, valid from any state.
    pub fn leave(&mut self) {
        self.state = SessionState::Disconnected;
        self.roster = PeerRoster::new();
    }

    /// The peer currently treated as host: ourselves when we hold the role,
    /// otherwise the first roster peer claiming it.
    pub fn host_peer(&self) -> Option<&PeerId> {
        match self.role {
            SessionRole::Host => Some(&self.local),
            SessionRole::Viewer => self.roster.first_host(),
        }
    }
}

// MARK: - LocalSessionHub

struct HubPeer {
    peer: PeerId,
    role: SessionRole,
    tx: mpsc::Sender<ProviderEvent>,
}

/// In-process session provider connecting peers inside one runtime. Backs
/// the demo mode and the lifecycle tests.
#[derive(Default)]
pub struct LocalSessionHub {
    peers: Arc<RwLock<Vec<HubPeer>>>,
}

impl LocalSessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider endpoint for one local peer.
    pub fn provider(&self, peer: PeerId, role: SessionRole) -> LocalSessionProvider {
        LocalSessionProvider {
            peers: Arc::clone(&self.peers),
            local: peer,
            role,
        }
    }
}

pub struct LocalSessionProvider {
    peers: Arc<RwLock<Vec<HubPeer>>>,
    local: PeerId,
    role: SessionRole,
}

#[async_trait]
impl SessionProvider for LocalSessionProvider {
    async fn join_room(
        &self,
        room: &RoomId,
        token: &str,
    ) -> Result<mpsc::Receiver<ProviderEvent>, RoverError> {
        if token.is_empty() {
            return Err(RoverError::Auth {
                reason: "empty access token".into(),
            });
        }
        info!("{} joining room {room} as {}", self.local, self.role);

        let (tx, rx) = mpsc::channel(32);
        let mut peers = self.peers.write();

        // Back-fill the joiner with the existing roster, then announce.
        let _ = tx.try_send(ProviderEvent::Connected);
        for other in peers.iter() {
            let _ = tx.try_send(ProviderEvent::PeerJoined {
                peer: other.peer.clone(),
                role: other.role,
            });
            let _ = other.tx.try_send(ProviderEvent::PeerJoined {
                peer: self.local.clone(),
                role: self.role,
            });
        }
        peers.push(HubPeer {
            peer: self.local.clone(),
            role: self.role,
            tx,
        });
        Ok(rx)
    }

    async fn leave_room(&self) -> Result<(), RoverError> {
        let mut peers = self.peers.write();
        peers.retain(|p| p.peer != self.local);
        for other in peers.iter() {
            let _ = other.tx.try_send(ProviderEvent::PeerLeft {
                peer: self.local.clone(),
            });
        }
        Ok(())
    }
}
