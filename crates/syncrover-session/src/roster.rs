use syncrover_core::{PeerId, SessionRole};
use tracing::warn;

// MARK: - PeerRoster

/// Remote peers of the current session, in discovery order.
///
/// Discovery order matters: when zero or several peers claim the host role,
/// viewers follow the first one discovered and a duplicate claim only logs.
#[derive(Debug, Default)]
pub struct PeerRoster {
    peers: Vec<(PeerId, SessionRole)>,
}

impl PeerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, peer: PeerId, role: SessionRole) {
        if self.peers.iter().any(|(p, _)| p == &peer) {
            return;
        }
        if role == SessionRole::Host && self.first_host().is_some() {
            warn!("Peer {peer} claims host but a host is already known — keeping the first");
        }
        self.peers.push((peer, role));
    }

    pub fn remove(&mut self, peer: &PeerId) {
        self.peers.retain(|(p, _)| p != peer);
    }

    /// The first peer discovered with the host role, if any.
    pub fn first_host(&self) -> Option<&PeerId> {
        self.peers
            .iter()
            .find(|(_, role)| *role == SessionRole::Host)
            .map(|(p, _)| p)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(PeerId, SessionRole)> {
        self.peers.iter()
    }
}
