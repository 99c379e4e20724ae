//! Thin façade over the session provider's data-channel primitive.
//!
//! The provider owns transport, ordering and delivery; this layer only
//! narrows its surface to `send(target, label, payload)` plus an async
//! subscription. Sends are fire-and-forget — there is no acknowledgment and
//! no retry, matching the underlying channel's own semantics.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;
use syncrover_core::{ChannelError, PeerId};
use tokio::sync::broadcast;
use tracing::debug;

/// Logical channel carrying the full rover state every animation frame.
pub const LABEL_CAR_UPDATE: &str = "car-update";
/// Stateless trigger channel — any payload means "play the horn locally".
pub const LABEL_HORN: &str = "horn";

/// Per-peer delivery buffer. A slow viewer lags (and drops oldest) rather
/// than stalling the host's frame loop.
const PEER_BUFFER: usize = 64;

// MARK: - Message + addressing

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// Every other peer in the room.
    All,
    /// A single peer.
    Peer(&'a PeerId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMessage {
    pub from: PeerId,
    pub label: String,
    pub payload: Bytes,
}

// MARK: - SignalChannel

pub trait SignalChannel: Send + Sync {
    /// Fire-and-forget send. Delivery failures are the transport's business;
    /// callers log and move on.
    fn send(&self, to: Target<'_>, label: &str, payload: Bytes) -> Result<(), ChannelError>;

    /// Subscribe to messages addressed to the locally joined peer.
    fn subscribe(&self) -> broadcast::Receiver<ChannelMessage>;
}

// MARK: - LoopbackHub

/// In-memory hub connecting peers inside one process. Backs the tests and
/// the single-process demo mode; a production deployment substitutes the
/// session provider's own data channel behind the same trait.
#[derive(Default)]
pub struct LoopbackHub {
    peers: Arc<RwLock<HashMap<PeerId, broadcast::Sender<ChannelMessage>>>>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer and hand back its channel endpoint.
    pub fn attach(&self, peer_id: PeerId) -> LoopbackChannel {
        let (tx, _) = broadcast::channel(PEER_BUFFER);
        self.peers.write().insert(peer_id.clone(), tx);
        LoopbackChannel {
            local: peer_id,
            peers: Arc::clone(&self.peers),
        }
    }

    /// Remove a peer; in-flight subscriptions observe a closed channel.
    pub fn detach(&self, peer_id: &PeerId) {
        self.peers.write().remove(peer_id);
    }

    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }
}

// MARK: - LoopbackChannel

pub struct LoopbackChannel {
    local: PeerId,
    peers: Arc<RwLock<HashMap<PeerId, broadcast::Sender<ChannelMessage>>>>,
}

impl LoopbackChannel {
    pub fn local_peer(&self) -> &PeerId {
        &self.local
    }
}

impl SignalChannel for LoopbackChannel {
    fn send(&self, to: Target<'_>, label: &str, payload: Bytes) -> Result<(), ChannelError> {
        let msg = ChannelMessage {
            from: self.local.clone(),
            label: label.to_string(),
            payload,
        };
        let peers = self.peers.read();
        match to {
            Target::All => {
                for (peer, tx) in peers.iter() {
                    if peer == &self.local {
                        continue;
                    }
                    // No subscribers yet is not an error for fire-and-forget.
                    if tx.send(msg.clone()).is_err() {
                        debug!("Dropped '{}' for {} (no receiver)", label, peer);
                    }
                }
                Ok(())
            }
            Target::Peer(peer) => match peers.get(peer) {
                Some(tx) => {
                    if tx.send(msg).is_err() {
                        debug!("Dropped '{}' for {} (no receiver)", label, peer);
                    }
                    Ok(())
                }
                None => Err(ChannelError::SendFailed {
                    reason: format!("unknown peer {peer}"),
                }),
            },
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ChannelMessage> {
        let peers = self.peers.read();
        match peers.get(&self.local) {
            Some(tx) => tx.subscribe(),
            // Detached mid-flight: hand out a receiver that reports Closed.
            None => broadcast::channel(1).1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(name: &str) -> PeerId {
        PeerId::new(name)
    }

    #[tokio::test]
    async fn broadcast_reaches_every_other_peer_but_not_the_sender() {
        let hub = LoopbackHub::new();
        let host = hub.attach(peer("host"));
        let v1 = hub.attach(peer("v1"));
        let v2 = hub.attach(peer("v2"));

        let mut host_rx = host.subscribe();
        let mut v1_rx = v1.subscribe();
        let mut v2_rx = v2.subscribe();

        host.send(Target::All, LABEL_HORN, Bytes::from_static(b"play"))
            .expect("send ok");

        for rx in [&mut v1_rx, &mut v2_rx] {
            let msg = rx.recv().await.expect("delivered");
            assert_eq!(msg.from, peer("host"));
            assert_eq!(msg.label, LABEL_HORN);
            assert_eq!(msg.payload, Bytes::from_static(b"play"));
        }
        assert!(host_rx.try_recv().is_err(), "sender must not hear itself");
    }

    #[tokio::test]
    async fn targeted_send_reaches_only_the_target() {
        let hub = LoopbackHub::new();
        let host = hub.attach(peer("host"));
        let v1 = hub.attach(peer("v1"));
        let v2 = hub.attach(peer("v2"));

        let mut v1_rx = v1.subscribe();
        let mut v2_rx = v2.subscribe();

        host.send(Target::Peer(&peer("v1")), "ping", Bytes::from_static(b"x"))
            .expect("send ok");

        assert_eq!(v1_rx.recv().await.expect("delivered").label, "ping");
        assert!(v2_rx.try_recv().is_err());
    }

    #[test]
    fn send_to_unknown_peer_fails() {
        let hub = LoopbackHub::new();
        let host = hub.attach(peer("host"));
        let err = host
            .send(Target::Peer(&peer("ghost")), "ping", Bytes::new())
            .expect_err("unknown peer");
        assert!(matches!(err, ChannelError::SendFailed { .. }));
    }

    #[test]
    fn broadcast_without_subscribers_is_not_an_error() {
        let hub = LoopbackHub::new();
        let host = hub.attach(peer("host"));
        let _viewer = hub.attach(peer("v1"));
        // Viewer never subscribed — fire-and-forget still succeeds.
        host.send(Target::All, LABEL_HORN, Bytes::new()).expect("ok");
    }

    #[test]
    fn detach_shrinks_the_roster() {
        let hub = LoopbackHub::new();
        let _host = hub.attach(peer("host"));
        let _v1 = hub.attach(peer("v1"));
        assert_eq!(hub.len(), 2);
        hub.detach(&peer("v1"));
        assert_eq!(hub.len(), 1);
    }
}
