//! At-least-once delivery for acknowledgment-worthy messages
//!
//! An entry stays pending until the peer echoes the exact message back in an
//! `Acknowledge`. Entries never expire; the server resends all of them every
//! step, with no backoff.

use shared::Message;
use std::net::SocketAddr;

#[derive(Debug, Default)]
pub struct PendingAcks {
    entries: Vec<(SocketAddr, Message)>,
}

impl PendingAcks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message awaiting acknowledgement. Returns false if the same
    /// message is already pending for that peer.
    pub fn insert(&mut self, peer: SocketAddr, message: Message) -> bool {
        if self.contains(peer, &message) {
            return false;
        }
        self.entries.push((peer, message));
        true
    }

    /// Clears the entry matching an acknowledgement. Duplicate or unknown
    /// acknowledgements return false.
    pub fn acknowledge(&mut self, peer: SocketAddr, message: &Message) -> bool {
        match self
            .entries
            .iter()
            .position(|(addr, pending)| *addr == peer && pending == message)
        {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, peer: SocketAddr, message: &Message) -> bool {
        self.entries
            .iter()
            .any(|(addr, pending)| *addr == peer && pending == message)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(SocketAddr, Message)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
