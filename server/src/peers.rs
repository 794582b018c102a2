//! Registry of connected peers keyed by network address
//!
//! Peers are never told they are disconnected: one that stays silent for
//! longer than the idle timeout is simply dropped, and a datagram arriving from
//! it later counts as a brand-new connection.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct PeerRegistry {
    /// Peers in connection order
    addrs: Vec<SocketAddr>,
    last_seen: HashMap<SocketAddr, Instant>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new peer. Returns false if it was already known.
    pub fn connect(&mut self, addr: SocketAddr) -> bool {
        if self.contains(addr) {
            return false;
        }

        info!("Peer connected from {}", addr);
        self.addrs.push(addr);
        self.last_seen.insert(addr, Instant::now());
        true
    }

    pub fn touch(&mut self, addr: SocketAddr) {
        self.touch_at(addr, Instant::now());
    }

    pub fn touch_at(&mut self, addr: SocketAddr, now: Instant) {
        if let Some(last_seen) = self.last_seen.get_mut(&addr) {
            *last_seen = now;
        }
    }

    pub fn remove(&mut self, addr: SocketAddr) -> bool {
        if self.last_seen.remove(&addr).is_none() {
            return false;
        }

        self.addrs.retain(|known| *known != addr);
        info!("Peer {} disconnected", addr);
        true
    }

    pub fn contains(&self, addr: SocketAddr) -> bool {
        self.last_seen.contains_key(&addr)
    }

    /// Peers whose last activity is older than `timeout`
    pub fn expired(&self, timeout: Duration) -> Vec<SocketAddr> {
        self.expired_at(Instant::now(), timeout)
    }

    pub fn expired_at(&self, now: Instant, timeout: Duration) -> Vec<SocketAddr> {
        self.addrs
            .iter()
            .filter(|addr| {
                self.last_seen
                    .get(addr)
                    .is_some_and(|last_seen| now.saturating_duration_since(*last_seen) > timeout)
            })
            .copied()
            .collect()
    }

    pub fn addrs(&self) -> &[SocketAddr] {
        &self.addrs
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:8080".parse().unwrap()
    }

    fn test_addr2() -> SocketAddr {
        "127.0.0.1:8081".parse().unwrap()
    }

    #[test]
    fn test_registry_creation() {
        let registry = PeerRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_connect_keeps_order() {
        let mut registry = PeerRegistry::new();
        assert!(registry.connect(test_addr2()));
        assert!(registry.connect(test_addr()));
        assert!(!registry.connect(test_addr2()));

        assert_eq!(registry.addrs(), &[test_addr2(), test_addr()]);
    }

    #[test]
    fn test_remove_peer() {
        let mut registry = PeerRegistry::new();
        registry.connect(test_addr());

        assert!(registry.remove(test_addr()));
        assert!(!registry.remove(test_addr()));
        assert!(!registry.contains(test_addr()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_expired_peers() {
        let mut registry = PeerRegistry::new();
        let now = Instant::now();
        registry.connect(test_addr());
        registry.connect(test_addr2());
        registry.touch_at(test_addr2(), now + Duration::from_secs(2));

        let later = now + Duration::from_secs(3);
        assert_eq!(
            registry.expired_at(later, Duration::from_secs(2)),
            vec![test_addr()]
        );
        assert!(registry.expired_at(now, Duration::from_secs(2)).is_empty());
    }

    #[test]
    fn test_touch_unknown_peer_is_ignored() {
        let mut registry = PeerRegistry::new();
        registry.touch(test_addr());
        assert!(!registry.contains(test_addr()));
    }
}
