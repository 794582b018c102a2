//! Server network layer: non-blocking UDP polling and the connection lifecycle

use crate::error::ServerError;
use crate::peers::PeerRegistry;
use crate::reliability::PendingAcks;
use log::{debug, error, info, warn};
use shared::codec::{decode, encode};
use shared::{Message, DEFAULT_CLIENT_TIMEOUT, MAX_DATAGRAM_SIZE};
use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

/// Extension points invoked by [`Server::step`]
///
/// Every hook gets the [`Network`] so it can reply or broadcast.
pub trait Handler {
    fn handle_connect(&mut self, _net: &mut Network, _peer: SocketAddr) -> Result<(), ServerError> {
        Ok(())
    }

    fn handle_disconnect(
        &mut self,
        _net: &mut Network,
        _peer: SocketAddr,
    ) -> Result<(), ServerError> {
        Ok(())
    }

    /// Called for every decoded message except acknowledgements
    fn handle(
        &mut self,
        net: &mut Network,
        peer: SocketAddr,
        message: Message,
    ) -> Result<(), ServerError>;

    /// Called once per step after the socket is drained and timeouts are checked
    fn update(&mut self, _net: &mut Network) -> Result<(), ServerError> {
        Ok(())
    }
}

/// Socket plus the bookkeeping hooks need for sending
pub struct Network {
    socket: UdpSocket,
    pub(crate) peers: PeerRegistry,
    pub(crate) pending: PendingAcks,
}

impl Network {
    pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self, ServerError> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;

        Ok(Network {
            socket,
            peers: PeerRegistry::new(),
            pending: PendingAcks::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.socket.local_addr()?)
    }

    /// Unicasts a message. With `needs_ack` set, acknowledgment-worthy
    /// messages are also kept for retransmission until the peer confirms them.
    pub fn send_to(&mut self, peer: SocketAddr, message: &Message, needs_ack: bool) {
        if needs_ack && message.needs_ack() {
            self.pending.insert(peer, message.clone());
        }
        self.send_packet(peer, message);
    }

    /// Unicasts to every connected peer, tracking acknowledgment-worthy messages
    pub fn send_to_all(&mut self, message: &Message) {
        let peers = self.peers.addrs().to_vec();
        for peer in peers {
            self.send_to(peer, message, true);
        }
    }

    pub fn peers(&self) -> &[SocketAddr] {
        self.peers.addrs()
    }

    pub fn pending(&self) -> &PendingAcks {
        &self.pending
    }

    fn send_packet(&self, peer: SocketAddr, message: &Message) {
        let data = match encode(message) {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to encode {:?}: {}", message, e);
                return;
            }
        };

        if let Err(e) = self.socket.send_to(&data, peer) {
            warn!("Failed to send packet to {}: {}", peer, e);
        }
    }

    fn resend_pending(&self) {
        for (peer, message) in self.pending.iter() {
            debug!("Resending unacknowledged {:?} to {}", message, peer);
            self.send_packet(*peer, message);
        }
    }
}

/// Polling UDP server that delegates game behaviour to a [`Handler`]
pub struct Server<H> {
    network: Network,
    handler: H,
    client_timeout: Duration,
}

impl<H: Handler> Server<H> {
    pub fn bind<A: ToSocketAddrs>(addr: A, handler: H) -> Result<Self, ServerError> {
        let network = Network::bind(addr)?;
        info!("Server listening on {}", network.local_addr()?);

        Ok(Server {
            network,
            handler,
            client_timeout: DEFAULT_CLIENT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, client_timeout: Duration) -> Self {
        self.client_timeout = client_timeout;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.network.local_addr()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn peers(&self) -> &[SocketAddr] {
        self.network.peers()
    }

    pub fn send_to(&mut self, peer: SocketAddr, message: &Message, needs_ack: bool) {
        self.network.send_to(peer, message, needs_ack);
    }

    pub fn send_to_all(&mut self, message: &Message) {
        self.network.send_to_all(message);
    }

    /// One poll cycle. Never blocks.
    ///
    /// The receive queue is drained completely before timeouts are checked, so
    /// a burst of traffic cannot get a live peer evicted.
    pub fn step(&mut self) -> Result<(), ServerError> {
        self.receive_all()?;
        self.check_timeouts()?;
        self.handler.update(&mut self.network)?;
        self.network.resend_pending();
        Ok(())
    }

    /// Steps forever on a fixed tick; returns only on a fatal handler error
    pub async fn serve(&mut self, tick: Duration) -> Result<(), ServerError> {
        let mut tick_interval = interval(tick);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Server started successfully");

        loop {
            tick_interval.tick().await;
            if let Err(e) = self.step() {
                error!("Server stopped: {}", e);
                return Err(e);
            }
        }
    }

    pub fn close(self) {
        info!("Server was closed");
    }

    fn receive_all(&mut self) -> Result<(), ServerError> {
        let mut buffer = [0u8; MAX_DATAGRAM_SIZE];

        loop {
            match self.network.socket.recv_from(&mut buffer) {
                Ok((len, addr)) => self.handle_datagram(&buffer[..len], addr)?,
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::ConnectionReset | ErrorKind::ConnectionRefused
                    ) =>
                {
                    continue
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn handle_datagram(&mut self, data: &[u8], addr: SocketAddr) -> Result<(), ServerError> {
        let message = match decode(data) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping datagram from {}: {}", addr, e);
                return Ok(());
            }
        };

        debug!("Server received {:?} from {}", message, addr);

        if self.network.peers.connect(addr) {
            self.handler.handle_connect(&mut self.network, addr)?;
        }
        self.network.peers.touch(addr);

        match message {
            Message::Acknowledge(acknowledged) => {
                self.network.pending.acknowledge(addr, &acknowledged);
                Ok(())
            }
            message => self.handler.handle(&mut self.network, addr, message),
        }
    }

    fn check_timeouts(&mut self) -> Result<(), ServerError> {
        for addr in self.network.peers.expired(self.client_timeout) {
            self.network.peers.remove(addr);
            self.handler.handle_disconnect(&mut self.network, addr)?;
        }
        Ok(())
    }
}
