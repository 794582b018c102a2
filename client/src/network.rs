//! Client side of the transport: one UDP socket talking to one server

use log::{debug, info, warn};
use shared::codec::{decode, encode};
use shared::{Message, NetworkError, MAX_DATAGRAM_SIZE};
use std::io::ErrorKind;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

pub struct Client {
    socket: Option<UdpSocket>,
    server_addr: SocketAddr,
}

impl Client {
    /// Opens a non-blocking socket on an OS-assigned port and binds it to the
    /// server's address. Resolution and socket failures surface here.
    pub fn connect<A: ToSocketAddrs>(server_addr: A) -> Result<Self, NetworkError> {
        let server_addr = server_addr
            .to_socket_addrs()?
            .next()
            .ok_or(NetworkError::Unresolved)?;

        let local_addr: SocketAddr = if server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local_addr)?;
        socket.connect(server_addr)?;
        socket.set_nonblocking(true)?;

        info!(
            "Client socket bound to {} talking to {}",
            socket.local_addr()?,
            server_addr
        );

        Ok(Client {
            socket: Some(socket),
            server_addr,
        })
    }

    /// Blocking mode suits simple request/response use; game loops poll
    pub fn set_blocking(&self, blocking: bool) -> Result<(), NetworkError> {
        self.socket()?.set_nonblocking(!blocking)?;
        Ok(())
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetworkError> {
        Ok(self.socket()?.local_addr()?)
    }

    /// Sends one datagram. Delivery is not guaranteed and a full send buffer
    /// or an earlier ICMP error just drops the datagram.
    pub fn send(&self, message: &Message) -> Result<(), NetworkError> {
        let data = encode(message)?;

        match self.socket()?.send(&data) {
            Ok(_) => Ok(()),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock
                        | ErrorKind::ConnectionRefused
                        | ErrorKind::ConnectionReset
                ) =>
            {
                debug!("Dropped outgoing {:?}: {}", message, e);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the next message from the server, or `None` once nothing is
    /// queued. Datagrams from other addresses or with a foreign header are
    /// skipped. Acknowledgment-worthy messages are acknowledged immediately.
    pub fn receive(&self) -> Option<Message> {
        let socket = self.socket.as_ref()?;
        let mut buffer = [0u8; MAX_DATAGRAM_SIZE];

        loop {
            let (len, from) = match socket.recv_from(&mut buffer) {
                Ok(received) => received,
                Err(e) if e.kind() == ErrorKind::WouldBlock => return None,
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset
                    ) =>
                {
                    continue
                }
                Err(e) => {
                    warn!("Error receiving packet: {}", e);
                    return None;
                }
            };

            if from != self.server_addr {
                debug!("Ignoring datagram from unexpected address {}", from);
                continue;
            }

            let message = match decode(&buffer[..len]) {
                Ok(message) => message,
                Err(e) => {
                    debug!("Dropping datagram from {}: {}", from, e);
                    continue;
                }
            };

            if message.needs_ack() {
                if let Err(e) = self.send(&message.acknowledge()) {
                    warn!("Failed to acknowledge {:?}: {}", message, e);
                }
            }

            return Some(message);
        }
    }

    /// Releases the socket. Calling it again does nothing.
    pub fn close(&mut self) {
        if self.socket.take().is_some() {
            info!("Client socket closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.socket.is_none()
    }

    fn socket(&self) -> Result<&UdpSocket, NetworkError> {
        self.socket.as_ref().ok_or(NetworkError::Closed)
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}
