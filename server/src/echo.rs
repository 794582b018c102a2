//! Rebroadcasts everything it receives; useful for checking connectivity

use crate::error::ServerError;
use crate::network::{Handler, Network};
use log::debug;
use shared::Message;
use std::net::SocketAddr;

#[derive(Debug, Default)]
pub struct EchoServer;

impl Handler for EchoServer {
    fn handle(
        &mut self,
        net: &mut Network,
        peer: SocketAddr,
        message: Message,
    ) -> Result<(), ServerError> {
        debug!("Echoing {:?} from {}", message, peer);
        net.send_to_all(&message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Server;
    use shared::codec::{decode, encode};
    use shared::{Input, Key, MAX_DATAGRAM_SIZE};
    use std::net::UdpSocket;
    use std::time::Duration;

    #[test]
    fn test_echo_reaches_every_peer() {
        let mut server = Server::bind("127.0.0.1:0", EchoServer).unwrap();
        let addr = server.local_addr().unwrap();

        let first = UdpSocket::bind("127.0.0.1:0").unwrap();
        let second = UdpSocket::bind("127.0.0.1:0").unwrap();
        for socket in [&first, &second] {
            socket
                .set_read_timeout(Some(Duration::from_millis(20)))
                .unwrap();
        }

        let ping = encode(&Input::Ping.into()).unwrap();
        first.send_to(&ping, addr).unwrap();
        second.send_to(&ping, addr).unwrap();
        for _ in 0..100 {
            server.step().unwrap();
            if server.peers().len() == 2 {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(server.peers().len(), 2);

        let message = Message::from(Input::KeyDown(Key::Down));
        first.send_to(&encode(&message).unwrap(), addr).unwrap();

        let mut buffer = [0u8; MAX_DATAGRAM_SIZE];
        for socket in [&first, &second] {
            let mut echoed = false;
            for _ in 0..50 {
                server.step().unwrap();
                if let Ok(len) = socket.recv(&mut buffer) {
                    if decode(&buffer[..len]).unwrap() == message {
                        echoed = true;
                        break;
                    }
                }
            }
            assert!(echoed, "peer never received the echo");
        }
    }
}
