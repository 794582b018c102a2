use shared::Message;
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("socket error: {0}")]
    Io(#[from] io::Error),
    /// A peer sent something outside the server's vocabulary, which means the
    /// two sides disagree on the protocol
    #[error("peer {peer} sent unexpected payload {message:?}")]
    UnexpectedPayload { peer: SocketAddr, message: Message },
    #[error("no player registered for peer {0}")]
    UnknownPeer(SocketAddr),
}
