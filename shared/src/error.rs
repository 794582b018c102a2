use std::io;
use thiserror::Error;

/// Reasons a datagram is rejected by the codec
#[derive(Debug, Error)]
pub enum CodecError {
    /// The datagram does not start with our protocol identifier
    #[error("datagram does not carry the protocol identifier")]
    ForeignProtocol,
    #[error("datagram truncated: {0} bytes")]
    Truncated(usize),
    #[error("malformed payload: {0}")]
    Malformed(bincode::Error),
    #[error("failed to encode payload: {0}")]
    Encode(bincode::Error),
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("socket error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("address did not resolve to any socket address")]
    Unresolved,
    #[error("socket is closed")]
    Closed,
}
