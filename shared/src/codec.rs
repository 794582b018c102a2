//! Datagram framing
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | [`PROTOCOL_ID`] as little-endian `u32` |
//! | 4 | N | bincode-encoded [`Message`] |
//!
//! Anything that fails either check is not ours and gets dropped by the caller.

use crate::error::CodecError;
use crate::protocol::Message;
use crate::PROTOCOL_ID;

pub const PROTOCOL_HEADER: [u8; 4] = PROTOCOL_ID.to_le_bytes();

pub fn encode(message: &Message) -> Result<Vec<u8>, CodecError> {
    let payload = bincode::serialize(message).map_err(CodecError::Encode)?;
    let mut data = Vec::with_capacity(PROTOCOL_HEADER.len() + payload.len());
    data.extend_from_slice(&PROTOCOL_HEADER);
    data.extend_from_slice(&payload);
    Ok(data)
}

pub fn decode(data: &[u8]) -> Result<Message, CodecError> {
    if data.len() < PROTOCOL_HEADER.len() {
        return Err(CodecError::Truncated(data.len()));
    }

    let (header, payload) = data.split_at(PROTOCOL_HEADER.len());
    if header != PROTOCOL_HEADER {
        return Err(CodecError::ForeignProtocol);
    }

    bincode::deserialize(payload).map_err(CodecError::Malformed)
}
