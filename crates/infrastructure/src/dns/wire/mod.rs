//! DNS message codec (RFC 1035 §4).
//!
//! Pure functions over byte buffers. The encoder never compresses names; the
//! decoder expands compression pointers, bounded by [`MAX_POINTER_FOLLOWS`]
//! and by requiring every pointer to move strictly backward.

mod decoder;
mod encoder;
mod name;
mod rdata;

pub use decoder::{decode_header_and_questions, decode_message};
pub use encoder::{encode_message, encode_query, encode_rdata};

pub const HEADER_LEN: usize = 12;
pub const MAX_LABEL_LEN: usize = 63;
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_POINTER_FOLLOWS: usize = 16;

/// Datagram ceiling used when receiving over UDP (EDNS(0) sized).
pub const MAX_UDP_PAYLOAD: usize = 4096;

/// Reads the TC bit without decoding the message.
pub fn is_truncated(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && bytes[2] & 0x02 != 0
}

/// Reads the transaction id without decoding the message.
pub fn message_id(bytes: &[u8]) -> Option<u16> {
    Some(u16::from_be_bytes([*bytes.first()?, *bytes.get(1)?]))
}
