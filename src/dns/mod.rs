//! The DNS message codec: wire bytes in either UDP or TCP framing in,
//! a parsed [`message::DNSMessage`] out, and back.

pub mod codec;
pub mod enums;
pub mod header;
pub mod message;
pub mod question;
pub mod resource;
pub mod wire;

pub use codec::{decode_tcp, decode_udp, encode, Transport};
pub use message::DNSMessage;

/// Malformed input encountered while parsing a DNS message.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("message too short to contain a valid DNS header or section")]
    MessageTooShort,
    #[error("label length {0} exceeds the 63-octet maximum")]
    LabelTooLong(usize),
    #[error("label is not valid UTF-8")]
    InvalidLabel,
    #[error("name decoding followed too many compression pointers")]
    TooManyCompressionPointers,
    #[error("bit-level header field read failed: {0}")]
    BitRead(String),
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError::BitRead(err.to_string())
    }
}

/// A message that cannot be serialized to wire form as specified.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("label {0:?} exceeds the 63-octet maximum")]
    LabelTooLong(String),
    #[error("{section} section has {len} entries/bytes, exceeding the 16-bit wire limit")]
    SectionTooLarge { section: &'static str, len: usize },
}
