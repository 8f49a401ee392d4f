use super::message::DNSMessage;
use super::{DecodeError, EncodeError};

/// Which wire framing a [`DNSMessage`] is carried under.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transport {
    Udp,
    Tcp,
}

/// Parses a bare (unframed) DNS message body, as carried over UDP.
pub fn decode_udp(bytes: &[u8]) -> Result<DNSMessage, DecodeError> {
    DNSMessage::decode(bytes)
}

/// Parses a TCP-framed DNS message: a 2-byte big-endian length prefix
/// followed by the message body. The prefix is not validated against
/// the remaining length beyond ensuring it is present; `DNSMessage::decode`
/// will itself fail on a short or malformed body.
pub fn decode_tcp(bytes: &[u8]) -> Result<DNSMessage, DecodeError> {
    if bytes.len() < 2 {
        return Err(DecodeError::MessageTooShort);
    }
    DNSMessage::decode(&bytes[2..])
}

/// Serializes `msg` to wire form under `transport`. TCP form prepends a
/// 2-byte big-endian length equal to the body length; the length MUST
/// NOT be truncated to 8 bits, so a body of 256..=65535 bytes is
/// rejected rather than silently wrapped.
pub fn encode(msg: &DNSMessage, transport: Transport) -> Result<Vec<u8>, EncodeError> {
    let body = msg.encode()?;
    match transport {
        Transport::Udp => Ok(body),
        Transport::Tcp => {
            if body.len() > u16::MAX as usize {
                return Err(EncodeError::SectionTooLarge {
                    section: "tcp message",
                    len: body.len(),
                });
            }
            let mut framed = Vec::with_capacity(body.len() + 2);
            framed.extend_from_slice(&(body.len() as u16).to_be_bytes());
            framed.extend_from_slice(&body);
            Ok(framed)
        }
    }
}
