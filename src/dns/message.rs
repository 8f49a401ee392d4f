use super::header::DNSHeader;
use super::question::DNSQuestion;
use super::resource::ResourceRecord;
use super::wire::{Cursor, Writer};
use super::{DecodeError, EncodeError};

/// A fully parsed DNS message: header, questions, and the three
/// resource record sections. Produced by the codec from raw bytes;
/// the only mutation performed elsewhere in this crate is overwriting
/// `header.id` when replaying a cached reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DNSMessage {
    pub header: DNSHeader,
    pub questions: Vec<DNSQuestion>,
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
    pub additionals: Vec<ResourceRecord>,
}

impl DNSMessage {
    /// Parses a full message body (no transport framing) out of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let header = DNSHeader::decode(bytes)?;
        let mut cursor = Cursor::new(bytes, DNSHeader::WIRE_LEN);

        let mut questions = Vec::with_capacity(header.qdcount as usize);
        for _ in 0..header.qdcount {
            questions.push(DNSQuestion::decode(&mut cursor)?);
        }

        let answers = decode_records(&mut cursor, header.ancount)?;
        let authorities = decode_records(&mut cursor, header.nscount)?;
        let additionals = decode_records(&mut cursor, header.arcount)?;

        Ok(Self {
            header,
            questions,
            answers,
            authorities,
            additionals,
        })
    }

    /// Serializes this message back to its body form (no transport framing).
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        if self.questions.len() > u16::MAX as usize {
            return Err(EncodeError::SectionTooLarge {
                section: "questions",
                len: self.questions.len(),
            });
        }
        let mut header = self.header.clone();
        header.qdcount = self.questions.len() as u16;
        header.ancount = self.answers.len() as u16;
        header.nscount = self.authorities.len() as u16;
        header.arcount = self.additionals.len() as u16;

        let mut out = Vec::with_capacity(512);
        header.encode(&mut out);

        let mut writer = Writer::new();
        for q in &self.questions {
            q.encode(&mut writer)?;
        }
        for r in self.answers.iter().chain(&self.authorities).chain(&self.additionals) {
            r.encode(&mut writer)?;
        }
        out.extend_from_slice(&writer.buf);
        Ok(out)
    }
}

fn decode_records(cursor: &mut Cursor, count: u16) -> Result<Vec<ResourceRecord>, DecodeError> {
    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        records.push(ResourceRecord::decode(cursor)?);
    }
    Ok(records)
}
