use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};

use super::DecodeError;

/// The fixed 12-byte DNS message header (RFC 1035 §4.1.1).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DNSHeader {
    pub id: u16,
    pub qr: bool,
    pub opcode: u8,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub z: u8,
    pub rcode: u8,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl DNSHeader {
    pub const WIRE_LEN: usize = 12;

    pub fn encode(&self, out: &mut Vec<u8>) {
        let mut writer = BitWriter::endian(out, BigEndian);
        writer.write_var::<u16>(16, self.id).unwrap();
        writer.write_var::<u8>(1, self.qr as u8).unwrap();
        writer.write_var::<u8>(4, self.opcode).unwrap();
        writer.write_var::<u8>(1, self.aa as u8).unwrap();
        writer.write_var::<u8>(1, self.tc as u8).unwrap();
        writer.write_var::<u8>(1, self.rd as u8).unwrap();
        writer.write_var::<u8>(1, self.ra as u8).unwrap();
        writer.write_var::<u8>(3, self.z).unwrap();
        writer.write_var::<u8>(4, self.rcode).unwrap();
        writer.write_var::<u16>(16, self.qdcount).unwrap();
        writer.write_var::<u16>(16, self.ancount).unwrap();
        writer.write_var::<u16>(16, self.nscount).unwrap();
        writer.write_var::<u16>(16, self.arcount).unwrap();
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < Self::WIRE_LEN {
            return Err(DecodeError::MessageTooShort);
        }
        let mut reader = BitReader::endian(&bytes[..Self::WIRE_LEN], BigEndian);
        let id = reader.read_var::<u16>(16)?;
        let qr = reader.read_var::<u8>(1)? == 1;
        let opcode = reader.read_var::<u8>(4)?;
        let aa = reader.read_var::<u8>(1)? == 1;
        let tc = reader.read_var::<u8>(1)? == 1;
        let rd = reader.read_var::<u8>(1)? == 1;
        let ra = reader.read_var::<u8>(1)? == 1;
        let z = reader.read_var::<u8>(3)?;
        let rcode = reader.read_var::<u8>(4)?;
        let qdcount = reader.read_var::<u16>(16)?;
        let ancount = reader.read_var::<u16>(16)?;
        let nscount = reader.read_var::<u16>(16)?;
        let arcount = reader.read_var::<u16>(16)?;
        Ok(Self {
            id,
            qr,
            opcode,
            aa,
            tc,
            rd,
            ra,
            z,
            rcode,
            qdcount,
            ancount,
            nscount,
            arcount,
        })
    }
}
