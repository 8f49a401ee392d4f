use super::enums::{DNSResourceClass, DNSResourceType};
use super::wire::{Cursor, Writer};
use super::{DecodeError, EncodeError};

/// RDATA, decoded far enough to survive re-encoding.
///
/// Name-bearing record types (`NS`/`CNAME`/`PTR`/`MX`/`SOA`) may embed a
/// compression pointer into their RDATA; such a pointer is an absolute
/// offset into the *original* wire buffer. Storing it verbatim and
/// rewriting every record's owner name uncompressed on the way back out
/// (as `Writer::write_name` always does) shifts every byte offset after
/// the first record, so a pointer copied untouched would point at the
/// wrong bytes in the re-encoded message. Decoding these fields into
/// their own names up front — the same way an owner name already is —
/// and re-emitting them uncompressed on encode sidesteps the problem:
/// there is no pointer left in flight to go stale.
///
/// Every other record type's RDATA has no embedded name and is kept
/// as an opaque blob; this proxy caches and replays records, it does
/// not otherwise reason about their contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RData {
    /// `NS`, `CNAME`, `PTR`: RDATA is a single domain name.
    Name(Vec<String>),
    /// `MX`: a 16-bit preference followed by the exchange's domain name.
    Mx { preference: u16, exchange: Vec<String> },
    /// `SOA`: two domain names followed by five 32-bit fields.
    Soa {
        mname: Vec<String>,
        rname: Vec<String>,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    Opaque(Vec<u8>),
}

impl RData {
    fn to_wire(&self) -> Result<Vec<u8>, EncodeError> {
        let mut writer = Writer::new();
        match self {
            RData::Opaque(bytes) => return Ok(bytes.clone()),
            RData::Name(name) => writer.write_name(name)?,
            RData::Mx { preference, exchange } => {
                writer.write_u16(*preference);
                writer.write_name(exchange)?;
            }
            RData::Soa {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => {
                writer.write_name(mname)?;
                writer.write_name(rname)?;
                writer.write_u32(*serial);
                writer.write_u32(*refresh);
                writer.write_u32(*retry);
                writer.write_u32(*expire);
                writer.write_u32(*minimum);
            }
        }
        Ok(writer.buf)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: Vec<String>,
    pub rtype: DNSResourceType,
    pub rclass: DNSResourceClass,
    pub ttl: u32,
    pub rdata: RData,
}

impl ResourceRecord {
    pub fn decode(cursor: &mut Cursor) -> Result<Self, DecodeError> {
        let name = cursor.read_name()?;
        let rtype = cursor.read_u16()?.into();
        let rclass = cursor.read_u16()?.into();
        let ttl = cursor.read_u32()?;
        let rdlen = cursor.read_u16()? as usize;
        let rdata = match rtype {
            DNSResourceType::NS | DNSResourceType::CNAME | DNSResourceType::PTR => RData::Name(cursor.read_name()?),
            DNSResourceType::MX => {
                let preference = cursor.read_u16()?;
                let exchange = cursor.read_name()?;
                RData::Mx { preference, exchange }
            }
            DNSResourceType::SOA => {
                let mname = cursor.read_name()?;
                let rname = cursor.read_name()?;
                let serial = cursor.read_u32()?;
                let refresh = cursor.read_u32()?;
                let retry = cursor.read_u32()?;
                let expire = cursor.read_u32()?;
                let minimum = cursor.read_u32()?;
                RData::Soa {
                    mname,
                    rname,
                    serial,
                    refresh,
                    retry,
                    expire,
                    minimum,
                }
            }
            _ => RData::Opaque(cursor.read_bytes(rdlen)?.to_vec()),
        };
        Ok(Self { name, rtype, rclass, ttl, rdata })
    }

    pub fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.write_name(&self.name)?;
        writer.write_u16(self.rtype.into());
        writer.write_u16(self.rclass.into());
        writer.write_u32(self.ttl);
        let rdata_bytes = self.rdata.to_wire()?;
        if rdata_bytes.len() > u16::MAX as usize {
            return Err(EncodeError::SectionTooLarge {
                section: "rdata",
                len: rdata_bytes.len(),
            });
        }
        writer.write_u16(rdata_bytes.len() as u16);
        writer.write_bytes(&rdata_bytes);
        Ok(())
    }
}
