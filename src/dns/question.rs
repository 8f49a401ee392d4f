use super::enums::{DNSResourceClass, DNSResourceType};
use super::wire::{Cursor, Writer};
use super::{DecodeError, EncodeError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DNSQuestion {
    pub name: Vec<String>,
    pub qtype: DNSResourceType,
    pub qclass: DNSResourceClass,
}

impl DNSQuestion {
    pub fn decode(cursor: &mut Cursor) -> Result<Self, DecodeError> {
        let name = cursor.read_name()?;
        let qtype = cursor.read_u16()?.into();
        let qclass = cursor.read_u16()?.into();
        Ok(Self { name, qtype, qclass })
    }

    pub fn encode(&self, writer: &mut Writer) -> Result<(), EncodeError> {
        writer.write_name(&self.name)?;
        writer.write_u16(self.qtype.into());
        writer.write_u16(self.qclass.into());
        Ok(())
    }
}
