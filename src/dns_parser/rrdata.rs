use std::io;
use std::net::{Ipv4Addr, Ipv6Addr};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use super::{Error, Name, Type};

/// Decoded rdata of the record types a resolver asks for
///
/// Other types, including codes `Type` has no name for, are kept as raw
/// bytes.
#[derive(Debug, Clone)]
pub enum RRData<'a> {
    CNAME(Name<'a>),
    NS(Name<'a>),
    PTR(Name<'a>),
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    SRV {
        priority: u16,
        weight: u16,
        port: u16,
        target: Name<'a>,
    },
    Unknown {
        typ: u16,
        data: &'a [u8],
    },
}

// A name that must fill the rdata exactly.
fn whole_name<'a>(rdata: &'a [u8], original: &'a [u8]) -> Result<Name<'a>, Error> {
    let (name, size) = Name::scan(rdata, original)?;
    if size != rdata.len() {
        return Err(Error::WrongRdataLength);
    }
    Ok(name)
}

impl<'a> RRData<'a> {
    /// The TYPE code written for this rdata
    pub fn type_code(&self) -> u16 {
        match *self {
            RRData::CNAME(..) => Type::CNAME as u16,
            RRData::NS(..) => Type::NS as u16,
            RRData::PTR(..) => Type::PTR as u16,
            RRData::A(..) => Type::A as u16,
            RRData::AAAA(..) => Type::AAAA as u16,
            RRData::SRV { .. } => Type::SRV as u16,
            RRData::Unknown { typ, .. } => typ,
        }
    }

    pub fn write_to<T: io::Write>(&self, writer: &mut T) -> io::Result<()> {
        match *self {
            RRData::CNAME(ref name) | RRData::NS(ref name) | RRData::PTR(ref name) => {
                name.write_to(writer)
            }
            RRData::A(ip) => writer.write_all(&ip.octets()),
            RRData::AAAA(ip) => writer.write_all(&ip.octets()),
            RRData::SRV {
                priority,
                weight,
                port,
                ref target,
            } => {
                writer.write_u16::<BigEndian>(priority)?;
                writer.write_u16::<BigEndian>(weight)?;
                writer.write_u16::<BigEndian>(port)?;
                target.write_to(writer)
            }
            RRData::Unknown { data, .. } => writer.write_all(data),
        }
    }

    /// Decodes `rdata` of type `typ`
    ///
    /// Names are resolved against `original`, the whole packet. Addresses
    /// must have their exact size and names must fill the rdata.
    pub fn parse(typ: Type, rdata: &'a [u8], original: &'a [u8]) -> Result<RRData<'a>, Error> {
        match typ {
            Type::A => {
                if rdata.len() != 4 {
                    return Err(Error::WrongRdataLength);
                }
                Ok(RRData::A(Ipv4Addr::new(rdata[0], rdata[1], rdata[2], rdata[3])))
            }
            Type::AAAA => {
                if rdata.len() != 16 {
                    return Err(Error::WrongRdataLength);
                }
                let mut octets = [0u8; 16];
                octets.copy_from_slice(rdata);
                Ok(RRData::AAAA(Ipv6Addr::from(octets)))
            }
            Type::CNAME => Ok(RRData::CNAME(whole_name(rdata, original)?)),
            Type::NS => Ok(RRData::NS(whole_name(rdata, original)?)),
            Type::PTR => Ok(RRData::PTR(whole_name(rdata, original)?)),
            Type::SRV => {
                // three u16 fields and at least the root label
                if rdata.len() < 7 {
                    return Err(Error::WrongRdataLength);
                }
                Ok(RRData::SRV {
                    priority: BigEndian::read_u16(&rdata[..2]),
                    weight: BigEndian::read_u16(&rdata[2..4]),
                    port: BigEndian::read_u16(&rdata[4..6]),
                    target: whole_name(&rdata[6..], original)?,
                })
            }
            typ => Ok(RRData::Unknown {
                typ: typ as u16,
                data: rdata,
            }),
        }
    }
}
