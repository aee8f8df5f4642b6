use std::borrow::Cow;
use std::fmt;
use std::fmt::Write;
use std::hash;
use std::io;
use std::str::from_utf8;

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use super::Error;

/// Longest label allowed on the wire
pub const MAX_LABEL_LENGTH: usize = 63;
/// Longest encoded name allowed on the wire
pub const MAX_NAME_LENGTH: usize = 255;
/// Most compression pointers followed while decoding one name
pub const MAX_POINTERS: usize = 127;

/// A domain name, either borrowed from a received packet or built from a
/// dotted string
///
/// Packet names keep their (possibly compressed) labels and are decoded on
/// `to_string()`.
#[derive(Debug, Clone)]
pub enum Name<'a> {
    FromPacket {
        labels: &'a [u8],
        /// The whole packet, which compression pointers index into
        original: &'a [u8],
    },

    FromStr(Cow<'a, str>),
}

impl<'a> Name<'a> {
    /// Scans a possibly compressed name at the start of `data`
    ///
    /// Returns the name and the number of bytes it occupies in `data`.
    /// Compression pointers are resolved against `original`.
    pub fn scan(data: &'a [u8], original: &'a [u8]) -> Result<(Name<'a>, usize), Error> {
        let end = Name::walk(data, original)?;
        Ok((
            Name::FromPacket {
                labels: &data[..end],
                original,
            },
            end,
        ))
    }

    /// Decodes the name at `offset` of `original` into its dotted form
    ///
    /// The root name decodes to an empty string. The second value is the
    /// number of bytes the encoded name occupies at `offset`.
    pub fn expand(original: &'a [u8], offset: usize) -> Result<(String, usize), Error> {
        if offset >= original.len() {
            return Err(Error::UnexpectedEOF);
        }
        let (name, len) = Name::scan(&original[offset..], original)?;
        Ok((name.to_string(), len))
    }

    // Validates the labels at the start of `data`, following pointers.
    // Returns the size of the name in `data`.
    fn walk<'b>(data: &'b [u8], original: &'b [u8]) -> Result<usize, Error> {
        let mut labels = data;
        let mut pos = 0;
        // bytes the name occupies in `data`, known at the first pointer
        let mut size = None;
        let mut decoded = 0;
        let mut pointers = 0;
        loop {
            let byte = *labels.get(pos).ok_or(Error::UnexpectedEOF)?;
            if byte == 0 {
                return Ok(size.unwrap_or(pos + 1));
            } else if byte & 0b1100_0000 == 0b1100_0000 {
                if labels.len() < pos + 2 {
                    return Err(Error::UnexpectedEOF);
                }
                let off = (BigEndian::read_u16(&labels[pos..pos + 2]) & !0b1100_0000_0000_0000)
                    as usize;
                if off >= original.len() {
                    return Err(Error::UnexpectedEOF);
                }
                pointers += 1;
                if pointers > MAX_POINTERS {
                    return Err(Error::NamePointerLoop);
                }
                if size.is_none() {
                    size = Some(pos + 2);
                }
                labels = &original[off..];
                pos = 0;
            } else if byte & 0b1100_0000 == 0 {
                let end = pos + byte as usize + 1;
                if end >= labels.len() {
                    return Err(Error::UnexpectedEOF);
                }
                if from_utf8(&labels[pos + 1..end]).is_err() {
                    return Err(Error::LabelIsNotAscii);
                }
                decoded += byte as usize + 1;
                if decoded > MAX_NAME_LENGTH {
                    return Err(Error::NameTooLong);
                }
                pos = end;
            } else {
                return Err(Error::UnknownLabelFormat);
            }
        }
    }

    // Uncompressed labels of the name, pointers already followed.
    fn labels(&self) -> Labels<'a> {
        match *self {
            Name::FromPacket { labels, original } => Labels {
                data: labels,
                original,
                pos: 0,
                pointers: 0,
            },
            Name::FromStr(_) => Labels {
                data: &[],
                original: &[],
                pos: 0,
                pointers: 0,
            },
        }
    }

    pub fn from_str<T: Into<Cow<'static, str>>>(name: T) -> Result<Name<'a>, Error> {
        let name = name.into();
        let mut total = 1;
        for part in name.trim_end_matches('.').split('.').filter(|p| !p.is_empty()) {
            if !part.is_ascii() {
                return Err(Error::LabelIsNotAscii);
            }
            if part.len() > MAX_LABEL_LENGTH {
                return Err(Error::LabelTooLong);
            }
            total += part.len() + 1;
        }
        if total > MAX_NAME_LENGTH {
            return Err(Error::NameTooLong);
        }
        Ok(Name::FromStr(name))
    }

    pub fn write_to<T: io::Write>(&self, writer: &mut T) -> io::Result<()> {
        match *self {
            Name::FromPacket { .. } => {
                for label in self.labels() {
                    writer.write_u8(label.len() as u8)?;
                    writer.write_all(label)?;
                }
                writer.write_u8(0)
            }

            Name::FromStr(ref name) => {
                for part in name.split('.').filter(|p| !p.is_empty()) {
                    assert!(part.len() <= MAX_LABEL_LENGTH);
                    let ln = part.len() as u8;
                    writer.write_u8(ln)?;
                    writer.write_all(part.as_bytes())?;
                }
                writer.write_u8(0)?;

                Ok(())
            }
        }
    }
}

impl<'a> fmt::Display for Name<'a> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Name::FromPacket { .. } => {
                for (i, label) in self.labels().enumerate() {
                    if i != 0 {
                        fmt.write_char('.')?;
                    }
                    fmt.write_str(from_utf8(label).map_err(|_| fmt::Error)?)?;
                }
                Ok(())
            }

            Name::FromStr(ref name) => fmt.write_str(name.trim_end_matches('.')),
        }
    }
}

struct Labels<'a> {
    data: &'a [u8],
    original: &'a [u8],
    pos: usize,
    pointers: usize,
}

impl<'a> Iterator for Labels<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        loop {
            let byte = *self.data.get(self.pos)?;
            if byte == 0 {
                return None;
            } else if byte & 0b1100_0000 == 0b1100_0000 {
                if self.pointers == MAX_POINTERS {
                    return None;
                }
                let pointer = self.data.get(self.pos..self.pos + 2)?;
                let off = (BigEndian::read_u16(pointer) & !0b1100_0000_0000_0000) as usize;
                self.data = self.original.get(off..)?;
                self.pos = 0;
                self.pointers += 1;
            } else if byte & 0b1100_0000 == 0 {
                let end = self.pos + byte as usize + 1;
                let label = self.data.get(self.pos + 1..end)?;
                self.pos = end;
                return Some(label);
            } else {
                return None;
            }
        }
    }
}

impl<'a> hash::Hash for Name<'a> {
    fn hash<H>(&self, state: &mut H)
    where
        H: hash::Hasher,
    {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer).unwrap();
        hash::Hash::hash(&buffer, state)
    }
}

impl<'a> PartialEq for Name<'a> {
    fn eq(&self, other: &Name) -> bool {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer).unwrap();

        let mut other_buffer = Vec::new();
        other.write_to(&mut other_buffer).unwrap();

        buffer == other_buffer
    }
}

impl<'a> Eq for Name<'a> {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn expand_plain_name() {
        let data = b"\x07example\x03com\x00";
        assert_eq!(
            Name::expand(data, 0).unwrap(),
            ("example.com".to_string(), 13)
        );
    }

    #[test]
    fn expand_compressed_name() {
        // "www" + pointer to offset 0
        let data = b"\x07example\x03com\x00\x03www\xc0\x00";
        assert_eq!(
            Name::expand(data, 13).unwrap(),
            ("www.example.com".to_string(), 6)
        );
    }

    #[test]
    fn expand_root_name() {
        assert_eq!(Name::expand(b"\x00", 0).unwrap(), (String::new(), 1));
    }

    #[test]
    fn pointer_loop_is_rejected() {
        let data = b"\xc0\x00";
        assert!(matches!(
            Name::expand(data, 0),
            Err(Error::NamePointerLoop)
        ));
    }

    // "www" followed by `hops` pointers, each to the one before it.
    // Returns the packet and the offset of the last pointer.
    fn pointer_chain(hops: usize) -> (Vec<u8>, usize) {
        let mut data = b"\x03www\x00".to_vec();
        let mut target = 0;
        for _ in 0..hops {
            let here = data.len();
            data.extend_from_slice(&(0xc000 | target as u16).to_be_bytes());
            target = here;
        }
        (data, target)
    }

    #[test]
    fn pointer_chain_within_limit() {
        let (data, start) = pointer_chain(MAX_POINTERS);
        assert_eq!(Name::expand(&data, start).unwrap(), ("www".to_string(), 2));

        let (name, _) = Name::scan(&data[start..], &data).unwrap();
        let mut buf = Vec::new();
        name.write_to(&mut buf).unwrap();
        assert_eq!(buf, b"\x03www\x00");
    }

    #[test]
    fn deep_pointer_chain_is_rejected() {
        let (data, start) = pointer_chain(MAX_POINTERS + 1);
        assert!(matches!(
            Name::expand(&data, start),
            Err(Error::NamePointerLoop)
        ));
        let (data, start) = pointer_chain(8000);
        assert!(matches!(
            Name::expand(&data, start),
            Err(Error::NamePointerLoop)
        ));
    }

    #[test]
    fn truncated_label_is_rejected() {
        let data = b"\x07exam";
        assert!(matches!(Name::expand(data, 0), Err(Error::UnexpectedEOF)));
        assert!(matches!(Name::expand(data, 9), Err(Error::UnexpectedEOF)));
    }

    #[test]
    fn pointer_past_end_is_rejected() {
        let data = b"\x03www\xc0\x40";
        assert!(matches!(Name::expand(data, 0), Err(Error::UnexpectedEOF)));
    }

    #[test]
    fn from_str_rejects_long_labels() {
        let label = "a".repeat(64);
        assert!(matches!(Name::from_str(label), Err(Error::LabelTooLong)));
        let long = vec!["a".repeat(63); 5].join(".");
        assert!(matches!(Name::from_str(long), Err(Error::NameTooLong)));
        assert!(matches!(Name::from_str("ex\u{e4}mple.com"), Err(Error::LabelIsNotAscii)));
        assert!(Name::from_str("example.com.").is_ok());
    }

    #[test]
    fn trailing_dot_encodes_like_plain() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        Name::from_str("example.com.").unwrap().write_to(&mut a).unwrap();
        Name::from_str("example.com").unwrap().write_to(&mut b).unwrap();
        assert_eq!(a, b);
    }
}
