//! Reader for the `bplist00` binary property list encoding.
//!
//! Objects are located through the offset table and decoded on demand, so a
//! payload only has to be well formed along the paths that are actually
//! followed.

use thiserror::Error;

pub const BPLIST_MAGIC: &[u8] = b"bplist00";
const TRAILER_LEN: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlistError {
    #[error("missing bplist00 header")]
    BadHeader,
    #[error("buffer truncated at offset {offset}")]
    Truncated { offset: usize },
    #[error("invalid trailer: {0}")]
    InvalidTrailer(&'static str),
    #[error("object reference {index} out of range ({count} objects)")]
    BadReference { index: usize, count: usize },
    #[error("unsupported object marker 0x{marker:02x} at offset {offset}")]
    UnsupportedMarker { marker: u8, offset: usize },
    #[error("invalid string data at offset {offset}")]
    InvalidString { offset: usize },
}

/// One decoded object. Container members are object indices, resolved with
/// [`BinaryPlist::object`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlistObject<'a> {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Data(&'a [u8]),
    String(String),
    Uid(u64),
    Array(Vec<usize>),
    Dict(Vec<(usize, usize)>),
}

impl PlistObject<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            PlistObject::Null => "null",
            PlistObject::Bool(_) => "bool",
            PlistObject::Integer(_) => "integer",
            PlistObject::Real(_) => "real",
            PlistObject::Data(_) => "data",
            PlistObject::String(_) => "string",
            PlistObject::Uid(_) => "uid",
            PlistObject::Array(_) => "array",
            PlistObject::Dict(_) => "dict",
        }
    }
}

#[derive(Debug)]
pub struct BinaryPlist<'a> {
    data: &'a [u8],
    ref_size: usize,
    offsets: Vec<usize>,
    top: usize,
}

impl<'a> BinaryPlist<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, PlistError> {
        if !data.starts_with(BPLIST_MAGIC) {
            return Err(PlistError::BadHeader);
        }
        if data.len() < BPLIST_MAGIC.len() + TRAILER_LEN {
            return Err(PlistError::Truncated { offset: data.len() });
        }
        let trailer_start = data.len() - TRAILER_LEN;
        let trailer = &data[trailer_start..];

        let offset_size = usize::from(trailer[6]);
        let ref_size = usize::from(trailer[7]);
        if !(1..=8).contains(&offset_size) {
            return Err(PlistError::InvalidTrailer("offset size out of range"));
        }
        if !(1..=8).contains(&ref_size) {
            return Err(PlistError::InvalidTrailer("reference size out of range"));
        }
        let count = to_usize(read_be(&trailer[8..16]))
            .ok_or(PlistError::InvalidTrailer("object count too large"))?;
        let top = to_usize(read_be(&trailer[16..24]))
            .ok_or(PlistError::InvalidTrailer("top object too large"))?;
        let table_start = to_usize(read_be(&trailer[24..32]))
            .ok_or(PlistError::InvalidTrailer("offset table position too large"))?;

        if count == 0 {
            return Err(PlistError::InvalidTrailer("empty object table"));
        }
        if top >= count {
            return Err(PlistError::BadReference { index: top, count });
        }
        let table_end = count
            .checked_mul(offset_size)
            .and_then(|len| len.checked_add(table_start))
            .ok_or(PlistError::InvalidTrailer("offset table overflows"))?;
        if table_start < BPLIST_MAGIC.len() || table_end > trailer_start {
            return Err(PlistError::Truncated { offset: table_start });
        }

        let offsets = data[table_start..table_end]
            .chunks_exact(offset_size)
            .map(|chunk| match to_usize(read_be(chunk)) {
                Some(offset) if (BPLIST_MAGIC.len()..table_start).contains(&offset) => Ok(offset),
                _ => Err(PlistError::Truncated { offset: table_start }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            data,
            ref_size,
            offsets,
            top,
        })
    }

    pub fn top_index(&self) -> usize {
        self.top
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn object(&self, index: usize) -> Result<PlistObject<'a>, PlistError> {
        let offset = *self.offsets.get(index).ok_or(PlistError::BadReference {
            index,
            count: self.offsets.len(),
        })?;
        let marker = *self.data.get(offset).ok_or(PlistError::Truncated { offset })?;
        let low = marker & 0x0F;
        let body = offset + 1;

        match marker >> 4 {
            0x0 => match marker {
                0x00 | 0x0F => Ok(PlistObject::Null),
                0x08 => Ok(PlistObject::Bool(false)),
                0x09 => Ok(PlistObject::Bool(true)),
                _ => Err(PlistError::UnsupportedMarker { marker, offset }),
            },
            0x1 => {
                let (value, _) = self.integer_at(offset)?;
                Ok(PlistObject::Integer(value))
            }
            0x2 => match low {
                2 => {
                    let bytes = self.slice(body, 4)?;
                    let bits = u32::try_from(read_be(bytes)).unwrap_or_default();
                    Ok(PlistObject::Real(f64::from(f32::from_bits(bits))))
                }
                3 => Ok(PlistObject::Real(f64::from_bits(read_be(self.slice(body, 8)?)))),
                _ => Err(PlistError::UnsupportedMarker { marker, offset }),
            },
            0x4 => {
                let (len, start) = self.count_at(offset)?;
                Ok(PlistObject::Data(self.slice(start, len)?))
            }
            0x5 => {
                let (len, start) = self.count_at(offset)?;
                let bytes = self.slice(start, len)?;
                if !bytes.is_ascii() {
                    return Err(PlistError::InvalidString { offset });
                }
                String::from_utf8(bytes.to_vec())
                    .map(PlistObject::String)
                    .map_err(|_| PlistError::InvalidString { offset })
            }
            0x6 => {
                let (units, start) = self.count_at(offset)?;
                let len = units
                    .checked_mul(2)
                    .ok_or(PlistError::Truncated { offset: start })?;
                let utf16: Vec<u16> = self
                    .slice(start, len)?
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16(&utf16)
                    .map(PlistObject::String)
                    .map_err(|_| PlistError::InvalidString { offset })
            }
            0x8 => {
                let len = usize::from(low) + 1;
                if len > 8 {
                    return Err(PlistError::UnsupportedMarker { marker, offset });
                }
                Ok(PlistObject::Uid(read_be(self.slice(body, len)?)))
            }
            0xA => {
                let (count, start) = self.count_at(offset)?;
                Ok(PlistObject::Array(self.refs_at(start, count)?))
            }
            0xD => {
                let (count, start) = self.count_at(offset)?;
                let keys = self.refs_at(start, count)?;
                let values_start = start + count * self.ref_size;
                let values = self.refs_at(values_start, count)?;
                Ok(PlistObject::Dict(keys.into_iter().zip(values).collect()))
            }
            _ => Err(PlistError::UnsupportedMarker { marker, offset }),
        }
    }

    /// Looks up `key` among dict entries, comparing only string keys.
    pub fn dict_get(
        &self,
        entries: &[(usize, usize)],
        key: &str,
    ) -> Result<Option<usize>, PlistError> {
        for &(key_ref, value_ref) in entries {
            if let PlistObject::String(name) = self.object(key_ref)? {
                if name == key {
                    return Ok(Some(value_ref));
                }
            }
        }
        Ok(None)
    }

    fn slice(&self, start: usize, len: usize) -> Result<&'a [u8], PlistError> {
        let end = start
            .checked_add(len)
            .ok_or(PlistError::Truncated { offset: start })?;
        self.data
            .get(start..end)
            .ok_or(PlistError::Truncated { offset: start })
    }

    // Integer object at `offset`; returns the value and the offset past it.
    fn integer_at(&self, offset: usize) -> Result<(i64, usize), PlistError> {
        let marker = *self.data.get(offset).ok_or(PlistError::Truncated { offset })?;
        if marker >> 4 != 0x1 || marker & 0x0F > 3 {
            return Err(PlistError::UnsupportedMarker { marker, offset });
        }
        let len = 1usize << (marker & 0x0F);
        let raw = read_be(self.slice(offset + 1, len)?);
        // Only the 8-byte form can carry a sign bit.
        Ok((raw as i64, offset + 1 + len))
    }

    // Element count from the marker nibble, or from the trailing integer
    // object when the nibble is 0xF. Returns the count and the payload start.
    fn count_at(&self, offset: usize) -> Result<(usize, usize), PlistError> {
        let marker = self.data[offset];
        let low = marker & 0x0F;
        if low != 0x0F {
            return Ok((usize::from(low), offset + 1));
        }
        let (value, next) = self.integer_at(offset + 1)?;
        let count = usize::try_from(value).map_err(|_| PlistError::Truncated { offset })?;
        Ok((count, next))
    }

    fn refs_at(&self, start: usize, count: usize) -> Result<Vec<usize>, PlistError> {
        let len = count
            .checked_mul(self.ref_size)
            .ok_or(PlistError::Truncated { offset: start })?;
        self.slice(start, len)?
            .chunks_exact(self.ref_size)
            .map(|chunk| {
                let index = to_usize(read_be(chunk)).unwrap_or(usize::MAX);
                if index < self.offsets.len() {
                    Ok(index)
                } else {
                    Err(PlistError::BadReference {
                        index,
                        count: self.offsets.len(),
                    })
                }
            })
            .collect()
    }
}

fn read_be(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte))
}

fn to_usize(value: u64) -> Option<usize> {
    usize::try_from(value).ok()
}
