// SPDX-License-Identifier: Apache-2.0
//! Named binary tag wire format.
//!
//! Layout (big-endian throughout):
//!
//! ``id(1) || name_len(2) || name(UTF-8) || payload``
//!
//! * Byte = 1 byte, Short = 2 bytes
//! * ByteArray = ``len(i32) || bytes``, String = ``len(u16) || UTF-8``
//! * Compound = sequence of named child tags terminated by a bare End id
//! * A document is exactly one named compound root; trailing bytes after
//!   the root are an error

use worldloom_tag::{Tag, TagKind, TagValue};

/// End-of-compound marker.
const TAG_END: u8 = 0x00;
/// Wire id of a byte tag.
const TAG_BYTE: u8 = 0x01;
/// Wire id of a short tag.
const TAG_SHORT: u8 = 0x02;
/// Wire id of a byte array tag.
const TAG_BYTE_ARRAY: u8 = 0x07;
/// Wire id of a string tag.
const TAG_STRING: u8 = 0x08;
/// Wire id of a compound tag.
const TAG_COMPOUND: u8 = 0x0A;

/// Default structural budget for decoding untrusted documents.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Maximum compound nesting depth accepted by the decoder.
const MAX_DEPTH: usize = 32;

/// Budget charged per decoded node on top of its payload bytes, so a
/// document of many tiny tags is bounded the same way as one huge array.
const NODE_OVERHEAD_BYTES: usize = 8;

/// Caller-supplied guards applied while decoding untrusted input.
#[derive(Clone, Copy, Debug)]
pub struct DecodeOptions {
    /// Structural budget in bytes, charged against declared string/array
    /// lengths and per-node overhead before anything is allocated.
    pub max_payload_bytes: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

/// Errors surfaced by the wire codec and the gzip stream layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Input ended before the document did.
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof {
        /// Position at which more bytes were needed.
        offset: usize,
    },
    /// A tag id outside the supported set.
    #[error("unknown tag id {id:#04x} at byte {offset}")]
    UnknownTagId {
        /// The offending id byte.
        id: u8,
        /// Position of the id byte.
        offset: usize,
    },
    /// The document root is not a compound tag.
    #[error("root tag must be a compound")]
    RootNotCompound,
    /// A name or string payload was not valid UTF-8.
    #[error("invalid UTF-8 at byte {offset}")]
    InvalidUtf8 {
        /// Position of the string payload.
        offset: usize,
    },
    /// A byte array declared a negative length.
    #[error("negative array length at byte {offset}")]
    NegativeLength {
        /// Position of the length field.
        offset: usize,
    },
    /// The structural budget was exhausted before the document ended.
    #[error("document exceeds the structural budget of {limit} bytes")]
    LimitExceeded {
        /// The budget that was exceeded.
        limit: usize,
    },
    /// Compounds nested deeper than the decoder accepts.
    #[error("nesting depth exceeds {limit}")]
    DepthExceeded {
        /// The depth limit.
        limit: usize,
    },
    /// Bytes remained after the root tag was fully decoded.
    #[error("trailing bytes after root tag at byte {offset}")]
    TrailingBytes {
        /// Position of the first trailing byte.
        offset: usize,
    },
    /// A tag name does not fit the wire format's 16-bit length field.
    #[error("tag name of {len} bytes does not fit the wire format")]
    NameTooLong {
        /// Byte length of the offending name.
        len: usize,
    },
    /// A string payload does not fit the wire format's 16-bit length field.
    #[error("string of {len} bytes does not fit the wire format")]
    StringTooLong {
        /// Byte length of the offending string.
        len: usize,
    },
    /// A byte array does not fit the wire format's 32-bit length field.
    #[error("byte array of {len} bytes does not fit the wire format")]
    ArrayTooLong {
        /// Length of the offending array.
        len: usize,
    },
    /// The compressed outer stream could not be read.
    #[error("compressed stream: {reason}")]
    Stream {
        /// Why inflation failed.
        reason: String,
    },
}

// ============================================================================
// Decoding
// ============================================================================

struct Decoder<'bytes> {
    bytes: &'bytes [u8],
    pos: usize,
    remaining_budget: usize,
    limit: usize,
}

impl<'bytes> Decoder<'bytes> {
    fn new(bytes: &'bytes [u8], options: &DecodeOptions) -> Self {
        Self {
            bytes,
            pos: 0,
            remaining_budget: options.max_payload_bytes,
            limit: options.max_payload_bytes,
        }
    }

    fn take(&mut self, count: usize) -> Result<&'bytes [u8], CodecError> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(CodecError::UnexpectedEof {
                offset: self.bytes.len(),
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn u16_be(&mut self) -> Result<u16, CodecError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn i32_be(&mut self) -> Result<i32, CodecError> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Charge `cost` against the structural budget before allocating.
    fn charge(&mut self, cost: usize) -> Result<(), CodecError> {
        self.remaining_budget =
            self.remaining_budget
                .checked_sub(cost)
                .ok_or(CodecError::LimitExceeded { limit: self.limit })?;
        Ok(())
    }

    fn name(&mut self) -> Result<String, CodecError> {
        let len = usize::from(self.u16_be()?);
        self.charge(len)?;
        let offset = self.pos;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| CodecError::InvalidUtf8 { offset })
    }

    fn value(&mut self, id: u8, depth: usize) -> Result<TagValue, CodecError> {
        match id {
            TAG_BYTE => Ok(TagValue::Byte(i8::from_be_bytes([self.u8()?]))),
            TAG_SHORT => {
                let bytes = self.take(2)?;
                Ok(TagValue::Short(i16::from_be_bytes([bytes[0], bytes[1]])))
            }
            TAG_BYTE_ARRAY => {
                let offset = self.pos;
                let declared = self.i32_be()?;
                let len =
                    usize::try_from(declared).map_err(|_| CodecError::NegativeLength { offset })?;
                self.charge(len)?;
                Ok(TagValue::ByteArray(self.take(len)?.to_vec()))
            }
            TAG_STRING => {
                let len = usize::from(self.u16_be()?);
                self.charge(len)?;
                let offset = self.pos;
                let bytes = self.take(len)?;
                std::str::from_utf8(bytes)
                    .map(|text| TagValue::String(text.to_owned()))
                    .map_err(|_| CodecError::InvalidUtf8 { offset })
            }
            TAG_COMPOUND => self.compound(depth),
            other => Err(CodecError::UnknownTagId {
                id: other,
                offset: self.pos.saturating_sub(1),
            }),
        }
    }

    fn compound(&mut self, depth: usize) -> Result<TagValue, CodecError> {
        if depth >= MAX_DEPTH {
            return Err(CodecError::DepthExceeded { limit: MAX_DEPTH });
        }
        let mut children = Vec::new();
        loop {
            let id = self.u8()?;
            if id == TAG_END {
                break;
            }
            self.charge(NODE_OVERHEAD_BYTES)?;
            let name = self.name()?;
            let value = self.value(id, depth + 1)?;
            children.push(Tag::named(value, name));
        }
        Ok(TagValue::Compound(children))
    }
}

/// Decode one named compound root from `bytes`.
///
/// Child order is preserved exactly as it appears on the wire. The decoder
/// never allocates more than the budget in `options` allows and never
/// panics on malformed input.
///
/// # Errors
///
/// Any [`CodecError`] decoding variant; see each variant for the condition
/// it reports.
pub fn decode_root(bytes: &[u8], options: &DecodeOptions) -> Result<Tag, CodecError> {
    let mut decoder = Decoder::new(bytes, options);
    match decoder.u8()? {
        TAG_COMPOUND => {}
        TAG_BYTE | TAG_SHORT | TAG_BYTE_ARRAY | TAG_STRING => {
            return Err(CodecError::RootNotCompound)
        }
        other => {
            return Err(CodecError::UnknownTagId {
                id: other,
                offset: 0,
            })
        }
    }
    decoder.charge(NODE_OVERHEAD_BYTES)?;
    let name = decoder.name()?;
    let value = decoder.compound(0)?;
    if decoder.pos != bytes.len() {
        return Err(CodecError::TrailingBytes {
            offset: decoder.pos,
        });
    }
    Ok(Tag::named(value, name))
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode a compound root into wire bytes.
///
/// An anonymous root is written with an empty name; the wire format has no
/// unnamed slot, so decoding it back yields a root named `""`.
///
/// # Errors
///
/// [`CodecError::RootNotCompound`] when the root is a leaf, or a length
/// variant when a name, string, or array does not fit its length field.
pub fn encode_root(root: &Tag) -> Result<Vec<u8>, CodecError> {
    if root.kind() != TagKind::Compound {
        return Err(CodecError::RootNotCompound);
    }
    let mut buf = Vec::new();
    write_named(&mut buf, root)?;
    Ok(buf)
}

fn tag_id(kind: TagKind) -> u8 {
    match kind {
        TagKind::Byte => TAG_BYTE,
        TagKind::Short => TAG_SHORT,
        TagKind::String => TAG_STRING,
        TagKind::ByteArray => TAG_BYTE_ARRAY,
        TagKind::Compound => TAG_COMPOUND,
    }
}

fn write_named(buf: &mut Vec<u8>, tag: &Tag) -> Result<(), CodecError> {
    buf.push(tag_id(tag.kind()));
    write_name(buf, tag.name().unwrap_or(""))?;
    write_value(buf, tag.value())
}

fn write_name(buf: &mut Vec<u8>, name: &str) -> Result<(), CodecError> {
    let len =
        u16::try_from(name.len()).map_err(|_| CodecError::NameTooLong { len: name.len() })?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(name.as_bytes());
    Ok(())
}

fn write_value(buf: &mut Vec<u8>, value: &TagValue) -> Result<(), CodecError> {
    match value {
        TagValue::Byte(byte) => buf.extend_from_slice(&byte.to_be_bytes()),
        TagValue::Short(short) => buf.extend_from_slice(&short.to_be_bytes()),
        TagValue::String(string) => {
            let len = u16::try_from(string.len()).map_err(|_| CodecError::StringTooLong {
                len: string.len(),
            })?;
            buf.extend_from_slice(&len.to_be_bytes());
            buf.extend_from_slice(string.as_bytes());
        }
        TagValue::ByteArray(bytes) => {
            let len = i32::try_from(bytes.len()).map_err(|_| CodecError::ArrayTooLong {
                len: bytes.len(),
            })?;
            buf.extend_from_slice(&len.to_be_bytes());
            buf.extend_from_slice(bytes);
        }
        TagValue::Compound(children) => {
            for child in children {
                write_named(buf, child)?;
            }
            buf.push(TAG_END);
        }
    }
    Ok(())
}
