//! Recovery of message text from the legacy `streamtyped` serialization.
//!
//! The stream is not parsed as a whole. The text of the first `NSString`
//! object follows its class name as a `+` (C string) typed value with a
//! variable-width length prefix.

use crate::decode::DecodeError;

pub const TYPEDSTREAM_MAGIC: &[u8] = b"\x04\x0bstreamtyped";
const STRING_CLASS: &[u8] = b"NSString";
const STRING_TAG: u8 = b'+';
// Type tag bytes sit within a few bytes of the class name.
const TAG_WINDOW: usize = 16;
const LEN_U16: u8 = 0x81;
const LEN_U32: u8 = 0x82;

pub fn decode_typedstream(data: &[u8]) -> Result<String, DecodeError> {
    let body = data
        .strip_prefix(TYPEDSTREAM_MAGIC)
        .ok_or(DecodeError::UnrecognizedFormat)?;

    let class_end = find(body, STRING_CLASS)
        .map(|pos| pos + STRING_CLASS.len())
        .ok_or(DecodeError::TypedStream("no NSString object"))?;
    let window_end = body.len().min(class_end + TAG_WINDOW);
    let tag = body[class_end..window_end]
        .iter()
        .position(|&byte| byte == STRING_TAG)
        .map(|pos| class_end + pos)
        .ok_or(DecodeError::TypedStream("missing string type tag"))?;

    let (len, start) = read_length(body, tag + 1)?;
    let end = start
        .checked_add(len)
        .filter(|&end| end <= body.len())
        .ok_or(DecodeError::TypedStream("string runs past end of stream"))?;
    String::from_utf8(body[start..end].to_vec())
        .map_err(|_| DecodeError::TypedStream("string is not valid UTF-8"))
}

fn read_length(body: &[u8], at: usize) -> Result<(usize, usize), DecodeError> {
    let truncated = DecodeError::TypedStream("truncated length prefix");
    let first = *body.get(at).ok_or(truncated.clone())?;
    match first {
        LEN_U16 => {
            let bytes = body.get(at + 1..at + 3).ok_or(truncated)?;
            Ok((usize::from(u16::from_le_bytes([bytes[0], bytes[1]])), at + 3))
        }
        LEN_U32 => {
            let bytes = body.get(at + 1..at + 5).ok_or(truncated)?;
            let len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            let len = usize::try_from(len).map_err(|_| DecodeError::TypedStream("length overflow"))?;
            Ok((len, at + 5))
        }
        len if len < 0x80 => Ok((usize::from(len), at + 1)),
        _ => Err(DecodeError::TypedStream("unsupported length prefix")),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
