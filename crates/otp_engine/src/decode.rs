use thiserror::Error;

use crate::archive::decode_keyed_archive;
use crate::plist::{PlistError, BPLIST_MAGIC};
use crate::typedstream::{decode_typedstream, TYPEDSTREAM_MAGIC};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload is empty")]
    EmptyPayload,
    #[error("payload is neither a keyed archive nor a typed stream")]
    UnrecognizedFormat,
    #[error("malformed property list: {0}")]
    Plist(#[from] PlistError),
    #[error("property list is not a keyed archive: {0}")]
    NotKeyedArchive(&'static str),
    #[error("keyed archive has no usable root object")]
    MissingRoot,
    #[error("archive uid {0} does not name an object")]
    DanglingUid(u64),
    #[error("object of class {0} carries no string content")]
    UnsupportedClass(String),
    #[error("string reference chain is too deep")]
    ReferenceDepth,
    #[error("malformed typed stream: {0}")]
    TypedStream(&'static str),
}

/// Recover the plain text of a message's rich-text payload.
///
/// Keyed archives (`bplist00`) are resolved through their root object; the
/// older `streamtyped` encoding is scanned for its string content.
pub fn decode_attributed_body(blob: &[u8]) -> Result<String, DecodeError> {
    if blob.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }
    if blob.starts_with(BPLIST_MAGIC) {
        decode_keyed_archive(blob)
    } else if blob.starts_with(TYPEDSTREAM_MAGIC) {
        decode_typedstream(blob)
    } else {
        Err(DecodeError::UnrecognizedFormat)
    }
}
