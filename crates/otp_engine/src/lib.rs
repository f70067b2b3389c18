//! OTP engine: payload decoding, message source access and the retrieval pass.
mod archive;
mod decode;
mod pipeline;
mod plist;
mod plist_writer;
mod preview;
mod source;
mod timestamp;
mod typedstream;

pub use archive::{decode_keyed_archive, encode_attributed_string};
pub use decode::{decode_attributed_body, DecodeError};
pub use pipeline::{
    default_db_path, fetch_recent_otp_messages, retrieve, Retrieval, RetrievalConfig,
};
pub use plist::{BinaryPlist, PlistError, PlistObject, BPLIST_MAGIC};
pub use plist_writer::{write_binary_plist, PlistValue};
pub use preview::{ensure_preview_dir, PersistError, PreviewWriter};
pub use source::{MessageSource, RawMessageRow, SourceError, SqliteMessageSource};
pub use timestamp::{
    platform_to_utc, FixedOffsetFormatter, LocalTimestampFormatter, TimestampFormatter,
    DISPLAY_FORMAT, PLATFORM_EPOCH_UNIX_SECS,
};
pub use typedstream::{decode_typedstream, TYPEDSTREAM_MAGIC};
