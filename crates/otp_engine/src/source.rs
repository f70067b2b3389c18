use std::path::PathBuf;

use otp_core::is_otp_text;
use otp_logging::otp_debug;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags};
use thiserror::Error;

use crate::decode::decode_attributed_body;

/// One message as stored: the rich-text payload and its platform timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessageRow {
    pub blob: Vec<u8>,
    pub timestamp: i64,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open message database {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("message query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Supplies up to `limit` OTP-plausible rows, newest first.
pub trait MessageSource {
    fn recent_candidates(&self, limit: usize) -> Result<Vec<RawMessageRow>, SourceError>;
}

const RECENT_OTP_QUERY: &str = "
    SELECT attributedBody, date
    FROM message
    WHERE attributedBody IS NOT NULL AND has_otp(attributedBody)
    ORDER BY date DESC
    LIMIT ?1";

/// Read-only view over a Messages `chat.db`.
///
/// Filtering runs inside the query through a `has_otp` SQL function so that
/// `LIMIT` applies to OTP-plausible rows only.
#[derive(Debug, Clone)]
pub struct SqliteMessageSource {
    path: PathBuf,
}

impl SqliteMessageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn open(&self) -> Result<Connection, SourceError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags).map_err(|source| {
            SourceError::Open {
                path: self.path.clone(),
                source,
            }
        })?;
        conn.create_scalar_function(
            "has_otp",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                Ok(match ctx.get_raw(0) {
                    ValueRef::Blob(blob) => blob_has_otp(blob),
                    _ => false,
                })
            },
        )?;
        Ok(conn)
    }
}

impl MessageSource for SqliteMessageSource {
    fn recent_candidates(&self, limit: usize) -> Result<Vec<RawMessageRow>, SourceError> {
        let conn = self.open()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(RECENT_OTP_QUERY)?;
        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(RawMessageRow {
                    blob: row.get(0)?,
                    timestamp: row.get::<_, Option<i64>>(1)?.unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        otp_debug!("Message source {:?} returned {} rows", self.path, rows.len());
        Ok(rows)
    }
}

fn blob_has_otp(blob: &[u8]) -> bool {
    decode_attributed_body(blob)
        .map(|text| is_otp_text(&text))
        .unwrap_or(false)
}
