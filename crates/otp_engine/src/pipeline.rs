use std::path::PathBuf;

use otp_core::{classify, ResultRecord, DEFAULT_LIMIT};
use otp_logging::{otp_debug, otp_info, otp_trace};

use crate::decode::decode_attributed_body;
use crate::source::{MessageSource, RawMessageRow};
use crate::timestamp::TimestampFormatter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalConfig {
    pub db_path: PathBuf,
    pub limit: usize,
    pub preview_dir: PathBuf,
}

impl RetrievalConfig {
    pub fn default_with_db(db_path: PathBuf) -> Self {
        Self {
            db_path,
            limit: DEFAULT_LIMIT,
            preview_dir: std::env::temp_dir(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self::default_with_db(default_db_path())
    }
}

/// `~/Library/Messages/chat.db`.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join("Library")
        .join("Messages")
        .join("chat.db")
}

/// Outcome of one retrieval pass. An unavailable source yields no records
/// and a diagnostic instead of an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Retrieval {
    pub records: Vec<ResultRecord>,
    pub diagnostic: Option<String>,
}

/// Decode and classify `rows` in order, keeping at most `limit` records.
/// Rows that fail either step are skipped.
pub fn retrieve<I>(rows: I, limit: usize, formatter: &dyn TimestampFormatter) -> Vec<ResultRecord>
where
    I: IntoIterator<Item = RawMessageRow>,
{
    rows.into_iter()
        .filter_map(|row| process_row(&row, formatter))
        .take(limit)
        .collect()
}

fn process_row(row: &RawMessageRow, formatter: &dyn TimestampFormatter) -> Option<ResultRecord> {
    let text = match decode_attributed_body(&row.blob) {
        Ok(text) => text,
        Err(err) => {
            otp_debug!("Skipping row at {}: {}", row.timestamp, err);
            return None;
        }
    };
    let Some(candidate) = classify(&text, row.timestamp) else {
        otp_trace!("Row at {} is not an OTP message", row.timestamp);
        return None;
    };
    let display = formatter.format(candidate.timestamp);
    Some(ResultRecord::from_candidate(candidate, display))
}

pub fn fetch_recent_otp_messages(
    source: &dyn MessageSource,
    limit: usize,
    formatter: &dyn TimestampFormatter,
) -> Retrieval {
    match source.recent_candidates(limit) {
        Ok(rows) => {
            let records = retrieve(rows, limit, formatter);
            otp_info!("Found {} OTP messages", records.len());
            Retrieval {
                records,
                diagnostic: None,
            }
        }
        Err(err) => {
            otp_debug!("Message source unavailable: {:?}", err);
            Retrieval {
                records: Vec::new(),
                diagnostic: Some(err.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{default_db_path, RetrievalConfig};

    #[test]
    fn default_config_points_at_messages_db() {
        let config = RetrievalConfig::default();
        assert_eq!(config.limit, 9);
        assert!(config.db_path.ends_with("Library/Messages/chat.db"));
        assert_eq!(config.db_path, default_db_path());
    }
}
