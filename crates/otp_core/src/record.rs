/// Default number of candidates requested from the data source.
pub const DEFAULT_LIMIT: usize = 9;

/// A message accepted by the heuristic, before display formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCandidate {
    pub code: String,
    pub source_text: String,
    /// Platform timestamp (nanoseconds since 2001-01-01 UTC).
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub display_timestamp: String,
    pub code: String,
    pub text: String,
}

impl ResultRecord {
    pub fn from_candidate(candidate: OtpCandidate, display_timestamp: impl Into<String>) -> Self {
        Self {
            display_timestamp: display_timestamp.into(),
            code: candidate.code,
            text: candidate.source_text,
        }
    }
}
