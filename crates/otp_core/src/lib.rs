//! OTP core: pure classification, result records and launcher view helpers.
mod heuristic;
mod launcher;
mod record;

pub use heuristic::{classify, extract_code, has_trigger_word, is_otp_text, TRIGGER_WORDS};
pub use launcher::{build_preview_document, preview_filename, LauncherItem, LauncherOutput};
pub use record::{OtpCandidate, ResultRecord, DEFAULT_LIMIT};
