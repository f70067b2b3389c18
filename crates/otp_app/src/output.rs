use std::io::Write;

use anyhow::Result;
use otp_core::{LauncherItem, LauncherOutput, ResultRecord};
use otp_engine::{
    fetch_recent_otp_messages, LocalTimestampFormatter, PreviewWriter, RetrievalConfig,
    SqliteMessageSource,
};
use otp_logging::{otp_debug, otp_warn};

/// One retrieval pass rendered as launcher output. Never fails: an
/// unreadable database produces an empty item list.
pub fn run(config: &RetrievalConfig, with_previews: bool) -> LauncherOutput {
    let source = SqliteMessageSource::new(config.db_path.clone());
    let retrieval = fetch_recent_otp_messages(&source, config.limit, &LocalTimestampFormatter);
    if let Some(diagnostic) = &retrieval.diagnostic {
        otp_warn!("No OTP messages available: {}", diagnostic);
    }

    let previews = with_previews.then(|| PreviewWriter::new(config.preview_dir.clone()));
    build_output(&retrieval.records, previews.as_ref())
}

pub fn build_output(records: &[ResultRecord], previews: Option<&PreviewWriter>) -> LauncherOutput {
    let items = records
        .iter()
        .map(|record| {
            let quicklookurl = previews.and_then(|writer| {
                match writer.materialize(&record.code, &record.text) {
                    Ok(path) => {
                        otp_debug!("Preview for {} written to {:?}", record.code, path);
                        Some(path.display().to_string())
                    }
                    Err(err) => {
                        otp_warn!("Failed to write preview for {}: {}", record.code, err);
                        None
                    }
                }
            });
            LauncherItem::from_record(record, quicklookurl)
        })
        .collect();
    LauncherOutput { items }
}

pub fn write_output(mut out: impl Write, output: &LauncherOutput, compact: bool) -> Result<()> {
    if compact {
        serde_json::to_writer(&mut out, output)?;
    } else {
        serde_json::to_writer_pretty(&mut out, output)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
