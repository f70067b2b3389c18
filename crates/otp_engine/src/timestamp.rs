use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z, the reference
/// instant of message timestamps.
pub const PLATFORM_EPOCH_UNIX_SECS: i64 = 978_307_200;
pub const DISPLAY_FORMAT: &str = "%d %b %H:%M";
const NANOS_PER_SEC: i64 = 1_000_000_000;

pub trait TimestampFormatter: Send + Sync {
    fn format(&self, timestamp: i64) -> String;
}

/// Converts a platform timestamp (nanoseconds since 2001-01-01 UTC).
pub fn platform_to_utc(timestamp: i64) -> Option<DateTime<Utc>> {
    let secs = timestamp.div_euclid(NANOS_PER_SEC);
    let nanos = u32::try_from(timestamp.rem_euclid(NANOS_PER_SEC)).ok()?;
    DateTime::from_timestamp(PLATFORM_EPOCH_UNIX_SECS.checked_add(secs)?, nanos)
}

fn format_in<Tz: TimeZone>(timestamp: i64, zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match platform_to_utc(timestamp) {
        Some(utc) => utc.with_timezone(zone).format(DISPLAY_FORMAT).to_string(),
        None => timestamp.to_string(),
    }
}

/// Renders timestamps in the machine's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalTimestampFormatter;

impl TimestampFormatter for LocalTimestampFormatter {
    fn format(&self, timestamp: i64) -> String {
        format_in(timestamp, &Local)
    }
}

/// Renders timestamps at a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct FixedOffsetFormatter {
    offset: FixedOffset,
}

impl FixedOffsetFormatter {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }
}

impl TimestampFormatter for FixedOffsetFormatter {
    fn format(&self, timestamp: i64) -> String {
        format_in(timestamp, &self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::{platform_to_utc, FixedOffsetFormatter, TimestampFormatter};
    use chrono::FixedOffset;

    #[test]
    fn zero_is_the_platform_epoch() {
        let utc = platform_to_utc(0).unwrap();
        assert_eq!(utc.to_rfc3339(), "2001-01-01T00:00:00+00:00");
    }

    #[test]
    fn nanoseconds_are_scaled_down() {
        // 2024-03-07T14:05:00Z
        let ts = 731_513_100 * 1_000_000_000;
        assert_eq!(FixedOffsetFormatter::utc().format(ts), "07 Mar 14:05");
    }

    #[test]
    fn offset_shifts_display() {
        let ts = 731_513_100 * 1_000_000_000;
        let cet = FixedOffsetFormatter::new(FixedOffset::east_opt(3600).unwrap());
        assert_eq!(cet.format(ts), "07 Mar 15:05");
    }

    #[test]
    fn pre_epoch_values_round_toward_the_past() {
        let utc = platform_to_utc(-1).unwrap();
        assert_eq!(utc.to_rfc3339(), "2000-12-31T23:59:59.999999999+00:00");
    }
}
