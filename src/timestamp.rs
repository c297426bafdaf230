use anyhow::Context;
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime, UtcOffset};

// 2024-05-01T12:30:45.123Z
const ISO_MILLIS: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

pub fn now_iso() -> anyhow::Result<String> {
    format_iso(OffsetDateTime::now_utc())
}

pub fn format_iso(at: OffsetDateTime) -> anyhow::Result<String> {
    at.to_offset(UtcOffset::UTC)
        .format(ISO_MILLIS)
        .context("format timestamp")
}
