//! Domain services driven by the session orchestrator.
//!
//! ARCHITECTURE
//! ============
//! Each service owns one slice of session behavior and knows nothing about
//! the others. Only [`session`] sequences them, so the cross-service rules
//! (fixed step order, error-to-notice conversion) live in one place.

pub mod audio;
pub mod challenge;
pub mod chat;
pub mod gallery;
pub mod music;
pub mod session;

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const CLOCK_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
const DATE_TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// `HH:MM:SS`
pub(crate) fn clock_time(ts: OffsetDateTime) -> String {
    ts.format(CLOCK_FORMAT).unwrap_or_default()
}

/// `YYYY-MM-DD HH:MM:SS`
pub(crate) fn date_time(ts: OffsetDateTime) -> String {
    ts.format(DATE_TIME_FORMAT).unwrap_or_default()
}
