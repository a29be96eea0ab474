//! Internal utility functions.
//!
//! Timestamp and numeric-field conversions shared by the inspector, the
//! FFmpeg adapter, and the command-line front end.

use crate::error::InspectError;

/// Microseconds per millisecond; FFmpeg's `AV_TIME_BASE` is microseconds.
const MICROSECONDS_PER_MILLISECOND: i64 = 1_000;

/// Parse an `HH:MM:SS.mmm` time string into milliseconds since start.
///
/// Each field, including the fractional one, is read as a plain integer, so
/// `00:00:01.5` is one second and five milliseconds. A missing fractional
/// part counts as zero.
///
/// # Errors
///
/// Returns [`InspectError::InvalidTimestamp`] when the string does not have
/// three colon-separated fields, a field is not a non-negative integer, or
/// the total does not fit in a `u64` millisecond count.
///
/// # Example
///
/// ```
/// use vidinspect::parse_timestamp;
///
/// assert_eq!(parse_timestamp("01:02:03.004").unwrap(), 3_723_004);
/// ```
pub fn parse_timestamp(text: &str) -> Result<u64, InspectError> {
    let invalid = || InspectError::InvalidTimestamp(text.to_string());

    let fields: Vec<&str> = text.trim().split(':').collect();
    let [hours, minutes, seconds] = fields.as_slice() else {
        return Err(invalid());
    };

    let (seconds, fraction) = match seconds.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (*seconds, "0"),
    };

    let parse = |field: &str| field.parse::<u64>().map_err(|_| invalid());
    let hours = parse(*hours)?;
    let minutes = parse(*minutes)?;
    let seconds = parse(seconds)?;
    let milliseconds = parse(fraction)?;

    hours
        .checked_mul(3600)
        .and_then(|total| minutes.checked_mul(60)?.checked_add(total))
        .and_then(|total| total.checked_add(seconds))
        .and_then(|total| total.checked_mul(1000))
        .and_then(|total| total.checked_add(milliseconds))
        .ok_or_else(invalid)
}

/// Parse a decoder-reported integer field, treating absence as `"0"`.
///
/// Values that are present but not integers also yield 0 and are logged.
pub fn parse_reported_integer(value: Option<&str>) -> i64 {
    let text = value.unwrap_or("0").trim();
    match text.parse::<i64>() {
        Ok(number) => number,
        Err(_) => {
            log::warn!("Ignoring non-numeric metadata value {text:?}");
            0
        }
    }
}

/// Convert a millisecond position to FFmpeg `AV_TIME_BASE` units.
///
/// Negative positions clamp to the start of the stream.
pub fn milliseconds_to_av_timestamp(position_ms: i64) -> i64 {
    position_ms.max(0).saturating_mul(MICROSECONDS_PER_MILLISECOND)
}
