//! Uploaded image filename decoding.
//!
//! The counting devices name each upload `C<count>_<HH-MM-SS>_<DD-MM-YYYY>.jpg`,
//! e.g. `C12_14-30-05_18-10-2026.jpg`. Filenames come from outside this
//! program, so decoding never fails: a bad count segment falls back to one
//! vehicle and a bad time or date segment leaves the capture instant unset.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Vehicle count assumed when a filename carries no usable count.
pub const DEFAULT_VEHICLE_COUNT: u32 = 1;

/// The information encoded in an uploaded image's filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageName {
    /// Number of vehicles counted in the image.
    pub vehicle_count: u32,

    /// When the image was taken, in the device's local time.
    pub captured_at: Option<NaiveDateTime>,
}

impl ImageName {
    /// Decode a storage object name.
    ///
    /// Any directory prefix (`EV/DYP/`) and the file extension are ignored.
    pub fn parse(name: &str) -> Self {
        let base = name.rsplit('/').next().unwrap_or(name);
        let stem = match base.rfind('.') {
            Some(dot) => &base[..dot],
            None => base,
        };

        let mut segments = stem.splitn(3, '_');
        let vehicle_count = segments
            .next()
            .and_then(parse_count)
            .unwrap_or(DEFAULT_VEHICLE_COUNT);

        let captured_at = match (segments.next(), segments.next()) {
            (Some(time), Some(date)) => parse_instant(time, date),
            _ => None,
        };

        Self {
            vehicle_count,
            captured_at,
        }
    }
}

/// Parse the `C<digits>` count segment. The `C` marker is optional.
fn parse_count(segment: &str) -> Option<u32> {
    let digits = segment
        .strip_prefix(['C', 'c'])
        .unwrap_or(segment);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}

/// Parse `HH-MM-SS` and `DD-MM-YYYY` into a single instant.
fn parse_instant(time: &str, date: &str) -> Option<NaiveDateTime> {
    let time = NaiveTime::parse_from_str(&time.replace('-', ":"), "%H:%M:%S").ok()?;
    let date = NaiveDate::parse_from_str(&date.replace('-', "/"), "%d/%m/%Y").ok()?;
    Some(date.and_time(time))
}
