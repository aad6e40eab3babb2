//! Absolute and relative time codecs (ETSI TS 101 756 clause 5.1.5.2/5.1.6.2).
//!
//! Absolute time is carried as a Modified Julian Day plus a UTC time-of-day
//! bitfield, in either a 4-byte short form or a 6-byte long form. Relative
//! time is a single byte combining a 2-bit granularity with a 6-bit count.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

use crate::mot::bits::{BitReader, BitWriter};
use crate::tools::error::{MotError, Result};

/// Modified Julian Day epoch offset from the standard Julian Day Number.
const MJD_JDN_OFFSET: i64 = 2_400_001;

fn julian_day_number(year: i32, month: u32, day: u32) -> i64 {
    // Fliegel & van Flandern algorithm, the same Gregorian-to-JDN
    // conversion used by the ETSI reference decoder.
    let a = (14 - month as i64) / 12;
    let y = year as i64 + 4800 - a;
    let m = month as i64 + 12 * a - 3;
    day as i64 + (153 * m + 2) / 5 + 365 * y + y / 4 - y / 100 + y / 400 - 32045
}

fn modified_julian_day(dt: &DateTime<Utc>) -> u32 {
    let jdn = julian_day_number(dt.year(), dt.month(), dt.day());
    (jdn - MJD_JDN_OFFSET) as u32
}

fn date_from_mjd(mjd: u32) -> Option<(i32, u32, u32)> {
    // Inverse of `julian_day_number`, operating on the Julian Day Number
    // recovered from MJD (noon convention, matching the forward formula).
    let jdn = mjd as i64 + MJD_JDN_OFFSET;
    let a = jdn + 32044;
    let b = (4 * a + 3) / 146097;
    let c = a - (146097 * b) / 4;
    let d = (4 * c + 3) / 1461;
    let e = c - (1461 * d) / 4;
    let m = (5 * e + 2) / 153;
    let day = (e - (153 * m + 2) / 5 + 1) as u32;
    let month = (m + 3 - 12 * (m / 10)) as u32;
    let year = (100 * b + d - 4800 + m / 10) as i32;
    Some((year, month, day))
}

/// Encode an absolute time per §4.3. Long (6-byte) form is used iff
/// `dt.second() > 0`; a non-zero sub-second component on an otherwise
/// whole-minute instant is truncated away in the short form rather than
/// forcing the long form.
pub fn encode_absolute_time(dt: &DateTime<Utc>) -> Vec<u8> {
    let mjd = modified_julian_day(dt);
    let long = dt.second() > 0;

    let mut w = BitWriter::new();
    w.write_bits(1, 1); // ValidityFlag
    w.write_bits(mjd as u64, 17);
    w.write_bits(0, 2); // RFU
    w.write_bits(long as u64, 1); // UTC flag
    w.write_bits(dt.hour() as u64, 5);
    w.write_bits(dt.minute() as u64, 6);
    if long {
        w.write_bits(dt.second() as u64, 6);
        w.write_bits(dt.timestamp_subsec_millis() as u64, 10);
    }
    w.into_bytes()
}

/// Decode an absolute time from a 4-byte (short) or 6-byte (long) payload.
/// An all-zero payload (`ValidityFlag` clear) means "NOW"/unspecified and
/// decodes to `None`.
pub fn decode_absolute_time(payload: &[u8]) -> Result<Option<DateTime<Utc>>> {
    if payload.len() != 4 && payload.len() != 6 {
        return Err(MotError::MalformedParameter(format!(
            "absolute time payload must be 4 or 6 bytes, got {}",
            payload.len()
        )));
    }

    let mut r = BitReader::new(payload);
    let valid = r.read_bits(1)? != 0;
    let mjd = r.read_bits(17)? as u32;
    r.read_bits(2)?; // RFU
    let long = r.read_bits(1)? != 0;
    let hour = r.read_bits(5)? as u32;
    let minute = r.read_bits(6)? as u32;
    let (second, millis) = if long {
        (r.read_bits(6)? as u32, r.read_bits(10)? as u32)
    } else {
        (0, 0)
    };

    if !valid {
        return Ok(None);
    }

    let (year, month, day) = date_from_mjd(mjd).ok_or_else(|| {
        MotError::MalformedParameter(format!("MJD {mjd} does not resolve to a calendar date"))
    })?;

    let dt = Utc
        .with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .ok_or_else(|| {
            MotError::MalformedParameter(format!(
                "decoded absolute time fields do not form a valid instant: {year}-{month}-{day} {hour}:{minute}:{second}"
            ))
        })?
        + chrono::Duration::milliseconds(millis as i64);
    Ok(Some(dt))
}

/// One of the four relative-expiration granularities (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// 2-minute steps, interval 2..=126 minutes.
    TwoMinutes = 0,
    /// 30-minute steps, interval 30 minutes..=31.5 hours.
    ThirtyMinutes = 1,
    /// 2-hour steps, interval 2..=126 hours.
    TwoHours = 2,
    /// 1-day steps, interval 1..=63 days.
    OneDay = 3,
}

const UNIT_SECONDS: [u64; 4] = [120, 1800, 7200, 86400];

/// Encode a relative duration as the single-byte granularity+interval
/// field, choosing the smallest granularity whose range covers `duration`.
pub fn encode_relative_time(duration: chrono::Duration) -> Result<u8> {
    let total_secs = duration.num_seconds();
    if total_secs < 0 {
        return Err(MotError::OutOfRange(
            "relative expiration duration must not be negative".to_string(),
        ));
    }
    let total_secs = total_secs as u64;
    if total_secs > 63 * 86400 {
        return Err(MotError::OutOfRange(
            "relative expiration duration exceeds 63 days".to_string(),
        ));
    }

    for (granularity, unit) in UNIT_SECONDS.iter().enumerate() {
        let interval = total_secs / *unit;
        if (1..=63).contains(&interval) {
            return Ok(((granularity as u8) << 6) | interval as u8);
        }
    }
    // total_secs too small for even one 2-minute unit (or exactly zero);
    // treat as the smallest representable non-zero interval.
    Ok(1)
}

/// Decode the single-byte relative-expiration field into a duration.
pub fn decode_relative_time(byte: u8) -> chrono::Duration {
    let granularity = (byte >> 6) & 0x3;
    let interval = (byte & 0x3F) as u64;
    let unit = UNIT_SECONDS[granularity as usize];
    chrono::Duration::seconds((interval * unit) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_five_minutes_selects_granularity_zero_interval_two() {
        let byte = encode_relative_time(chrono::Duration::minutes(5)).unwrap();
        assert_eq!(byte, 0x02);
    }

    #[test]
    fn relative_rejects_beyond_63_days() {
        assert!(encode_relative_time(chrono::Duration::days(64)).is_err());
    }

    #[test]
    fn relative_round_trips_each_granularity_boundary() {
        for secs in [120, 1800, 7200, 86400, 63 * 86400] {
            let byte = encode_relative_time(chrono::Duration::seconds(secs)).unwrap();
            let decoded = decode_relative_time(byte);
            assert!(decoded.num_seconds() >= secs);
        }
    }

    #[test]
    fn absolute_short_form_for_zero_seconds() {
        let dt = Utc.with_ymd_and_hms(2010, 8, 11, 12, 34, 0).unwrap();
        let encoded = encode_absolute_time(&dt);
        assert_eq!(encoded.len(), 4);
        assert_eq!(encoded, vec![0xB6, 0x1E, 0xC3, 0x22]);
        let decoded = decode_absolute_time(&encoded).unwrap().unwrap();
        assert_eq!(decoded, dt);
    }

    #[test]
    fn absolute_short_form_truncates_subsecond_on_a_whole_minute() {
        let dt = Utc
            .with_ymd_and_hms(2010, 8, 11, 12, 34, 0)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(500))
            .unwrap();
        let encoded = encode_absolute_time(&dt);
        assert_eq!(encoded.len(), 4, "second()==0 selects short form even with a subsecond component");
        assert_eq!(encoded, vec![0xB6, 0x1E, 0xC3, 0x22]);
    }

    #[test]
    fn absolute_long_form_for_nonzero_seconds() {
        let dt = Utc
            .with_ymd_and_hms(2010, 8, 11, 12, 34, 11)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(678))
            .unwrap();
        let encoded = encode_absolute_time(&dt);
        assert_eq!(encoded.len(), 6);
        assert_eq!(encoded, vec![0xB6, 0x1E, 0xCB, 0x22, 0x2E, 0xA6]);
        let decoded = decode_absolute_time(&encoded).unwrap().unwrap();
        assert_eq!(decoded, dt);
    }

    #[test]
    fn all_zero_payload_means_unspecified() {
        assert_eq!(decode_absolute_time(&[0, 0, 0, 0]).unwrap(), None);
    }
}
