use std::fmt;

use crate::error::{JviewError, Result};
use crate::identity::{Id128, RecordIdentity};
use crate::record::Record;

/// A journal cursor: the stable, serializable address of one record.
///
/// The text form is a `;`-separated list of hex fields:
/// `s=<seqnum namespace>;i=<seqnum>;b=<boot id>;m=<monotonic usec>;
/// t=<realtime usec>;x=<xor hash>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalCursor {
    pub identity: RecordIdentity,
    pub boot_id: Id128,
    pub monotonic_usec: u64,
    pub realtime_usec: u64,
    pub xor_hash: u64,
}

impl JournalCursor {
    pub fn parse(input: &str) -> Result<Self> {
        Ok(Self {
            identity: RecordIdentity::new(
                parse_id128(input, "s")?,
                parse_u64(input, "i")?,
            ),
            boot_id: parse_id128(input, "b")?,
            monotonic_usec: parse_u64(input, "m")?,
            realtime_usec: parse_u64(input, "t")?,
            xor_hash: parse_u64(input, "x")?,
        })
    }

    /// Derives a cursor for a cached record. The file binding uses one
    /// namespace per boot session, so the boot id is the namespace; the
    /// monotonic clock and xor hash are not reconstructible from a record.
    pub fn from_record(record: &Record) -> Self {
        Self {
            identity: record.identity,
            boot_id: record.identity.namespace,
            monotonic_usec: 0,
            realtime_usec: record.timestamp.timestamp_micros().max(0) as u64,
            xor_hash: 0,
        }
    }
}

impl fmt::Display for JournalCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "s={};i={:x};b={};m={:x};t={:x};x={:x}",
            self.identity.namespace,
            self.identity.sequence,
            self.boot_id,
            self.monotonic_usec,
            self.realtime_usec,
            self.xor_hash
        )
    }
}

fn field<'a>(input: &'a str, name: &'static str) -> Result<&'a str> {
    input
        .split(';')
        .find_map(|part| part.strip_prefix(name)?.strip_prefix('='))
        .ok_or(JviewError::CursorField { field: name })
}

fn parse_id128(input: &str, name: &'static str) -> Result<Id128> {
    Id128::from_hex(field(input, name)?)
}

fn parse_u64(input: &str, name: &'static str) -> Result<u64> {
    let value = field(input, name)?;
    u64::from_str_radix(value, 16).map_err(|_| JviewError::InvalidHex {
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn sample() -> String {
        "s=72f9ece3caa84aaab5fd4eac74f04a32;i=2d39c1ee;b=2f9fe978f1b14fff91f8cc319b400956;m=21733b7;t=6075f19daf269;x=87e478517491f1d0".to_string()
    }

    #[test]
    fn test_parse_sample_cursor() {
        let cursor = JournalCursor::parse(&sample()).unwrap();
        assert_eq!(
            cursor.identity.namespace.to_hex(),
            "72f9ece3caa84aaab5fd4eac74f04a32"
        );
        assert_eq!(cursor.identity.sequence, 0x2d39_c1ee);
        assert_eq!(
            cursor.boot_id.to_hex(),
            "2f9fe978f1b14fff91f8cc319b400956"
        );
        assert_eq!(cursor.monotonic_usec, 0x21733b7);
        assert_eq!(cursor.realtime_usec, 0x6075f19daf269);
        assert_eq!(cursor.xor_hash, 0x87e478517491f1d0);
    }

    #[test]
    fn test_parse_and_serialize_round_trip() {
        let input = sample();
        let cursor = JournalCursor::parse(&input).unwrap();
        assert_eq!(cursor.to_string(), input);
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let input = sample().replace("t=6075f19daf269;", "");
        match JournalCursor::parse(&input) {
            Err(JviewError::CursorField { field }) => assert_eq!(field, "t"),
            other => panic!("expected missing-field error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_hex_is_an_error() {
        let input = sample().replace("i=2d39c1ee", "i=zzzz");
        assert!(JournalCursor::parse(&input).is_err());
    }

    #[test]
    fn test_from_record() {
        let record = Record::new(
            RecordIdentity::new(Id128::from_u128(5), 12),
            "msg".to_string(),
            DateTime::from_timestamp(2, 500_000_000).unwrap(),
        );
        let cursor = JournalCursor::from_record(&record);
        assert_eq!(cursor.identity, record.identity);
        assert_eq!(cursor.boot_id, record.identity.namespace);
        assert_eq!(cursor.realtime_usec, 2_500_000);
        let reparsed = JournalCursor::parse(&cursor.to_string()).unwrap();
        assert_eq!(reparsed, cursor);
    }
}
