use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use memmap2::Mmap;

use crate::error::Result;
use crate::identity::{Id128, RecordIdentity};
use crate::record::Record;
use crate::stream::JournalStream;

/// Journal stream over a memory-mapped text log file.
///
/// The file is indexed once at open. Each non-marker line is one record;
/// boot separator lines (`-- Reboot --`, or `-- Boot <32 hex> --` which
/// also names the boot id) start a new namespace and reset the sequence
/// counter. The read position follows the stream capability contract:
/// -1 is "before the first record", `len` is "past the last".
pub struct MappedJournal {
    mmap: Option<Mmap>,
    index: Vec<RecordEntry>,
    boot_count: usize,
    pos: i64,
    display_name: String,
}

struct RecordEntry {
    start: usize,
    end: usize,
    namespace: Id128,
    sequence: u64,
    timestamp: DateTime<Utc>,
}

const REBOOT_MARKER: &str = "-- Reboot --";

impl MappedJournal {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        let mmap = if file.metadata()?.len() == 0 {
            None
        } else {
            Some(unsafe { Mmap::map(&file)? })
        };

        let mut journal = Self {
            mmap,
            index: Vec::new(),
            boot_count: 0,
            pos: -1,
            display_name: path.as_ref().display().to_string(),
        };
        journal.build_index()?;

        log::info!(
            "indexed {} records across {} boots in {}",
            journal.record_count(),
            journal.boot_count(),
            journal.display_name()
        );
        Ok(journal)
    }

    fn build_index(&mut self) -> Result<()> {
        let data = match &self.mmap {
            Some(mmap) => std::str::from_utf8(&mmap[..])?,
            None => return Ok(()),
        };

        let mut namespace = Id128::ZERO;
        let mut sequence = 0u64;
        let mut line_start = 0usize;

        while line_start < data.len() {
            let line_end = data[line_start..]
                .find('\n')
                .map(|i| line_start + i)
                .unwrap_or(data.len());
            let line = data[line_start..line_end].trim_end_matches('\r');

            if let Some(boot_id) = boot_marker(line) {
                self.boot_count += 1;
                namespace = boot_id.unwrap_or_else(|| Id128::from_u128(self.boot_count as u128));
                sequence = 0;
            } else {
                if self.boot_count == 0 {
                    // records before any marker belong to an implicit first boot
                    self.boot_count = 1;
                    namespace = Id128::from_u128(1);
                }
                self.index.push(RecordEntry {
                    start: line_start,
                    end: line_start + line.len(),
                    namespace,
                    sequence,
                    timestamp: leading_timestamp(line).unwrap_or(DateTime::UNIX_EPOCH),
                });
                sequence += 1;
            }

            line_start = line_end + 1;
        }

        Ok(())
    }

    pub fn record_count(&self) -> usize {
        self.index.len()
    }

    pub fn boot_count(&self) -> usize {
        self.boot_count
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    fn entry(&self) -> Option<&RecordEntry> {
        if self.pos < 0 {
            return None;
        }
        self.index.get(self.pos as usize)
    }

    fn last_index(&self) -> i64 {
        self.index.len() as i64 - 1
    }
}

/// Recognizes a boot separator. Returns `Some(None)` for an anonymous
/// reboot marker and `Some(Some(id))` when the marker names the boot id.
fn boot_marker(line: &str) -> Option<Option<Id128>> {
    let trimmed = line.trim();
    if trimmed == REBOOT_MARKER {
        return Some(None);
    }
    let id = trimmed.strip_prefix("-- Boot ")?.strip_suffix(" --")?;
    match Id128::from_hex(id) {
        Ok(parsed) => Some(Some(parsed)),
        Err(_) => {
            log::warn!("ignoring malformed boot marker: {}", trimmed);
            None
        }
    }
}

/// Parses a leading ISO-8601 timestamp token (journalctl short-iso style),
/// if the line carries one.
fn leading_timestamp(line: &str) -> Option<DateTime<Utc>> {
    let token = line.split_whitespace().next()?;
    DateTime::parse_from_rfc3339(token)
        .or_else(|_| DateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl JournalStream for MappedJournal {
    fn seek_to_start(&mut self) {
        self.pos = -1;
    }

    fn seek_to_end(&mut self) {
        self.pos = self.index.len() as i64;
    }

    fn seek_forward(&mut self, num_records: usize) {
        self.pos = (self.pos + num_records as i64).min(self.last_index());
    }

    fn seek_backward(&mut self, num_records: usize) {
        self.pos = (self.pos - num_records as i64).clamp(0, self.last_index().max(0));
    }

    fn advance(&mut self) -> bool {
        self.pos += 1;
        self.pos <= self.last_index()
    }

    fn current_record(&self) -> Option<Record> {
        let entry = self.entry()?;
        let data = self.mmap.as_deref()?;
        let text = String::from_utf8_lossy(&data[entry.start..entry.end]).into_owned();
        Some(Record::new(
            RecordIdentity::new(entry.namespace, entry.sequence),
            text,
            entry.timestamp,
        ))
    }

    fn current_identity(&self) -> Option<RecordIdentity> {
        self.entry()
            .map(|entry| RecordIdentity::new(entry.namespace, entry.sequence))
    }
}
