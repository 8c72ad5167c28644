use crate::identity::RecordIdentity;
use crate::record::Record;

/// Capability required of a log-stream collaborator.
///
/// The stream exposes only sequential and coarse seek primitives; there is
/// no random access by line. `seek_to_start`/`seek_to_end` position before
/// the first record / after the last one without making a record readable.
/// `seek_forward`/`seek_backward` skip whole records and clamp onto a
/// readable record at the stream ends. `advance` moves to the next record
/// and reports whether one exists; `current_record`/`current_identity`
/// return `None` while no record is readable.
pub trait JournalStream {
    fn seek_to_start(&mut self);

    fn seek_to_end(&mut self);

    fn seek_forward(&mut self, num_records: usize);

    fn seek_backward(&mut self, num_records: usize);

    fn advance(&mut self) -> bool;

    fn current_record(&self) -> Option<Record>;

    fn current_identity(&self) -> Option<RecordIdentity>;
}
