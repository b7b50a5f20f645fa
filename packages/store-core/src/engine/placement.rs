//! Fit-or-append placement: where a new or relocated record lands.

use std::io::{self, Seek, SeekFrom};

use crate::stream::ByteStream;

use super::slot::{is_tombstone, read_slot};

/// Where `offset_to_fit` decided a record of a given size should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Reuse an existing tombstone slot at this offset; its payload is at
    /// least as large as the record being placed.
    Fit(u64),
    /// No tombstone was large enough; place the record at end-of-stream.
    Append,
}

/// Scans the stream from the start for the first tombstone slot whose
/// payload (slot length minus its terminating newline) is at least
/// `needed` bytes. Falls back to end-of-stream placement if none fits.
pub(crate) fn offset_to_fit(stream: &mut dyn ByteStream, needed: usize) -> io::Result<Placement> {
    stream.seek(SeekFrom::Start(0))?;
    let mut offset: u64 = 0;
    loop {
        let current = offset;
        match read_slot(stream)? {
            None => return Ok(Placement::Append),
            Some(slot) => {
                offset += slot.len() as u64;
                let payload_len = slot.len() - 1;
                if is_tombstone(&slot) && payload_len >= needed {
                    return Ok(Placement::Fit(current));
                }
            }
        }
    }
}
