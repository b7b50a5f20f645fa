//! Record-slot layout: reading one newline-terminated slot off a stream,
//! classifying it live vs. tombstone, and producing fresh tombstone bytes.

use std::io::{self, Read};

use serde_json::Value;

use crate::error::StoreError;
use crate::stream::ByteStream;

const TOMBSTONE_FILL: u8 = b'X';
const NEWLINE: u8 = b'\n';

/// Reads one slot (payload bytes plus its terminating newline) starting at
/// the stream's current position.
///
/// Returns `Ok(None)` once no further complete, newline-terminated slot
/// remains — including when the stream ends mid-record. A dangling,
/// unterminated tail is discarded rather than surfaced as an error: it is
/// not addressable by any offset in the index, so there is nothing to read
/// it back as.
pub(crate) fn read_slot(stream: &mut dyn ByteStream) -> io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = stream.read(&mut byte)?;
        if n == 0 {
            return Ok(None);
        }
        buf.push(byte[0]);
        if byte[0] == NEWLINE {
            return Ok(Some(buf));
        }
    }
}

/// A slot is a tombstone when its first byte is a newline (an empty,
/// zero-payload tombstone) or the dummy fill character.
pub(crate) fn is_tombstone(slot: &[u8]) -> bool {
    matches!(slot.first(), Some(&NEWLINE) | Some(&TOMBSTONE_FILL))
}

/// Decodes `slot` as a JSON object and extracts its integer `id` field.
pub(crate) fn extract_id(table: &str, slot: &[u8]) -> Result<u64, StoreError> {
    let value: Value = serde_json::from_slice(slot).map_err(|e| StoreError::FormatError {
        table: table.to_string(),
        reason: format!("invalid JSON: {e}"),
    })?;
    value
        .get("id")
        .and_then(Value::as_u64)
        .ok_or_else(|| StoreError::FormatError {
            table: table.to_string(),
            reason: "record has no non-negative integer \"id\" field".to_string(),
        })
}

/// Produces a self-contained tombstone slot of exactly `len` bytes: `len - 1`
/// dummy fill bytes followed by the slot's own terminating newline.
pub(crate) fn tombstone_slot(len: u64) -> Vec<u8> {
    let len = len as usize;
    let mut slot = vec![TOMBSTONE_FILL; len];
    slot[len - 1] = NEWLINE;
    slot
}
