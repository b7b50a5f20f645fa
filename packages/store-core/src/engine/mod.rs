//! The table engine: offset index construction and the five record
//! operations (read, insert, update, delete, enumerate), laid directly over
//! one [`ByteStream`].
//!
//! All state that must be mutated together (the stream and its index) lives
//! behind one internal [`Mutex`], so [`TableEngine`] exposes `&self`
//! methods and is safe to share behind the database facade's per-table
//! locks. Concurrent callers on the *same* table still serialize on this
//! mutex — the underlying stream's seek-then-read protocol has no safe
//! positioned-read primitive to parallelize reads around, so serializing is
//! the honest choice rather than a false promise of concurrent throughput.

mod placement;
mod slot;

use std::collections::HashMap;
use std::io::{self, Seek, SeekFrom, Write};
use std::sync::Mutex;

use crate::error::StoreError;
use crate::stream::ByteStream;

use placement::{offset_to_fit, Placement};
use slot::{extract_id, is_tombstone, read_slot, tombstone_slot};

struct EngineState {
    stream: Box<dyn ByteStream>,
    index: HashMap<u64, u64>,
}

/// Logs an I/O failure at the point it's converted to a typed error, since
/// this is the last place that still has the failing operation's context;
/// the error itself carries nothing past this point but its `Display`.
fn log_io(table: &str, op: &str, err: io::Error) -> StoreError {
    tracing::error!(table, op, error = %err, "I/O operation failed");
    StoreError::from(err)
}

/// A single table: one byte stream plus the in-memory offset index built
/// from it.
pub struct TableEngine {
    name: String,
    inner: Mutex<EngineState>,
}

impl std::fmt::Debug for TableEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableEngine").field("name", &self.name).finish()
    }
}

impl TableEngine {
    /// Opens a table over `stream`, scanning it from byte 0 to rebuild the
    /// offset index. Duplicate live ids are resolved last-occurrence-wins.
    pub fn open(name: impl Into<String>, mut stream: Box<dyn ByteStream>) -> Result<Self, StoreError> {
        let name = name.into();
        let index = build_index(&name, stream.as_mut())?;
        Ok(Self {
            name,
            inner: Mutex::new(EngineState { stream, index }),
        })
    }

    fn state(&self) -> Result<std::sync::MutexGuard<'_, EngineState>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::LockPoisoned {
            table: self.name.clone(),
        })
    }

    fn no_record(&self, id: u64) -> StoreError {
        StoreError::NoRecord {
            table: self.name.clone(),
            id,
        }
    }

    /// Returns a fresh copy of the record stored under `id`.
    pub fn read_rec(&self, id: u64) -> Result<Vec<u8>, StoreError> {
        let mut state = self.state()?;
        let offset = *state.index.get(&id).ok_or_else(|| self.no_record(id))?;
        state
            .stream
            .seek(SeekFrom::Start(offset))
            .map_err(|e| log_io(&self.name, "seek", e))?;
        let slot = read_slot(state.stream.as_mut())
            .map_err(|e| log_io(&self.name, "read_slot", e))?
            .ok_or_else(|| StoreError::FormatError {
                table: self.name.clone(),
                reason: format!("indexed record {id} at offset {offset} is missing from the stream"),
            })?;
        Ok(slot)
    }

    /// Inserts a brand-new record. `bytes` is the JSON payload without its
    /// terminating newline.
    pub fn insert_rec(&self, id: u64, bytes: &[u8]) -> Result<(), StoreError> {
        let mut state = self.state()?;
        if state.index.contains_key(&id) {
            return Err(StoreError::IdExists {
                table: self.name.clone(),
                id,
            });
        }
        let offset = offset_for_writing(&self.name, state.stream.as_mut(), bytes.len())?;
        write_rec(&self.name, state.stream.as_mut(), offset, bytes)?;
        state.index.insert(id, offset);
        tracing::debug!(table = %self.name, id, offset, "inserted record");
        Ok(())
    }

    /// Replaces the record stored under `id` with `bytes`, shrinking,
    /// overwriting in place, or relocating depending on how the new payload
    /// compares in size to the old one.
    pub fn update_rec(&self, id: u64, bytes: &[u8]) -> Result<(), StoreError> {
        let mut state = self.state()?;
        let old_offset = *state.index.get(&id).ok_or_else(|| self.no_record(id))?;

        state
            .stream
            .seek(SeekFrom::Start(old_offset))
            .map_err(|e| log_io(&self.name, "seek", e))?;
        let old_slot = read_slot(state.stream.as_mut())
            .map_err(|e| log_io(&self.name, "read_slot", e))?
            .ok_or_else(|| StoreError::FormatError {
                table: self.name.clone(),
                reason: format!("indexed record {id} at offset {old_offset} is missing from the stream"),
            })?;
        let old_len = old_slot.len() as i64;
        let new_len = bytes.len() as i64;
        let diff = old_len - (new_len + 1);

        if diff > 0 {
            let diff = diff as u64;
            let mut payload = Vec::with_capacity(bytes.len() + 1 + diff as usize);
            payload.extend_from_slice(bytes);
            payload.push(b'\n');
            payload.extend(tombstone_slot(diff));
            write_raw(&self.name, state.stream.as_mut(), old_offset, &payload)?;
        } else if diff == 0 {
            write_rec(&self.name, state.stream.as_mut(), old_offset, bytes)?;
        } else {
            let new_offset = offset_for_writing(&self.name, state.stream.as_mut(), bytes.len())?;
            write_rec(&self.name, state.stream.as_mut(), new_offset, bytes)?;
            write_raw(
                &self.name,
                state.stream.as_mut(),
                old_offset,
                &tombstone_slot(old_len as u64),
            )?;
            state.index.insert(id, new_offset);
        }
        tracing::debug!(table = %self.name, id, "updated record");
        Ok(())
    }

    /// Tombstones the slot stored under `id` and removes it from the index.
    pub fn delete_rec(&self, id: u64) -> Result<(), StoreError> {
        let mut state = self.state()?;
        let offset = *state.index.get(&id).ok_or_else(|| self.no_record(id))?;
        state
            .stream
            .seek(SeekFrom::Start(offset))
            .map_err(|e| log_io(&self.name, "seek", e))?;
        let slot = read_slot(state.stream.as_mut())
            .map_err(|e| log_io(&self.name, "read_slot", e))?
            .ok_or_else(|| StoreError::FormatError {
                table: self.name.clone(),
                reason: format!("indexed record {id} at offset {offset} is missing from the stream"),
            })?;
        write_raw(
            &self.name,
            state.stream.as_mut(),
            offset,
            &tombstone_slot(slot.len() as u64),
        )?;
        state.index.remove(&id);
        tracing::debug!(table = %self.name, id, "deleted record");
        Ok(())
    }

    /// The largest id currently present in the index, or 0 if the table is
    /// empty.
    pub fn last_id(&self) -> Result<u64, StoreError> {
        Ok(self.state()?.index.keys().copied().max().unwrap_or(0))
    }

    /// All ids currently present in the index, in unspecified order.
    pub fn ids(&self) -> Result<Vec<u64>, StoreError> {
        Ok(self.state()?.index.keys().copied().collect())
    }

    /// Closes the backing stream and drops the index. Calls after this
    /// return [`StoreError::NoRecord`] for by-id operations, since the
    /// index they consult is now empty.
    pub fn close(&self) -> Result<(), StoreError> {
        let mut state = self.state()?;
        state.stream.close().map_err(|e| log_io(&self.name, "close", e))?;
        state.index.clear();
        Ok(())
    }
}

fn build_index(table: &str, stream: &mut dyn ByteStream) -> Result<HashMap<u64, u64>, StoreError> {
    stream
        .seek(SeekFrom::Start(0))
        .map_err(|e| log_io(table, "seek", e))?;
    let mut index = HashMap::new();
    let mut offset: u64 = 0;
    loop {
        let current_offset = offset;
        match read_slot(stream).map_err(|e| log_io(table, "read_slot", e))? {
            None => break,
            Some(slot) => {
                offset += slot.len() as u64;
                if is_tombstone(&slot) {
                    tracing::trace!(table, offset = current_offset, len = slot.len(), "skipped tombstone slot");
                    continue;
                }
                let id = extract_id(table, &slot)?;
                tracing::trace!(table, offset = current_offset, len = slot.len(), id, "indexed live slot");
                if let Some(prev) = index.insert(id, current_offset) {
                    tracing::warn!(
                        table,
                        id,
                        prev_offset = prev,
                        new_offset = current_offset,
                        "duplicate id while building index; last occurrence wins"
                    );
                }
            }
        }
    }
    Ok(index)
}

fn offset_for_writing(table: &str, stream: &mut dyn ByteStream, needed: usize) -> Result<u64, StoreError> {
    match offset_to_fit(stream, needed).map_err(|e| log_io(table, "offset_to_fit", e))? {
        Placement::Fit(offset) => Ok(offset),
        Placement::Append => Ok(stream
            .seek(SeekFrom::End(0))
            .map_err(|e| log_io(table, "seek", e))?),
    }
}

/// Writes `data` verbatim at `offset` and flushes.
fn write_raw(table: &str, stream: &mut dyn ByteStream, offset: u64, data: &[u8]) -> Result<(), StoreError> {
    stream
        .seek(SeekFrom::Start(offset))
        .map_err(|e| log_io(table, "seek", e))?;
    stream
        .write_all(data)
        .map_err(|e| log_io(table, "write_all", e))?;
    stream.sync().map_err(|e| log_io(table, "sync", e))?;
    Ok(())
}

/// Writes `bytes` followed by a newline at `offset` and flushes.
fn write_rec(table: &str, stream: &mut dyn ByteStream, offset: u64, bytes: &[u8]) -> Result<(), StoreError> {
    let mut data = Vec::with_capacity(bytes.len() + 1);
    data.extend_from_slice(bytes);
    data.push(b'\n');
    write_raw(table, stream, offset, &data)
}
