//! Batch log format for the on-disk store.
//!
//! Every atomic batch becomes one record:
//!
//! ```text
//! | magic "UKVL" (4) | type (1) | payload_len u32 LE (4) | payload | crc32 u32 LE (4) |
//! ```
//!
//! The checksum covers magic, type, length and payload. A put payload is
//! `count u32` followed by `key_len u32, key, value_len u32, value` per entry;
//! a delete payload is `count u32` followed by `key_len u32, key` per key.

use crate::engine::Entry;
use crate::error::{StorageError, StorageResult};

/// Magic bytes opening every log record.
pub(crate) const LOG_MAGIC: [u8; 4] = *b"UKVL";

const HEADER_LEN: usize = 4 + 1 + 4;
const CRC_LEN: usize = 4;

const TYPE_PUT: u8 = 1;
const TYPE_DELETE: u8 = 2;

/// One atomic batch as written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LogRecord {
    Put(Vec<Entry>),
    Delete(Vec<Vec<u8>>),
}

impl LogRecord {
    fn record_type(&self) -> u8 {
        match self {
            Self::Put(_) => TYPE_PUT,
            Self::Delete(_) => TYPE_DELETE,
        }
    }

    /// Serializes the record with its envelope.
    pub(crate) fn encode(&self) -> StorageResult<Vec<u8>> {
        let mut payload = Vec::new();
        match self {
            Self::Put(entries) => {
                put_len(&mut payload, entries.len())?;
                for entry in entries {
                    put_bytes(&mut payload, &entry.key)?;
                    put_bytes(&mut payload, &entry.value)?;
                }
            }
            Self::Delete(keys) => {
                put_len(&mut payload, keys.len())?;
                for key in keys {
                    put_bytes(&mut payload, key)?;
                }
            }
        }

        let mut buf = Vec::with_capacity(HEADER_LEN + payload.len() + CRC_LEN);
        buf.extend_from_slice(&LOG_MAGIC);
        buf.push(self.record_type());
        put_len(&mut buf, payload.len())?;
        buf.extend_from_slice(&payload);
        let crc = compute_crc32(&buf);
        buf.extend_from_slice(&crc.to_le_bytes());
        Ok(buf)
    }

    fn decode_payload(record_type: u8, payload: &[u8]) -> StorageResult<Self> {
        let mut cursor = Cursor::new(payload);
        let count = cursor.read_u32()? as usize;
        let record = match record_type {
            TYPE_PUT => {
                let mut entries = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    let key = cursor.read_bytes()?;
                    let value = cursor.read_bytes()?;
                    entries.push(Entry { key, value });
                }
                Self::Put(entries)
            }
            TYPE_DELETE => {
                let mut keys = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    keys.push(cursor.read_bytes()?);
                }
                Self::Delete(keys)
            }
            other => {
                return Err(StorageError::corrupted(format!(
                    "unknown record type {other}"
                )))
            }
        };
        if !cursor.is_done() {
            return Err(StorageError::corrupted("trailing bytes in record payload"));
        }
        Ok(record)
    }
}

/// Result of scanning a log file.
#[derive(Debug)]
pub(crate) struct LogScan {
    /// Records in write order.
    pub(crate) records: Vec<LogRecord>,
    /// Length of the valid prefix of the file.
    pub(crate) valid_len: u64,
    /// Description of the first corruption, if the scan stopped early.
    pub(crate) corruption: Option<String>,
}

/// Decodes every complete, checksummed record in `data`.
///
/// Decoding stops at the first damaged record; everything before it is kept.
pub(crate) fn scan_log(data: &[u8]) -> LogScan {
    let mut records = Vec::new();
    let mut pos = 0usize;

    let corruption = loop {
        if pos == data.len() {
            break None;
        }
        match decode_at(&data[pos..]) {
            Ok((record, consumed)) => {
                records.push(record);
                pos += consumed;
            }
            Err(e) => break Some(format!("at offset {pos}: {e}")),
        }
    };

    LogScan {
        records,
        valid_len: pos as u64,
        corruption,
    }
}

fn decode_at(data: &[u8]) -> StorageResult<(LogRecord, usize)> {
    if data.len() < HEADER_LEN {
        return Err(StorageError::corrupted("truncated record header"));
    }
    if data[..4] != LOG_MAGIC {
        return Err(StorageError::corrupted("bad record magic"));
    }
    let record_type = data[4];
    let payload_len = u32::from_le_bytes([data[5], data[6], data[7], data[8]]) as usize;
    let payload_end = HEADER_LEN
        .checked_add(payload_len)
        .ok_or_else(|| StorageError::corrupted("record length overflow"))?;
    let total = payload_end + CRC_LEN;
    if data.len() < total {
        return Err(StorageError::corrupted("truncated record body"));
    }

    let stored_crc = u32::from_le_bytes([
        data[payload_end],
        data[payload_end + 1],
        data[payload_end + 2],
        data[payload_end + 3],
    ]);
    let computed_crc = compute_crc32(&data[..payload_end]);
    if stored_crc != computed_crc {
        return Err(StorageError::corrupted(format!(
            "checksum mismatch: expected {stored_crc:08x}, got {computed_crc:08x}"
        )));
    }

    let record = LogRecord::decode_payload(record_type, &data[HEADER_LEN..payload_end])?;
    Ok((record, total))
}

fn put_len(buf: &mut Vec<u8>, len: usize) -> StorageResult<()> {
    let len = u32::try_from(len)
        .map_err(|_| StorageError::invalid_args(format!("length {len} exceeds u32")))?;
    buf.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8]) -> StorageResult<()> {
    put_len(buf, bytes.len())?;
    buf.extend_from_slice(bytes);
    Ok(())
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_done(&self) -> bool {
        self.pos == self.data.len()
    }

    fn take(&mut self, len: usize) -> StorageResult<&'a [u8]> {
        if self.data.len() - self.pos < len {
            return Err(StorageError::corrupted("unexpected end of payload"));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_u32(&mut self) -> StorageResult<u32> {
        let bytes: [u8; 4] = self
            .take(4)?
            .try_into()
            .map_err(|_| StorageError::corrupted("invalid u32"))?;
        Ok(u32::from_le_bytes(bytes))
    }

    fn read_bytes(&mut self) -> StorageResult<Vec<u8>> {
        let len = self.read_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }
}

/// CRC32 (IEEE polynomial).
pub(crate) fn compute_crc32(data: &[u8]) -> u32 {
    const CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    !crc
}
