//! On-disk image of a key tree.
//!
//! ```text
//! magic    [u8; 4]  "D3RG"
//! version  u16
//! keys     u32
//!   path_len u16, path bytes
//!   records  u32
//!     name_len u16, name bytes
//!     type     u8   (1 = string, 2 = dword)
//!     string:  len u32, bytes (no terminator)
//!     dword:   u32
//! ```
//!
//! All integers are little-endian.

use crate::error::{StorageError, StorageResult};
use crate::tree::{KeyTree, RecordType, RecordValue, MAX_NAME_LEN, MAX_STRING_LEN};
use std::collections::BTreeMap;

/// Magic bytes for a registry image.
pub const REGISTRY_MAGIC: [u8; 4] = *b"D3RG";

/// Current registry image version.
pub const REGISTRY_VERSION: u16 = 1;

/// Encodes a key tree to bytes.
///
/// # Errors
///
/// Returns [`StorageError::TooLong`] if a path, name, string or count does
/// not fit its length field.
pub fn encode_tree(tree: &KeyTree) -> StorageResult<Vec<u8>> {
    let mut buf = Vec::new();

    buf.extend_from_slice(&REGISTRY_MAGIC);
    buf.extend_from_slice(&REGISTRY_VERSION.to_le_bytes());
    put_count(&mut buf, "key count", tree.key_count())?;

    for key in tree.keys() {
        put_short_str(&mut buf, "key path", key)?;

        let records: Vec<_> = tree.records(key).collect();
        put_count(&mut buf, "record count", records.len())?;

        for (name, value) in records {
            put_short_str(&mut buf, "record name", name)?;
            buf.push(value.record_type().as_byte());
            match value {
                RecordValue::String(s) => {
                    put_count(&mut buf, "string value", s.len())?;
                    buf.extend_from_slice(s.as_bytes());
                }
                RecordValue::Dword(v) => buf.extend_from_slice(&v.to_le_bytes()),
            }
        }
    }

    Ok(buf)
}

/// Decodes a key tree from bytes.
///
/// # Errors
///
/// Returns [`StorageError::Corrupted`] on bad magic, an unsupported version,
/// truncated input, invalid UTF-8 or an unknown record type.
pub fn decode_tree(data: &[u8]) -> StorageResult<KeyTree> {
    let mut reader = Reader { data, cursor: 0 };

    if reader.take(4)? != REGISTRY_MAGIC {
        return Err(StorageError::corrupted("invalid registry magic"));
    }

    let version = reader.u16()?;
    if version > REGISTRY_VERSION {
        return Err(StorageError::corrupted(format!(
            "unsupported registry version: {version}"
        )));
    }

    let mut tree = KeyTree::new();
    let key_count = reader.u32()?;

    for _ in 0..key_count {
        let path = reader.short_str()?;
        let record_count = reader.u32()?;
        let mut records = BTreeMap::new();

        for _ in 0..record_count {
            let name = reader.short_str()?;
            let type_byte = reader.u8()?;
            let value = match RecordType::from_byte(type_byte) {
                Some(RecordType::String) => {
                    let len = usize::try_from(reader.u32()?)
                        .map_err(|_| StorageError::corrupted("record value too long"))?;
                    let bytes = reader.take(len)?;
                    let s = std::str::from_utf8(bytes)
                        .map_err(|_| StorageError::corrupted("record value is not UTF-8"))?;
                    RecordValue::String(s.to_string())
                }
                Some(RecordType::Dword) => RecordValue::Dword(reader.u32()?),
                None => {
                    return Err(StorageError::corrupted(format!(
                        "unknown record type {type_byte} for {name}"
                    )))
                }
            };
            records.insert(name, value);
        }

        tree.insert_key(path, records);
    }

    Ok(tree)
}

fn put_short_str(buf: &mut Vec<u8>, what: &'static str, s: &str) -> StorageResult<()> {
    let len = u16::try_from(s.len())
        .map_err(|_| StorageError::too_long(what, s.len(), MAX_NAME_LEN))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn put_count(buf: &mut Vec<u8>, what: &'static str, n: usize) -> StorageResult<()> {
    let n = u32::try_from(n).map_err(|_| StorageError::too_long(what, n, MAX_STRING_LEN))?;
    buf.extend_from_slice(&n.to_le_bytes());
    Ok(())
}

struct Reader<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> StorageResult<&'a [u8]> {
        let end = self
            .cursor
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| StorageError::corrupted("registry image too short"))?;
        let slice = &self.data[self.cursor..end];
        self.cursor = end;
        Ok(slice)
    }

    fn u8(&mut self) -> StorageResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> StorageResult<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> StorageResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn short_str(&mut self) -> StorageResult<String> {
        let len = usize::from(self.u16()?);
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| StorageError::corrupted("name is not UTF-8"))
    }
}
