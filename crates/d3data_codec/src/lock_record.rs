//! Lock record layout and serialization.

use crate::error::{CodecError, CodecResult};
use std::io::{self, Read, Write};

/// Magic bytes identifying a lock record.
pub const LOCK_TAG: [u8; 4] = *b"LOCK";

/// Size of a serialized lock record in bytes.
pub const LOCK_RECORD_SIZE: usize = 8;

/// Process id stored in a record that has not been written yet.
pub const UNASSIGNED_PID: i32 = -1;

/// The contents of a lock file.
///
/// # Layout
///
/// ```text
/// ┌──────────┬────────────────┐
/// │ tag (4)  │ owner_pid (4)  │
/// │ "LOCK"   │ i32 LE         │
/// └──────────┴────────────────┘
/// ```
///
/// There is no version field. A record whose tag is not [`LOCK_TAG`] is
/// not a lock record at all; see [`LockRecord::has_valid_tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockRecord {
    /// Magic tag as read from disk.
    pub tag: [u8; 4],
    /// Process id of the owner.
    pub owner_pid: i32,
}

impl Default for LockRecord {
    fn default() -> Self {
        Self {
            tag: LOCK_TAG,
            owner_pid: UNASSIGNED_PID,
        }
    }
}

impl LockRecord {
    /// Creates a record owned by `pid`.
    #[must_use]
    pub const fn owned_by(pid: i32) -> Self {
        Self {
            tag: LOCK_TAG,
            owner_pid: pid,
        }
    }

    /// Returns true if the tag is the lock magic.
    #[must_use]
    pub fn has_valid_tag(&self) -> bool {
        self.tag == LOCK_TAG
    }

    /// Returns true if no owner has been assigned.
    #[must_use]
    pub const fn is_unassigned(&self) -> bool {
        self.owner_pid == UNASSIGNED_PID
    }

    /// Serializes the record into its fixed 8-byte form.
    #[must_use]
    pub fn encode(&self) -> [u8; LOCK_RECORD_SIZE] {
        let mut buf = [0u8; LOCK_RECORD_SIZE];
        buf[0..4].copy_from_slice(&self.tag);
        buf[4..8].copy_from_slice(&self.owner_pid.to_le_bytes());
        buf
    }

    /// Decodes a record from the first 8 bytes of `data`.
    ///
    /// Bytes after the first 8 are ignored. The tag is not validated here.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] if fewer than 8 bytes are given.
    pub fn decode(data: &[u8]) -> CodecResult<Self> {
        if data.len() < LOCK_RECORD_SIZE {
            return Err(CodecError::truncated(LOCK_RECORD_SIZE, data.len()));
        }

        let mut tag = [0u8; 4];
        tag.copy_from_slice(&data[0..4]);
        let owner_pid = i32::from_le_bytes([data[4], data[5], data[6], data[7]]);

        Ok(Self { tag, owner_pid })
    }

    /// Writes the serialized record to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> CodecResult<()> {
        writer.write_all(&self.encode())?;
        writer.flush()?;
        Ok(())
    }

    /// Reads exactly one record from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Truncated`] if the stream ends early and
    /// [`CodecError::Io`] if reading fails.
    pub fn read_from<R: Read>(mut reader: R) -> CodecResult<Self> {
        let mut buf = [0u8; LOCK_RECORD_SIZE];
        let mut filled = 0;

        while filled < LOCK_RECORD_SIZE {
            match reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        Self::decode(&buf[..filled])
    }
}
