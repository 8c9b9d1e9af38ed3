//! # d3data Codec
//!
//! Fixed-layout binary encoding for d3data lock records.
//!
//! A lock record is exactly 8 bytes: the ASCII tag `LOCK` followed by the
//! owner's process id as a little-endian `i32`. The encoding is
//! deterministic and has no padding and no version field.
//!
//! ## Usage
//!
//! ```
//! use d3data_codec::LockRecord;
//!
//! let record = LockRecord::owned_by(4242);
//! let mut file = Vec::new();
//! record.write_to(&mut file).unwrap();
//! assert_eq!(file.len(), 8);
//!
//! let decoded = LockRecord::read_from(file.as_slice()).unwrap();
//! assert_eq!(record, decoded);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod lock_record;

pub use error::{CodecError, CodecResult};
pub use lock_record::{LockRecord, LOCK_RECORD_SIZE, LOCK_TAG, UNASSIGNED_PID};
