//! Sparse-extent storage backends.
//!
//! Every backend must preserve the hole convention: unwritten ranges of the
//! extent read back as zeros. The verifier distinguishes "never written"
//! from "written" by exactly that, so a backend that cannot guarantee it
//! makes the whole scheme meaningless. A regular file extended with
//! `set_len` and a zero-initialized in-memory vector both keep the contract.

use sfstress_error::{Result, StressError};

#[cfg(unix)]
use std::fs::OpenOptions;
#[cfg(unix)]
use std::os::unix::fs::FileExt;
#[cfg(unix)]
use std::path::Path;

/// One sparse byte extent of fixed size.
pub trait SparseStore {
    /// Total extent size in bytes.
    fn len(&self) -> u64;

    /// True for a zero-byte extent.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the whole buffer at `offset`. Partial writes are failures.
    fn write_at(&mut self, buf: &[u8], offset: u64) -> Result<()>;

    /// Fill the whole buffer from `offset`.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<()>;

    /// Force buffered writes to durable storage.
    fn sync(&mut self) -> Result<()>;
}

/// Real-file backend over positioned I/O.
#[cfg(unix)]
#[derive(Debug)]
pub struct FileStore {
    file: std::fs::File,
    size: u64,
}

#[cfg(unix)]
impl FileStore {
    /// Create (or overwrite) the backing file and extend it to exactly
    /// `size` bytes without writing any data, leaving the whole extent a
    /// hole.
    ///
    /// Creation failure means the storage target is unusable; there is no
    /// retry.
    pub fn create(path: &Path, size: u64) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(size)?;
        Ok(Self { file, size })
    }
}

#[cfg(unix)]
impl SparseStore for FileStore {
    fn len(&self) -> u64 {
        self.size
    }

    fn write_at(&mut self, buf: &[u8], offset: u64) -> Result<()> {
        self.file.write_all_at(buf, offset)?;
        Ok(())
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<()> {
        self.file.read_exact_at(buf, offset)?;
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}

/// In-memory extent for deterministic tests.
///
/// Created zero-filled, so it starts as one large hole just like a freshly
/// truncated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemStore {
    data: Vec<u8>,
}

impl MemStore {
    /// Allocate a zero-filled extent of `size` bytes.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(size: u64) -> Self {
        Self {
            data: vec![0; size as usize],
        }
    }

    /// Raw extent contents, for byte-level assertions.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable extent contents, for corruption tests.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl SparseStore for MemStore {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    #[allow(clippy::cast_possible_truncation)]
    fn write_at(&mut self, buf: &[u8], offset: u64) -> Result<()> {
        let offset = offset as usize;
        let end = offset.saturating_add(buf.len());
        if end > self.data.len() {
            return Err(StressError::ShortWrite {
                expected: buf.len(),
                actual: self.data.len().saturating_sub(offset),
            });
        }
        self.data[offset..end].copy_from_slice(buf);
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<()> {
        let offset = offset as usize;
        let end = offset.saturating_add(buf.len());
        if end > self.data.len() {
            return Err(StressError::ShortRead {
                expected: buf.len(),
                actual: self.data.len().saturating_sub(offset),
            });
        }
        buf.copy_from_slice(&self.data[offset..end]);
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }
}
