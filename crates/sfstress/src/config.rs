//! Run configuration and cross-field validation.

use std::fmt;
use std::str::FromStr;

use sfstress_error::{Result, StressError};

use crate::checksum::MIN_BLOCK_SIZE;

/// Offset-selection policy for the write phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    /// Blocks written back to back from the start of the file.
    Sequential,
    /// Each block written to an independently drawn block slot; offsets may
    /// repeat or overlap across iterations.
    Random,
    /// Random-length contiguous runs of blocks at random locations.
    Stream,
}

impl PlacementMode {
    /// The flag spelling of this mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "seq",
            Self::Random => "rand",
            Self::Stream => "stream",
        }
    }
}

impl fmt::Display for PlacementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlacementMode {
    type Err = StressError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "seq" => Ok(Self::Sequential),
            "rand" => Ok(Self::Random),
            "stream" => Ok(Self::Stream),
            other => Err(StressError::UnknownMode {
                mode: other.to_owned(),
            }),
        }
    }
}

/// Immutable parameters for one stress run.
///
/// Constructed once from input parameters and validated with
/// [`RunConfig::validate`] before any I/O happens; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Size of each written block in bytes. At least 8 and a multiple of 4.
    pub block_size: usize,
    /// Number of write operations to perform.
    pub block_count: u64,
    /// Total sparse extent size in bytes.
    pub file_size: u64,
    /// Offset-selection policy.
    pub mode: PlacementMode,
    /// Force a flush every this many write operations; 0 disables flushing.
    pub sync_interval: u64,
    /// Minimum blocks per contiguous stream run.
    pub stream_min: u64,
    /// Maximum blocks per contiguous stream run.
    pub stream_max: u64,
    /// Seed for the single random-number stream driving the run.
    pub seed: u64,
    /// Emit per-operation write/read events.
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            block_size: 4096,
            block_count: 1000,
            file_size: 30 * 1024 * 1024 * 1024,
            mode: PlacementMode::Random,
            sync_interval: 0,
            stream_min: 5,
            stream_max: 30,
            seed: 42,
            verbose: false,
        }
    }
}

impl RunConfig {
    /// Number of block-sized slots in the file extent. A trailing partial
    /// block, if the sizes do not divide evenly, is never written or scanned.
    #[must_use]
    pub fn total_blocks(&self) -> u64 {
        self.file_size / self.block_size as u64
    }

    /// Check every cross-field invariant before any I/O happens.
    ///
    /// Violations are fatal configuration errors; nothing is created on disk
    /// when this fails.
    pub fn validate(&self) -> Result<()> {
        if self.block_size < MIN_BLOCK_SIZE || self.block_size % 4 != 0 {
            return Err(StressError::InvalidBlockSize {
                got: self.block_size,
            });
        }
        if self.block_size as u64 >= self.file_size {
            return Err(StressError::BlockLargerThanFile {
                block_size: self.block_size,
                file_size: self.file_size,
            });
        }
        match self.mode {
            PlacementMode::Sequential => {
                if self.block_count > self.total_blocks() {
                    return Err(StressError::SequentialOverflow {
                        blocks: self.block_count,
                        capacity: self.total_blocks(),
                    });
                }
            }
            PlacementMode::Stream => {
                if self.stream_min >= self.stream_max {
                    return Err(StressError::StreamBoundsInvalid {
                        min: self.stream_min,
                        max: self.stream_max,
                    });
                }
                // Guarantees the run-start interval is never empty.
                if self.stream_max > self.total_blocks() {
                    return Err(StressError::StreamRunTooLong {
                        max: self.stream_max,
                        capacity: self.total_blocks(),
                    });
                }
            }
            PlacementMode::Random => {}
        }
        Ok(())
    }
}
