use thiserror::Error;

/// Primary error type for sfstress operations.
///
/// Structured variants for the conditions the tool distinguishes: invalid
/// configuration (rejected before any I/O), unusable storage (fatal during
/// the write phase), and the end-of-run consistency violation.
#[derive(Error, Debug)]
pub enum StressError {
    // === Configuration errors ===
    /// Block size below the minimum or not word-aligned.
    #[error("block size must be at least 8 bytes and a multiple of 4, got {got}")]
    InvalidBlockSize { got: usize },

    /// Block size does not fit inside the file extent.
    #[error("block size {block_size} must be smaller than file size {file_size}")]
    BlockLargerThanFile { block_size: usize, file_size: u64 },

    /// Stream run-length bounds are inverted or degenerate.
    #[error("stream run bounds invalid: min {min} must be less than max {max}")]
    StreamBoundsInvalid { min: u64, max: u64 },

    /// The longest allowed stream run cannot fit inside the file extent.
    #[error("stream runs of up to {max} blocks cannot fit a file of {capacity} blocks")]
    StreamRunTooLong { max: u64, capacity: u64 },

    /// Sequential placement would run past the end of the file.
    #[error("cannot write {blocks} sequential blocks to a file holding only {capacity}")]
    SequentialOverflow { blocks: u64, capacity: u64 },

    /// Placement mode string did not name a known policy.
    #[error("unknown placement mode '{mode}' (expected seq, rand, or stream)")]
    UnknownMode { mode: String },

    // === I/O errors ===
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer bytes written than requested.
    #[error("short write: expected {expected} bytes, got {actual}")]
    ShortWrite { expected: usize, actual: usize },

    /// Fewer bytes read than requested.
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    // === Consistency errors ===
    /// The verifier found more non-zero blocks than writes were issued.
    ///
    /// Placement policies can only revisit offsets, never mint new ones, so
    /// this signals a defect in placement or verification rather than a
    /// storage failure.
    #[error("verified {verified} non-zero blocks but only {written} were written")]
    VerifiedCountExceedsWrites { verified: u64, written: u64 },
}

impl StressError {
    /// Whether this error was caught during configuration validation,
    /// before any I/O happened.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidBlockSize { .. }
                | Self::BlockLargerThanFile { .. }
                | Self::StreamBoundsInvalid { .. }
                | Self::StreamRunTooLong { .. }
                | Self::SequentialOverflow { .. }
                | Self::UnknownMode { .. }
        )
    }

    /// Process exit code for the CLI: 2 for configuration errors, 3 for the
    /// end-of-run consistency violation, 1 for storage failures.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            _ if self.is_config_error() => 2,
            Self::VerifiedCountExceedsWrites { .. } => 3,
            _ => 1,
        }
    }
}

/// Convenience alias used across all sfstress crates.
pub type Result<T> = std::result::Result<T, StressError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = StressError::InvalidBlockSize { got: 6 };
        assert_eq!(
            err.to_string(),
            "block size must be at least 8 bytes and a multiple of 4, got 6"
        );

        let err = StressError::VerifiedCountExceedsWrites {
            verified: 11,
            written: 10,
        };
        assert_eq!(
            err.to_string(),
            "verified 11 non-zero blocks but only 10 were written"
        );

        let err = StressError::UnknownMode {
            mode: "spiral".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "unknown placement mode 'spiral' (expected seq, rand, or stream)"
        );
    }

    #[test]
    fn io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: StressError = io_err.into();
        assert!(matches!(err, StressError::Io(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn config_error_classification() {
        assert!(
            StressError::StreamBoundsInvalid { min: 9, max: 3 }.is_config_error()
        );
        assert!(
            StressError::SequentialOverflow {
                blocks: 100,
                capacity: 10
            }
            .is_config_error()
        );
        assert!(
            !StressError::ShortWrite {
                expected: 4096,
                actual: 512
            }
            .is_config_error()
        );
    }

    #[test]
    fn exit_codes() {
        assert_eq!(StressError::InvalidBlockSize { got: 7 }.exit_code(), 2);
        assert_eq!(
            StressError::VerifiedCountExceedsWrites {
                verified: 2,
                written: 1
            }
            .exit_code(),
            3
        );
        assert_eq!(
            StressError::ShortRead {
                expected: 4096,
                actual: 0
            }
            .exit_code(),
            1
        );
    }
}
