//! Sparse-file stress and verification.
//!
//! The tool creates a large sparse file, writes checksum-tagged blocks to it
//! under a placement policy (sequential, uniform-random, or contiguous
//! "stream" runs), then scans the whole extent to confirm every written
//! block's integrity and that no extraneous non-zero data exists.
//!
//! The verification pass relies on one contract from the storage backend:
//! unwritten ranges of the extent read back as zeros. Any non-zero block must
//! therefore have been written by the tool and must carry a valid checksum
//! trailer.

pub mod checksum;
pub mod config;
pub mod run;
pub mod storage;
pub mod verify;
pub mod workload;

pub use config::{PlacementMode, RunConfig};
pub use run::{execute, RunOutcome};
#[cfg(unix)]
pub use storage::FileStore;
pub use storage::{MemStore, SparseStore};
pub use verify::VerifyReport;
pub use workload::{WorkloadGenerator, WriteOp};
