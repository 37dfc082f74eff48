//! Phase orchestration: write the workload, then verify the whole extent.

use tracing::{debug, info};

use sfstress_error::{Result, StressError};

use crate::config::RunConfig;
use crate::storage::SparseStore;
use crate::verify::{self, VerifyReport};
use crate::workload::WorkloadGenerator;

/// Final outcome of a complete stress run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Write operations issued during the write phase.
    pub blocks_written: u64,
    /// Verification summary for the full extent.
    pub report: VerifyReport,
}

/// Execute the full write-then-verify cycle against a store.
///
/// The store must already be sized to `cfg.file_size`; both
/// `FileStore::create` and `MemStore::new` leave it that way. The write
/// phase fully completes before verification begins, and any write-phase
/// error aborts the run immediately, leaving the file partially written.
pub fn execute(cfg: &RunConfig, store: &mut impl SparseStore) -> Result<RunOutcome> {
    cfg.validate()?;

    info!(mode = %cfg.mode, blocks = cfg.block_count, "write phase");
    let mut generator = WorkloadGenerator::new(cfg);
    for i in 0..cfg.block_count {
        let op = generator.next_write();
        debug!(offset = op.offset, len = op.block.len(), "write block");
        store.write_at(&op.block, op.offset)?;
        if cfg.sync_interval != 0 && i % cfg.sync_interval == 0 {
            store.sync()?;
        }
    }

    info!("verify phase");
    let report = verify::scan(cfg, &*store);
    info!(
        blocks_verified = report.blocks_verified,
        mismatches = report.mismatches,
        read_failures = report.read_failures,
        "verification complete"
    );

    // Placement can only revisit offsets, never mint new ones: more non-zero
    // blocks than writes means the run itself is broken, and the error is
    // raised only after the full report is available above.
    if report.blocks_verified > cfg.block_count {
        return Err(StressError::VerifiedCountExceedsWrites {
            verified: report.blocks_verified,
            written: cfg.block_count,
        });
    }

    Ok(RunOutcome {
        blocks_written: cfg.block_count,
        report,
    })
}
