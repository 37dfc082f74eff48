//! Deterministic block workload generation with a seeded RNG.
//!
//! The generator owns its RNG and consumes it in iteration order, so a run
//! is reproducible from configuration and seed alone, and tests can execute
//! concurrently without shared random state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::checksum::seal_block;
use crate::config::{PlacementMode, RunConfig};

/// One generated write: a sealed block and the absolute offset it goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOp {
    /// Absolute byte offset in the file extent.
    pub offset: u64,
    /// Sealed block of exactly `block_size` bytes.
    pub block: Vec<u8>,
}

/// Progress through the stream run currently being written.
#[derive(Debug, Clone, Copy, Default)]
struct StreamCursor {
    remaining: u64,
    next_offset: u64,
}

/// Produces the `(offset, block)` sequence for one run.
///
/// Sequential and random placement are stateless between iterations; stream
/// placement tracks a cursor through the current contiguous run and starts a
/// new run when it is exhausted.
#[derive(Debug)]
pub struct WorkloadGenerator {
    block_size: usize,
    total_blocks: u64,
    mode: PlacementMode,
    stream_min: u64,
    stream_max: u64,
    produced: u64,
    cursor: StreamCursor,
    rng: StdRng,
}

impl WorkloadGenerator {
    /// Build a generator for a validated configuration.
    #[must_use]
    pub fn new(cfg: &RunConfig) -> Self {
        Self {
            block_size: cfg.block_size,
            total_blocks: cfg.total_blocks(),
            mode: cfg.mode,
            stream_min: cfg.stream_min,
            stream_max: cfg.stream_max,
            produced: 0,
            cursor: StreamCursor::default(),
            rng: StdRng::seed_from_u64(cfg.seed),
        }
    }

    /// Produce the next write.
    ///
    /// The payload is freshly randomized on every call, even when the
    /// placement policy revisits an offset.
    pub fn next_write(&mut self) -> WriteOp {
        let block = self.fill_block();
        let offset = match self.mode {
            PlacementMode::Sequential => self.produced * self.block_size as u64,
            PlacementMode::Random => {
                self.rng.gen_range(0..self.total_blocks) * self.block_size as u64
            }
            PlacementMode::Stream => self.next_stream_offset(),
        };
        self.produced += 1;
        WriteOp { offset, block }
    }

    /// Advance the stream cursor, starting a new run when the current one is
    /// exhausted.
    fn next_stream_offset(&mut self) -> u64 {
        if self.cursor.remaining == 0 {
            let (start, run_len) = draw_stream_run(
                &mut self.rng,
                self.stream_min,
                self.stream_max,
                self.total_blocks,
            );
            self.cursor = StreamCursor {
                remaining: run_len,
                next_offset: start * self.block_size as u64,
            };
        }
        let offset = self.cursor.next_offset;
        self.cursor.remaining -= 1;
        self.cursor.next_offset = offset + self.block_size as u64;
        offset
    }

    fn fill_block(&mut self) -> Vec<u8> {
        let mut block = vec![0u8; self.block_size];
        self.rng.fill(&mut block[..]);
        seal_block(&mut block);
        block
    }
}

/// Draw one stream run: a length uniform over `[min, max]` inclusive, then a
/// start slot uniform over the interval that keeps the whole run inside the
/// file. Configuration validation (`max` at most the slot count) guarantees
/// the interval is never empty.
fn draw_stream_run(rng: &mut StdRng, min: u64, max: u64, total_blocks: u64) -> (u64, u64) {
    let run_len = rng.gen_range(min..=max);
    let start = rng.gen_range(0..=total_blocks - run_len);
    (start, run_len)
}
