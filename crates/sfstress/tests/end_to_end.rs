//! End-to-end runs over in-memory and real-file extents.

use sfstress::{
    execute, verify, MemStore, PlacementMode, RunConfig, SparseStore,
};
use sfstress_error::{Result, StressError};

const BLOCK: u64 = 4096;

fn seq_config() -> RunConfig {
    RunConfig {
        block_size: 4096,
        block_count: 10,
        file_size: 1024 * 1024,
        mode: PlacementMode::Sequential,
        seed: 42,
        ..RunConfig::default()
    }
}

/// Collect the indices of non-zero block slots in an extent.
fn nonzero_slots(bytes: &[u8], block_size: usize) -> Vec<usize> {
    bytes
        .chunks_exact(block_size)
        .enumerate()
        .filter(|(_, chunk)| chunk.iter().any(|&b| b != 0))
        .map(|(index, _)| index)
        .collect()
}

#[test]
fn fresh_extent_verifies_as_all_holes() {
    let cfg = seq_config();
    let store = MemStore::new(cfg.file_size);
    let report = verify::scan(&cfg, &store);
    assert_eq!(report.blocks_verified, 0);
    assert!(report.is_clean());
}

#[test]
fn sequential_run_verifies_exactly_the_written_blocks() {
    // 10 blocks of 4 KiB into a 1 MiB extent: every written slot verifies,
    // everything after stays a hole.
    let cfg = seq_config();
    let mut store = MemStore::new(cfg.file_size);
    let outcome = execute(&cfg, &mut store).unwrap();

    assert_eq!(outcome.blocks_written, 10);
    assert_eq!(outcome.report.blocks_verified, 10);
    assert_eq!(outcome.report.mismatches, 0);
    assert_eq!(outcome.report.read_failures, 0);

    let slots = nonzero_slots(store.as_bytes(), cfg.block_size);
    assert_eq!(slots, (0..10).collect::<Vec<_>>());
}

#[test]
fn stream_budget_of_five_lands_in_one_contiguous_run() {
    // The first drawn run is at least stream_min blocks long, so a write
    // budget of five always lands inside it: exactly five contiguous
    // non-zero slots, wherever the run started.
    let cfg = RunConfig {
        block_size: 4096,
        block_count: 5,
        file_size: 1024 * 1024,
        mode: PlacementMode::Stream,
        stream_min: 5,
        stream_max: 6,
        seed: 1234,
        ..RunConfig::default()
    };
    let mut store = MemStore::new(cfg.file_size);
    let outcome = execute(&cfg, &mut store).unwrap();

    assert_eq!(outcome.report.blocks_verified, 5);
    assert_eq!(outcome.report.mismatches, 0);

    let slots = nonzero_slots(store.as_bytes(), cfg.block_size);
    assert_eq!(slots.len(), 5);
    for pair in slots.windows(2) {
        assert_eq!(pair[1], pair[0] + 1, "run must be contiguous: {slots:?}");
    }
}

#[test]
fn verified_count_never_exceeds_writes_under_overlap() {
    // 64 writes into a 16-slot extent guarantees heavy overlap; the verifier
    // may only ever find fewer distinct blocks than writes.
    for seed in 0..8 {
        let cfg = RunConfig {
            block_size: 4096,
            block_count: 64,
            file_size: 16 * BLOCK,
            mode: PlacementMode::Random,
            seed,
            ..RunConfig::default()
        };
        let mut store = MemStore::new(cfg.file_size);
        let outcome = execute(&cfg, &mut store).unwrap();
        assert!(outcome.report.blocks_verified <= 16);
        assert!(outcome.report.blocks_verified <= outcome.blocks_written);
        assert_eq!(outcome.report.mismatches, 0);
    }
}

#[test]
fn identical_config_and_seed_produce_byte_identical_extents() {
    let cfg = RunConfig {
        block_size: 4096,
        block_count: 32,
        file_size: 256 * 1024,
        mode: PlacementMode::Random,
        seed: 99,
        ..RunConfig::default()
    };

    let mut a = MemStore::new(cfg.file_size);
    let mut b = MemStore::new(cfg.file_size);
    execute(&cfg, &mut a).unwrap();
    execute(&cfg, &mut b).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());

    let mut c = MemStore::new(cfg.file_size);
    let reseeded = RunConfig { seed: 100, ..cfg };
    execute(&reseeded, &mut c).unwrap();
    assert_ne!(a.as_bytes(), c.as_bytes());
}

#[test]
fn corrupted_payload_is_reported_but_still_counted() {
    let cfg = seq_config();
    let mut store = MemStore::new(cfg.file_size);
    execute(&cfg, &mut store).unwrap();

    // Flip one payload bit in the fourth block after the run.
    store.bytes_mut()[3 * 4096 + 17] ^= 0x40;

    let report = verify::scan(&cfg, &store);
    assert_eq!(report.blocks_verified, 10);
    assert_eq!(report.mismatches, 1);
}

/// Store wrapper that fails reads touching one block slot, for exercising
/// the verifier's skip-and-continue policy.
struct FaultyReads {
    inner: MemStore,
    bad_offset: u64,
}

impl SparseStore for FaultyReads {
    fn len(&self) -> u64 {
        self.inner.len()
    }

    fn write_at(&mut self, buf: &[u8], offset: u64) -> Result<()> {
        self.inner.write_at(buf, offset)
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<()> {
        if offset == self.bad_offset {
            return Err(StressError::Io(std::io::Error::other("injected fault")));
        }
        self.inner.read_at(buf, offset)
    }

    fn sync(&mut self) -> Result<()> {
        self.inner.sync()
    }
}

#[test]
fn unreadable_stride_is_skipped_and_the_scan_continues() {
    let cfg = seq_config();
    let mut store = FaultyReads {
        inner: MemStore::new(cfg.file_size),
        bad_offset: 2 * BLOCK,
    };
    execute(&cfg, &mut store).unwrap();

    let report = verify::scan(&cfg, &store);
    // Block 2 was written but cannot be read back; the other nine verify.
    assert_eq!(report.read_failures, 1);
    assert_eq!(report.blocks_verified, 9);
    assert_eq!(report.mismatches, 0);
}

#[cfg(unix)]
mod file_backed {
    use sfstress::FileStore;

    use super::*;

    #[test]
    fn sequential_run_against_a_real_sparse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.img");
        let cfg = seq_config();

        let mut store = FileStore::create(&path, cfg.file_size).unwrap();
        let outcome = execute(&cfg, &mut store).unwrap();

        assert_eq!(outcome.report.blocks_verified, 10);
        assert_eq!(outcome.report.mismatches, 0);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), cfg.file_size);
    }

    #[test]
    fn identical_seeds_produce_byte_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = RunConfig {
            block_size: 4096,
            block_count: 16,
            file_size: 128 * 1024,
            mode: PlacementMode::Stream,
            stream_min: 2,
            stream_max: 6,
            seed: 7,
            ..RunConfig::default()
        };

        let mut contents = Vec::new();
        for name in ["a.img", "b.img"] {
            let path = dir.path().join(name);
            let mut store = FileStore::create(&path, cfg.file_size).unwrap();
            execute(&cfg, &mut store).unwrap();
            contents.push(std::fs::read(&path).unwrap());
        }
        assert_eq!(contents[0], contents[1]);
    }

    #[test]
    fn periodic_flush_against_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.img");
        let cfg = RunConfig {
            sync_interval: 4,
            ..seq_config()
        };
        let mut store = FileStore::create(&path, cfg.file_size).unwrap();
        let outcome = execute(&cfg, &mut store).unwrap();
        assert_eq!(outcome.report.blocks_verified, 10);
    }
}
