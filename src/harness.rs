//! Comparison harness
//!
//! Times `search_by_traversal` against `search_by_index` on the same VFS.
//! Datasets are generated beforehand through ordinary create calls; the
//! VFS is never mutated while timing.

use crate::config::BenchmarkConfig;
use crate::error::{ApiError, VfsError};
use crate::path;
use crate::tree::MemoryStore;
use crate::types::NodeId;
use crate::vfs::Vfs;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hint::black_box;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

pub const DATASET_ROOT: &str = "benchmark_data";
pub const DIR_PREFIX: &str = "dir_";
pub const FILE_PREFIX: &str = "file_";

/// Physical reference shared by every generated file
pub const DATASET_BLOB: &str = "/arbor/benchmark/blob.bin";
const DATASET_BLOB_SIZE: u64 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Traversal,
    Index,
}

/// Shape of a generated dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub directories: usize,
    pub files: usize,
    pub failures: usize,
}

/// Populate `vfs` with `/benchmark_data`, `file_count / 5` directories
/// nested at random, and `file_count` files spread over them.
pub fn generate_dataset<R: Rng>(
    vfs: &mut Vfs,
    file_count: usize,
    physical: &Path,
    rng: &mut R,
) -> Result<DatasetSummary, VfsError> {
    vfs.create_directory(path::ROOT, DATASET_ROOT)?;
    let mut directories = vec![path::join(path::ROOT, DATASET_ROOT)];
    let mut summary = DatasetSummary {
        directories: 1,
        ..DatasetSummary::default()
    };

    for i in 0..file_count / 5 {
        let parent = directories[rng.gen_range(0..directories.len())].clone();
        let name = format!("{DIR_PREFIX}{i}");
        vfs.create_directory(&parent, &name)?;
        directories.push(path::join(&parent, &name));
        summary.directories += 1;
    }

    for i in 0..file_count {
        let parent = &directories[rng.gen_range(0..directories.len())];
        let name = format!("{FILE_PREFIX}{i}");
        match vfs.create_file(parent, &name, physical) {
            Ok(_) => summary.files += 1,
            Err(e) => {
                warn!(file = %name, error = %e, "dataset file skipped");
                summary.failures += 1;
            }
        }
    }
    Ok(summary)
}

/// One timed search call
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchSample {
    pub elapsed_ns: u64,
    pub results: usize,
}

/// Samples collected for one strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyTiming {
    pub strategy: Strategy,
    pub samples: Vec<SearchSample>,
}

impl StrategyTiming {
    fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            samples: Vec::new(),
        }
    }

    pub fn calls(&self) -> usize {
        self.samples.len()
    }

    pub fn mean_ns(&self) -> u64 {
        if self.samples.is_empty() {
            return 0;
        }
        let total: u128 = self.samples.iter().map(|s| u128::from(s.elapsed_ns)).sum();
        (total / self.samples.len() as u128) as u64
    }

    pub fn min_ns(&self) -> u64 {
        self.samples.iter().map(|s| s.elapsed_ns).min().unwrap_or(0)
    }

    pub fn max_ns(&self) -> u64 {
        self.samples.iter().map(|s| s.elapsed_ns).max().unwrap_or(0)
    }
}

/// Timings of both strategies over the same targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub targets: Vec<String>,
    pub traversal: StrategyTiming,
    pub index: StrategyTiming,
    /// Targets for which the two strategies returned different node sets
    pub mismatches: Vec<String>,
}

impl Comparison {
    fn new() -> Self {
        Self {
            targets: Vec::new(),
            traversal: StrategyTiming::new(Strategy::Traversal),
            index: StrategyTiming::new(Strategy::Index),
            mismatches: Vec::new(),
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Mean traversal time over mean index time
    pub fn speedup(&self) -> Option<f64> {
        let index = self.index.mean_ns();
        (index > 0).then(|| self.traversal.mean_ns() as f64 / index as f64)
    }

    fn measure(&mut self, vfs: &Vfs, target: &str, iterations: usize) {
        let mut traversal_found: Option<HashSet<NodeId>> = None;
        let mut index_found: Option<HashSet<NodeId>> = None;

        for _ in 0..iterations {
            let started = Instant::now();
            let found = black_box(vfs.search_by_traversal(black_box(target)));
            self.traversal.samples.push(SearchSample {
                elapsed_ns: started.elapsed().as_nanos() as u64,
                results: found.len(),
            });
            traversal_found.get_or_insert_with(|| found.into_iter().collect());
        }
        for _ in 0..iterations {
            let started = Instant::now();
            let found = black_box(vfs.search_by_index(black_box(target)));
            self.index.samples.push(SearchSample {
                elapsed_ns: started.elapsed().as_nanos() as u64,
                results: found.len(),
            });
            index_found.get_or_insert_with(|| found.iter().copied().collect());
        }

        if traversal_found != index_found {
            self.mismatches.push(target.to_string());
        }
        self.targets.push(target.to_string());
    }
}

/// Time `iterations` calls of each strategy for `target` on `vfs`.
pub fn compare(vfs: &Vfs, target: &str, iterations: usize) -> Comparison {
    let mut comparison = Comparison::new();
    comparison.measure(vfs, target, iterations);
    comparison
}

/// Result of a full benchmark run on a generated dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub seed: u64,
    pub dataset: DatasetSummary,
    pub comparison: Comparison,
}

/// Generate a dataset of `config.file_count` files in a fresh in-memory
/// VFS, then time both strategies on `config.iterations` random file names.
pub fn run(config: &BenchmarkConfig) -> Result<BenchmarkReport, ApiError> {
    let seed = config.seed.unwrap_or_else(rand::random::<u64>);
    let mut rng = StdRng::seed_from_u64(seed);

    let store = MemoryStore::new().with_file(DATASET_BLOB, DATASET_BLOB_SIZE);
    let mut vfs = Vfs::with_store(Box::new(store));
    let dataset = generate_dataset(&mut vfs, config.file_count, Path::new(DATASET_BLOB), &mut rng)?;

    let mut comparison = Comparison::new();
    if config.file_count > 0 {
        for _ in 0..config.iterations {
            let target = format!("{FILE_PREFIX}{}", rng.gen_range(0..config.file_count));
            comparison.measure(&vfs, &target, 1);
        }
    }

    info!(
        seed,
        files = dataset.files,
        directories = dataset.directories,
        traversal_mean_ns = comparison.traversal.mean_ns(),
        index_mean_ns = comparison.index.mean_ns(),
        "benchmark finished"
    );
    Ok(BenchmarkReport {
        seed,
        dataset,
        comparison,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_vfs() -> Vfs {
        Vfs::with_store(Box::new(
            MemoryStore::new().with_file(DATASET_BLOB, DATASET_BLOB_SIZE),
        ))
    }

    #[test]
    fn test_generate_dataset_shape() {
        let mut vfs = memory_vfs();
        let mut rng = StdRng::seed_from_u64(7);
        let summary =
            generate_dataset(&mut vfs, 50, Path::new(DATASET_BLOB), &mut rng).unwrap();

        assert_eq!(summary.directories, 11);
        assert_eq!(summary.files, 50);
        assert_eq!(summary.failures, 0);
        assert_eq!(vfs.stats().files, 50);
        assert_eq!(vfs.search_by_index("file_49").len(), 1);
        assert!(vfs.verify().is_consistent());
    }

    #[test]
    fn test_generate_dataset_twice_collides() {
        let mut vfs = memory_vfs();
        let mut rng = StdRng::seed_from_u64(1);
        generate_dataset(&mut vfs, 5, Path::new(DATASET_BLOB), &mut rng).unwrap();
        let err = generate_dataset(&mut vfs, 5, Path::new(DATASET_BLOB), &mut rng).unwrap_err();
        assert!(matches!(err, VfsError::NameCollision { .. }));
    }

    #[test]
    fn test_compare_records_every_call() {
        let mut vfs = memory_vfs();
        let mut rng = StdRng::seed_from_u64(3);
        generate_dataset(&mut vfs, 20, Path::new(DATASET_BLOB), &mut rng).unwrap();

        let comparison = compare(&vfs, "file_3", 4);
        assert_eq!(comparison.traversal.calls(), 4);
        assert_eq!(comparison.index.calls(), 4);
        assert!(comparison.traversal.samples.iter().all(|s| s.results == 1));
        assert!(comparison.index.samples.iter().all(|s| s.results == 1));
        assert!(comparison.is_consistent());
        assert!(comparison.traversal.min_ns() <= comparison.traversal.max_ns());

        let missing = compare(&vfs, "nope", 2);
        assert!(missing.index.samples.iter().all(|s| s.results == 0));
        assert!(missing.is_consistent());
    }

    #[test]
    fn test_run_is_reproducible_by_seed() {
        let config = BenchmarkConfig {
            file_count: 40,
            iterations: 10,
            seed: Some(42),
        };
        let first = run(&config).unwrap();
        let second = run(&config).unwrap();

        assert_eq!(first.seed, 42);
        assert_eq!(first.comparison.targets, second.comparison.targets);
        assert_eq!(first.comparison.traversal.calls(), 10);
        assert!(first.comparison.is_consistent());
        assert_eq!(first.dataset.files, 40);
    }

    #[test]
    fn test_empty_timing_is_zero() {
        let timing = StrategyTiming::new(Strategy::Index);
        assert_eq!(timing.mean_ns(), 0);
        assert_eq!(timing.min_ns(), 0);
        assert_eq!(timing.max_ns(), 0);
    }
}
