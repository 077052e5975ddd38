use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::domain::SampleCollection;
use crate::error::Result;
use crate::events::{EventCounter, scan_n_events};
use crate::job::OPT_EVENTS_PER_WORKER;
use crate::scan::{ScanOptions, scan_samples};
use crate::split::{DEFAULT_SPLIT_WORKERS, split_samples_parallel};
use crate::store;
use crate::task::{TaskSpec, select_by_task};

/// Where samples come from and how they are cut up for this invocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoadOptions {
    pub scan_dir: String,
    pub sample_patterns: Vec<String>,
    /// A previously saved collection; takes precedence over scanning.
    pub saved: Option<PathBuf>,
    pub split_events: Option<u64>,
    pub split_workers: usize,
    pub task: Option<TaskSpec>,
    pub events_per_worker: Option<u64>,
    pub scan: ScanOptions,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            scan_dir: "$SCRATCH".to_string(),
            sample_patterns: Vec::new(),
            saved: None,
            split_events: None,
            split_workers: DEFAULT_SPLIT_WORKERS,
            task: None,
            events_per_worker: None,
            scan: ScanOptions::default(),
        }
    }
}

/// Build the collection for one run: load or scan, split, pick this
/// task's stride, then record the per-worker event budget.
pub fn load_samples(opts: &LoadOptions, counter: &dyn EventCounter) -> Result<SampleCollection> {
    let mut sh = match &opts.saved {
        Some(path) => {
            info!(target: "qahpc", "Loading saved samples from {}", path.display());
            store::load(path)?
        }
        None => scan_samples(&opts.scan_dir, &opts.sample_patterns, Some(&opts.scan))?,
    };

    if let Some(n) = opts.split_events {
        sh = split_samples_parallel(&sh, n, counter, opts.split_workers)?;
    }

    if let Some(task) = opts.task {
        sh = select_by_task(&sh, task.id, task.count)?;
        info!(target: "qahpc", "Task {task} keeps {} samples", sh.len());
    }

    if let Some(n) = opts.events_per_worker.filter(|&n| n > 0) {
        scan_n_events(&mut sh, counter)?;
        sh.meta.set_double(OPT_EVENTS_PER_WORKER, n as f64);
    }
    Ok(sh)
}

/// Log a compact summary of the collection.
pub fn print_samples(sh: &SampleCollection) {
    info!(target: "qahpc", "Number of samples: {}", sh.len());
    for s in sh {
        info!(target: "qahpc", "Sample: {}", s.name());
        info!(target: "qahpc", "  Number of files:  {}", s.num_files());
        match s.num_entries() {
            Some(n) => info!(target: "qahpc", "  Number of events: {n}"),
            None => info!(target: "qahpc", "  Number of events: unknown"),
        }
    }
}
