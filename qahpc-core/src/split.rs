use tracing::{debug, info};

use crate::domain::{Sample, SampleCollection, SampleFile};
use crate::error::{QaError, Result};
use crate::events::{EventCounter, scan_sample};
use crate::pool::WorkerPool;

pub use crate::pool::DEFAULT_WORKERS as DEFAULT_SPLIT_WORKERS;

/// Split one sample into chunks of at most `num_events` entries.
///
/// Files are never divided: a file holding more than `num_events` entries
/// ends up alone in its own oversized chunk. A sample without files becomes
/// a single empty chunk. Missing entry counts are filled in through
/// `counter` first.
pub fn split_sample(
    sample: &Sample,
    num_events: u64,
    counter: &dyn EventCounter,
) -> Result<Vec<Sample>> {
    if num_events == 0 {
        return Err(QaError::InvalidSplit);
    }
    let mut sample = sample.clone();
    scan_sample(&mut sample, counter)?;

    let mut groups: Vec<Vec<SampleFile>> = Vec::new();
    let mut current: Vec<SampleFile> = Vec::new();
    let mut current_events = 0u64;
    for f in sample.files() {
        // counts are all known after scan_sample
        let n = f.entries.unwrap_or(0);
        if !current.is_empty() && current_events + n > num_events {
            groups.push(std::mem::take(&mut current));
            current_events = 0;
        }
        current.push(f.clone());
        current_events += n;
    }
    // an empty sample still yields one (empty) chunk
    if !current.is_empty() || groups.is_empty() {
        groups.push(current);
    }

    let chunks: Vec<Sample> = groups
        .into_iter()
        .enumerate()
        .map(|(i, files)| {
            let mut s = Sample::new(format!("{}_{i}", sample.name()), files);
            s.meta = sample.meta.clone();
            s
        })
        .collect();
    debug!(target: "qahpc", sample = sample.name(), chunks = chunks.len(), "split sample");
    Ok(chunks)
}

/// Sequential split of every sample, keeping collection order and metadata.
pub fn split_samples(
    sh: &SampleCollection,
    num_events: u64,
    counter: &dyn EventCounter,
) -> Result<SampleCollection> {
    let mut out = sh.empty_like();
    for sample in sh {
        for chunk in split_sample(sample, num_events, counter)? {
            out.add(chunk)?;
        }
    }
    info!(target: "qahpc", "Split {} samples into {}", sh.len(), out.len());
    Ok(out)
}

/// Same result as [`split_samples`], with the per-sample scan and split
/// spread over a pool of `workers` threads.
pub fn split_samples_parallel(
    sh: &SampleCollection,
    num_events: u64,
    counter: &dyn EventCounter,
    workers: usize,
) -> Result<SampleCollection> {
    if num_events == 0 {
        return Err(QaError::InvalidSplit);
    }
    let pool = WorkerPool::new(workers)?;
    let per_sample = pool.map(sh.iter().collect(), |s: &Sample| {
        split_sample(s, num_events, counter)
    })?;

    let mut out = sh.empty_like();
    for chunk in per_sample.into_iter().flatten() {
        out.add(chunk)?;
    }
    info!(
        target: "qahpc",
        "Split {} samples into {} on {} workers",
        sh.len(),
        out.len(),
        pool.workers()
    );
    Ok(out)
}
