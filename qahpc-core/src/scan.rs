use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::domain::{DEFAULT_TREE_NAME, META_TREE_NAME, Sample, SampleCollection, SampleFile};
use crate::error::{QaError, Result};
use crate::util::expand::expand_path;
use crate::util::glob::{glob_match, substring_pattern};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Only files whose name matches are picked up.
    pub file_pattern: String,
    pub follow_links: bool,
    /// Value stored under `nc_tree` on the resulting collection.
    pub tree_name: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            file_pattern: "*.root*".to_string(),
            follow_links: true,
            tree_name: DEFAULT_TREE_NAME.to_string(),
        }
    }
}

/// Walk `scan_dir` and group data files into samples, one per dataset
/// directory. A sample is kept if its name contains any of `patterns`
/// (all samples when `patterns` is empty).
pub fn scan_samples(
    scan_dir: &str,
    patterns: &[String],
    opts: Option<&ScanOptions>,
) -> Result<SampleCollection> {
    let defaults = ScanOptions::default();
    let opts = opts.unwrap_or(&defaults);
    let root = expand_path(scan_dir);
    if !root.is_dir() {
        return Err(QaError::ScanDir(root));
    }

    let globs: Vec<String> = if patterns.is_empty() {
        vec!["*".to_string()]
    } else {
        patterns.iter().map(|p| substring_pattern(p)).collect()
    };

    let mut by_sample: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for e in WalkDir::new(&root)
        .follow_links(opts.follow_links)
        .sort_by_file_name()
    {
        let e = e.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        if !e.file_type().is_file() {
            continue;
        }
        let file_name = e.file_name().to_string_lossy();
        if !glob_match(&opts.file_pattern, &file_name) {
            continue;
        }
        let Some(name) = sample_name(e.path(), &root) else {
            continue;
        };
        if !globs.iter().any(|g| glob_match(g, &name)) {
            debug!(target: "qahpc", sample = %name, "skipping {}", e.path().display());
            continue;
        }
        by_sample.entry(name).or_default().push(e.path().to_path_buf());
    }

    let mut sh = SampleCollection::new();
    sh.meta.set_string(META_TREE_NAME, &opts.tree_name);
    for (name, mut paths) in by_sample {
        paths.sort();
        let files = paths.into_iter().map(SampleFile::new).collect();
        sh.add(Sample::new(name, files))?;
    }
    info!(target: "qahpc", "Scanned {} samples under {}", sh.len(), root.display());
    Ok(sh)
}

/// Name of the dataset directory holding `path`: the first directory level
/// below the scan root, however deep the file sits inside it. Files directly
/// under the scan root use the root's own name.
fn sample_name(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = rel.components();
    let first = parts.next()?;
    let dir = if parts.next().is_none() {
        root.file_name()?
    } else {
        first.as_os_str()
    };
    Some(dir.to_string_lossy().to_string())
}
