// qahpc_core/src/domain.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Index;
use std::path::{Path, PathBuf};

use crate::error::{QaError, Result};

/// Tree-name convention key set on every scanned collection.
pub const META_TREE_NAME: &str = "nc_tree";
pub const DEFAULT_TREE_NAME: &str = "CollectionTree";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MetaValue {
    String(String),
    Double(f64),
    Integer(i64),
    Bool(bool),
}

/// Ordered key/value metadata attached to samples, collections and jobs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaObject {
    values: BTreeMap<String, MetaValue>,
}

impl MetaObject {
    pub fn set_string(&mut self, key: &str, value: impl Into<String>) {
        self.values
            .insert(key.to_string(), MetaValue::String(value.into()));
    }

    pub fn set_double(&mut self, key: &str, value: f64) {
        self.values.insert(key.to_string(), MetaValue::Double(value));
    }

    pub fn set_integer(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), MetaValue::Integer(value));
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), MetaValue::Bool(value));
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.values.get(key)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(MetaValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_double(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(MetaValue::Double(v)) => Some(*v),
            Some(MetaValue::Integer(v)) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn get_integer(&self, key: &str) -> Option<i64> {
        match self.values.get(key) {
            Some(MetaValue::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleFile {
    pub path: PathBuf,
    /// Event count, `None` until scanned.
    pub entries: Option<u64>,
}

impl SampleFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: None,
        }
    }

    pub fn with_entries(path: impl Into<PathBuf>, entries: u64) -> Self {
        Self {
            path: path.into(),
            entries: Some(entries),
        }
    }
}

/// A named group of input files processed as one unit.
///
/// The file list is fixed at construction; only per-file entry counts can
/// be filled in afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    name: String,
    files: Vec<SampleFile>,
    pub meta: MetaObject,
}

impl Sample {
    pub fn new(name: impl Into<String>, files: Vec<SampleFile>) -> Self {
        Self {
            name: name.into(),
            files,
            meta: MetaObject::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn files(&self) -> &[SampleFile] {
        &self.files
    }

    pub fn num_files(&self) -> usize {
        self.files.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }

    /// Total events, known only once every file has been counted.
    pub fn num_entries(&self) -> Option<u64> {
        self.files.iter().map(|f| f.entries).sum()
    }

    pub fn entries_known(&self) -> bool {
        self.files.iter().all(|f| f.entries.is_some())
    }

    /// Fill in missing entry counts. Already-known counts are kept.
    pub fn scan_entries<F>(&mut self, mut count: F) -> Result<()>
    where
        F: FnMut(&Path) -> Result<u64>,
    {
        for f in self.files.iter_mut().filter(|f| f.entries.is_none()) {
            f.entries = Some(count(&f.path)?);
        }
        Ok(())
    }
}

/// Ordered set of samples with collection-wide metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleCollection {
    samples: Vec<Sample>,
    pub meta: MetaObject,
}

impl SampleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty collection carrying the same metadata as `self`.
    pub fn empty_like(&self) -> Self {
        Self {
            samples: Vec::new(),
            meta: self.meta.clone(),
        }
    }

    pub fn add(&mut self, sample: Sample) -> Result<()> {
        if self.find(sample.name()).is_some() {
            return Err(QaError::DuplicateSample(sample.name().to_string()));
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Sample> {
        self.samples.get(i)
    }

    pub fn find(&self, name: &str) -> Option<&Sample> {
        self.samples.iter().find(|s| s.name() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Sample> {
        self.samples.iter_mut()
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    /// Sum of entries over all samples, if every sample has been scanned.
    pub fn num_entries(&self) -> Option<u64> {
        self.samples.iter().map(Sample::num_entries).sum()
    }
}

impl Index<usize> for SampleCollection {
    type Output = Sample;
    fn index(&self, i: usize) -> &Sample {
        &self.samples[i]
    }
}

impl<'a> IntoIterator for &'a SampleCollection {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;
    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl IntoIterator for SampleCollection {
    type Item = Sample;
    type IntoIter = std::vec::IntoIter<Sample>;
    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str, counts: &[Option<u64>]) -> Sample {
        let files = counts
            .iter()
            .enumerate()
            .map(|(i, c)| SampleFile {
                path: PathBuf::from(format!("/data/{name}/f{i}.root")),
                entries: *c,
            })
            .collect();
        Sample::new(name, files)
    }

    #[test]
    fn entries_unknown_until_all_files_counted() {
        let mut s = sample("a", &[Some(10), None]);
        assert_eq!(s.num_entries(), None);
        assert!(!s.entries_known());

        s.scan_entries(|_| Ok(5)).unwrap();
        assert_eq!(s.num_entries(), Some(15));
        assert_eq!(s.files()[0].entries, Some(10));
    }

    #[test]
    fn scan_entries_propagates_counter_error() {
        let mut s = sample("a", &[None]);
        let err = s
            .scan_entries(|p| {
                Err(QaError::EventCount {
                    path: p.to_path_buf(),
                    reason: "boom".into(),
                })
            })
            .unwrap_err();
        assert!(matches!(err, QaError::EventCount { .. }));
        assert_eq!(s.num_entries(), None);
    }

    #[test]
    fn collection_rejects_duplicate_names() {
        let mut c = SampleCollection::new();
        c.add(sample("a", &[Some(1)])).unwrap();
        let err = c.add(sample("a", &[Some(2)])).unwrap_err();
        assert!(matches!(err, QaError::DuplicateSample(n) if n == "a"));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn collection_indexing_and_iteration_keep_order() {
        let mut c = SampleCollection::new();
        for n in ["z", "a", "m"] {
            c.add(sample(n, &[Some(1)])).unwrap();
        }
        assert_eq!(c[0].name(), "z");
        assert_eq!(c.get(2).map(Sample::name), Some("m"));
        assert!(c.get(3).is_none());
        let names: Vec<_> = c.iter().map(Sample::name).collect();
        assert_eq!(names, ["z", "a", "m"]);
        assert_eq!(c.num_entries(), Some(3));
    }

    #[test]
    fn meta_double_reads_integers() {
        let mut m = MetaObject::default();
        m.set_integer("n", 4);
        m.set_string("s", "x");
        assert_eq!(m.get_double("n"), Some(4.0));
        assert_eq!(m.get_double("s"), None);
        assert_eq!(m.get_string("s"), Some("x"));
    }
}
