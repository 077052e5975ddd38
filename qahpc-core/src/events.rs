use std::path::Path;
use std::process::Command;

use crate::domain::{Sample, SampleCollection};
use crate::error::{QaError, Result};

pub const DEFAULT_COUNT_PROGRAM: &str = "qahpc-count-events";

/// Reports the number of events stored in one input file.
///
/// The data format itself is opaque here; implementations delegate to
/// whatever knows how to open it.
pub trait EventCounter: Send + Sync {
    fn count(&self, path: &Path) -> Result<u64>;
}

/// Runs `<program> [args..] <file>` and reads the event count from the
/// last non-empty line of stdout.
#[derive(Clone, Debug)]
pub struct CommandEventCounter {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandEventCounter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }
}

impl Default for CommandEventCounter {
    fn default() -> Self {
        Self::new(DEFAULT_COUNT_PROGRAM)
    }
}

impl EventCounter for CommandEventCounter {
    fn count(&self, path: &Path) -> Result<u64> {
        let fail = |reason: String| QaError::EventCount {
            path: path.to_path_buf(),
            reason,
        };
        let out = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .map_err(|e| fail(format!("{}: {e}", self.program)))?;
        if !out.status.success() {
            return Err(fail(format!("{} exited with {}", self.program, out.status)));
        }
        parse_count(&String::from_utf8_lossy(&out.stdout)).map_err(fail)
    }
}

fn parse_count(stdout: &str) -> std::result::Result<u64, String> {
    let line = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .ok_or_else(|| "no output".to_string())?;
    line.parse::<u64>()
        .map_err(|e| format!("bad count {line:?}: {e}"))
}

/// Count any files of `sample` whose entries are still unknown.
pub fn scan_sample(sample: &mut Sample, counter: &dyn EventCounter) -> Result<()> {
    sample.scan_entries(|p| counter.count(p))
}

/// Count entries for every sample in the collection.
pub fn scan_n_events(collection: &mut SampleCollection, counter: &dyn EventCounter) -> Result<()> {
    for s in collection.iter_mut() {
        scan_sample(s, counter)?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixed {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use super::EventCounter;
    use crate::error::{QaError, Result};

    /// Fixed per-file counts; files not listed are an error.
    #[derive(Clone, Debug, Default)]
    pub struct StaticEventCounter {
        counts: HashMap<PathBuf, u64>,
    }

    impl StaticEventCounter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, path: impl Into<PathBuf>, entries: u64) {
            self.counts.insert(path.into(), entries);
        }
    }

    impl FromIterator<(PathBuf, u64)> for StaticEventCounter {
        fn from_iter<I: IntoIterator<Item = (PathBuf, u64)>>(iter: I) -> Self {
            Self {
                counts: iter.into_iter().collect(),
            }
        }
    }

    impl EventCounter for StaticEventCounter {
        fn count(&self, path: &Path) -> Result<u64> {
            self.counts
                .get(path)
                .copied()
                .ok_or_else(|| QaError::EventCount {
                    path: path.to_path_buf(),
                    reason: "no entry count recorded".into(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixed::StaticEventCounter;
    use super::*;
    use crate::domain::SampleFile;
    use std::path::PathBuf;

    #[test]
    fn parse_count_takes_last_line() {
        assert_eq!(parse_count("opening file\n  1234 \n\n"), Ok(1234));
        assert!(parse_count("").is_err());
        assert!(parse_count("many").is_err());
    }

    #[test]
    fn static_counter_fills_unknown_files() {
        let counter: StaticEventCounter = [
            (PathBuf::from("/d/a.root"), 7),
            (PathBuf::from("/d/b.root"), 3),
        ]
        .into_iter()
        .collect();
        let mut c = SampleCollection::new();
        c.add(Sample::new(
            "d",
            vec![SampleFile::new("/d/a.root"), SampleFile::new("/d/b.root")],
        ))
        .unwrap();
        scan_n_events(&mut c, &counter).unwrap();
        assert_eq!(c[0].num_entries(), Some(10));
    }

    #[test]
    fn static_counter_rejects_unknown_path() {
        let counter = StaticEventCounter::new();
        let err = counter.count(Path::new("/missing.root")).unwrap_err();
        assert!(matches!(err, QaError::EventCount { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn command_counter_reads_program_output() {
        // the file path lands in $1 and is ignored
        let counter = CommandEventCounter {
            program: "sh".into(),
            args: vec!["-c".into(), "echo 42".into(), "sh".into()],
        };
        assert_eq!(counter.count(Path::new("/any.root")).unwrap(), 42);
    }

    #[cfg(unix)]
    #[test]
    fn command_counter_reports_failing_program() {
        let counter = CommandEventCounter {
            program: "false".into(),
            args: vec![],
        };
        let err = counter.count(Path::new("/any.root")).unwrap_err();
        assert!(matches!(err, QaError::EventCount { .. }));
    }
}
