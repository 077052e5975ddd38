use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::SampleCollection;
use crate::error::{QaError, Result};

/// One task out of `count` parallel submissions, written `ID:N`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: usize,
    pub count: usize,
}

impl TaskSpec {
    pub fn new(id: usize, count: usize) -> Result<Self> {
        check_task(id, count)?;
        Ok(Self { id, count })
    }
}

impl FromStr for TaskSpec {
    type Err = QaError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || QaError::TaskSpec(s.to_string());
        let (id, count) = s.trim().split_once(':').ok_or_else(bad)?;
        let id = id.parse::<usize>().map_err(|_| bad())?;
        let count = count.parse::<usize>().map_err(|_| bad())?;
        Self::new(id, count)
    }
}

impl fmt::Display for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.count)
    }
}

fn check_task(id: usize, count: usize) -> Result<()> {
    if count == 0 || id >= count {
        return Err(QaError::InvalidTask { id, count });
    }
    Ok(())
}

/// Samples at indices `task_id, task_id + num_tasks, ...`.
///
/// Requires `task_id < num_tasks`; anything else is an error rather than an
/// empty selection.
pub fn select_by_task(
    sh: &SampleCollection,
    task_id: usize,
    num_tasks: usize,
) -> Result<SampleCollection> {
    check_task(task_id, num_tasks)?;
    let mut out = sh.empty_like();
    for sample in sh.iter().skip(task_id).step_by(num_tasks) {
        out.add(sample.clone())?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Sample, SampleFile};
    use std::collections::BTreeSet;

    fn collection(n: usize) -> SampleCollection {
        let mut sh = SampleCollection::new();
        for i in 0..n {
            sh.add(Sample::new(
                format!("s{i}"),
                vec![SampleFile::new(format!("/d/s{i}/f.root"))],
            ))
            .unwrap();
        }
        sh
    }

    fn names(sh: &SampleCollection) -> Vec<String> {
        sh.iter().map(|s| s.name().to_string()).collect()
    }

    #[test]
    fn stride_selection() {
        let sh = collection(7);
        let t = select_by_task(&sh, 2, 3).unwrap();
        assert_eq!(names(&t), ["s2", "s5"]);
    }

    #[test]
    fn tasks_partition_the_collection() {
        for n in [0, 1, 5, 7, 16] {
            let sh = collection(n);
            for tasks in 1..=9 {
                let mut seen = BTreeSet::new();
                let mut total = 0;
                for t in 0..tasks {
                    let sel = select_by_task(&sh, t, tasks).unwrap();
                    total += sel.len();
                    seen.extend(names(&sel));
                }
                assert_eq!(total, n, "overlap for n={n} tasks={tasks}");
                assert_eq!(seen.len(), n);
            }
        }
    }

    #[test]
    fn out_of_range_task_fails() {
        let sh = collection(4);
        assert!(matches!(
            select_by_task(&sh, 3, 3),
            Err(QaError::InvalidTask { id: 3, count: 3 })
        ));
        assert!(matches!(
            select_by_task(&sh, 0, 0),
            Err(QaError::InvalidTask { .. })
        ));
    }

    #[test]
    fn parses_task_spec() {
        assert_eq!("2:5".parse::<TaskSpec>().unwrap(), TaskSpec { id: 2, count: 5 });
        assert_eq!(TaskSpec::new(0, 1).unwrap().to_string(), "0:1");
        for bad in ["", "3", "a:2", "1:b", "1:2:3", "-1:2"] {
            assert!(
                matches!(bad.parse::<TaskSpec>(), Err(QaError::TaskSpec(_))),
                "{bad:?}"
            );
        }
        assert!(matches!(
            "5:5".parse::<TaskSpec>(),
            Err(QaError::InvalidTask { .. })
        ));
    }
}
