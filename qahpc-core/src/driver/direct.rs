use std::sync::Arc;

use super::launcher::{LaunchCommand, Launcher};
use super::{Driver, DriverKind, FrameworkEnv, SubmitLayout};
use crate::error::Result;
use crate::job::Job;

/// Runs every sample in the submitting process's machine, one after
/// another.
pub struct DirectDriver {
    framework: FrameworkEnv,
    launcher: Arc<dyn Launcher>,
}

impl DirectDriver {
    pub fn new(framework: FrameworkEnv, launcher: Arc<dyn Launcher>) -> Self {
        Self {
            framework,
            launcher,
        }
    }
}

impl Driver for DirectDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Direct
    }

    fn framework(&self) -> &FrameworkEnv {
        &self.framework
    }

    fn launcher(&self) -> &dyn Launcher {
        self.launcher.as_ref()
    }

    fn commands(&self, _job: &Job, layout: &SubmitLayout) -> Result<Vec<LaunchCommand>> {
        Ok(layout
            .segments
            .iter()
            .enumerate()
            .map(|(i, seg)| {
                self.framework
                    .worker_command(&layout.manifest)
                    .arg("--segment")
                    .arg(i.to_string())
                    .arg("--input")
                    .arg(seg.to_string_lossy())
                    .cwd(&layout.root)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::launcher::DryRunLauncher;
    use crate::driver::tests::job_with;

    #[test]
    fn one_local_command_per_sample() {
        let td = tempfile::tempdir().unwrap();
        let dir = td.path().join("jobDir");
        let launcher = Arc::new(DryRunLauncher::new());
        let driver = DirectDriver::new(FrameworkEnv::default(), launcher.clone());

        driver.submit(&job_with(3), &dir).unwrap();

        let cmds = launcher.commands();
        assert_eq!(cmds.len(), 3);
        assert!(cmds.iter().all(|c| c.program == "qahpc-worker"));
        assert!(cmds.iter().all(|c| c.cwd.as_deref() == Some(dir.as_path())));
        assert_eq!(cmds[2].args[3..5], ["--segment", "2"]);
    }

    #[test]
    fn empty_job_launches_nothing() {
        let td = tempfile::tempdir().unwrap();
        let launcher = Arc::new(DryRunLauncher::new());
        let driver = DirectDriver::new(FrameworkEnv::default(), launcher.clone());
        driver.submit(&job_with(0), &td.path().join("j")).unwrap();
        assert!(launcher.commands().is_empty());
    }
}
