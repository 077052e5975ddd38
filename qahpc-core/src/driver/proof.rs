use std::sync::Arc;

use super::launcher::{LaunchCommand, Launcher};
use super::{Driver, DriverKind, FrameworkEnv, SubmitLayout};
use crate::error::Result;
use crate::job::Job;

/// One local multi-worker session over all samples.
pub struct ProofDriver {
    num_workers: Option<usize>,
    framework: FrameworkEnv,
    launcher: Arc<dyn Launcher>,
}

impl ProofDriver {
    pub fn new(
        num_workers: Option<usize>,
        framework: FrameworkEnv,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        Self {
            num_workers,
            framework,
            launcher,
        }
    }

    pub fn num_workers(&self) -> Option<usize> {
        self.num_workers
    }
}

impl Driver for ProofDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Proof
    }

    fn framework(&self) -> &FrameworkEnv {
        &self.framework
    }

    fn launcher(&self) -> &dyn Launcher {
        self.launcher.as_ref()
    }

    fn commands(&self, _job: &Job, layout: &SubmitLayout) -> Result<Vec<LaunchCommand>> {
        if layout.segments.is_empty() {
            return Ok(Vec::new());
        }
        let mut cmd = self.framework.worker_command(&layout.manifest).arg("--proof");
        // unset means let the session pick one worker per core
        if let Some(n) = self.num_workers {
            cmd = cmd.arg("--workers").arg(n.to_string());
        }
        let cmd = cmd
            .args(layout.segments.iter().map(|s| s.to_string_lossy().to_string()))
            .cwd(&layout.root);
        Ok(vec![cmd])
    }
}
