use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::launcher::{LaunchCommand, Launcher, shell_quote};
use super::{Driver, DriverKind, DriverOptions, FrameworkEnv, SubmitLayout};
use crate::error::Result;
use crate::job::{Job, OPT_SUBMIT_FLAGS};

/// Grid Engine batch submission (the `pdsf` cluster): one batch script
/// and one `qsub` per sample.
pub struct SgeDriver {
    opts: DriverOptions,
    framework: FrameworkEnv,
    launcher: Arc<dyn Launcher>,
}

impl SgeDriver {
    pub fn new(opts: DriverOptions, framework: FrameworkEnv, launcher: Arc<dyn Launcher>) -> Self {
        Self {
            opts,
            framework,
            launcher,
        }
    }

    /// Submit flags: driver defaults, then any set on the job itself.
    fn submit_flags(&self, job: &Job) -> Vec<String> {
        let job_flags = job.options.get_string(OPT_SUBMIT_FLAGS).unwrap_or("");
        [
            self.opts.submit_flags.as_str(),
            self.opts.extra_submit_flags.as_str(),
            job_flags,
        ]
        .iter()
        .flat_map(|s| s.split_whitespace())
        .map(str::to_string)
        .collect()
    }

    fn write_script(&self, layout: &SubmitLayout, i: usize, seg: &Path) -> Result<PathBuf> {
        let worker = self
            .framework
            .worker_command(&layout.manifest)
            .arg("--segment")
            .arg(i.to_string())
            .arg("--input")
            .arg(seg.to_string_lossy());

        let mut body = String::from("#!/bin/bash\n");
        body.push_str(&self.opts.shell_init);
        if !body.ends_with('\n') {
            body.push('\n');
        }
        body.push_str(&format!(
            "cd {}\n",
            shell_quote(&layout.root.to_string_lossy())
        ));
        body.push_str(&format!("exec {worker}\n"));

        let script = layout.root.join("submit").join(format!("run-{i}.sh"));
        fs::create_dir_all(layout.root.join("submit"))?;
        fs::write(&script, body)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;
        }
        Ok(script)
    }
}

impl Driver for SgeDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Pdsf
    }

    fn framework(&self) -> &FrameworkEnv {
        &self.framework
    }

    fn launcher(&self) -> &dyn Launcher {
        self.launcher.as_ref()
    }

    fn commands(&self, job: &Job, layout: &SubmitLayout) -> Result<Vec<LaunchCommand>> {
        let flags = self.submit_flags(job);
        let logs = layout.root.join("logs");
        let mut cmds = Vec::with_capacity(layout.segments.len());
        for (i, seg) in layout.segments.iter().enumerate() {
            let script = self.write_script(layout, i, seg)?;
            let name = job
                .samples()
                .get(i)
                .map(|s| s.name().to_string())
                .unwrap_or_else(|| format!("segment{i}"));
            cmds.push(
                LaunchCommand::new(&self.opts.qsub)
                    .args(flags.iter().cloned())
                    .args(["-N".to_string(), name])
                    .arg("-o")
                    .arg(logs.to_string_lossy())
                    .arg("-e")
                    .arg(logs.to_string_lossy())
                    .arg(script.to_string_lossy())
                    .cwd(&layout.root),
            );
        }
        Ok(cmds)
    }
}
