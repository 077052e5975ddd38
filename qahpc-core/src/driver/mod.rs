pub mod direct;
pub mod launcher;
pub mod proof;
pub mod sge;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::info;

use crate::error::{QaError, Result};
use crate::job::Job;

pub use direct::DirectDriver;
pub use launcher::{DryRunLauncher, LaunchCommand, Launcher, ProcessLauncher};
pub use proof::ProofDriver;
pub use sge::SgeDriver;

pub const DEFAULT_WORKER_EXE: &str = "qahpc-worker";
pub const MANIFEST_FILE: &str = "job.cbor";
pub const MANIFEST_VERSION: u16 = 1;

/// How the external event-processing program is invoked. Built once per
/// run from the command line and handed to every launched process, so no
/// process-global state needs patching.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameworkEnv {
    pub worker_exe: String,
    /// Run the framework without graphics (`-b`).
    pub batch: bool,
    pub extra_args: Vec<String>,
}

impl Default for FrameworkEnv {
    fn default() -> Self {
        Self {
            worker_exe: DEFAULT_WORKER_EXE.to_string(),
            batch: true,
            extra_args: Vec::new(),
        }
    }
}

impl FrameworkEnv {
    /// Base worker command for the job whose manifest lives at `manifest`.
    pub fn worker_command(&self, manifest: &Path) -> LaunchCommand {
        let mut cmd = LaunchCommand::new(&self.worker_exe);
        if self.batch {
            cmd = cmd.arg("-b");
        }
        cmd.args(self.extra_args.iter().cloned())
            .arg("--job")
            .arg(manifest.to_string_lossy())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DriverOptions {
    /// Batch system submit flags (`-S /bin/bash`).
    pub submit_flags: String,
    /// Additional resource requests passed to the batch system.
    pub extra_submit_flags: String,
    /// Prepended to every batch script.
    pub shell_init: String,
    pub qsub: String,
    pub proof_workers: Option<usize>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            submit_flags: "-S /bin/bash".to_string(),
            extra_submit_flags: "-l gscratchio=1,h_vmem=6G".to_string(),
            shell_init: "shopt -s expand_aliases\n".to_string(),
            qsub: "qsub".to_string(),
            proof_workers: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverKind {
    Direct,
    Pdsf,
    Proof,
}

impl DriverKind {
    pub const NAMES: [&'static str; 3] = ["direct", "pdsf", "proof"];

    pub fn as_str(&self) -> &'static str {
        match self {
            DriverKind::Direct => "direct",
            DriverKind::Pdsf => "pdsf",
            DriverKind::Proof => "proof",
        }
    }
}

impl FromStr for DriverKind {
    type Err = QaError;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "direct" => Ok(DriverKind::Direct),
            "pdsf" => Ok(DriverKind::Pdsf),
            "proof" => Ok(DriverKind::Proof),
            other => Err(QaError::UnsupportedDriver(other.to_string())),
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Files written into the submit directory before anything is launched.
#[derive(Clone, Debug)]
pub struct SubmitLayout {
    pub root: PathBuf,
    pub manifest: PathBuf,
    /// One input list per sample, in collection order.
    pub segments: Vec<PathBuf>,
}

#[derive(Serialize, Deserialize)]
pub struct JobManifest {
    pub version: u16,
    pub driver: String,
    pub created: i64,
    pub framework: FrameworkEnv,
    pub job: Job,
}

/// Create `dir` and write the job manifest plus one input list per sample.
/// Every path in the returned layout is absolute, since launched commands
/// run from `dir` itself (or from wherever the batch system starts them).
pub fn prepare_submit_dir(
    job: &Job,
    dir: &Path,
    driver: DriverKind,
    framework: &FrameworkEnv,
) -> Result<SubmitLayout> {
    if dir.exists() {
        return Err(QaError::SubmitDirExists(dir.to_path_buf()));
    }
    fs::create_dir_all(dir)?;
    let dir = std::path::absolute(dir)?;
    let inputs = dir.join("input");
    fs::create_dir_all(&inputs)?;
    fs::create_dir_all(dir.join("logs"))?;

    let manifest = dir.join(MANIFEST_FILE);
    let record = JobManifest {
        version: MANIFEST_VERSION,
        driver: driver.to_string(),
        created: OffsetDateTime::now_utc().unix_timestamp(),
        framework: framework.clone(),
        job: job.clone(),
    };
    let mut w = BufWriter::new(File::create(&manifest)?);
    ciborium::ser::into_writer(&record, &mut w)
        .map_err(|e| QaError::Format(format!("manifest encode: {e}")))?;
    w.flush()?;

    let mut segments = Vec::with_capacity(job.samples().len());
    for (i, sample) in job.samples().iter().enumerate() {
        let seg = inputs.join(format!("{i:05}-{}.txt", sample.name()));
        let mut w = BufWriter::new(File::create(&seg)?);
        for p in sample.paths() {
            writeln!(w, "{}", p.display())?;
        }
        w.flush()?;
        segments.push(seg);
    }

    Ok(SubmitLayout {
        root: dir,
        manifest,
        segments,
    })
}

pub fn read_manifest(dir: &Path) -> Result<JobManifest> {
    let f = File::open(dir.join(MANIFEST_FILE))?;
    let m: JobManifest = ciborium::de::from_reader(std::io::BufReader::new(f))
        .map_err(|e| QaError::Format(format!("manifest decode: {e}")))?;
    if m.version != MANIFEST_VERSION {
        return Err(QaError::Format(format!(
            "unsupported manifest version {}",
            m.version
        )));
    }
    Ok(m)
}

/// A back end that takes a configured job and runs it somewhere.
pub trait Driver {
    fn kind(&self) -> DriverKind;

    fn framework(&self) -> &FrameworkEnv;

    fn launcher(&self) -> &dyn Launcher;

    /// Commands that execute the job laid out in `layout`. May write
    /// driver-specific files (batch scripts) under `layout.root`.
    fn commands(&self, job: &Job, layout: &SubmitLayout) -> Result<Vec<LaunchCommand>>;

    fn submit(&self, job: &Job, submit_dir: &Path) -> Result<()> {
        let layout = prepare_submit_dir(job, submit_dir, self.kind(), self.framework())?;
        let cmds = self.commands(job, &layout)?;
        info!(
            target: "qahpc",
            "Submitting {} samples as {} command(s) to {}",
            job.samples().len(),
            cmds.len(),
            submit_dir.display()
        );
        for cmd in &cmds {
            self.launcher().launch(cmd)?;
        }
        Ok(())
    }
}

pub fn open_driver(
    kind: DriverKind,
    opts: DriverOptions,
    framework: FrameworkEnv,
    launcher: Arc<dyn Launcher>,
) -> Box<dyn Driver> {
    match kind {
        DriverKind::Direct => Box::new(DirectDriver::new(framework, launcher)),
        DriverKind::Pdsf => Box::new(SgeDriver::new(opts, framework, launcher)),
        DriverKind::Proof => Box::new(ProofDriver::new(opts.proof_workers, framework, launcher)),
    }
}

/// Look a driver up by its command-line name.
pub fn driver_from_name(
    name: &str,
    opts: DriverOptions,
    framework: FrameworkEnv,
    launcher: Arc<dyn Launcher>,
) -> Result<Box<dyn Driver>> {
    Ok(open_driver(name.parse()?, opts, framework, launcher))
}
