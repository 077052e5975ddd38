use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use qahpc_core::driver::DEFAULT_WORKER_EXE;
use qahpc_core::events::DEFAULT_COUNT_PROGRAM;
use qahpc_core::split::DEFAULT_SPLIT_WORKERS;

#[derive(Parser)]
#[command(author, version, about = "QuickAna HPC sample preparation and job submission", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan for samples, optionally split them, and save the collection
    PrepareSamples(PrepareArgs),

    /// Build the sample list for this task and submit the analysis job
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Output directory for the saved sample collection
    #[arg(long, default_value = "samples")]
    pub output: PathBuf,

    /// Input dir to scan for samples
    #[arg(long = "scan-dir", alias = "scanDir", default_value = "$SCRATCH")]
    pub scan_dir: String,

    /// Substring pattern for filtering samples (repeatable)
    #[arg(long = "sample-pattern", alias = "samplePattern")]
    pub sample_patterns: Vec<String>,

    /// Split samples by number of events
    #[arg(long = "split-events", alias = "splitEvents")]
    pub split_events: Option<u64>,

    /// Worker threads used while splitting
    #[arg(long = "split-workers", default_value_t = DEFAULT_SPLIT_WORKERS)]
    pub split_workers: usize,

    /// Program that prints the event count of one input file
    #[arg(long = "count-events-cmd", env = "QAHPC_COUNT_EVENTS", default_value = DEFAULT_COUNT_PROGRAM)]
    pub count_events_cmd: String,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Disable systematics
    #[arg(long = "no-systs", alias = "noSysts")]
    pub no_systs: bool,

    /// Output directory for the job
    #[arg(long = "job-dir", alias = "jobDir", default_value = "jobDir")]
    pub job_dir: PathBuf,

    /// Overwrite the job dir if it exists
    #[arg(long)]
    pub overwrite: bool,

    /// Input dir to scan for samples
    #[arg(long = "scan-dir", alias = "scanDir", default_value = "$GSCRATCH/xAOD")]
    pub scan_dir: String,

    /// Substring pattern for filtering samples (repeatable)
    #[arg(long = "sample-pattern", alias = "samplePattern")]
    pub sample_patterns: Vec<String>,

    /// Location of a saved sample collection
    #[arg(long = "sample-handler", alias = "sampleHandler")]
    pub sample_handler: Option<PathBuf>,

    /// Split samples by number of events
    #[arg(long = "split-samples", alias = "splitSamples")]
    pub split_samples: Option<u64>,

    /// Worker threads used while splitting
    #[arg(long = "split-workers", default_value_t = DEFAULT_SPLIT_WORKERS)]
    pub split_workers: usize,

    /// Task in format "ID:N", where N is the total number of tasks.
    /// Only every N-th sample starting at ID is processed.
    #[arg(long)]
    pub task: Option<String>,

    /// Max number of events per sample
    #[arg(long = "max-events", alias = "maxEvents")]
    pub max_events: Option<u64>,

    /// Activate output xAOD writing
    #[arg(long = "write-xaod", alias = "writeXAOD")]
    pub write_xaod: bool,

    /// Execution driver: direct, pdsf or proof
    #[arg(long, default_value = "direct")]
    pub driver: String,

    /// Max number of events per worker in a batch job
    #[arg(long = "events-per-worker", alias = "eventsPerWorker")]
    pub events_per_worker: Option<u64>,

    /// Number of workers for the proof driver
    #[arg(long = "n-proof-workers", alias = "nProofWorkers")]
    pub n_proof_workers: Option<usize>,

    /// Enable the optimized analysis scheduler
    #[arg(long)]
    pub opt: bool,

    /// Extra batch submit flags for the pdsf driver
    #[arg(long = "submit-flags")]
    pub submit_flags: Option<String>,

    /// Event-processing program launched by the drivers
    #[arg(long = "worker-exe", env = "QAHPC_WORKER", default_value = DEFAULT_WORKER_EXE)]
    pub worker_exe: String,

    /// Program that prints the event count of one input file
    #[arg(long = "count-events-cmd", env = "QAHPC_COUNT_EVENTS", default_value = DEFAULT_COUNT_PROGRAM)]
    pub count_events_cmd: String,

    /// Write the job dir and print launch commands without running them
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}
