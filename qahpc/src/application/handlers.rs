use std::fs;
use std::sync::Arc;
use tracing::info;

use qahpc_core::driver::{
    DriverKind, DriverOptions, DryRunLauncher, FrameworkEnv, Launcher, ProcessLauncher,
    open_driver,
};
use qahpc_core::error::Result;
use qahpc_core::{
    CommandEventCounter, Job, JobOptions, LoadOptions, TaskSpec, load_samples, print_samples,
    scan_samples, split_samples_parallel, store,
};

use crate::presentation::cli::{PrepareArgs, RunArgs};

pub fn handle_prepare_samples(args: PrepareArgs) -> Result<()> {
    let counter = CommandEventCounter::new(args.count_events_cmd);

    info!(target: "qahpc", "Scanning {}", args.scan_dir);
    let mut sh = scan_samples(&args.scan_dir, &args.sample_patterns, None)?;
    if let Some(n) = args.split_events {
        sh = split_samples_parallel(&sh, n, &counter, args.split_workers)?;
    }
    print_samples(&sh);

    store::save(&sh, &args.output)?;
    Ok(())
}

pub fn handle_run(args: RunArgs) -> Result<()> {
    info!(target: "qahpc", "Application begin");

    // configuration errors surface before anything touches the filesystem
    let kind: DriverKind = args.driver.parse()?;
    let task = args.task.as_deref().map(str::parse::<TaskSpec>).transpose()?;

    if args.overwrite && args.job_dir.exists() {
        info!(target: "qahpc", "Removing existing {}", args.job_dir.display());
        fs::remove_dir_all(&args.job_dir)?;
    }

    info!(target: "qahpc", "Loading samples");
    let counter = CommandEventCounter::new(args.count_events_cmd);
    let load = LoadOptions {
        scan_dir: args.scan_dir,
        sample_patterns: args.sample_patterns,
        saved: args.sample_handler,
        split_events: args.split_samples,
        split_workers: args.split_workers,
        task,
        events_per_worker: args.events_per_worker,
        ..Default::default()
    };
    let sh = load_samples(&load, &counter)?;
    print_samples(&sh);
    if sh.is_empty() {
        info!(target: "qahpc", "Exiting early due to empty sample list");
        return Ok(());
    }

    let job = Job::configure(
        sh,
        &JobOptions {
            max_events: args.max_events,
            no_systematics: args.no_systs,
            optimized_scheduler: args.opt,
            write_xaod: args.write_xaod,
        },
    );

    let mut driver_opts = DriverOptions {
        proof_workers: args.n_proof_workers,
        ..Default::default()
    };
    if let Some(flags) = args.submit_flags {
        driver_opts.extra_submit_flags = flags;
    }
    let framework = FrameworkEnv {
        worker_exe: args.worker_exe,
        ..Default::default()
    };
    let launcher: Arc<dyn Launcher> = if args.dry_run {
        Arc::new(DryRunLauncher::echoing())
    } else {
        Arc::new(ProcessLauncher)
    };

    info!(target: "qahpc", "Launching job with {kind} driver");
    let driver = open_driver(kind, driver_opts, framework, launcher);
    driver.submit(&job, &args.job_dir)?;

    info!(target: "qahpc", "Application finished");
    Ok(())
}
