use serde::{Deserialize, Serialize};

use crate::domain::{MetaObject, SampleCollection};

// Option keys understood by the worker side.
pub const OPT_MAX_EVENTS: &str = "nc_EventLoop_MaxEvents";
pub const OPT_EVENTS_PER_WORKER: &str = "nc_EventLoop_EventsPerWorker";
pub const OPT_SUBMIT_FLAGS: &str = "nc_EventLoop_SubmitFlags";
pub const OPT_CACHE_SIZE: &str = "nc_cache_size";
pub const OPT_CACHE_LEARN_ENTRIES: &str = "nc_cache_learn_entries";
pub const OPT_XAOD_PERF_STATS: &str = "nc_xaod_perf_stats";

pub const DEFAULT_CACHE_SIZE: f64 = 100.0 * 1024.0 * 1024.0;
pub const DEFAULT_CACHE_LEARN_ENTRIES: f64 = 10.0;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JobOptions {
    pub max_events: Option<u64>,
    pub no_systematics: bool,
    pub optimized_scheduler: bool,
    pub write_xaod: bool,
}

/// Configuration of the analysis algorithm shipped to each worker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisAlg {
    pub electron_def: String,
    pub muon_def: String,
    pub tau_def: String,
    pub jet_def: String,
    pub met_def: String,
    pub or_def: String,
    pub scheduler_def: String,
    pub do_systematics: bool,
    pub write_xaod: bool,
}

impl Default for AnalysisAlg {
    fn default() -> Self {
        Self {
            electron_def: "default".into(),
            muon_def: "default".into(),
            tau_def: "default".into(),
            jet_def: "default".into(),
            met_def: "default".into(),
            or_def: "none".into(),
            scheduler_def: "basic".into(),
            do_systematics: true,
            write_xaod: false,
        }
    }
}

impl AnalysisAlg {
    pub fn from_options(opts: &JobOptions) -> Self {
        let mut alg = Self::default();
        if opts.no_systematics {
            alg.do_systematics = false;
        }
        if opts.optimized_scheduler {
            alg.scheduler_def = "optimized".into();
        }
        if opts.write_xaod {
            alg.write_xaod = true;
        }
        alg
    }

    /// Hook run when the algorithm is attached to a job.
    fn setup_job(&self, job: &mut Job) {
        job.use_xaod();
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Job {
    samples: SampleCollection,
    pub options: MetaObject,
    algs: Vec<AnalysisAlg>,
    // consumed by the worker through the manifest
    xaod_access: bool,
}

impl Job {
    pub fn new(samples: SampleCollection) -> Self {
        Self {
            samples,
            options: MetaObject::default(),
            algs: Vec::new(),
            xaod_access: false,
        }
    }

    /// Job with the standard I/O options and one algorithm built from `opts`.
    pub fn configure(samples: SampleCollection, opts: &JobOptions) -> Self {
        let mut job = Self::new(samples);
        job.options.set_double(OPT_XAOD_PERF_STATS, 1.0);
        job.options.set_double(OPT_CACHE_SIZE, DEFAULT_CACHE_SIZE);
        job.options
            .set_double(OPT_CACHE_LEARN_ENTRIES, DEFAULT_CACHE_LEARN_ENTRIES);
        if let Some(n) = opts.max_events.filter(|&n| n > 0) {
            job.options.set_integer(OPT_MAX_EVENTS, n as i64);
        }
        job.algs_add(AnalysisAlg::from_options(opts));
        job
    }

    pub fn samples(&self) -> &SampleCollection {
        &self.samples
    }

    pub fn algs(&self) -> &[AnalysisAlg] {
        &self.algs
    }

    pub fn algs_add(&mut self, alg: AnalysisAlg) {
        alg.setup_job(self);
        self.algs.push(alg);
    }

    pub fn use_xaod(&mut self) {
        self.xaod_access = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_sets_standard_options() {
        let job = Job::configure(SampleCollection::new(), &JobOptions::default());
        assert_eq!(job.options.get_double(OPT_XAOD_PERF_STATS), Some(1.0));
        assert_eq!(job.options.get_double(OPT_CACHE_SIZE), Some(104857600.0));
        assert_eq!(job.options.get_double(OPT_CACHE_LEARN_ENTRIES), Some(10.0));
        assert!(job.options.get(OPT_MAX_EVENTS).is_none());
        assert_eq!(job.algs(), [AnalysisAlg::default()]);
        assert!(job.xaod_access);
    }

    #[test]
    fn options_shape_the_algorithm() {
        let opts = JobOptions {
            max_events: Some(500),
            no_systematics: true,
            optimized_scheduler: true,
            write_xaod: true,
        };
        let job = Job::configure(SampleCollection::new(), &opts);
        assert_eq!(job.options.get_integer(OPT_MAX_EVENTS), Some(500));
        let alg = &job.algs()[0];
        assert!(!alg.do_systematics);
        assert_eq!(alg.scheduler_def, "optimized");
        assert!(alg.write_xaod);
        assert_eq!(alg.or_def, "none");
    }

    #[test]
    fn zero_max_events_means_unlimited() {
        let opts = JobOptions {
            max_events: Some(0),
            ..Default::default()
        };
        let job = Job::configure(SampleCollection::new(), &opts);
        assert!(job.options.get(OPT_MAX_EVENTS).is_none());
    }
}
