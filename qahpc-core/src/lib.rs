#![forbid(unsafe_code)]

pub mod error;

pub mod util {
    pub mod expand;
    pub mod glob;
}

pub mod domain;
pub mod events;
pub mod pool;

pub mod scan;
pub mod split;
pub mod task;

pub mod store;

pub mod job;
pub mod driver;

pub mod samples;

// Re-exports: stable API surface
pub use domain::{MetaObject, MetaValue, Sample, SampleCollection, SampleFile};
pub use driver::{Driver, DriverKind, DriverOptions, FrameworkEnv, driver_from_name};
pub use events::{CommandEventCounter, EventCounter};
pub use job::{AnalysisAlg, Job, JobOptions};
pub use samples::{LoadOptions, load_samples, print_samples};
pub use scan::{ScanOptions, scan_samples};
pub use split::{split_sample, split_samples, split_samples_parallel};
pub use task::{TaskSpec, select_by_task};
