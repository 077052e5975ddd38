use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

use crate::domain::SampleCollection;
use crate::error::{QaError, Result};

pub const COLLECTION_FILE: &str = "samples.cbor";
pub const FORMAT_VERSION: u16 = 1;

#[derive(Serialize, Deserialize)]
struct Saved {
    version: u16,
    collection: SampleCollection,
}

/// Write `sh` into directory `dir` (created if needed).
pub fn save(sh: &SampleCollection, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let target = dir.join(COLLECTION_FILE);

    // write next to the target and rename so readers never see a partial file
    let tmp = NamedTempFile::new_in(dir)?;
    {
        let mut w = BufWriter::new(tmp.as_file());
        let saved = Saved {
            version: FORMAT_VERSION,
            collection: sh.clone(),
        };
        ciborium::ser::into_writer(&saved, &mut w)
            .map_err(|e| QaError::Format(format!("collection encode: {e}")))?;
        w.flush()?;
    }
    tmp.persist(&target).map_err(|e| e.error)?;
    info!(target: "qahpc", "Saved {} samples to {}", sh.len(), dir.display());
    Ok(target)
}

/// Load a collection saved with [`save`]. Accepts the directory or the
/// `samples.cbor` file inside it.
pub fn load(path: &Path) -> Result<SampleCollection> {
    let file = if path.is_dir() {
        path.join(COLLECTION_FILE)
    } else {
        path.to_path_buf()
    };
    let r = BufReader::new(File::open(&file)?);
    let saved: Saved = ciborium::de::from_reader(r)
        .map_err(|e| QaError::Format(format!("collection decode: {e}")))?;
    if saved.version != FORMAT_VERSION {
        return Err(QaError::Format(format!(
            "{}: unsupported collection version {}",
            file.display(),
            saved.version
        )));
    }
    Ok(saved.collection)
}
