use crate::error::{PipelineError, Result};
use flate2::read::GzDecoder;
use log::warn;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read, Write};
use serde::Serialize;
use std::path::Path;
use tempfile::NamedTempFile;

/// Opens a text input, decompressing transparently when it ends in `.gz`.
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| PipelineError::from_open(path, e))?;
    let is_gz = path.extension().is_some_and(|ext| ext == "gz");
    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::with_capacity(1 << 20, GzDecoder::new(file)))
    } else {
        Box::new(BufReader::with_capacity(1 << 20, file))
    };
    Ok(reader)
}

pub fn read_text(path: &Path) -> Result<String> {
    let mut text = String::new();
    open_text(path)?
        .read_to_string(&mut text)
        .map_err(|e| PipelineError::io(path, e))?;
    Ok(text)
}

/// Pretty JSON with non-ASCII text left unescaped.
pub fn pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes `contents` into a temp file next to `path`, not yet visible.
fn stage(path: &Path, contents: &[u8]) -> Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| PipelineError::io(parent, e))?;
    tmp.write_all(contents)
        .and_then(|_| tmp.flush())
        .map_err(|e| PipelineError::io(path, e))?;
    Ok(tmp)
}

/// Writes `contents` to `path` through a temp file in the same directory,
/// so readers never observe a half-written artifact.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    stage(path, contents)?
        .persist(path)
        .map_err(|e| PipelineError::io(path, e.error))?;
    Ok(())
}

/// Writes a set of artifacts that belong together: either all of them end up
/// at their paths or none does.
///
/// Every temp file is written before the first rename. If a rename fails, the
/// artifacts already moved into place are removed again and the remaining
/// temp files are dropped.
pub fn write_atomic_all(files: &[(&Path, &[u8])]) -> Result<()> {
    let mut staged = Vec::with_capacity(files.len());
    for &(path, contents) in files {
        staged.push((path, stage(path, contents)?));
    }

    let mut persisted: Vec<&Path> = Vec::with_capacity(staged.len());
    for (path, tmp) in staged {
        if let Err(e) = tmp.persist(path) {
            for done in &persisted {
                if let Err(cleanup) = fs::remove_file(done) {
                    warn!("could not remove {}: {cleanup}", done.display());
                }
            }
            return Err(PipelineError::io(path, e.error));
        }
        persisted.push(path);
    }
    Ok(())
}
