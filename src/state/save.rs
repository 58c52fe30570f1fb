//! Batch save: resolve output paths, ask before overwriting, write each
//! thresholded image. Contains no UI; the overwrite question is an
//! injected callback so the shell decides how to ask.

use std::path::{Path, PathBuf};

use super::session::BatchSession;
use crate::imaging::ImagingError;

/// Outcome of a batch save. One file's failure never stops the rest, so
/// every entry lands in exactly one of these buckets.
#[derive(Default)]
pub struct SaveReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, ImagingError)>,
}

impl SaveReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Save every entry of `session` into `directory`, preserving filenames.
///
/// When the output path already exists, `overwrite_ask(filename, dirname)`
/// decides whether to replace it. Writing an entry means thresholding a
/// fresh copy of its canonical image at the entry's value and saving in
/// the format its extension implies.
pub fn save_all<F>(session: &BatchSession, directory: &Path, mut overwrite_ask: F) -> SaveReport
where
    F: FnMut(&str, &str) -> bool,
{
    let directory = std::path::absolute(directory).unwrap_or_else(|_| directory.to_path_buf());
    let dir_name = directory
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut report = SaveReport::default();
    for entry in session.entries() {
        let output_path = directory.join(&entry.filename);

        if output_path.exists() && !overwrite_ask(&entry.filename, &dir_name) {
            log::info!("skipped existing {:?}", output_path);
            report.skipped.push(output_path);
            continue;
        }

        match entry.thresholded().and_then(|image| image.save(&output_path)) {
            Ok(()) => {
                log::info!("wrote {:?}", output_path);
                report.written.push(output_path);
            }
            Err(err) => {
                log::warn!("failed to write {:?}: {err}", output_path);
                report.failed.push((output_path, err));
            }
        }
    }

    report
}
