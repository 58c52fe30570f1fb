//! The batch session: every opened image, its threshold, and the
//! navigation cursor, kept consistent across open/navigate/edit/save.

use std::path::{Path, PathBuf};

use super::save::{self, SaveReport};
use crate::imaging::{preview, ImageHandle, ImagingError, Preview};

pub const MIN_THRESHOLD: u8 = 25;
pub const MAX_THRESHOLD: u8 = 75;
pub const DEFAULT_THRESHOLD: u8 = 55;

/// One opened image: display name, source path, the canonical decoded
/// handle, and its independently tracked threshold value.
///
/// The canonical handle is never thresholded in place; previews and saves
/// work on a fresh `reopen` so the original pixels stay available.
pub struct BatchEntry {
    pub filename: String,
    pub source_path: PathBuf,
    pub image: ImageHandle,
    pub threshold: u8,
}

impl BatchEntry {
    /// Render the un-thresholded image for display.
    pub fn input_preview(&self, size: (u32, u32)) -> Result<Preview, ImagingError> {
        preview::render(&self.image.reopen()?, size)
    }

    /// Render the image thresholded at this entry's value for display.
    pub fn output_preview(&self, size: (u32, u32)) -> Result<Preview, ImagingError> {
        preview::render(&self.thresholded()?, size)
    }

    /// A fresh copy of the canonical image with this entry's threshold
    /// applied. Used by previews and by the save path.
    pub fn thresholded(&self) -> Result<ImageHandle, ImagingError> {
        let mut copy = self.image.reopen()?;
        copy.threshold(f32::from(self.threshold) / 100.0);
        Ok(copy)
    }
}

/// Ordered collection of opened images plus the current navigation index.
///
/// Starts empty; `open_files` replaces the whole batch. The index is valid
/// whenever the batch is non-empty.
#[derive(Default)]
pub struct BatchSession {
    entries: Vec<BatchEntry>,
    current: usize,
    default_output_dir: Option<PathBuf>,
}

impl BatchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn current_entry(&self) -> Option<&BatchEntry> {
        self.entries.get(self.current)
    }

    /// Directory of the first file of the current batch, used to seed the
    /// save-folder picker.
    pub fn default_output_dir(&self) -> Option<&Path> {
        self.default_output_dir.as_deref()
    }

    /// Replace the batch with the given files, in input order.
    ///
    /// Every path is decoded before any session state changes, so a decode
    /// failure aborts the whole open and leaves the previous batch active.
    /// On success the cursor resets to the first entry and every threshold
    /// starts at the default.
    pub fn open_files(&mut self, paths: &[PathBuf]) -> Result<(), ImagingError> {
        debug_assert!(!paths.is_empty(), "open_files requires at least one path");

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let image = ImageHandle::open(path)?;
            entries.push(BatchEntry {
                filename,
                source_path: path.clone(),
                image,
                threshold: DEFAULT_THRESHOLD,
            });
        }

        log::info!("opened batch of {} image(s)", entries.len());
        self.entries = entries;
        self.current = 0;
        self.default_output_dir = paths[0].parent().map(Path::to_path_buf);
        Ok(())
    }

    /// Update the current entry's threshold. Values outside
    /// `[MIN_THRESHOLD, MAX_THRESHOLD]` are a caller bug; the UI clamps
    /// before calling.
    pub fn set_threshold(&mut self, value: u8) {
        debug_assert!(
            (MIN_THRESHOLD..=MAX_THRESHOLD).contains(&value),
            "threshold {value} out of range"
        );
        if let Some(entry) = self.entries.get_mut(self.current) {
            entry.threshold = value;
        }
    }

    /// Advance to the next entry. Returns whether the cursor moved.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.entries.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Step back to the previous entry. Returns whether the cursor moved.
    pub fn prev(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Save every entry into `directory`, consulting `overwrite_ask`
    /// before replacing existing files. See [`save::save_all`].
    pub fn save_all<F>(&self, directory: &Path, overwrite_ask: F) -> SaveReport
    where
        F: FnMut(&str, &str) -> bool,
    {
        save::save_all(self, directory, overwrite_ask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::write_gray_image;

    fn open_batch(names: &[&str]) -> (tempfile::TempDir, BatchSession) {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = names
            .iter()
            .map(|name| write_gray_image(dir.path(), name, &[10, 200], 2, 1))
            .collect();

        let mut session = BatchSession::new();
        session.open_files(&paths).unwrap();
        (dir, session)
    }

    #[test]
    fn open_files_populates_entries_in_order() {
        let (dir, session) = open_batch(&["a.png", "b.png", "c.png"]);

        assert_eq!(session.len(), 3);
        assert_eq!(session.current_index(), 0);
        let filenames: Vec<&str> = session
            .entries()
            .iter()
            .map(|entry| entry.filename.as_str())
            .collect();
        assert_eq!(filenames, ["a.png", "b.png", "c.png"]);
        assert!(session
            .entries()
            .iter()
            .all(|entry| entry.threshold == DEFAULT_THRESHOLD));
        assert_eq!(session.default_output_dir(), Some(dir.path()));
    }

    #[test]
    fn open_files_replaces_the_previous_batch() {
        let (dir, mut session) = open_batch(&["a.png", "b.png"]);
        assert!(session.next());

        let paths = [
            write_gray_image(dir.path(), "c.png", &[10, 200], 2, 1),
            write_gray_image(dir.path(), "d.png", &[10, 200], 2, 1),
        ];
        session.open_files(&paths).unwrap();

        assert_eq!(session.len(), 2);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.entries()[0].filename, "c.png");
    }

    #[test]
    fn decode_failure_aborts_the_whole_open() {
        let (dir, mut session) = open_batch(&["a.png"]);
        session.set_threshold(40);

        let paths = [
            write_gray_image(dir.path(), "b.png", &[10, 200], 2, 1),
            dir.path().join("missing.png"),
        ];
        let err = session.open_files(&paths).unwrap_err();
        assert!(matches!(err, ImagingError::Decode { .. }));

        // The previous batch stays active and untouched.
        assert_eq!(session.len(), 1);
        assert_eq!(session.entries()[0].filename, "a.png");
        assert_eq!(session.entries()[0].threshold, 40);
    }

    #[test]
    fn navigation_stops_at_both_boundaries() {
        let (_dir, mut session) = open_batch(&["a.png", "b.png"]);

        assert!(!session.prev());
        assert_eq!(session.current_index(), 0);

        assert!(session.next());
        assert_eq!(session.current_index(), 1);

        assert!(!session.next());
        assert_eq!(session.current_index(), 1);

        assert!(session.prev());
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn set_threshold_touches_only_the_current_entry() {
        let (_dir, mut session) = open_batch(&["a.png", "b.png", "c.png"]);

        session.next();
        session.set_threshold(30);

        let thresholds: Vec<u8> = session
            .entries()
            .iter()
            .map(|entry| entry.threshold)
            .collect();
        assert_eq!(thresholds, [DEFAULT_THRESHOLD, 30, DEFAULT_THRESHOLD]);
    }

    #[test]
    fn entry_previews_render_both_sides() {
        let (_dir, session) = open_batch(&["a.png"]);
        let entry = session.current_entry().unwrap();

        let input = entry.input_preview((32, 32)).unwrap();
        let output = entry.output_preview((32, 32)).unwrap();
        assert_eq!(&input.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(&output.bytes[..2], &[0xFF, 0xD8]);
        // Same source, but the thresholded side encodes differently.
        assert_ne!(input.bytes, output.bytes);
    }

    #[test]
    fn thresholded_copy_leaves_the_canonical_image_alone() {
        let (_dir, session) = open_batch(&["a.png"]);
        let entry = session.current_entry().unwrap();

        let copy = entry.thresholded().unwrap();
        let copy_gray = copy.buffer().to_luma8();
        assert!(copy_gray.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));

        let canonical = entry.image.buffer().to_luma8();
        assert!(canonical.pixels().any(|p| p.0[0] != 0 && p.0[0] != 255));
    }
}
