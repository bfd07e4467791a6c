//! Annotated image persistence and output directory cleanup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use image::RgbImage;
use crate::error::ScanError;

/// Prefix added to every uploaded filename.
pub const ANNOTATED_PREFIX: &str = "annotated_";

/// Message returned when the output directory was emptied.
pub const CLEAR_SUCCESS: &str = "Output folder cleared successfully";

/// Creates `path` and its parents if it does not exist yet.
pub fn ensure_dir(path: &Path) -> Result<(), ScanError> {
    if !path.is_dir() {
        fs::create_dir_all(path).map_err(|source| ScanError::CreateDir {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct OutputWriter {
    output_dir: PathBuf,
    mount_prefix: String,
}

impl OutputWriter {
    pub fn new(output_dir: impl Into<PathBuf>, mount_prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            mount_prefix: mount_prefix.into(),
        }
    }

    pub fn ensure_dir(&self) -> Result<(), ScanError> {
        ensure_dir(&self.output_dir)
    }

    /// `<output_dir>/annotated_<filename>`
    pub fn destination(&self, filename: &str) -> Result<PathBuf, ScanError> {
        Ok(self.output_dir.join(Self::annotated_name(filename)?))
    }

    /// `<mount_prefix>/annotated_<filename>`, the path clients fetch the image from.
    pub fn public_path(&self, filename: &str) -> Result<String, ScanError> {
        Ok(format!(
            "{}/{}",
            self.mount_prefix.trim_end_matches('/'),
            Self::annotated_name(filename)?
        ))
    }

    /// Saves `image` (format chosen by the filename extension), silently replacing an
    /// earlier file of the same name, and returns its public path.
    pub fn write(&self, image: &RgbImage, filename: &str) -> Result<String, ScanError> {
        self.ensure_dir()?;
        let path = self.destination(filename)?;
        image
            .save(&path)
            .map_err(|source| ScanError::Write { path, source })?;
        self.public_path(filename)
    }

    fn annotated_name(filename: &str) -> Result<String, ScanError> {
        let invalid = filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains(['/', '\\', '\0']);
        if invalid {
            return Err(ScanError::InvalidFilename(filename.to_string()));
        }
        Ok(format!("{ANNOTATED_PREFIX}{filename}"))
    }
}

/// Deletes every direct child of the output directory.
#[derive(Debug, Clone)]
pub struct OutputCleaner {
    output_dir: PathBuf,
}

impl OutputCleaner {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// A missing directory counts as cleared. Stops at the first entry that cannot be removed.
    pub fn clear(&self) -> Result<&'static str, ScanError> {
        self.clear_with(remove_entry)
    }

    /// [`clear`](Self::clear) with a caller-supplied remover, invoked once per
    /// entry in directory order with the entry path and whether it is a directory.
    pub fn clear_with<F>(&self, mut remove: F) -> Result<&'static str, ScanError>
    where
        F: FnMut(&Path, bool) -> io::Result<()>,
    {
        let entries = match fs::read_dir(&self.output_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(CLEAR_SUCCESS),
            Err(source) => {
                return Err(ScanError::Cleanup {
                    name: self.output_dir.display().to_string(),
                    source,
                })
            }
        };

        for entry in entries {
            let entry = entry.map_err(|source| ScanError::Cleanup {
                name: self.output_dir.display().to_string(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();

            entry
                .file_type()
                .and_then(|file_type| remove(&path, file_type.is_dir()))
                .map_err(|source| ScanError::Cleanup { name, source })?;
        }

        log::info!("Cleared output directory {}", self.output_dir.display());
        Ok(CLEAR_SUCCESS)
    }
}

// symlinks report as non-directories and are unlinked, never followed
fn remove_entry(path: &Path, is_dir: bool) -> io::Result<()> {
    if is_dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_path_uses_mount_prefix() {
        let writer = OutputWriter::new("output", "/output");
        assert_eq!(writer.public_path("litter1.jpg").unwrap(), "/output/annotated_litter1.jpg");
        assert_eq!(
            writer.destination("litter1.jpg").unwrap(),
            Path::new("output").join("annotated_litter1.jpg")
        );
    }

    #[test]
    fn path_like_filenames_are_rejected() {
        let writer = OutputWriter::new("output", "/output");
        for name in ["", "..", "../etc/passwd", "a/b.jpg", "a\\b.jpg"] {
            assert!(matches!(
                writer.public_path(name),
                Err(ScanError::InvalidFilename(_))
            ));
        }
    }

    #[test]
    fn write_reports_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let writer = OutputWriter::new(dir.path(), "/output");
        let img = RgbImage::new(4, 4);
        assert!(matches!(writer.write(&img, "notes.unknownext"), Err(ScanError::Write { .. })));
    }
}
