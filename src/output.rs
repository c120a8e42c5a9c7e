//! # Output Artifacts
//!
//! Encodes the preview bitmap and writes both artifacts to disk.
//!
//! ## Preview Format
//!
//! Uncompressed 8-bit grayscale BMP at the scaled resolution. Only the
//! values 0 (black, geometry) and 255 (white) occur.
//!
//! ## Atomicity
//!
//! [`write_artifacts`] writes both artifacts to temporary files next to
//! their destinations and renames them into place only after both writes
//! succeeded. A failed conversion leaves existing files untouched and no
//! partial files behind.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::ImageFormat;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Error, Result};
use crate::render::bitmap::BinaryBitmap;

/// Default file stem used by the command-line tool.
pub const DEFAULT_STEM: &str = "image";

/// Destination paths for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub layout: PathBuf,
    pub preview: PathBuf,
}

impl OutputPaths {
    /// `<dir>/<stem>.gds` and `<dir>/<stem>.bmp`.
    ///
    /// ```
    /// use pixgds::output::OutputPaths;
    /// use std::path::Path;
    ///
    /// let paths = OutputPaths::in_dir("out", "logo");
    /// assert_eq!(paths.layout, Path::new("out/logo.gds"));
    /// assert_eq!(paths.preview, Path::new("out/logo.bmp"));
    /// ```
    pub fn in_dir(dir: impl AsRef<Path>, stem: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            layout: dir.join(format!("{}.gds", stem)),
            preview: dir.join(format!("{}.bmp", stem)),
        }
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self::in_dir(".", DEFAULT_STEM)
    }
}

/// Encode a bitmap as BMP bytes.
pub fn encode_preview(bitmap: &BinaryBitmap) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    bitmap
        .to_gray()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Bmp)
        .map_err(|e| Error::Encode(format!("Failed to encode BMP preview: {}", e)))?;
    Ok(bytes)
}

/// Bytes written to a temporary file in the destination directory.
struct Staged {
    file: NamedTempFile,
    target: PathBuf,
}

impl Staged {
    fn write(target: &Path, bytes: &[u8]) -> Result<Self> {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir).map_err(|e| Error::io(target, e))?;
        file.write_all(bytes)
            .and_then(|_| file.as_file().sync_all())
            .map_err(|e| Error::io(target, e))?;
        Ok(Self {
            file,
            target: target.to_path_buf(),
        })
    }

    /// Rename over the destination.
    fn commit(self) -> Result<()> {
        let Self { file, target } = self;
        file.persist(&target).map_err(|e| Error::io(&target, e.error))?;
        Ok(())
    }
}

/// Write a bitmap as a BMP file.
pub fn write_preview(bitmap: &BinaryBitmap, path: &Path) -> Result<()> {
    let bytes = encode_preview(bitmap)?;
    Staged::write(path, &bytes)?.commit()
}

/// Write already-encoded artifacts. On failure no destination is modified.
pub fn write_artifacts(layout: &[u8], preview: &[u8], paths: &OutputPaths) -> Result<()> {
    let staged_layout = Staged::write(&paths.layout, layout)?;
    let staged_preview = Staged::write(&paths.preview, preview)?;

    staged_layout.commit()?;
    debug!(path = %paths.layout.display(), bytes = layout.len(), "Wrote layout");
    staged_preview.commit()?;
    debug!(path = %paths.preview.display(), bytes = preview.len(), "Wrote preview");
    Ok(())
}
