//! On-disk persistence of the canonical bitmap.

use std::path::{Path, PathBuf};

use raster::{Frame, RasterBuffer, CANVAS_HEIGHT, CANVAS_WIDTH};
use tracing::debug;

use crate::error::PersistError;

/// The single persisted bitmap file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted canvas. `Ok(None)` when no file exists yet.
    pub fn load(&self, limits: &bitmap::Limits) -> Result<Option<RasterBuffer>, PersistError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(PersistError::io(&self.path, err)),
        };
        let buffer = bitmap::decode_bitmap(&bytes, limits)?;
        if buffer.width() != CANVAS_WIDTH || buffer.height() != CANVAS_HEIGHT {
            return Err(PersistError::DimensionMismatch {
                width: buffer.width(),
                height: buffer.height(),
                expected_width: CANVAS_WIDTH,
                expected_height: CANVAS_HEIGHT,
            });
        }
        Ok(Some(buffer))
    }

    /// Encodes and writes a frame on a blocking thread.
    ///
    /// The file is written next to its final path and renamed into place, so
    /// a reader never sees a partial bitmap.
    pub async fn save(&self, frame: Frame) -> Result<usize, PersistError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_bitmap(&path, &frame))
            .await
            .map_err(|err| PersistError::Join(err.to_string()))?
    }
}

fn write_bitmap(path: &Path, frame: &Frame) -> Result<usize, PersistError> {
    let bytes = bitmap::encode_bitmap(frame);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| PersistError::io(parent, err))?;
    }
    let tmp = path.with_extension("bmp.tmp");
    std::fs::write(&tmp, &bytes).map_err(|err| PersistError::io(&tmp, err))?;
    std::fs::rename(&tmp, path).map_err(|err| PersistError::io(path, err))?;
    debug!(path = %path.display(), bytes = bytes.len(), "bitmap written");
    Ok(bytes.len())
}
