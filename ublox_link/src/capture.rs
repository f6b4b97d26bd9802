//! Verbatim capture of the received byte stream for offline analysis.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Local;
use log::{debug, warn};

/// Appends every received chunk, unparsed, to `<dir>/YYYY_MM_DD_HHMM.log`.
///
/// Write failures are logged and otherwise ignored; capturing never
/// interrupts stream processing.
#[derive(Debug)]
pub struct RawCapture {
    file: File,
    path: PathBuf,
}

impl RawCapture {
    /// Create `dir` if needed and open a capture file named after the local time
    pub fn create(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(Local::now().format("%Y_%m_%d_%H%M.log").to_string());
        let file = File::options().create(true).append(true).open(&path)?;
        debug!("capturing raw stream to {}", path.display());
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_chunk(&mut self, chunk: &[u8]) {
        if let Err(err) = self.file.write_all(chunk) {
            warn!("raw capture to {} failed: {}", self.path.display(), err);
        }
    }

    /// Adapt into a [`CallbackHub`](crate::CallbackHub) raw hook
    pub fn into_hook(mut self) -> impl FnMut(&[u8]) + Send + 'static {
        move |chunk| self.write_chunk(chunk)
    }
}
