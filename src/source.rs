//! Where conversion input comes from.

use std::path::{Path, PathBuf};

use crate::error::AudioLiftError;

/// The encoded media file a conversion reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// File contents already in memory.
    Bytes(Vec<u8>),
    /// A file on disk, read in full when the conversion starts.
    Path(PathBuf),
}

impl InputSource {
    /// Read a file from disk when the conversion runs.
    pub fn path<P: AsRef<Path>>(path: P) -> Self {
        InputSource::Path(path.as_ref().to_path_buf())
    }

    /// Load the whole input into memory.
    ///
    /// # Errors
    ///
    /// [`AudioLiftError::IoError`] if the file cannot be read.
    pub(crate) async fn read(self) -> Result<Vec<u8>, AudioLiftError> {
        match self {
            InputSource::Bytes(bytes) => Ok(bytes),
            InputSource::Path(path) => {
                log::debug!("Reading input file {:?}", path);
                Ok(tokio::fs::read(&path).await?)
            }
        }
    }
}

impl From<Vec<u8>> for InputSource {
    fn from(bytes: Vec<u8>) -> Self {
        InputSource::Bytes(bytes)
    }
}

impl From<&[u8]> for InputSource {
    fn from(bytes: &[u8]) -> Self {
        InputSource::Bytes(bytes.to_vec())
    }
}

impl From<PathBuf> for InputSource {
    fn from(path: PathBuf) -> Self {
        InputSource::Path(path)
    }
}

impl From<&Path> for InputSource {
    fn from(path: &Path) -> Self {
        InputSource::Path(path.to_path_buf())
    }
}
