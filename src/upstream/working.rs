//! Request-scoped working image backed by a temporary file.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use bytes::Bytes;
use tempfile::NamedTempFile;

const TEMP_PREFIX: &str = "thumb_proxy";

/// Working buffer holding the image between fetch and response.
///
/// Created empty, filled once by the fetch stage, optionally rewritten in
/// place by the transform stage and read once by the response stage. The
/// backing file is removed when the value is dropped.
#[derive(Debug)]
pub struct WorkingImage {
    file: NamedTempFile,
}

impl WorkingImage {
    /// Create an empty working image in the system temp directory.
    pub fn new() -> io::Result<Self> {
        let file = tempfile::Builder::new().prefix(TEMP_PREFIX).tempfile()?;
        Ok(Self { file })
    }

    /// Create an empty working image inside `dir`.
    pub fn new_in(dir: impl AsRef<Path>) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(dir)?;
        Ok(Self { file })
    }

    /// Path of the backing file, used by the image processor.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Replace the contents with `data` and flush.
    pub fn fill(&mut self, data: &[u8]) -> io::Result<()> {
        let file = self.file.as_file_mut();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(data)?;
        file.flush()
    }

    /// Current size in bytes. Reads the file metadata so in-place rewrites by
    /// the processor are reflected.
    pub fn len(&self) -> io::Result<u64> {
        Ok(std::fs::metadata(self.path())?.len())
    }

    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Read the whole buffer from the start.
    pub fn read_all(&self) -> io::Result<Bytes> {
        let mut file = File::open(self.path())?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(Bytes::from(data))
    }
}
