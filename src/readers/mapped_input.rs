use crate::error::Result;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only view of an input file for the duration of one pass.
pub struct MappedInput {
    path: PathBuf,
    mmap: Option<Mmap>,
}

impl MappedInput {
    /// Map `path` read-only. Zero length files are not mapped and expose an
    /// empty buffer.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();

        let mmap = if len == 0 {
            None
        } else {
            // SAFETY: the mapping is read-only and the file is not expected to
            // be modified while a pass is running.
            let mmap = unsafe { Mmap::map(&file)? };
            #[cfg(unix)]
            mmap.advise(memmap2::Advice::Sequential)?;
            Some(mmap)
        };

        debug!("Mapped {} ({} bytes)", path.display(), len);

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    pub fn data(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the mapping. Borrowed slices cannot outlive this call.
    pub fn close(self) -> Result<()> {
        debug!("Unmapping {}", self.path.display());
        drop(self.mmap);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_map_file_contents() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        write!(temp_file, "Hamburg;12.0\nBulawayo;8.9\n")?;
        temp_file.flush()?;

        let input = MappedInput::open(temp_file.path())?;
        assert_eq!(input.data(), b"Hamburg;12.0\nBulawayo;8.9\n");
        assert_eq!(input.len(), 26);
        assert_eq!(input.path(), temp_file.path());
        input.close()
    }

    #[test]
    fn test_empty_file_is_not_mapped() -> Result<()> {
        let temp_file = NamedTempFile::new()?;

        let input = MappedInput::open(temp_file.path())?;
        assert!(input.is_empty());
        assert_eq!(input.data(), b"");
        input.close()
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = MappedInput::open(Path::new("/definitely/not/here/measurements.txt"));
        assert!(matches!(result, Err(crate::error::ProcessingError::Io(_))));
    }
}
