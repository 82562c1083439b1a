//! File-backed byte source.
//!
//! Reads are positional: each one names its own offset, so concurrent chunk
//! reads share the handle without a cursor or a lock, and nothing beyond the
//! requested range is ever held in memory.

use super::ByteSource;
use crate::model::error::InputError;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Byte source over a file on disk.
///
/// The size is captured when the file is opened.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    size: u64,
    file: File,
}

impl FileSource {
    /// Open `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist,
    /// `InputError::NotAFile` for directories and other non-files, and
    /// `InputError::Io` for other I/O errors.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(InputError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(InputError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            file,
        })
    }

    /// Path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn size(&self) -> u64 {
        self.size
    }

    fn read_range(&self, start: u64, end: u64) -> io::Result<Vec<u8>> {
        let start = start.min(self.size);
        let end = end.clamp(start, self.size);
        let len = usize::try_from(end - start).map_err(io::Error::other)?;

        let mut buf = vec![0u8; len];
        let filled = fill_at(&self.file, &mut buf, start)?;
        // A file truncated after open yields a short read rather than an error.
        buf.truncate(filled);
        Ok(buf)
    }
}

/// Read into `buf` from `offset` until it is full or the file ends.
fn fill_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match read_at(file, &mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    #[test]
    fn open_missing_file_is_file_not_found() {
        let result = FileSource::open("/nonexistent/hexview/input.bin");
        assert!(matches!(result, Err(InputError::FileNotFound { .. })));
    }

    #[test]
    fn open_directory_is_not_a_file() {
        let result = FileSource::open(std::env::temp_dir());
        assert!(matches!(result, Err(InputError::NotAFile { .. })));
    }

    #[test]
    fn size_matches_file_length() {
        let path = temp_file("hexview_file_source_size.bin", &[0u8; 1234]);
        let source = FileSource::open(&path).unwrap();
        assert_eq!(source.size(), 1234);
        assert_eq!(source.path(), path.as_path());
        fs::remove_file(path).ok();
    }

    #[test]
    fn read_range_returns_requested_bytes() {
        let contents: Vec<u8> = (0..=255).collect();
        let path = temp_file("hexview_file_source_read.bin", &contents);
        let source = FileSource::open(&path).unwrap();

        assert_eq!(source.read_range(10, 14).unwrap(), vec![10, 11, 12, 13]);
        // Reads are independent of each other's position.
        assert_eq!(source.read_range(0, 2).unwrap(), vec![0, 1]);

        fs::remove_file(path).ok();
    }

    #[test]
    fn concurrent_reads_do_not_share_a_cursor() {
        let contents: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
        let path = temp_file("hexview_file_source_concurrent.bin", &contents);
        let source = FileSource::open(&path).unwrap();

        std::thread::scope(|scope| {
            for (start, end) in [(0u64, 40_000u64), (1_000, 50_000), (30_000, 65_536)] {
                let source = &source;
                let expected = &contents[start as usize..end as usize];
                scope.spawn(move || {
                    for _ in 0..20 {
                        assert_eq!(source.read_range(start, end).unwrap(), expected);
                    }
                });
            }
        });

        fs::remove_file(path).ok();
    }

    #[test]
    fn read_range_clamps_to_size() {
        let path = temp_file("hexview_file_source_clamp.bin", &[7u8; 8]);
        let source = FileSource::open(&path).unwrap();

        assert_eq!(source.read_range(6, 100).unwrap(), vec![7, 7]);
        assert!(source.read_range(50, 100).unwrap().is_empty());

        fs::remove_file(path).ok();
    }
}
