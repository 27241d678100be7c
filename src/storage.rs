//! Frame file access for File mode
//!
//! File mode plays headerless RGB888 frames: `width * height` packed
//! `r, g, b` triples per frame, row-major, frames back to back. The
//! controller reaches storage only through [`FrameStore`] and
//! [`FrameFile`], so any filesystem (or none) can sit behind it.
//! With the `std` feature, [`FsStore`] reads from the host filesystem.

use core::fmt::Debug;

/// An open frame file
///
/// Dropping the handle closes the file.
pub trait FrameFile {
    /// Error type for file operations
    type Error: Debug;

    /// Total size in bytes
    fn size(&mut self) -> Result<u64, Self::Error>;

    /// Move the read position to `offset` bytes from the start
    fn seek_to(&mut self, offset: u64) -> Result<(), Self::Error>;

    /// Read up to `buf.len()` bytes, returning how many were read
    ///
    /// A short count means end of file.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Something frame files can be opened from
pub trait FrameStore {
    /// Handle type for open files
    type File: FrameFile;
    /// Error type for open failures
    type Error: Debug;

    /// Open a file for reading
    fn open(&mut self, path: &str) -> Result<Self::File, Self::Error>;
}

/// A store that never opens anything
///
/// Useful when File mode is not wired up.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStore;

/// File handle type of [`NoStore`]; it can never be constructed
#[derive(Debug)]
pub enum NoFile {}

impl FrameFile for NoFile {
    type Error = core::convert::Infallible;

    fn size(&mut self) -> Result<u64, Self::Error> {
        match *self {}
    }

    fn seek_to(&mut self, _offset: u64) -> Result<(), Self::Error> {
        match *self {}
    }

    fn read_into(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
        match *self {}
    }
}

impl FrameStore for NoStore {
    type File = NoFile;
    type Error = &'static str;

    fn open(&mut self, _path: &str) -> Result<Self::File, Self::Error> {
        Err("no frame store configured")
    }
}

#[cfg(feature = "std")]
pub use fs::FsStore;

#[cfg(feature = "std")]
mod fs {
    use super::{FrameFile, FrameStore};
    use std::fs::File;
    use std::io::{self, Read, Seek, SeekFrom};
    use std::path::PathBuf;

    /// Frame store backed by the host filesystem
    ///
    /// Paths are resolved relative to `root`.
    #[derive(Clone, Debug)]
    pub struct FsStore {
        root: PathBuf,
    }

    impl FsStore {
        /// Create a store rooted at a directory (e.g. a mounted SPIFFS partition)
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self { root: root.into() }
        }
    }

    impl FrameFile for File {
        type Error = io::Error;

        fn size(&mut self) -> Result<u64, Self::Error> {
            Ok(self.metadata()?.len())
        }

        fn seek_to(&mut self, offset: u64) -> Result<(), Self::Error> {
            self.seek(SeekFrom::Start(offset)).map(|_| ())
        }

        fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let mut filled = 0;
            while filled < buf.len() {
                match self.read(&mut buf[filled..]) {
                    Ok(0) => break,
                    Ok(n) => filled += n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(e),
                }
            }
            Ok(filled)
        }
    }

    impl FrameStore for FsStore {
        type File = File;
        type Error = io::Error;

        fn open(&mut self, path: &str) -> Result<Self::File, Self::Error> {
            File::open(self.root.join(path.trim_start_matches('/')))
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_store_never_opens() {
        assert!(NoStore.open("anything").is_err());
    }
}
