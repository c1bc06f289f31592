//! fs::file
//!
//! Open regular and executable files.

use std::fmt;
use std::io::{self, Read};

use tracing::warn;

use super::error::FsError;
use super::info::FileInfo;
use crate::git::{Blob, BlobStream};

/// An open git file. Directories are served by
/// [`Directory`](super::Directory) instead.
///
/// Closing is idempotent. Reading after close fails with
/// [`FsError::ClosedFile`].
pub struct File {
    info: FileInfo,
    stream: Option<Box<dyn BlobStream>>,
}

impl File {
    /// Open a file over `blob`, described by `info`.
    ///
    /// Returns `None` if the blob cannot produce a byte stream.
    pub fn new(info: FileInfo, blob: &Blob) -> Option<Self> {
        match blob.reader() {
            Ok(stream) => Some(Self {
                info,
                stream: Some(stream),
            }),
            Err(e) => {
                warn!(blob = %blob.id(), error = %e, "cannot open blob stream");
                None
            }
        }
    }

    /// Metadata of this file.
    pub fn stat(&self) -> &FileInfo {
        &self.info
    }

    /// Release the underlying stream.
    pub fn close(&mut self) -> io::Result<()> {
        match self.stream.take() {
            Some(mut stream) => stream.close(),
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }
}

impl Read for File {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stream.as_mut() {
            Some(stream) => stream.read(buf),
            None => Err(FsError::ClosedFile.into()),
        }
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("info", &self.info)
            .field("closed", &self.is_closed())
            .finish()
    }
}
