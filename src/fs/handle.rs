//! fs::handle
//!
//! The capability shared by every open file system object.

use std::io::{self, Read};

use super::directory::{Directory, Listing};
use super::error::FsError;
use super::file::File;
use super::info::FileInfo;

/// Something opened through [`GitFs::open`](super::GitFs::open): it can be
/// read from, described and closed.
pub trait Handle: Read {
    /// Metadata of the open object. Never fails.
    fn stat(&self) -> &FileInfo;

    /// Release the object. Idempotent for every handle in this crate.
    fn close(&mut self) -> io::Result<()>;
}

impl Handle for File {
    fn stat(&self) -> &FileInfo {
        File::stat(self)
    }

    fn close(&mut self) -> io::Result<()> {
        File::close(self)
    }
}

impl Handle for Directory {
    fn stat(&self) -> &FileInfo {
        Directory::stat(self)
    }

    fn close(&mut self) -> io::Result<()> {
        Directory::close(self)
    }
}

/// An open file or directory.
#[derive(Debug)]
pub enum Node {
    File(File),
    Directory(Directory),
}

impl Node {
    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    /// The file, if this is one.
    pub fn into_file(self) -> Option<File> {
        match self {
            Node::File(file) => Some(file),
            Node::Directory(_) => None,
        }
    }

    /// The directory, if this is one.
    pub fn into_directory(self) -> Option<Directory> {
        match self {
            Node::Directory(dir) => Some(dir),
            Node::File(_) => None,
        }
    }

    /// Mutable access to the directory, if this is one.
    pub fn as_directory_mut(&mut self) -> Option<&mut Directory> {
        match self {
            Node::Directory(dir) => Some(dir),
            Node::File(_) => None,
        }
    }

    /// List the next entries of a directory.
    ///
    /// Returns `None` for files, which cannot be listed.
    pub fn read_dir(&mut self, n: isize) -> Option<Result<Listing, FsError>> {
        self.as_directory_mut().map(|dir| dir.read_dir(n))
    }
}

impl Read for Node {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Node::File(file) => file.read(buf),
            Node::Directory(dir) => dir.read(buf),
        }
    }
}

impl Handle for Node {
    fn stat(&self) -> &FileInfo {
        match self {
            Node::File(file) => file.stat(),
            Node::Directory(dir) => dir.stat(),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match self {
            Node::File(file) => file.close(),
            Node::Directory(dir) => dir.close(),
        }
    }
}
