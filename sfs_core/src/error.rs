//! Error kinds returned at the `sfs_core` operation boundary.

use std::io;

/// POSIX-flavored error returned by every [`crate::ops::Sfs`] method.
#[derive(Debug, thiserror::Error)]
pub enum SfsError {
    /// Path or an intermediate path component does not exist.
    #[error("no such file or directory")]
    NoEnt,
    /// An intermediate path component is not a directory, or a directory
    /// operation was invoked on a non-directory.
    #[error("not a directory")]
    NotDir,
    /// A file operation was invoked on a directory.
    #[error("is a directory")]
    IsDir,
    /// `rmdir` of a non-empty directory.
    #[error("directory not empty")]
    NotEmpty,
    /// `create`/`mkdir`/`rename` of a name that already exists in the parent.
    #[error("file exists")]
    EExist,
    /// New name exceeds `FILENAME_MAX - 1` bytes.
    #[error("file name too long")]
    NameTooLong,
    /// No free directory slot in the parent, or no free data block.
    #[error("no space left on device")]
    NoSpc,
    /// Malformed path (missing leading `/`, or an empty component where one
    /// is required, e.g. renaming the root).
    #[error("invalid argument")]
    Inval,
    /// Device I/O failure.
    #[error("device I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SfsError {
    /// Maps this error to the libc errno the FUSE glue should reply with.
    pub fn to_errno(&self) -> i32 {
        match self {
            SfsError::NoEnt => libc::ENOENT,
            SfsError::NotDir => libc::ENOTDIR,
            SfsError::IsDir => libc::EISDIR,
            SfsError::NotEmpty => libc::ENOTEMPTY,
            SfsError::EExist => libc::EEXIST,
            SfsError::NameTooLong => libc::ENAMETOOLONG,
            SfsError::NoSpc => libc::ENOSPC,
            SfsError::Inval => libc::EINVAL,
            SfsError::Io(_) => libc::EIO,
        }
    }
}

pub type Result<T> = std::result::Result<T, SfsError>;
