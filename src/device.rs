//! The concrete, file-backed `sfs_core::device::Device` implementation.
//! `sfs_core` only knows about a byte-addressable `Device`; turning that
//! into positioned reads/writes on an open image file is this crate's job.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;
use std::path::Path;

use sfs_core::device::Device;

/// An SFS image opened from the host filesystem.
pub struct FileDevice {
    file: File,
}

impl FileDevice {
    /// Opens an existing image file for reading and writing.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(FileDevice { file })
    }
}

impl Device for FileDevice {
    fn read(&mut self, buf: &mut [u8], off: u64) -> io::Result<()> {
        self.file.read_exact_at(buf, off)
    }

    fn write(&mut self, buf: &[u8], off: u64) -> io::Result<()> {
        self.file.write_all_at(buf, off)
    }
}
