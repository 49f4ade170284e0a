//! The `fuser::Filesystem` implementation: translates kernel VFS calls
//! (addressed by inode number) into calls on `sfs_core::ops::Sfs`
//! (addressed by path), and back.

use std::ffi::OsStr;
use std::time::{Duration, SystemTime};

use fuser::{
    FileAttr, FileType, Filesystem, ReplyAttr, ReplyCreate, ReplyData, ReplyDirectory,
    ReplyEmpty, ReplyEntry, ReplyOpen, ReplyStatfs, ReplyWrite, Request, TimeOrNow,
};
use log::debug;
use sfs_core::device::Device;
use sfs_core::layout::{BLOCKTBL_NENTRIES, BLOCK_SIZE, FILENAME_MAX};
use sfs_core::ops::{EntryKind, Sfs, Stat};

use crate::inode::{child_path, InodeTable};

/// Attributes are cheap to recompute (every call re-walks the on-disk
/// structures) so the kernel is told not to cache them for long; there is
/// no invalidation channel back from the core if the image changes under
/// us, so a short TTL bounds the staleness window instead of promising
/// perfect coherence.
const TTL: Duration = Duration::from_secs(1);

pub struct SfsFuse<D: Device> {
    sfs: Sfs<D>,
    inodes: InodeTable,
}

impl<D: Device> SfsFuse<D> {
    pub fn new(sfs: Sfs<D>) -> Self {
        SfsFuse { sfs, inodes: InodeTable::new() }
    }

    fn path_of(&self, ino: u64) -> Result<String, i32> {
        self.inodes.path(ino).map(str::to_owned).ok_or(libc::ENOENT)
    }

    fn attr_of(&mut self, ino: u64, path: &str, req: &Request<'_>) -> Result<FileAttr, i32> {
        let stat = self.sfs.getattr(path).map_err(|e| e.to_errno())?;
        Ok(to_file_attr(ino, stat, req))
    }
}

fn to_file_attr(ino: u64, stat: Stat, req: &Request<'_>) -> FileAttr {
    let now = SystemTime::now();
    let kind = match stat.kind {
        EntryKind::Dir => FileType::Directory,
        EntryKind::File => FileType::RegularFile,
    };
    FileAttr {
        ino,
        size: stat.size,
        blocks: stat.size.div_ceil(BLOCK_SIZE as u64),
        atime: now,
        mtime: now,
        ctime: now,
        crtime: now,
        kind,
        perm: stat.perm,
        nlink: stat.nlink,
        uid: req.uid(),
        gid: req.gid(),
        rdev: 0,
        blksize: BLOCK_SIZE as u32,
        flags: 0,
    }
}

/// Turns an `OsStr` FUSE name into the UTF-8 `str` the core expects;
/// SFS filenames are always printable UTF-8 on disk, so anything else is
/// rejected up front rather than silently mangled.
fn name_str(name: &OsStr) -> Result<&str, i32> {
    name.to_str().ok_or(libc::EINVAL)
}

impl<D: Device> Filesystem for SfsFuse<D> {
    fn lookup(&mut self, req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let name = match name_str(name) {
            Ok(n) => n,
            Err(e) => return reply.error(e),
        };
        let parent_path = match self.path_of(parent) {
            Ok(p) => p,
            Err(e) => return reply.error(e),
        };
        let path = child_path(&parent_path, name);
        debug!("lookup {path}");

        match self.sfs.getattr(&path) {
            Ok(stat) => {
                let ino = self.inodes.lookup(&path);
                reply.entry(&TTL, &to_file_attr(ino, stat, req), 0);
            }
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn forget(&mut self, _req: &Request<'_>, ino: u64, nlookup: u64) {
        self.inodes.forget(ino, nlookup);
    }

    fn getattr(&mut self, req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        let path = match self.path_of(ino) {
            Ok(p) => p,
            Err(e) => return reply.error(e),
        };
        debug!("getattr {path}");
        match self.attr_of(ino, &path, req) {
            Ok(attr) => reply.attr(&TTL, &attr),
            Err(e) => reply.error(e),
        }
    }

    fn setattr(
        &mut self,
        req: &Request<'_>,
        ino: u64,
        _mode: Option<u32>,
        _uid: Option<u32>,
        _gid: Option<u32>,
        size: Option<u64>,
        _atime: Option<TimeOrNow>,
        _mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        let path = match self.path_of(ino) {
            Ok(p) => p,
            Err(e) => return reply.error(e),
        };
        debug!("setattr {path} size={size:?}");

        if let Some(size) = size {
            if let Err(e) = self.sfs.truncate(&path, size) {
                return reply.error(e.to_errno());
            }
        }

        match self.attr_of(ino, &path, req) {
            Ok(attr) => reply.attr(&TTL, &attr),
            Err(e) => reply.error(e),
        }
    }

    fn mkdir(
        &mut self,
        req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        let name = match name_str(name) {
            Ok(n) => n,
            Err(e) => return reply.error(e),
        };
        let parent_path = match self.path_of(parent) {
            Ok(p) => p,
            Err(e) => return reply.error(e),
        };
        let path = child_path(&parent_path, name);
        debug!("mkdir {path}");

        if let Err(e) = self.sfs.mkdir(&path) {
            return reply.error(e.to_errno());
        }
        let ino = self.inodes.lookup(&path);
        match self.attr_of(ino, &path, req) {
            Ok(attr) => reply.entry(&TTL, &attr, 0),
            Err(e) => reply.error(e),
        }
    }

    fn unlink(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let name = match name_str(name) {
            Ok(n) => n,
            Err(e) => return reply.error(e),
        };
        let parent_path = match self.path_of(parent) {
            Ok(p) => p,
            Err(e) => return reply.error(e),
        };
        let path = child_path(&parent_path, name);
        debug!("unlink {path}");

        match self.sfs.unlink(&path) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn rmdir(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let name = match name_str(name) {
            Ok(n) => n,
            Err(e) => return reply.error(e),
        };
        let parent_path = match self.path_of(parent) {
            Ok(p) => p,
            Err(e) => return reply.error(e),
        };
        let path = child_path(&parent_path, name);
        debug!("rmdir {path}");

        match self.sfs.rmdir(&path) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn rename(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        newparent: u64,
        newname: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        let name = match name_str(name) {
            Ok(n) => n,
            Err(e) => return reply.error(e),
        };
        let newname = match name_str(newname) {
            Ok(n) => n,
            Err(e) => return reply.error(e),
        };
        let parent_path = match self.path_of(parent) {
            Ok(p) => p,
            Err(e) => return reply.error(e),
        };
        let newparent_path = match self.path_of(newparent) {
            Ok(p) => p,
            Err(e) => return reply.error(e),
        };
        let path = child_path(&parent_path, name);
        let newpath = child_path(&newparent_path, newname);
        debug!("rename {path} -> {newpath}");

        match self.sfs.rename(&path, &newpath) {
            Ok(()) => {
                self.inodes.rename(&path, &newpath);
                reply.ok()
            }
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn open(&mut self, _req: &Request<'_>, _ino: u64, _flags: i32, reply: ReplyOpen) {
        // Every `Sfs` operation is stateless and re-resolves the path, so
        // there is no per-handle state to track; the file handle is unused.
        reply.opened(0, 0);
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let path = match self.path_of(ino) {
            Ok(p) => p,
            Err(e) => return reply.error(e),
        };
        debug!("read {path} size={size} offset={offset}");
        if offset < 0 {
            return reply.error(libc::EINVAL);
        }

        let mut buf = vec![0u8; size as usize];
        match self.sfs.read(&path, &mut buf, offset as u64) {
            Ok(n) => reply.data(&buf[..n]),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        let path = match self.path_of(ino) {
            Ok(p) => p,
            Err(e) => return reply.error(e),
        };
        debug!("write {path} size={} offset={offset}", data.len());
        if offset < 0 {
            return reply.error(libc::EINVAL);
        }

        match self.sfs.write(&path, data, offset as u64) {
            Ok(n) => reply.written(n as u32),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn release(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        reply.ok();
    }

    fn opendir(&mut self, _req: &Request<'_>, _ino: u64, _flags: i32, reply: ReplyOpen) {
        reply.opened(0, 0);
    }

    fn readdir(&mut self, _req: &Request<'_>, ino: u64, _fh: u64, offset: i64, mut reply: ReplyDirectory) {
        let path = match self.path_of(ino) {
            Ok(p) => p,
            Err(e) => return reply.error(e),
        };
        debug!("readdir {path} offset={offset}");

        let mut entries: Vec<(String, bool)> = Vec::new();
        let result = self.sfs.readdir(&path, |name, is_dir| {
            entries.push((String::from_utf8_lossy(name).into_owned(), is_dir));
        });
        if let Err(e) = result {
            return reply.error(e.to_errno());
        }

        for (i, (name, is_dir)) in entries.into_iter().enumerate().skip(offset as usize) {
            let kind = if is_dir { FileType::Directory } else { FileType::RegularFile };
            // `.`/`..` resolve to the requesting directory's own inode; the
            // kernel re-resolves real children through `lookup`, so the
            // inode handed here is only ever used as a cheap offset anchor.
            let child_ino = if name == "." || name == ".." {
                ino
            } else {
                self.inodes.lookup(&child_path(&path, &name))
            };
            if reply.add(child_ino, (i + 1) as i64, kind, &name) {
                break;
            }
        }
        reply.ok();
    }

    fn releasedir(&mut self, _req: &Request<'_>, _ino: u64, _fh: u64, _flags: i32, reply: ReplyEmpty) {
        reply.ok();
    }

    fn create(
        &mut self,
        req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
        _flags: i32,
        reply: ReplyCreate,
    ) {
        let name = match name_str(name) {
            Ok(n) => n,
            Err(e) => return reply.error(e),
        };
        let parent_path = match self.path_of(parent) {
            Ok(p) => p,
            Err(e) => return reply.error(e),
        };
        let path = child_path(&parent_path, name);
        debug!("create {path}");

        if let Err(e) = self.sfs.create(&path) {
            return reply.error(e.to_errno());
        }
        let ino = self.inodes.lookup(&path);
        match self.attr_of(ino, &path, req) {
            Ok(attr) => reply.created(&TTL, &attr, 0, 0, 0),
            Err(e) => reply.error(e),
        }
    }

    fn access(&mut self, _req: &Request<'_>, ino: u64, _mask: i32, reply: ReplyEmpty) {
        match self.path_of(ino) {
            Ok(_) => reply.ok(),
            Err(e) => reply.error(e),
        }
    }

    fn statfs(&mut self, _req: &Request<'_>, _ino: u64, reply: ReplyStatfs) {
        reply.statfs(
            BLOCKTBL_NENTRIES as u64,
            0,
            0,
            0,
            0,
            BLOCK_SIZE as u32,
            FILENAME_MAX as u32,
            BLOCK_SIZE as u32,
        );
    }
}
