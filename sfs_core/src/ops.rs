//! The operation layer: implements every externally visible file-system
//! operation by composing the resolver, directory walker, block chain
//! table, and device.

use log::trace;

use crate::blocktable::{self, Slot};
use crate::device::Device;
use crate::dirwalk::{self, DirLocation, DirSlots};
use crate::error::{Result, SfsError};
use crate::layout::{self, DirEntryRecord, BLOCK_SIZE, SIZEMASK};
use crate::resolver::{self, ParentDir};

/// Disk-derived attributes of a file or directory. Process identity
/// (uid/gid) and timestamps are not disk facts and are attached by the
/// caller (the FUSE glue), not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub kind: EntryKind,
    pub size: u64,
    pub nlink: u32,
    pub perm: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// The SFS operation layer, generic over the device backing the image.
pub struct Sfs<D: Device> {
    dev: D,
}

impl<D: Device> Sfs<D> {
    pub fn new(dev: D) -> Self {
        Sfs { dev }
    }

    pub fn into_device(self) -> D {
        self.dev
    }

    /// Looks up the attributes of the entry at `path`.
    pub fn getattr(&mut self, path: &str) -> Result<Stat> {
        match resolver::resolve(&mut self.dev, path)? {
            None => Ok(Stat { kind: EntryKind::Dir, size: 0, nlink: 2, perm: 0o755 }),
            Some(r) if r.entry.is_dir() => {
                Ok(Stat { kind: EntryKind::Dir, size: 0, nlink: 2, perm: 0o755 })
            }
            Some(r) => Ok(Stat {
                kind: EntryKind::File,
                size: r.entry.file_size() as u64,
                nlink: 1,
                perm: 0o644,
            }),
        }
    }

    /// Lists a directory. Calls `emit` with every non-EMPTY filename
    /// (plus whether that entry is itself a directory) in on-disk order,
    /// after `.` and `..`.
    pub fn readdir(&mut self, path: &str, mut emit: impl FnMut(&[u8], bool)) -> Result<()> {
        let loc = match resolver::resolve(&mut self.dev, path)? {
            None => DirLocation::Root,
            Some(r) if r.entry.is_dir() => DirLocation::Chain { first_block: r.entry.first_block },
            Some(_) => return Err(SfsError::NotDir),
        };

        emit(b".", true);
        emit(b"..", true);

        let mut walker = DirSlots::new(&mut self.dev, loc);
        while let Some(addr) = walker.next_addr()? {
            let entry = dirwalk::read_entry(&mut self.dev, addr)?;
            if !entry.is_empty() {
                emit(entry.name(), entry.is_dir());
            }
        }
        Ok(())
    }

    /// Reads up to `buf.len()` bytes starting at `offset`.
    pub fn read(&mut self, path: &str, buf: &mut [u8], offset: u64) -> Result<usize> {
        let r = resolver::resolve(&mut self.dev, path)?.ok_or(SfsError::IsDir)?;
        if r.entry.is_dir() {
            return Err(SfsError::IsDir);
        }

        let file_size = r.entry.file_size() as u64;
        if offset >= file_size {
            return Ok(0);
        }
        let want = (buf.len() as u64).min(file_size - offset) as usize;
        if want == 0 {
            return Ok(0);
        }

        let mut blk = match blocktable::next_from_head(r.entry.first_block) {
            Slot::Link(b) => b,
            _ => return Ok(0),
        };
        let mut remaining_skip = offset;
        while remaining_skip >= BLOCK_SIZE as u64 {
            blk = match blocktable::next(&mut self.dev, blk)? {
                Slot::Link(b) => b,
                _ => return Ok(0),
            };
            remaining_skip -= BLOCK_SIZE as u64;
        }

        let mut total = 0usize;
        let mut offset_within_block = remaining_skip as usize;
        let mut cur = Slot::Link(blk);
        while total < want {
            let b = match cur {
                Slot::Link(b) => b,
                _ => break,
            };
            let n = (BLOCK_SIZE - offset_within_block).min(want - total);
            let addr = layout::block_offset(b) + offset_within_block as u64;
            self.dev.read(&mut buf[total..total + n], addr)?;
            total += n;
            offset_within_block = 0;
            if total < want {
                cur = blocktable::next(&mut self.dev, b)?;
            }
        }
        Ok(total)
    }

    /// Creates a new, empty regular file.
    pub fn create(&mut self, path: &str) -> Result<()> {
        trace!("create {path}");
        let (parent, name) = resolver::resolve_parent(&mut self.dev, path)?;
        let slot = self.find_slot_for_new_name(parent, name.as_bytes())?;
        dirwalk::write_entry(&mut self.dev, slot, &DirEntryRecord::new_file(name.as_bytes()))?;
        Ok(())
    }

    /// Creates a new, empty directory.
    pub fn mkdir(&mut self, path: &str) -> Result<()> {
        trace!("mkdir {path}");
        let (parent, name) = resolver::resolve_parent(&mut self.dev, path)?;
        let slot = self.find_slot_for_new_name(parent, name.as_bytes())?;

        let b1 = blocktable::find_free(&mut self.dev)?.ok_or(SfsError::NoSpc)?;
        blocktable::set_next(&mut self.dev, b1, Slot::End)?;
        let b2 = match blocktable::find_free(&mut self.dev)? {
            Some(b2) => b2,
            None => {
                blocktable::set_next(&mut self.dev, b1, Slot::Empty)?;
                return Err(SfsError::NoSpc);
            }
        };
        blocktable::set_next(&mut self.dev, b1, Slot::Link(b2))?;
        blocktable::set_next(&mut self.dev, b2, Slot::End)?;

        let zero_block = [0u8; BLOCK_SIZE];
        self.dev.write(&zero_block, layout::block_offset(b1))?;
        self.dev.write(&zero_block, layout::block_offset(b2))?;

        dirwalk::write_entry(&mut self.dev, slot, &DirEntryRecord::new_dir(name.as_bytes(), b1))?;
        Ok(())
    }

    /// Removes an empty directory.
    pub fn rmdir(&mut self, path: &str) -> Result<()> {
        trace!("rmdir {path}");
        let r = resolver::resolve(&mut self.dev, path)?.ok_or(SfsError::Inval)?;
        if !r.entry.is_dir() {
            return Err(SfsError::NotDir);
        }

        let mut walker =
            DirSlots::new(&mut self.dev, DirLocation::Chain { first_block: r.entry.first_block });
        while let Some(addr) = walker.next_addr()? {
            let entry = dirwalk::read_entry(&mut self.dev, addr)?;
            if !entry.is_empty() {
                return Err(SfsError::NotEmpty);
            }
        }

        blocktable::free_chain(&mut self.dev, r.entry.first_block)?;
        dirwalk::write_entry(&mut self.dev, r.addr, &DirEntryRecord::EMPTY)?;
        Ok(())
    }

    /// Removes a regular file.
    pub fn unlink(&mut self, path: &str) -> Result<()> {
        trace!("unlink {path}");
        let r = resolver::resolve(&mut self.dev, path)?.ok_or(SfsError::IsDir)?;
        if r.entry.is_dir() {
            return Err(SfsError::IsDir);
        }
        blocktable::free_chain(&mut self.dev, r.entry.first_block)?;
        dirwalk::write_entry(&mut self.dev, r.addr, &DirEntryRecord::EMPTY)?;
        Ok(())
    }

    /// Shrinks or grows the file to exactly `size` bytes.
    pub fn truncate(&mut self, path: &str, size: u64) -> Result<()> {
        trace!("truncate {path} size={size}");
        let r = resolver::resolve(&mut self.dev, path)?.ok_or(SfsError::IsDir)?;
        if r.entry.is_dir() {
            return Err(SfsError::IsDir);
        }
        let old_size = r.entry.file_size() as u64;

        let new_head = if size <= old_size {
            self.shrink_chain(r.entry.first_block, size)?
        } else {
            self.grow_chain(r.entry.first_block, old_size, size)?
        };

        let new_size = size as u32 & SIZEMASK;
        let entry = DirEntryRecord {
            filename: r.entry.filename,
            first_block: new_head,
            size: new_size,
        };
        dirwalk::write_entry(&mut self.dev, r.addr, &entry)?;
        Ok(())
    }

    /// Writes `buf` at `offset`, growing the file if `offset + buf.len()`
    /// exceeds its current size, overwriting overlapping bytes and
    /// zero-filling any gap from the old size up to `offset`.
    pub fn write(&mut self, path: &str, buf: &[u8], offset: u64) -> Result<usize> {
        trace!("write {path} size={} offset={offset}", buf.len());
        let r = resolver::resolve(&mut self.dev, path)?.ok_or(SfsError::IsDir)?;
        if r.entry.is_dir() {
            return Err(SfsError::IsDir);
        }
        let old_size = r.entry.file_size() as u64;
        let needed = offset + buf.len() as u64;

        let head = if needed > old_size {
            self.grow_chain(r.entry.first_block, old_size, needed)?
        } else {
            r.entry.first_block
        };

        // Walk to the starting block.
        let mut blk = match blocktable::next_from_head(head) {
            Slot::Link(b) => b,
            _ => {
                if buf.is_empty() {
                    let size = needed.max(old_size) as u32 & SIZEMASK;
                    let entry = DirEntryRecord { filename: r.entry.filename, first_block: head, size };
                    dirwalk::write_entry(&mut self.dev, r.addr, &entry)?;
                    return Ok(0);
                }
                return Err(SfsError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "write target has no allocated blocks",
                )));
            }
        };
        let mut skip = offset;
        while skip >= BLOCK_SIZE as u64 {
            blk = match blocktable::next(&mut self.dev, blk)? {
                Slot::Link(b) => b,
                _ => {
                    return Err(SfsError::Io(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "write offset beyond allocated chain",
                    )))
                }
            };
            skip -= BLOCK_SIZE as u64;
        }

        let mut written = 0usize;
        let mut offset_within_block = skip as usize;
        let mut cur = blk;
        while written < buf.len() {
            let n = (BLOCK_SIZE - offset_within_block).min(buf.len() - written);
            let addr = layout::block_offset(cur) + offset_within_block as u64;
            self.dev.write(&buf[written..written + n], addr)?;
            written += n;
            offset_within_block = 0;
            if written < buf.len() {
                cur = match blocktable::next(&mut self.dev, cur)? {
                    Slot::Link(b) => b,
                    _ => {
                        return Err(SfsError::Io(std::io::Error::new(
                            std::io::ErrorKind::UnexpectedEof,
                            "write ran past the allocated chain",
                        )))
                    }
                };
            }
        }

        let new_size = needed.max(old_size) as u32 & SIZEMASK;
        let entry = DirEntryRecord { filename: r.entry.filename, first_block: head, size: new_size };
        dirwalk::write_entry(&mut self.dev, r.addr, &entry)?;
        Ok(written)
    }

    /// Moves an entry to a new path, reusing its chain head.
    pub fn rename(&mut self, path: &str, newpath: &str) -> Result<()> {
        if path == newpath {
            resolver::resolve(&mut self.dev, path)?.ok_or(SfsError::NoEnt)?;
            return Ok(());
        }

        let old = resolver::resolve(&mut self.dev, path)?.ok_or(SfsError::NoEnt)?;
        let (new_parent, new_name) = resolver::resolve_parent(&mut self.dev, newpath)?;

        // Reject if the destination name already exists in the new parent.
        let mut walker = DirSlots::new(&mut self.dev, new_parent.location());
        while let Some(addr) = walker.next_addr()? {
            let entry = dirwalk::read_entry(&mut self.dev, addr)?;
            if !entry.is_empty() && entry.name() == new_name.as_bytes() {
                return Err(SfsError::EExist);
            }
        }

        let mut walker = DirSlots::new(&mut self.dev, new_parent.location());
        let mut dest_addr = None;
        while let Some(addr) = walker.next_addr()? {
            let entry = dirwalk::read_entry(&mut self.dev, addr)?;
            if entry.is_empty() {
                dest_addr = Some(addr);
                break;
            }
        }
        let dest_addr = dest_addr.ok_or(SfsError::NoSpc)?;

        let mut moved = old.entry.clone();
        let mut filename = [0u8; layout::FILENAME_MAX];
        filename[..new_name.len()].copy_from_slice(new_name.as_bytes());
        moved.filename = filename;

        dirwalk::write_entry(&mut self.dev, dest_addr, &moved)?;
        dirwalk::write_entry(&mut self.dev, old.addr, &DirEntryRecord::EMPTY)?;
        Ok(())
    }

    /// Shared by `create`/`mkdir`: scans the parent for a duplicate name
    /// (`EEXIST`) while tracking the first empty slot; `NoSpc` if the scan
    /// completes with no empty slot found.
    fn find_slot_for_new_name(&mut self, parent: ParentDir, name: &[u8]) -> Result<u64> {
        let mut empty_slot = None;
        let mut walker = DirSlots::new(&mut self.dev, parent.location());
        while let Some(addr) = walker.next_addr()? {
            let entry = dirwalk::read_entry(&mut self.dev, addr)?;
            if entry.is_empty() {
                if empty_slot.is_none() {
                    empty_slot = Some(addr);
                }
                continue;
            }
            if entry.name() == name {
                return Err(SfsError::EExist);
            }
        }
        empty_slot.ok_or(SfsError::NoSpc)
    }

    /// Shrinks a file's chain so only the blocks needed for `size` bytes
    /// remain, zero-filling the tail of the last kept block past the cut
    /// point. Returns the (possibly unchanged) chain head.
    fn shrink_chain(&mut self, head: u16, size: u64) -> Result<u16> {
        if size == 0 {
            blocktable::free_chain(&mut self.dev, head)?;
            return Ok(layout::BLOCKIDX_END);
        }

        let keep_blocks = size.div_ceil(BLOCK_SIZE as u64);
        let mut blk = match blocktable::next_from_head(head) {
            Slot::Link(b) => b,
            _ => return Ok(head),
        };
        for _ in 1..keep_blocks {
            blk = match blocktable::next(&mut self.dev, blk)? {
                Slot::Link(b) => b,
                _ => return Ok(head),
            };
        }

        // Zero-fill the unused tail of the last kept block.
        let used_in_last = size - (keep_blocks - 1) * BLOCK_SIZE as u64;
        if (used_in_last as usize) < BLOCK_SIZE {
            let zeros = vec![0u8; BLOCK_SIZE - used_in_last as usize];
            self.dev.write(&zeros, layout::block_offset(blk) + used_in_last)?;
        }

        let successor = blocktable::next(&mut self.dev, blk)?;
        blocktable::set_next(&mut self.dev, blk, Slot::End)?;
        if let Slot::Link(next_blk) = successor {
            blocktable::free_chain(&mut self.dev, next_blk)?;
        }

        Ok(head)
    }

    /// Extends a file's chain so it covers at least `new_size` bytes,
    /// zero-filling every newly added byte (both full new blocks and the
    /// gap within the previously-last block). Returns the chain head (a
    /// fresh allocation if the file was previously empty).
    fn grow_chain(&mut self, head: u16, old_size: u64, new_size: u64) -> Result<u16> {
        let mut allocated = Vec::new();
        let result = self.try_grow_chain(head, old_size, new_size, &mut allocated);
        if result.is_err() {
            for b in allocated {
                let _ = blocktable::set_next(&mut self.dev, b, Slot::Empty);
            }
        }
        result
    }

    fn alloc_block(&mut self) -> Result<u16> {
        blocktable::find_free(&mut self.dev)?.ok_or(SfsError::NoSpc)
    }

    fn try_grow_chain(
        &mut self,
        head: u16,
        old_size: u64,
        new_size: u64,
        allocated: &mut Vec<u16>,
    ) -> Result<u16> {
        let (head, mut tail_blk, tail_used) = match blocktable::next_from_head(head) {
            Slot::Link(b) => {
                let mut blk = b;
                let mut remaining = old_size;
                while remaining > BLOCK_SIZE as u64 {
                    blk = match blocktable::next(&mut self.dev, blk)? {
                        Slot::Link(next_blk) => next_blk,
                        _ => break,
                    };
                    remaining -= BLOCK_SIZE as u64;
                }
                (head, blk, remaining as usize)
            }
            _ => {
                let b = self.alloc_block()?;
                blocktable::set_next(&mut self.dev, b, Slot::End)?;
                allocated.push(b);
                (b, b, 0usize)
            }
        };

        // Zero-fill the gap within the last existing block (old_size..BLOCK_SIZE)
        // and, when old_size == 0, the whole first block.
        if tail_used < BLOCK_SIZE {
            let zeros = vec![0u8; BLOCK_SIZE - tail_used];
            self.dev.write(&zeros, layout::block_offset(tail_blk) + tail_used as u64)?;
        }

        let mut have = if old_size == 0 {
            BLOCK_SIZE as u64
        } else {
            let full_blocks_before_tail = (old_size - 1) / BLOCK_SIZE as u64;
            full_blocks_before_tail * BLOCK_SIZE as u64 + BLOCK_SIZE as u64
        };

        while have < new_size {
            let next_blk = self.alloc_block()?;
            blocktable::set_next(&mut self.dev, tail_blk, Slot::Link(next_blk))?;
            blocktable::set_next(&mut self.dev, next_blk, Slot::End)?;
            allocated.push(next_blk);
            let zeros = vec![0u8; BLOCK_SIZE];
            self.dev.write(&zeros, layout::block_offset(next_blk))?;
            tail_blk = next_blk;
            have += BLOCK_SIZE as u64;
        }

        Ok(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemDevice;
    use crate::layout::IMAGE_SIZE;

    fn fresh_sfs() -> Sfs<MemDevice> {
        let mut dev = MemDevice::zeroed(IMAGE_SIZE as usize);
        for b in 0..crate::layout::BLOCKTBL_NENTRIES as u16 {
            blocktable::set_next(&mut dev, b, Slot::Empty).unwrap();
        }
        Sfs::new(dev)
    }

    #[test]
    fn mkdir_then_readdir_shows_new_directory() {
        let mut sfs = fresh_sfs();
        sfs.mkdir("/a").unwrap();
        let mut names = Vec::new();
        sfs.readdir("/", |n, _| names.push(n.to_vec())).unwrap();
        assert!(names.contains(&b"a".to_vec()));
        let st = sfs.getattr("/a").unwrap();
        assert_eq!(st.kind, EntryKind::Dir);
    }

    #[test]
    fn duplicate_mkdir_fails_eexist() {
        let mut sfs = fresh_sfs();
        sfs.mkdir("/a").unwrap();
        assert!(matches!(sfs.mkdir("/a").unwrap_err(), SfsError::EExist));
    }

    #[test]
    fn create_inside_subdirectory_then_readdir() {
        let mut sfs = fresh_sfs();
        sfs.mkdir("/a").unwrap();
        sfs.create("/a/f").unwrap();
        let mut names = Vec::new();
        sfs.readdir("/a", |n, _| names.push(n.to_vec())).unwrap();
        assert!(names.contains(&b"f".to_vec()));
    }

    #[test]
    fn unlink_then_rmdir_releases_every_block() {
        let mut sfs = fresh_sfs();
        sfs.mkdir("/a").unwrap();
        sfs.create("/a/f").unwrap();
        sfs.unlink("/a/f").unwrap();
        sfs.rmdir("/a").unwrap();
        for b in 0..crate::layout::BLOCKTBL_NENTRIES as u16 {
            assert_eq!(blocktable::next(&mut sfs.dev, b).unwrap(), Slot::Empty);
        }
    }

    #[test]
    fn rmdir_on_nonempty_directory_fails() {
        let mut sfs = fresh_sfs();
        sfs.mkdir("/a").unwrap();
        sfs.create("/a/f").unwrap();
        assert!(matches!(sfs.rmdir("/a").unwrap_err(), SfsError::NotEmpty));
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut sfs = fresh_sfs();
        sfs.create("/f").unwrap();
        let n = sfs.write("/f", b"hello world", 0).unwrap();
        assert_eq!(n, 11);
        let mut buf = [0u8; 32];
        let got = sfs.read("/f", &mut buf, 0).unwrap();
        assert_eq!(&buf[..got], b"hello world");
    }

    #[test]
    fn write_past_eof_zero_fills_the_gap() {
        let mut sfs = fresh_sfs();
        sfs.create("/f").unwrap();
        sfs.write("/f", b"end", 2000).unwrap();
        let mut buf = [0u8; 2003];
        let got = sfs.read("/f", &mut buf, 0).unwrap();
        assert_eq!(got, 2003);
        assert!(buf[0..2000].iter().all(|&b| b == 0));
        assert_eq!(&buf[2000..2003], b"end");
    }

    #[test]
    fn write_spanning_multiple_blocks_round_trips() {
        let mut sfs = fresh_sfs();
        sfs.create("/f").unwrap();
        let data = vec![0x42u8; BLOCK_SIZE * 2 + 17];
        sfs.write("/f", &data, 0).unwrap();
        let mut buf = vec![0u8; data.len()];
        let got = sfs.read("/f", &mut buf, 0).unwrap();
        assert_eq!(got, data.len());
        assert_eq!(buf, data);
    }

    #[test]
    fn truncate_down_then_up_zero_fills_regrown_tail() {
        let mut sfs = fresh_sfs();
        sfs.create("/f").unwrap();
        sfs.write("/f", &vec![7u8; 100], 0).unwrap();
        sfs.truncate("/f", 10).unwrap();
        assert_eq!(sfs.getattr("/f").unwrap().size, 10);
        sfs.truncate("/f", 50).unwrap();
        let mut buf = [0u8; 50];
        sfs.read("/f", &mut buf, 0).unwrap();
        assert!(buf[10..50].iter().all(|&b| b == 0));
        assert_eq!(&buf[..10], &[7u8; 10][..]);
    }

    #[test]
    fn read_at_or_past_eof_returns_zero() {
        let mut sfs = fresh_sfs();
        sfs.create("/f").unwrap();
        sfs.write("/f", b"0123456789", 0).unwrap();
        let mut buf = [0u8; 16];
        assert_eq!(sfs.read("/f", &mut buf, 10).unwrap(), 0);
        assert_eq!(sfs.read("/f", &mut buf, 100).unwrap(), 0);
    }

    #[test]
    fn read_clamps_to_remaining_file_size() {
        let mut sfs = fresh_sfs();
        sfs.create("/f").unwrap();
        sfs.write("/f", b"0123456789", 0).unwrap();
        let mut buf = [0u8; 4096];
        let got = sfs.read("/f", &mut buf, 0).unwrap();
        assert_eq!(got, 10);
    }

    #[test]
    fn create_rejects_name_exactly_at_the_limit_boundary() {
        let mut sfs = fresh_sfs();
        let ok_name = "x".repeat(layout::FILENAME_MAX - 1);
        sfs.create(&format!("/{ok_name}")).unwrap();
        let too_long = "x".repeat(layout::FILENAME_MAX);
        assert!(matches!(
            sfs.create(&format!("/{too_long}")).unwrap_err(),
            SfsError::NameTooLong
        ));
    }

    #[test]
    fn mkdir_reverts_first_allocation_when_second_fails() {
        let mut sfs = fresh_sfs();
        // Exhaust the table down to exactly one free block.
        for b in 0..crate::layout::BLOCKTBL_NENTRIES as u16 - 1 {
            blocktable::set_next(&mut sfs.dev, b, Slot::End).unwrap();
        }
        let err = sfs.mkdir("/a").unwrap_err();
        assert!(matches!(err, SfsError::NoSpc));
        // The sole remaining free slot must still read as free afterwards.
        let last = crate::layout::BLOCKTBL_NENTRIES as u16 - 1;
        assert_eq!(blocktable::next(&mut sfs.dev, last).unwrap(), Slot::Empty);
    }

    #[test]
    fn rename_within_same_directory_preserves_contents() {
        let mut sfs = fresh_sfs();
        sfs.create("/f").unwrap();
        sfs.write("/f", b"payload", 0).unwrap();
        sfs.rename("/f", "/g").unwrap();
        assert!(matches!(sfs.getattr("/f").unwrap_err(), SfsError::NoEnt));
        let mut buf = [0u8; 7];
        sfs.read("/g", &mut buf, 0).unwrap();
        assert_eq!(&buf, b"payload");
    }

    #[test]
    fn rename_to_existing_name_fails_eexist() {
        let mut sfs = fresh_sfs();
        sfs.create("/f").unwrap();
        sfs.create("/g").unwrap();
        assert!(matches!(sfs.rename("/f", "/g").unwrap_err(), SfsError::EExist));
    }

    #[test]
    fn create_unlink_round_trip_restores_parent_bytes() {
        let mut sfs = fresh_sfs();
        let before = sfs.dev.as_bytes().to_vec();
        sfs.create("/f").unwrap();
        sfs.unlink("/f").unwrap();
        assert_eq!(sfs.dev.as_bytes(), &before[..]);
    }
}
