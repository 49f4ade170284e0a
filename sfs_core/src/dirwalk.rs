//! Directory walking: a single lazy sequence over a directory's on-disk
//! slots, whether that directory is the root's flat array or a non-root
//! chain of blocks. `get_entry`, `readdir`, `create`, and `mkdir` all
//! consume this instead of duplicating the chain-walk/slot-index
//! arithmetic.

use crate::blocktable::{self, Slot};
use crate::device::Device;
use crate::layout::{self, ENTRIES_PER_BLOCK, ENTRY_SIZE, ROOTDIR_NENTRIES, ROOTDIR_OFF};

/// Which directory a [`DirSlots`] iterates: the root's fixed array, or a
/// non-root directory's block chain starting at `first_block`.
#[derive(Debug, Clone, Copy)]
pub enum DirLocation {
    Root,
    Chain { first_block: u16 },
}

/// Yields the on-disk byte address of every logical slot in a directory, in
/// on-disk order. For the root this is `ROOTDIR_NENTRIES` fixed addresses;
/// for a non-root directory it walks the real chain to `BLOCKIDX_END`
/// rather than assume a fixed entry count (see Redesign Flags).
pub struct DirSlots<'a, D: Device> {
    dev: &'a mut D,
    loc: DirLocation,
    // Root: flat index into ROOTDIR_NENTRIES.
    root_idx: usize,
    // Chain: current block (None once the chain is exhausted) and index within it.
    cur_block: Option<u16>,
    block_idx: usize,
}

impl<'a, D: Device> DirSlots<'a, D> {
    pub fn new(dev: &'a mut D, loc: DirLocation) -> Self {
        let cur_block = match loc {
            DirLocation::Root => None,
            DirLocation::Chain { first_block }
                if first_block == layout::BLOCKIDX_END || first_block == layout::BLOCKIDX_EMPTY =>
            {
                None
            }
            DirLocation::Chain { first_block } => Some(first_block),
        };
        DirSlots { dev, loc, root_idx: 0, cur_block, block_idx: 0 }
    }

    /// Advances to and returns the next slot address, or `None` once every
    /// slot in the directory has been visited.
    pub fn next_addr(&mut self) -> std::io::Result<Option<u64>> {
        match self.loc {
            DirLocation::Root => {
                if self.root_idx >= ROOTDIR_NENTRIES {
                    return Ok(None);
                }
                let addr = ROOTDIR_OFF + (self.root_idx * ENTRY_SIZE) as u64;
                self.root_idx += 1;
                Ok(Some(addr))
            }
            DirLocation::Chain { .. } => {
                loop {
                    let blk = match self.cur_block {
                        Some(b) => b,
                        None => return Ok(None),
                    };
                    if self.block_idx >= ENTRIES_PER_BLOCK {
                        // Move to the next block in the chain.
                        match blocktable::next(self.dev, blk)? {
                            Slot::Link(next_blk) => {
                                self.cur_block = Some(next_blk);
                                self.block_idx = 0;
                                continue;
                            }
                            Slot::End | Slot::Empty => {
                                self.cur_block = None;
                                return Ok(None);
                            }
                        }
                    }
                    let addr = layout::block_offset(blk) + (self.block_idx * ENTRY_SIZE) as u64;
                    self.block_idx += 1;
                    return Ok(Some(addr));
                }
            }
        }
    }
}

/// Reads the entry at `addr`.
pub fn read_entry<D: Device>(dev: &mut D, addr: u64) -> std::io::Result<layout::DirEntryRecord> {
    let mut raw = [0u8; ENTRY_SIZE];
    dev.read(&mut raw, addr)?;
    Ok(layout::DirEntryRecord::decode(&raw))
}

/// Writes `entry` at `addr`.
pub fn write_entry<D: Device>(
    dev: &mut D,
    addr: u64,
    entry: &layout::DirEntryRecord,
) -> std::io::Result<()> {
    dev.write(&entry.encode(), addr)
}
