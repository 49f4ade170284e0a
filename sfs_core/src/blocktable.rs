//! The block chain table: a single global array that simultaneously encodes
//! allocation (free vs used) and chaining (successor block) for every data
//! block.

use crate::device::Device;
use crate::layout::{BLOCKIDX_EMPTY, BLOCKIDX_END, BLOCKTBL_NENTRIES, BLOCKTBL_OFF};

/// One chain-table slot, decoded from its raw `u16` successor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The block is free.
    Empty,
    /// The block is the terminal block of some chain.
    End,
    /// The block's successor in its chain.
    Link(u16),
}

impl Slot {
    pub(crate) fn decode(raw: u16) -> Slot {
        match raw {
            BLOCKIDX_EMPTY => Slot::Empty,
            BLOCKIDX_END => Slot::End,
            next => Slot::Link(next),
        }
    }

    fn encode(self) -> u16 {
        match self {
            Slot::Empty => BLOCKIDX_EMPTY,
            Slot::End => BLOCKIDX_END,
            Slot::Link(next) => next,
        }
    }
}

fn slot_offset(b: u16) -> u64 {
    BLOCKTBL_OFF + (b as u64) * 2
}

/// Interprets a directory entry's raw `first_block` field as a chain slot,
/// without touching the device — it is itself a value, not a table lookup.
pub fn next_from_head(raw: u16) -> Slot {
    Slot::decode(raw)
}

/// Reads the successor of block `b`.
pub fn next<D: Device>(dev: &mut D, b: u16) -> std::io::Result<Slot> {
    let mut raw = [0u8; 2];
    dev.read(&mut raw, slot_offset(b))?;
    Ok(Slot::decode(u16::from_le_bytes(raw)))
}

/// Writes the successor of block `b`.
pub fn set_next<D: Device>(dev: &mut D, b: u16, v: Slot) -> std::io::Result<()> {
    dev.write(&v.encode().to_le_bytes(), slot_offset(b))
}

/// Scans slots in index order and returns the first whose successor is
/// `Empty`. Deterministic (lowest free index); `None` when no slot is free.
///
/// Does not reserve the returned index: callers must immediately follow a
/// hit with `set_next(b, Slot::End)` before calling `find_free` again, or
/// the second call can return the same index.
pub fn find_free<D: Device>(dev: &mut D) -> std::io::Result<Option<u16>> {
    for b in 0..BLOCKTBL_NENTRIES as u16 {
        if next(dev, b)? == Slot::Empty {
            return Ok(Some(b));
        }
    }
    Ok(None)
}

/// Walks the chain starting at `head`, resetting every visited slot to
/// `Empty`. A `head` of `BLOCKIDX_END`/`BLOCKIDX_EMPTY` frees nothing (an
/// empty regular file has no blocks to free).
pub fn free_chain<D: Device>(dev: &mut D, head: u16) -> std::io::Result<()> {
    let mut cur = Slot::decode(head);
    loop {
        let b = match cur {
            Slot::Link(b) => b,
            Slot::End | Slot::Empty => break,
        };
        let succ = next(dev, b)?;
        set_next(dev, b, Slot::Empty)?;
        cur = succ;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemDevice;
    use crate::layout::IMAGE_SIZE;

    fn fresh() -> MemDevice {
        let mut dev = MemDevice::zeroed(IMAGE_SIZE as usize);
        for b in 0..BLOCKTBL_NENTRIES as u16 {
            set_next(&mut dev, b, Slot::Empty).unwrap();
        }
        dev
    }

    #[test]
    fn find_free_is_lowest_index_and_does_not_reserve() {
        let mut dev = fresh();
        assert_eq!(find_free(&mut dev).unwrap(), Some(0));
        assert_eq!(find_free(&mut dev).unwrap(), Some(0));
        set_next(&mut dev, 0, Slot::End).unwrap();
        assert_eq!(find_free(&mut dev).unwrap(), Some(1));
    }

    #[test]
    fn chained_allocation_pattern_avoids_double_allocation() {
        let mut dev = fresh();
        let b1 = find_free(&mut dev).unwrap().unwrap();
        set_next(&mut dev, b1, Slot::End).unwrap();
        let b2 = find_free(&mut dev).unwrap().unwrap();
        assert_ne!(b1, b2);
        set_next(&mut dev, b1, Slot::Link(b2)).unwrap();
        set_next(&mut dev, b2, Slot::End).unwrap();
        assert_eq!(next(&mut dev, b1).unwrap(), Slot::Link(b2));
        assert_eq!(next(&mut dev, b2).unwrap(), Slot::End);
    }

    #[test]
    fn free_chain_resets_every_slot_in_the_chain() {
        let mut dev = fresh();
        set_next(&mut dev, 5, Slot::Link(6)).unwrap();
        set_next(&mut dev, 6, Slot::End).unwrap();
        free_chain(&mut dev, 5).unwrap();
        assert_eq!(next(&mut dev, 5).unwrap(), Slot::Empty);
        assert_eq!(next(&mut dev, 6).unwrap(), Slot::Empty);
    }

    #[test]
    fn free_chain_on_end_sentinel_is_a_no_op() {
        let mut dev = fresh();
        free_chain(&mut dev, BLOCKIDX_END).unwrap();
    }

    #[test]
    fn find_free_returns_none_when_table_is_full() {
        let mut dev = fresh();
        for b in 0..BLOCKTBL_NENTRIES as u16 {
            set_next(&mut dev, b, Slot::End).unwrap();
        }
        assert_eq!(find_free(&mut dev).unwrap(), None);
    }
}
