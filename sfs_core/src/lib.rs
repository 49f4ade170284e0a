//! `sfs_core` — the on-disk driver for the Simple File System (SFS) image
//! format: layout constants and codec, the block chain table, path
//! resolution, directory walking, and the externally visible file-system
//! operations. Oblivious to how bytes reach the image (`device::Device` is
//! the seam) and to the host binding that dispatches into it (`ops::Sfs`
//! is the seam).

pub mod blocktable;
pub mod device;
pub mod dirwalk;
pub mod error;
pub mod layout;
pub mod ops;
pub mod resolver;
