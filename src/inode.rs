//! Maps FUSE inode numbers to SFS paths.
//!
//! `sfs_core` addresses everything by path; the kernel VFS addresses
//! everything by inode number. This table is the glue between the two: an
//! inode is allocated the first time a path is looked up and reused for as
//! long as the kernel holds a reference to it (tracked via `lookup`/`forget`
//! counts, per the FUSE protocol).

use std::collections::HashMap;

use fuser::FUSE_ROOT_ID;

/// `ino -> path` and `path -> ino`, plus the kernel's outstanding lookup
/// count for each inode (so `forget` can reclaim entries that are no longer
/// referenced).
pub struct InodeTable {
    paths: Vec<Option<String>>,
    by_path: HashMap<String, u64>,
    lookups: Vec<u64>,
}

impl InodeTable {
    pub fn new() -> Self {
        let mut table = InodeTable { paths: vec![None, None], by_path: HashMap::new(), lookups: vec![0, 0] };
        table.paths[FUSE_ROOT_ID as usize] = Some("/".to_string());
        table.by_path.insert("/".to_string(), FUSE_ROOT_ID);
        table
    }

    pub fn path(&self, ino: u64) -> Option<&str> {
        self.paths.get(ino as usize).and_then(|p| p.as_deref())
    }

    /// Returns the inode for `path`, allocating a fresh one if this is the
    /// first time it has been seen, and bumps its lookup count by one (the
    /// caller is expected to be replying to a `lookup`/`create`/`mkdir`
    /// request, each of which hands the kernel a new reference).
    pub fn lookup(&mut self, path: &str) -> u64 {
        if let Some(&ino) = self.by_path.get(path) {
            self.lookups[ino as usize] += 1;
            return ino;
        }
        let ino = self.paths.len() as u64;
        self.paths.push(Some(path.to_string()));
        self.by_path.insert(path.to_string(), ino);
        self.lookups.push(1);
        ino
    }

    /// Drops `nlookup` references to `ino`; once the count reaches zero the
    /// path mapping is freed (the kernel will never refer to this inode
    /// again without a fresh `lookup`).
    pub fn forget(&mut self, ino: u64, nlookup: u64) {
        if let Some(count) = self.lookups.get_mut(ino as usize) {
            *count = count.saturating_sub(nlookup);
            if *count == 0 && ino != FUSE_ROOT_ID {
                if let Some(path) = self.paths[ino as usize].take() {
                    self.by_path.remove(&path);
                }
            }
        }
    }

    /// Re-points `ino`'s path after a successful `rename`, so a still-open
    /// handle keeps resolving to the entry it started with.
    pub fn rename(&mut self, old_path: &str, new_path: &str) {
        if let Some(ino) = self.by_path.remove(old_path) {
            self.paths[ino as usize] = Some(new_path.to_string());
            self.by_path.insert(new_path.to_string(), ino);
        }
    }
}

/// Joins a parent directory path and a child name into a new SFS path.
/// `parent` is always an already-resolved directory path (`"/"` or
/// `"/a/b"`, never with a trailing slash except for the root).
pub fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_preallocated_at_the_fuse_root_inode() {
        let table = InodeTable::new();
        assert_eq!(table.path(FUSE_ROOT_ID), Some("/"));
    }

    #[test]
    fn repeated_lookups_of_the_same_path_reuse_the_inode() {
        let mut table = InodeTable::new();
        let a = table.lookup("/a");
        let b = table.lookup("/a");
        assert_eq!(a, b);
    }

    #[test]
    fn forget_frees_the_mapping_once_the_count_drops_to_zero() {
        let mut table = InodeTable::new();
        let ino = table.lookup("/a");
        table.lookup("/a");
        table.forget(ino, 1);
        assert_eq!(table.path(ino), Some("/a"));
        table.forget(ino, 1);
        assert_eq!(table.path(ino), None);
    }

    #[test]
    fn rename_repoints_an_existing_inode_to_its_new_path() {
        let mut table = InodeTable::new();
        let ino = table.lookup("/a");
        table.rename("/a", "/b");
        assert_eq!(table.path(ino), Some("/b"));
        assert_eq!(table.lookup("/b"), ino);
    }

    #[test]
    fn child_path_joins_without_a_double_slash_at_root() {
        assert_eq!(child_path("/", "f"), "/f");
        assert_eq!(child_path("/a", "f"), "/a/f");
    }
}
