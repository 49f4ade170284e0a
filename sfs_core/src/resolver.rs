//! Path resolution: walks a slash-rooted path from the root directory
//! through nested directories, returning the matched entry and its on-disk
//! slot address.

use crate::device::Device;
use crate::dirwalk::{self, DirLocation, DirSlots};
use crate::error::{Result, SfsError};
use crate::layout::{DirEntryRecord, FILENAME_MAX};

/// Splits `path` on `/`, dropping empty components so that both a bare
/// `a/b` and a trailing-slash `a/b/` resolve identically. Canonicalization
/// happens exactly once, here.
fn components(path: &str) -> Result<Vec<&str>> {
    if !path.starts_with('/') {
        return Err(SfsError::Inval);
    }
    Ok(path.split('/').filter(|c| !c.is_empty()).collect())
}

/// The outcome of resolving a non-root path: the matched entry and the
/// on-disk address of its slot (so the caller can overwrite or clear it).
#[derive(Debug, Clone)]
pub struct Resolved {
    pub entry: DirEntryRecord,
    pub addr: u64,
}

/// Resolves `path` against the root directory. Returns `Ok(None)` for `"/"`
/// itself (callers handle root specially — it has no on-disk slot or entry
/// record of its own).
pub fn resolve<D: Device>(dev: &mut D, path: &str) -> Result<Option<Resolved>> {
    resolve_components(dev, &components(path)?)
}

/// Walks an already-split, already-canonicalized component list from the
/// root directory. Shared by `resolve` and `resolve_parent` so both agree
/// on what `Ok(None)` (bare root) means without re-deriving components
/// from a reassembled path string.
fn resolve_components<D: Device>(dev: &mut D, comps: &[&str]) -> Result<Option<Resolved>> {
    if comps.is_empty() {
        return Ok(None);
    }

    let mut loc = DirLocation::Root;
    let mut found: Option<Resolved> = None;

    for (i, comp) in comps.iter().enumerate() {
        let name = comp.as_bytes();
        let is_last = i == comps.len() - 1;

        let mut walker = DirSlots::new(dev, loc);
        let mut hit = None;
        while let Some(addr) = walker.next_addr()? {
            let entry = dirwalk::read_entry(dev, addr)?;
            if entry.is_empty() {
                continue;
            }
            if entry.name() == name {
                hit = Some(Resolved { entry, addr });
                break;
            }
        }

        let resolved = hit.ok_or(SfsError::NoEnt)?;

        if !is_last {
            if !resolved.entry.is_dir() {
                return Err(SfsError::NotDir);
            }
            loc = DirLocation::Chain { first_block: resolved.entry.first_block };
        }

        found = Some(resolved);
    }

    Ok(found)
}

/// Which directory a parent resolves to, for `create`/`mkdir`/`rename`.
#[derive(Debug, Clone, Copy)]
pub enum ParentDir {
    Root,
    Sub { first_block: u16 },
}

impl ParentDir {
    pub fn location(self) -> DirLocation {
        match self {
            ParentDir::Root => DirLocation::Root,
            ParentDir::Sub { first_block } => DirLocation::Chain { first_block },
        }
    }
}

/// Splits `path` into a parent directory and a new name, resolving the
/// parent and validating the name's length. Shared by `create`, `mkdir`,
/// and `rename`. Goes through the same component list `resolve` uses
/// (rather than re-splitting the raw string) so a path like `"//x"` or
/// `"/a/"` is canonicalized exactly the same way in both functions.
pub fn resolve_parent<'p, D: Device>(dev: &mut D, path: &'p str) -> Result<(ParentDir, &'p str)> {
    let comps = components(path)?;
    let name = *comps.last().ok_or(SfsError::Inval)?;

    if name.len() > FILENAME_MAX - 1 {
        return Err(SfsError::NameTooLong);
    }

    let parent = match resolve_components(dev, &comps[..comps.len() - 1])? {
        None => ParentDir::Root,
        Some(resolved) => {
            if !resolved.entry.is_dir() {
                return Err(SfsError::NotDir);
            }
            ParentDir::Sub { first_block: resolved.entry.first_block }
        }
    };

    Ok((parent, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemDevice;
    use crate::layout::{IMAGE_SIZE, ROOTDIR_OFF};

    fn fresh() -> MemDevice {
        let mut dev = MemDevice::zeroed(IMAGE_SIZE as usize);
        for b in 0..crate::layout::BLOCKTBL_NENTRIES as u16 {
            crate::blocktable::set_next(&mut dev, b, crate::blocktable::Slot::Empty).unwrap();
        }
        dev
    }

    #[test]
    fn root_resolves_to_none() {
        let mut dev = fresh();
        assert!(resolve(&mut dev, "/").unwrap().is_none());
    }

    #[test]
    fn missing_component_is_noent() {
        let mut dev = fresh();
        assert!(matches!(resolve(&mut dev, "/nope").unwrap_err(), SfsError::NoEnt));
    }

    #[test]
    fn relative_path_is_invalid() {
        let mut dev = fresh();
        assert!(matches!(resolve(&mut dev, "no/leading/slash").unwrap_err(), SfsError::Inval));
    }

    #[test]
    fn descending_through_a_file_fails_notdir() {
        let mut dev = fresh();
        let entry = DirEntryRecord::new_file(b"f");
        dirwalk::write_entry(&mut dev, ROOTDIR_OFF, &entry).unwrap();
        assert!(matches!(resolve(&mut dev, "/f/x").unwrap_err(), SfsError::NotDir));
    }

    #[test]
    fn trailing_slash_resolves_the_same_as_without() {
        let mut dev = fresh();
        let entry = DirEntryRecord::new_dir(b"a", 0);
        dirwalk::write_entry(&mut dev, ROOTDIR_OFF, &entry).unwrap();
        let a = resolve(&mut dev, "/a").unwrap().unwrap();
        let a_slash = resolve(&mut dev, "/a/").unwrap().unwrap();
        assert_eq!(a.addr, a_slash.addr);
    }

    #[test]
    fn resolve_parent_rejects_overlong_names() {
        let mut dev = fresh();
        let long_name = "x".repeat(FILENAME_MAX);
        let path = format!("/{long_name}");
        assert!(matches!(
            resolve_parent(&mut dev, &path).unwrap_err(),
            SfsError::NameTooLong
        ));
    }

    #[test]
    fn resolve_parent_accepts_name_at_max_length() {
        let mut dev = fresh();
        let name = "x".repeat(FILENAME_MAX - 1);
        let path = format!("/{name}");
        let (parent, got_name) = resolve_parent(&mut dev, &path).unwrap();
        assert!(matches!(parent, ParentDir::Root));
        assert_eq!(got_name, name);
    }

    #[test]
    fn resolve_parent_collapses_doubled_leading_slashes_to_root() {
        let mut dev = fresh();
        let (parent, name) = resolve_parent(&mut dev, "//x").unwrap();
        assert!(matches!(parent, ParentDir::Root));
        assert_eq!(name, "x");
    }
}
