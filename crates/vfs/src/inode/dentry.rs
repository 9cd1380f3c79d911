//! Directory entries and the per-directory entry index.

use std::collections::HashMap;

use super::types::{INodeId, INodeKind};

/// Binding from a parent directory to a child inode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dentry {
    /// Child inode ID.
    pub id: INodeId,
    /// Entry name within the parent.
    pub name: String,
    /// Child kind.
    pub kind: INodeKind,
}

impl Dentry {
    pub fn new(id: INodeId, name: impl Into<String>, kind: INodeKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }
}

/// Ordered child entries for every directory inode.
///
/// Insertion order is listing order. Lookups are linear scans and the first
/// match wins, so duplicate names (when allowed) shadow later siblings.
#[derive(Debug, Default)]
pub struct DirectoryIndex {
    /// Child entries: directory inode ID → entries.
    dirs: HashMap<INodeId, Vec<Dentry>>,
}

impl DirectoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty entry list for a new directory.
    ///
    /// An existing list for the same id is replaced.
    pub fn init(&mut self, dir: INodeId) {
        self.dirs.insert(dir, Vec::new());
    }

    /// Whether `dir` has an entry list.
    pub fn contains(&self, dir: INodeId) -> bool {
        self.dirs.contains_key(&dir)
    }

    /// Append an entry to a directory.
    ///
    /// # Arguments
    /// * `dir` - Directory inode ID
    /// * `dentry` - Entry to append
    ///
    /// # Returns
    /// False if `dir` has no entry list.
    pub fn append(&mut self, dir: INodeId, dentry: Dentry) -> bool {
        match self.dirs.get_mut(&dir) {
            Some(entries) => {
                entries.push(dentry);
                true
            }
            None => false,
        }
    }

    /// Find the first entry named `name`.
    pub fn find(&self, dir: INodeId, name: &str) -> Option<&Dentry> {
        self.dirs.get(&dir)?.iter().find(|d| d.name == name)
    }

    /// Remove the first entry named `name`, keeping the order of the rest.
    ///
    /// # Returns
    /// The removed entry, or None if not found.
    pub fn remove(&mut self, dir: INodeId, name: &str) -> Option<Dentry> {
        let entries: &mut Vec<Dentry> = self.dirs.get_mut(&dir)?;
        let pos: usize = entries.iter().position(|d| d.name == name)?;
        Some(entries.remove(pos))
    }

    /// Rewrite the name of the first entry named `old_name` in place.
    ///
    /// # Returns
    /// True if an entry was renamed.
    pub fn rename(&mut self, dir: INodeId, old_name: &str, new_name: &str) -> bool {
        let Some(entries) = self.dirs.get_mut(&dir) else {
            return false;
        };
        match entries.iter_mut().find(|d| d.name == old_name) {
            Some(dentry) => {
                dentry.name = new_name.to_string();
                true
            }
            None => false,
        }
    }

    /// Snapshot of a directory's entries in insertion order.
    pub fn list(&self, dir: INodeId) -> Option<Vec<Dentry>> {
        self.dirs.get(&dir).cloned()
    }

    /// Number of entries in a directory.
    pub fn child_count(&self, dir: INodeId) -> Option<usize> {
        self.dirs.get(&dir).map(Vec::len)
    }

    /// Drop a directory's entry list.
    ///
    /// # Returns
    /// The entries the directory still held.
    pub fn discard(&mut self, dir: INodeId) -> Option<Vec<Dentry>> {
        self.dirs.remove(&dir)
    }

    /// Drop every entry list.
    pub fn clear(&mut self) {
        self.dirs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(index: &DirectoryIndex, dir: INodeId) -> Vec<String> {
        index
            .list(dir)
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect()
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let mut index: DirectoryIndex = DirectoryIndex::new();
        index.init(1);
        index.append(1, Dentry::new(2, "zeta", INodeKind::File));
        index.append(1, Dentry::new(3, "alpha", INodeKind::Directory));
        index.append(1, Dentry::new(4, "mid", INodeKind::File));

        assert_eq!(names(&index, 1), vec!["zeta", "alpha", "mid"]);
        assert_eq!(index.child_count(1), Some(3));
    }

    #[test]
    fn test_append_to_unknown_dir() {
        let mut index: DirectoryIndex = DirectoryIndex::new();
        assert!(!index.append(9, Dentry::new(2, "a", INodeKind::File)));
        assert_eq!(index.list(9), None);
    }

    #[test]
    fn test_find_first_match_wins() {
        let mut index: DirectoryIndex = DirectoryIndex::new();
        index.init(1);
        index.append(1, Dentry::new(2, "dup", INodeKind::File));
        index.append(1, Dentry::new(3, "dup", INodeKind::Directory));

        let found: &Dentry = index.find(1, "dup").unwrap();
        assert_eq!(found.id, 2);
        assert!(index.find(1, "nonexistent").is_none());
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut index: DirectoryIndex = DirectoryIndex::new();
        index.init(1);
        index.append(1, Dentry::new(2, "a", INodeKind::File));
        index.append(1, Dentry::new(3, "b", INodeKind::File));
        index.append(1, Dentry::new(4, "c", INodeKind::File));

        let removed: Dentry = index.remove(1, "b").unwrap();
        assert_eq!(removed.id, 3);
        assert_eq!(names(&index, 1), vec!["a", "c"]);
        assert!(index.remove(1, "b").is_none());
    }

    #[test]
    fn test_remove_duplicate_exposes_next() {
        let mut index: DirectoryIndex = DirectoryIndex::new();
        index.init(1);
        index.append(1, Dentry::new(2, "dup", INodeKind::File));
        index.append(1, Dentry::new(3, "dup", INodeKind::File));

        assert_eq!(index.remove(1, "dup").unwrap().id, 2);
        assert_eq!(index.find(1, "dup").unwrap().id, 3);
    }

    #[test]
    fn test_rename_in_place() {
        let mut index: DirectoryIndex = DirectoryIndex::new();
        index.init(1);
        index.append(1, Dentry::new(2, "a", INodeKind::File));
        index.append(1, Dentry::new(3, "b", INodeKind::File));

        assert!(index.rename(1, "a", "z"));
        assert_eq!(names(&index, 1), vec!["z", "b"]);
        assert!(!index.rename(1, "missing", "y"));
        assert!(!index.rename(42, "z", "y"));
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let mut index: DirectoryIndex = DirectoryIndex::new();
        index.init(1);
        index.append(1, Dentry::new(2, "a", INodeKind::File));

        let before: Vec<Dentry> = index.list(1).unwrap();
        index.append(1, Dentry::new(3, "b", INodeKind::File));

        assert_eq!(before.len(), 1);
        assert_eq!(index.list(1).unwrap().len(), 2);
    }

    #[test]
    fn test_discard_returns_entries() {
        let mut index: DirectoryIndex = DirectoryIndex::new();
        index.init(5);
        index.append(5, Dentry::new(6, "f", INodeKind::File));

        let dropped: Vec<Dentry> = index.discard(5).unwrap();
        assert_eq!(dropped.len(), 1);
        assert!(!index.contains(5));
    }
}
