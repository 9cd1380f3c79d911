//! Inode table: id allocation and record storage.

use std::collections::HashMap;

use super::types::{INode, INodeId, INodeKind, ROOT_INODE};

/// Owns every inode record, keyed by id.
///
/// Not synchronized on its own; the namespace lock serializes access.
#[derive(Debug)]
pub struct InodeTable {
    /// Last id handed out. Seeded at the root id, so the first allocation is 2.
    last_id: INodeId,
    /// All inodes by ID.
    inodes: HashMap<INodeId, INode>,
    uid: u32,
    gid: u32,
}

impl InodeTable {
    /// Create a table holding only the root directory.
    ///
    /// # Arguments
    /// * `uid` - Owner uid for every inode
    /// * `gid` - Owner gid for every inode
    pub fn new(uid: u32, gid: u32) -> Self {
        let mut table = Self {
            last_id: ROOT_INODE,
            inodes: HashMap::new(),
            uid,
            gid,
        };
        table.insert_root();
        table
    }

    /// Drop every record and install a fresh root.
    ///
    /// The id counter keeps running so ids are never reused.
    pub fn reset(&mut self) {
        self.inodes.clear();
        self.insert_root();
    }

    fn insert_root(&mut self) {
        let root: INode = INode::new(
            ROOT_INODE,
            ROOT_INODE,
            INodeKind::Directory,
            self.uid,
            self.gid,
        );
        self.inodes.insert(ROOT_INODE, root);
    }

    /// Allocate and store a new inode.
    ///
    /// # Arguments
    /// * `kind` - Directory or file
    /// * `parent` - Directory that will hold the new entry
    ///
    /// # Returns
    /// A copy of the stored record.
    pub fn allocate(&mut self, kind: INodeKind, parent: INodeId) -> INode {
        self.last_id += 1;
        let inode: INode = INode::new(self.last_id, parent, kind, self.uid, self.gid);
        self.inodes.insert(inode.id(), inode.clone());
        inode
    }

    /// Get an inode by ID.
    pub fn get(&self, id: INodeId) -> Option<&INode> {
        self.inodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: INodeId) -> Option<&mut INode> {
        self.inodes.get_mut(&id)
    }

    /// Whether an inode with this id exists.
    pub fn contains(&self, id: INodeId) -> bool {
        self.inodes.contains_key(&id)
    }

    /// Remove an inode record.
    ///
    /// # Returns
    /// The removed record, or None if the id was unknown.
    pub fn remove(&mut self, id: INodeId) -> Option<INode> {
        self.inodes.remove(&id)
    }

    /// Number of live inodes, root included.
    pub fn len(&self) -> usize {
        self.inodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inodes.is_empty()
    }
}
