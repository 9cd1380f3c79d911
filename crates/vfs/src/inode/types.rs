//! Core INode types.

use std::time::SystemTime;

/// Unique identifier for an inode.
pub type INodeId = u64;

/// Root directory inode ID (always 1 per FUSE convention).
pub const ROOT_INODE: INodeId = 1;

/// Kind of inode entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum INodeKind {
    /// Directory.
    Directory,
    /// Regular file.
    File,
}

impl INodeKind {
    /// Whether this is a directory.
    pub fn is_dir(self) -> bool {
        self == INodeKind::Directory
    }
}

/// Identity and metadata record for one filesystem entity.
///
/// Timestamps are stamped once at allocation and never touched again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct INode {
    id: INodeId,
    parent: INodeId,
    kind: INodeKind,
    size: u64,
    nlink: u32,
    uid: u32,
    gid: u32,
    ctime: SystemTime,
    mtime: SystemTime,
    atime: SystemTime,
}

impl INode {
    /// Create a new inode record stamped with the current time.
    ///
    /// # Arguments
    /// * `id` - Inode ID
    /// * `parent` - Directory holding the inode's entry
    /// * `kind` - Directory or file
    /// * `uid` - Owner user id
    /// * `gid` - Owner group id
    pub fn new(id: INodeId, parent: INodeId, kind: INodeKind, uid: u32, gid: u32) -> Self {
        let now: SystemTime = SystemTime::now();
        Self {
            id,
            parent,
            kind,
            size: 0,
            nlink: 1,
            uid,
            gid,
            ctime: now,
            mtime: now,
            atime: now,
        }
    }

    pub fn id(&self) -> INodeId {
        self.id
    }

    /// Directory currently holding this inode's entry. Root is its own parent.
    pub fn parent(&self) -> INodeId {
        self.parent
    }

    pub fn kind(&self) -> INodeKind {
        self.kind
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn nlink(&self) -> u32 {
        self.nlink
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn gid(&self) -> u32 {
        self.gid
    }

    pub fn ctime(&self) -> SystemTime {
        self.ctime
    }

    pub fn mtime(&self) -> SystemTime {
        self.mtime
    }

    pub fn atime(&self) -> SystemTime {
        self.atime
    }

    pub(crate) fn set_parent(&mut self, parent: INodeId) {
        self.parent = parent;
    }
}

/// Lightweight reference to a namespace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    /// Inode ID.
    pub id: INodeId,
    /// Inode kind.
    pub kind: INodeKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_inode_defaults() {
        let inode: INode = INode::new(5, ROOT_INODE, INodeKind::File, 1000, 1000);
        assert_eq!(inode.id(), 5);
        assert_eq!(inode.parent(), ROOT_INODE);
        assert_eq!(inode.kind(), INodeKind::File);
        assert_eq!(inode.size(), 0);
        assert_eq!(inode.nlink(), 1);
        assert_eq!(inode.ctime(), inode.mtime());
        assert_eq!(inode.mtime(), inode.atime());
    }

    #[test]
    fn test_kind_is_dir() {
        assert!(INodeKind::Directory.is_dir());
        assert!(!INodeKind::File.is_dir());
    }
}
