//! Projection of inode records into externally visible attributes.

use std::time::SystemTime;

use super::types::{INode, INodeId, INodeKind};
use crate::options::NamespaceOptions;

/// Attribute record reported to the protocol layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttributes {
    pub ino: INodeId,
    pub kind: INodeKind,
    /// POSIX permission bits.
    pub perm: u16,
    pub size: u64,
    /// Size in 512-byte units.
    pub blocks: u64,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    pub atime: SystemTime,
    pub mtime: SystemTime,
    pub ctime: SystemTime,
    /// Creation time (macOS only).
    pub crtime: SystemTime,
    /// Preferred I/O block size.
    pub blksize: u32,
}

/// Derives [`FileAttributes`] from stored inodes.
///
/// Permission bits come from the kind alone, never from the inode.
#[derive(Debug, Clone, Copy)]
pub struct AttributeProjector {
    dir_perms: u16,
    file_perms: u16,
    block_size: u32,
}

impl AttributeProjector {
    pub fn new(options: &NamespaceOptions) -> Self {
        Self {
            dir_perms: options.dir_perms,
            file_perms: options.file_perms,
            block_size: options.block_size,
        }
    }

    /// Permission bits reported for a kind.
    pub fn perms_for(&self, kind: INodeKind) -> u16 {
        match kind {
            INodeKind::Directory => self.dir_perms,
            INodeKind::File => self.file_perms,
        }
    }

    /// Project an inode record.
    pub fn project(&self, inode: &INode) -> FileAttributes {
        let size: u64 = inode.size();
        FileAttributes {
            ino: inode.id(),
            kind: inode.kind(),
            perm: self.perms_for(inode.kind()),
            size,
            blocks: size >> 9,
            nlink: inode.nlink(),
            uid: inode.uid(),
            gid: inode.gid(),
            atime: inode.atime(),
            mtime: inode.mtime(),
            ctime: inode.ctime(),
            crtime: inode.ctime(),
            blksize: self.block_size,
        }
    }
}

impl Default for AttributeProjector {
    fn default() -> Self {
        Self::new(&NamespaceOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inode::ROOT_INODE;

    #[test]
    fn test_directory_projection() {
        let projector: AttributeProjector = AttributeProjector::default();
        let inode: INode = INode::new(ROOT_INODE, ROOT_INODE, INodeKind::Directory, 10, 20);
        let attr: FileAttributes = projector.project(&inode);

        assert_eq!(attr.ino, ROOT_INODE);
        assert_eq!(attr.kind, INodeKind::Directory);
        assert_eq!(attr.perm, 0o555);
        assert_eq!(attr.size, 0);
        assert_eq!(attr.nlink, 1);
        assert_eq!((attr.uid, attr.gid), (10, 20));
        assert_eq!(attr.blksize, 4096);
        assert_eq!(attr.crtime, attr.ctime);
    }

    #[test]
    fn test_file_projection() {
        let projector: AttributeProjector = AttributeProjector::default();
        let inode: INode = INode::new(2, ROOT_INODE, INodeKind::File, 0, 0);
        let attr: FileAttributes = projector.project(&inode);

        assert_eq!(attr.kind, INodeKind::File);
        assert_eq!(attr.perm, 0o444);
        assert_eq!(attr.blocks, 0);
    }

    #[test]
    fn test_configured_perms() {
        let options: NamespaceOptions = NamespaceOptions::default().with_perms(0o700, 0o600);
        let projector: AttributeProjector = AttributeProjector::new(&options);
        assert_eq!(projector.perms_for(INodeKind::Directory), 0o700);
        assert_eq!(projector.perms_for(INodeKind::File), 0o600);
    }
}
