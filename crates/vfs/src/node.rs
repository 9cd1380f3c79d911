//! Directory and file handles handed to the protocol layer.
//!
//! A handle is an inode id plus a shared reference to the namespace. The
//! same value serves as both the node and its open handle: metadata
//! operations come from [`NodeMetadata`], content operations from
//! [`FileContents`].

use std::sync::Arc;

use crate::error::{Result, VfsError};
use crate::inode::{Dentry, FileAttributes, INodeId, INodeKind, NodeRef, ROOT_INODE};
use crate::namespace::Namespace;
use crate::options::NamespaceOptions;

/// Payload every file reads back.
pub const GREETING: &[u8] = b"hello, world\n";

/// Metadata operations shared by every handle.
pub trait NodeMetadata {
    /// Inode id behind the handle.
    fn ino(&self) -> INodeId;

    /// Current attributes of the inode.
    fn attr(&self) -> Result<FileAttributes>;

    /// The kernel dropped its references to this node. Nothing to release.
    fn forget(&self) {
        tracing::trace!("forget: {}", self.ino());
    }
}

/// Content operations on file handles.
pub trait FileContents {
    /// Whole file content.
    fn read_all(&self) -> Result<Vec<u8>>;

    /// Read up to `size` bytes starting at `offset`.
    fn read(&self, offset: u64, size: u32) -> Result<Vec<u8>> {
        let data: Vec<u8> = self.read_all()?;
        let start: usize = (offset.min(data.len() as u64)) as usize;
        let end: usize = (start as u64 + size as u64).min(data.len() as u64) as usize;
        Ok(data[start..end].to_vec())
    }

    /// Open the file. The handle is returned together with the outcome so
    /// callers can tell "opened but unsupported" from a hard failure.
    fn open(&self) -> (Self, Result<()>)
    where
        Self: Sized;

    fn flush(&self) -> Result<()>;

    fn fsync(&self) -> Result<()>;
}

/// Entry point of the filesystem: owns the namespace and hands out handles.
#[derive(Debug, Clone)]
pub struct HelloFs {
    namespace: Arc<Namespace>,
}

impl HelloFs {
    /// Create a filesystem over a fresh namespace.
    pub fn new(options: NamespaceOptions) -> Self {
        Self::with_namespace(Arc::new(Namespace::new(options)))
    }

    /// Create a filesystem over an existing namespace.
    pub fn with_namespace(namespace: Arc<Namespace>) -> Self {
        Self { namespace }
    }

    pub fn namespace(&self) -> &Arc<Namespace> {
        &self.namespace
    }

    /// Handle for the root directory. Never resets the namespace.
    pub fn root(&self) -> DirHandle {
        DirHandle::new(self.namespace.clone(), ROOT_INODE)
    }

    /// Resolve an inode id to a handle of the right kind.
    ///
    /// # Arguments
    /// * `ino` - Inode id from the kernel
    ///
    /// # Returns
    /// The handle, or `InodeNotFound` if the inode is gone.
    pub fn node(&self, ino: INodeId) -> Result<Node> {
        let kind: INodeKind = self.namespace.get(ino)?.kind();
        Ok(Node::from_ref(
            self.namespace.clone(),
            NodeRef { id: ino, kind },
        ))
    }

    /// Resolve an inode id that must be a directory.
    pub fn dir(&self, ino: INodeId) -> Result<DirHandle> {
        match self.node(ino)? {
            Node::Dir(dir) => Ok(dir),
            Node::File(_) => Err(VfsError::NotADirectory(ino)),
        }
    }

    /// Resolve an inode id that must be a file.
    pub fn file(&self, ino: INodeId) -> Result<FileHandle> {
        match self.node(ino)? {
            Node::File(file) => Ok(file),
            Node::Dir(_) => Err(VfsError::IsADirectory(ino)),
        }
    }
}

impl Default for HelloFs {
    fn default() -> Self {
        Self::new(NamespaceOptions::default())
    }
}

/// Either kind of handle.
#[derive(Debug, Clone)]
pub enum Node {
    Dir(DirHandle),
    File(FileHandle),
}

impl Node {
    fn from_ref(namespace: Arc<Namespace>, node: NodeRef) -> Self {
        match node.kind {
            INodeKind::Directory => Node::Dir(DirHandle::new(namespace, node.id)),
            INodeKind::File => Node::File(FileHandle::new(namespace, node.id)),
        }
    }

    pub fn kind(&self) -> INodeKind {
        match self {
            Node::Dir(_) => INodeKind::Directory,
            Node::File(_) => INodeKind::File,
        }
    }
}

impl NodeMetadata for Node {
    fn ino(&self) -> INodeId {
        match self {
            Node::Dir(dir) => dir.ino(),
            Node::File(file) => file.ino(),
        }
    }

    fn attr(&self) -> Result<FileAttributes> {
        match self {
            Node::Dir(dir) => dir.attr(),
            Node::File(file) => file.attr(),
        }
    }

    fn forget(&self) {
        match self {
            Node::Dir(dir) => dir.forget(),
            Node::File(file) => file.forget(),
        }
    }
}

/// Handle on a directory inode.
#[derive(Debug, Clone)]
pub struct DirHandle {
    namespace: Arc<Namespace>,
    ino: INodeId,
}

impl DirHandle {
    fn new(namespace: Arc<Namespace>, ino: INodeId) -> Self {
        Self { namespace, ino }
    }

    /// Resolve one child name.
    pub fn lookup(&self, name: &str) -> Result<Node> {
        tracing::trace!("lookup: dir={} name={:?}", self.ino, name);
        let node: NodeRef = self.namespace.lookup(self.ino, name)?;
        Ok(Node::from_ref(self.namespace.clone(), node))
    }

    /// Entries of this directory in insertion order.
    pub fn read_dir_all(&self) -> Result<Vec<Dentry>> {
        self.namespace.list(self.ino)
    }

    /// Create a child directory.
    pub fn mkdir(&self, name: &str) -> Result<DirHandle> {
        let node: NodeRef = self.namespace.mkdir(self.ino, name)?;
        Ok(DirHandle::new(self.namespace.clone(), node.id))
    }

    /// Create a child file.
    ///
    /// # Returns
    /// The node and its open handle, which are the same value.
    pub fn create(&self, name: &str) -> Result<(FileHandle, FileHandle)> {
        let node: NodeRef = self.namespace.create(self.ino, name)?;
        let file: FileHandle = FileHandle::new(self.namespace.clone(), node.id);
        Ok((file.clone(), file))
    }

    /// Remove a child.
    ///
    /// # Arguments
    /// * `name` - Child name
    /// * `is_dir` - True for rmdir, false for unlink
    pub fn remove(&self, name: &str, is_dir: bool) -> Result<()> {
        let expect: INodeKind = if is_dir {
            INodeKind::Directory
        } else {
            INodeKind::File
        };
        self.namespace.remove(self.ino, name, Some(expect))
    }

    /// Rename a child, possibly moving it into `target`.
    ///
    /// # Arguments
    /// * `old_name` - Current child name
    /// * `new_name` - Name in the target directory
    /// * `target` - Directory that will hold the entry
    pub fn rename(&self, old_name: &str, new_name: &str, target: &DirHandle) -> Result<()> {
        self.namespace
            .rename(self.ino, old_name, target.ino, new_name)
    }

    /// Directories have nothing to sync.
    pub fn fsync(&self) -> Result<()> {
        Ok(())
    }
}

impl NodeMetadata for DirHandle {
    fn ino(&self) -> INodeId {
        self.ino
    }

    fn attr(&self) -> Result<FileAttributes> {
        self.namespace.attributes(self.ino)
    }
}

/// Handle on a file inode. Doubles as the open file handle.
#[derive(Debug, Clone)]
pub struct FileHandle {
    namespace: Arc<Namespace>,
    ino: INodeId,
}

impl FileHandle {
    fn new(namespace: Arc<Namespace>, ino: INodeId) -> Self {
        Self { namespace, ino }
    }
}

impl NodeMetadata for FileHandle {
    fn ino(&self) -> INodeId {
        self.ino
    }

    fn attr(&self) -> Result<FileAttributes> {
        self.namespace.attributes(self.ino)
    }
}

impl FileContents for FileHandle {
    fn read_all(&self) -> Result<Vec<u8>> {
        Ok(GREETING.to_vec())
    }

    fn open(&self) -> (Self, Result<()>) {
        (self.clone(), Err(VfsError::NotImplemented("open")))
    }

    fn flush(&self) -> Result<()> {
        Err(VfsError::NotImplemented("flush"))
    }

    fn fsync(&self) -> Result<()> {
        Err(VfsError::NotImplemented("fsync"))
    }
}
