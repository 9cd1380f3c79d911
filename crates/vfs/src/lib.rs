//! In-memory virtual filesystem served over FUSE.
//!
//! The namespace lives only in process memory. Directories and files can be
//! created, listed, renamed and removed; every file reads back the same
//! greeting.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: FUSE Interface (fuser::Filesystem impl)
//! Layer 2: Handles (HelloFs, DirHandle, FileHandle)
//! Layer 1: Namespace (InodeTable, DirectoryIndex, AttributeProjector)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use hellofs_vfs::{HelloFs, HelloVfs, MountOptions, NamespaceOptions};
//!
//! let fs = HelloFs::new(NamespaceOptions::default());
//! fs.root().mkdir("docs")?;
//! hellofs_vfs::mount(HelloVfs::new(fs, MountOptions::default()), "/mnt/hello".as_ref())?;
//! ```

pub mod error;
pub mod inode;
pub mod namespace;
pub mod node;
pub mod options;

#[cfg(feature = "fuse")]
pub mod fuse;

pub use error::{Result, VfsError};
pub use inode::{
    AttributeProjector, Dentry, DirectoryIndex, FileAttributes, INode, INodeId, INodeKind,
    InodeTable, NodeRef, ROOT_INODE,
};
pub use namespace::Namespace;
pub use node::{DirHandle, FileContents, FileHandle, HelloFs, Node, NodeMetadata, GREETING};
pub use options::{MountOptions, NamespaceOptions};

#[cfg(feature = "fuse")]
pub use fuse::{mount, spawn_mount, HelloVfs};
