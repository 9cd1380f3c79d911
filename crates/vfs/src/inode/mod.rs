//! INode primitives for the virtual filesystem.
//!
//! This module provides the inode table, the per-directory entry index and
//! the attribute projection used by the namespace.

mod attr;
mod dentry;
mod table;
mod types;

pub use attr::{AttributeProjector, FileAttributes};
pub use dentry::{Dentry, DirectoryIndex};
pub use table::InodeTable;
pub use types::{INode, INodeId, INodeKind, NodeRef, ROOT_INODE};
