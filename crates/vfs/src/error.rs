//! Error types for the VFS crate.

use thiserror::Error;

use crate::inode::INodeId;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VfsError>;

/// Errors that can occur during VFS operations.
#[derive(Error, Debug)]
pub enum VfsError {
    /// No entry with this name in the addressed directory.
    #[error("No entry named {name:?} in directory {parent}")]
    NotFound { parent: INodeId, name: String },

    /// Inode not found.
    #[error("Inode not found: {0}")]
    InodeNotFound(INodeId),

    /// Not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(INodeId),

    /// Is a directory.
    #[error("Is a directory: {0}")]
    IsADirectory(INodeId),

    /// Directory still has entries.
    #[error("Directory not empty: {0}")]
    NotEmpty(INodeId),

    /// An entry with this name already exists.
    #[error("Entry {name:?} already exists in directory {parent}")]
    AlreadyExists { parent: INodeId, name: String },

    /// Entry name is empty, `.` or `..`, or contains `/` or NUL.
    #[error("Invalid entry name: {0:?}")]
    InvalidName(String),

    /// Directory would become its own descendant.
    #[error("Cannot move directory {ino} under {target}")]
    InvalidMove { ino: INodeId, target: INodeId },

    /// Operation is recognized but deliberately unsupported.
    #[error("Operation not implemented: {0}")]
    NotImplemented(&'static str),

    /// Mount operation failed.
    #[error("Mount failed: {0}")]
    MountFailed(String),
}

impl VfsError {
    /// Map the error to the errno reported to the kernel.
    pub fn to_errno(&self) -> i32 {
        match self {
            VfsError::NotFound { .. } | VfsError::InodeNotFound(_) => libc::ENOENT,
            VfsError::NotADirectory(_) => libc::ENOTDIR,
            VfsError::IsADirectory(_) => libc::EISDIR,
            VfsError::NotEmpty(_) => libc::ENOTEMPTY,
            VfsError::AlreadyExists { .. } => libc::EEXIST,
            VfsError::InvalidName(_) | VfsError::InvalidMove { .. } => libc::EINVAL,
            VfsError::NotImplemented(_) => libc::ENOSYS,
            VfsError::MountFailed(_) => libc::EIO,
        }
    }

    /// Whether the error reports a missing entry or inode.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            VfsError::NotFound { .. } | VfsError::InodeNotFound(_)
        )
    }
}
