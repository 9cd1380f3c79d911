//! Namespace manager: the inode/dentry graph rooted at inode 1.
//!
//! Every operation runs against the inode table and the directory index
//! under one lock. Mutations hold the write guard for their whole duration,
//! so readers never see a half-applied create, remove or rename, and id
//! allocation is atomic.

use parking_lot::RwLock;

use crate::error::{Result, VfsError};
use crate::inode::{
    AttributeProjector, Dentry, DirectoryIndex, FileAttributes, INode, INodeId, INodeKind,
    InodeTable, NodeRef, ROOT_INODE,
};
use crate::options::NamespaceOptions;

/// Tables guarded together by the namespace lock.
#[derive(Debug)]
struct NamespaceState {
    inodes: InodeTable,
    dirs: DirectoryIndex,
}

impl NamespaceState {
    fn new(options: &NamespaceOptions) -> Self {
        let mut dirs: DirectoryIndex = DirectoryIndex::new();
        dirs.init(ROOT_INODE);
        Self {
            inodes: InodeTable::new(options.uid, options.gid),
            dirs,
        }
    }

    fn require_dir(&self, id: INodeId) -> Result<()> {
        if self.dirs.contains(id) {
            Ok(())
        } else if self.inodes.contains(id) {
            Err(VfsError::NotADirectory(id))
        } else {
            Err(VfsError::InodeNotFound(id))
        }
    }

    fn insert(
        &mut self,
        parent: INodeId,
        name: &str,
        kind: INodeKind,
        allow_duplicates: bool,
    ) -> Result<NodeRef> {
        self.require_dir(parent)?;
        if !allow_duplicates && self.dirs.find(parent, name).is_some() {
            return Err(VfsError::AlreadyExists {
                parent,
                name: name.to_string(),
            });
        }

        let inode: INode = self.inodes.allocate(kind, parent);
        if kind.is_dir() {
            self.dirs.init(inode.id());
        }
        self.dirs.append(parent, Dentry::new(inode.id(), name, kind));

        Ok(NodeRef {
            id: inode.id(),
            kind,
        })
    }

    /// Delete the inode behind a detached entry, and everything under it if
    /// it is a directory.
    ///
    /// # Returns
    /// Number of inodes reclaimed.
    fn reclaim(&mut self, dentry: &Dentry) -> usize {
        let mut reclaimed: usize = 0;
        let mut pending: Vec<Dentry> = vec![dentry.clone()];
        while let Some(entry) = pending.pop() {
            if self.inodes.remove(entry.id).is_some() {
                reclaimed += 1;
            }
            if entry.kind.is_dir() {
                if let Some(children) = self.dirs.discard(entry.id) {
                    pending.extend(children);
                }
            }
        }
        reclaimed
    }

    /// Whether `ancestor` is `id` or lies on the parent chain above it.
    fn is_ancestor(&self, ancestor: INodeId, id: INodeId) -> bool {
        let mut current: INodeId = id;
        loop {
            if current == ancestor {
                return true;
            }
            if current == ROOT_INODE {
                return false;
            }
            match self.inodes.get(current) {
                Some(inode) => current = inode.parent(),
                None => return false,
            }
        }
    }
}

/// Reject names the directory index cannot hold.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\0')
    {
        return Err(VfsError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// The in-memory namespace.
///
/// Constructed once and shared by `Arc` between every request handler.
#[derive(Debug)]
pub struct Namespace {
    state: RwLock<NamespaceState>,
    projector: AttributeProjector,
    options: NamespaceOptions,
}

impl Namespace {
    /// Create a namespace holding only the root directory.
    pub fn new(options: NamespaceOptions) -> Self {
        Self {
            state: RwLock::new(NamespaceState::new(&options)),
            projector: AttributeProjector::new(&options),
            options,
        }
    }

    /// Drop every entry and start again from an empty root.
    ///
    /// Inode ids keep increasing across resets; handles to removed inodes
    /// report `InodeNotFound` afterwards.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.inodes.reset();
        state.dirs.clear();
        state.dirs.init(ROOT_INODE);
        tracing::debug!("namespace reset");
    }

    /// Get a copy of an inode record.
    pub fn get(&self, id: INodeId) -> Result<INode> {
        self.state
            .read()
            .inodes
            .get(id)
            .cloned()
            .ok_or(VfsError::InodeNotFound(id))
    }

    /// Project an inode's attributes.
    pub fn attributes(&self, id: INodeId) -> Result<FileAttributes> {
        let state = self.state.read();
        let inode: &INode = state.inodes.get(id).ok_or(VfsError::InodeNotFound(id))?;
        Ok(self.projector.project(inode))
    }

    /// Directory holding `id`. The root is its own parent.
    pub fn parent_of(&self, id: INodeId) -> Result<INodeId> {
        self.get(id).map(|inode| inode.parent())
    }

    /// Number of live inodes, root included.
    pub fn inode_count(&self) -> usize {
        self.state.read().inodes.len()
    }

    /// Resolve one name inside a directory.
    ///
    /// # Arguments
    /// * `dir` - Directory inode ID
    /// * `name` - Single path segment
    ///
    /// # Returns
    /// Reference to the first entry with that name.
    pub fn lookup(&self, dir: INodeId, name: &str) -> Result<NodeRef> {
        let state = self.state.read();
        state.require_dir(dir)?;
        match state.dirs.find(dir, name) {
            Some(dentry) => Ok(NodeRef {
                id: dentry.id,
                kind: dentry.kind,
            }),
            None => Err(VfsError::NotFound {
                parent: dir,
                name: name.to_string(),
            }),
        }
    }

    /// List a directory's entries in insertion order.
    pub fn list(&self, dir: INodeId) -> Result<Vec<Dentry>> {
        let state = self.state.read();
        state.require_dir(dir)?;
        Ok(state.dirs.list(dir).unwrap_or_default())
    }

    /// Create a directory.
    ///
    /// # Arguments
    /// * `parent` - Parent directory inode ID
    /// * `name` - New entry name
    pub fn mkdir(&self, parent: INodeId, name: &str) -> Result<NodeRef> {
        validate_name(name)?;
        let node: NodeRef = self.state.write().insert(
            parent,
            name,
            INodeKind::Directory,
            self.options.allow_duplicate_names,
        )?;
        tracing::debug!("mkdir: parent={} name={:?} ino={}", parent, name, node.id);
        Ok(node)
    }

    /// Create a file. Every file reads back the same canned payload.
    ///
    /// # Arguments
    /// * `parent` - Parent directory inode ID
    /// * `name` - New entry name
    pub fn create(&self, parent: INodeId, name: &str) -> Result<NodeRef> {
        validate_name(name)?;
        let node: NodeRef = self.state.write().insert(
            parent,
            name,
            INodeKind::File,
            self.options.allow_duplicate_names,
        )?;
        tracing::debug!("create: parent={} name={:?} ino={}", parent, name, node.id);
        Ok(node)
    }

    /// Remove the first entry named `name` and its inode.
    ///
    /// # Arguments
    /// * `parent` - Parent directory inode ID
    /// * `name` - Entry name
    /// * `expect` - Kind the caller expects (unlink vs rmdir); None skips the check
    pub fn remove(&self, parent: INodeId, name: &str, expect: Option<INodeKind>) -> Result<()> {
        let mut state = self.state.write();
        state.require_dir(parent)?;

        let dentry: Dentry = state
            .dirs
            .find(parent, name)
            .cloned()
            .ok_or_else(|| VfsError::NotFound {
                parent,
                name: name.to_string(),
            })?;

        match (expect, dentry.kind) {
            (Some(INodeKind::File), INodeKind::Directory) => {
                return Err(VfsError::IsADirectory(dentry.id))
            }
            (Some(INodeKind::Directory), INodeKind::File) => {
                return Err(VfsError::NotADirectory(dentry.id))
            }
            _ => {}
        }

        if dentry.kind.is_dir()
            && !self.options.remove_non_empty_dirs
            && state.dirs.child_count(dentry.id).unwrap_or(0) > 0
        {
            return Err(VfsError::NotEmpty(dentry.id));
        }

        state.dirs.remove(parent, name);
        let reclaimed: usize = state.reclaim(&dentry);
        tracing::debug!(
            "remove: parent={} name={:?} ino={} reclaimed={}",
            parent,
            name,
            dentry.id,
            reclaimed
        );
        Ok(())
    }

    /// Move or rename an entry.
    ///
    /// The entry is looked up in `src_dir` and re-bound as `new_name` in
    /// `dst_dir`. An existing `new_name` in `dst_dir` is replaced. A missing
    /// `old_name` is a silent no-op.
    ///
    /// # Arguments
    /// * `src_dir` - Directory currently holding the entry
    /// * `old_name` - Current entry name
    /// * `dst_dir` - Directory that will hold the entry
    /// * `new_name` - New entry name
    pub fn rename(
        &self,
        src_dir: INodeId,
        old_name: &str,
        dst_dir: INodeId,
        new_name: &str,
    ) -> Result<()> {
        validate_name(new_name)?;
        let mut state = self.state.write();
        state.require_dir(src_dir)?;
        state.require_dir(dst_dir)?;

        let Some(moving) = state.dirs.find(src_dir, old_name).cloned() else {
            tracing::debug!(
                "rename: {:?} not found in {}, nothing to do",
                old_name,
                src_dir
            );
            return Ok(());
        };

        if src_dir == dst_dir && old_name == new_name {
            return Ok(());
        }

        if moving.kind.is_dir() && state.is_ancestor(moving.id, dst_dir) {
            return Err(VfsError::InvalidMove {
                ino: moving.id,
                target: dst_dir,
            });
        }

        if let Some(existing) = state.dirs.find(dst_dir, new_name).cloned() {
            match (moving.kind, existing.kind) {
                (INodeKind::Directory, INodeKind::File) => {
                    return Err(VfsError::NotADirectory(existing.id))
                }
                (INodeKind::File, INodeKind::Directory) => {
                    return Err(VfsError::IsADirectory(existing.id))
                }
                (INodeKind::Directory, INodeKind::Directory)
                    if !self.options.remove_non_empty_dirs
                        && state.dirs.child_count(existing.id).unwrap_or(0) > 0 =>
                {
                    return Err(VfsError::NotEmpty(existing.id))
                }
                _ => {}
            }
            // Replacing a directory that holds the source would reclaim the
            // entry being moved.
            if existing.kind.is_dir() && state.is_ancestor(existing.id, src_dir) {
                return Err(VfsError::NotEmpty(existing.id));
            }
            state.dirs.remove(dst_dir, new_name);
            state.reclaim(&existing);
        }

        let moved: bool = if src_dir == dst_dir {
            state.dirs.rename(src_dir, old_name, new_name)
        } else {
            match state.dirs.remove(src_dir, old_name) {
                Some(mut dentry) => {
                    dentry.name = new_name.to_string();
                    state.dirs.append(dst_dir, dentry)
                }
                None => false,
            }
        };
        if !moved {
            return Err(VfsError::NotFound {
                parent: src_dir,
                name: old_name.to_string(),
            });
        }
        if let Some(inode) = state.inodes.get_mut(moving.id) {
            inode.set_parent(dst_dir);
        }

        tracing::debug!(
            "rename: {}/{:?} -> {}/{:?} ino={}",
            src_dir,
            old_name,
            dst_dir,
            new_name,
            moving.id
        );
        Ok(())
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(NamespaceOptions::default())
    }
}
