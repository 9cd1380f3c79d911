//! FUSE filesystem implementation.

use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use fuser::{
    FileAttr, FileType, Filesystem, KernelConfig, MountOption, ReplyAttr, ReplyCreate, ReplyData,
    ReplyDirectory, ReplyEmpty, ReplyEntry, ReplyOpen, Request,
};
use libc::c_int;

use crate::error::VfsError;
use crate::inode::{FileAttributes, INodeKind};
use crate::node::{DirHandle, FileContents, HelloFs, NodeMetadata};
use crate::options::MountOptions;

/// FUSE front end over a [`HelloFs`].
pub struct HelloVfs {
    fs: HelloFs,
    options: MountOptions,
}

impl HelloVfs {
    /// Create a new VFS.
    ///
    /// # Arguments
    /// * `fs` - Filesystem whose namespace is served
    /// * `options` - Mount configuration
    pub fn new(fs: HelloFs, options: MountOptions) -> Self {
        Self { fs, options }
    }

    /// Get TTL for FUSE attributes.
    fn ttl(&self) -> Duration {
        self.options.attr_ttl
    }

    /// Kernel mount options derived from the configuration.
    pub fn mount_options(&self) -> Vec<MountOption> {
        let mut opts: Vec<MountOption> = vec![
            MountOption::FSName(self.options.fs_name.clone()),
            MountOption::Subtype(self.options.subtype.clone()),
        ];
        if self.options.allow_other {
            opts.push(MountOption::AllowOther);
        }
        if self.options.auto_unmount {
            opts.push(MountOption::AutoUnmount);
        }
        #[cfg(target_os = "macos")]
        opts.push(MountOption::CUSTOM(format!(
            "volname={}",
            self.options.volume_name
        )));
        opts
    }

    fn dir(&self, ino: u64) -> Result<DirHandle, VfsError> {
        self.fs.dir(ino)
    }
}

fn to_file_type(kind: INodeKind) -> FileType {
    match kind {
        INodeKind::Directory => FileType::Directory,
        INodeKind::File => FileType::RegularFile,
    }
}

/// Convert projected attributes to FUSE file attributes.
fn to_file_attr(attr: &FileAttributes) -> FileAttr {
    FileAttr {
        ino: attr.ino,
        size: attr.size,
        blocks: attr.blocks,
        atime: attr.atime,
        mtime: attr.mtime,
        ctime: attr.ctime,
        crtime: attr.crtime,
        kind: to_file_type(attr.kind),
        perm: attr.perm,
        nlink: attr.nlink,
        uid: attr.uid,
        gid: attr.gid,
        rdev: 0,
        blksize: attr.blksize,
        flags: 0,
    }
}

/// Entry names from the kernel must be UTF-8 to live in the namespace.
fn entry_name(name: &OsStr) -> Result<&str, VfsError> {
    name.to_str()
        .ok_or_else(|| VfsError::InvalidName(name.to_string_lossy().into_owned()))
}

/// Like [`entry_name`], but a name the namespace cannot hold is reported as
/// missing rather than invalid.
fn lookup_name(parent: u64, name: &OsStr) -> Result<&str, VfsError> {
    entry_name(name).map_err(|e| match e {
        VfsError::InvalidName(name) => VfsError::NotFound { parent, name },
        other => other,
    })
}

impl Filesystem for HelloVfs {
    fn init(&mut self, _req: &Request<'_>, _config: &mut KernelConfig) -> Result<(), c_int> {
        tracing::info!(
            "FUSE session started: fs_name={} inodes={}",
            self.options.fs_name,
            self.fs.namespace().inode_count()
        );
        Ok(())
    }

    fn destroy(&mut self) {
        tracing::info!("FUSE session ended");
    }

    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let result: Result<FileAttributes, VfsError> = lookup_name(parent, name)
            .and_then(|name_str| self.dir(parent)?.lookup(name_str))
            .and_then(|node| node.attr());

        match result {
            Ok(attr) => reply.entry(&self.ttl(), &to_file_attr(&attr), 0),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn forget(&mut self, _req: &Request<'_>, ino: u64, _nlookup: u64) {
        if let Ok(node) = self.fs.node(ino) {
            node.forget();
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, reply: ReplyAttr) {
        match self.fs.node(ino).and_then(|node| node.attr()) {
            Ok(attr) => reply.attr(&self.ttl(), &to_file_attr(&attr)),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn mkdir(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        let result: Result<FileAttributes, VfsError> = entry_name(name).and_then(|name_str| {
            let dir: DirHandle = self.dir(parent)?;
            dir.mkdir(name_str)?.attr()
        });

        match result {
            Ok(attr) => reply.entry(&self.ttl(), &to_file_attr(&attr), 0),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn create(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        _mode: u32,
        _umask: u32,
        _flags: i32,
        reply: ReplyCreate,
    ) {
        let result: Result<FileAttributes, VfsError> = entry_name(name).and_then(|name_str| {
            let dir: DirHandle = self.dir(parent)?;
            let (node, _handle) = dir.create(name_str)?;
            node.attr()
        });

        match result {
            Ok(attr) => reply.created(&self.ttl(), &to_file_attr(&attr), 0, 0, 0),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn unlink(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let result: Result<(), VfsError> =
            entry_name(name).and_then(|name_str| self.dir(parent)?.remove(name_str, false));
        match result {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn rmdir(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        let result: Result<(), VfsError> =
            entry_name(name).and_then(|name_str| self.dir(parent)?.remove(name_str, true));
        match result {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn rename(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        newparent: u64,
        newname: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        let result: Result<(), VfsError> = (|| -> Result<(), VfsError> {
            let old_name: &str = entry_name(name)?;
            let new_name: &str = entry_name(newname)?;
            let source: DirHandle = self.dir(parent)?;
            let target: DirHandle = self.dir(newparent)?;
            source.rename(old_name, new_name, &target)
        })();

        match result {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, _flags: i32, reply: ReplyOpen) {
        // ENOSYS tells the kernel to stop sending open and use fh 0.
        match self.fs.file(ino) {
            Ok(file) => match file.open() {
                (_, Ok(())) => reply.opened(0, 0),
                (_, Err(e)) => reply.error(e.to_errno()),
            },
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock: Option<u64>,
        reply: ReplyData,
    ) {
        if offset < 0 {
            reply.error(libc::EINVAL);
            return;
        }

        match self
            .fs
            .file(ino)
            .and_then(|file| file.read(offset as u64, size))
        {
            Ok(data) => reply.data(&data),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn flush(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        _lock_owner: u64,
        reply: ReplyEmpty,
    ) {
        match self.fs.file(ino).and_then(|file| file.flush()) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn fsync(&mut self, _req: &Request<'_>, ino: u64, _fh: u64, _datasync: bool, reply: ReplyEmpty) {
        match self.fs.file(ino).and_then(|file| FileContents::fsync(&file)) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        type Listing = (u64, Vec<(u64, FileType, String)>);
        let listing: Result<Listing, VfsError> = (|| -> Result<Listing, VfsError> {
            let dir: DirHandle = self.dir(ino)?;
            let parent: u64 = self.fs.namespace().parent_of(ino)?;
            let children = dir
                .read_dir_all()?
                .into_iter()
                .map(|d| (d.id, to_file_type(d.kind), d.name));
            Ok((parent, children.collect()))
        })();

        let (parent, children) = match listing {
            Ok(l) => l,
            Err(e) => {
                reply.error(e.to_errno());
                return;
            }
        };

        let mut entries: Vec<(u64, FileType, String)> = vec![
            (ino, FileType::Directory, ".".to_string()),
            (parent, FileType::Directory, "..".to_string()),
        ];
        entries.extend(children);

        for (i, (e_ino, kind, name)) in entries.iter().enumerate().skip(offset as usize) {
            if reply.add(*e_ino, (i + 1) as i64, *kind, name) {
                break;
            }
        }
        reply.ok();
    }

    fn fsyncdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        _datasync: bool,
        reply: ReplyEmpty,
    ) {
        match self.dir(ino).and_then(|dir| dir.fsync()) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }
}

/// Mount the VFS and serve requests until it is unmounted.
///
/// # Arguments
/// * `vfs` - The VFS to mount
/// * `mountpoint` - Path to mount at
pub fn mount(vfs: HelloVfs, mountpoint: &Path) -> Result<(), VfsError> {
    let options: Vec<MountOption> = vfs.mount_options();
    tracing::info!("mounting at {}", mountpoint.display());
    fuser::mount2(vfs, mountpoint, &options).map_err(|e| VfsError::MountFailed(e.to_string()))
}

/// Spawn a VFS mount in the background.
///
/// # Arguments
/// * `vfs` - The VFS to mount
/// * `mountpoint` - Path to mount at
///
/// # Returns
/// Background session handle. Dropping it unmounts.
pub fn spawn_mount(vfs: HelloVfs, mountpoint: &Path) -> Result<fuser::BackgroundSession, VfsError> {
    let options: Vec<MountOption> = vfs.mount_options();
    tracing::info!("mounting in background at {}", mountpoint.display());
    fuser::spawn_mount2(vfs, mountpoint, &options)
        .map_err(|e| VfsError::MountFailed(e.to_string()))
}
