//! Configuration options for the namespace and the FUSE mount.

use std::time::Duration;

/// Permissions projected for every directory (r-xr-xr-x).
pub const DEFAULT_DIR_PERMS: u16 = 0o555;

/// Permissions projected for every file (r--r--r--).
pub const DEFAULT_FILE_PERMS: u16 = 0o444;

/// Preferred I/O block size reported in attributes.
pub const DEFAULT_BLOCK_SIZE: u32 = 4096;

/// Namespace policy and attribute defaults.
#[derive(Debug, Clone)]
pub struct NamespaceOptions {
    /// Permission bits reported for directories.
    pub dir_perms: u16,
    /// Permission bits reported for files.
    pub file_perms: u16,
    /// Owner uid stamped on new inodes.
    pub uid: u32,
    /// Owner gid stamped on new inodes.
    pub gid: u32,
    /// Preferred block size reported in attributes.
    pub block_size: u32,
    /// Let several siblings share a name. Lookup only reaches the first one.
    pub allow_duplicate_names: bool,
    /// Let rmdir remove a directory that still has entries, reclaiming the
    /// whole subtree.
    pub remove_non_empty_dirs: bool,
}

impl Default for NamespaceOptions {
    fn default() -> Self {
        Self {
            dir_perms: DEFAULT_DIR_PERMS,
            file_perms: DEFAULT_FILE_PERMS,
            uid: unsafe { libc::getuid() },
            gid: unsafe { libc::getgid() },
            block_size: DEFAULT_BLOCK_SIZE,
            allow_duplicate_names: false,
            remove_non_empty_dirs: false,
        }
    }
}

impl NamespaceOptions {
    /// Set the permission bits reported for directories and files.
    ///
    /// # Arguments
    /// * `dir_perms` - Directory mode bits
    /// * `file_perms` - File mode bits
    pub fn with_perms(mut self, dir_perms: u16, file_perms: u16) -> Self {
        self.dir_perms = dir_perms;
        self.file_perms = file_perms;
        self
    }

    /// Set the owner of new inodes.
    ///
    /// # Arguments
    /// * `uid` - Owner user id
    /// * `gid` - Owner group id
    pub fn with_owner(mut self, uid: u32, gid: u32) -> Self {
        self.uid = uid;
        self.gid = gid;
        self
    }

    /// Allow or reject duplicate names within one directory.
    pub fn with_duplicate_names(mut self, allow: bool) -> Self {
        self.allow_duplicate_names = allow;
        self
    }

    /// Allow or reject removal of non-empty directories.
    pub fn with_remove_non_empty_dirs(mut self, allow: bool) -> Self {
        self.remove_non_empty_dirs = allow;
        self
    }
}

/// Options passed to the kernel when mounting.
#[derive(Debug, Clone)]
pub struct MountOptions {
    /// Filesystem name shown in the mount table.
    pub fs_name: String,
    /// Filesystem subtype (`fuse.<subtype>`).
    pub subtype: String,
    /// Volume label. Only meaningful on macOS.
    pub volume_name: String,
    /// How long the kernel may cache entries and attributes.
    pub attr_ttl: Duration,
    /// Let users other than the mounter access the filesystem.
    pub allow_other: bool,
    /// Unmount automatically when the process exits.
    pub auto_unmount: bool,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            fs_name: "helloworld".to_string(),
            subtype: "hellofs".to_string(),
            volume_name: "Hello world!".to_string(),
            attr_ttl: Duration::from_secs(1),
            allow_other: false,
            auto_unmount: false,
        }
    }
}

impl MountOptions {
    /// Set the attribute cache timeout.
    ///
    /// # Arguments
    /// * `ttl` - Duration the kernel may cache attributes and entries
    pub fn with_attr_ttl(mut self, ttl: Duration) -> Self {
        self.attr_ttl = ttl;
        self
    }

    /// Set whether other users may access the mount.
    pub fn with_allow_other(mut self, allow: bool) -> Self {
        self.allow_other = allow;
        self
    }

    /// Set whether the mount is removed when the process exits.
    ///
    /// The kernel only honours this together with `allow_other`.
    pub fn with_auto_unmount(mut self, auto: bool) -> Self {
        self.auto_unmount = auto;
        self
    }
}
