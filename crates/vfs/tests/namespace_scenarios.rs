//! Integration tests for the namespace as seen through the handle layer.
//!
//! Scenarios covered:
//! - build, read and tear down a small tree
//! - listing order across mixed create/mkdir/remove sequences
//! - id allocation under concurrent creators
//! - moves across directories and reset

use std::collections::HashSet;
use std::sync::Arc;

use hellofs_vfs::{
    Dentry, DirHandle, FileContents, FileHandle, HelloFs, INodeId, INodeKind, Namespace,
    NamespaceOptions, Node, NodeMetadata, NodeRef, VfsError, GREETING, ROOT_INODE,
};

fn names(entries: &[Dentry]) -> Vec<&str> {
    entries.iter().map(|d| d.name.as_str()).collect()
}

#[test]
fn test_build_read_and_remove_tree() {
    let fs: HelloFs = HelloFs::default();
    let root: DirHandle = fs.root();

    let a: DirHandle = root.mkdir("a").unwrap();
    let (b, _) = a.create("b.txt").unwrap();

    let listing: Vec<Dentry> = a.read_dir_all().unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].name, "b.txt");
    assert_eq!(listing[0].kind, INodeKind::File);
    assert_eq!(listing[0].id, b.ino());

    match root.lookup("a").unwrap() {
        Node::Dir(found) => assert_eq!(found.ino(), a.ino()),
        Node::File(_) => panic!("expected a directory"),
    }
    let file: FileHandle = match a.lookup("b.txt").unwrap() {
        Node::File(found) => found,
        Node::Dir(_) => panic!("expected a file"),
    };
    assert_eq!(file.read_all().unwrap(), GREETING.to_vec());

    a.remove("b.txt", false).unwrap();
    assert!(a.read_dir_all().unwrap().is_empty());
    assert!(matches!(b.attr(), Err(VfsError::InodeNotFound(_))));

    root.remove("a", true).unwrap();
    assert!(root.read_dir_all().unwrap().is_empty());
    assert_eq!(fs.namespace().inode_count(), 1);
}

#[test]
fn test_listing_keeps_insertion_order() {
    let ns: Namespace = Namespace::default();
    ns.create(ROOT_INODE, "zeta").unwrap();
    ns.mkdir(ROOT_INODE, "alpha").unwrap();
    ns.create(ROOT_INODE, "mid").unwrap();
    ns.remove(ROOT_INODE, "alpha", None).unwrap();
    ns.mkdir(ROOT_INODE, "beta").unwrap();

    let listing: Vec<Dentry> = ns.list(ROOT_INODE).unwrap();
    assert_eq!(names(&listing), vec!["zeta", "mid", "beta"]);
}

#[test]
fn test_failed_operations_leave_namespace_unchanged() {
    let ns: Namespace = Namespace::default();
    let d: NodeRef = ns.mkdir(ROOT_INODE, "d").unwrap();
    ns.create(d.id, "inner").unwrap();
    let before: Vec<Dentry> = ns.list(ROOT_INODE).unwrap();
    let count: usize = ns.inode_count();

    assert!(ns.lookup(ROOT_INODE, "missing").is_err());
    assert!(ns.remove(ROOT_INODE, "missing", None).is_err());
    assert!(ns.remove(ROOT_INODE, "d", Some(INodeKind::Directory)).is_err());
    assert!(ns.create(ROOT_INODE, "d").is_err());
    assert!(ns.mkdir(ROOT_INODE, "bad/name").is_err());

    assert_eq!(ns.list(ROOT_INODE).unwrap(), before);
    assert_eq!(ns.inode_count(), count);
}

#[test]
fn test_ids_never_reused() {
    let ns: Namespace = Namespace::default();
    let mut seen: HashSet<INodeId> = HashSet::new();
    seen.insert(ROOT_INODE);

    for round in 0..5 {
        let name: String = format!("f{}", round);
        let node: NodeRef = ns.create(ROOT_INODE, &name).unwrap();
        assert!(seen.insert(node.id), "id {} handed out twice", node.id);
        ns.remove(ROOT_INODE, &name, None).unwrap();
    }
    ns.reset();
    let after: NodeRef = ns.mkdir(ROOT_INODE, "again").unwrap();
    assert!(seen.insert(after.id));
}

#[test]
fn test_concurrent_creators_get_distinct_ids() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 50;

    let ns: Arc<Namespace> = Arc::new(Namespace::default());

    let ids: Vec<INodeId> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..THREADS)
            .map(|t| {
                let ns: Arc<Namespace> = ns.clone();
                scope.spawn(move || {
                    (0..PER_THREAD)
                        .map(|i| {
                            let name: String = format!("t{}-{}", t, i);
                            if i % 2 == 0 {
                                ns.create(ROOT_INODE, &name).unwrap().id
                            } else {
                                ns.mkdir(ROOT_INODE, &name).unwrap().id
                            }
                        })
                        .collect::<Vec<INodeId>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect()
    });

    let unique: HashSet<INodeId> = ids.iter().copied().collect();
    assert_eq!(unique.len(), THREADS * PER_THREAD);
    assert!(!unique.contains(&ROOT_INODE));

    let listing: Vec<Dentry> = ns.list(ROOT_INODE).unwrap();
    assert_eq!(listing.len(), THREADS * PER_THREAD);
    let listed: HashSet<&str> = listing.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(listed.len(), THREADS * PER_THREAD);
    assert_eq!(ns.inode_count(), THREADS * PER_THREAD + 1);
}

#[test]
fn test_concurrent_same_name_has_one_winner() {
    let ns: Arc<Namespace> = Arc::new(Namespace::default());

    let winners: usize = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let ns: Arc<Namespace> = ns.clone();
                scope.spawn(move || ns.create(ROOT_INODE, "contested").is_ok())
            })
            .collect();
        workers
            .into_iter()
            .map(|w| w.join().unwrap())
            .filter(|won| *won)
            .count()
    });

    assert_eq!(winners, 1);
    assert_eq!(ns.list(ROOT_INODE).unwrap().len(), 1);
}

#[test]
fn test_move_subtree_between_directories() {
    let fs: HelloFs = HelloFs::default();
    let root: DirHandle = fs.root();
    let src: DirHandle = root.mkdir("src").unwrap();
    let dst: DirHandle = root.mkdir("dst").unwrap();
    let moved: DirHandle = src.mkdir("project").unwrap();
    moved.create("readme").unwrap();

    src.rename("project", "renamed", &dst).unwrap();

    assert!(src.read_dir_all().unwrap().is_empty());
    let inner: DirHandle = match dst.lookup("renamed").unwrap() {
        Node::Dir(d) => d,
        Node::File(_) => panic!("expected a directory"),
    };
    assert_eq!(inner.ino(), moved.ino());
    assert_eq!(names(&inner.read_dir_all().unwrap()), vec!["readme"]);
    assert_eq!(fs.namespace().parent_of(moved.ino()).unwrap(), dst.ino());

    assert!(matches!(
        root.rename("dst", "dst", &inner),
        Err(VfsError::InvalidMove { .. })
    ));
}

#[test]
fn test_reset_invalidates_old_handles() {
    let fs: HelloFs = HelloFs::new(NamespaceOptions::default().with_owner(1000, 1000));
    let (old, _) = fs.root().create("f").unwrap();
    assert_eq!(old.attr().unwrap().uid, 1000);

    fs.namespace().reset();

    assert!(matches!(old.attr(), Err(VfsError::InodeNotFound(_))));
    assert!(fs.root().read_dir_all().unwrap().is_empty());
    assert_eq!(fs.root().attr().unwrap().gid, 1000);
}
