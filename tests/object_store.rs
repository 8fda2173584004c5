use std::fs;
use std::path::Path;

use chrono::{FixedOffset, TimeZone};
use mingit::repository::object::blob::Blob;
use mingit::repository::object::tree::{Mode, Tree};
use mingit::repository::object::ObjectKind;
use mingit::repository::tree_builder::{BuildOptions, EntryOrder};
use mingit::repository::{Config, ConfigUser, FixedClock};
use mingit::{Error, Oid, Repository};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn open(dir: &TempDir) -> Repository {
    let user = ConfigUser {
        name: "Test User".into(),
        email: "test@example.com".into(),
    };
    let config = Config {
        author: user.clone(),
        committer: user,
    };
    let time = FixedOffset::east_opt(5 * 3600 + 1800)
        .unwrap()
        .timestamp_opt(1_751_200_678, 0)
        .unwrap();
    let repo = Repository::with_config(dir.path().to_owned(), config, Box::new(FixedClock(time)));
    repo.init().unwrap();
    repo
}

#[test]
fn blob_round_trips_arbitrary_bytes() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);

    for payload in [&b""[..], &b"hello\n"[..], &b"\0\x01\xff binary \0"[..], &[7u8; 70_000][..]] {
        let oid = repo.db().store(ObjectKind::Blob, payload).unwrap();
        let object = repo.cat_file(&oid).unwrap();
        assert_eq!(object.kind(), ObjectKind::Blob);
        assert_eq!(Blob::from_bytes(object.data()).as_bytes(), payload);
    }
}

#[test]
fn hello_file_hashes_like_git() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    fs::write(dir.path().join("hello.txt"), b"hello\n").unwrap();

    let oid = repo.hash_object(Path::new("hello.txt"), true).unwrap();
    assert_eq!(oid, Oid::new(b"blob 6\0hello\n"));
    assert_eq!(oid.to_string(), "ce013625030ba8dba906f756967f9e9ca394464a");
    assert!(dir
        .path()
        .join(".git/objects/ce/013625030ba8dba906f756967f9e9ca394464a")
        .is_file());
}

#[test]
fn repeated_writes_leave_one_object() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);

    let first = repo.db().store(ObjectKind::Blob, b"twice").unwrap();
    let second = repo.db().store(ObjectKind::Blob, b"twice").unwrap();
    assert_eq!(first, second);

    let (group, _) = first.split_path();
    let files = fs::read_dir(dir.path().join(".git/objects").join(group))
        .unwrap()
        .count();
    assert_eq!(files, 1);
}

#[test]
fn write_tree_omits_empty_directory() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    fs::write(dir.path().join("a.txt"), "x").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();

    let oid = repo.write_tree().unwrap().unwrap();
    let tree = repo.ls_tree(&oid).unwrap();
    let entries: Vec<_> = tree.entries().collect();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name(), "a.txt");
    assert_eq!(entries[0].mode(), Mode::Regular);
    assert_eq!(entries[0].oid(), &Oid::new(b"blob 1\0x"));
}

#[test]
fn write_tree_on_empty_workspace_is_none() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    fs::create_dir_all(dir.path().join("a/b/c")).unwrap();

    assert_eq!(repo.write_tree().unwrap(), None);
    assert_eq!(
        repo.write_tree_with(&BuildOptions {
            order: EntryOrder::Listing,
            ..BuildOptions::default()
        })
        .unwrap(),
        None
    );
}

#[test]
fn commit_references_tree_and_parent() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    fs::write(dir.path().join("file"), "content").unwrap();
    let tree = repo.write_tree().unwrap().unwrap();

    let root = repo.commit_tree(tree, None, "first").unwrap();
    let child = repo.commit_tree(tree, Some(root), "msg").unwrap();

    let object = repo.cat_file(&child).unwrap();
    assert_eq!(object.kind(), ObjectKind::Commit);
    let text = String::from_utf8(object.pretty().unwrap()).unwrap();
    let lines: Vec<_> = text.lines().collect();

    assert!(lines.contains(&format!("tree {tree}").as_str()));
    assert!(lines.contains(&format!("parent {root}").as_str()));
    assert!(lines.contains(&"author Test User <test@example.com> 1751200678 +0530"));
    assert!(text.ends_with("\n\nmsg"));
}

#[test]
fn commit_accepts_unknown_tree_and_parent() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    let tree: Oid = "4b825dc642cb6eb9a060e54bf8d69288fbc4904b".parse().unwrap();
    let parent: Oid = "0123456789abcdef0123456789abcdef01234567".parse().unwrap();
    assert!(!repo.db().contains(&tree));

    let oid = repo.commit_tree(tree, Some(parent), "dangling").unwrap();
    assert!(repo.db().contains(&oid));
}

#[test]
fn reading_missing_object_is_not_found() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    let oid = Oid::new(b"absent");

    assert!(matches!(repo.cat_file(&oid), Err(Error::NotFound { .. })));
}

#[test]
fn truncated_object_file_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    let oid = repo.db().store(ObjectKind::Blob, &[42u8; 4096]).unwrap();

    let path = repo.db().object_path(&oid);
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    assert!(matches!(repo.cat_file(&oid), Err(Error::CorruptObject(_))));
}

#[test]
fn ls_tree_rejects_non_tree() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    let oid = repo.db().store(ObjectKind::Blob, b"not a tree").unwrap();

    assert!(matches!(repo.ls_tree(&oid), Err(Error::InvalidInput(_))));
}

#[test]
fn hand_built_tree_matches_builder_output() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    fs::create_dir(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/guide.md"), "# guide\n").unwrap();
    fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();

    let mut docs = Tree::new();
    docs.add_entry(
        Mode::Regular,
        "guide.md",
        repo.db().hash(ObjectKind::Blob, b"# guide\n"),
    )
    .unwrap();
    let mut root = Tree::new();
    root.add_entry(Mode::Directory, "docs", repo.db().hash(ObjectKind::Tree, &docs.to_bytes()))
        .unwrap();
    root.add_entry(
        Mode::Regular,
        "main.rs",
        repo.db().hash(ObjectKind::Blob, b"fn main() {}\n"),
    )
    .unwrap();

    let expected = repo.db().store_object(root).unwrap();
    assert_eq!(repo.write_tree().unwrap(), Some(expected));
}

#[test]
fn write_tree_under_relative_root() {
    let dir = TempDir::new_in(".").unwrap();
    assert!(dir.path().is_relative());
    let repo = open(&dir);
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("a.txt"), "x").unwrap();
    fs::write(dir.path().join("sub/b.txt"), "y").unwrap();

    let oid = repo.write_tree().unwrap().unwrap();
    let tree = repo.ls_tree(&oid).unwrap();
    let names: Vec<_> = tree.entries().map(|e| e.name().to_string()).collect();
    assert_eq!(names, ["a.txt", "sub"]);
    assert_eq!(tree.entries().next().unwrap().oid(), &Oid::new(b"blob 1\0x"));
}

#[test]
fn cat_file_lists_foreign_tree_modes() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    let target = Oid::new(b"target");
    let mut payload = Vec::new();
    for record in ["120000 link\0", "160000 vendor\0", "100644 a\0", "100644 a\0"] {
        payload.extend_from_slice(record.as_bytes());
        payload.extend_from_slice(target.as_bytes());
    }
    let oid = repo.db().store(ObjectKind::Tree, &payload).unwrap();

    let text = String::from_utf8(repo.cat_file(&oid).unwrap().pretty().unwrap()).unwrap();
    assert_eq!(
        text,
        format!(
            "120000 blob {target}\tlink\n\
             160000 commit {target}\tvendor\n\
             100644 blob {target}\ta\n\
             100644 blob {target}\ta\n"
        )
    );
}
