mod common;

use std::sync::Arc;

use block_dev::{BlockDevice, RamDisk};
use fat::volume::fat::FatEntry;
use fat::{BLOCK_SIZE, BlockId, FatFileSystem, MAX_BLOCKS};
use vfs::{DirEntryType, Error, Permissions};

use self::common::{bytes, names, text, volume};

const NO_LINES: [&str; 0] = [];

#[test]
fn scenario() {
    let (_, mut fs) = volume(MAX_BLOCKS);
    fs.mkdir("/a").unwrap();
    fs.cd("/a").unwrap();

    let content = text(9000);
    let free = fs.free_blocks();
    fs.create("b", &content).unwrap();
    assert_eq!(free - 3, fs.free_blocks());

    let listing = fs.ls().unwrap();
    assert_eq!(1, listing.len());
    assert_eq!("b", listing[0].name);
    assert_eq!(Some(9000), listing[0].size);
    assert_eq!(bytes(&content), fs.cat("b").unwrap());

    fs.mv("b", "/").unwrap();
    assert!(fs.ls().unwrap().is_empty());
    fs.cd("/").unwrap();
    assert_eq!(names(&fs), ["a", "b"]);
    assert_eq!(bytes(&content), fs.cat("/b").unwrap());

    let free = fs.free_blocks();
    fs.rm("/b").unwrap();
    assert_eq!(free + 3, fs.free_blocks());
    assert_eq!(names(&fs), ["a"]);
}

#[test]
fn freed_blocks_are_reused_first() {
    // table, root, `/a` and three blocks of content
    let (_, mut fs) = volume(6);
    fs.mkdir("/a").unwrap();
    fs.create("/a/b", &text(9000)).unwrap();
    assert_eq!(0, fs.free_blocks());

    fs.mv("/a/b", "/").unwrap();
    fs.rm("/b").unwrap();
    assert_eq!(3, fs.free_blocks());

    let content = text(8192);
    fs.create("c", &content).unwrap();
    assert_eq!(bytes(&content), fs.cat("c").unwrap());
    assert_eq!(1, fs.free_blocks());

    let fat = fs.fat();
    assert_eq!(Some(FatEntry::Next(BlockId::new(4))), fat.get(BlockId::new(3)));
    assert_eq!(Some(FatEntry::Eof), fat.get(BlockId::new(4)));
    assert_eq!(Some(FatEntry::Free), fat.get(BlockId::new(5)));
}

#[test]
fn partial_allocation_is_undone() {
    let (disk, mut fs) = volume(4);
    fs.create("f", &text(4096)).unwrap();
    assert_eq!(1, fs.free_blocks());

    let fat = fs.fat().clone();
    let image = disk.snapshot();
    assert_eq!(Err(Error::OutOfBlocks), fs.create("g", &text(8192)));

    assert_eq!(&fat, fs.fat());
    assert!(image == disk.snapshot());
    assert_eq!(names(&fs), ["f"]);
}

#[test]
fn exhaustion_leaves_volume_untouched() {
    let (disk, mut fs) = volume(4);
    fs.create("f", &text(4096)).unwrap();
    fs.create("g", &text(4096)).unwrap();
    assert_eq!(0, fs.free_blocks());

    let fat = fs.fat().clone();
    let image = disk.snapshot();
    assert_eq!(Err(Error::OutOfBlocks), fs.create("h", &text(10)));
    assert_eq!(Err(Error::OutOfBlocks), fs.cp("f", "h"));
    assert_eq!(Err(Error::OutOfBlocks), fs.append("g", "f"));
    assert_eq!(Err(Error::OutOfBlocks), fs.mkdir("d"));

    assert_eq!(&fat, fs.fat());
    assert!(image == disk.snapshot());
    assert_eq!(names(&fs), ["f", "g"]);

    // Files without content need no blocks.
    fs.create("empty", NO_LINES).unwrap();
    assert_eq!(Some(0), fs.ls().unwrap()[2].size);
}

#[test]
fn non_empty_directory_stays() {
    let (disk, mut fs) = volume(16);
    fs.mkdir("d").unwrap();
    fs.create("d/f", &text(10)).unwrap();

    let image = disk.snapshot();
    assert_eq!(Err(Error::DirectoryNotEmpty), fs.rm("d"));
    assert!(image == disk.snapshot());

    fs.rm("d/f").unwrap();
    let free = fs.free_blocks();
    fs.rm("d").unwrap();
    assert_eq!(free + 1, fs.free_blocks());
    assert!(fs.ls().unwrap().is_empty());
}

#[test]
fn full_directory() {
    let (_, mut fs) = volume(16);
    for i in 0..62 {
        fs.create(&format!("f{i}"), NO_LINES).unwrap();
    }
    assert_eq!(Err(Error::DirectoryFull), fs.create("one-more", NO_LINES));
    assert_eq!(Err(Error::DirectoryFull), fs.mkdir("d"));
    assert_eq!(16 - 2, fs.free_blocks());
    assert_eq!(62, fs.ls().unwrap().len());
}

#[test]
fn names_are_checked() {
    let (_, mut fs) = volume(16);
    fs.create("f", NO_LINES).unwrap();

    assert_eq!(Err(Error::NameConflict), fs.create("f", NO_LINES));
    assert_eq!(Err(Error::NameConflict), fs.mkdir("f"));
    assert_eq!(Err(Error::NameInvalid), fs.create(&"n".repeat(56), NO_LINES));
    assert_eq!(Err(Error::NameInvalid), fs.mkdir("/"));
    assert_eq!(Err(Error::NameInvalid), fs.mkdir(".."));
    assert_eq!(Err(Error::InvalidPath), fs.create("nope/f", NO_LINES));
    assert_eq!(Err(Error::InvalidPath), fs.create("f/g", NO_LINES));
    assert_eq!(Err(Error::NotFound), fs.cat("missing"));
    assert_eq!(Err(Error::InvalidPath), fs.cat("/"));

    fs.create(&"n".repeat(55), NO_LINES).unwrap();
}

#[test]
fn content_stops_at_blank_line() {
    let (_, mut fs) = volume(16);
    fs.create("f", ["one", "two", "", "ignored"]).unwrap();
    assert_eq!(b"one\ntwo\n".to_vec(), fs.cat("f").unwrap());
    assert_eq!(Some(8), fs.ls().unwrap()[0].size);
}

#[test]
fn files_and_directories() {
    let (_, mut fs) = volume(16);
    fs.mkdir("d").unwrap();
    fs.create("f", &text(10)).unwrap();

    assert_eq!(Err(Error::IsADirectory), fs.cat("d"));
    assert_eq!(Err(Error::NotAFile), fs.cp("d", "e"));
    assert_eq!(Err(Error::NotAFile), fs.mv("d", "e"));
    assert_eq!(Err(Error::IsADirectory), fs.append("f", "d"));
    assert_eq!(Err(Error::IsADirectory), fs.append("d", "f"));
    assert_eq!(Err(Error::NotADirectory), fs.cd("f"));

    let listing = fs.ls().unwrap();
    assert_eq!(DirEntryType::Directory, listing[0].ty);
    assert_eq!(None, listing[0].size);
    assert_eq!(DirEntryType::Regular, listing[1].ty);
    assert_eq!(Some(10), listing[1].size);
}

#[test]
fn copies() {
    let (_, mut fs) = volume(64);
    let content = text(9000);
    fs.create("f", &content).unwrap();
    fs.chmod("6", "f").unwrap();
    fs.mkdir("d").unwrap();
    let free = fs.free_blocks();

    fs.cp("f", "g").unwrap();
    fs.cp("f", "d").unwrap();
    fs.cp("g", "d/h").unwrap();
    assert_eq!(free - 9, fs.free_blocks());
    for path in ["f", "g", "d/f", "d/h", "/d/../g"] {
        assert_eq!(bytes(&content), fs.cat(path).unwrap(), "{path}");
    }

    let listing = fs.ls().unwrap();
    assert_eq!("g", listing[2].name);
    assert_eq!(Permissions::from_bits_truncate(6), listing[2].perm);

    assert_eq!(Err(Error::NameConflict), fs.cp("f", "g"));
    assert_eq!(Err(Error::NameConflict), fs.cp("f", "d/"));
    assert_eq!(Err(Error::NotFound), fs.cp("nope", "d/"));
}

#[test]
fn moves() {
    let (_, mut fs) = volume(64);
    let content = text(10);
    fs.create("f", &content).unwrap();
    fs.mkdir("d").unwrap();
    fs.mkdir("d/e").unwrap();
    let free = fs.free_blocks();

    fs.mv("f", "g").unwrap();
    assert_eq!(names(&fs), ["g", "d"]);

    fs.mv("g", "d/e/").unwrap();
    assert_eq!(names(&fs), ["d"]);
    assert_eq!(bytes(&content), fs.cat("d/e/g").unwrap());

    fs.cd("d/e").unwrap();
    fs.mv("g", "../h").unwrap();
    assert!(fs.ls().unwrap().is_empty());
    fs.cd("..").unwrap();
    assert_eq!(names(&fs), ["e", "h"]);

    fs.mv("h", "..").unwrap();
    fs.cd("/").unwrap();
    assert_eq!(names(&fs), ["h", "d"]);
    assert_eq!(bytes(&content), fs.cat("h").unwrap());
    assert_eq!(free, fs.free_blocks());

    fs.create("x", NO_LINES).unwrap();
    assert_eq!(Err(Error::NameConflict), fs.mv("x", "h"));
    assert_eq!(Err(Error::NotFound), fs.mv("missing", "y"));
    assert_eq!(Err(Error::NameInvalid), fs.mv("x", &"n".repeat(56)));
}

#[test]
fn file_rights() {
    let (_, mut fs) = volume(16);
    let content = text(10);
    fs.create("f", &content).unwrap();

    fs.chmod("2", "f").unwrap();
    assert_eq!(Err(Error::AccessDenied), fs.cat("f"));
    assert_eq!(Err(Error::AccessDenied), fs.cp("f", "g"));
    fs.mv("f", "g").unwrap();

    fs.chmod("4", "g").unwrap();
    assert_eq!(bytes(&content), fs.cat("g").unwrap());
    assert_eq!(Err(Error::AccessDenied), fs.rm("g"));
    assert_eq!(Err(Error::AccessDenied), fs.append("g", "g"));

    fs.chmod("0", "g").unwrap();
    assert_eq!(Err(Error::AccessDenied), fs.mv("g", "h"));
    assert_eq!("---", fs.ls().unwrap()[0].perm.to_string());

    assert_eq!(Err(Error::InvalidArgument), fs.chmod("8", "g"));
    assert_eq!(Err(Error::InvalidArgument), fs.chmod("rw", "g"));
    assert_eq!(Err(Error::NotFound), fs.chmod("7", "h"));
}

#[test]
fn directory_rights() {
    let (_, mut fs) = volume(16);
    fs.mkdir("d").unwrap();
    fs.create("d/f", &text(10)).unwrap();

    fs.chmod("5", "d").unwrap();
    assert_eq!("r-x", fs.ls().unwrap()[0].perm.to_string());
    assert_eq!(Err(Error::AccessDenied), fs.create("d/g", NO_LINES));
    assert_eq!(Err(Error::AccessDenied), fs.mkdir("d/e"));
    assert_eq!(Err(Error::AccessDenied), fs.cp("d/f", "d/g"));
    assert_eq!(Err(Error::AccessDenied), fs.rm("d"));

    fs.cd("d").unwrap();
    assert_eq!(names(&fs), ["f"]);
    assert_eq!(Err(Error::AccessDenied), fs.create("g", NO_LINES));

    // The working directory picks up rights changed through another path.
    fs.chmod("3", "/d").unwrap();
    assert_eq!(Err(Error::AccessDenied), fs.ls());

    fs.cd("/").unwrap();
    assert_eq!(Err(Error::AccessDenied), fs.cd("d"));
    fs.chmod("7", "d").unwrap();
    fs.cd("d").unwrap();
    assert_eq!(names(&fs), ["f"]);
}

#[test]
fn dot_dot_checks_the_parents_own_rights() {
    let (_, mut fs) = volume(16);
    fs.mkdir("a").unwrap();
    fs.mkdir("a/b").unwrap();
    fs.cd("a/b").unwrap();

    // b's `..` slot still holds the rights `a` had when b was made.
    fs.chmod("3", "/a").unwrap();
    assert_eq!(Err(Error::AccessDenied), fs.cd(".."));
    assert_eq!(Err(Error::AccessDenied), fs.cd("/a"));
    assert_eq!("/a/b", fs.pwd().unwrap());

    fs.chmod("4", "/a").unwrap();
    fs.cd("..").unwrap();
    assert_eq!("/a", fs.pwd().unwrap());
}

#[test]
fn appends() {
    let (_, mut fs) = volume(16);
    let full = text(4096);
    let short = text(10);
    fs.create("full", &full).unwrap();
    fs.create("short", &short).unwrap();
    fs.create("empty", NO_LINES).unwrap();
    let free = fs.free_blocks();

    // The last block of `full` has no room left.
    fs.append("short", "full").unwrap();
    assert_eq!(free - 1, fs.free_blocks());
    assert_eq!([bytes(&full), bytes(&short)].concat(), fs.cat("full").unwrap());
    assert_eq!(Some(4106), fs.ls().unwrap()[0].size);

    fs.append("short", "short").unwrap();
    assert_eq!(free - 1, fs.free_blocks());
    assert_eq!([bytes(&short), bytes(&short)].concat(), fs.cat("short").unwrap());

    fs.append("full", "empty").unwrap();
    assert_eq!(free - 3, fs.free_blocks());
    assert_eq!(fs.cat("full").unwrap(), fs.cat("empty").unwrap());

    // Spans the end of a partly filled block.
    let edge = text(4000);
    fs.create("edge", &edge).unwrap();
    fs.append("edge", "edge").unwrap();
    assert_eq!([bytes(&edge), bytes(&edge)].concat(), fs.cat("edge").unwrap());
    assert_eq!(free - 5, fs.free_blocks());
}

#[test]
fn navigation() {
    let (_, mut fs) = volume(16);
    fs.mkdir("a").unwrap();
    fs.mkdir("a/b").unwrap();
    fs.create("f", NO_LINES).unwrap();
    assert_eq!("/", fs.pwd().unwrap());
    assert!(fs.cwd().is_root());

    fs.cd("a/b").unwrap();
    assert_eq!("/a/b", fs.pwd().unwrap());
    assert!(!fs.cwd().is_root());
    assert_eq!(Ok(BlockId::new(3)), fs.resolve("x"));

    fs.cd("..").unwrap();
    assert_eq!("/a", fs.pwd().unwrap());
    fs.cd("../a/./b").unwrap();
    assert_eq!("/a/b", fs.pwd().unwrap());
    fs.cd("/a").unwrap();
    assert_eq!("/a", fs.pwd().unwrap());
    fs.cd("/").unwrap();
    assert_eq!("/", fs.pwd().unwrap());
    fs.cd("..").unwrap();
    assert_eq!("/", fs.pwd().unwrap());

    assert_eq!(Err(Error::NotADirectory), fs.cd("f"));
    assert_eq!(Err(Error::NotFound), fs.cd("nope"));
    assert_eq!(Err(Error::InvalidPath), fs.cd("nope/b"));
    assert_eq!(Err(Error::InvalidPath), fs.cd("a/"));
    assert_eq!(Ok(BlockId::ROOT), fs.resolve("/"));
    assert_eq!(Ok(BlockId::new(2)), fs.resolve("/a/anything"));
}

#[test]
fn working_directory_cannot_be_removed() {
    let (_, mut fs) = volume(16);
    fs.mkdir("a").unwrap();
    fs.cd("a").unwrap();

    assert_eq!(Err(Error::InvalidArgument), fs.rm("/a"));
    fs.cd("/").unwrap();
    fs.rm("a").unwrap();
}

#[test]
fn reload() {
    let (disk, mut fs) = volume(32);
    let content = text(5000);
    fs.mkdir("d").unwrap();
    fs.create("d/f", &content).unwrap();
    fs.chmod("4", "d/f").unwrap();
    fs.cd("d").unwrap();

    let dev: Arc<dyn BlockDevice> = disk.clone();
    let mut loaded = FatFileSystem::load(&dev).unwrap();
    assert_eq!(fs.fat(), loaded.fat());
    assert_eq!("/", loaded.pwd().unwrap());
    assert_eq!(bytes(&content), loaded.cat("d/f").unwrap());

    loaded.cd("d").unwrap();
    assert_eq!(fs.ls(), loaded.ls());
    assert_eq!(Permissions::from_bits_truncate(4), loaded.ls().unwrap()[0].perm);
}

#[test]
fn device_sizes() {
    let blank: Arc<dyn BlockDevice> = Arc::new(RamDisk::new(BLOCK_SIZE, 32));
    assert!(matches!(FatFileSystem::load(&blank), Err(Error::IoFailure)));

    let tiny: Arc<dyn BlockDevice> = Arc::new(RamDisk::new(BLOCK_SIZE, 1));
    assert!(matches!(FatFileSystem::format(&tiny), Err(Error::InvalidArgument)));

    let huge: Arc<dyn BlockDevice> = Arc::new(RamDisk::new(BLOCK_SIZE, MAX_BLOCKS + 8));
    let fs = FatFileSystem::format(&huge).unwrap();
    assert_eq!(MAX_BLOCKS, fs.fat().len());
    assert_eq!(MAX_BLOCKS - 2, fs.free_blocks());
}
