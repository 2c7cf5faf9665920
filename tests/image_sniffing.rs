use hashbank::sniff::{self, ImageKind};
use std::fs;
use std::path::Path;

fn write_image(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn boot_header_page(magic: &[u8; 8]) -> Vec<u8> {
    let mut page = vec![0u8; 2048];
    page[0..8].copy_from_slice(magic);
    page
}

#[test]
fn test_classifies_by_magic_not_extension() {
    // Extensions lie all the time on firmware dumps; only content counts.
    let temp = tempfile::tempdir().unwrap();

    let fake_txt = write_image(temp.path(), "notes.txt", &boot_header_page(b"ANDROID!"));
    assert_eq!(sniff::classify(&fake_txt), ImageKind::BootImage);

    let fake_img = write_image(temp.path(), "boot.img", b"This is just text");
    assert_eq!(sniff::classify(&fake_img), ImageKind::Unknown);
}

#[test]
fn test_boot_and_bootloader_magics() {
    let temp = tempfile::tempdir().unwrap();

    let boot = write_image(temp.path(), "boot.img", &boot_header_page(b"ANDROID!"));
    assert_eq!(sniff::classify(&boot), ImageKind::BootImage);

    let bootldr = write_image(temp.path(), "bootloader.img", &boot_header_page(b"BOOTLDR!"));
    assert_eq!(sniff::classify(&bootldr), ImageKind::BootloaderImage);

    // The magic without the rest of the header page is not a boot image.
    let stub = write_image(temp.path(), "stub.img", b"ANDROID!");
    assert_eq!(sniff::classify(&stub), ImageKind::Unknown);
}

#[test]
fn test_yaffs2_object_header_heuristic() {
    let temp = tempfile::tempdir().unwrap();

    let mut header = vec![0u8; 10];
    header[0] = 1;
    header[8] = 0xff;
    header[9] = 0xff;
    let yaffs = write_image(temp.path(), "system.img", &header);
    assert_eq!(sniff::classify(&yaffs), ImageKind::Yaffs2);

    header[0] = 9;
    let not_yaffs = write_image(temp.path(), "other.img", &header);
    assert_eq!(sniff::classify(&not_yaffs), ImageKind::Unknown);
}

#[test]
fn test_sparse_ext4_magic() {
    let temp = tempfile::tempdir().unwrap();
    let sparse = write_image(temp.path(), "userdata.img", &[0x3a, 0xff, 0x26, 0xed, 0x01, 0x00]);
    assert_eq!(sniff::classify(&sparse), ImageKind::SparseExt4);
}

#[test]
fn test_ext4_superblock_magic_at_authoritative_offset() {
    let temp = tempfile::tempdir().unwrap();
    let mut image = vec![0u8; 4096];
    // 1024 bytes padding + 0x38 into the superblock
    image[1080] = 0x53;
    image[1081] = 0xef;
    let ext4 = write_image(temp.path(), "system.img", &image);
    assert_eq!(sniff::classify(&ext4), ImageKind::Ext4);
}

#[test]
fn test_probe_priority_order() {
    let temp = tempfile::tempdir().unwrap();
    // Matches both the yaffs2 heuristic and the ext4 superblock magic;
    // the yaffs2 probe runs first and wins.
    let mut image = vec![0u8; 4096];
    image[0] = 2;
    image[8] = 0xff;
    image[9] = 0xff;
    image[1080] = 0x53;
    image[1081] = 0xef;
    let both = write_image(temp.path(), "ambiguous.img", &image);
    assert_eq!(sniff::classify(&both), ImageKind::Yaffs2);
}

#[test]
fn test_classify_is_total() {
    let temp = tempfile::tempdir().unwrap();

    let empty = write_image(temp.path(), "empty", b"");
    assert_eq!(sniff::classify(&empty), ImageKind::Unknown);

    assert_eq!(
        sniff::classify(&temp.path().join("does-not-exist")),
        ImageKind::Unknown
    );

    // A directory is not an image either.
    assert_eq!(sniff::classify(temp.path()), ImageKind::Unknown);
}
