use std::io::Cursor;

use hashbank::bootimg::{self, BootImageHeader, HEADER_LEN};
use hashbank::error::HashbankError;

fn header_for(page_size: u32, kernel: &[u8], ramdisk: &[u8]) -> BootImageHeader {
    let mut name = [0u8; 16];
    name[..9].copy_from_slice(b"testimage");
    let mut cmdline = [0u8; 512];
    cmdline[..22].copy_from_slice(b"console=ttyHSL0,115200");
    BootImageHeader {
        magic: *b"ANDROID!",
        kernel_size: kernel.len() as u32,
        kernel_addr: 0x1000_8000,
        ramdisk_size: ramdisk.len() as u32,
        ramdisk_addr: 0x1100_0000,
        second_size: 0,
        second_addr: 0x1010_0000,
        tags_addr: 0x1000_0100,
        page_size,
        name,
        cmdline,
        id: [7u8; 32],
        extra_cmdline: [0u8; 1024],
    }
}

/// Lays out header page, kernel pages and ramdisk pages the way a real
/// boot.img does.
fn build_image(page_size: u32, kernel: &[u8], ramdisk: &[u8]) -> Vec<u8> {
    let header = header_for(page_size, kernel, ramdisk);
    let page = page_size as usize;
    let mut image = header.to_bytes().to_vec();
    image.resize(page, 0); // header page
    image.extend_from_slice(kernel);
    let kernel_end = page * (1 + kernel.len().div_ceil(page));
    image.resize(kernel_end, 0);
    image.extend_from_slice(ramdisk);
    image.resize(kernel_end + page * ramdisk.len().div_ceil(page), 0);
    image
}

#[test]
fn test_header_round_trip() {
    let header = header_for(2048, &[0u8; 5000], &[0u8; 3000]);
    let decoded = BootImageHeader::parse(&header.to_bytes()).unwrap();
    assert_eq!(decoded, header);
}

#[test]
fn test_header_struct_len_is_fixed() {
    let header = header_for(2048, &[0u8; 100], &[0u8; 100]);
    assert_eq!(header.to_bytes().len(), HEADER_LEN);
    assert_eq!(HEADER_LEN, 1632);
}

#[test]
fn test_extracts_exact_payloads() {
    let kernel: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
    let ramdisk: Vec<u8> = (0..3000u32).map(|i| (i % 253) as u8).collect();
    let image = build_image(2048, &kernel, &ramdisk);
    let mut stream = Cursor::new(image);

    assert_eq!(bootimg::extract_kernel(&mut stream).unwrap(), kernel);
    assert_eq!(bootimg::extract_ramdisk(&mut stream).unwrap(), ramdisk);
}

#[test]
fn test_ramdisk_follows_page_rounded_kernel() {
    // kernel of 5000 bytes occupies 3 pages of 2048
    let header = header_for(2048, &[0u8; 5000], &[0u8; 3000]);
    assert_eq!(header.kernel_offset(), 2048);
    assert_eq!(header.ramdisk_offset(), 8192);

    // an exact two-page kernel adds no phantom page
    let header = header_for(2048, &[0u8; 4096], &[0u8; 3000]);
    assert_eq!(header.ramdisk_offset(), 6144);
}

#[test]
fn test_exact_multiple_kernel_extraction() {
    let kernel = vec![0xabu8; 4096];
    let ramdisk = vec![0xcdu8; 1500];
    let image = build_image(2048, &kernel, &ramdisk);
    let mut stream = Cursor::new(image);

    assert_eq!(bootimg::extract_ramdisk(&mut stream).unwrap(), ramdisk);
}

#[test]
fn test_truncated_image_is_rejected_not_short_read() {
    let kernel = vec![0x11u8; 5000];
    let ramdisk = vec![0x22u8; 3000];
    let mut image = build_image(2048, &kernel, &ramdisk);
    // Chop the stream in the middle of the ramdisk region.
    image.truncate(8192 + 1000);
    let mut stream = Cursor::new(image);

    match bootimg::extract_ramdisk(&mut stream) {
        Err(HashbankError::TruncatedImage {
            offset,
            needed,
            available,
        }) => {
            assert_eq!(offset, 8192);
            assert_eq!(needed, 3000);
            assert_eq!(available, 9192);
        }
        other => panic!("expected truncated image error, got {:?}", other),
    }
}

#[test]
fn test_header_shorter_than_struct_is_truncated() {
    let mut stream = Cursor::new(vec![0u8; 100]);
    assert!(matches!(
        bootimg::parse_header(&mut stream),
        Err(HashbankError::TruncatedImage { .. })
    ));
}

#[test]
fn test_wrong_magic_is_format_error() {
    let mut blob = header_for(2048, &[0u8; 100], &[0u8; 100]).to_bytes().to_vec();
    blob[0..8].copy_from_slice(b"NOTANDRO");
    blob.resize(4096, 0);
    let mut stream = Cursor::new(blob);
    assert!(matches!(
        bootimg::parse_header(&mut stream),
        Err(HashbankError::Format(_))
    ));
}

#[test]
fn test_name_is_nul_trimmed() {
    let header = header_for(2048, &[0u8; 100], &[0u8; 100]);
    assert_eq!(header.name_str(), "testimage");
}
