//! Best-effort classification of firmware image files by magic bytes.
//!
//! Each probe inspects a fixed offset in the first 2048 bytes. Probes run
//! in priority order and the first match wins; the formats are not mutually
//! exclusive, so the order is part of the contract. Classification is
//! advisory: anything unreadable or too short is `Unknown`, never an error.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::constants::{
    BOOT_MAGIC, BOOTLDR_MAGIC, EXT4_MAGIC, EXT4_MAGIC_OFFSET, SNIFF_PREFIX_LEN, SPARSE_MAGIC,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    BootImage,
    BootloaderImage,
    SparseExt4,
    Ext4,
    Yaffs2,
    Unknown,
}

/// Classify `path` by sniffing magic bytes. Reads at most 2048 bytes.
pub fn classify(path: &Path) -> ImageKind {
    let mut prefix = [0u8; SNIFF_PREFIX_LEN];
    let len = match read_prefix(path, &mut prefix) {
        Ok(n) => n,
        Err(e) => {
            debug!("Cannot sniff {}: {}", path.display(), e);
            return ImageKind::Unknown;
        }
    };
    let kind = classify_prefix(&prefix[..len]);
    debug!("{} sniffed as {:?}", path.display(), kind);
    kind
}

fn classify_prefix(prefix: &[u8]) -> ImageKind {
    // Boot and bootloader images carry their magic in a full header page.
    if prefix.len() >= SNIFF_PREFIX_LEN {
        if &prefix[0..8] == BOOT_MAGIC {
            return ImageKind::BootImage;
        }
        if &prefix[0..8] == BOOTLDR_MAGIC {
            return ImageKind::BootloaderImage;
        }
    }
    if looks_like_yaffs2(prefix) {
        return ImageKind::Yaffs2;
    }
    if prefix.len() >= 4 && read_u32_le(prefix, 0) == SPARSE_MAGIC {
        return ImageKind::SparseExt4;
    }
    if prefix.len() > EXT4_MAGIC_OFFSET + 1 && read_u16_le(prefix, EXT4_MAGIC_OFFSET) == EXT4_MAGIC {
        return ImageKind::Ext4;
    }
    ImageKind::Unknown
}

/// Heuristic from the yaffs2 object header layout: the object type is a
/// small enum value and the name checksum field is fixed at 0xFFFF
/// ("no longer used"). Best effort, not a format guarantee.
fn looks_like_yaffs2(prefix: &[u8]) -> bool {
    if prefix.len() < 10 {
        return false;
    }
    let obj_type = read_u32_le(prefix, 0);
    obj_type < 5 && prefix[8] == 0xff && prefix[9] == 0xff
}

fn read_prefix(path: &Path, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut fh = File::open(path)?;
    let mut total = 0;
    // A single read may come up short on pipes and small files; keep going.
    while total < buf.len() {
        let n = fh.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn read_u16_le(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_magic_needs_full_header_page() {
        // The magic alone is not enough; a real image always has the
        // complete 2048-byte header page.
        assert_eq!(classify_prefix(b"ANDROID!"), ImageKind::Unknown);

        let mut full = vec![0u8; SNIFF_PREFIX_LEN];
        full[0..8].copy_from_slice(b"ANDROID!");
        assert_eq!(classify_prefix(&full), ImageKind::BootImage);

        full[0..8].copy_from_slice(b"BOOTLDR!");
        assert_eq!(classify_prefix(&full), ImageKind::BootloaderImage);
    }

    #[test]
    fn test_yaffs2_heuristic_bounds() {
        let mut header = [0u8; 10];
        header[0] = 3; // object type
        header[8] = 0xff;
        header[9] = 0xff;
        assert_eq!(classify_prefix(&header), ImageKind::Yaffs2);

        header[0] = 5; // out of the enum range
        assert_eq!(classify_prefix(&header), ImageKind::Unknown);

        header[0] = 3;
        header[9] = 0x00; // checksum sentinel broken
        assert_eq!(classify_prefix(&header), ImageKind::Unknown);
    }

    #[test]
    fn test_sparse_magic_is_little_endian() {
        assert_eq!(
            classify_prefix(&[0x3a, 0xff, 0x26, 0xed]),
            ImageKind::SparseExt4
        );
        assert_eq!(
            classify_prefix(&[0xed, 0x26, 0xff, 0x3a]),
            ImageKind::Unknown
        );
    }

    #[test]
    fn test_ext4_superblock_magic_offset() {
        let mut image = vec![0u8; 4096];
        image[EXT4_MAGIC_OFFSET] = 0x53;
        image[EXT4_MAGIC_OFFSET + 1] = 0xef;
        assert_eq!(classify_prefix(&image), ImageKind::Ext4);

        // One byte short of the magic is not enough.
        assert_eq!(
            classify_prefix(&image[..EXT4_MAGIC_OFFSET + 1]),
            ImageKind::Unknown
        );
    }

    #[test]
    fn test_zero_length_input_is_unknown() {
        assert_eq!(classify_prefix(&[]), ImageKind::Unknown);
    }
}
