/// Magic at the start of an Android boot image.
pub const BOOT_MAGIC: &[u8; 8] = b"ANDROID!";

/// Magic at the start of an AOSP bootloader image.
pub const BOOTLDR_MAGIC: &[u8; 8] = b"BOOTLDR!";

/// Sparse ext4 image header magic (stored little-endian).
pub const SPARSE_MAGIC: u32 = 0xed26_ff3a;

/// ext4 superblock magic value.
pub const EXT4_MAGIC: u16 = 0xef53;

/// Offset of the superblock magic from the start of an ext4 image:
/// 1024 bytes of padding, then 0x38 into the superblock.
pub const EXT4_MAGIC_OFFSET: usize = 1024 + 0x38;

/// Longest prefix any classification probe looks at (one boot header page).
pub const SNIFF_PREFIX_LEN: usize = 2048;

/// Chunk size for streaming file digests.
pub const HASH_CHUNK_SIZE: usize = 1024 * 1024;

/// Entries buffered per store write batch.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Application name for directory naming (XDG_STATE_HOME, etc.)
pub const APP_NAME: &str = "hashbank";
pub const LOG_DIR_NAME: &str = "logs";

/// Privilege escalation commands accepted for mounting images.
pub const ALLOWED_ROOT_CMDS: &[&str] = &["sudo", "doas", "run0", "pkexec"];
