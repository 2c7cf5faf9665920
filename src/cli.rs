use clap::Parser;
use std::path::PathBuf;

use crate::record::{ThreatLevel, TrustLevel};

const BANNER: &str = concat!(
    r#"
hashbank v"#,
    env!("CARGO_PKG_VERSION"),
    r#"
[ Hash every file. Trust the known. ]
"#
);

#[derive(Parser, Debug)]
#[command(
    name = "hashbank",
    about = "Build hash whitelists from image files or directory trees",
    long_version = concat!("\rhashbank whitelist builder v", env!("CARGO_PKG_VERSION"))
)]
pub struct Args {
    /// Image file or directory to ingest
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Source identifier stored with the hashes
    #[arg(short = 'i', long = "id", value_name = "ID")]
    pub source_id: Option<String>,

    /// Threat level of these files
    #[arg(short, long, value_enum, default_value = "good")]
    pub threat: ThreatLevel,

    /// Trust level of these files
    #[arg(short = 'r', long, value_enum, default_value = "high")]
    pub trust: TrustLevel,

    /// Output database. If existing, the data is added
    #[arg(short, long, value_name = "PATH", default_value = "hashes.db")]
    pub output: PathBuf,

    /// Keep existing records instead of replacing them on digest collision
    #[arg(long)]
    pub keep_existing: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

impl Args {
    pub fn build_command() -> clap::Command {
        use clap::CommandFactory;
        let cmd = Self::command();
        cmd.after_help(format!(
            "Details:
{}
  hashbank <SOURCE> [OPTIONS]
    Ingest a source into the whitelist database.
    Arguments:
      SOURCE                Image file or root of a file tree.
    Behavior:
      - A directory is walked as-is; every regular file is hashed with
        md5, sha1 and sha256 and stored under all three digests.
      - An image file is classified by magic bytes first. Boot images are
        unpacked (kernel + ramdisk), yaffs2 images go through unyaffs,
        sparse ext4 images through simg2img, and anything mountable is
        mounted read-only. The resulting tree is then walked.
      - Symbolic links are never followed.
    External tools used when unpacking: simg2img, unyaffs, cpio, mount.
",
            BANNER
        ))
    }
}
