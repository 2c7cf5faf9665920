use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::FromArgMatches;
use log::{info, warn};

use hashbank::cli::Args;
use hashbank::error::{HashbankError, Result};
use hashbank::executor::{CommandExecutor, RealSystem};
use hashbank::record::{SourceMeta, WriteStats};
use hashbank::scan::Scanner;
use hashbank::sniff::{self, ImageKind};
use hashbank::store::WhitelistStore;
use hashbank::{hashing, logging, unpack, utils};

fn main() {
    let matches = match Args::build_command().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => e.exit(),
    };
    let args = match Args::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    let _log_guard = logging::init_logging(args.debug);

    if let Err(e) = run_app(args, &RealSystem) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app<E: CommandExecutor>(args: Args, executor: &E) -> Result<()> {
    let source = std::path::absolute(&args.source)?;
    if !source.exists() {
        // Walking a nonexistent path would silently ingest nothing.
        return Err(HashbankError::InvalidPath(source));
    }
    utils::ensure_readable(&source)?;

    let mut store = WhitelistStore::open(&args.output)?;
    let outcome = ingest(&source, &args, &mut store, executor);
    // The handle is released on every path: explicitly here, through
    // Drop if close itself fails.
    let closed = store.close();
    let totals = outcome?;
    closed?;

    println!("Records processed:  {}", totals.processed);
    println!("Already in store:   {}", totals.duplicates);
    println!("Records replaced:   {}", totals.added);
    Ok(())
}

fn ingest<E: CommandExecutor>(
    source: &Path,
    args: &Args,
    store: &mut WhitelistStore,
    executor: &E,
) -> Result<WriteStats> {
    info!("New source: {}...", source.display());

    let checksum = if source.is_file() {
        let checksum = hashing::md5_file(source)?;
        if let Some(meta) = store.source_seen(&checksum)? {
            info!(
                "Source already processed at unix time {} (id {:?}), skipping",
                meta.processed, meta.source_id
            );
            return Ok(WriteStats::default());
        }
        Some(checksum)
    } else {
        None
    };

    // Keep unpack staging and any mount alive for the duration of the scan.
    let mut scratch: Option<tempfile::TempDir> = None;
    let mut mount_guard: Option<unpack::MountGuard<'_, E>> = None;

    let rootpath: PathBuf = if source.is_file() {
        let temp = tempfile::tempdir()?;

        let mut image = source.to_path_buf();
        let mut kind = sniff::classify(&image);
        if kind == ImageKind::SparseExt4 {
            info!("Smells like a sparse ext4 image");
            image = unpack::unsparse(&image, executor)?;
            // The raw image underneath decides how to proceed.
            kind = sniff::classify(&image);
        }

        let root = match kind {
            ImageKind::BootImage => {
                info!("Smells like an Android boot image");
                unpack::unpack_boot_image(&image, temp.path(), executor)?
            }
            ImageKind::Yaffs2 => {
                info!("Smells like a yaffs2 image");
                unpack::unpack_yaffs(&image, temp.path(), executor)?
            }
            ImageKind::BootloaderImage => {
                warn!("Bootloader images are not supported yet, nothing to ingest");
                return Ok(WriteStats::default());
            }
            ImageKind::Ext4 | ImageKind::SparseExt4 | ImageKind::Unknown => {
                if kind == ImageKind::Ext4 {
                    info!("Smells like an ext4 image, mounting");
                } else {
                    info!("Doesn't smell familiar, trying to mount");
                }
                let mountdir = unpack::mount_image(&image, temp.path(), executor)?;
                mount_guard = Some(unpack::MountGuard::new(mountdir.clone(), executor));
                mountdir
            }
        };
        scratch = Some(temp);
        root
    } else {
        info!("Assuming this is the root of a file tree");
        source.to_path_buf()
    };

    let totals = Scanner::new(store)
        .replace(!args.keep_existing)
        .scan(
            &rootpath,
            args.source_id.as_deref(),
            args.threat,
            args.trust,
        )?;

    // Unmount before the staging directory disappears underneath it.
    drop(mount_guard);
    drop(scratch);

    if let Some(checksum) = checksum {
        let processed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        store.record_source(
            &checksum,
            &SourceMeta {
                processed,
                source_id: args.source_id.clone(),
                source: source.display().to_string(),
            },
        )?;
    }
    Ok(totals)
}
