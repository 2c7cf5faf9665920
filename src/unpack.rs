//! Unpacks container images into directory trees the scanner can walk.
//!
//! The heavy lifting is delegated to external tools (simg2img, unyaffs,
//! cpio, the OS mount command); this module owns argument construction,
//! exit-status checking and staging-directory hygiene. Everything goes
//! through [`CommandExecutor`] so the invocations stay testable.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Output;

use flate2::read::GzDecoder;
use log::info;

use crate::bootimg;
use crate::error::{HashbankError, Result};
use crate::executor::CommandExecutor;
use crate::utils;

/// Decompress a sparse ext4 image into a sibling file named
/// `unsparsed.<name>`, reusing it when it already exists. The result is
/// a raw image that wants classifying again.
pub fn unsparse<E: CommandExecutor>(image: &Path, executor: &E) -> Result<PathBuf> {
    let name = file_name(image)?;
    let out_path = image
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("unsparsed.{}", name));
    if out_path.exists() {
        info!(
            "Unsparsed image already found at {}, no need to unsparse",
            out_path.display()
        );
        return Ok(out_path);
    }
    require_tool(executor, "simg2img")?;
    let out = executor.run("simg2img", &[&path_str(image)?, &path_str(&out_path)?])?;
    check_status("simg2img", &out)?;
    info!("Unsparsed {} to {}", image.display(), out_path.display());
    Ok(out_path)
}

/// Unpack a yaffs2 image under `destdir/<image file name>/`.
pub fn unpack_yaffs<E: CommandExecutor>(
    image: &Path,
    destdir: &Path,
    executor: &E,
) -> Result<PathBuf> {
    info!("Extracting yaffs2 image...");
    let extractdir = fresh_subdir(destdir, image)?;
    require_tool(executor, "unyaffs")?;
    let out = executor.run("unyaffs", &[&path_str(image)?, &path_str(&extractdir)?])?;
    check_status("unyaffs", &out)?;
    info!("Image extracted to {}", extractdir.display());
    Ok(extractdir)
}

/// Unpack a boot image: extract the ramdisk, undo its gzip layer in
/// process, hand the cpio archive to the cpio tool, then drop the kernel
/// next to the unpacked tree as `vmlinuz` so it gets hashed too.
pub fn unpack_boot_image<E: CommandExecutor>(
    image: &Path,
    destdir: &Path,
    executor: &E,
) -> Result<PathBuf> {
    let mut fh = fs::File::open(image)?;
    let header = bootimg::parse_header(&mut fh)?;
    info!(
        "Boot image '{}': kernel {} bytes, ramdisk {} bytes",
        header.name_str(),
        header.kernel_size,
        header.ramdisk_size
    );
    let ramdisk = bootimg::extract_ramdisk(&mut fh)?;
    let rootdir = unpack_ramdisk(&ramdisk, destdir, executor)?;
    let kernel = bootimg::extract_kernel(&mut fh)?;
    fs::write(rootdir.join("vmlinuz"), &kernel)?;
    Ok(rootdir)
}

/// Unpack a compressed ramdisk blob into `destdir/ramdisk_unpacked/`.
pub fn unpack_ramdisk<E: CommandExecutor>(
    blob: &[u8],
    destdir: &Path,
    executor: &E,
) -> Result<PathBuf> {
    let extractdir = destdir.join("ramdisk_unpacked");
    if !extractdir.exists() {
        fs::create_dir_all(&extractdir)?;
    }
    info!("Unpacking ramdisk to {}...", extractdir.display());

    // Ramdisks are gzipped cpio archives in practice; refuse anything
    // that does not sniff as gzip instead of feeding cpio garbage.
    if !infer::archive::is_gz(blob) {
        return Err(HashbankError::Format(
            "ramdisk blob is not gzip-compressed".to_string(),
        ));
    }
    let mut cpio_blob = Vec::new();
    GzDecoder::new(blob).read_to_end(&mut cpio_blob)?;

    let mut staged = tempfile::NamedTempFile::new()?;
    staged.write_all(&cpio_blob)?;
    staged.flush()?;

    require_tool(executor, "cpio")?;
    let script = format!(
        "cd '{}' && cpio -i --no-absolute-filenames < '{}'",
        extractdir.display(),
        staged.path().display()
    );
    let out = executor.run("sh", &["-c", &script])?;
    check_status("cpio", &out)?;
    Ok(extractdir)
}

/// Mount a filesystem image read-only under `destdir/<image file name>/`,
/// relying on the kernel's own filesystem detection. Needs root or an
/// elevation runner.
pub fn mount_image<E: CommandExecutor>(
    image: &Path,
    destdir: &Path,
    executor: &E,
) -> Result<PathBuf> {
    let mountdir = fresh_subdir(destdir, image)?;
    let image_str = path_str(image)?;
    let mount_str = path_str(&mountdir)?;
    let args = [image_str.as_str(), mount_str.as_str(), "-o", "ro"];
    let status = match utils::root_or_runner("Mounting images requires elevated privileges")? {
        None => executor.run_interactive("mount", &args)?,
        Some(runner) => {
            let mut elevated = vec!["mount"];
            elevated.extend_from_slice(&args);
            executor.run_interactive(&runner, &elevated)?
        }
    };
    if !status.success() {
        return Err(HashbankError::ExternalTool {
            tool: "mount".to_string(),
            detail: format!("exit status {}", status),
        });
    }
    info!("{} mounted at {}", image.display(), mountdir.display());
    Ok(mountdir)
}

pub fn unmount_image<E: CommandExecutor>(mountdir: &Path, executor: &E) -> Result<()> {
    let mount_str = path_str(mountdir)?;
    let args = [mount_str.as_str()];
    let status = match utils::root_or_runner("Unmounting requires elevated privileges")? {
        None => executor.run_interactive("umount", &args)?,
        Some(runner) => executor.run_interactive(&runner, &["umount", &mount_str])?,
    };
    if !status.success() {
        return Err(HashbankError::ExternalTool {
            tool: "umount".to_string(),
            detail: format!("exit status {}", status),
        });
    }
    info!("{} unmounted", mountdir.display());
    Ok(())
}

/// Unmounts on drop, so a failed scan never leaves a stale mount behind.
pub struct MountGuard<'a, E: CommandExecutor> {
    mountdir: PathBuf,
    executor: &'a E,
}

impl<'a, E: CommandExecutor> MountGuard<'a, E> {
    pub fn new(mountdir: PathBuf, executor: &'a E) -> Self {
        Self { mountdir, executor }
    }
}

impl<E: CommandExecutor> Drop for MountGuard<'_, E> {
    fn drop(&mut self) {
        if let Err(e) = unmount_image(&self.mountdir, self.executor) {
            log::warn!("Failed to unmount {}: {}", self.mountdir.display(), e);
        }
    }
}

/// Create `destdir/<file name of path>/`, reusing an existing empty
/// directory and refusing a non-empty one.
fn fresh_subdir(destdir: &Path, path: &Path) -> Result<PathBuf> {
    let subdir = destdir.join(file_name(path)?);
    if subdir.exists() {
        if fs::read_dir(&subdir)?.next().is_some() {
            return Err(HashbankError::Format(format!(
                "extract dir {} exists and is not empty",
                subdir.display()
            )));
        }
        fs::remove_dir(&subdir)?;
    }
    fs::create_dir_all(&subdir)?;
    Ok(subdir)
}

fn require_tool<E: CommandExecutor>(executor: &E, tool: &str) -> Result<()> {
    if executor.has(tool) {
        Ok(())
    } else {
        Err(HashbankError::ExternalTool {
            tool: tool.to_string(),
            detail: "not found in PATH".to_string(),
        })
    }
}

fn check_status(tool: &str, out: &Output) -> Result<()> {
    if out.status.success() {
        return Ok(());
    }
    Err(HashbankError::ExternalTool {
        tool: tool.to_string(),
        detail: format!(
            "exit status {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        ),
    })
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| HashbankError::InvalidPath(path.to_path_buf()))
}

fn path_str(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| HashbankError::InvalidPath(path.to_path_buf()))
}
