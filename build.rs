use std::fs;
use std::path::Path;

fn main() -> std::io::Result<()> {
    let out_dir = Path::new("man");
    if !out_dir.exists() {
        fs::create_dir_all(out_dir)?;
    }

    // The derive-based definition lives in src/cli.rs; the man page only
    // needs the stable surface, so it is restated here to keep the build
    // script free of library dependencies.
    let cmd = clap::Command::new("hashbank")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build hash whitelists from image files or directory trees")
        .after_help(
            "Ingests an image file or a directory tree into a content-addressed \
             whitelist database. Image files are recognized by magic bytes and \
             unpacked (boot images, yaffs2, sparse ext4) or mounted read-only \
             before scanning. Every regular file is hashed with md5, sha1 and \
             sha256; symbolic links are never followed.",
        );

    let man = clap_mangen::Man::new(cmd);
    let mut buffer: Vec<u8> = Default::default();
    man.render(&mut buffer)?;
    fs::write(out_dir.join("hashbank.1"), buffer)?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    Ok(())
}
