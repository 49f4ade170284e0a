//! Userspace FUSE driver for the Simple File System (SFS) image format.
//!
//! This binary is the "external binding" the core `sfs_core` crate is
//! deliberately oblivious to: it parses arguments, opens the image file,
//! and wires a `fuser::Filesystem` session to `sfs_core::ops::Sfs`.

mod device;
mod fs;
mod inode;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use fork::{daemon, Fork};
use log::{error, info};

use sfs_core::ops::Sfs;

use device::FileDevice;
use fs::SfsFuse;

const DEFAULT_IMG: &str = "test.img";

/// Mount an SFS image as a FUSE filesystem.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Where to mount the filesystem.
    mountpoint: PathBuf,

    /// Filename of the SFS image to mount.
    #[arg(short, long, default_value = DEFAULT_IMG)]
    img: PathBuf,

    /// Run FUSE in the background instead of the foreground.
    #[arg(short, long)]
    background: bool,

    /// Print debug information; repeat for more detail (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).format_timestamp(None).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.background {
        match daemon(false, false) {
            Ok(Fork::Parent(_)) => return Ok(()),
            Ok(Fork::Child) => {}
            Err(errno) => bail!("failed to background the driver (errno {errno})"),
        }
    }

    let device = FileDevice::open(&args.img)
        .with_context(|| format!("opening SFS image {:?}", args.img))?;
    let filesystem = SfsFuse::new(Sfs::new(device));

    info!("mounting {:?} on {:?}", args.img, args.mountpoint);
    let options = vec![
        fuser::MountOption::FSName("sfs".to_string()),
        fuser::MountOption::AutoUnmount,
    ];
    if let Err(e) = fuser::mount2(filesystem, &args.mountpoint, &options) {
        error!("fuse session ended with an error: {e}");
        return Err(e.into());
    }

    Ok(())
}
