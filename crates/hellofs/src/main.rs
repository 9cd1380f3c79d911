//! Mount an empty in-memory hellofs namespace.
//!
//! Usage:
//!   hellofs [options] <mountpoint>
//!
//! Options:
//!   --allow-other    Let other users access the mount
//!   --auto-unmount   Unmount when the process exits
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::process;

use hellofs_vfs::{HelloFs, HelloVfs, MountOptions, NamespaceOptions};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Exit status for bad invocations.
const EXIT_USAGE: i32 = 2;

/// CLI arguments.
struct CliArgs {
    mountpoint: PathBuf,
    allow_other: bool,
    auto_unmount: bool,
}

impl CliArgs {
    /// Parse CLI arguments. Exits the process on `--help` or bad usage.
    fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let program: &str = args.first().map(String::as_str).unwrap_or("hellofs");

        let mut mountpoint: Option<PathBuf> = None;
        let mut allow_other: bool = false;
        let mut auto_unmount: bool = false;

        for arg in args.iter().skip(1) {
            match arg.as_str() {
                "-h" | "--help" => {
                    print_usage(program);
                    process::exit(0);
                }
                "--allow-other" => allow_other = true,
                "--auto-unmount" => auto_unmount = true,
                positional if !positional.starts_with('-') && mountpoint.is_none() => {
                    mountpoint = Some(PathBuf::from(positional));
                }
                _ => {
                    eprintln!("Unexpected argument: {}", arg);
                    print_usage(program);
                    process::exit(EXIT_USAGE);
                }
            }
        }

        let Some(mountpoint) = mountpoint else {
            print_usage(program);
            process::exit(EXIT_USAGE);
        };

        Self {
            mountpoint,
            allow_other,
            auto_unmount,
        }
    }
}

/// Print usage information.
///
/// # Arguments
/// * `program` - Program name for usage message
fn print_usage(program: &str) {
    eprintln!("Usage:");
    eprintln!("  {} [options] MOUNTPOINT", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --allow-other    Let other users access the mount");
    eprintln!("  --auto-unmount   Unmount when the process exits");
    eprintln!("  -h, --help       Show this message");
}

fn main() {
    let args: CliArgs = CliArgs::parse();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let fs: HelloFs = HelloFs::new(NamespaceOptions::default());
    let options: MountOptions = MountOptions::default()
        .with_allow_other(args.allow_other)
        .with_auto_unmount(args.auto_unmount);
    let vfs: HelloVfs = HelloVfs::new(fs, options);

    if let Err(e) = hellofs_vfs::mount(vfs, &args.mountpoint) {
        tracing::error!("mount at {} failed: {}", args.mountpoint.display(), e);
        process::exit(1);
    }
}
