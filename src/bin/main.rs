//! CLI front-end for splitzip: a thin wrapper around the library.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use splitzip::{CompressionMethod, SplitZipWriter};

#[derive(Parser, Debug)]
#[command(name = "splitzip", about, version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new split ZIP archive from one or more files/directories.
    Create {
        /// Output archive stem (volumes become <stem>.z01, ..., <stem>.zip).
        #[arg(short, long)]
        output: PathBuf,

        /// Split size per volume, e.g. "100MB", "700MiB", or a bare byte count.
        #[arg(short = 's', long)]
        split_size: String,

        /// DEFLATE level 1-9 (default 6). Ignored with --store.
        #[arg(short = 'l', long, default_value_t = splitzip::codec::DEFAULT_LEVEL)]
        level: u32,

        /// Store entries uncompressed instead of DEFLATE.
        #[arg(long)]
        store: bool,

        /// Enable verbose logging (equivalent to RUST_LOG=info).
        #[arg(short, long)]
        verbose: bool,

        /// Files or directories to add to the archive.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match &cli.command {
        Command::Create { verbose, .. } => {
            if *verbose {
                env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                    .init();
            } else {
                env_logger::init();
            }
        }
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("splitzip: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> splitzip::Result<()> {
    match command {
        Command::Create {
            output,
            split_size,
            level,
            store,
            verbose: _,
            paths,
        } => create(output, &split_size, level, store, &paths),
    }
}

fn create(
    output: PathBuf,
    split_size: &str,
    level: u32,
    store: bool,
    paths: &[PathBuf],
) -> splitzip::Result<()> {
    let split_size = splitzip::parse_split_size(split_size)?;
    let method = if store {
        CompressionMethod::Stored
    } else {
        CompressionMethod::Deflated(level)
    };

    let mut writer = SplitZipWriter::create(&output, split_size, method)?;
    writer.set_on_volume(Box::new(|number, path| {
        log::info!("opened volume {number}: {}", path.display());
    }));

    for path in paths {
        if path.is_dir() {
            for (disk_path, arcname) in splitzip::walker::walk(path) {
                log::debug!("adding {}", disk_path.display());
                writer.add_file(&disk_path, &arcname)?;
            }
        } else {
            let arcname = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            writer.add_file(path, &arcname)?;
        }
    }

    let volumes = writer.finish()?;
    for volume in volumes {
        println!("{}", volume.display());
    }
    Ok(())
}
