use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use clap::Parser;
use log::{info, warn};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use bzenc::tools::cli::Args;
use bzenc::BzEncoder;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> io::Result<()> {
    let args = Args::parse();
    TermLogger::init(
        args.log_level(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .unwrap_or_default();

    if args.files.is_empty() {
        compress_stdin(&args)
    } else {
        for file in &args.files {
            compress_file(file, &args)?;
        }
        Ok(())
    }
}

/// Standard input to standard output, one stream.
fn compress_stdin(args: &Args) -> io::Result<()> {
    let stdout = io::stdout();
    let mut encoder = BzEncoder::new(BufWriter::new(stdout.lock()), args.block_size_for(None))?
        .iterations(args.iterations)
        .work_factor(args.work_factor);
    io::copy(&mut io::stdin().lock(), &mut encoder)?;
    encoder.finish()?;
    encoder.into_inner().flush()
}

/// Compress one named file to `name.bz2` (or standard output with -c),
/// then remove the input unless told to keep it.
fn compress_file(path: &str, args: &Args) -> io::Result<()> {
    let metadata = fs::metadata(path)?;
    let block_size = args.block_size_for(Some(metadata.len()));
    let mut fin = BufReader::new(File::open(path)?);

    if args.stdout {
        let stdout = io::stdout();
        let mut encoder = BzEncoder::new(BufWriter::new(stdout.lock()), block_size)?
            .iterations(args.iterations)
            .work_factor(args.work_factor);
        io::copy(&mut fin, &mut encoder)?;
        encoder.finish()?;
        encoder.into_inner().flush()?;
        return Ok(());
    }

    let out_path = format!("{}.bz2", path);
    if Path::new(&out_path).exists() && !args.force {
        warn!("{} exists, skipping (use --force to overwrite)", out_path);
        return Ok(());
    }

    let mut encoder = BzEncoder::new(BufWriter::new(File::create(&out_path)?), block_size)?
        .iterations(args.iterations)
        .work_factor(args.work_factor);
    io::copy(&mut fin, &mut encoder)?;
    encoder.finish()?;
    info!(
        "{}: {} bytes in, {} blocks, block size {}00kB",
        path,
        encoder.total_in(),
        encoder.blocks(),
        block_size
    );
    encoder.into_inner().flush()?;

    if !args.keep {
        fs::remove_file(path)?;
    }
    Ok(())
}
