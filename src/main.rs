use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use bcp_huffman::{
    container::EXTENSION,
    engine::{EncodeStrategy, HistogramStrategy},
    io::{ensure_distinct, SystemMemory},
    Compressor, Decompressor, EngineConfig, Parallel, Result, Sequential,
};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Compress files with a static canonical Huffman code into .bcp containers, or restore them")]
struct Args {
    /// Compress the given files (the default)
    #[arg(short, long, conflicts_with = "decompress")]
    compress: bool,
    /// Decompress the given .bcp files
    #[arg(short, long)]
    decompress: bool,
    /// Count and encode on a worker pool
    #[arg(short, long)]
    parallel: bool,
    /// Print the elapsed time of every file
    #[arg(short, long)]
    timer: bool,
    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
    /// Engine settings in a .properties file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write a JSON report next to every output file
    #[arg(long)]
    stats: bool,
    /// Output directory, the input's own directory by default
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Input files
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn output_dir(args: &Args, input: &Path) -> PathBuf {
    match &args.output_dir {
        Some(dir) => dir.clone(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    }
}

fn write_stats<T: Serialize>(output: &Path, report: &T) -> Result<()> {
    let mut path = output.as_os_str().to_owned();
    path.push(".stats.json");

    let json = serde_json::to_string_pretty(report).map_err(std::io::Error::from)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn compress_file<S: HistogramStrategy + EncodeStrategy>(compressor: &Compressor<S>, args: &Args, input: &Path) -> Result<()> {
    let filename = input.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let output = output_dir(args, input).join(Path::new(&filename).with_extension(EXTENSION));

    ensure_distinct(input, &output)?;

    let mut source = BufReader::new(File::open(input)?);
    let mut sink = BufWriter::new(File::create(&output)?);
    let report = compressor.compress(&mut source, &filename, &mut SystemMemory::new(), &mut sink)?;
    sink.flush()?;

    let elapsed = report.histogram_nanos + report.table_nanos + report.encode_nanos;
    info!("{} -> {} ({:.2}%)", input.display(), output.display(), 100.0 * report.ratio());
    if args.timer {
        println!("compressed {} in {}ns", input.display(), elapsed);
    }
    if args.stats {
        write_stats(&output, &report)?;
    }
    Ok(())
}

fn decompress_file(config: &EngineConfig, args: &Args, input: &Path) -> Result<()> {
    let mut source = BufReader::new(File::open(input)?);
    let decompressor = Decompressor::open(&mut source, config.clone())?;

    // Only the final component of the stored name is trusted.
    let stored = Path::new(&decompressor.header().filename).file_name().map(PathBuf::from);
    let name = stored.unwrap_or_else(|| input.with_extension("").file_name().map(PathBuf::from).unwrap_or_default());
    let output = output_dir(args, input).join(name);
    ensure_distinct(input, &output)?;

    let mut sink = BufWriter::new(File::create(&output)?);
    let report = decompressor.decode_into(&mut sink)?;
    sink.flush()?;

    info!("{} -> {}", input.display(), output.display());
    if args.timer {
        println!("decompressed {} in {}ns", input.display(), report.decode_nanos);
    }
    if args.stats {
        write_stats(&output, &report)?;
    }
    Ok(())
}

fn run_all(args: &Args, mut job: impl FnMut(&Path) -> Result<()>) -> ExitCode {
    let mut failed = 0;

    for input in args.files.iter() {
        if let Err(e) = job(input) {
            error!("{}: {e}", input.display());
            failed += 1;
        }
    }

    if failed > 0 {
        error!("{failed} of {} files failed", args.files.len());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if args.decompress && !args.compress {
        return run_all(&args, |input| decompress_file(&config, &args, input));
    }

    if args.parallel {
        let strategy = match Parallel::from_config(&config) {
            Ok(strategy) => strategy,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        };
        let compressor = Compressor::new(strategy, config);
        run_all(&args, |input| compress_file(&compressor, &args, input))
    } else {
        let compressor = Compressor::new(Sequential, config);
        run_all(&args, |input| compress_file(&compressor, &args, input))
    }
}
