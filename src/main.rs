use clap::Parser;
use heic2jpeg::backend::{DEFAULT_QUALITY, LibheifBackend};
use heic2jpeg::layout::WorkingContext;
use heic2jpeg::{batch, report, resolve};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "heic2jpeg")]
#[command(about = "Convert HEIC/HEIF photos to JPEG, preserving EXIF metadata")]
#[command(long_about = "\
Convert HEIC/HEIF photos to JPEG, preserving EXIF metadata

Converted files are written to a 'jpegs/' subdirectory alongside the source
files, together with a logs.txt batch record. Files are converted in
parallel; a file that fails is reported and skipped without stopping the
rest of the batch.

Examples:

  # Convert all HEIC files in the current directory
  heic2jpeg

  # Convert all HEIC files in a specific directory
  heic2jpeg ~/Photos

  # Convert a single file
  heic2jpeg photo.heic")]
#[command(version)]
struct Cli {
    /// Directory of HEIC files, or a single HEIC file (defaults to the
    /// current directory)
    path: Option<PathBuf>,

    /// Cap on parallel conversions (defaults to available cores; clamped
    /// down to the core count)
    #[arg(long)]
    workers: Option<usize>,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = DEFAULT_QUALITY)]
    quality: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let resolved = resolve::resolve(cli.path.as_deref())?;

    let eligible = batch::eligible_files(&resolved.candidates);
    if eligible.is_empty() {
        println!("No HEIC files found.");
        return Ok(());
    }
    println!("Found {} HEIC file(s)", eligible.len());

    // Fatal if the output directory cannot be created; nothing has been
    // dispatched yet.
    let ctx = WorkingContext::prepare(&resolved.source_dir)?;

    init_thread_pool(cli.workers);
    let backend = LibheifBackend::new(cli.quality);

    let (tx, rx) = mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            println!("{}", report::format_event(&event));
        }
    });

    let start = Instant::now();
    let results = batch::run(&backend, &ctx, &resolved.candidates, Some(tx));
    let elapsed = start.elapsed();
    printer.join().unwrap();

    report::save_logs(&ctx, &results, elapsed)?;

    println!();
    println!("{}", report::format_summary(&results, elapsed));

    // Per-file failures were reported above; only setup errors exit non-zero
    Ok(())
}

/// Initialize the rayon thread pool.
///
/// Caps at the number of available CPU cores; the user can constrain down,
/// not up.
fn init_thread_pool(workers: Option<usize>) {
    rayon::ThreadPoolBuilder::new()
        .num_threads(batch::effective_workers(workers))
        .build_global()
        .ok();
}
