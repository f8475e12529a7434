use clap::Parser;
use extpack::cli::{PackRequest, run_with_config};
use extpack::output::{Level, Logger};
use extpack::prompt::{AssumeYes, LinePrompt};
use std::path::PathBuf;
use std::process;

/// Pack the top-level entries of SOURCE into TARGET/<ext>_files, one
/// confirmed extension at a time.
#[derive(Parser, Debug)]
#[command(name = "extpack", version, about)]
struct Args {
    /// Directory whose entries are grouped by extension
    source: PathBuf,

    /// Directory that receives the <ext>_files subdirectories
    target: PathBuf,

    /// Pack every extension without asking
    #[arg(short, long)]
    yes: bool,

    /// Show what would be packed without prompting or moving anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hide debug output
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() {
    let args = Args::parse();

    let mut logger = Logger::stderr("extpack");
    if args.quiet {
        logger = logger.with_min_level(Level::Info);
    }
    if args.no_color {
        logger = logger.with_color(false);
    }

    let request = PackRequest::new(&args.source, &args.target).dry_run(args.dry_run);
    let config_path = args.config.as_deref();

    let result = if args.yes {
        run_with_config(request, config_path, &mut AssumeYes, &mut logger)
    } else {
        run_with_config(request, config_path, &mut LinePrompt::stdin(), &mut logger)
    };

    if let Err(e) = result {
        logger.critical(&format!("{}, closing...", e));
        process::exit(1);
    }
}
