use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "vcxitems-gen")]
#[command(about = "Generate .vcxitems and .vcxitems.filters files that mirror a source tree")]
#[command(version)]
struct Cli {
    /// Folder to scan
    input: PathBuf,

    /// Prefix stripped from every emitted path [default: INPUT]
    #[arg(long)]
    root: Option<PathBuf>,

    /// Directory the two files are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Base name of the output files [default: name of INPUT]
    #[arg(short, long)]
    name: Option<String>,

    /// Do not descend into symlinked directories
    #[arg(long)]
    no_follow_links: bool,

    /// Fail if anything sits deeper than this below INPUT
    #[arg(long)]
    max_depth: Option<usize>,

    /// Log each folder as it is scanned
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize tracing on stderr so stdout only carries the summary
fn init_tracing(verbose: bool) {
    let default = if verbose { "vcxitems_gen=debug" } else { "vcxitems_gen=info" };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut builder = vcxitems_gen::generate()
        .input(&cli.input)
        .output_dir(&cli.output_dir)
        .follow_links(!cli.no_follow_links);
    if let Some(root) = &cli.root {
        builder = builder.strip_prefix(root);
    }
    if let Some(name) = &cli.name {
        builder = builder.name(name);
    }
    if let Some(depth) = cli.max_depth {
        builder = builder.max_depth(depth);
    }

    let report = builder
        .run()
        .with_context(|| format!("failed to generate project for {}", cli.input.display()))?;

    for err in &report.skipped {
        match err.path() {
            Some(path) => println!("Skipped: {}", path.display()),
            None => println!("Skipped: {err}"),
        }
    }

    let stats = &report.stats;
    println!(
        "{} headers, {} sources, {} other files in {} filters -> {}, {} ({:.3}s)",
        stats.headers,
        stats.sources,
        stats.others,
        stats.filters,
        report.project_file.display(),
        report.filters_file.display(),
        stats.duration.as_secs_f64(),
    );

    Ok(())
}
