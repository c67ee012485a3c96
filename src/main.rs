use clap::{Parser, Subcommand};
use makesite::{config, generate, output};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "makesite")]
#[command(about = "Static site generator for blogs and archive-exported fiction")]
#[command(long_about = "\
Static site generator for blogs and archive-exported fiction

Every top-level folder under the content root becomes a section with its own
listing page. Source files are HTML or Markdown with `<!-- key: value -->`
header lines, or works exported from an online fiction archive.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── _index.html                  # Home page → index.html
  ├── about.html                   # Root page → about/index.html
  ├── blog/                        # Folder → blog/index.html listing
  │   ├── _index.html              # Folder headers (title, ...)
  │   ├── 2020-01-01-first.md      # Date and slug from the file name
  │   └── 2020-01-02-second.html
  └── works/
      ├── config.toml              # Folder config (overrides root)
      └── 2021-06-01-fic.html      # Archive export: tags, series, chapters

Header lines:
  <!-- title: Hello -->            # Any key becomes a template placeholder
  <!-- date: 2020-02-02 -->        # Overrides the file name date
  <!-- list: no -->                # Written, but left off the listing

Run 'makesite gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "_site", global = true)]
    output: PathBuf,

    /// Directory holding themes (`<themes>/<theme>/templates`, `static`)
    #[arg(long, default_value = "themes", global = true)]
    themes: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the site into the output directory
    Build {
        /// Remove the output directory before building
        #[arg(long)]
        clean: bool,
    },
    /// Read every source and report problems without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    debug!(?cli, "CLI arguments parsed");

    match cli.command {
        Command::Build { clean } => {
            let paths = generate::SitePaths {
                source: cli.source,
                output: cli.output,
                themes: cli.themes,
            };
            info!(source = %paths.source.display(), output = %paths.output.display(), "building site");
            let report = generate::build_site(&paths, clean)?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", paths.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let report = generate::check_site(&cli.source)?;
            output::print_check_output(&report);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so stdout carries only the build summary.
///
/// Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
fn init_logging(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
