use clap::{Parser, Subcommand};
use gallery_manifest::config::{self, CONFIG_FILENAME};
use gallery_manifest::manifest::{Assembler, OutputFormat, write_manifest};
use gallery_manifest::output;
use gallery_manifest::source::FsSource;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gallery-manifest")]
#[command(about = "Build-time manifest generator for a photo travel journal")]
#[command(long_about = "\
Build-time manifest generator for a photo travel journal

Your filesystem is the data source. Top-level directories become locations,
their subdirectories become spots, and an optional info.json next to the
photos overrides names, ordering, and details.

Content structure:

  images/
  ├── manifest.toml                # Generator config (optional)
  ├── _drafts/                     # Reserved prefix = ignored
  ├── Toya/                        # Location
  │   ├── lake_view/               # Spot
  │   │   ├── info.json            # Sidecar metadata (optional)
  │   │   ├── dawn.jpg             # Baseline image
  │   │   ├── dawn-800.webp        # Width variant of the same photo
  │   │   └── dawn-1600.avif
  │   └── blue-pond.jpg            # Stray image = its own spot
  ├── food/
  │   └── miso_ramen/              # Food item
  ├── gallery/                     # Loose photos
  └── friends/                     # Loose photos

Variant files {stem}-{width}.{ext} are grouped with {stem} into one
responsive descriptor (avif, webp, jpeg buckets plus a fallback URL).

Run 'gallery-manifest gen-config' to generate a documented manifest.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "images", global = true)]
    source: PathBuf,

    /// Config file [default: <source>/manifest.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the content directory and write the manifest
    Generate {
        /// Output file
        #[arg(long, default_value = "src/data.js")]
        output: PathBuf,

        /// Output format: js or json [default: from the output extension]
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Omit the generation timestamp for byte-identical output
        #[arg(long)]
        no_timestamp: bool,
    },
    /// Scan the content directory and print what would be written
    Check,
    /// Print a stock manifest.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            output,
            format,
            no_timestamp,
        } => {
            let mut config = load_config(&cli.source, cli.config.as_deref())?;
            if no_timestamp {
                config.timestamp = false;
            }
            println!("==> Scanning {}", cli.source.display());
            let manifest = Assembler::new(config, &FsSource).assemble(&cli.source)?;
            output::print_manifest_summary(&manifest);

            let format = format.unwrap_or_else(|| OutputFormat::from_path(&output));
            write_manifest(&manifest, &output, format)?;
            println!();
            output::print_write_summary(&manifest, &output);
        }
        Command::Check => {
            let config = load_config(&cli.source, cli.config.as_deref())?;
            println!("==> Checking {}", cli.source.display());
            let manifest = Assembler::new(config, &FsSource).assemble(&cli.source)?;
            output::print_manifest_summary(&manifest);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so stdout carries only the summary. `RUST_LOG` overrides
/// the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the explicit config file, or `manifest.toml` in the content root.
fn load_config(
    source: &Path,
    explicit: Option<&Path>,
) -> Result<config::ManifestConfig, Box<dyn std::error::Error>> {
    if !source.is_dir() {
        tracing::warn!(source = %source.display(), "content directory not found, collections will be empty");
    }
    let path = match explicit {
        Some(path) if !path.exists() => {
            return Err(format!("config file not found: {}", path.display()).into());
        }
        Some(path) => path.to_path_buf(),
        None => source.join(CONFIG_FILENAME),
    };
    Ok(config::load_config(&path)?)
}
