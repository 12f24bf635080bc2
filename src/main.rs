use std::{
    io::{self, BufWriter},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use library_catalog::{ConfigOverrides, Console, Library, LibraryConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the library catalog
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the snapshot files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Books snapshot file name
    #[arg(long)]
    books: Option<PathBuf>,

    /// Visitors snapshot file name
    #[arg(long)]
    visitors: Option<PathBuf>,

    /// Refuse to rent a book another visitor already holds
    #[arg(long)]
    single_holder: bool,

    /// Enable verbose output with detailed operation logs
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Resolve the configuration file, then apply flag overrides
    fn into_config(self) -> Result<LibraryConfig> {
        let file = match &self.config {
            Some(path) => {
                let context = format!("loading configuration from {}", path.display());
                LibraryConfig::from_file(path).context(context)?
            }
            None => LibraryConfig::default(),
        };
        let overrides = ConfigOverrides {
            data_dir: self.data_dir,
            books_file: self.books,
            visitors_file: self.visitors,
            single_holder: self.single_holder,
        };
        Ok(file.apply_overrides(overrides))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = args.into_config()?;
    let books = config.books_path();
    let visitors = config.visitors_path();
    info!(
        books = %books.display(),
        visitors = %visitors.display(),
        policy = ?config.rental_policy,
        "starting"
    );

    let (mut library, reports) =
        Library::open_with_default_observers(config.snapshot_store(), config.rental_policy);
    for report in &reports {
        if report.is_failure() {
            println!("{}", report.to_string().red());
        } else {
            println!("{report}");
        }
    }

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), BufWriter::new(io::stdout()));
    console.run(&mut library).context("console I/O failed")?;
    info!(%library, "session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use library_catalog::RentalPolicy;

    use super::*;

    #[test]
    #[allow(clippy::expect_used)]
    fn test_flags_without_config_file() {
        let argv = ["library", "--data-dir", "/srv", "--single-holder"];
        let args = Args::try_parse_from(argv).expect("arguments should parse");
        let config = args.into_config().expect("config should resolve");
        assert_eq!(config.data_dir, PathBuf::from("/srv"));
        assert_eq!(config.books_file, PathBuf::from("books.json"));
        assert_eq!(config.rental_policy, RentalPolicy::SingleHolder);
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("library.toml");
        let toml = "data_dir = \"/var/lib/library\"\nbooks_file = \"catalog.json\"\n";
        std::fs::write(&path, toml).expect("config written");
        let path = path.to_string_lossy().into_owned();
        let argv = [
            "library",
            "--config",
            path.as_str(),
            "--books",
            "override.json",
        ];
        let args = Args::try_parse_from(argv).expect("arguments should parse");
        let config = args.into_config().expect("config should resolve");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/library"));
        assert_eq!(config.books_file, PathBuf::from("override.json"));
        assert_eq!(config.rental_policy, RentalPolicy::Permissive);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let argv = ["library", "--config", "/nonexistent/library.toml"];
        let args = Args::try_parse_from(argv);
        assert!(args.is_ok_and(|args| args.into_config().is_err()));
    }
}
