//! fileset: list or copy the files selected by include/exclude globs.
//!
//! Patterns come from the command line, a TOML file (`--config`), or both;
//! command-line globs are added to those in the file and the other flags
//! override it. Selected paths are printed one per line, relative to the
//! base folder, unless `--copy-to` is given.

use std::path::PathBuf;

use clap::Parser;
use futures::TryStreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fileset_core::{copy_files, CopyJob, ErrorKind, FileSetConfig, LocalFileSystem};

/// Glob used when neither the config file nor the command line includes anything.
const DEFAULT_INCLUDE: &str = "**/*";

#[derive(Debug, Parser)]
#[command(name = "fileset", version, about = "Select files with include and exclude globs")]
struct Cli {
    /// TOML file describing the file set.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Folder the globs are relative to [default: .]
    #[arg(short, long, value_name = "DIR")]
    base: Option<String>,

    /// Glob of paths to select; may be repeated [default: **/*]
    #[arg(short, long = "include", value_name = "GLOB")]
    include: Vec<String>,

    /// Glob of paths to leave out; may be repeated.
    #[arg(short, long = "exclude", value_name = "GLOB")]
    exclude: Vec<String>,

    /// List folders instead of files.
    #[arg(long)]
    folders: bool,

    /// Match globs case-sensitively.
    #[arg(long)]
    case_sensitive: bool,

    /// Skip folders whose listing fails with this kind of error
    /// (e.g. access-denied, not-found, io, any); may be repeated.
    #[arg(long = "ignore-errors", value_name = "KIND")]
    ignore_errors: Vec<ErrorKind>,

    /// Copy the selected files into this folder instead of printing them.
    #[arg(long, value_name = "DIR", conflicts_with = "folders")]
    copy_to: Option<PathBuf>,

    /// Log walk progress to stderr.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Merges the config file (if any) with the command-line flags.
    fn file_set_config(&self) -> anyhow::Result<FileSetConfig> {
        let mut config = match &self.config {
            Some(path) => FileSetConfig::load(path)?,
            None => FileSetConfig::default(),
        };
        if let Some(base) = &self.base {
            config.base = base.clone();
        }
        if self.case_sensitive {
            config.case_sensitive = true;
        }
        config.include.extend(self.include.iter().cloned());
        config.exclude.extend(self.exclude.iter().cloned());
        for kind in &self.ignore_errors {
            if !config.ignore_errors.contains(kind) {
                config.ignore_errors.push(*kind);
            }
        }
        if config.include.is_empty() {
            config.include.push(DEFAULT_INCLUDE.to_string());
        }
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "fileset_core=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.file_set_config()?;
    let set = config.to_file_set(LocalFileSystem::new());

    if let Some(output) = &cli.copy_to {
        let copied = copy_files(&[CopyJob::new(&set)], output).await?;
        tracing::info!("copied {copied} files to {}", output.display());
        return Ok(());
    }

    let mut paths = if cli.folders {
        set.stream_folders().await?
    } else {
        set.stream_files().await?
    };
    while let Some(path) = paths.try_next().await? {
        println!("{path}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_to_everything_below_current_dir() {
        let cli = Cli::parse_from(["fileset"]);
        let config = cli.file_set_config().unwrap();
        assert_eq!(config.base, ".");
        assert_eq!(config.include, vec![DEFAULT_INCLUDE]);
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn repeated_flags_accumulate() {
        let cli = Cli::parse_from([
            "fileset",
            "-i",
            "**/*.rs",
            "--include",
            "*.toml",
            "-e",
            "target/**",
            "--ignore-errors",
            "access-denied",
            "--ignore-errors",
            "not-found",
        ]);
        let config = cli.file_set_config().unwrap();
        assert_eq!(config.include, vec!["**/*.rs", "*.toml"]);
        assert_eq!(config.exclude, vec!["target/**"]);
        assert_eq!(
            config.ignore_errors,
            vec![ErrorKind::AccessDenied, ErrorKind::NotFound]
        );
    }

    #[test]
    fn unknown_error_kind_is_rejected() {
        assert!(Cli::try_parse_from(["fileset", "--ignore-errors", "mostly"]).is_err());
    }

    #[test]
    fn copy_conflicts_with_folders() {
        assert!(Cli::try_parse_from(["fileset", "--folders", "--copy-to", "out"]).is_err());
    }

    #[test]
    fn flags_extend_and_override_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fileset.toml");
        fs::write(
            &path,
            r#"
base = "assets"
include = ["**/*.png"]
ignore_errors = ["io"]
"#,
        )
        .unwrap();

        let cli = Cli::parse_from([
            "fileset",
            "--config",
            path.to_str().unwrap(),
            "--base",
            "static",
            "-i",
            "**/*.svg",
            "--case-sensitive",
            "--ignore-errors",
            "io",
        ]);
        let config = cli.file_set_config().unwrap();
        assert_eq!(config.base, "static");
        assert!(config.case_sensitive);
        assert_eq!(config.include, vec!["**/*.png", "**/*.svg"]);
        assert_eq!(config.ignore_errors, vec![ErrorKind::Io]);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.toml");
        let cli = Cli::parse_from(["fileset", "--config", missing.to_str().unwrap()]);
        assert!(cli.file_set_config().is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
