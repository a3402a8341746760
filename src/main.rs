use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use pinsha::audit::report::{
    audit_to_json, format_audit_report, format_ref_listing, inventory_to_json, write_inventory_csv,
};
use pinsha::config::Config;
use pinsha::error::ScanError;
use pinsha::logging::{self, LogOptions};
use pinsha::parser::WorkflowScanner;
use pinsha::pin::{CacheStore, GitHubLookup, RefLookup, Resolver, ShaResolver};
use pinsha::scan::{GitCli, Traversal};

#[derive(Parser)]
#[command(name = "pinsha")]
#[command(version, about = "Find and pin mutable GitHub Actions references to commit SHAs")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Default log filter; RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Audit the repository in the current directory (or a remote one) for mutable references
    Audit {
        /// Exit with status 1 if any mutable reference is found
        #[arg(long)]
        raise_error: bool,

        /// Audit a remote repository by shallow-cloning it
        #[arg(long)]
        repo: Option<String>,

        /// Print findings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pin mutable references in the repository in the current directory
    Autofix {
        /// Show what would change without touching any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Inventory mutable references across every repository under a directory
    Find {
        /// Directory whose immediate subdirectories are repositories
        #[arg(long, default_value = ".")]
        root: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        out: OutputFormat,

        /// Write the inventory to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Only scan the checked-out branch of each repository
        #[arg(long)]
        head_only: bool,
    },

    /// Print the commit SHA of a reference, e.g. actions/checkout@v4
    Lookup { reference: String },

    /// List the tags of an action with their commit SHAs, e.g. actions/checkout
    List { action: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let _guard = logging::init(&LogOptions {
        level: cli.log_level.clone(),
        json: cli.log_json,
        file: cli.log_file.clone(),
    })?;

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command, config))
}

async fn run(command: Command, config: Config) -> anyhow::Result<ExitCode> {
    let traversal = Traversal::new(Arc::new(GitCli::new()), Arc::new(WorkflowScanner::new()));

    match command {
        Command::Audit {
            raise_error,
            repo,
            json,
        } => {
            let resolver = build_resolver(&config)?;
            let result = match &repo {
                Some(url) => traversal.audit_remote(url, &resolver).await,
                None => traversal.audit_repository(&current_dir()?, &resolver).await,
            };
            let workflows = match result {
                Ok(workflows) => workflows,
                Err(ScanError::NotARepository(path)) => {
                    eprintln!("{} is not a Git repository. Skipping checks!", path.display());
                    return Ok(ExitCode::SUCCESS);
                }
                Err(e) => return Err(e.into()),
            };

            if json {
                println!("{}", audit_to_json(&workflows)?);
            } else if workflows.is_empty() {
                println!("No mutable references found. Good job!");
            } else {
                println!(
                    "Mutable references found in your GitHub Actions workflows. \
                     Pin them to commit SHAs to protect your CI from supply-chain attacks.\n"
                );
                print!("{}", format_audit_report(&workflows));
            }

            if raise_error && !workflows.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Autofix { dry_run } => {
            let resolver = build_resolver(&config)?;
            let summary = match traversal
                .autofix_repository(&current_dir()?, &resolver, dry_run)
                .await
            {
                Ok(summary) => summary,
                Err(ScanError::NotARepository(path)) => {
                    eprintln!("{} is not a Git repository. Skipping autofix!", path.display());
                    return Ok(ExitCode::SUCCESS);
                }
                Err(e) => return Err(e.into()),
            };

            let verb = if dry_run { "Would pin" } else { "Pinned" };
            for report in &summary.reports {
                println!("{}", report.file_path.display());
                for fix in &report.applied {
                    println!(
                        "  - [Line {}, Col {}] {} '{}' to '{}'",
                        fix.line, fix.column, verb, fix.original, fix.replacement
                    );
                }
                for finding in &report.skipped {
                    println!(
                        "  - [Line {}, Col {}] Couldn't pin '{}': not found upstream",
                        finding.line, finding.column, finding.original
                    );
                }
            }
            for failure in &summary.failures {
                eprintln!("error: {failure}");
            }

            println!(
                "{} {} references, {} left unresolved",
                verb,
                summary.applied_count(),
                summary.skipped_count()
            );

            if summary.failures.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }

        Command::Find {
            root,
            out,
            output,
            head_only,
        } => {
            let inventory = traversal.find(&root, head_only)?;
            let mut writer = open_output(output.as_deref())?;
            match out {
                OutputFormat::Json => writeln!(writer, "{}", inventory_to_json(&inventory)?)?,
                OutputFormat::Csv => write_inventory_csv(&inventory, &mut writer)?,
            }
            writer.flush()?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Lookup { reference } => {
            let resolver = build_resolver(&config)?;
            match resolver.resolve(&reference).await {
                Ok(sha) => {
                    println!("{sha}");
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("error: {e}. Check the action and reference again.");
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Command::List { action } => {
            let refs = build_lookup(&config)?
                .list_tags(&action)
                .await
                .with_context(|| format!("No tags found for {action}"))?;
            print!("{}", format_ref_listing(&refs));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_lookup(config: &Config) -> anyhow::Result<GitHubLookup> {
    Ok(
        GitHubLookup::new(&config.github.api_url, config.fetch_timeout())?
            .with_token(config.github_token()),
    )
}

fn build_resolver(config: &Config) -> anyhow::Result<ShaResolver> {
    let store = CacheStore::new(config.cache_dir());
    let resolver = ShaResolver::new(Arc::new(build_lookup(config)?), store, config.cache_ttl())
        .with_context(|| format!("Failed to load cache from {:?}", config.cache_dir()))?;
    Ok(resolver)
}

fn current_dir() -> anyhow::Result<PathBuf> {
    std::env::current_dir().context("Failed to determine current directory")
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {path:?}"))?,
        )),
        None => Box::new(io::stdout().lock()),
    })
}
