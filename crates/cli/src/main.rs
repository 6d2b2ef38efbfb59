//! gittr command-line conflict checker.
//!
//! Checks a pull request against its target branch, either from a JSON
//! request exported by the web frontend or from two branches of a local
//! repository, and helps settle the conflicts it finds.

mod report;
mod style;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use gittr_core::config::AppConfig;
use gittr_core::conflict::{ConflictResolver, ConflictResult, Merger, Resolution};
use gittr_core::{ConflictCheckRequest, GitClient, PrCheck};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// gittr command-line conflict checker.
#[derive(Parser, Debug)]
#[command(
    name = "gittr",
    version,
    about = "Check gittr pull requests for conflicts with their target branch"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overrides the config file; RUST_LOG overrides both).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a pull request for conflicts.
    Check {
        /// JSON request with targetBranch, changes and base.
        #[arg(long, conflicts_with_all = ["repo", "source", "target"])]
        request: Option<PathBuf>,

        /// Local repository holding both branches.
        #[arg(long)]
        repo: Option<PathBuf>,

        /// Branch carrying the proposed changes.
        #[arg(long)]
        source: Option<String>,

        /// Branch the pull request targets.
        #[arg(long)]
        target: Option<String>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,

        /// Exit with status 1 when conflicts are found.
        #[arg(long)]
        fail_on_conflict: bool,
    },

    /// Settle one conflict from a saved check result.
    Resolve {
        /// JSON result produced by `check --json`.
        #[arg(long)]
        result: PathBuf,

        /// Path of the conflicting file.
        #[arg(long)]
        path: String,

        /// Resolution: pr, base or manual.
        #[arg(long)]
        using: String,

        /// Write the resolution back into this JSON request.
        #[arg(long)]
        apply_to: Option<PathBuf>,
    },

    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = "./gittr.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file.
    Validate,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config.clone().or_else(default_config_path);
    let config = match (&cli.config, &config_path) {
        (Some(path), _) => {
            AppConfig::load_from_file(path).context("failed to load configuration file")?
        }
        (None, Some(path)) => {
            AppConfig::load_or_default(path).context("failed to load configuration file")?
        }
        (None, None) => AppConfig::default(),
    };

    init_logging(cli.log_level.as_deref().unwrap_or(&config.log.level));
    debug!(config = ?config_path, "configuration loaded");

    match cli.command {
        Commands::Check {
            request,
            repo,
            source,
            target,
            json,
            fail_on_conflict,
        } => {
            let result = match request {
                Some(request) => check_request(&request)?,
                None => check_repository(&config, repo, source, target)?,
            };
            report::print_result(&result, json)?;
            if fail_on_conflict && result.has_conflicts() {
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Resolve {
            result,
            path,
            using,
            apply_to,
        } => cmd_resolve(&result, &path, &using, apply_to.as_deref()).map(|()| ExitCode::SUCCESS),
        Commands::Init { output } => cmd_init(&output).map(|()| ExitCode::SUCCESS),
        Commands::Validate => {
            let path = config_path.context("no configuration path available")?;
            cmd_validate(&path).map(|()| ExitCode::SUCCESS)
        }
    }
}

// ---------------------------------------------------------------------------
// Config & logging helpers
// ---------------------------------------------------------------------------

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gittr").join("config.toml"))
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn check_request(path: &Path) -> Result<ConflictResult> {
    let request = ConflictCheckRequest::load_from_file(path)
        .with_context(|| format!("failed to read request {}", path.display()))?;
    Ok(PrCheck::from_request(&request))
}

fn check_repository(
    config: &AppConfig,
    repo: Option<PathBuf>,
    source: Option<String>,
    target: Option<String>,
) -> Result<ConflictResult> {
    let source = source.context("either --request or --source is required")?;
    let target = target.unwrap_or_else(|| config.repository.default_target_branch.clone());
    let repo = repo
        .or_else(|| config.repository.path.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let client = GitClient::new(&repo).context("failed to open repository")?;
    PrCheck::from_repository(&client, &source, &target, &config.snapshot)
        .with_context(|| format!("failed to check '{}' against '{}'", source, target))
}

fn cmd_resolve(result_path: &Path, path: &str, using: &str, apply_to: Option<&Path>) -> Result<()> {
    let result = ConflictResult::load_from_file(result_path)
        .with_context(|| format!("failed to read result {}", result_path.display()))?;
    let conflict = result
        .find(path)
        .ok_or_else(|| anyhow::anyhow!("no conflict recorded for '{}'", path))?;
    let resolution: Resolution = using.parse()?;

    let resolved = ConflictResolver::resolve(conflict, resolution);

    if !resolved.resolved {
        match Merger::draft_for(conflict, result.target_branch()) {
            Ok(draft) => {
                eprintln!(
                    "{}",
                    style::warn(&format!(
                        "Manual resolution: draft below has {} conflict region(s)",
                        draft.conflict_markers.len()
                    ))
                );
                print!("{}", draft.merged_content);
            }
            Err(e) => eprintln!("{}", style::warn(&format!("Manual resolution: {}", e))),
        }
        if apply_to.is_some() {
            anyhow::bail!("manual resolutions cannot be applied; edit the request directly");
        }
        return Ok(());
    }

    match &resolved.content {
        Some(content) => print!("{}", content),
        None => eprintln!("{}", style::dim(&format!("'{}' will be removed", path))),
    }

    if let Some(request_path) = apply_to {
        let mut request = ConflictCheckRequest::load_from_file(request_path)
            .with_context(|| format!("failed to read request {}", request_path.display()))?;
        ConflictResolver::apply(&mut request.changes, conflict, &resolved)?;
        let json = serde_json::to_string_pretty(&request).context("failed to serialize request")?;
        std::fs::write(request_path, json).context("failed to write request")?;
        eprintln!(
            "{}",
            style::success(&format!(
                "Resolved '{}' with {} in {}",
                path,
                resolution,
                request_path.display()
            ))
        );
    }

    Ok(())
}

fn cmd_init(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    let contents = format!(
        "# gittr configuration\n# See documentation for all available options.\n\n{}",
        AppConfig::default().to_toml()?
    );
    std::fs::write(output, contents).context("failed to write config file")?;

    println!("Default configuration written to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Set repository.path and repository.default_target_branch");
    println!("  2. Validate with: gittr validate --config {}", output.display());

    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {}", config_path.display());
    println!();

    let config = AppConfig::load_from_file(config_path).context("failed to parse configuration")?;
    println!("  [OK] TOML structure is valid");

    match config.validate() {
        Ok(()) => println!("  [OK] All fields are valid"),
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    println!();
    println!("Configuration summary:");
    println!("  Log level      : {}", config.log.level);
    println!(
        "  Repository     : {}",
        config
            .repository
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "current directory".to_string())
    );
    println!("  Target branch  : {}", config.repository.default_target_branch);
    println!("  Max file size  : {} bytes", config.snapshot.max_file_bytes);
    println!(
        "  Binary files   : {}",
        if config.snapshot.skip_binary { "skipped" } else { "compared" }
    );
    println!();
    println!("Configuration is valid.");

    Ok(())
}
