use clap::ArgMatches;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use varscout_core::run::{RunOptions, execute_run, generate_summary};
use varscout_core::sheet::CommitPolicy;
use varscout_scanner::{DEFAULT_TIMEOUT_SECS, resolve_page};

/// Expand a leading `~` in a user supplied path
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Route log output to stderr so it never interleaves with the summary.
/// WARN by default, DEBUG with `--verbose`; `RUST_LOG` overrides both.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed (tests, repeated calls)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build run options from the `scrape` subcommand arguments
pub fn build_run_options(sub_matches: &ArgMatches, quiet: bool) -> Result<RunOptions, String> {
    let path_arg = |name: &str| -> Result<PathBuf, String> {
        sub_matches
            .get_one::<String>(name)
            .map(|raw| expand_path(raw))
            .ok_or_else(|| format!("Missing value for --{}", name))
    };

    let commit = sub_matches
        .get_one::<String>("commit")
        .map(String::as_str)
        .unwrap_or("row");
    let commit = CommitPolicy::from_str(commit)
        .ok_or_else(|| format!("Unknown commit policy '{}'", commit))?;

    Ok(RunOptions {
        input: path_arg("input")?,
        output: path_arg("output")?,
        found_path: path_arg("found")?,
        not_found_path: path_arg("not-found")?,
        commit,
        user_agent: sub_matches.get_one::<String>("user-agent").cloned(),
        timeout_secs: sub_matches
            .get_one::<u64>("timeout")
            .copied()
            .unwrap_or(DEFAULT_TIMEOUT_SECS),
        show_progress_bar: !quiet,
    })
}

pub async fn handle_scrape(sub_matches: &ArgMatches, quiet: bool) {
    let options = match build_run_options(sub_matches, quiet) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if !quiet {
        println!("{} Links: {}", "→".blue(), display(&options.input));
        println!("{} Spreadsheet: {}", "→".blue(), display(&options.output));
        println!(
            "{} Commit: {}",
            "→".blue(),
            match options.commit {
                CommitPolicy::PerRow => "after every row",
                CommitPolicy::PerLink => "after every link",
            }
        );
        println!();
    }

    let progress_callback = Arc::new(|msg: String| {
        println!("{}", msg.yellow());
    });

    let summary = match execute_run(options, Some(progress_callback)).await {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("{} Scrape failed: {:#}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    if !quiet {
        println!("\n{} Scrape complete!\n", "✓".green().bold());
    }
    print!("{}", generate_summary(&summary));
}

/// Resolve the variants of a saved page and render them as pretty JSON
pub fn inspect_file(path: &Path) -> Result<String, String> {
    let html = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let listing = resolve_page(&html)
        .map_err(|e| format!("Could not resolve variants in {}: {}", path.display(), e))?;
    serde_json::to_string_pretty(&listing).map_err(|e| e.to_string())
}

pub fn handle_inspect(sub_matches: &ArgMatches) {
    let Some(path) = sub_matches.get_one::<PathBuf>("FILE") else {
        eprintln!("{} Missing page file", "✗".red().bold());
        std::process::exit(1);
    };

    match inspect_file(&expand_path(&path.to_string_lossy())) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn display(path: &Path) -> colored::ColoredString {
    path.display().to_string().bright_white()
}
