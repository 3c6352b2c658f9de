use crate::links::{item_number, load_links, write_link_list};
use crate::sheet::{CommitPolicy, VariantSheet};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use varscout_scanner::{FetcherConfig, VariantListing, resolve_page};

/// Options for configuring a scrape run
pub struct RunOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub found_path: PathBuf,
    pub not_found_path: PathBuf,
    pub commit: CommitPolicy,
    pub user_agent: Option<String>,
    pub timeout_secs: u64,
    pub show_progress_bar: bool,
}

/// Callback for reporting per-link warnings to the user
pub type RunProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// What happened to one link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// At least one variant resolved; holds the number of rows written
    Found(usize),
    /// Page fetched, but no variant resolved
    NotFound,
    /// Page could not be fetched
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total_links: usize,
    pub with_variants: usize,
    pub without_variants: usize,
    pub skipped: usize,
    pub rows_written: usize,
}

/// State that lives across links: the open sheet and both link lists.
pub struct ScrapeSession {
    sheet: VariantSheet,
    found_path: PathBuf,
    not_found_path: PathBuf,
    found: Vec<String>,
    not_found: Vec<String>,
    skipped: usize,
}

impl ScrapeSession {
    pub fn new(sheet: VariantSheet, found_path: &Path, not_found_path: &Path) -> Self {
        Self {
            sheet,
            found_path: found_path.to_path_buf(),
            not_found_path: not_found_path.to_path_buf(),
            found: Vec::new(),
            not_found: Vec::new(),
            skipped: 0,
        }
    }

    /// Write the rows for `link` and bring both tracking files up to date.
    pub fn record(&mut self, link: &str, listing: &VariantListing) -> Result<LinkOutcome> {
        let outcome = if listing.is_empty() {
            self.not_found.push(link.to_string());
            LinkOutcome::NotFound
        } else {
            self.found.push(link.to_string());
            for (label, record) in listing {
                self.sheet.append(link, label, record)?;
            }
            self.sheet.end_link()?;
            LinkOutcome::Found(listing.len())
        };

        write_link_list(&self.found_path, &self.found)?;
        write_link_list(&self.not_found_path, &self.not_found)?;
        Ok(outcome)
    }

    pub fn skip(&mut self, link: &str) -> LinkOutcome {
        debug!("Skipping {}", link);
        self.skipped += 1;
        LinkOutcome::Skipped
    }

    pub fn found_links(&self) -> &[String] {
        &self.found
    }

    pub fn not_found_links(&self) -> &[String] {
        &self.not_found
    }

    pub fn finish(mut self, total_links: usize) -> Result<RunSummary> {
        self.sheet.flush()?;
        Ok(RunSummary {
            total_links,
            with_variants: self.found.len(),
            without_variants: self.not_found.len(),
            skipped: self.skipped,
            rows_written: self.sheet.rows_written(),
        })
    }
}

/// Execute a scrape run with the given options.
///
/// Links are processed one after another. A link that cannot be fetched or
/// resolved is reported and the run moves on; failing to write any output
/// file ends the run with an error.
pub async fn execute_run(
    options: RunOptions,
    progress_callback: Option<RunProgressCallback>,
) -> Result<RunSummary> {
    let RunOptions {
        input,
        output,
        found_path,
        not_found_path,
        commit,
        user_agent,
        timeout_secs,
        show_progress_bar,
    } = options;

    let links = load_links(&input)?;
    info!("Loaded {} links from {}", links.len(), input.display());

    let mut fetcher_config = FetcherConfig::new().with_timeout(timeout_secs);
    if let Some(user_agent) = user_agent {
        fetcher_config = fetcher_config.with_user_agent(user_agent);
    }
    let fetcher = fetcher_config
        .build()
        .context("Failed to create HTTP client")?;

    let sheet = VariantSheet::create(&output, commit)?;
    info!("Writing variant rows to {} ({:?})", sheet.path().display(), commit);
    let mut session = ScrapeSession::new(sheet, &found_path, &not_found_path);

    let progress_bar = if show_progress_bar {
        let pb = ProgressBar::new(links.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} Scraping [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("=> "),
        );
        Some(pb)
    } else {
        None
    };

    let report = |msg: String| {
        if let Some(ref callback) = progress_callback {
            match progress_bar {
                Some(ref pb) => pb.suspend(|| callback(msg)),
                None => callback(msg),
            }
        }
    };

    for (idx, link) in links.iter().enumerate() {
        if let Some(ref pb) = progress_bar {
            pb.set_message(item_number(link).to_string());
        }

        let page = match fetcher.fetch(link).await {
            Ok(page) if page.is_ok() => page,
            Ok(page) => {
                report(format!(
                    "[!] Failed to fetch data for product {} ({}): HTTP {}",
                    idx + 1,
                    link,
                    page.status_code
                ));
                session.skip(link);
                advance(&progress_bar);
                continue;
            }
            Err(e) => {
                report(format!(
                    "[!] Failed to fetch data for product {} ({}): {}",
                    idx + 1,
                    link,
                    e
                ));
                session.skip(link);
                advance(&progress_bar);
                continue;
            }
        };

        let listing = match resolve_page(&page.body) {
            Ok(listing) => listing,
            Err(e) => {
                debug!("Variant extraction failed for {}: {}", link, e);
                report(format!("[!] Could not resolve variants for {}: {}", link, e));
                VariantListing::new()
            }
        };

        session.record(link, &listing)?;
        advance(&progress_bar);
    }

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message("done");
    }

    let summary = session.finish(links.len())?;
    info!(
        "Run complete: {} links, {} with variants, {} without, {} skipped",
        summary.total_links, summary.with_variants, summary.without_variants, summary.skipped
    );
    Ok(summary)
}

fn advance(progress_bar: &Option<ProgressBar>) {
    if let Some(pb) = progress_bar {
        pb.inc(1);
    }
}

/// Render the end-of-run summary
pub fn generate_summary(summary: &RunSummary) -> String {
    let mut report = String::new();
    report.push_str(&format!("Links processed: {}\n", summary.total_links));
    report.push_str(&format!(
        "Found variations in these links: {}\n",
        summary.with_variants
    ));
    report.push_str(&format!(
        "Links without variations: {}\n",
        summary.without_variants
    ));
    if summary.skipped > 0 {
        report.push_str(&format!("Links skipped (fetch failed): {}\n", summary.skipped));
    }
    report
}
