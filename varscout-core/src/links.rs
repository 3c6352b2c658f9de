// Link list bookkeeping: the input file and the two tracking files

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::warn;
use url::Url;

/// Load product links from a newline-delimited file.
///
/// Lines are trimmed and blank lines dropped. A line without a scheme gets
/// `https://` prepended; a line that still does not parse is skipped.
pub fn load_links(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read links file {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_link_line)
        .collect())
}

/// Parse a single line as a URL, trying to add https:// if needed
pub fn parse_link_line(line: &str) -> Option<String> {
    if Url::parse(line).is_ok() {
        return Some(line.to_string());
    }

    let with_scheme = format!("https://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    warn!("Skipping invalid link '{}'", line);
    None
}

/// Rewrite `path` so it holds exactly `links`, one per line.
pub fn write_link_list(path: &Path, links: &[String]) -> Result<()> {
    let mut content = String::with_capacity(links.iter().map(|l| l.len() + 1).sum());
    for link in links {
        content.push_str(link);
        content.push('\n');
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write link list {}", path.display()))
}

/// Item number of a listing link: the last path segment, without query.
///
/// `https://www.ebay.com/itm/1234567890?hash=item1` gives `1234567890`.
pub fn item_number(link: &str) -> &str {
    let last_segment = link.rsplit('/').next().unwrap_or(link);
    last_segment.split('?').next().unwrap_or(last_segment)
}
