// Tests for the scrape run loop

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use varscout_core::run::{
    LinkOutcome, RunOptions, RunSummary, ScrapeSession, execute_run, generate_summary,
};
use varscout_core::sheet::{CommitPolicy, VariantSheet};
use varscout_scanner::resolve_page;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const SELECTS: &str = r#"
    <div class="x-msku__box-cont">
        <select selectboxlabel="Color">
            <option value="-1">- Select -</option>
            <option value="5">Red</option>
            <option value="6">Blue (Out of stock)</option>
        </select>
    </div>
    <div class="x-msku__box-cont">
        <select selectboxlabel="Size">
            <option value="-1">- Select -</option>
            <option value="2">M</option>
        </select>
    </div>"#;

fn listing_page(variants_json: &str) -> String {
    format!(
        r#"<html><head>
        <script>$rwidgets([["MSKU",{{"itemVariationsMap":{}}}]]);</script>
        </head><body>{}</body></html>"#,
        variants_json, SELECTS
    )
}

fn plain_page() -> String {
    "<html><head><script>var x = {\"a\": 1};</script></head><body>No variants</body></html>"
        .to_string()
}

fn run_options(dir: &Path, commit: CommitPolicy) -> RunOptions {
    RunOptions {
        input: dir.join("links.txt"),
        output: dir.join("output.csv"),
        found_path: dir.join("variation_found.txt"),
        not_found_path: dir.join("variation_not_found.txt"),
        commit,
        user_agent: None,
        timeout_secs: 5,
        show_progress_bar: false,
    }
}

fn read_rows(path: &PathBuf) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

async fn mount_page(server: &MockServer, page_path: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("content-type", "text/html")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

// ============================================================================
// End-to-end Run Tests
// ============================================================================

#[tokio::test]
async fn test_run_sorts_links_into_found_not_found_and_skipped() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(
        &server,
        "/itm/111",
        200,
        listing_page(
            r#"{"9001":{"price":"US $5.00","quantity":3,"traitValuesMap":{"Color":5,"Size":2}},
                "9002":{"price":"US $6.00","quantity":0,"traitValuesMap":{"Color":6,"Size":2}}}"#,
        ),
    )
    .await;
    mount_page(&server, "/itm/222", 200, plain_page()).await;
    mount_page(&server, "/itm/333", 404, "gone".to_string()).await;
    // Trait missing from the dropdowns: the page is dropped, the run continues
    mount_page(
        &server,
        "/itm/444",
        200,
        listing_page(r#"{"1":{"traitValuesMap":{"Material":1}}}"#),
    )
    .await;

    let links = [
        format!("{}/itm/111?hash=item1", server.uri()),
        format!("{}/itm/222", server.uri()),
        format!("{}/itm/333", server.uri()),
        format!("{}/itm/444", server.uri()),
    ];
    fs::write(
        temp_dir.path().join("links.txt"),
        links.iter().map(|l| format!("{}  \n", l)).collect::<String>(),
    )
    .unwrap();

    let options = run_options(temp_dir.path(), CommitPolicy::PerRow);
    let summary = execute_run(options, None).await.unwrap();

    assert_eq!(
        summary,
        RunSummary {
            total_links: 4,
            with_variants: 1,
            without_variants: 2,
            skipped: 1,
            rows_written: 2,
        }
    );

    let found = fs::read_to_string(temp_dir.path().join("variation_found.txt")).unwrap();
    assert_eq!(found, format!("{}\n", links[0]));

    let not_found = fs::read_to_string(temp_dir.path().join("variation_not_found.txt")).unwrap();
    assert_eq!(not_found, format!("{}\n{}\n", links[1], links[3]));

    let rows = read_rows(&temp_dir.path().join("output.csv"));
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "Red M");
    assert_eq!(rows[0][1], "9001");
    assert_eq!(rows[0][2], "US $5.00");
    assert_eq!(rows[0][13], "111");
    assert_eq!(rows[1][0], "Blue M");
    assert_eq!(rows[1][5], "0");
}

#[tokio::test]
async fn test_run_reports_skipped_links_through_callback() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    mount_page(&server, "/itm/500", 500, "boom".to_string()).await;
    fs::write(
        temp_dir.path().join("links.txt"),
        format!("{}/itm/500\n", server.uri()),
    )
    .unwrap();

    let messages: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let messages_clone = messages.clone();
    let callback = Arc::new(move |msg: String| {
        messages_clone.lock().unwrap().push(msg);
    });

    let options = run_options(temp_dir.path(), CommitPolicy::PerLink);
    let summary = execute_run(options, Some(callback)).await.unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.with_variants, 0);
    assert_eq!(summary.without_variants, 0);

    let messages = messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("HTTP 500"));

    // Skipped links appear in neither tracking file; nothing was processed
    assert!(!temp_dir.path().join("variation_found.txt").exists());
    assert!(!temp_dir.path().join("variation_not_found.txt").exists());
}

#[tokio::test]
async fn test_run_with_empty_links_file_writes_header_only() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("links.txt"), "\n  \n").unwrap();

    let options = run_options(temp_dir.path(), CommitPolicy::PerRow);
    let summary = execute_run(options, None).await.unwrap();

    assert_eq!(summary, RunSummary::default());
    let content = fs::read_to_string(temp_dir.path().join("output.csv")).unwrap();
    assert_eq!(content.lines().count(), 1);
}

#[tokio::test]
async fn test_run_fails_when_links_file_missing() {
    let temp_dir = TempDir::new().unwrap();

    let options = run_options(temp_dir.path(), CommitPolicy::PerRow);
    let result = execute_run(options, None).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_run_fails_when_output_cannot_be_created() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("links.txt"), "https://www.ebay.com/itm/1\n").unwrap();

    let mut options = run_options(temp_dir.path(), CommitPolicy::PerRow);
    options.output = temp_dir.path().join("missing/output.csv");
    let result = execute_run(options, None).await;

    assert!(result.is_err());
    assert!(format!("{:#}", result.unwrap_err()).contains("output.csv"));
}

// ============================================================================
// Session Tests
// ============================================================================

fn session_in(dir: &Path) -> ScrapeSession {
    let sheet = VariantSheet::create(&dir.join("output.csv"), CommitPolicy::PerRow).unwrap();
    ScrapeSession::new(
        sheet,
        &dir.join("variation_found.txt"),
        &dir.join("variation_not_found.txt"),
    )
}

#[test]
fn test_session_page_without_variants_is_recorded_as_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = session_in(temp_dir.path());

    let listing = resolve_page(&plain_page()).unwrap();
    let outcome = session.record("https://www.ebay.com/itm/1", &listing).unwrap();

    assert_eq!(outcome, LinkOutcome::NotFound);
    assert_eq!(session.not_found_links(), ["https://www.ebay.com/itm/1"]);
    assert!(session.found_links().is_empty());
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("variation_not_found.txt")).unwrap(),
        "https://www.ebay.com/itm/1\n"
    );
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("variation_found.txt")).unwrap(),
        ""
    );
}

#[test]
fn test_session_label_collision_writes_one_row() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = session_in(temp_dir.path());

    let listing = resolve_page(&listing_page(
        r#"{"1":{"price":"first","traitValuesMap":{"Color":5,"Size":2}},
            "2":{"price":"second","traitValuesMap":{"Color":5,"Size":2}}}"#,
    ))
    .unwrap();
    let outcome = session.record("https://www.ebay.com/itm/77", &listing).unwrap();

    assert_eq!(outcome, LinkOutcome::Found(1));
    let summary = session.finish(1).unwrap();
    assert_eq!(summary.rows_written, 1);

    let rows = read_rows(&temp_dir.path().join("output.csv"));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][1], "2");
    assert_eq!(rows[0][2], "second");
}

#[test]
fn test_session_skip_counts_only() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = session_in(temp_dir.path());

    assert_eq!(session.skip("https://www.ebay.com/itm/9"), LinkOutcome::Skipped);
    let summary = session.finish(1).unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.with_variants + summary.without_variants, 0);
}

// ============================================================================
// Summary Tests
// ============================================================================

#[test]
fn test_generate_summary_three_lines() {
    let summary = RunSummary {
        total_links: 10,
        with_variants: 6,
        without_variants: 4,
        skipped: 0,
        rows_written: 31,
    };
    let report = generate_summary(&summary);

    assert_eq!(report.lines().count(), 3);
    assert!(report.contains("Links processed: 10"));
    assert!(report.contains("Found variations in these links: 6"));
    assert!(report.contains("Links without variations: 4"));
}

#[test]
fn test_generate_summary_mentions_skipped_links() {
    let summary = RunSummary {
        total_links: 3,
        with_variants: 1,
        without_variants: 1,
        skipped: 1,
        rows_written: 2,
    };
    let report = generate_summary(&summary);

    assert_eq!(report.lines().count(), 4);
    assert!(report.contains("Links skipped (fetch failed): 1"));
}
