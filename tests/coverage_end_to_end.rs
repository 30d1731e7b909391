mod common;

use std::time::Duration;

use camino::Utf8PathBuf;
use chrono::TimeDelta;
use common::{midnight, minutes, serve_http};
use radiocc::catalog::{CatalogClient, RawPass};
use radiocc::coverage::{CoverageMatcher, CoverageParams, OccultationWindow, Pass};
use radiocc::report::{
    covered_table, occultations_table, passes_table, read_csv, write_csv, COVERED_CSV,
    COVERED_FILE, OCCULTATIONS_FILE, PASSES_FILE,
};

const PASSES: &str = r#"[
    {"groundstation": "KLZ", "time_start": "2024-01-01T00:00:00Z", "time_end": "2024-01-01T01:00:00Z", "owlt": "10:00", "mspa": "false"},
    {"groundstation": "ABC", "time_start": "2024-01-01T00:05:00Z", "time_end": "2024-01-01T00:45:00Z", "owlt": "10:00", "mspa": "false"},
    {"groundstation": "DEF", "time_start": "2024-01-01T01:00:00Z", "time_end": "2024-01-01T03:00:00Z", "owlt": "10:00", "mspa": "true"},
    {"groundstation": "XYZ", "time_start": "2024-01-01T04:00:00Z", "time_end": "2024-01-01T05:00:00Z"}
]"#;

const OCCULTATIONS: &str = r#"[
    {"time_start": "2024-01-01T00:10:00Z", "time_end": "2024-01-01T00:20:00Z"},
    {"time_start": "2024-01-01T01:30:00Z", "time_end": "2024-01-01T01:40:00Z"},
    {"time_start": "2024-01-01T04:10:00Z", "time_end": "2024-01-01T04:20:00Z"}
]"#;

/// Catalog answering the passes or the occultations depending on the path.
async fn serve_catalog(n: usize) -> String {
    let base = serve_http(n, |request| {
        if request.starts_with("GET /tgo/passes") {
            ("200 OK", PASSES)
        } else {
            ("200 OK", OCCULTATIONS)
        }
    })
    .await;
    format!("{base}/{{mission}}/{{event_type}}")
}

fn window(ingress: i64, egress: i64) -> OccultationWindow {
    OccultationWindow::new(minutes(midnight(), ingress), minutes(midnight(), egress)).unwrap()
}

#[tokio::test]
async fn test_catalog_to_covered_artifacts() {
    let template = serve_catalog(2).await;
    let client = CatalogClient::new(template, "tgo", Duration::from_secs(5)).unwrap();
    let (start, end) = (midnight(), minutes(midnight(), 24 * 60));

    let (passes, windows) = tokio::try_join!(
        client.fetch_passes(&start, &end),
        client.fetch_occultations(&start, &end)
    )
    .unwrap();
    // the XYZ record has no owlt and is skipped
    assert_eq!(passes.len(), 3);
    assert_eq!(windows.len(), 3);

    let report = CoverageMatcher::new(passes, &CoverageParams::default()).evaluate(windows);

    // KLZ is on the default denylist, DEF is MSPA
    let stations: Vec<&str> = report
        .accepted_passes
        .iter()
        .map(|p| p.pass.groundstation.as_str())
        .collect();
    assert_eq!(stations, vec!["ABC"]);
    assert_eq!(report.accepted_passes[0].start_corr(), minutes(midnight(), -5));
    assert_eq!(report.accepted_passes[0].end_corr(), minutes(midnight(), 35));
    assert_eq!(report.covered, vec![window(10, 20)]);

    let dir = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let now = midnight();
    passes_table(&report.accepted_passes)
        .write_to(&dir, PASSES_FILE, &now)
        .unwrap();
    occultations_table(&report.windows)
        .write_to(&dir, OCCULTATIONS_FILE, &now)
        .unwrap();
    let covered_path = covered_table(&report.covered)
        .write_to(&dir, COVERED_FILE, &now)
        .unwrap();
    write_csv(&dir.join(COVERED_CSV), &report.covered).unwrap();

    let text = std::fs::read_to_string(covered_path).unwrap();
    assert!(text.starts_with("Covered occultations (UTC): 2024-01-01"));
    let rows: Vec<&str> = text.lines().filter(|l| l.contains("00:10:00")).collect();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].contains("2024-01-01 00:20:00"));

    let back: Vec<OccultationWindow> = read_csv(&dir.join(COVERED_CSV)).unwrap();
    assert_eq!(back, report.covered);
}

#[test]
fn test_denylisted_station_does_not_cover() {
    let klz = Pass::new(
        "KLZ",
        midnight(),
        minutes(midnight(), 60),
        TimeDelta::zero(),
        false,
    )
    .unwrap();
    let w = window(10, 20);

    let strict = CoverageMatcher::new(vec![klz.clone()], &CoverageParams::default());
    assert!(strict.passes().is_empty());
    assert!(!strict.is_covered(&w));

    let open = CoverageParams::builder()
        .excluded_stations(Vec::<String>::new())
        .build()
        .unwrap();
    assert!(CoverageMatcher::new(vec![klz], &open).is_covered(&w));
}

#[test]
fn test_mspa_pass_counts_when_allowed() {
    let raw: RawPass = serde_json::from_str(
        r#"{"groundstation": " NNO ", "time_start": "2024-01-01 00:00:00", "time_end": "2024-01-01T00:40:00Z", "owlt": "05:00", "mspa": "TRUE"}"#,
    )
    .unwrap();
    let pass = Pass::try_from(raw).unwrap();
    assert_eq!(pass.groundstation, "NNO");
    assert!(pass.mspa);
    assert_eq!(pass.owlt, TimeDelta::minutes(5));

    let w = window(10, 20);
    assert!(!CoverageMatcher::new(vec![pass.clone()], &CoverageParams::default()).is_covered(&w));

    let params = CoverageParams::builder().exclude_mspa(false).build().unwrap();
    assert!(CoverageMatcher::new(vec![pass], &params).is_covered(&w));
}

#[test]
fn test_split_coverage_across_two_passes() {
    let params = CoverageParams::builder()
        .excluded_stations(Vec::<String>::new())
        .margin(TimeDelta::minutes(5))
        .build()
        .unwrap();
    let pass = |gs: &str, start: i64, end: i64| {
        Pass::new(
            gs,
            minutes(midnight(), start),
            minutes(midnight(), end),
            TimeDelta::zero(),
            false,
        )
        .unwrap()
    };
    let before = pass("NNO", 0, 12);
    let after = pass("CEB", 18, 30);

    let matcher = CoverageMatcher::new(vec![after, before.clone()], &params);
    assert_eq!(matcher.passes()[0].pass, before);
    assert!(matcher.is_covered(&window(10, 20)));
    assert!(!matcher.is_covered(&window(10, 26)));
    assert!(!CoverageMatcher::new(vec![before], &params).is_covered(&window(10, 20)));
}

#[test]
fn test_klz_and_abc_passes() {
    let pass = |gs: &str, start: i64, end: i64| {
        Pass::new(
            gs,
            minutes(midnight(), start),
            minutes(midnight(), end),
            TimeDelta::zero(),
            false,
        )
        .unwrap()
    };
    let passes = vec![pass("KLZ", 0, 30), pass("ABC", 0, 30), pass("ABC", 60, 80)];

    let matcher = CoverageMatcher::new(passes, &CoverageParams::default());
    let report = matcher.evaluate(vec![window(10, 20)]);
    assert_eq!(report.covered, vec![window(10, 20)]);

    let stations: Vec<&str> = report
        .accepted_passes
        .iter()
        .map(|p| p.pass.groundstation.as_str())
        .collect();
    assert_eq!(stations, vec!["ABC", "ABC"]);
}
