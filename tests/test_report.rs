//! Tests for report naming and saving.

mod common;

use common::{date, pizza_table, strings};
use trends_report::report::report_file_name;
use trends_report::{normalize, render_chart, QueryRequest, Report, ReportMetadata};

fn pizza_report() -> Report {
    let request = QueryRequest::parse("pizza").unwrap();
    let series = normalize(&pizza_table(), request.keywords())
        .unwrap()
        .into_series()
        .unwrap();
    let metadata = ReportMetadata::for_request(&request, series.keywords());
    let chart = render_chart(&series, series.keywords()).unwrap();
    Report::build(&series, &metadata, &chart, date(2024, 1, 5)).unwrap()
}

#[test]
fn file_name_joins_keywords() {
    assert_eq!(report_file_name(&strings(&["pizza"])), "pizza_trend.pdf");
    assert_eq!(
        report_file_name(&strings(&["pizza", "pasta"])),
        "pizza_pasta_trend.pdf"
    );
}

#[test]
fn file_name_replaces_unsafe_characters() {
    assert_eq!(
        report_file_name(&strings(&["ice cream", "a/b", "why?"])),
        "ice_cream_a-b_why-_trend.pdf"
    );
}

#[test]
fn file_name_falls_back_when_empty() {
    assert_eq!(report_file_name(&[]), "report_trend.pdf");
}

#[test]
fn built_report_is_pdf() {
    let report = pizza_report();
    assert_eq!(report.file_name, "pizza_trend.pdf");
    assert_eq!(report.mime, "application/pdf");
    assert!(report.bytes.starts_with(b"%PDF"));
}

#[test]
fn save_to_writes_file() {
    let tmp = tempfile::tempdir().unwrap();
    let report = pizza_report();
    let dest = report.save_to(tmp.path().join("out")).unwrap();

    assert_eq!(dest, tmp.path().join("out").join("pizza_trend.pdf"));
    assert_eq!(std::fs::read(&dest).unwrap(), report.bytes);
    assert!(!dest.with_extension("pdf.tmp").exists());
}

#[test]
fn save_to_overwrites_previous_report() {
    let tmp = tempfile::tempdir().unwrap();
    let report = pizza_report();
    std::fs::write(tmp.path().join("pizza_trend.pdf"), b"stale").unwrap();

    let dest = report.save_to(tmp.path()).unwrap();
    assert_eq!(std::fs::read(dest).unwrap(), report.bytes);
}
