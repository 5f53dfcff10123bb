//! Tests for PDF layout and emission.

mod common;

use common::{date, long_table, pizza_table, strings};
use trends_report::report::{
    build_document, build_document_dated, layout_document, render_chart, FontStyle,
};
use trends_report::{
    normalize, InterestSeries, QueryRequest, ReportMetadata, TrendsError, TrendsTable,
};

fn series_and_metadata(table: &TrendsTable, keywords: &[&str]) -> (InterestSeries, ReportMetadata) {
    let request = QueryRequest::new(keywords.iter().copied()).unwrap();
    let series = normalize(table, request.keywords())
        .unwrap()
        .into_series()
        .unwrap();
    let metadata = ReportMetadata::for_request(&request, series.keywords());
    (series, metadata)
}

#[test]
fn pizza_report_table_matches_series() {
    let (series, metadata) = series_and_metadata(&pizza_table(), &["pizza"]);
    let layout = layout_document(&series, &metadata, 0.6, date(2024, 1, 5)).unwrap();

    assert_eq!(layout.page_count(), 2);
    assert_eq!(layout.table_header(), Some(strings(&["Date", "pizza"])));
    assert_eq!(
        layout.table_rows(),
        vec![
            strings(&["2024-01-01", "10"]),
            strings(&["2024-01-02", "42"]),
            strings(&["2024-01-03", "87"]),
        ]
    );
}

#[test]
fn chart_page_has_title_subtitle_and_chart() {
    let (series, metadata) = series_and_metadata(&pizza_table(), &["pizza"]);
    let layout = layout_document(&series, &metadata, 0.6, date(2024, 1, 5)).unwrap();
    let first = &layout.pages[0];

    let texts: Vec<&str> = first.texts().map(|t| t.text.as_str()).collect();
    assert!(texts.contains(&"Search trend: pizza"));
    assert!(texts.contains(&"Spain | last 12 months"));
    assert!(texts.contains(&"Category: All categories"));

    let chart = first.chart().unwrap();
    assert!((chart.width_mm - 190.0).abs() < 1e-4);
    assert!((chart.height_mm - 114.0).abs() < 1e-3);
    assert_eq!(first.cells().count(), 0);

    let title = first
        .texts()
        .find(|t| t.text.starts_with("Search trend"))
        .unwrap();
    assert_eq!(title.style, FontStyle::Bold);
}

#[test]
fn table_has_one_cell_per_value() {
    let keywords = ["a", "b", "c", "d"];
    let (series, metadata) = series_and_metadata(&long_table(&keywords, 12), &keywords);
    let layout = layout_document(&series, &metadata, 0.6, date(2024, 1, 5)).unwrap();

    let rows = layout.table_rows();
    assert_eq!(rows.len(), 12);
    assert!(rows.iter().all(|r| r.len() == keywords.len() + 1));
    assert_eq!(layout.table_header().unwrap().len(), 5);
}

#[test]
fn every_page_has_export_footer() {
    let (series, metadata) = series_and_metadata(&long_table(&["pizza"], 80), &["pizza"]);
    let layout = layout_document(&series, &metadata, 0.6, date(2024, 2, 9)).unwrap();

    assert!(layout.page_count() > 2);
    for page in &layout.pages {
        let footer = page
            .texts()
            .find(|t| t.text.starts_with("Exported on"))
            .unwrap();
        assert_eq!(footer.text, "Exported on 09/02/2024");
        assert_eq!(footer.style, FontStyle::Italic);
        assert!((footer.size_pt - 8.0).abs() < f32::EPSILON);
    }
}

#[test]
fn long_tables_paginate_and_repeat_header() {
    let (series, metadata) = series_and_metadata(&long_table(&["pizza"], 80), &["pizza"]);
    let layout = layout_document(&series, &metadata, 0.6, date(2024, 2, 9)).unwrap();

    assert_eq!(layout.table_rows().len(), 80);
    for page in &layout.pages[1..] {
        let header: Vec<&str> = page
            .cells()
            .filter(|c| c.header)
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(header, vec!["Date", "pizza"]);
        for cell in page.cells() {
            assert!(cell.y_mm + cell.height_mm <= 282.0 + 1e-3);
        }
    }
}

#[test]
fn empty_series_is_invalid_state() {
    let series = InterestSeries::new(strings(&["pizza"]), Vec::new()).unwrap();
    let request = QueryRequest::parse("pizza").unwrap();
    let metadata = ReportMetadata::for_request(&request, request.keywords());
    let err = layout_document(&series, &metadata, 0.6, date(2024, 1, 5)).unwrap_err();
    assert!(matches!(err, TrendsError::InvalidState(_)));
}

#[test]
fn build_document_on_empty_series_is_invalid_state() {
    let (series, _) = series_and_metadata(&pizza_table(), &["pizza"]);
    let chart = render_chart(&series, series.keywords()).unwrap();
    let empty = InterestSeries::new(strings(&["pizza"]), Vec::new()).unwrap();
    let request = QueryRequest::parse("pizza").unwrap();
    let metadata = ReportMetadata::for_request(&request, request.keywords());

    let err = build_document(&empty, &metadata, &chart).unwrap_err();
    assert!(matches!(err, TrendsError::InvalidState(_)));
    let err = build_document_dated(&empty, &metadata, &chart, date(2024, 1, 5)).unwrap_err();
    assert!(matches!(err, TrendsError::InvalidState(_)));
}

#[test]
fn build_document_emits_pdf_bytes() {
    let (series, metadata) = series_and_metadata(&pizza_table(), &["pizza"]);
    let chart = render_chart(&series, series.keywords()).unwrap();
    let bytes = build_document_dated(&series, &metadata, &chart, date(2024, 1, 5)).unwrap();
    assert!(bytes.len() > 1000);
    assert!(bytes.starts_with(b"%PDF"));
}
