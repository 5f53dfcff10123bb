//! Tests for the session state machine, driven by a scripted client.

mod common;

use common::{date, empty_table, pizza_table, strings, table_with, FakeClient, Response};
use trends_report::{
    Category, Geography, QueryOutcome, QueryRequest, Session, SessionState, TimeWindow,
    TrendsError,
};

fn session(client: FakeClient) -> Session<FakeClient> {
    Session::new(client).with_export_date(date(2024, 1, 5))
}

fn pizza_request() -> QueryRequest {
    QueryRequest::parse("pizza").unwrap()
}

// ---------------------------------------------------------------------------
// Querying
// ---------------------------------------------------------------------------

#[test]
fn starts_idle() {
    let session = session(FakeClient::returning(pizza_table()));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.series().is_none());
    assert!(session.table().is_none());
}

#[test]
fn six_keywords_never_reach_the_client() {
    let mut session = session(FakeClient::returning(pizza_table()));
    let err = session
        .query_form(
            "a, b, c, d, e, f",
            Geography::default(),
            TimeWindow::default(),
            Category::default(),
        )
        .unwrap_err();
    assert!(matches!(err, TrendsError::Validation(_)));
    assert_eq!(session.client().call_count(), 0);
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn query_with_data_moves_to_queried() {
    let mut session = session(FakeClient::returning(pizza_table()));
    let outcome = session.query(pizza_request()).unwrap();

    assert_eq!(
        outcome,
        QueryOutcome::Data {
            rows: 3,
            missing_keywords: Vec::new(),
        }
    );
    assert_eq!(session.state(), SessionState::Queried);
    let (header, rows) = session.table().unwrap();
    assert_eq!(header, strings(&["Date", "pizza"]));
    assert_eq!(rows[1], strings(&["2024-01-02", "42"]));
    assert_eq!(session.metadata().unwrap().keyword_list(), "pizza");
    assert!(session.report().is_none());
}

#[test]
fn query_form_passes_selections_to_client() {
    let mut session = session(FakeClient::returning(pizza_table()));
    session
        .query_form(
            " pizza ",
            Geography::from_code("US").unwrap(),
            TimeWindow::LastMonth,
            Category::from_id(71).unwrap(),
        )
        .unwrap();

    let sent = &session.client().calls[0];
    assert_eq!(sent.keywords(), strings(&["pizza"]).as_slice());
    assert_eq!(sent.geography.code, "US");
    assert_eq!(sent.time_window, TimeWindow::LastMonth);
    assert_eq!(sent.category.id, 71);
    assert_eq!(session.metadata().unwrap().geography_label, "United States");
}

#[test]
fn empty_result_clears_session() {
    let mut session = session(FakeClient::new(vec![
        Response::Table(pizza_table()),
        Response::Table(empty_table()),
    ]));
    session.query(pizza_request()).unwrap();
    assert_eq!(session.state(), SessionState::Queried);

    let outcome = session.query(pizza_request()).unwrap();
    assert_eq!(outcome, QueryOutcome::NoData);
    assert!(!outcome.has_data());
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.series().is_none());

    let err = session.prepare_report().unwrap_err();
    assert!(matches!(err, TrendsError::InvalidState(_)));
}

#[test]
fn rate_limit_leaves_state_unchanged() {
    let mut session = session(FakeClient::new(vec![
        Response::Table(pizza_table()),
        Response::RateLimited,
    ]));
    session.query(pizza_request()).unwrap();

    let err = session
        .query(QueryRequest::parse("pasta").unwrap())
        .unwrap_err();
    assert!(err.is_rate_limited());
    assert!(err.user_message().contains("too many requests"));
    assert_eq!(session.state(), SessionState::Queried);
    assert_eq!(session.request().unwrap().keywords(), strings(&["pizza"]).as_slice());
}

#[test]
fn client_failure_from_idle_stays_idle() {
    let mut session = session(FakeClient::new(vec![Response::Failure(
        "connection reset".to_string(),
    )]));
    let err = session.query(pizza_request()).unwrap_err();
    assert!(matches!(err, TrendsError::Client(_)));
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn missing_keyword_is_reported() {
    let table = table_with(vec![date(2024, 1, 1)], &[("pizza", vec![9])]);
    let mut session = session(FakeClient::returning(table));
    let outcome = session
        .query(QueryRequest::parse("pizza, calzone").unwrap())
        .unwrap();
    assert_eq!(
        outcome,
        QueryOutcome::Data {
            rows: 1,
            missing_keywords: strings(&["calzone"]),
        }
    );
    assert_eq!(session.metadata().unwrap().keywords, strings(&["pizza"]));
}

// ---------------------------------------------------------------------------
// Report and download
// ---------------------------------------------------------------------------

#[test]
fn full_cycle() {
    let mut session = session(FakeClient::returning(pizza_table()));
    session.query(pizza_request()).unwrap();

    let report = session.prepare_report().unwrap().clone();
    assert_eq!(session.state(), SessionState::ReportReady);
    assert_eq!(report.file_name, "pizza_trend.pdf");
    assert!(report.bytes.starts_with(b"%PDF"));
    let scratch = session.chart_path().unwrap().to_path_buf();
    assert!(scratch.exists());
    assert!(session.chart().is_some());

    let downloaded = session.finalize_download().unwrap();
    assert_eq!(downloaded, report);
    assert_eq!(session.state(), SessionState::Downloaded);
    assert_eq!(session.downloaded_file(), Some("pizza_trend.pdf"));
    assert!(session.chart_path().is_none());
    assert!(!scratch.exists());

    session.reset();
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.downloaded_file().is_none());
}

#[test]
fn prepare_report_twice_returns_same_report() {
    let mut session = session(FakeClient::returning(pizza_table()));
    session.query(pizza_request()).unwrap();
    let first = session.prepare_report().unwrap().clone();
    let second = session.prepare_report().unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(session.state(), SessionState::ReportReady);
}

#[test]
fn prepare_report_from_idle_is_invalid_state() {
    let mut session = session(FakeClient::returning(pizza_table()));
    let err = session.prepare_report().unwrap_err();
    assert!(matches!(err, TrendsError::InvalidState(_)));
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn finalize_download_from_queried_is_invalid_state() {
    let mut session = session(FakeClient::returning(pizza_table()));
    session.query(pizza_request()).unwrap();
    let err = session.finalize_download().unwrap_err();
    assert!(matches!(err, TrendsError::InvalidState(_)));
    assert_eq!(session.state(), SessionState::Queried);
    assert!(session.series().is_some());
}

#[test]
fn new_query_after_report_replaces_results() {
    let mut session = session(FakeClient::new(vec![
        Response::Table(pizza_table()),
        Response::Table(table_with(vec![date(2024, 2, 1)], &[("pasta", vec![1])])),
    ]));
    session.query(pizza_request()).unwrap();
    session.prepare_report().unwrap();

    session.query(QueryRequest::parse("pasta").unwrap()).unwrap();
    assert_eq!(session.state(), SessionState::Queried);
    assert!(session.report().is_none());
    assert_eq!(session.series().unwrap().keywords(), strings(&["pasta"]).as_slice());
}

#[test]
fn reset_from_report_ready() {
    let mut session = session(FakeClient::returning(pizza_table()));
    session.query(pizza_request()).unwrap();
    session.prepare_report().unwrap();
    session.reset();
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.report().is_none());
}
