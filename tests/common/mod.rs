//! Shared test fixtures for the trends-report integration tests.
//!
//! Provides `FakeClient`, a scripted [`TrendsClient`] that never touches the
//! network, and helpers for building small synthetic trends tables.

#![allow(dead_code)]

use std::collections::VecDeque;

use time::{Date, Duration, Month};
use trends_report::{QueryRequest, Result, TrendsClient, TrendsError, TrendsTable};

/// A [`TrendsClient`] that replays canned responses in order.
///
/// When the script runs out, the last response is repeated. Every call is
/// recorded so tests can assert on how often (and with what) the client was hit.
pub struct FakeClient {
    responses: VecDeque<Response>,
    last: Option<Response>,
    pub calls: Vec<QueryRequest>,
}

#[derive(Clone)]
pub enum Response {
    Table(TrendsTable),
    RateLimited,
    Failure(String),
}

impl FakeClient {
    pub fn new(responses: Vec<Response>) -> Self {
        Self {
            responses: responses.into(),
            last: None,
            calls: Vec::new(),
        }
    }

    pub fn returning(table: TrendsTable) -> Self {
        Self::new(vec![Response::Table(table)])
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }
}

impl TrendsClient for FakeClient {
    fn interest_over_time(&mut self, request: &QueryRequest) -> Result<TrendsTable> {
        self.calls.push(request.clone());
        let response = match self.responses.pop_front() {
            Some(r) => {
                self.last = Some(r.clone());
                r
            }
            None => self
                .last
                .clone()
                .unwrap_or_else(|| Response::Failure("no scripted response".to_string())),
        };
        match response {
            Response::Table(table) => Ok(table),
            Response::RateLimited => Err(TrendsError::RateLimited("HTTP 429".to_string())),
            Response::Failure(msg) => Err(TrendsError::Client(msg)),
        }
    }
}

// ---------------------------------------------------------------------------
// Table builders
// ---------------------------------------------------------------------------

pub fn date(year: i32, month: u8, day: u8) -> Date {
    let month = Month::try_from(month).unwrap();
    Date::from_calendar_date(year, month, day).unwrap()
}

/// `count` consecutive days starting at `start`.
pub fn days_from(start: Date, count: usize) -> Vec<Date> {
    (0..count)
        .map(|i| start + Duration::days(i as i64))
        .collect()
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Table with one score column per `(keyword, values)` pair plus an
/// all-false `isPartial` column, the way the Google client returns it.
pub fn table_with(dates: Vec<Date>, columns: &[(&str, Vec<u32>)]) -> TrendsTable {
    let rows = dates.len();
    let mut table = TrendsTable::new(dates);
    for (name, values) in columns {
        table
            .push_scores(name, values.iter().map(|v| Some(*v)).collect())
            .unwrap();
    }
    table.push_flags("isPartial", vec![false; rows]).unwrap();
    table
}

/// The three-day single keyword table used across the suite.
pub fn pizza_table() -> TrendsTable {
    table_with(
        vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)],
        &[("pizza", vec![10, 42, 87])],
    )
}

/// `rows` days of data for each of `keywords`, values cycling through 0..=100.
pub fn long_table(keywords: &[&str], rows: usize) -> TrendsTable {
    let dates = days_from(date(2023, 1, 1), rows);
    let columns: Vec<(&str, Vec<u32>)> = keywords
        .iter()
        .enumerate()
        .map(|(k, name)| {
            let values = (0..rows).map(|i| ((i * 7 + k * 13) % 101) as u32).collect();
            (*name, values)
        })
        .collect();
    table_with(dates, &columns)
}

pub fn empty_table() -> TrendsTable {
    TrendsTable::new(Vec::new())
}
