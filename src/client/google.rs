//! Blocking HTTP client for the Google Trends web API.
//!
//! A query takes three requests: a cookie warm-up on the Trends home page
//! (once per client), an `explore` call that returns widget tokens, and a
//! `multiline` call for the `TIMESERIES` widget that returns the actual
//! interest-over-time rows. Both API responses carry an anti-hijacking
//! prefix that is stripped before JSON parsing.

use crate::client::TrendsClient;
use crate::config;
use crate::error::{Result, TrendsError};
use crate::models::{QueryRequest, TrendsTable};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use time::OffsetDateTime;

const TIMESERIES_WIDGET: &str = "TIMESERIES";

/// Google Trends client with a lazily built, cookie-aware HTTP client.
pub struct GoogleTrendsClient {
    host_language: String,
    tz_offset: i32,
    timeout: Duration,
    client: Option<Client>,
    warmed_up: bool,
}

impl Default for GoogleTrendsClient {
    fn default() -> Self {
        Self::new(
            config::DEFAULT_HOST_LANGUAGE,
            config::DEFAULT_TZ_OFFSET,
            Duration::from_secs(config::DEFAULT_TIMEOUT_SECS),
        )
    }
}

impl GoogleTrendsClient {
    /// Create a client.
    ///
    /// * `host_language` - UI language sent as `hl` (e.g. `"en-US"`); its
    ///   region suffix also picks the warm-up page.
    /// * `tz_offset` - Minutes west of UTC, sent as `tz`.
    /// * `timeout` - Per-request HTTP timeout.
    pub fn new(host_language: &str, tz_offset: i32, timeout: Duration) -> Self {
        Self {
            host_language: host_language.to_string(),
            tz_offset,
            timeout,
            client: None,
            warmed_up: false,
        }
    }

    pub fn host_language(&self) -> &str {
        &self.host_language
    }

    pub fn tz_offset(&self) -> i32 {
        self.tz_offset
    }

    fn client(&mut self) -> Result<Client> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        self.client = Some(client.clone());
        Ok(client)
    }

    /// Visit the Trends home page once so the cookie store holds a session cookie.
    fn warm_up(&mut self) -> Result<()> {
        if self.warmed_up {
            return Ok(());
        }
        let region = self
            .host_language
            .rsplit('-')
            .next()
            .unwrap_or("US")
            .to_string();
        let client = self.client()?;
        log::debug!("Warming up Google Trends session (geo={})", region);
        let resp = client
            .get(config::TRENDS_HOME)
            .query(&[("geo", region.as_str())])
            .send()?;
        check_status(resp)?;
        self.warmed_up = true;
        Ok(())
    }

    fn explore(&mut self, request: &QueryRequest) -> Result<ExploreWidget> {
        let client = self.client()?;
        let req = explore_payload(request).to_string();
        let tz = self.tz_offset.to_string();
        let resp = client
            .post(config::EXPLORE_URL)
            .query(&[
                ("hl", self.host_language.as_str()),
                ("tz", tz.as_str()),
                ("req", req.as_str()),
            ])
            .send()?;
        let body = check_status(resp)?.text()?;
        parse_explore_response(&body)
    }

    fn multiline(&mut self, widget: &ExploreWidget, keywords: &[String]) -> Result<TrendsTable> {
        let client = self.client()?;
        let req = widget.request.to_string();
        let tz = self.tz_offset.to_string();
        let resp = client
            .get(config::MULTILINE_URL)
            .query(&[
                ("req", req.as_str()),
                ("token", widget.token.as_str()),
                ("tz", tz.as_str()),
            ])
            .send()?;
        let body = check_status(resp)?.text()?;
        parse_multiline_response(&body, keywords)
    }
}

impl TrendsClient for GoogleTrendsClient {
    fn interest_over_time(&mut self, request: &QueryRequest) -> Result<TrendsTable> {
        log::info!(
            "Querying Google Trends for [{}] (window={}, geo={:?}, cat={})",
            request.keywords().join(", "),
            request.time_window.token(),
            request.geography.code,
            request.category.id
        );
        self.warm_up()?;
        let widget = self.explore(request)?;
        let table = self.multiline(&widget, request.keywords())?;
        log::info!("Google Trends returned {} rows", table.len());
        Ok(table)
    }
}

// ---------------------------------------------------------------------------
// Protocol payloads
// ---------------------------------------------------------------------------

/// The `TIMESERIES` widget from an explore response: its token and the
/// request object to echo back to the widget endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ExploreWidget {
    pub id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub request: Value,
}

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<ExploreWidget>,
}

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    default: MultilineData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MultilineData {
    #[serde(default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelinePoint {
    time: String,
    #[serde(default)]
    value: Vec<u32>,
    #[serde(default)]
    is_partial: bool,
}

/// The `req` object for the explore endpoint: one comparison item per keyword.
pub fn explore_payload(request: &QueryRequest) -> Value {
    let items: Vec<Value> = request
        .keywords()
        .iter()
        .map(|k| {
            json!({
                "keyword": k,
                "time": request.time_window.token(),
                "geo": request.geography.code,
            })
        })
        .collect();
    json!({
        "comparisonItem": items,
        "category": request.category.id,
        "property": "",
    })
}

/// Extract the `TIMESERIES` widget from a raw explore response body.
pub fn parse_explore_response(body: &str) -> Result<ExploreWidget> {
    let parsed: ExploreResponse =
        serde_json::from_str(strip_guard(body, config::EXPLORE_GUARD_LEN))?;
    parsed
        .widgets
        .into_iter()
        .find(|w| w.id == TIMESERIES_WIDGET)
        .ok_or_else(|| {
            TrendsError::Client("explore response has no TIMESERIES widget".to_string())
        })
}

/// Turn a raw multiline widget body into a table with one score column per
/// keyword (in request order) followed by the `isPartial` flag column.
///
/// A keyword whose position is past the end of a row's `value` array gets
/// `None` for that day.
pub fn parse_multiline_response(body: &str, keywords: &[String]) -> Result<TrendsTable> {
    let parsed: MultilineResponse =
        serde_json::from_str(strip_guard(body, config::WIDGET_GUARD_LEN))?;
    let points = parsed.default.timeline_data;

    let mut dates = Vec::with_capacity(points.len());
    for point in &points {
        let secs: i64 = point.time.trim().parse().map_err(|_| {
            TrendsError::InvalidData(format!("bad timeline timestamp '{}'", point.time))
        })?;
        let stamp = OffsetDateTime::from_unix_timestamp(secs)
            .map_err(|e| TrendsError::InvalidData(format!("timestamp {secs}: {e}")))?;
        dates.push(stamp.date());
    }

    let mut table = TrendsTable::new(dates);
    for (idx, keyword) in keywords.iter().enumerate() {
        let values = points.iter().map(|p| p.value.get(idx).copied()).collect();
        table.push_scores(keyword, values)?;
    }
    let partial = points.iter().map(|p| p.is_partial).collect();
    table.push_flags(config::PARTIAL_COLUMN, partial)?;
    Ok(table)
}

fn strip_guard(body: &str, guard_len: usize) -> &str {
    body.get(guard_len..).unwrap_or("").trim_start()
}

fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        log::warn!("Google Trends rate limit hit ({})", resp.url());
        return Err(TrendsError::RateLimited(format!(
            "HTTP {} from {}",
            status,
            resp.url().path()
        )));
    }
    if !status.is_success() {
        return Err(TrendsError::Client(format!(
            "HTTP {} from {}",
            status,
            resp.url().path()
        )));
    }
    Ok(resp)
}
