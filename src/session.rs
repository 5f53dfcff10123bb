//! Per-user query/report lifecycle as an explicit state machine.
//!
//! ```text
//! Idle --query(data)--> Queried --prepare_report--> ReportReady --finalize_download--> Downloaded
//!  ^        |                                                                              |
//!  +--(no data)                                      reset / new query from any state -----+
//! ```
//!
//! A successful query replaces whatever the session held before. A failed
//! query (validation, rate limit, client error) leaves the session untouched.

use std::fmt;
use std::path::Path;

use tempfile::TempPath;
use time::Date;

use crate::client::TrendsClient;
use crate::error::{Result, TrendsError};
use crate::models::{
    local_today, parse_keywords, Category, Geography, InterestSeries, QueryRequest, ReportMetadata,
    TimeWindow,
};
use crate::normalize::{normalize, Normalized};
use crate::report::{render_chart, ChartImage, Report};

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Queried,
    ReportReady,
    Downloaded,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Queried => "queried",
            SessionState::ReportReady => "report ready",
            SessionState::Downloaded => "downloaded",
        };
        f.write_str(name)
    }
}

/// Result of a query that reached the trends source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Data {
        rows: usize,
        /// Requested keywords the source returned nothing for.
        missing_keywords: Vec<String>,
    },
    /// The source answered with zero rows; the session was cleared.
    NoData,
}

impl QueryOutcome {
    pub fn has_data(&self) -> bool {
        matches!(self, QueryOutcome::Data { .. })
    }
}

struct QueryData {
    request: QueryRequest,
    series: InterestSeries,
    metadata: ReportMetadata,
}

struct PreparedReport {
    chart: ChartImage,
    // Deleted from disk when dropped.
    scratch: TempPath,
    report: Report,
}

enum Stage {
    Idle,
    Queried(QueryData),
    ReportReady(QueryData, PreparedReport),
    Downloaded { file_name: String },
}

impl Stage {
    fn state(&self) -> SessionState {
        match self {
            Stage::Idle => SessionState::Idle,
            Stage::Queried(_) => SessionState::Queried,
            Stage::ReportReady(..) => SessionState::ReportReady,
            Stage::Downloaded { .. } => SessionState::Downloaded,
        }
    }

    fn data(&self) -> Option<&QueryData> {
        match self {
            Stage::Queried(data) | Stage::ReportReady(data, _) => Some(data),
            _ => None,
        }
    }

    fn prepared(&self) -> Option<&PreparedReport> {
        match self {
            Stage::ReportReady(_, prepared) => Some(prepared),
            _ => None,
        }
    }
}

/// Drives one user's query → report → download cycle against a [`TrendsClient`].
pub struct Session<C> {
    client: C,
    stage: Stage,
    export_date: Option<Date>,
}

impl<C: TrendsClient> Session<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            stage: Stage::Idle,
            export_date: None,
        }
    }

    /// Stamp reports with a fixed date instead of today's.
    pub fn with_export_date(mut self, date: Date) -> Self {
        self.export_date = Some(date);
        self
    }

    pub fn state(&self) -> SessionState {
        self.stage.state()
    }

    // -- Events ------------------------------------------------------------

    /// Run a query and replace the session contents with its result.
    ///
    /// An empty result clears the session and returns
    /// [`QueryOutcome::NoData`]. Errors leave the session as it was.
    pub fn query(&mut self, request: QueryRequest) -> Result<QueryOutcome> {
        let table = match self.client.interest_over_time(&request) {
            Ok(table) => table,
            Err(e) => {
                log::warn!("Trends query failed: {e}");
                return Err(e);
            }
        };

        match normalize(&table, request.keywords())? {
            Normalized::Empty => {
                log::info!(
                    "No trends data for [{}]; session cleared",
                    request.keywords().join(", ")
                );
                self.stage = Stage::Idle;
                Ok(QueryOutcome::NoData)
            }
            Normalized::Series(series) => {
                let metadata = ReportMetadata::for_request(&request, series.keywords());
                let outcome = QueryOutcome::Data {
                    rows: series.len(),
                    missing_keywords: series.missing_keywords().to_vec(),
                };
                log::info!(
                    "Session holds {} rows for [{}]",
                    series.len(),
                    metadata.keyword_list()
                );
                self.stage = Stage::Queried(QueryData {
                    request,
                    series,
                    metadata,
                });
                Ok(outcome)
            }
        }
    }

    /// Validate form-style input and run the query.
    ///
    /// `keywords` is the comma-separated keyword field. Validation failures
    /// are returned before the client is contacted.
    pub fn query_form(
        &mut self,
        keywords: &str,
        geography: Geography,
        time_window: TimeWindow,
        category: Category,
    ) -> Result<QueryOutcome> {
        let request = QueryRequest::new(parse_keywords(keywords)?)?
            .geography(geography)
            .time_window(time_window)
            .category(category);
        self.query(request)
    }

    /// Render the chart and build the PDF for the current query results.
    ///
    /// Calling it again while a report is ready returns the same report.
    /// Fails with [`TrendsError::InvalidState`] when there are no results.
    pub fn prepare_report(&mut self) -> Result<&Report> {
        let prepared = match &self.stage {
            Stage::Queried(data) => Some(Self::build_report(data, self.export_date())?),
            _ => None,
        };
        if let Some(prepared) = prepared {
            if let Stage::Queried(data) = std::mem::replace(&mut self.stage, Stage::Idle) {
                self.stage = Stage::ReportReady(data, prepared);
            }
        }

        match &self.stage {
            Stage::ReportReady(_, prepared) => Ok(&prepared.report),
            other => Err(TrendsError::InvalidState(format!(
                "no query results to build a report from (session is {})",
                other.state()
            ))),
        }
    }

    /// Hand over the report bytes and mark the session as downloaded.
    pub fn finalize_download(&mut self) -> Result<Report> {
        match std::mem::replace(&mut self.stage, Stage::Idle) {
            Stage::ReportReady(_, prepared) => {
                let report = prepared.report;
                log::info!("Report {} downloaded", report.file_name);
                self.stage = Stage::Downloaded {
                    file_name: report.file_name.clone(),
                };
                Ok(report)
            }
            other => {
                let state = other.state();
                self.stage = other;
                Err(TrendsError::InvalidState(format!(
                    "no report is ready for download (session is {state})"
                )))
            }
        }
    }

    /// Discard everything and return to [`SessionState::Idle`].
    pub fn reset(&mut self) {
        log::debug!("Session reset from {}", self.stage.state());
        self.stage = Stage::Idle;
    }

    // -- Accessors ---------------------------------------------------------

    pub fn request(&self) -> Option<&QueryRequest> {
        self.stage.data().map(|d| &d.request)
    }

    pub fn series(&self) -> Option<&InterestSeries> {
        self.stage.data().map(|d| &d.series)
    }

    pub fn metadata(&self) -> Option<&ReportMetadata> {
        self.stage.data().map(|d| &d.metadata)
    }

    /// Header plus rows of the tabular view of the current results.
    pub fn table(&self) -> Option<(Vec<String>, Vec<Vec<String>>)> {
        self.series().map(|s| (s.table_header(), s.table_rows()))
    }

    pub fn chart(&self) -> Option<&ChartImage> {
        self.stage.prepared().map(|p| &p.chart)
    }

    /// Scratch PNG of the chart while a report is ready.
    pub fn chart_path(&self) -> Option<&Path> {
        self.stage.prepared().map(|p| &*p.scratch)
    }

    pub fn report(&self) -> Option<&Report> {
        self.stage.prepared().map(|p| &p.report)
    }

    /// File name of the last downloaded report, while in [`SessionState::Downloaded`].
    pub fn downloaded_file(&self) -> Option<&str> {
        match &self.stage {
            Stage::Downloaded { file_name } => Some(file_name.as_str()),
            _ => None,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    fn export_date(&self) -> Date {
        self.export_date.unwrap_or_else(local_today)
    }

    fn build_report(data: &QueryData, export_date: Date) -> Result<PreparedReport> {
        let chart = render_chart(&data.series, data.series.keywords())?;
        let scratch = chart.write_scratch()?;
        let report = Report::build(&data.series, &data.metadata, &chart, export_date)?;
        Ok(PreparedReport {
            chart,
            scratch,
            report,
        })
    }
}
