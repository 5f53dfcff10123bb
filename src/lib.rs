//! Google Trends report builder for Rust.
//!
//! Fetches search-interest time series for up to five keywords from Google
//! Trends, normalizes them into a per-keyword series, draws a line chart and
//! lays out a two-page PDF report (chart page + data table).
//!
//! # Quick start
//!
//! ```no_run
//! use trends_report::{QueryRequest, TimeWindow, TrendsExplorer};
//!
//! let mut explorer = TrendsExplorer::builder().build().unwrap();
//!
//! let request = QueryRequest::parse("pizza, pasta")
//!     .unwrap()
//!     .time_window(TimeWindow::LastThreeMonths);
//! let outcome = explorer.query(request).unwrap();
//!
//! if outcome.has_data() {
//!     explorer.prepare_report().unwrap();
//!     let path = explorer.download().unwrap();
//!     println!("saved {}", path.display());
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod report;
pub mod session;

pub use client::{GoogleTrendsClient, TrendsClient};
pub use error::{Result, TrendsError};
pub use models::{
    Category, Geography, InterestPoint, InterestSeries, QueryRequest, ReportMetadata, TimeWindow,
    TrendsTable,
};
pub use normalize::{normalize, Normalized};
pub use report::{build_document, render_chart, ChartImage, Report};
pub use session::{QueryOutcome, Session, SessionState};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// TrendsExplorerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`TrendsExplorer`].
///
/// Use [`TrendsExplorer::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](TrendsExplorerBuilder::build).
pub struct TrendsExplorerBuilder {
    host_language: String,
    tz_offset: i32,
    timeout: Duration,
    export_dir: Option<PathBuf>,
}

impl Default for TrendsExplorerBuilder {
    fn default() -> Self {
        Self {
            host_language: config::DEFAULT_HOST_LANGUAGE.to_string(),
            tz_offset: config::DEFAULT_TZ_OFFSET,
            timeout: Duration::from_secs(config::DEFAULT_TIMEOUT_SECS),
            export_dir: None,
        }
    }
}

impl TrendsExplorerBuilder {
    /// Set the interface language sent to Google Trends (e.g. `"es-ES"`).
    ///
    /// Defaults to `"en-US"`.
    pub fn host_language(mut self, hl: &str) -> Self {
        self.host_language = hl.to_string();
        self
    }

    /// Set the timezone offset in minutes west of UTC. Defaults to `360`.
    pub fn tz_offset(mut self, minutes: i32) -> Self {
        self.tz_offset = minutes;
        self
    }

    /// Set the HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the directory downloaded reports are saved into.
    ///
    /// If not set, the platform download directory is used.
    pub fn export_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.export_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the explorer, creating the export directory if needed.
    ///
    /// No network traffic happens until the first query.
    pub fn build(self) -> Result<TrendsExplorer> {
        let export_dir = self.export_dir.unwrap_or_else(config::default_export_dir);
        fs::create_dir_all(&export_dir)?;
        let client = GoogleTrendsClient::new(&self.host_language, self.tz_offset, self.timeout);
        Ok(TrendsExplorer {
            session: Session::new(client),
            export_dir,
        })
    }
}

// ---------------------------------------------------------------------------
// TrendsExplorer
// ---------------------------------------------------------------------------

/// The main entry point: a [`Session`] backed by the Google Trends client,
/// plus the directory reports are saved into.
///
/// Created via [`TrendsExplorer::builder()`].
pub struct TrendsExplorer {
    session: Session<GoogleTrendsClient>,
    export_dir: PathBuf,
}

impl TrendsExplorer {
    /// Create a new builder for configuring the explorer.
    pub fn builder() -> TrendsExplorerBuilder {
        TrendsExplorerBuilder::default()
    }

    /// Run a query; see [`Session::query`].
    pub fn query(&mut self, request: QueryRequest) -> Result<QueryOutcome> {
        self.session.query(request)
    }

    /// Validate form-style input and run the query; see [`Session::query_form`].
    pub fn query_form(
        &mut self,
        keywords: &str,
        geography: Geography,
        time_window: TimeWindow,
        category: Category,
    ) -> Result<QueryOutcome> {
        self.session.query_form(keywords, geography, time_window, category)
    }

    /// Build chart and PDF for the current results; see [`Session::prepare_report`].
    pub fn prepare_report(&mut self) -> Result<&Report> {
        self.session.prepare_report()
    }

    /// Finalize the download and save the report into the export directory.
    ///
    /// Returns the path of the written PDF.
    pub fn download(&mut self) -> Result<PathBuf> {
        let report = self.session.finalize_download()?;
        report.save_to(&self.export_dir)
    }

    /// Discard all results and return to the idle state.
    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Return a reference to the underlying [`Session`].
    pub fn session(&self) -> &Session<GoogleTrendsClient> {
        &self.session
    }

    /// Return a mutable reference to the underlying [`Session`].
    pub fn session_mut(&mut self) -> &mut Session<GoogleTrendsClient> {
        &mut self.session
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for TrendsExplorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let client = self.session.client();
        write!(
            f,
            "TrendsExplorer(hl={}, tz={}, export_dir={}, state={})",
            client.host_language(),
            client.tz_offset(),
            self.export_dir.display(),
            self.session.state()
        )
    }
}
