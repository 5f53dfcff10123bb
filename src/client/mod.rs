//! Trends data source boundary.
//!
//! [`TrendsClient`] is the seam between the report pipeline and whatever
//! serves interest-over-time tables. [`GoogleTrendsClient`] is the HTTP
//! implementation; tests substitute their own.

pub mod google;

pub use google::GoogleTrendsClient;

use crate::error::Result;
use crate::models::{QueryRequest, TrendsTable};

/// A source of interest-over-time tables.
pub trait TrendsClient {
    /// Fetch one score column per requested keyword (plus an optional
    /// `isPartial` flag column) for the request's window, category and geography.
    ///
    /// Fails with [`TrendsError::RateLimited`](crate::TrendsError::RateLimited)
    /// when the backend throttles, or another error for any other failure.
    fn interest_over_time(&mut self, request: &QueryRequest) -> Result<TrendsTable>;
}

impl<T: TrendsClient + ?Sized> TrendsClient for Box<T> {
    fn interest_over_time(&mut self, request: &QueryRequest) -> Result<TrendsTable> {
        (**self).interest_over_time(request)
    }
}

impl<T: TrendsClient + ?Sized> TrendsClient for &mut T {
    fn interest_over_time(&mut self, request: &QueryRequest) -> Result<TrendsTable> {
        (**self).interest_over_time(request)
    }
}
