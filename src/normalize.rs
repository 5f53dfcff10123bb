//! Reshape a raw [`TrendsTable`] into an [`InterestSeries`].
//!
//! Marker columns (`isPartial` and any other flag column) are dropped, rows
//! are ordered by date and score columns are matched to the requested
//! keywords. Values pass through unchanged: no interpolation, smoothing or
//! resampling.

use crate::error::{Result, TrendsError};
use crate::models::{ColumnData, InterestPoint, InterestSeries, TrendsTable};

/// Outcome of normalizing a client table.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Series(InterestSeries),
    /// The client succeeded but there is nothing to show.
    Empty,
}

impl Normalized {
    pub fn into_series(self) -> Option<InterestSeries> {
        match self {
            Normalized::Series(series) => Some(series),
            Normalized::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Normalized::Empty)
    }
}

/// Normalize `table` for the requested `keywords`.
///
/// Returns [`Normalized::Empty`] when the table has no rows or when none of
/// the requested keywords has a score column. Keywords without a column are
/// left out of the series and listed in
/// [`InterestSeries::missing_keywords`]. Duplicate dates are rejected.
pub fn normalize(table: &TrendsTable, keywords: &[String]) -> Result<Normalized> {
    if table.is_empty() {
        log::info!("Trends table has no rows");
        return Ok(Normalized::Empty);
    }

    let mut present: Vec<String> = Vec::new();
    let mut columns: Vec<&Vec<Option<u32>>> = Vec::new();
    let mut missing: Vec<String> = Vec::new();

    for keyword in keywords {
        let scores = table.column(keyword).and_then(|c| match &c.data {
            ColumnData::Scores(values) => Some(values),
            ColumnData::Flags(_) => None,
        });
        match scores {
            Some(values) => {
                present.push(keyword.clone());
                columns.push(values);
            }
            None => missing.push(keyword.clone()),
        }
    }

    if !missing.is_empty() {
        log::warn!("Trends table has no data for keyword(s): {}", missing.join(", "));
    }
    if present.is_empty() {
        return Ok(Normalized::Empty);
    }

    let mut order: Vec<usize> = (0..table.len()).collect();
    order.sort_by_key(|&row| table.dates()[row]);

    let mut points: Vec<InterestPoint> = Vec::with_capacity(order.len());
    for row in order {
        let date = table.dates()[row];
        if points.last().map(|p| p.date) == Some(date) {
            return Err(TrendsError::InvalidData(format!(
                "duplicate date {} in trends table",
                crate::models::iso_date(date)
            )));
        }
        points.push(InterestPoint {
            date,
            values: columns.iter().map(|col| col[row]).collect(),
        });
    }

    let series = InterestSeries::new(present, points)?.with_missing_keywords(missing);
    Ok(Normalized::Series(series))
}
