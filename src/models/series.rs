use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::{Result, TrendsError};

// ---------------------------------------------------------------------------
// TrendsTable - Raw client output (rows = dates, one column per series)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Interest scores; `None` where the source has no value for that day.
    Scores(Vec<Option<u32>>),
    /// Boolean marker column such as `isPartial`.
    Flags(Vec<bool>),
}

impl ColumnData {
    fn len(&self) -> usize {
        match self {
            ColumnData::Scores(v) => v.len(),
            ColumnData::Flags(v) => v.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub name: String,
    pub data: ColumnData,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrendsTable {
    dates: Vec<Date>,
    columns: Vec<TableColumn>,
}

impl TrendsTable {
    pub fn new(dates: Vec<Date>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    /// Append a score column. Its length must match the date index.
    pub fn push_scores(&mut self, name: &str, values: Vec<Option<u32>>) -> Result<()> {
        self.push_column(name, ColumnData::Scores(values))
    }

    /// Append a boolean marker column. Its length must match the date index.
    pub fn push_flags(&mut self, name: &str, flags: Vec<bool>) -> Result<()> {
        self.push_column(name, ColumnData::Flags(flags))
    }

    fn push_column(&mut self, name: &str, data: ColumnData) -> Result<()> {
        if data.len() != self.dates.len() {
            return Err(TrendsError::InvalidData(format!(
                "column '{}' has {} values for {} dates",
                name,
                data.len(),
                self.dates.len()
            )));
        }
        self.columns.push(TableColumn {
            name: name.to_string(),
            data,
        });
        Ok(())
    }

    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of rows (dates).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

// ---------------------------------------------------------------------------
// InterestSeries - Normalized per-keyword scores indexed by date
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestPoint {
    pub date: Date,
    /// One slot per series keyword, in keyword order.
    pub values: Vec<Option<u32>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInterestSeries")]
pub struct InterestSeries {
    keywords: Vec<String>,
    points: Vec<InterestPoint>,
    #[serde(default)]
    missing_keywords: Vec<String>,
}

/// Unchecked wire form; deserialized series go through [`InterestSeries::new`].
#[derive(Deserialize)]
struct RawInterestSeries {
    keywords: Vec<String>,
    points: Vec<InterestPoint>,
    #[serde(default)]
    missing_keywords: Vec<String>,
}

impl TryFrom<RawInterestSeries> for InterestSeries {
    type Error = TrendsError;

    fn try_from(raw: RawInterestSeries) -> Result<Self> {
        Ok(Self::new(raw.keywords, raw.points)?.with_missing_keywords(raw.missing_keywords))
    }
}

impl InterestSeries {
    /// Build a series, checking that dates strictly increase and that every
    /// point carries one value slot per keyword.
    pub fn new(keywords: Vec<String>, points: Vec<InterestPoint>) -> Result<Self> {
        for point in &points {
            if point.values.len() != keywords.len() {
                return Err(TrendsError::InvalidData(format!(
                    "{} has {} values for {} keywords",
                    iso_date(point.date),
                    point.values.len(),
                    keywords.len()
                )));
            }
        }
        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(TrendsError::InvalidData(format!(
                "dates are not strictly increasing ({} then {})",
                iso_date(pair[0].date),
                iso_date(pair[1].date)
            )));
        }
        Ok(Self {
            keywords,
            points,
            missing_keywords: Vec::new(),
        })
    }

    pub(crate) fn with_missing_keywords(mut self, missing: Vec<String>) -> Self {
        self.missing_keywords = missing;
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn points(&self) -> &[InterestPoint] {
        &self.points
    }

    /// Requested keywords the trends source returned no column for.
    pub fn missing_keywords(&self) -> &[String] {
        &self.missing_keywords
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn first_date(&self) -> Option<Date> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<Date> {
        self.points.last().map(|p| p.date)
    }

    /// All values for one keyword, aligned with [`points`](Self::points).
    pub fn values_for(&self, keyword: &str) -> Option<Vec<Option<u32>>> {
        let idx = self.keywords.iter().position(|k| k == keyword)?;
        Some(self.points.iter().map(|p| p.values[idx]).collect())
    }

    pub fn value(&self, date: Date, keyword: &str) -> Option<u32> {
        let idx = self.keywords.iter().position(|k| k == keyword)?;
        let point = self.points.iter().find(|p| p.date == date)?;
        point.values[idx]
    }

    pub fn max_value(&self) -> Option<u32> {
        self.points
            .iter()
            .flat_map(|p| p.values.iter().copied().flatten())
            .max()
    }

    /// Header of the tabular view: `"Date"` then each keyword.
    pub fn table_header(&self) -> Vec<String> {
        std::iter::once("Date".to_string())
            .chain(self.keywords.iter().cloned())
            .collect()
    }

    /// One row per date: ISO date, then each value's plain string (empty when absent).
    pub fn table_rows(&self) -> Vec<Vec<String>> {
        self.points
            .iter()
            .map(|point| {
                std::iter::once(iso_date(point.date))
                    .chain(
                        point
                            .values
                            .iter()
                            .map(|v| v.map(|n| n.to_string()).unwrap_or_default()),
                    )
                    .collect()
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Date formatting
// ---------------------------------------------------------------------------

/// `YYYY-MM-DD`, independent of locale.
pub fn iso_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// `DD/MM/YYYY`, as printed in report footers.
pub fn footer_date(date: Date) -> String {
    date.format(format_description!("[day]/[month]/[year]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Today's date in the local timezone, or UTC when the local offset is unknown.
pub fn local_today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}
