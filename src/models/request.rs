use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{Result, TrendsError};

// ---------------------------------------------------------------------------
// TimeWindow - Relative date range sent as the `time` token
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    LastMonth,
    LastThreeMonths,
    LastSixMonths,
    #[default]
    LastTwelveMonths,
}

impl TimeWindow {
    /// All windows in the order a selector should list them.
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::LastTwelveMonths,
        TimeWindow::LastSixMonths,
        TimeWindow::LastThreeMonths,
        TimeWindow::LastMonth,
    ];

    pub fn token(self) -> &'static str {
        match self {
            TimeWindow::LastMonth => "today 1-m",
            TimeWindow::LastThreeMonths => "today 3-m",
            TimeWindow::LastSixMonths => "today 6-m",
            TimeWindow::LastTwelveMonths => "today 12-m",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeWindow::LastMonth => "last month",
            TimeWindow::LastThreeMonths => "last 3 months",
            TimeWindow::LastSixMonths => "last 6 months",
            TimeWindow::LastTwelveMonths => "last 12 months",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.token() == token)
    }
}

// ---------------------------------------------------------------------------
// Geography - Country filter (empty code = worldwide)
// ---------------------------------------------------------------------------

const COUNTRIES: &[(&str, &str)] = &[
    ("", "Worldwide"),
    ("AR", "Argentina"),
    ("AU", "Australia"),
    ("AT", "Austria"),
    ("BE", "Belgium"),
    ("BR", "Brazil"),
    ("CA", "Canada"),
    ("CL", "Chile"),
    ("CO", "Colombia"),
    ("CZ", "Czech Republic"),
    ("DK", "Denmark"),
    ("EG", "Egypt"),
    ("FI", "Finland"),
    ("FR", "France"),
    ("DE", "Germany"),
    ("GR", "Greece"),
    ("HK", "Hong Kong"),
    ("HU", "Hungary"),
    ("IN", "India"),
    ("ID", "Indonesia"),
    ("IE", "Ireland"),
    ("IL", "Israel"),
    ("IT", "Italy"),
    ("JP", "Japan"),
    ("KR", "South Korea"),
    ("MY", "Malaysia"),
    ("MX", "Mexico"),
    ("NL", "Netherlands"),
    ("NZ", "New Zealand"),
    ("NO", "Norway"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("RO", "Romania"),
    ("RU", "Russia"),
    ("SA", "Saudi Arabia"),
    ("SG", "Singapore"),
    ("ZA", "South Africa"),
    ("ES", "Spain"),
    ("SE", "Sweden"),
    ("CH", "Switzerland"),
    ("TW", "Taiwan"),
    ("TH", "Thailand"),
    ("TR", "Turkey"),
    ("UA", "Ukraine"),
    ("AE", "United Arab Emirates"),
    ("GB", "United Kingdom"),
    ("US", "United States"),
    ("VE", "Venezuela"),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geography {
    pub code: String,
    pub label: String,
}

impl Geography {
    pub fn worldwide() -> Self {
        Self::from_entry(COUNTRIES[0])
    }

    /// Look up a geography by ISO country code (case-insensitive). `""` is worldwide.
    pub fn from_code(code: &str) -> Result<Self> {
        let code = code.trim();
        COUNTRIES
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(code))
            .map(|entry| Self::from_entry(*entry))
            .ok_or_else(|| TrendsError::Validation(format!("Unknown country code: {code}")))
    }

    pub fn from_label(label: &str) -> Result<Self> {
        let label = label.trim();
        COUNTRIES
            .iter()
            .find(|(_, l)| l.eq_ignore_ascii_case(label))
            .map(|entry| Self::from_entry(*entry))
            .ok_or_else(|| TrendsError::Validation(format!("Unknown country: {label}")))
    }

    /// Every selectable geography, worldwide first.
    pub fn all() -> Vec<Self> {
        COUNTRIES.iter().map(|entry| Self::from_entry(*entry)).collect()
    }

    pub fn is_worldwide(&self) -> bool {
        self.code.is_empty()
    }

    fn from_entry((code, label): (&str, &str)) -> Self {
        Self {
            code: code.to_string(),
            label: label.to_string(),
        }
    }
}

impl Default for Geography {
    fn default() -> Self {
        Self::from_entry(("ES", "Spain"))
    }
}

// ---------------------------------------------------------------------------
// Category - Top-level Google Trends category
// ---------------------------------------------------------------------------

const CATEGORIES: &[(u32, &str)] = &[
    (0, "All categories"),
    (3, "Arts & Entertainment"),
    (47, "Autos & Vehicles"),
    (44, "Beauty & Fitness"),
    (22, "Books & Literature"),
    (12, "Business & Industrial"),
    (5, "Computers & Electronics"),
    (7, "Finance"),
    (71, "Food & Drink"),
    (8, "Games"),
    (45, "Health"),
    (65, "Hobbies & Leisure"),
    (11, "Home & Garden"),
    (13, "Internet & Telecom"),
    (958, "Jobs & Education"),
    (19, "Law & Government"),
    (16, "News"),
    (299, "Online Communities"),
    (14, "People & Society"),
    (66, "Pets & Animals"),
    (29, "Real Estate"),
    (533, "Reference"),
    (174, "Science"),
    (18, "Shopping"),
    (20, "Sports"),
    (67, "Travel"),
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub label: String,
}

impl Category {
    pub fn all_categories() -> Self {
        Self::from_entry(CATEGORIES[0])
    }

    pub fn from_id(id: u32) -> Result<Self> {
        CATEGORIES
            .iter()
            .find(|(i, _)| *i == id)
            .map(|entry| Self::from_entry(*entry))
            .ok_or_else(|| TrendsError::Validation(format!("Unknown category id: {id}")))
    }

    pub fn all() -> Vec<Self> {
        CATEGORIES.iter().map(|entry| Self::from_entry(*entry)).collect()
    }

    fn from_entry((id, label): (u32, &str)) -> Self {
        Self {
            id,
            label: label.to_string(),
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::all_categories()
    }
}

// ---------------------------------------------------------------------------
// Keywords
// ---------------------------------------------------------------------------

/// Split a comma-separated keyword field into trimmed, non-empty keywords.
///
/// Fails with [`TrendsError::Validation`] when nothing is left after trimming
/// or when more than [`config::MAX_KEYWORDS`] keywords remain.
pub fn parse_keywords(raw: &str) -> Result<Vec<String>> {
    let keywords: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();
    validate_keywords(&keywords)?;
    Ok(keywords)
}

fn validate_keywords(keywords: &[String]) -> Result<()> {
    if keywords.is_empty() {
        return Err(TrendsError::Validation("Enter at least one keyword.".to_string()));
    }
    if keywords.len() > config::MAX_KEYWORDS {
        return Err(TrendsError::Validation(format!(
            "At most {} keywords can be compared at once (got {}).",
            config::MAX_KEYWORDS,
            keywords.len()
        )));
    }
    if keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(TrendsError::Validation("Keywords must not be blank.".to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// QueryRequest - One user submission
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    keywords: Vec<String>,
    pub category: Category,
    pub geography: Geography,
    pub time_window: TimeWindow,
}

impl QueryRequest {
    /// Create a request with default geography, window and category.
    ///
    /// Keywords are trimmed; order and duplicates are kept.
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.into().trim().to_string())
            .collect();
        validate_keywords(&keywords)?;
        Ok(Self {
            keywords,
            category: Category::default(),
            geography: Geography::default(),
            time_window: TimeWindow::default(),
        })
    }

    /// Parse a comma-separated keyword field, as typed into a search form.
    pub fn parse(raw_keywords: &str) -> Result<Self> {
        Self::new(parse_keywords(raw_keywords)?)
    }

    pub fn geography(mut self, geography: Geography) -> Self {
        self.geography = geography;
        self
    }

    pub fn time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = window;
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

// ---------------------------------------------------------------------------
// ReportMetadata - Labels carried alongside a series for rendering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub keywords: Vec<String>,
    pub geography_label: String,
    pub range_label: String,
    pub category_label: String,
}

impl ReportMetadata {
    /// Labels for a completed query. `keywords` are the ones that actually returned data.
    pub fn for_request(request: &QueryRequest, keywords: &[String]) -> Self {
        Self {
            keywords: keywords.to_vec(),
            geography_label: request.geography.label.clone(),
            range_label: request.time_window.label().to_string(),
            category_label: request.category.label.clone(),
        }
    }

    /// Keywords joined for titles, e.g. `"pizza, pasta"`.
    pub fn keyword_list(&self) -> String {
        self.keywords.join(", ")
    }
}
