use std::path::PathBuf;

pub const TRENDS_HOME: &str = "https://trends.google.com";
pub const EXPLORE_URL: &str = "https://trends.google.com/trends/api/explore";
pub const MULTILINE_URL: &str = "https://trends.google.com/trends/api/widgetdata/multiline";

/// Anti-JSON-hijacking prefix lengths stripped from the explore and widget responses.
pub const EXPLORE_GUARD_LEN: usize = 4;
pub const WIDGET_GUARD_LEN: usize = 5;

pub const DEFAULT_HOST_LANGUAGE: &str = "en-US";
/// Minutes west of UTC, as the Trends frontend sends it.
pub const DEFAULT_TZ_OFFSET: i32 = 360;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const MAX_KEYWORDS: usize = 5;
pub const PARTIAL_COLUMN: &str = "isPartial";
pub const REPORT_MIME: &str = "application/pdf";

// A4 portrait, millimetres.
pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const PAGE_MARGIN_MM: f32 = 10.0;
pub const BOTTOM_MARGIN_MM: f32 = 15.0;

// Chart raster size, pixels.
pub const CHART_WIDTH_PX: u32 = 1200;
pub const CHART_HEIGHT_PX: u32 = 720;

pub fn default_export_dir() -> PathBuf {
    if let Some(dir) = dirs::download_dir() {
        dir
    } else if let Some(home) = dirs::home_dir() {
        home.join("trends-report")
    } else {
        PathBuf::from(".trends-report")
    }
}
