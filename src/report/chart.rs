//! Line chart of an [`InterestSeries`], rasterized to PNG.
//!
//! Rendering happens in two steps: [`plan_chart`] decides axes, ticks, line
//! order and legend; [`ChartPlan::rasterize`] paints the plan with tiny-skia.
//! Both are pure, so identical input always yields identical PNG bytes.

use std::io::Write;

use tempfile::TempPath;
use time::Date;
use tiny_skia::{Color, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::config;
use crate::error::{Result, TrendsError};
use crate::models::{iso_date, InterestSeries};
use crate::report::glyphs;

/// Line colours, assigned in keyword order.
const PALETTE: [[u8; 3]; 5] = [
    [31, 119, 180],
    [255, 127, 14],
    [44, 160, 44],
    [214, 39, 40],
    [148, 103, 189],
];

const NOMINAL_MAX: u32 = 100;
const MAX_X_TICKS: usize = 6;

// Plot area insets, pixels.
const INSET_LEFT: f32 = 110.0;
const INSET_RIGHT: f32 = 40.0;
const INSET_TOP: f32 = 90.0;
const INSET_BOTTOM: f32 = 110.0;

// ---------------------------------------------------------------------------
// ChartPlan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLine {
    pub keyword: String,
    pub color: [u8; 3],
    /// Aligned with [`ChartPlan::dates`]; `None` breaks the line.
    pub values: Vec<Option<u32>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPlan {
    pub title: String,
    pub x_caption: String,
    pub y_caption: String,
    pub dates: Vec<Date>,
    pub y_max: u32,
    pub y_ticks: Vec<u32>,
    /// `(date index, label)` pairs along the x axis.
    pub x_ticks: Vec<(usize, String)>,
    pub lines: Vec<ChartLine>,
    pub show_legend: bool,
    pub width: u32,
    pub height: u32,
}

/// Decide what the chart for `keywords` over `series` looks like.
///
/// Lines follow `keywords` order. The y axis spans 0..=100 unless a value is
/// larger, in which case it grows to the next multiple of 25. A legend is
/// shown only for more than one line.
pub fn plan_chart(series: &InterestSeries, keywords: &[String]) -> Result<ChartPlan> {
    if series.is_empty() {
        return Err(TrendsError::InvalidState("cannot chart an empty series".to_string()));
    }
    if keywords.is_empty() {
        return Err(TrendsError::Chart("no keywords to chart".to_string()));
    }

    let mut lines = Vec::with_capacity(keywords.len());
    for (idx, keyword) in keywords.iter().enumerate() {
        let values = series.values_for(keyword).ok_or_else(|| {
            TrendsError::Chart(format!("keyword '{keyword}' is not in the series"))
        })?;
        lines.push(ChartLine {
            keyword: keyword.clone(),
            color: PALETTE[idx % PALETTE.len()],
            values,
        });
    }

    let observed = lines
        .iter()
        .flat_map(|l| l.values.iter().copied().flatten())
        .max()
        .unwrap_or(0);
    let y_max = if observed <= NOMINAL_MAX {
        NOMINAL_MAX
    } else {
        observed.div_ceil(25) * 25
    };
    let y_ticks = (0..=4).map(|i| y_max * i / 4).collect();

    let dates: Vec<Date> = series.dates().collect();
    let x_ticks = x_tick_indices(dates.len())
        .into_iter()
        .map(|idx| (idx, iso_date(dates[idx])))
        .collect();

    Ok(ChartPlan {
        title: format!("Trend: {}", keywords.join(", ")),
        x_caption: "Date".to_string(),
        y_caption: "Interest".to_string(),
        dates,
        y_max,
        y_ticks,
        x_ticks,
        show_legend: lines.len() > 1,
        lines,
        width: config::CHART_WIDTH_PX,
        height: config::CHART_HEIGHT_PX,
    })
}

fn x_tick_indices(count: usize) -> Vec<usize> {
    match count {
        0 => Vec::new(),
        1 => vec![0],
        n if n <= MAX_X_TICKS => (0..n).collect(),
        n => (0..MAX_X_TICKS)
            .map(|i| i * (n - 1) / (MAX_X_TICKS - 1))
            .collect(),
    }
}

/// Plan and rasterize the chart in one step.
pub fn render_chart(series: &InterestSeries, keywords: &[String]) -> Result<ChartImage> {
    plan_chart(series, keywords)?.rasterize()
}

// ---------------------------------------------------------------------------
// Rasterizing
// ---------------------------------------------------------------------------

impl ChartPlan {
    fn plot_rect(&self) -> (f32, f32, f32, f32) {
        let left = INSET_LEFT;
        let top = INSET_TOP;
        let width = self.width as f32 - INSET_LEFT - INSET_RIGHT;
        let height = self.height as f32 - INSET_TOP - INSET_BOTTOM;
        (left, top, width, height)
    }

    fn x_at(&self, idx: usize) -> f32 {
        let (left, _, width, _) = self.plot_rect();
        if self.dates.len() <= 1 {
            left + width / 2.0
        } else {
            left + width * idx as f32 / (self.dates.len() - 1) as f32
        }
    }

    fn y_at(&self, value: u32) -> f32 {
        let (_, top, _, height) = self.plot_rect();
        top + height * (1.0 - value as f32 / self.y_max as f32)
    }

    /// Paint the plan onto a white canvas and encode it as PNG.
    pub fn rasterize(&self) -> Result<ChartImage> {
        let mut pixmap = Pixmap::new(self.width, self.height)
            .ok_or_else(|| TrendsError::Chart("invalid chart dimensions".to_string()))?;
        pixmap.fill(Color::WHITE);

        let ink = solid([33, 33, 33]);
        let grid = solid([224, 224, 224]);
        let (left, top, width, height) = self.plot_rect();
        let bottom = top + height;

        // Title, centered.
        let title_w = glyphs::text_width(&self.title, 4.0);
        glyphs::draw_text(
            &mut pixmap,
            (self.width as f32 - title_w) / 2.0,
            24.0,
            &self.title,
            4.0,
            &ink,
        );

        // Horizontal grid and y tick labels.
        for tick in &self.y_ticks {
            let y = self.y_at(*tick);
            stroke_segment(&mut pixmap, (left, y), (left + width, y), 1.0, &grid);
            let label = tick.to_string();
            let label_w = glyphs::text_width(&label, 2.0);
            glyphs::draw_text(
                &mut pixmap,
                left - 12.0 - label_w,
                y - glyphs::text_height(2.0) / 2.0,
                &label,
                2.0,
                &ink,
            );
        }

        // Axes.
        stroke_segment(&mut pixmap, (left, top), (left, bottom), 2.0, &ink);
        stroke_segment(&mut pixmap, (left, bottom), (left + width, bottom), 2.0, &ink);

        // X tick marks and labels.
        for (idx, label) in &self.x_ticks {
            let x = self.x_at(*idx);
            stroke_segment(&mut pixmap, (x, bottom), (x, bottom + 8.0), 2.0, &ink);
            let label_w = glyphs::text_width(label, 2.0);
            glyphs::draw_text(&mut pixmap, x - label_w / 2.0, bottom + 16.0, label, 2.0, &ink);
        }

        // Axis captions.
        let x_cap_w = glyphs::text_width(&self.x_caption, 3.0);
        glyphs::draw_text(
            &mut pixmap,
            left + (width - x_cap_w) / 2.0,
            bottom + 56.0,
            &self.x_caption,
            3.0,
            &ink,
        );
        glyphs::draw_text(&mut pixmap, 16.0, top - 40.0, &self.y_caption, 3.0, &ink);

        for line in &self.lines {
            self.paint_line(&mut pixmap, line)?;
        }

        if self.show_legend {
            self.paint_legend(&mut pixmap, &ink);
        }

        encode_png(&pixmap)
    }

    fn paint_line(&self, pixmap: &mut Pixmap, line: &ChartLine) -> Result<()> {
        let paint = solid(line.color);
        let stroke = Stroke {
            width: 3.0,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        // Split into runs of consecutive present values.
        let mut runs: Vec<Vec<(f32, f32)>> = Vec::new();
        let mut current: Vec<(f32, f32)> = Vec::new();
        for (idx, value) in line.values.iter().enumerate() {
            match value {
                Some(v) => current.push((self.x_at(idx), self.y_at(*v))),
                None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }

        for run in runs {
            if run.len() == 1 {
                let (x, y) = run[0];
                if let Some(dot) = PathBuilder::from_circle(x, y, 3.0) {
                    pixmap.fill_path(
                        &dot,
                        &paint,
                        tiny_skia::FillRule::Winding,
                        Transform::identity(),
                        None,
                    );
                }
                continue;
            }
            let mut pb = PathBuilder::new();
            pb.move_to(run[0].0, run[0].1);
            for (x, y) in &run[1..] {
                pb.line_to(*x, *y);
            }
            let path = pb.finish().ok_or_else(|| {
                TrendsError::Chart(format!("could not build path for '{}'", line.keyword))
            })?;
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
        Ok(())
    }

    fn paint_legend(&self, pixmap: &mut Pixmap, ink: &Paint<'static>) {
        let (left, top, width, _) = self.plot_rect();
        let row_h = 26.0;
        let text_w = self
            .lines
            .iter()
            .map(|l| glyphs::text_width(&l.keyword, 2.0))
            .fold(0.0_f32, f32::max);
        let box_w = 16.0 + 32.0 + 10.0 + text_w + 16.0;
        let box_h = 12.0 + row_h * self.lines.len() as f32;
        let box_x = left + width - box_w - 12.0;
        let box_y = top + 12.0;

        if let Some(rect) = Rect::from_xywh(box_x, box_y, box_w, box_h) {
            pixmap.fill_rect(rect, &solid([255, 255, 255]), Transform::identity(), None);
            let corners = [
                (box_x, box_y),
                (box_x + box_w, box_y),
                (box_x + box_w, box_y + box_h),
                (box_x, box_y + box_h),
                (box_x, box_y),
            ];
            for pair in corners.windows(2) {
                stroke_segment(pixmap, pair[0], pair[1], 1.0, &solid([190, 190, 190]));
            }
        }

        for (row, line) in self.lines.iter().enumerate() {
            let y = box_y + 12.0 + row_h * row as f32 + 7.0;
            stroke_segment(
                pixmap,
                (box_x + 16.0, y),
                (box_x + 48.0, y),
                3.0,
                &solid(line.color),
            );
            glyphs::draw_text(
                pixmap,
                box_x + 58.0,
                y - glyphs::text_height(2.0) / 2.0,
                &line.keyword,
                2.0,
                ink,
            );
        }
    }
}

fn solid(rgb: [u8; 3]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgb[0], rgb[1], rgb[2], 255);
    paint.anti_alias = true;
    paint
}

fn stroke_segment(
    pixmap: &mut Pixmap,
    from: (f32, f32),
    to: (f32, f32),
    width: f32,
    paint: &Paint,
) {
    let mut pb = PathBuilder::new();
    pb.move_to(from.0, from.1);
    pb.line_to(to.0, to.1);
    if let Some(path) = pb.finish() {
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, paint, &stroke, Transform::identity(), None);
    }
}

fn encode_png(pixmap: &Pixmap) -> Result<ChartImage> {
    let mut buffer = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buffer, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder
            .write_header()
            .map_err(|e| TrendsError::Chart(e.to_string()))?
            .write_image_data(pixmap.data())
            .map_err(|e| TrendsError::Chart(e.to_string()))?;
    }
    Ok(ChartImage {
        png: buffer,
        width: pixmap.width(),
        height: pixmap.height(),
    })
}

// ---------------------------------------------------------------------------
// ChartImage
// ---------------------------------------------------------------------------

/// An encoded chart, ready to embed in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ChartImage {
    /// Height over width.
    pub fn aspect_ratio(&self) -> f32 {
        if self.width == 0 {
            0.0
        } else {
            self.height as f32 / self.width as f32
        }
    }

    /// Write the PNG to a scratch file that is deleted when the returned path drops.
    pub fn write_scratch(&self) -> Result<TempPath> {
        let mut file = tempfile::Builder::new()
            .prefix("trends-chart-")
            .suffix(".png")
            .tempfile()?;
        file.write_all(&self.png)?;
        file.flush()?;
        log::debug!("Chart written to scratch file {}", file.path().display());
        Ok(file.into_temp_path())
    }
}
