//! Two-part PDF report: a chart page followed by paginated table pages.
//!
//! [`layout_document`] places every text run, table cell and the chart in
//! page coordinates (millimetres from the top-left corner). The layout is
//! then emitted with printpdf by [`build_document_dated`]; keeping the two
//! apart lets callers inspect exactly what ends up on each page.

use printpdf::image_crate::{self, DynamicImage, ImageFormat};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point,
};
use time::Date;

use crate::config::{BOTTOM_MARGIN_MM, PAGE_HEIGHT_MM, PAGE_MARGIN_MM, PAGE_WIDTH_MM};
use crate::error::{Result, TrendsError};
use crate::models::{footer_date, local_today, InterestSeries, ReportMetadata};
use crate::report::chart::ChartImage;
use crate::report::metrics::{points_to_mm, text_width_mm, FontStyle};

const LINE_HEIGHT_MM: f32 = 10.0;
const HEADER_ROW_MM: f32 = 10.0;
const DATA_ROW_MM: f32 = 8.0;
const CHART_GAP_MM: f32 = 5.0;
const HEADING_GAP_MM: f32 = 5.0;
const FOOTER_OFFSET_MM: f32 = 15.0;
const BORDER_THICKNESS: f32 = 0.2;

// ---------------------------------------------------------------------------
// Layout model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x_mm: f32,
    pub baseline_mm: f32,
    pub size_pt: f32,
    pub style: FontStyle,
}

/// A bordered table cell with its text centered.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub text: String,
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
    pub size_pt: f32,
    pub header: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlacement {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(TextRun),
    Cell(TableCell),
    Chart(ChartPlacement),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLayout {
    pub elements: Vec<Element>,
}

impl PageLayout {
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(run) => Some(run),
            _ => None,
        })
    }

    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.elements.iter().filter_map(|e| match e {
            Element::Cell(cell) => Some(cell),
            _ => None,
        })
    }

    pub fn chart(&self) -> Option<&ChartPlacement> {
        self.elements.iter().find_map(|e| match e {
            Element::Chart(placement) => Some(placement),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text of the first header row, if the document has a table.
    pub fn table_header(&self) -> Option<Vec<String>> {
        self.pages
            .iter()
            .map(|page| cell_rows(page, true))
            .find_map(|rows| rows.into_iter().next())
    }

    /// Text of every data row across all table pages, in order.
    pub fn table_rows(&self) -> Vec<Vec<String>> {
        self.pages
            .iter()
            .flat_map(|page| cell_rows(page, false))
            .collect()
    }
}

fn cell_rows(page: &PageLayout, header: bool) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row_y: Option<f32> = None;
    for cell in page.cells().filter(|c| c.header == header) {
        if row_y != Some(cell.y_mm) {
            rows.push(Vec::new());
            row_y = Some(cell.y_mm);
        }
        if let Some(row) = rows.last_mut() {
            row.push(cell.text.clone());
        }
    }
    rows
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

fn centered(text: String, top: f32, size_pt: f32, style: FontStyle) -> TextRun {
    let width = text_width_mm(&text, size_pt, style);
    TextRun {
        x_mm: (PAGE_WIDTH_MM - width) / 2.0,
        baseline_mm: baseline(top, LINE_HEIGHT_MM, size_pt),
        text,
        size_pt,
        style,
    }
}

/// Baseline that vertically centers a line of `size_pt` text in a box.
fn baseline(top: f32, height: f32, size_pt: f32) -> f32 {
    top + height / 2.0 + points_to_mm(size_pt) * 0.35
}

fn push_row(
    page: &mut PageLayout,
    cells: &[String],
    top: f32,
    col_width: f32,
    height: f32,
    header: bool,
) {
    let size_pt = if header { 11.0 } else { 10.0 };
    for (idx, text) in cells.iter().enumerate() {
        page.elements.push(Element::Cell(TableCell {
            text: text.clone(),
            x_mm: PAGE_MARGIN_MM + col_width * idx as f32,
            y_mm: top,
            width_mm: col_width,
            height_mm: height,
            size_pt,
            header,
        }));
    }
}

/// Place every element of the report.
///
/// `chart_aspect` is the chart's height over width; the chart is scaled to
/// the page width minus margins. Fails with [`TrendsError::InvalidState`]
/// for an empty series.
pub fn layout_document(
    series: &InterestSeries,
    metadata: &ReportMetadata,
    chart_aspect: f32,
    export_date: Date,
) -> Result<DocumentLayout> {
    if series.is_empty() {
        return Err(TrendsError::InvalidState(
            "cannot build a report without interest data".to_string(),
        ));
    }

    let keyword_list = metadata.keyword_list();
    let usable_width = PAGE_WIDTH_MM - 2.0 * PAGE_MARGIN_MM;
    let mut pages = Vec::new();

    // Chart page.
    let mut first = PageLayout::default();
    let mut y = PAGE_MARGIN_MM;
    first.elements.push(Element::Text(centered(
        format!("Search trend: {keyword_list}"),
        y,
        14.0,
        FontStyle::Bold,
    )));
    y += LINE_HEIGHT_MM;
    first.elements.push(Element::Text(centered(
        format!("{} | {}", metadata.geography_label, metadata.range_label),
        y,
        11.0,
        FontStyle::Regular,
    )));
    y += LINE_HEIGHT_MM;
    first.elements.push(Element::Text(centered(
        format!("Category: {}", metadata.category_label),
        y,
        11.0,
        FontStyle::Regular,
    )));
    y += LINE_HEIGHT_MM + CHART_GAP_MM;
    first.elements.push(Element::Chart(ChartPlacement {
        x_mm: PAGE_MARGIN_MM,
        y_mm: y,
        width_mm: usable_width,
        height_mm: usable_width * chart_aspect,
    }));
    pages.push(first);

    // Table pages.
    let header = series.table_header();
    let col_width = usable_width / header.len() as f32;
    let limit = PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM;

    let mut page = PageLayout::default();
    let mut y = PAGE_MARGIN_MM;
    page.elements.push(Element::Text(TextRun {
        text: format!("Search data: {keyword_list}"),
        x_mm: PAGE_MARGIN_MM,
        baseline_mm: baseline(y, LINE_HEIGHT_MM, 12.0),
        size_pt: 12.0,
        style: FontStyle::Bold,
    }));
    y += LINE_HEIGHT_MM + HEADING_GAP_MM;
    push_row(&mut page, &header, y, col_width, HEADER_ROW_MM, true);
    y += HEADER_ROW_MM;

    for row in series.table_rows() {
        if y + DATA_ROW_MM > limit {
            pages.push(std::mem::take(&mut page));
            y = PAGE_MARGIN_MM;
            push_row(&mut page, &header, y, col_width, HEADER_ROW_MM, true);
            y += HEADER_ROW_MM;
        }
        push_row(&mut page, &row, y, col_width, DATA_ROW_MM, false);
        y += DATA_ROW_MM;
    }
    pages.push(page);

    let footer = format!("Exported on {}", footer_date(export_date));
    for page in &mut pages {
        page.elements.push(Element::Text(centered(
            footer.clone(),
            PAGE_HEIGHT_MM - FOOTER_OFFSET_MM,
            8.0,
            FontStyle::Italic,
        )));
    }

    Ok(DocumentLayout {
        title: format!("Search trend: {keyword_list}"),
        pages,
    })
}

// ---------------------------------------------------------------------------
// PDF emission
// ---------------------------------------------------------------------------

/// Build the report PDF, stamping today's local date in the footer.
pub fn build_document(
    series: &InterestSeries,
    metadata: &ReportMetadata,
    chart: &ChartImage,
) -> Result<Vec<u8>> {
    build_document_dated(series, metadata, chart, local_today())
}

/// Build the report PDF with an explicit export date.
pub fn build_document_dated(
    series: &InterestSeries,
    metadata: &ReportMetadata,
    chart: &ChartImage,
    export_date: Date,
) -> Result<Vec<u8>> {
    let layout = layout_document(series, metadata, chart.aspect_ratio(), export_date)?;
    let bytes = render_pdf(&layout, chart)?;
    log::info!(
        "Built {}-page report for [{}] ({} bytes)",
        layout.page_count(),
        metadata.keyword_list(),
        bytes.len()
    );
    Ok(bytes)
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

fn pdf_err(e: impl std::fmt::Display) -> TrendsError {
    TrendsError::Document(e.to_string())
}

/// Convert a top-left based y coordinate to PDF's bottom-left origin.
fn flip(y_mm: f32) -> Mm {
    Mm(PAGE_HEIGHT_MM - y_mm)
}

fn render_pdf(layout: &DocumentLayout, chart: &ChartImage) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        layout.title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?,
        italic: doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(pdf_err)?,
    };

    for (idx, page) in layout.pages.iter().enumerate() {
        let layer = if idx == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_idx, layer_idx) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            doc.get_page(page_idx).get_layer(layer_idx)
        };
        layer.set_outline_thickness(BORDER_THICKNESS);

        for element in &page.elements {
            match element {
                Element::Text(run) => {
                    layer.use_text(
                        run.text.as_str(),
                        run.size_pt,
                        Mm(run.x_mm),
                        flip(run.baseline_mm),
                        fonts.get(run.style),
                    );
                }
                Element::Cell(cell) => draw_cell(&layer, cell, &fonts),
                Element::Chart(placement) => draw_chart(&layer, placement, chart)?,
            }
        }
    }

    doc.save_to_bytes().map_err(pdf_err)
}

fn draw_cell(layer: &PdfLayerReference, cell: &TableCell, fonts: &Fonts) {
    let (left, right) = (cell.x_mm, cell.x_mm + cell.width_mm);
    let (top, bottom) = (cell.y_mm, cell.y_mm + cell.height_mm);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(left), flip(top)), false),
            (Point::new(Mm(right), flip(top)), false),
            (Point::new(Mm(right), flip(bottom)), false),
            (Point::new(Mm(left), flip(bottom)), false),
        ],
        is_closed: true,
    });

    let style = if cell.header {
        FontStyle::Bold
    } else {
        FontStyle::Regular
    };
    let text_w = text_width_mm(&cell.text, cell.size_pt, style);
    layer.use_text(
        cell.text.as_str(),
        cell.size_pt,
        Mm(left + (cell.width_mm - text_w) / 2.0),
        flip(baseline(top, cell.height_mm, cell.size_pt)),
        fonts.get(style),
    );
}

fn draw_chart(
    layer: &PdfLayerReference,
    placement: &ChartPlacement,
    chart: &ChartImage,
) -> Result<()> {
    let decoded =
        image_crate::load_from_memory_with_format(&chart.png, ImageFormat::Png).map_err(pdf_err)?;
    // Flatten to RGB so no soft mask is needed.
    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
    let dpi = chart.width as f32 * 25.4 / placement.width_mm;
    Image::from_dynamic_image(&rgb).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(placement.x_mm)),
            translate_y: Some(flip(placement.y_mm + placement.height_mm)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
    Ok(())
}
