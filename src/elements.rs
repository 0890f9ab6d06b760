//! Custom `genpdf` elements used by the report renderer.
//!
//! `genpdf` ships paragraphs and a basic table layout but has no fixed-height spacers, no
//! stroked rules, no cell backgrounds and no way to ask which page an element landed on.  This
//! module fills those gaps.
//!
//! `render::Area::draw_line` always strokes with the default PDF line width of 1 pt and only
//! takes a color from the style.  Fills and thick rules are therefore painted as stacks of
//! parallel hairlines, see [`hairline_offsets`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use genpdf::elements::Paragraph;
use genpdf::error::Error;
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Alignment, Element, Margins, Mm, Position, RenderResult, Size};

use crate::model::{
    CellPadding, HorizontalAlignment, RichParagraph, TableBlock, TableRules, VerticalAlignment,
};
use crate::style::{pt, Stroke, StyleSheet};

/// Width of a `draw_line` stroke in millimetres (1 pt).
pub(crate) const HAIRLINE_MM: f64 = 25.4 / 72.0;

/// Largest gap between neighbouring hairlines of a fill.  Below [`HAIRLINE_MM`] so strokes overlap.
const HAIRLINE_STEP_MM: f64 = 0.3;

/// Tolerance for comparing measured lengths. Also added to line areas so genpdf never wraps a
/// pre-wrapped line again.
const LAYOUT_EPSILON_MM: f64 = 0.01;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Centre offsets of the hairlines that cover a band `extent` millimetres wide.
///
/// Offsets are evenly spaced, at most [`HAIRLINE_STEP_MM`] apart and half a step in from each
/// edge.  Bands no wider than one hairline get a single centred stroke.
pub(crate) fn hairline_offsets(extent: f64) -> Vec<f64> {
    if extent <= 0.0 {
        return Vec::new();
    }
    if extent <= HAIRLINE_MM {
        return vec![extent / 2.0];
    }
    let count = (extent / HAIRLINE_STEP_MM).ceil() as usize;
    let step = extent / count as f64;
    (0..count).map(|index| (index as f64 + 0.5) * step).collect()
}

fn hairline(area: &render::Area<'_>, from: (f64, f64), to: (f64, f64), color: Color) {
    area.draw_line(
        vec![
            Position::new(mm_from_f64(from.0), mm_from_f64(from.1)),
            Position::new(mm_from_f64(to.0), mm_from_f64(to.1)),
        ],
        Style::new().with_color(color),
    );
}

fn fill_rect(area: &render::Area<'_>, x: f64, y: f64, width: f64, height: f64, color: Color) {
    if width <= 0.0 {
        return;
    }
    for offset in hairline_offsets(height) {
        hairline(area, (x, y + offset), (x + width, y + offset), color);
    }
}

/// Strokes the segment `from`..`to` with the stroke's thickness, centred on the segment.
fn stroke_line(area: &render::Area<'_>, from: (f64, f64), to: (f64, f64), stroke: Stroke) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = dx.hypot(dy);
    if length <= 0.0 {
        return;
    }
    let (nx, ny) = (-dy / length, dx / length);
    let thickness = stroke.thickness_mm();
    for offset in hairline_offsets(thickness) {
        let shift = offset - thickness / 2.0;
        hairline(
            area,
            (from.0 + nx * shift, from.1 + ny * shift),
            (to.0 + nx * shift, to.1 + ny * shift),
            stroke.color,
        );
    }
}

/// Fixed vertical gap.
///
/// A gap that does not fit the rest of the page is truncated rather than carried over.
pub struct VerticalSpace {
    height: f64,
}

impl VerticalSpace {
    /// Creates a gap of `height` millimetres.
    pub fn new(height: f64) -> Self {
        Self {
            height: height.max(0.0),
        }
    }
}

impl Element for VerticalSpace {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let available = mm_to_f64(area.size().height);
        let mut result = RenderResult::default();
        result.size = Size::new(0, mm_from_f64(self.height.min(available)));
        Ok(result)
    }
}

/// Full-width stroked line.
pub struct HorizontalRule {
    stroke: Stroke,
}

impl HorizontalRule {
    pub fn new(stroke: Stroke) -> Self {
        Self { stroke }
    }
}

impl Element for HorizontalRule {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let thickness = self.stroke.thickness_mm();
        let mut result = RenderResult::default();
        if thickness > mm_to_f64(area.size().height) {
            result.has_more = true;
            return Ok(result);
        }

        let width = mm_to_f64(area.size().width);
        let y = thickness / 2.0;
        stroke_line(&area, (0.0, y), (width, y), self.stroke);
        result.size = Size::new(area.size().width, mm_from_f64(thickness));
        Ok(result)
    }
}

/// Shared page counter plus the first page each tracked element was drawn on.
///
/// The page decorator calls [`PageTracker::start_page`] for every new page; elements wrapped in
/// [`PageTracked`] record the page they first produce output on.
#[derive(Clone, Debug, Default)]
pub struct PageTracker {
    current: Rc<Cell<usize>>,
    first_pages: Rc<RefCell<Vec<Option<usize>>>>,
}

impl PageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances to the next page and returns its 1-based number.
    pub fn start_page(&self) -> usize {
        let page = self.current.get() + 1;
        self.current.set(page);
        page
    }

    /// Number of pages started so far.
    pub fn page_count(&self) -> usize {
        self.current.get()
    }

    /// Reserves a slot for an element and returns its index.
    pub fn register(&self) -> usize {
        let mut pages = self.first_pages.borrow_mut();
        pages.push(None);
        pages.len() - 1
    }

    fn record(&self, slot: usize) {
        let mut pages = self.first_pages.borrow_mut();
        if let Some(entry) = pages.get_mut(slot) {
            if entry.is_none() {
                *entry = Some(self.current.get());
            }
        }
    }

    /// First page of every registered slot, `None` for slots never drawn.
    pub fn first_pages(&self) -> Vec<Option<usize>> {
        self.first_pages.borrow().clone()
    }
}

/// Wraps an element and records the page it first appears on.
pub struct PageTracked {
    inner: Box<dyn Element>,
    slot: usize,
    tracker: PageTracker,
}

impl PageTracked {
    pub fn new(inner: Box<dyn Element>, tracker: &PageTracker) -> Self {
        Self {
            inner,
            slot: tracker.register(),
            tracker: tracker.clone(),
        }
    }
}

impl Element for PageTracked {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let result = self.inner.render(context, area, style)?;
        // An element deferred to the next page reports no height and more content.
        if mm_to_f64(result.size.height) > 0.0 || !result.has_more {
            self.tracker.record(self.slot);
        }
        Ok(result)
    }
}

/// A wrapped line of styled text.
#[derive(Clone, Debug, Default)]
pub(crate) struct Line {
    pieces: Vec<StyledString>,
    width: f64,
    height: f64,
}

impl Line {
    fn push(&mut self, piece: StyledString, width: f64, height: f64) {
        self.pieces.push(piece);
        self.width += width;
        self.height = self.height.max(height);
    }

    fn finish(mut self, context: &genpdf::Context, base_height: f64) -> Self {
        if let Some(last) = self.pieces.last_mut() {
            let trimmed = last.s.trim_end().len();
            if trimmed < last.s.len() {
                let before = mm_to_f64(last.width(&context.font_cache));
                last.s.truncate(trimmed);
                self.width -= before - mm_to_f64(last.width(&context.font_cache));
            }
        }
        if self.pieces.is_empty() {
            self.height = base_height;
        }
        self
    }

    pub(crate) fn width(&self) -> f64 {
        self.width
    }

    pub(crate) fn height(&self) -> f64 {
        self.height
    }
}

/// Greedy word wrap of styled strings into lines no wider than `max_width` millimetres.
///
/// `\n` forces a line break. A single word wider than the line gets a line of its own.
pub(crate) fn wrap_lines(
    context: &genpdf::Context,
    strings: &[StyledString],
    base: Style,
    max_width: f64,
) -> Vec<Line> {
    let font_cache = &context.font_cache;
    let base_height = mm_to_f64(base.line_height(font_cache));
    let mut lines = Vec::new();
    let mut current = Line::default();

    for string in strings {
        let height = mm_to_f64(string.style.line_height(font_cache));
        for (index, segment) in string.s.split('\n').enumerate() {
            if index > 0 {
                lines.push(std::mem::take(&mut current).finish(context, base_height));
            }
            for word in segment.split_inclusive(' ') {
                let visible = StyledString::new(word.trim_end(), string.style);
                let visible_width = mm_to_f64(visible.width(font_cache));
                let mut word = word;
                if !current.pieces.is_empty() && current.width + visible_width > max_width {
                    lines.push(std::mem::take(&mut current).finish(context, base_height));
                    word = word.trim_start();
                    if word.is_empty() {
                        continue;
                    }
                }
                let piece = StyledString::new(word, string.style);
                let width = mm_to_f64(piece.width(font_cache));
                current.push(piece, width, height);
            }
        }
    }

    if !current.pieces.is_empty() || lines.is_empty() {
        lines.push(current.finish(context, base_height));
    }
    lines
}

struct PreparedParagraph {
    strings: Vec<StyledString>,
    base: Style,
    alignment: HorizontalAlignment,
    gap_after: f64,
}

impl PreparedParagraph {
    fn new(paragraph: &RichParagraph, stylesheet: &StyleSheet, fallback: HorizontalAlignment) -> Self {
        let text_style = stylesheet.get(paragraph.role());
        let base = text_style.to_style();
        Self {
            strings: paragraph
                .spans()
                .iter()
                .map(|span| span.to_styled_string(base))
                .collect(),
            base,
            alignment: paragraph.alignment().unwrap_or(fallback),
            gap_after: text_style.space_after,
        }
    }
}

struct PreparedCell {
    paragraphs: Vec<PreparedParagraph>,
    background: Option<Color>,
    padding: CellPadding,
    vertical: VerticalAlignment,
}

/// Lines of one cell, laid out for a known column width.
struct CellLayout {
    paragraphs: Vec<(Vec<Line>, HorizontalAlignment, f64)>,
    content_height: f64,
}

impl CellLayout {
    fn new(context: &genpdf::Context, cell: &PreparedCell, inner_width: f64) -> Self {
        let mut paragraphs = Vec::with_capacity(cell.paragraphs.len());
        let mut content_height = 0.0;
        let count = cell.paragraphs.len();
        for (index, paragraph) in cell.paragraphs.iter().enumerate() {
            let lines = wrap_lines(context, &paragraph.strings, paragraph.base, inner_width);
            content_height += lines.iter().map(Line::height).sum::<f64>();
            let gap = if index + 1 < count {
                paragraph.gap_after
            } else {
                0.0
            };
            content_height += gap;
            paragraphs.push((lines, paragraph.alignment, gap));
        }
        Self {
            paragraphs,
            content_height,
        }
    }
}

/// Table element with per-cell fills, padding and alignment.
///
/// Rows are laid out with [`wrap_lines`] before anything is drawn, so each row's height is known
/// up front.  A row that does not fit the remaining page height moves to the next page; a row
/// taller than a whole page is drawn anyway and clipped.  `page_height` is the content height of
/// a fresh page, used to tell a page top apart from a table that starts mid-page.
pub struct GridTable {
    table: TableBlock,
    rows: Vec<Vec<PreparedCell>>,
    page_height: f64,
    next_row: usize,
    deferred: bool,
}

impl GridTable {
    pub fn new(table: &TableBlock, stylesheet: &StyleSheet, page_height: f64) -> Self {
        let rows = table
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| PreparedCell {
                        paragraphs: cell
                            .paragraphs()
                            .iter()
                            .map(|paragraph| {
                                PreparedParagraph::new(paragraph, stylesheet, cell.style().alignment)
                            })
                            .collect(),
                        background: cell.style().background,
                        padding: cell.style().padding,
                        vertical: cell.style().vertical,
                    })
                    .collect()
            })
            .collect();

        Self {
            table: table.clone(),
            rows,
            page_height,
            next_row: 0,
            deferred: false,
        }
    }

    fn layout_row(
        &self,
        context: &genpdf::Context,
        row: &[PreparedCell],
        widths: &[f64],
    ) -> (Vec<CellLayout>, f64) {
        let mut layouts = Vec::with_capacity(row.len());
        let mut height: f64 = 0.0;
        for (cell, width) in row.iter().zip(widths) {
            let inner = (width - pt(cell.padding.left) - pt(cell.padding.right)).max(0.0);
            let layout = CellLayout::new(context, cell, inner);
            height = height
                .max(pt(cell.padding.top) + layout.content_height + pt(cell.padding.bottom));
            layouts.push(layout);
        }
        (layouts, height)
    }

    fn draw_row(
        &self,
        context: &genpdf::Context,
        area: &render::Area<'_>,
        style: Style,
        row: &[PreparedCell],
        layouts: &[CellLayout],
        geometry: RowGeometry<'_>,
    ) -> Result<(), Error> {
        let RowGeometry {
            widths,
            top,
            height,
            is_last,
        } = geometry;
        let total_width: f64 = widths.iter().sum();

        let mut x = 0.0;
        for (cell, width) in row.iter().zip(widths) {
            if let Some(color) = cell.background {
                fill_rect(area, x, top, *width, height, color);
            }
            x += width;
        }

        let mut x = 0.0;
        for ((cell, layout), width) in row.iter().zip(layouts).zip(widths) {
            let padding = cell.padding;
            let mut y = match cell.vertical {
                VerticalAlignment::Top => top + pt(padding.top),
                VerticalAlignment::Middle => top + (height - layout.content_height) / 2.0,
                VerticalAlignment::Bottom => top + height - pt(padding.bottom) - layout.content_height,
            };
            let left = x + pt(padding.left);
            let inner = (width - pt(padding.left) - pt(padding.right)).max(0.0);

            for (lines, alignment, gap) in &layout.paragraphs {
                for line in lines {
                    draw_line_text(context, area, style, line, left, y, inner, *alignment)?;
                    y += line.height();
                }
                y += gap;
            }
            x += width;
        }

        match self.table.rules() {
            TableRules::None => {}
            TableRules::Grid(stroke) => {
                stroke_line(area, (0.0, top), (total_width, top), stroke);
                stroke_line(area, (0.0, top + height), (total_width, top + height), stroke);
                let mut x = 0.0;
                stroke_line(area, (x, top), (x, top + height), stroke);
                for width in widths {
                    x += width;
                    stroke_line(area, (x, top), (x, top + height), stroke);
                }
            }
            TableRules::RowSeparators {
                stroke,
                include_last,
            } => {
                if !is_last || include_last {
                    stroke_line(area, (0.0, top + height), (total_width, top + height), stroke);
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
struct RowGeometry<'a> {
    widths: &'a [f64],
    top: f64,
    height: f64,
    is_last: bool,
}

/// Left and right margins that place a line of `line_width` inside the column `left..left + width`.
///
/// The area left for the line is always [`LAYOUT_EPSILON_MM`] wider than the line itself.
fn line_margins(
    area_width: f64,
    left: f64,
    width: f64,
    line_width: f64,
    alignment: HorizontalAlignment,
) -> (f64, f64) {
    let offset = match alignment {
        HorizontalAlignment::Left => 0.0,
        HorizontalAlignment::Center => ((width - line_width) / 2.0).max(0.0),
        HorizontalAlignment::Right => (width - line_width).max(0.0),
    };
    let right = (area_width - left - width - LAYOUT_EPSILON_MM).max(0.0);
    (left + offset, right)
}

#[allow(clippy::too_many_arguments)]
fn draw_line_text(
    context: &genpdf::Context,
    area: &render::Area<'_>,
    style: Style,
    line: &Line,
    left: f64,
    top: f64,
    width: f64,
    alignment: HorizontalAlignment,
) -> Result<(), Error> {
    if line.pieces.is_empty() {
        return Ok(());
    }
    let (margin_left, margin_right) = line_margins(
        mm_to_f64(area.size().width),
        left,
        width,
        line.width(),
        alignment,
    );
    let mut line_area = area.clone();
    line_area.add_margins(Margins::trbl(
        mm_from_f64(top),
        mm_from_f64(margin_right),
        mm_from_f64(0.0),
        mm_from_f64(margin_left),
    ));

    let mut paragraph = Paragraph::default();
    for piece in &line.pieces {
        paragraph.push(piece.clone());
    }
    paragraph.set_alignment(Alignment::Left);
    paragraph.render(context, line_area, style)?;
    Ok(())
}

impl Element for GridTable {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let widths = self.table.resolve_widths(mm_to_f64(area.size().width));
        let available = mm_to_f64(area.size().height);
        let mut used = 0.0;

        while self.next_row < self.rows.len() {
            let row = &self.rows[self.next_row];
            let (layouts, height) = self.layout_row(context, row, &widths);

            if used + height > available {
                let at_page_top = used == 0.0
                    && (self.deferred || available + LAYOUT_EPSILON_MM >= self.page_height);
                if !at_page_top {
                    self.deferred = used == 0.0;
                    result.has_more = true;
                    break;
                }
                log::warn!(
                    "table row {} is taller than a page ({:.1} mm); drawing it clipped",
                    self.next_row,
                    height
                );
            }

            let geometry = RowGeometry {
                widths: &widths,
                top: used,
                height,
                is_last: self.next_row + 1 == self.rows.len(),
            };
            self.draw_row(context, &area, style, row, &layouts, geometry)?;
            used += height;
            self.next_row += 1;
            self.deferred = false;
        }

        result.size = Size::new(area.size().width, mm_from_f64(used.min(available)));
        Ok(result)
    }
}
