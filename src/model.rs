//! Layout blocks a report is assembled from.
//!
//! A report is an ordered list of [`ReportSection`]s, each an ordered list of [`Block`]s.  The
//! types only describe content; [`crate::builder`] turns them into `genpdf` elements.  Once built
//! the sequence is rendered once, top to bottom.

use genpdf::style::Color;

use crate::richtext::{plain_text, Span};
use crate::style::{Stroke, StyleRole};

/// Horizontal placement of text within its box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical placement of cell content within its row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerticalAlignment {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Paragraph of spans rendered with a stylesheet role.
#[derive(Clone, Debug, PartialEq)]
pub struct RichParagraph {
    spans: Vec<Span>,
    role: StyleRole,
    alignment: Option<HorizontalAlignment>,
}

impl RichParagraph {
    /// Creates a paragraph rendered with `role`.
    pub fn new(role: StyleRole, spans: impl Into<Vec<Span>>) -> Self {
        Self {
            spans: spans.into(),
            role,
            alignment: None,
        }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn role(&self) -> StyleRole {
        self.role
    }

    /// Alignment override; `None` uses the role's alignment.
    pub fn alignment(&self) -> Option<HorizontalAlignment> {
        self.alignment
    }

    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// The paragraph text without styling.
    pub fn text(&self) -> String {
        plain_text(&self.spans)
    }
}

/// Heading depth. Level 1 is the document title.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeadingLevel {
    Title,
    Section,
    Subsection,
}

impl HeadingLevel {
    /// Numeric level, starting at 1.
    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::Title => 1,
            HeadingLevel::Section => 2,
            HeadingLevel::Subsection => 3,
        }
    }

    /// Stylesheet role used to render headings of this level.
    pub fn role(self) -> StyleRole {
        match self {
            HeadingLevel::Title => StyleRole::Title,
            HeadingLevel::Section => StyleRole::Heading,
            HeadingLevel::Subsection => StyleRole::Subheading,
        }
    }
}

/// Horizontal extent of a table column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColumnWidth {
    /// Fixed width in millimetres.
    Fixed(f64),
    /// Share of the full content width.
    Fraction(f64),
    /// Whatever the other columns leave over, split evenly between remainder columns.
    Remainder,
}

/// Inner spacing of a cell, in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPadding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl CellPadding {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(points: f64) -> Self {
        Self::new(points, points, points, points)
    }
}

impl Default for CellPadding {
    fn default() -> Self {
        Self::uniform(3.0)
    }
}

/// Per-cell presentation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellStyle {
    pub background: Option<Color>,
    pub padding: CellPadding,
    pub alignment: HorizontalAlignment,
    pub vertical: VerticalAlignment,
}

impl CellStyle {
    pub fn with_background(mut self, background: impl Into<Option<Color>>) -> Self {
        self.background = background.into();
        self
    }

    pub fn with_padding(mut self, padding: CellPadding) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_vertical(mut self, vertical: VerticalAlignment) -> Self {
        self.vertical = vertical;
        self
    }
}

/// A table cell: stacked paragraphs plus presentation.
#[derive(Clone, Debug, PartialEq)]
pub struct TableCell {
    paragraphs: Vec<RichParagraph>,
    style: CellStyle,
}

impl TableCell {
    pub fn new(paragraphs: impl Into<Vec<RichParagraph>>, style: CellStyle) -> Self {
        Self {
            paragraphs: paragraphs.into(),
            style,
        }
    }

    /// Single-paragraph cell.
    pub fn paragraph(paragraph: RichParagraph, style: CellStyle) -> Self {
        Self::new(vec![paragraph], style)
    }

    pub fn paragraphs(&self) -> &[RichParagraph] {
        &self.paragraphs
    }

    pub fn style(&self) -> &CellStyle {
        &self.style
    }

    /// Cell text, paragraphs joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(RichParagraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Lines drawn between cells.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TableRules {
    #[default]
    None,
    /// Every cell edge.
    Grid(Stroke),
    /// A line under each row, optionally skipping the last one.
    RowSeparators { stroke: Stroke, include_last: bool },
}

/// Table of rows of cells. Rows are never split across pages.
#[derive(Clone, Debug, PartialEq)]
pub struct TableBlock {
    columns: Vec<ColumnWidth>,
    rows: Vec<Vec<TableCell>>,
    rules: TableRules,
}

impl TableBlock {
    pub fn new(columns: impl Into<Vec<ColumnWidth>>) -> Self {
        Self {
            columns: columns.into(),
            rows: Vec::new(),
            rules: TableRules::None,
        }
    }

    pub fn with_rules(mut self, rules: TableRules) -> Self {
        self.rules = rules;
        self
    }

    /// Appends a row. Rows shorter than the column list render empty trailing cells.
    pub fn with_row(mut self, cells: impl Into<Vec<TableCell>>) -> Self {
        self.rows.push(cells.into());
        self
    }

    pub fn columns(&self) -> &[ColumnWidth] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<TableCell>] {
        &self.rows
    }

    pub fn rules(&self) -> TableRules {
        self.rules
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Plain text of the cell at `row`, `column`.
    pub fn cell_text(&self, row: usize, column: usize) -> Option<String> {
        self.rows.get(row)?.get(column).map(TableCell::text)
    }

    /// Resolves the column widths in millimetres for a content width.
    pub fn resolve_widths(&self, content_width: f64) -> Vec<f64> {
        let reserved: f64 = self
            .columns
            .iter()
            .map(|column| match column {
                ColumnWidth::Fixed(mm) => *mm,
                ColumnWidth::Fraction(share) => share * content_width,
                ColumnWidth::Remainder => 0.0,
            })
            .sum();
        let remainder_columns = self
            .columns
            .iter()
            .filter(|column| matches!(column, ColumnWidth::Remainder))
            .count();
        let leftover = if remainder_columns == 0 {
            0.0
        } else {
            (content_width - reserved).max(0.0) / remainder_columns as f64
        };

        self.columns
            .iter()
            .map(|column| match column {
                ColumnWidth::Fixed(mm) => *mm,
                ColumnWidth::Fraction(share) => share * content_width,
                ColumnWidth::Remainder => leftover,
            })
            .collect()
    }
}

/// Horizontal rule across the content width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuleBlock {
    pub stroke: Stroke,
}

/// One unit of layout.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Heading { text: String, level: HeadingLevel },
    Paragraph(RichParagraph),
    Table(TableBlock),
    /// Vertical gap in millimetres.
    Spacer(f64),
    PageBreak,
    Rule(RuleBlock),
}

impl Block {
    pub fn heading(text: impl Into<String>, level: HeadingLevel) -> Self {
        Self::Heading {
            text: text.into(),
            level,
        }
    }

    pub fn paragraph(role: StyleRole, spans: impl Into<Vec<Span>>) -> Self {
        Self::Paragraph(RichParagraph::new(role, spans))
    }

    pub fn spacer(mm: f64) -> Self {
        Self::Spacer(mm)
    }

    pub fn rule(thickness: f64, color: Color) -> Self {
        Self::Rule(RuleBlock {
            stroke: Stroke::new(thickness, color),
        })
    }

    /// Short kind label, used in logs and tests.
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Heading { .. } => "heading",
            Block::Paragraph(_) => "paragraph",
            Block::Table(_) => "table",
            Block::Spacer(_) => "spacer",
            Block::PageBreak => "page-break",
            Block::Rule(_) => "rule",
        }
    }

    /// Whether the block carries text (heading, paragraph or table).
    pub fn is_content(&self) -> bool {
        matches!(
            self,
            Block::Heading { .. } | Block::Paragraph(_) | Block::Table(_)
        )
    }
}

/// Ordered run of blocks, optionally titled for the document outline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportSection {
    title: Option<String>,
    blocks: Vec<Block>,
}

impl ReportSection {
    /// Untitled section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Section listed in the outline under `title`.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            blocks: Vec::new(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.push(block);
        self
    }

    pub fn with_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        self.blocks.extend(blocks);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREY: Color = Color::Rgb(226, 232, 240);

    fn cell(text: &str) -> TableCell {
        TableCell::paragraph(
            RichParagraph::new(StyleRole::TableCell, vec![Span::new(text)]),
            CellStyle::default(),
        )
    }

    #[test]
    fn fractions_and_fixed_widths_resolve() {
        let table = TableBlock::new(vec![ColumnWidth::Fraction(0.35), ColumnWidth::Fraction(0.65)]);
        let widths = table.resolve_widths(160.0);
        assert!((widths[0] - 56.0).abs() < 1e-9);
        assert!((widths[1] - 104.0).abs() < 1e-9);
    }

    #[test]
    fn remainder_takes_leftover_width() {
        let table = TableBlock::new(vec![ColumnWidth::Fixed(12.0), ColumnWidth::Remainder]);
        assert_eq!(table.resolve_widths(160.0), vec![12.0, 148.0]);
    }

    #[test]
    fn remainder_never_goes_negative() {
        let table = TableBlock::new(vec![ColumnWidth::Fixed(200.0), ColumnWidth::Remainder]);
        assert_eq!(table.resolve_widths(160.0)[1], 0.0);
    }

    #[test]
    fn cell_text_is_preserved() {
        let table = TableBlock::new(vec![ColumnWidth::Remainder, ColumnWidth::Remainder])
            .with_row(vec![cell("Component"), cell("Technology")])
            .with_row(vec![cell("Email"), cell("Resend")])
            .with_rules(TableRules::Grid(Stroke::new(0.5, GREY)));

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.cell_text(1, 1).as_deref(), Some("Resend"));
        assert_eq!(table.cell_text(2, 0), None);
    }

    #[test]
    fn multi_paragraph_cell_text_joins_lines() {
        let cell = TableCell::new(
            vec![
                RichParagraph::new(StyleRole::TableCell, vec![Span::new("Launch").bold()]),
                RichParagraph::new(StyleRole::CellNote, vec![Span::new("Share QR codes")]),
            ],
            CellStyle::default(),
        );
        assert_eq!(cell.text(), "Launch\nShare QR codes");
    }

    #[test]
    fn heading_levels_map_to_roles() {
        assert_eq!(HeadingLevel::Title.role(), StyleRole::Title);
        assert_eq!(HeadingLevel::Subsection.depth(), 3);
    }

    #[test]
    fn only_text_blocks_count_as_content() {
        assert!(Block::heading("Summary", HeadingLevel::Section).is_content());
        assert!(!Block::spacer(2.0).is_content());
        assert!(!Block::PageBreak.is_content());
        assert_eq!(Block::rule(1.0, GREY).kind(), "rule");
    }
}
