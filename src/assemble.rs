//! Turns a literal content plan into report sections.
//!
//! A [`ContentPlan`] describes a report in terms of reusable items (fact tables, checklists,
//! numbered steps, …).  [`assemble`] expands every item into layout [`Block`]s in declaration
//! order.  Assembly never fails: markup that does not parse is kept as literal text and a
//! warning is logged.

use genpdf::style::Color;
use log::{debug, warn};

use crate::model::{
    Block, CellPadding, CellStyle, ColumnWidth, HeadingLevel, HorizontalAlignment,
    ReportSection, RichParagraph, TableBlock, TableCell, TableRules, VerticalAlignment,
};
use crate::richtext::{parse_markup, Span};
use crate::style::{Stroke, StyleRole};

/// Everything one report says, in order.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentPlan {
    pub title_block: TitleBlock,
    pub sections: Vec<PlanSection>,
    pub closing: Option<Closing>,
}

/// Title, subtitle, accent rule and meta line at the top of the first page.
///
/// Gaps are millimetres; zero gaps emit no spacer.
#[derive(Clone, Debug, PartialEq)]
pub struct TitleBlock {
    pub lead_space: f64,
    pub title: String,
    pub subtitle: String,
    pub gap_before_rule: f64,
    pub rule: Stroke,
    pub gap_after_rule: f64,
    /// Markup.
    pub meta: String,
    pub trailing_space: f64,
}

/// Numbered section: a heading followed by items.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanSection {
    pub heading: String,
    pub items: Vec<PlanItem>,
}

impl PlanSection {
    pub fn new(heading: impl Into<String>, items: Vec<PlanItem>) -> Self {
        Self {
            heading: heading.into(),
            items,
        }
    }
}

/// Spacer, thin rule and centered footer line closing the report.
#[derive(Clone, Debug, PartialEq)]
pub struct Closing {
    pub space_before: f64,
    pub rule: Stroke,
    pub gap_after_rule: f64,
    pub footer: String,
}

/// Glyph prefixed to list items.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ListMarker {
    pub glyph: &'static str,
    pub color: Color,
    pub bold: bool,
}

impl ListMarker {
    pub const fn new(glyph: &'static str, color: Color) -> Self {
        Self {
            glyph,
            color,
            bold: false,
        }
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn span(&self) -> Span {
        let span = Span::new(self.glyph).colored(self.color);
        if self.bold {
            span.bold()
        } else {
            span
        }
    }
}

/// Bold title line with an indented description underneath.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailItem {
    pub title: String,
    pub description: String,
}

impl DetailItem {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Numbered step; both fields are markup.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub title: String,
    pub description: String,
}

impl Step {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Presentation of a run of numbered steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepLook {
    pub badge_width: ColumnWidth,
    pub body_width: ColumnWidth,
    pub badge_fill: Option<Color>,
    pub body_fill: Option<Color>,
    pub number_color: Color,
    pub number_size: u8,
    pub badge_padding: CellPadding,
    pub body_padding: CellPadding,
    pub badge_vertical: VerticalAlignment,
    pub body_vertical: VerticalAlignment,
    pub rules: TableRules,
    /// Gap after every step, in millimetres.
    pub gap_after: f64,
}

/// Presentation of a two-column fact table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FactLook {
    pub header_fill: Option<Color>,
    pub key_fill: Option<Color>,
    pub value_fill: Option<Color>,
    /// Fill of the first, third, fifth… data row. Takes precedence over column fills.
    pub band_fill: Option<Color>,
    pub bold_keys: bool,
    pub rules: TableRules,
    pub padding: CellPadding,
    pub vertical: VerticalAlignment,
}

/// Two-column key/value table with an optional header row.
#[derive(Clone, Debug, PartialEq)]
pub struct FactTable {
    pub header: Option<[String; 2]>,
    /// Key and value markup.
    pub rows: Vec<[String; 2]>,
    pub key_width: f64,
    pub value_width: f64,
    pub look: FactLook,
}

impl FactTable {
    /// Creates a table whose columns take `key_width` and `value_width` of the content width.
    pub fn new(key_width: f64, value_width: f64, look: FactLook) -> Self {
        Self {
            header: None,
            rows: Vec::new(),
            key_width,
            value_width,
            look,
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.header = Some([key.into(), value.into()]);
        self
    }

    pub fn with_row(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.rows.push([key.into(), value.into()]);
        self
    }
}

/// One entry of a plan section.
#[derive(Clone, Debug, PartialEq)]
pub enum PlanItem {
    Text { markup: String, role: StyleRole },
    Subheading(String),
    Facts(FactTable),
    Checklist { marker: ListMarker, items: Vec<String> },
    Details { marker: ListMarker, items: Vec<DetailItem> },
    Steps { look: StepLook, steps: Vec<Step> },
    /// Gap in millimetres.
    Spacer(f64),
    PageBreak,
}

impl PlanItem {
    pub fn text(role: StyleRole, markup: impl Into<String>) -> Self {
        Self::Text {
            markup: markup.into(),
            role,
        }
    }

    pub fn checklist<I, S>(marker: ListMarker, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Checklist {
            marker,
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Parses `markup`, keeping it as literal text when it is malformed.
pub fn spans_or_literal(markup: &str) -> Vec<Span> {
    match parse_markup(markup) {
        Ok(spans) => spans,
        Err(err) => {
            warn!("Keeping malformed markup {:?} as literal text: {}", markup, err);
            vec![Span::new(markup)]
        }
    }
}

fn paragraph(role: StyleRole, markup: &str) -> RichParagraph {
    RichParagraph::new(role, spans_or_literal(markup))
}

fn push_spacer(blocks: &mut Vec<Block>, mm: f64) {
    if mm > 0.0 {
        blocks.push(Block::spacer(mm));
    }
}

fn title_section(title: &TitleBlock) -> ReportSection {
    let mut blocks = Vec::new();
    push_spacer(&mut blocks, title.lead_space);
    blocks.push(Block::heading(title.title.clone(), HeadingLevel::Title));
    blocks.push(Block::paragraph(
        StyleRole::Subtitle,
        spans_or_literal(&title.subtitle),
    ));
    push_spacer(&mut blocks, title.gap_before_rule);
    blocks.push(Block::rule(title.rule.thickness, title.rule.color));
    push_spacer(&mut blocks, title.gap_after_rule);
    blocks.push(Block::paragraph(StyleRole::Meta, spans_or_literal(&title.meta)));
    push_spacer(&mut blocks, title.trailing_space);
    ReportSection::new().with_blocks(blocks)
}

fn closing_section(closing: &Closing) -> ReportSection {
    let mut blocks = Vec::new();
    push_spacer(&mut blocks, closing.space_before);
    blocks.push(Block::rule(closing.rule.thickness, closing.rule.color));
    push_spacer(&mut blocks, closing.gap_after_rule);
    blocks.push(Block::Paragraph(
        paragraph(StyleRole::Footer, &closing.footer).with_alignment(HorizontalAlignment::Center),
    ));
    ReportSection::new().with_blocks(blocks)
}

fn fact_table(facts: &FactTable) -> TableBlock {
    let look = facts.look;
    let base = CellStyle::default()
        .with_padding(look.padding)
        .with_vertical(look.vertical);

    let mut table = TableBlock::new(vec![
        ColumnWidth::Fraction(facts.key_width),
        ColumnWidth::Fraction(facts.value_width),
    ])
    .with_rules(look.rules);

    if let Some([key, value]) = &facts.header {
        let style = base.with_background(look.header_fill);
        table = table.with_row(vec![
            TableCell::paragraph(paragraph(StyleRole::TableHeader, key), style),
            TableCell::paragraph(paragraph(StyleRole::TableHeader, value), style),
        ]);
    }

    for (index, [key, value]) in facts.rows.iter().enumerate() {
        let band = look.band_fill.filter(|_| index % 2 == 0);
        let key_style = base.with_background(band.or(look.key_fill));
        let value_style = base.with_background(band.or(look.value_fill));

        let mut key_spans = spans_or_literal(key);
        if look.bold_keys {
            key_spans = key_spans.into_iter().map(Span::bold).collect();
        }
        table = table.with_row(vec![
            TableCell::paragraph(RichParagraph::new(StyleRole::TableCell, key_spans), key_style),
            TableCell::paragraph(paragraph(StyleRole::TableCell, value), value_style),
        ]);
    }

    table
}

fn step_table(look: &StepLook, number: usize, step: &Step) -> TableBlock {
    let badge = TableCell::paragraph(
        RichParagraph::new(
            StyleRole::TableCell,
            vec![Span::new(number.to_string())
                .bold()
                .colored(look.number_color)
                .sized(look.number_size)],
        )
        .with_alignment(HorizontalAlignment::Center),
        CellStyle::default()
            .with_background(look.badge_fill)
            .with_padding(look.badge_padding)
            .with_vertical(look.badge_vertical),
    );

    let title_spans = spans_or_literal(&step.title)
        .into_iter()
        .map(Span::bold)
        .collect::<Vec<_>>();
    let body = TableCell::new(
        vec![
            RichParagraph::new(StyleRole::TableCell, title_spans),
            paragraph(StyleRole::CellNote, &step.description),
        ],
        CellStyle::default()
            .with_background(look.body_fill)
            .with_padding(look.body_padding)
            .with_vertical(look.body_vertical),
    );

    TableBlock::new(vec![look.badge_width, look.body_width])
        .with_rules(look.rules)
        .with_row(vec![badge, body])
}

fn item_blocks(item: &PlanItem, blocks: &mut Vec<Block>) {
    match item {
        PlanItem::Text { markup, role } => blocks.push(Block::Paragraph(paragraph(*role, markup))),
        PlanItem::Subheading(text) => {
            blocks.push(Block::heading(text.clone(), HeadingLevel::Subsection))
        }
        PlanItem::Facts(facts) => blocks.push(Block::Table(fact_table(facts))),
        PlanItem::Checklist { marker, items } => {
            for item in items {
                let mut spans = vec![marker.span(), Span::new("  ")];
                spans.extend(spans_or_literal(item));
                blocks.push(Block::paragraph(StyleRole::ListItem, spans));
            }
        }
        PlanItem::Details { marker, items } => {
            for item in items {
                let mut spans = vec![marker.span(), Span::new("  ")];
                spans.extend(spans_or_literal(&item.title).into_iter().map(Span::bold));
                blocks.push(Block::paragraph(StyleRole::DetailTitle, spans));
                blocks.push(Block::Paragraph(paragraph(
                    StyleRole::Detail,
                    &item.description,
                )));
            }
        }
        PlanItem::Steps { look, steps } => {
            for (index, step) in steps.iter().enumerate() {
                blocks.push(Block::Table(step_table(look, index + 1, step)));
                push_spacer(blocks, look.gap_after);
            }
        }
        PlanItem::Spacer(mm) => blocks.push(Block::spacer(*mm)),
        PlanItem::PageBreak => blocks.push(Block::PageBreak),
    }
}

/// Expands `plan` into sections: the title block, one titled section per plan section, then the
/// closing footer.
pub fn assemble(plan: &ContentPlan) -> Vec<ReportSection> {
    let mut sections = Vec::with_capacity(plan.sections.len() + 2);
    sections.push(title_section(&plan.title_block));

    for section in &plan.sections {
        let mut blocks = vec![Block::heading(section.heading.clone(), HeadingLevel::Section)];
        for item in &section.items {
            item_blocks(item, &mut blocks);
        }
        debug!("assembled '{}' into {} blocks", section.heading, blocks.len());
        sections.push(ReportSection::titled(section.heading.clone()).with_blocks(blocks));
    }

    if let Some(closing) = &plan.closing {
        sections.push(closing_section(closing));
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORAL: Color = Color::Rgb(0xd4, 0x85, 0x6a);
    const GREEN: Color = Color::Rgb(0x16, 0xa3, 0x4a);
    const GREY: Color = Color::Rgb(0xe2, 0xe8, 0xf0);

    fn look() -> FactLook {
        FactLook {
            header_fill: Some(CORAL),
            key_fill: Some(GREY),
            value_fill: None,
            band_fill: None,
            bold_keys: true,
            rules: TableRules::Grid(Stroke::new(0.5, GREY)),
            padding: CellPadding::uniform(6.0),
            vertical: VerticalAlignment::Middle,
        }
    }

    fn plan() -> ContentPlan {
        ContentPlan {
            title_block: TitleBlock {
                lead_space: 15.0,
                title: "TipUs".into(),
                subtitle: "Digital Tipping Platform".into(),
                gap_before_rule: 0.0,
                rule: Stroke::new(2.0, CORAL),
                gap_after_rule: 6.0,
                meta: "Project Status Report".into(),
                trailing_space: 8.0,
            },
            sections: vec![
                PlanSection::new(
                    "1. Summary",
                    vec![
                        PlanItem::text(StyleRole::Body, "**TipUs** is a tipping platform."),
                        PlanItem::Facts(
                            FactTable::new(0.3, 0.7, look())
                                .with_header("Component", "Technology")
                                .with_row("Email", "Resend")
                                .with_row("Hosting", "Netlify"),
                        ),
                        PlanItem::PageBreak,
                    ],
                ),
                PlanSection::new(
                    "2. Working",
                    vec![PlanItem::checklist(
                        ListMarker::new("✓", GREEN).bold(),
                        ["**QR Codes** — per venue", "Payouts"],
                    )],
                ),
            ],
            closing: Some(Closing {
                space_before: 15.0,
                rule: Stroke::new(1.0, GREY),
                gap_after_rule: 4.0,
                footer: "TipUs Status Report".into(),
            }),
        }
    }

    fn kinds(sections: &[ReportSection]) -> Vec<&'static str> {
        sections
            .iter()
            .flat_map(|section| section.blocks().iter().map(Block::kind))
            .collect()
    }

    #[test]
    fn assembling_twice_is_identical() {
        let plan = plan();
        assert_eq!(assemble(&plan), assemble(&plan));
    }

    #[test]
    fn blocks_follow_plan_order() {
        let sections = assemble(&plan());
        assert_eq!(
            kinds(&sections),
            vec![
                "spacer", "heading", "paragraph", "rule", "spacer", "paragraph", "spacer",
                "heading", "paragraph", "table", "page-break",
                "heading", "paragraph", "paragraph",
                "spacer", "rule", "spacer", "paragraph",
            ]
        );
    }

    #[test]
    fn only_plan_sections_are_titled() {
        let sections = assemble(&plan());
        let titles: Vec<_> = sections.iter().map(ReportSection::title).collect();
        assert_eq!(titles, vec![None, Some("1. Summary"), Some("2. Working"), None]);
    }

    #[test]
    fn fact_table_keeps_cells_and_fills() {
        let sections = assemble(&plan());
        let Some(Block::Table(table)) = sections[1].blocks().get(2) else {
            panic!("expected a table");
        };
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.cell_text(0, 1).as_deref(), Some("Technology"));
        assert_eq!(table.cell_text(2, 0).as_deref(), Some("Hosting"));
        assert_eq!(table.rows()[0][0].style().background, Some(CORAL));
        assert_eq!(table.rows()[1][0].style().background, Some(GREY));
        assert_eq!(table.rows()[1][1].style().background, None);
        assert!(table.rows()[1][0].paragraphs()[0].spans()[0].is_bold());
    }

    #[test]
    fn band_fill_alternates_from_first_data_row() {
        let facts = FactTable::new(
            0.3,
            0.7,
            FactLook {
                band_fill: Some(GREY),
                key_fill: None,
                ..look()
            },
        )
        .with_header("Overall Status", "Detail")
        .with_row("a", "1")
        .with_row("b", "2")
        .with_row("c", "3");
        let table = fact_table(&facts);
        let fills: Vec<_> = table.rows().iter().map(|row| row[0].style().background).collect();
        assert_eq!(fills, vec![Some(CORAL), Some(GREY), None, Some(GREY)]);
    }

    #[test]
    fn checklist_items_carry_marker() {
        let sections = assemble(&plan());
        let Block::Paragraph(item) = &sections[2].blocks()[1] else {
            panic!("expected a paragraph");
        };
        assert_eq!(item.role(), StyleRole::ListItem);
        assert_eq!(item.text(), "✓  QR Codes — per venue");
        assert_eq!(item.spans()[0].color(), Some(GREEN));
    }

    #[test]
    fn steps_become_numbered_tables_with_gaps() {
        let item = PlanItem::Steps {
            look: StepLook {
                badge_width: ColumnWidth::Fixed(12.0),
                body_width: ColumnWidth::Remainder,
                badge_fill: Some(CORAL),
                body_fill: Some(GREY),
                number_color: Color::Rgb(255, 255, 255),
                number_size: 14,
                badge_padding: CellPadding::uniform(6.0),
                body_padding: CellPadding::uniform(6.0),
                badge_vertical: VerticalAlignment::Middle,
                body_vertical: VerticalAlignment::Middle,
                rules: TableRules::None,
                gap_after: 2.0,
            },
            steps: vec![
                Step::new("Customer Scans QR Code", "Phone camera."),
                Step::new("Customer Pays", "Card or wallet."),
            ],
        };
        let mut blocks = Vec::new();
        item_blocks(&item, &mut blocks);

        assert_eq!(blocks.len(), 4);
        let Block::Table(second) = &blocks[2] else {
            panic!("expected a table");
        };
        assert_eq!(second.cell_text(0, 0).as_deref(), Some("2"));
        assert_eq!(second.cell_text(0, 1).as_deref(), Some("Customer Pays\nCard or wallet."));
        assert_eq!(blocks[3], Block::spacer(2.0));
    }

    #[test]
    fn details_emit_title_and_description() {
        let item = PlanItem::Details {
            marker: ListMarker::new("●", CORAL).bold(),
            items: vec![DetailItem::new("Switch to Stripe Live Mode", "Replace test keys.")],
        };
        let mut blocks = Vec::new();
        item_blocks(&item, &mut blocks);
        let roles: Vec<_> = blocks
            .iter()
            .map(|block| match block {
                Block::Paragraph(paragraph) => paragraph.role(),
                other => panic!("unexpected {}", other.kind()),
            })
            .collect();
        assert_eq!(roles, vec![StyleRole::DetailTitle, StyleRole::Detail]);
    }

    #[test]
    fn malformed_markup_degrades_to_literal_text() {
        assert_eq!(spans_or_literal("**unterminated"), vec![Span::new("**unterminated")]);
    }

    #[test]
    fn zero_gaps_emit_no_spacer() {
        let mut blocks = Vec::new();
        push_spacer(&mut blocks, 0.0);
        assert!(blocks.is_empty());
    }
}
