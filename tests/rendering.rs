use std::fs;
use std::path::PathBuf;

use genpdf::style::Color;
use sha2::{Digest, Sha256};
use tipus_reports::builder::{PdfBuildError, PdfBuilder, RenderedPdf};
use tipus_reports::fonts;
use tipus_reports::model::{
    Block, CellStyle, ColumnWidth, HeadingLevel, ReportSection, RichParagraph, TableBlock,
    TableCell, TableRules,
};
use tipus_reports::reports::{generate, GenerateOptions, ReportKind};
use tipus_reports::richtext::Span;
use tipus_reports::style::{PageSetup, Stroke, StyleRole, StyleSheet, TextStyle};

const INK: Color = Color::Rgb(0x1e, 0x29, 0x3b);
const GREY: Color = Color::Rgb(0xe2, 0xe8, 0xf0);

fn stylesheet() -> StyleSheet {
    StyleSheet::new(TextStyle::new(10, INK).with_space_after(3.0))
        .with(StyleRole::Heading, TextStyle::new(16, INK).bold())
        .with(StyleRole::TableCell, TextStyle::new(10, INK))
}

fn builder() -> PdfBuilder {
    PdfBuilder::new(stylesheet(), PageSetup::a4(20.0, 25.0, 20.0, 25.0)).with_title("Test report")
}

fn cell(text: &str) -> TableCell {
    TableCell::paragraph(
        RichParagraph::new(StyleRole::TableCell, vec![Span::new(text)]),
        CellStyle::default().with_background(GREY),
    )
}

fn body(text: &str) -> Block {
    Block::paragraph(StyleRole::Body, vec![Span::new(text)])
}

fn skip(test: &str) -> bool {
    if fonts::any_fonts_available() {
        return false;
    }
    eprintln!(
        "Skipping {test}: no report fonts found. Set TIPUS_REPORTS_FONTS_DIR or copy Roboto into assets/fonts."
    );
    true
}

fn render_sample_pdf() -> RenderedPdf {
    builder()
        .add_section(
            ReportSection::titled("Sample")
                .with_block(Block::paragraph(
                    StyleRole::Body,
                    vec![Span::new("Hello, ").bold(), Span::new("PDF!")],
                ))
                .with_block(Block::rule(1.0, GREY)),
        )
        .render()
        .expect("render sample pdf")
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() {
                    let byte = data[cursor];
                    if byte == terminator {
                        break;
                    }
                    if terminator == b')' {
                        data[cursor] = b'0';
                    } else if !matches!(byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    fn scrub_xml(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while offset + start.len() < data.len() {
            let Some(start_pos) = data[offset..]
                .windows(start.len())
                .position(|window| window == start)
            else {
                break;
            };
            let start_index = offset + start_pos + start.len();
            let Some(end_pos) = data[start_index..]
                .windows(end.len())
                .position(|window| window == end)
            else {
                break;
            };
            for byte in &mut data[start_index..start_index + end_pos] {
                if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                    *byte = b'0';
                }
            }
            offset = start_index + end_pos + end.len();
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_segment(&mut normalized, b"/CreationDate(", b')');
    scrub_segment(&mut normalized, b"/ModDate(", b')');
    scrub_segment(&mut normalized, b"/ID[", b']');
    scrub_segment(&mut normalized, b"/Producer(", b')');
    scrub_xml(&mut normalized, b"<xmp:CreateDate>", b"</xmp:CreateDate>");
    scrub_xml(&mut normalized, b"<xmp:ModifyDate>", b"</xmp:ModifyDate>");
    scrub_xml(&mut normalized, b"<xmp:MetadataDate>", b"</xmp:MetadataDate>");
    scrub_xml(&mut normalized, b"<xmpMM:DocumentID>", b"</xmpMM:DocumentID>");
    scrub_xml(&mut normalized, b"<xmpMM:InstanceID>", b"</xmpMM:InstanceID>");
    scrub_xml(&mut normalized, b"<xmpMM:VersionID>", b"</xmpMM:VersionID>");
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(scrub_pdf(bytes)).into()
}

fn stroke_count(bytes: &[u8], page: u32) -> usize {
    let document = lopdf::Document::load_mem(bytes).expect("parse rendered pdf");
    let page_id = *document.get_pages().get(&page).expect("page exists");
    document
        .get_and_decode_page_content(page_id)
        .expect("decode page content")
        .operations
        .iter()
        .filter(|operation| operation.operator == "S")
        .count()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tipus-reports-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[test]
fn renders_non_empty_output() {
    if skip("renders_non_empty_output") {
        return;
    }
    let pdf = render_sample_pdf();
    assert!(pdf.bytes.starts_with(b"%PDF"), "rendered PDF should start with a header");
    assert_eq!(pdf.page_count, 1);
    assert_eq!(pdf.section_pages, vec![Some(1)]);
}

#[test]
fn rendering_is_deterministic() {
    if skip("rendering_is_deterministic") {
        return;
    }
    let bytes_a = render_sample_pdf().bytes;
    let bytes_b = render_sample_pdf().bytes;

    assert_eq!(bytes_a.len(), bytes_b.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&bytes_a),
        normalized_hash(&bytes_b),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn summary_table_then_page_break_scenario() {
    if skip("summary_table_then_page_break_scenario") {
        return;
    }
    let table = TableBlock::new(vec![ColumnWidth::Fraction(0.35), ColumnWidth::Fraction(0.65)])
        .with_rules(TableRules::Grid(Stroke::new(0.5, GREY)))
        .with_row(vec![cell("Overall Completion"), cell("~98%")])
        .with_row(vec![cell("Mode"), cell("Test mode")]);

    let pdf = builder()
        .add_section(
            ReportSection::titled("Summary")
                .with_block(Block::heading("Summary", HeadingLevel::Section))
                .with_block(Block::Table(table))
                .with_block(Block::PageBreak)
                .with_block(body("Rendered after the break.")),
        )
        .render()
        .expect("render scenario");

    assert!(pdf.page_count >= 2, "expected at least two pages");
    assert_eq!(pdf.block_pages[0], Some(1), "heading on page 1");
    assert_eq!(pdf.block_pages[1], Some(1), "table on page 1");
    let paragraph_page = pdf.block_pages[3].expect("paragraph rendered");
    assert!(paragraph_page >= 2, "paragraph must follow the page break");
}

#[test]
fn page_breaks_strictly_increase_pages() {
    if skip("page_breaks_strictly_increase_pages") {
        return;
    }
    let pdf = builder()
        .add_section(
            ReportSection::new()
                .with_block(body("first"))
                .with_block(Block::PageBreak)
                .with_block(body("second"))
                .with_block(Block::PageBreak)
                .with_block(body("third")),
        )
        .render()
        .expect("render breaks");

    let content_pages: Vec<usize> = [0, 2, 4]
        .iter()
        .map(|&index| pdf.block_pages[index].expect("content rendered"))
        .collect();
    assert!(
        content_pages.windows(2).all(|pair| pair[0] < pair[1]),
        "pages {content_pages:?} should strictly increase"
    );
    assert_eq!(pdf.page_count, 3);
}

#[test]
fn content_keeps_declaration_order_across_pages() {
    if skip("content_keeps_declaration_order_across_pages") {
        return;
    }
    let mut section = ReportSection::titled("Long");
    for index in 0..80 {
        section.push(body(&format!(
            "Paragraph {index}: venues never touch money or Stripe directly."
        )));
    }
    let pdf = builder().add_section(section).render().expect("render long report");

    assert!(pdf.page_count >= 2);
    let pages: Vec<usize> = pdf.block_pages.iter().map(|page| page.expect("rendered")).collect();
    assert!(pages.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn tall_tables_continue_on_the_next_page() {
    if skip("tall_tables_continue_on_the_next_page") {
        return;
    }
    let mut table = TableBlock::new(vec![ColumnWidth::Fixed(30.0), ColumnWidth::Remainder])
        .with_rules(TableRules::RowSeparators {
            stroke: Stroke::new(0.5, GREY),
            include_last: false,
        });
    for index in 0..120 {
        table = table.with_row(vec![cell(&index.to_string()), cell("Per-employee tracking")]);
    }
    let pdf = builder()
        .add_section(
            ReportSection::new()
                .with_block(Block::Table(table))
                .with_block(body("after")),
        )
        .render()
        .expect("render tall table");

    assert!(pdf.page_count >= 2);
    assert_eq!(pdf.block_pages[0], Some(1));
    assert!(pdf.block_pages[1].is_some_and(|page| page >= 2));
}

#[test]
fn unwritable_path_fails_without_leaving_a_file() {
    if skip("unwritable_path_fails_without_leaving_a_file") {
        return;
    }
    let dir = scratch_dir("unwritable");
    let target = dir.join("missing-subdir").join("report.pdf");

    let err = builder()
        .add_section(ReportSection::new().with_block(body("never written")))
        .render_to_file(&target)
        .unwrap_err();

    assert!(matches!(err, PdfBuildError::Write { .. }));
    assert!(!target.exists());
    let leftovers = fs::read_dir(&dir).expect("list scratch dir").count();
    assert_eq!(leftovers, 0);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn both_reports_render_to_their_fixed_names() {
    if skip("both_reports_render_to_their_fixed_names") {
        return;
    }
    let dir = scratch_dir("reports");
    let options = GenerateOptions {
        output_dir: dir.clone(),
        ..GenerateOptions::default()
    };

    for kind in ReportKind::ALL {
        let report = generate(kind, &options).expect("generate report");
        assert_eq!(report.path, dir.join(kind.file_name()));
        let bytes = fs::read(&report.path).expect("read report");
        assert!(bytes.starts_with(b"%PDF"));
        assert!(report.page_count >= 1, "{kind} should have pages");
    }
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn status_report_sections_start_after_their_page_breaks() {
    if skip("status_report_sections_start_after_their_page_breaks") {
        return;
    }
    let pdf = ReportKind::StatusReport
        .builder()
        .render()
        .expect("render status report");

    let pages: Vec<usize> = pdf
        .section_pages
        .iter()
        .map(|page| page.expect("section rendered"))
        .collect();
    assert!(pages.windows(2).all(|pair| pair[0] <= pair[1]));
    // Sections 3 and 6 follow explicit page breaks.
    assert!(pages[3] > pages[2]);
    assert!(pages[6] > pages[5]);
}

#[test]
fn cell_fills_and_thick_rules_are_stacked_hairlines() {
    if skip("cell_fills_and_thick_rules_are_stacked_hairlines") {
        return;
    }
    let table = TableBlock::new(vec![ColumnWidth::Remainder])
        .with_rules(TableRules::None)
        .with_row(vec![cell("Overall Completion")]);
    let pdf = builder()
        .add_section(ReportSection::new().with_block(Block::Table(table)))
        .add_section(
            ReportSection::new()
                .with_block(Block::PageBreak)
                .with_block(Block::rule(2.5, GREY)),
        )
        .render()
        .expect("render fills");

    // 3 pt padding above and below a line of 10 pt text is more than 5 mm of fill.
    let fill_strokes = stroke_count(&pdf.bytes, 1);
    assert!(fill_strokes >= 17, "only {fill_strokes} strokes paint the cell");
    assert_eq!(stroke_count(&pdf.bytes, 2), 3, "a 2.5 pt rule takes three hairlines");
}

#[test]
fn over_tall_first_row_stays_on_the_first_page() {
    if skip("over_tall_first_row_stays_on_the_first_page") {
        return;
    }
    let table =
        TableBlock::new(vec![ColumnWidth::Remainder]).with_row(vec![cell(&"word ".repeat(3000))]);
    let pdf = builder()
        .add_section(ReportSection::new().with_block(Block::Table(table)))
        .render()
        .expect("render over-tall row");

    assert_eq!(pdf.page_count, 1);
    assert_eq!(pdf.block_pages, vec![Some(1)]);
}

#[cfg(feature = "bookmarks")]
#[test]
fn bookmarks_point_each_titled_section_at_its_page() {
    use lopdf::Object;

    if skip("bookmarks_point_each_titled_section_at_its_page") {
        return;
    }
    let builder = ReportKind::SystemOverview.builder();
    let pdf = builder
        .render_with_bookmarks()
        .expect("render with bookmarks");
    let expected: Vec<(String, u32)> = builder
        .sections()
        .iter()
        .zip(&pdf.section_pages)
        .filter_map(|(section, page)| {
            Some((section.title()?.to_string(), u32::try_from((*page)?).ok()?))
        })
        .collect();
    assert!(!expected.is_empty());

    let document = lopdf::Document::load_mem(&pdf.bytes).expect("parse bookmarked pdf");
    let pages = document.get_pages();
    let catalog = document.catalog().expect("catalog");
    assert_eq!(
        catalog.get(b"PageMode").and_then(Object::as_name).expect("page mode"),
        b"UseOutlines"
    );
    let root_id = catalog
        .get(b"Outlines")
        .and_then(Object::as_reference)
        .expect("outline root");
    let root = document.get_dictionary(root_id).expect("outline root dictionary");
    assert_eq!(
        root.get(b"Count").and_then(Object::as_i64).expect("outline count"),
        expected.len() as i64
    );

    let mut found = Vec::new();
    let mut next = root.get(b"First").and_then(Object::as_reference).ok();
    while let Some(id) = next {
        let item = document.get_dictionary(id).expect("outline item");
        let title = item.get(b"Title").and_then(Object::as_str).expect("title");
        let target = item
            .get(b"Dest")
            .and_then(Object::as_array)
            .expect("destination")[0]
            .as_reference()
            .expect("page reference");
        let page = pages
            .iter()
            .find(|(_, page_id)| **page_id == target)
            .map(|(number, _)| *number)
            .expect("destination is a page of the document");
        found.push((String::from_utf8_lossy(title).into_owned(), page));
        next = item.get(b"Next").and_then(Object::as_reference).ok();
    }
    assert_eq!(found, expected);
}
