//! Renders report sections into PDF bytes and files.

use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use genpdf::elements::{PageBreak, Paragraph};
use genpdf::error::Error;
use genpdf::style;
use genpdf::{Element, Margins, PageDecorator};
use log::debug;

use crate::elements::{
    mm_from_f64, GridTable, HorizontalRule, PageTracked, PageTracker, VerticalSpace,
};
use crate::fonts;
use crate::model::{Block, ReportSection, RichParagraph};
use crate::richtext::Span;
use crate::style::{PageSetup, StyleSheet};

#[cfg(feature = "bookmarks")]
use crate::bookmarks::{self, BookmarkError};

/// Errors raised while rendering or writing a report.
#[derive(Debug)]
pub enum PdfBuildError {
    /// No usable font family could be loaded.
    FontLoad(Error),
    /// The layout engine failed while paginating or serializing.
    Render(Error),
    /// The output file could not be written.
    Write { path: PathBuf, source: io::Error },
    /// The document outline could not be embedded.
    #[cfg(feature = "bookmarks")]
    Bookmarks(BookmarkError),
}

impl fmt::Display for PdfBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontLoad(_) => write!(f, "Failed to load report fonts"),
            Self::Render(_) => write!(f, "Failed to render PDF document"),
            Self::Write { path, .. } => write!(f, "Failed to write {}", path.display()),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(_) => write!(f, "Failed to embed bookmarks"),
        }
    }
}

impl std::error::Error for PdfBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FontLoad(err) | Self::Render(err) => Some(err),
            Self::Write { source, .. } => Some(source),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(err) => Some(err),
        }
    }
}

#[cfg(feature = "bookmarks")]
impl From<BookmarkError> for PdfBuildError {
    fn from(err: BookmarkError) -> Self {
        Self::Bookmarks(err)
    }
}

/// A rendered document together with its page map.
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// First page of every block, in declaration order across all sections.
    pub block_pages: Vec<Option<usize>>,
    /// First page of every section.
    pub section_pages: Vec<Option<usize>>,
}

impl RenderedPdf {
    /// Writes the bytes to `path` through a temporary sibling file.
    ///
    /// The target only appears once the full write succeeded; on failure the temporary file is
    /// removed.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), PdfBuildError> {
        write_atomically(path.as_ref(), &self.bytes)
    }
}

/// Collects report sections and renders them with one stylesheet and page setup.
pub struct PdfBuilder {
    title: String,
    page_setup: PageSetup,
    stylesheet: StyleSheet,
    fonts_dir: Option<PathBuf>,
    sections: Vec<ReportSection>,
}

impl PdfBuilder {
    pub fn new(stylesheet: StyleSheet, page_setup: PageSetup) -> Self {
        Self {
            title: String::new(),
            page_setup,
            stylesheet,
            fonts_dir: None,
            sections: Vec::new(),
        }
    }

    /// Sets the document title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_page_setup(mut self, page_setup: PageSetup) -> Self {
        self.page_setup = page_setup;
        self
    }

    pub fn with_stylesheet(mut self, stylesheet: StyleSheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    /// Searches `directory` for fonts before the default locations.
    pub fn with_fonts_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.fonts_dir = Some(directory.into());
        self
    }

    pub fn add_section(mut self, section: ReportSection) -> Self {
        self.sections.push(section);
        self
    }

    pub fn add_sections<I>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = ReportSection>,
    {
        self.sections.extend(sections);
        self
    }

    pub fn sections(&self) -> &[ReportSection] {
        &self.sections
    }

    /// Renders every section, in order, into PDF bytes.
    pub fn render(&self) -> Result<RenderedPdf, PdfBuildError> {
        let family =
            fonts::load_font_family(self.fonts_dir.as_deref()).map_err(PdfBuildError::FontLoad)?;

        let mut document = genpdf::Document::new(family);
        document.set_title(self.title.clone());
        document.set_paper_size(self.page_setup.paper_size());

        let tracker = PageTracker::new();
        document.set_page_decorator(ReportPageDecorator::new(
            self.page_setup.margins(),
            tracker.clone(),
        ));

        let mut section_ranges: Vec<Range<usize>> = Vec::with_capacity(self.sections.len());
        let mut next_slot = 0;
        for section in &self.sections {
            let start = next_slot;
            for block in section.blocks() {
                document.push(PageTracked::new(
                    block_element(block, &self.stylesheet, &self.page_setup),
                    &tracker,
                ));
                next_slot += 1;
            }
            section_ranges.push(start..next_slot);
        }
        debug!(
            "rendering '{}': {} sections, {} blocks",
            self.title,
            self.sections.len(),
            next_slot
        );

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(PdfBuildError::Render)?;

        let block_pages = tracker.first_pages();
        let section_pages = section_ranges
            .into_iter()
            .map(|range| block_pages[range].iter().flatten().copied().min())
            .collect();

        debug!(
            "rendered '{}': {} pages, {} bytes",
            self.title,
            tracker.page_count(),
            bytes.len()
        );
        Ok(RenderedPdf {
            bytes,
            page_count: tracker.page_count(),
            block_pages,
            section_pages,
        })
    }

    /// Renders the document and embeds an outline entry for every titled section.
    #[cfg(feature = "bookmarks")]
    pub fn render_with_bookmarks(&self) -> Result<RenderedPdf, PdfBuildError> {
        let mut rendered = self.render()?;
        rendered.bytes = bookmarks::apply_section_bookmarks(
            &rendered.bytes,
            &self.sections,
            &rendered.section_pages,
        )?;
        Ok(rendered)
    }

    /// Renders the document and writes it to `path`.
    pub fn render_to_file(&self, path: impl AsRef<Path>) -> Result<RenderedPdf, PdfBuildError> {
        let rendered = self.render()?;
        rendered.write_to(path)?;
        Ok(rendered)
    }
}

fn text_element(paragraph: &RichParagraph, stylesheet: &StyleSheet) -> Box<dyn Element> {
    let text_style = stylesheet.get(paragraph.role());
    let base = text_style.to_style();

    let mut element = Paragraph::default();
    for span in paragraph.spans() {
        element.push(span.to_styled_string(base));
    }
    element.set_alignment(paragraph.alignment().unwrap_or(text_style.alignment).into());

    Box::new(element.padded(Margins::trbl(
        mm_from_f64(text_style.space_before),
        mm_from_f64(0.0),
        mm_from_f64(text_style.space_after),
        mm_from_f64(text_style.indent),
    )))
}

fn block_element(
    block: &Block,
    stylesheet: &StyleSheet,
    page_setup: &PageSetup,
) -> Box<dyn Element> {
    match block {
        Block::Heading { text, level } => text_element(
            &RichParagraph::new(level.role(), vec![Span::new(text.clone())]),
            stylesheet,
        ),
        Block::Paragraph(paragraph) => text_element(paragraph, stylesheet),
        Block::Table(table) => Box::new(GridTable::new(
            table,
            stylesheet,
            page_setup.content_height(),
        )),
        Block::Spacer(height) => Box::new(VerticalSpace::new(*height)),
        Block::PageBreak => Box::new(PageBreak::new()),
        Block::Rule(rule) => Box::new(HorizontalRule::new(rule.stroke)),
    }
}

/// Applies the page margins and advances the shared page counter.
struct ReportPageDecorator {
    margins: Margins,
    tracker: PageTracker,
}

impl ReportPageDecorator {
    fn new(margins: Margins, tracker: PageTracker) -> Self {
        Self { margins, tracker }
    }
}

impl PageDecorator for ReportPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        _context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        _style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        let page = self.tracker.start_page();
        debug!("starting page {}", page);
        area.add_margins(self.margins);
        Ok(area)
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("report"));
    name.push(".partial");
    path.with_file_name(name)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), PdfBuildError> {
    let temp = partial_path(path);
    let result = File::create(&temp)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp, path));

    result.map_err(|source| {
        let _ = fs::remove_file(&temp);
        PdfBuildError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}
