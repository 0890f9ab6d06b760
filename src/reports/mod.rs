//! The TipUs reports: their themes, content plans and output files.

mod status_report;
mod system_overview;

use std::fmt;
use std::path::PathBuf;

use log::debug;

use crate::assemble::{assemble, ContentPlan};
use crate::builder::{PdfBuildError, PdfBuilder, RenderedPdf};
use crate::style::{PageSetup, StyleSheet};

/// Stylesheet and page geometry of one report.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub stylesheet: StyleSheet,
    pub page_setup: PageSetup,
}

/// Every report this crate can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// Project status report of 17 February 2026.
    StatusReport,
    /// System overview and next steps of 18 February 2026.
    SystemOverview,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::StatusReport, ReportKind::SystemOverview];

    /// Fixed output file name.
    pub fn file_name(self) -> &'static str {
        match self {
            ReportKind::StatusReport => "TipUs_Status_Report.pdf",
            ReportKind::SystemOverview => "TipUs_System_Overview_Next_Steps.pdf",
        }
    }

    /// Title stored in the PDF metadata.
    pub fn document_title(self) -> &'static str {
        match self {
            ReportKind::StatusReport => "TipUs Status Report",
            ReportKind::SystemOverview => "TipUs System Overview & Next Steps",
        }
    }

    pub fn theme(self) -> Theme {
        match self {
            ReportKind::StatusReport => status_report::theme(),
            ReportKind::SystemOverview => system_overview::theme(),
        }
    }

    pub fn plan(self) -> ContentPlan {
        match self {
            ReportKind::StatusReport => status_report::plan(),
            ReportKind::SystemOverview => system_overview::plan(),
        }
    }

    /// A builder loaded with the assembled report.
    pub fn builder(self) -> PdfBuilder {
        let Theme {
            stylesheet,
            page_setup,
        } = self.theme();
        PdfBuilder::new(stylesheet, page_setup)
            .with_title(self.document_title())
            .add_sections(assemble(&self.plan()))
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.document_title())
    }
}

/// Where and how [`generate`] writes a report.
#[derive(Clone, Debug)]
pub struct GenerateOptions {
    pub output_dir: PathBuf,
    pub fonts_dir: Option<PathBuf>,
    /// Embed a section outline. Only honored with the `bookmarks` feature.
    pub bookmarks: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            fonts_dir: None,
            bookmarks: false,
        }
    }
}

/// A report written to disk.
#[derive(Clone, Debug)]
pub struct GeneratedReport {
    pub kind: ReportKind,
    pub path: PathBuf,
    pub page_count: usize,
}

#[cfg(feature = "bookmarks")]
fn render(builder: &PdfBuilder, options: &GenerateOptions) -> Result<RenderedPdf, PdfBuildError> {
    if options.bookmarks {
        builder.render_with_bookmarks()
    } else {
        builder.render()
    }
}

#[cfg(not(feature = "bookmarks"))]
fn render(builder: &PdfBuilder, options: &GenerateOptions) -> Result<RenderedPdf, PdfBuildError> {
    if options.bookmarks {
        log::warn!("Built without the `bookmarks` feature; writing the report without an outline.");
    }
    builder.render()
}

/// Renders `kind` and writes it to its fixed file name in the output directory.
pub fn generate(
    kind: ReportKind,
    options: &GenerateOptions,
) -> Result<GeneratedReport, PdfBuildError> {
    let mut builder = kind.builder();
    if let Some(directory) = &options.fonts_dir {
        builder = builder.with_fonts_dir(directory.clone());
    }

    let rendered = render(&builder, options)?;
    let path = options.output_dir.join(kind.file_name());
    rendered.write_to(&path)?;
    debug!("wrote {} ({} pages) to {}", kind, rendered.page_count, path.display());

    Ok(GeneratedReport {
        kind,
        path,
        page_count: rendered.page_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Block;
    use crate::style::StyleRole;

    #[test]
    fn file_names_are_distinct_pdfs() {
        assert_ne!(
            ReportKind::StatusReport.file_name(),
            ReportKind::SystemOverview.file_name()
        );
        assert!(ReportKind::ALL
            .iter()
            .all(|kind| kind.file_name().ends_with(".pdf")));
    }

    #[test]
    fn every_role_used_by_a_plan_is_styled() {
        for kind in ReportKind::ALL {
            let theme = kind.theme();
            for section in assemble(&kind.plan()) {
                for block in section.blocks() {
                    if let Block::Paragraph(paragraph) = block {
                        assert!(
                            theme.stylesheet.defines(paragraph.role()),
                            "{} uses undefined role {}",
                            kind,
                            paragraph.role().name()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn themes_define_heading_roles() {
        for kind in ReportKind::ALL {
            let sheet = kind.theme().stylesheet;
            for role in [StyleRole::Title, StyleRole::Heading, StyleRole::Footer] {
                assert!(sheet.defines(role));
            }
        }
    }

    #[test]
    fn plans_assemble_deterministically() {
        for kind in ReportKind::ALL {
            assert_eq!(assemble(&kind.plan()), assemble(&kind.plan()));
        }
    }

    #[test]
    fn default_output_directory_is_current_directory() {
        assert_eq!(GenerateOptions::default().output_dir, PathBuf::from("."));
    }
}
