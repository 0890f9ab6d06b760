//! Static TipUs PDF reports.
//!
//! A report is described as a [`assemble::ContentPlan`], expanded into [`model::Block`]s by
//! [`assemble::assemble`] and rendered with [`builder::PdfBuilder`].  [`reports`] holds the two
//! concrete reports and [`reports::generate`] writes them to disk.

pub mod assemble;
pub mod builder;
pub mod elements;
pub mod fonts;
pub mod model;
pub mod reports;
pub mod richtext;
pub mod style;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use builder::{PdfBuildError, PdfBuilder, RenderedPdf};
pub use reports::{generate, GenerateOptions, GeneratedReport, ReportKind};
