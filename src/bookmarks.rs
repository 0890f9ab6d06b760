//! Section outline for rendered reports.
//!
//! genpdf cannot write an outline, so the finished bytes are reopened with `lopdf` and a flat
//! `/Outlines` tree is attached to the catalog, one item per titled section.

use std::fmt;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::model::ReportSection;

#[derive(Debug)]
pub enum BookmarkError {
    /// lopdf failed to read, edit or write the document.
    Pdf(lopdf::Error),
    /// The page map points past the end of the document.
    PageOutOfRange { title: String, page: usize },
}

impl From<lopdf::Error> for BookmarkError {
    fn from(err: lopdf::Error) -> Self {
        Self::Pdf(err)
    }
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf(_) => write!(f, "Failed to edit the PDF outline"),
            Self::PageOutOfRange { title, page } => {
                write!(f, "Outline entry '{title}' points at missing page {page}")
            }
        }
    }
}

impl std::error::Error for BookmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pdf(err) => Some(err),
            Self::PageOutOfRange { .. } => None,
        }
    }
}

/// Returns `pdf` with an outline item for every titled section that produced output.
///
/// `section_pages` is the 1-based first page of each section, as reported by the renderer.
/// Items point at their page with a `/Fit` destination.  Without any titled section the bytes
/// come back unchanged.
pub fn apply_section_bookmarks(
    pdf: &[u8],
    sections: &[ReportSection],
    section_pages: &[Option<usize>],
) -> Result<Vec<u8>, BookmarkError> {
    let mut document = Document::load_mem(pdf)?;
    let pages = document.get_pages();

    let mut targets: Vec<(&str, ObjectId)> = Vec::new();
    for (section, page) in sections.iter().zip(section_pages) {
        let (Some(title), Some(page)) = (section.title(), *page) else {
            continue;
        };
        let page_id = u32::try_from(page)
            .ok()
            .and_then(|number| pages.get(&number))
            .ok_or_else(|| BookmarkError::PageOutOfRange {
                title: title.to_string(),
                page,
            })?;
        targets.push((title, *page_id));
    }
    if targets.is_empty() {
        return Ok(pdf.to_vec());
    }

    let root_id = document.new_object_id();
    let item_ids: Vec<ObjectId> = targets.iter().map(|_| document.new_object_id()).collect();

    for (index, (title, page_id)) in targets.iter().enumerate() {
        let mut item = Dictionary::new();
        item.set("Title", Object::string_literal(*title));
        item.set("Parent", root_id);
        item.set(
            "Dest",
            vec![Object::Reference(*page_id), Object::Name(b"Fit".to_vec())],
        );
        if let Some(previous) = index.checked_sub(1).map(|i| item_ids[i]) {
            item.set("Prev", previous);
        }
        if let Some(next) = item_ids.get(index + 1) {
            item.set("Next", *next);
        }
        document.objects.insert(item_ids[index], Object::Dictionary(item));
    }

    let mut root = Dictionary::new();
    root.set("Type", Object::Name(b"Outlines".to_vec()));
    root.set("Count", item_ids.len() as i64);
    root.set("First", item_ids[0]);
    root.set("Last", item_ids[item_ids.len() - 1]);
    document.objects.insert(root_id, Object::Dictionary(root));

    let catalog = document.catalog_mut()?;
    catalog.set("Outlines", root_id);
    catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));

    let mut bytes = Vec::with_capacity(pdf.len());
    document.save_to(&mut bytes).map_err(lopdf::Error::from)?;
    Ok(bytes)
}
