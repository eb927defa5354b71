// src/pdf_extract.rs

use crate::error::ExtractError;
use lopdf::{Dictionary, Document};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Text of one page, in document order. `None` for blank or image-only pages.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub number: u32,
    pub text: Option<String>,
}

/// Minimum number of non-whitespace characters for a page to count as text.
const MIN_TEXT_CHARS: usize = 1;

/// Page separator in plain-text inputs.
const FORM_FEED: char = '\x0c';

/// Load the ordered page texts of a document.
///
/// `.txt` files are split into pages on form feeds; anything else is read
/// as a PDF.
pub fn load_pages(path: impl AsRef<Path>) -> Result<Vec<PageText>, ExtractError> {
    let path = path.as_ref();
    let is_text = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));

    let pages = if is_text {
        pages_from_text(&fs::read_to_string(path)?)
    } else {
        pages_from_pdf(&fs::read(path)?)?
    };

    let blank = pages.iter().filter(|p| p.text.is_none()).count();
    info!(
        path = %path.display(),
        pages = pages.len(),
        blank,
        "Document loaded"
    );
    Ok(pages)
}

pub fn pages_from_text(text: &str) -> Vec<PageText> {
    text.split(FORM_FEED)
        .enumerate()
        .map(|(i, page)| PageText {
            number: i as u32 + 1,
            text: meaningful(page),
        })
        .collect()
}

/// Extract page texts from PDF bytes.
///
/// Pages are read one by one with lopdf. If that yields nothing at all,
/// pdf-extract's whole-document text is used as a single page.
pub fn pages_from_pdf(pdf_bytes: &[u8]) -> Result<Vec<PageText>, ExtractError> {
    let doc = Document::load_mem(pdf_bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let mut pages = Vec::new();
    for (&number, &object_id) in &doc.get_pages() {
        let image_only = doc
            .get_object(object_id)
            .and_then(|o| o.as_dict())
            .is_ok_and(|page| is_image_only(&doc, page));
        if image_only {
            info!(page = number, "Page is image-only");
            pages.push(PageText { number, text: None });
            continue;
        }

        let text = match doc.extract_text(&[number]) {
            Ok(text) => meaningful(&text),
            Err(e) => {
                warn!(page = number, error = %e, "Page text extraction failed");
                None
            }
        };
        pages.push(PageText { number, text });
    }

    if pages.iter().any(|p| p.text.is_some()) {
        return Ok(pages);
    }

    match ::pdf_extract::extract_text_from_mem(pdf_bytes) {
        Ok(text) => {
            info!(chars = text.len(), "Falling back to whole-document text");
            Ok(vec![PageText {
                number: 1,
                text: meaningful(&text),
            }])
        }
        Err(e) => {
            warn!(error = %e, "pdf-extract failed, document has no usable text");
            Ok(pages)
        }
    }
}

fn meaningful(text: &str) -> Option<String> {
    let chars = text.chars().filter(|c| !c.is_whitespace()).count();
    (chars >= MIN_TEXT_CHARS).then(|| text.to_string())
}

/// A page whose resources hold XObject images but no fonts has no text layer.
fn is_image_only(doc: &Document, page: &Dictionary) -> bool {
    let resources = page
        .get(b"Resources")
        .ok()
        .and_then(|r| doc.dereference(r).ok())
        .and_then(|(_, resolved)| resolved.as_dict().ok());
    let Some(resources) = resources else {
        return false;
    };

    let non_empty = |key: &[u8]| {
        resources
            .get(key)
            .ok()
            .and_then(|o| doc.dereference(o).ok())
            .and_then(|(_, resolved)| resolved.as_dict().ok())
            .is_some_and(|d| !d.is_empty())
    };

    non_empty(b"XObject") && !non_empty(b"Font")
}
